//! Blocking client for the bee node's `/bzz` endpoints.

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::{Body, Client};
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::error::Error;

/// Default bee API port.
pub const DEFAULT_PORT: u16 = 1633;

/// Header carrying the postage batch id that authorizes an upload.
pub const BATCH_HEADER: &str = "swarm-postage-batch-id";

/// Header requesting client-side encryption of the uploaded content.
pub const ENCRYPT_HEADER: &str = "swarm-encrypt";

/// Response body of `POST /bzz`.
///
/// A successful upload carries `reference`; rejections carry `message`.
/// The node reports some rejections with a 2xx status, so presence of the
/// reference is the real success signal.
#[derive(Debug, Default, Deserialize)]
struct BzzResponse {
    reference: Option<String>,
    message: Option<String>,
}

/// A blocking client for one bee node's HTTP API.
///
/// Uploads and downloads are single-attempt: there is no retry, backoff,
/// or resume. A failed call is terminal for that attempt, and the caller
/// decides what to do with the error.
pub struct BeeClient {
    client: Client,
    api_url: Url,
}

impl BeeClient {
    /// Create a client for the node at `api_url`.
    ///
    /// The URL must carry an `http://` or `https://` scheme; anything else
    /// is a configuration error, surfaced here rather than on first use.
    pub fn new(api_url: &str) -> Result<Self, Error> {
        Self::build(api_url, None)
    }

    /// Like [`BeeClient::new`], with a timeout applied to every request.
    ///
    /// Without one, failure detection depends entirely on the OS-level
    /// connection timeout.
    pub fn with_timeout(api_url: &str, timeout: Duration) -> Result<Self, Error> {
        Self::build(api_url, Some(timeout))
    }

    fn build(api_url: &str, timeout: Option<Duration>) -> Result<Self, Error> {
        let lowered = api_url.to_ascii_lowercase();
        if !lowered.starts_with("http://") && !lowered.starts_with("https://") {
            return Err(Error::InvalidUrl {
                message: format!("'{}' must start with http:// or https://", api_url),
            });
        }

        let api_url = Url::parse(api_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, api_url })
    }

    /// The node URL this client talks to.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Upload `size` bytes from `content` and return the content reference.
    ///
    /// Issues `POST /bzz?name=<urlencoded name>` with the batch id and mime
    /// type as headers and the content length declared up front. `name` is
    /// the basename the node associates with the object; it has no effect
    /// on addressing.
    pub fn upload(
        &self,
        name: &str,
        content: impl Read + Send + 'static,
        size: u64,
        mime_type: &str,
        batch_id: &str,
        encrypt: bool,
    ) -> Result<String, Error> {
        let mut url = self.api_url.join("bzz")?;
        url.query_pairs_mut().append_pair("name", name);

        log::debug!("uploading '{}' ({} bytes, {}) to {}", name, size, mime_type, url);

        let mut request = self
            .client
            .post(url)
            .header(BATCH_HEADER, batch_id)
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .body(Body::sized(content, size));
        if encrypt {
            request = request.header(ENCRYPT_HEADER, "true");
        }

        let response = request.send()?;
        let status = response.status();
        let text = response.text()?;

        // Bee answers with JSON in both the success and rejection cases;
        // anything unparseable is treated as an empty rejection body.
        let body: BzzResponse = serde_json::from_str(&text).unwrap_or_default();

        match body.reference {
            Some(reference) => Ok(reference),
            None => Err(Error::Rejected {
                message: body
                    .message
                    .unwrap_or_else(|| format!("HTTP {} with no reference in response", status)),
            }),
        }
    }

    /// Open a download stream for previously uploaded content.
    ///
    /// Issues `GET /bzz/<reference>/` and hands back the response body as a
    /// byte stream. An unknown reference is reported as
    /// [`Error::ReferenceNotFound`] rather than a generic HTTP failure.
    pub fn download(&self, reference: &str) -> Result<impl Read + Send, Error> {
        let url = self.api_url.join(&format!("bzz/{}/", reference))?;

        log::debug!("downloading '{}' from {}", reference, url);

        let response = self.client.get(url).send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::ReferenceNotFound {
                reference: reference.to_string(),
            });
        }

        Ok(response.error_for_status()?)
    }
}
