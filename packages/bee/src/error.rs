#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("invalid API URL: {message}")]
    InvalidUrl { message: String },

    /// The node answered, but without a usable content reference.
    #[error("upload rejected by bee node: {message}")]
    Rejected { message: String },

    /// The node holds no content for the requested reference.
    #[error("no content for reference '{reference}'")]
    ReferenceNotFound { reference: String },
}
