//! # swarmfs-bee
//!
//! Blocking HTTP client for the Swarm bee node API.
//!
//! The bee node stores immutable, content-addressed objects: an upload
//! returns an opaque reference, and that reference is the only way to get
//! the bytes back. Every upload must carry a postage batch id authorizing
//! the capacity consumption; there is no update or delete.
//!
//! ## Example
//!
//! ```ignore
//! use swarmfs_bee::BeeClient;
//!
//! let client = BeeClient::new("http://localhost:1633")?;
//!
//! // Upload returns the content reference.
//! let reference = client.upload(
//!     "todo.txt",
//!     std::io::Cursor::new(b"hello".to_vec()),
//!     5,
//!     "text/plain",
//!     "abc123",
//!     false,
//! )?;
//!
//! // Download streams the bytes back by reference.
//! let mut stream = client.download(&reference)?;
//! ```

pub mod client;
pub mod error;

pub use client::{BeeClient, BATCH_HEADER, DEFAULT_PORT, ENCRYPT_HEADER};
pub use error::Error;
