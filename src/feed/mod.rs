//! Beluga feed retrieval: document model, HTTP transport, and the fetching client.
//!
//! - [`model`] - `beluga.json` document types and validation
//! - [`transport`] - The HTTP GET seam and its reqwest implementation
//! - [`client`] - One fetch-and-decode cycle with outcome classification
//!
//! # Example
//!
//! ```ignore
//! use beluga::feed::{FeedClient, FetchError, TransportOptions};
//!
//! let client = FeedClient::with_options(TransportOptions::default())?;
//! match client.fetch("https://beluga.example").await {
//!     Ok(doc) => println!("{} posts", doc.posts.len()),
//!     Err(FetchError::NotFound) => println!("not a Beluga instance"),
//!     Err(e) => println!("failed: {e}"),
//! }
//! ```

mod client;
mod model;
mod transport;

pub use client::{feed_url, FeedClient, FetchError, FetchOutcome, BELUGA_PATH};
pub use model::{parse_date_time, Attachment, Author, DecodeError, Document, Post};
pub use transport::{
    HttpResponse, HttpTransport, ReqwestTransport, TransportError, TransportOptions,
};
