//! # Beluga
//!
//! A reader for Beluga blogs: instances that publish their authors and posts
//! as a single JSON document at `<instance>/beluga.json`.
//!
//! ```text
//! FeedSession ──load──▶ FeedClient ──GET──▶ HttpTransport
//!      │
//!      └──watch──▶ observers (render)
//! ```
//!
//! - [`feed`]: document model, HTTP transport seam, and the fetching client
//! - [`session`]: the observable load state machine
//! - [`render`]: plain-text presentation of session snapshots
//! - [`config`]: optional TOML configuration
//! - [`util`]: instance URL normalization and terminal text helpers

pub mod config;
pub mod feed;
pub mod render;
pub mod session;
pub mod util;

pub use feed::{Document, FeedClient, FetchError, FetchOutcome};
pub use session::{FeedSession, FeedSnapshot, FeedState};
