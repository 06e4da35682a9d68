use crate::feed::model::{DecodeError, Document};
use crate::feed::transport::{HttpTransport, ReqwestTransport, TransportError, TransportOptions};
use std::sync::Arc;
use thiserror::Error;

/// Well-known path of the feed document, relative to the instance URL.
pub const BELUGA_PATH: &str = "/beluga.json";

/// Why a single fetch did not produce a [`Document`].
///
/// Every variant is terminal for the attempt; nothing is retried.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP 404: the instance URL is wrong or not a Beluga instance
    #[error("beluga.json not found (HTTP 404)")]
    NotFound,
    /// Any other non-2xx status
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// 2xx status but the body is not a valid document
    #[error("Parse error: {0}")]
    Parse(#[from] DecodeError),
    /// No status was obtained at all
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Result of one fetch-and-decode cycle.
pub type FetchOutcome = Result<Document, FetchError>;

/// Builds the document URL for an instance.
///
/// The path is appended verbatim: callers pass the instance URL without a
/// trailing slash.
pub fn feed_url(base_url: &str) -> String {
    format!("{}{}", base_url, BELUGA_PATH)
}

/// Fetches and decodes `beluga.json` documents.
///
/// Holds no state between calls besides the injected transport, so clones are
/// cheap and may be shared across tasks.
#[derive(Clone)]
pub struct FeedClient {
    transport: Arc<dyn HttpTransport + Send + Sync>,
}

impl FeedClient {
    pub fn new(transport: Arc<dyn HttpTransport + Send + Sync>) -> Self {
        Self { transport }
    }

    /// Client over a fresh [`ReqwestTransport`].
    pub fn with_options(options: TransportOptions) -> Result<Self, TransportError> {
        Ok(Self::new(Arc::new(ReqwestTransport::new(options)?)))
    }

    /// Performs exactly one GET of `{base_url}/beluga.json` and classifies the result.
    ///
    /// # Errors
    ///
    /// - [`FetchError::NotFound`] - status 404
    /// - [`FetchError::HttpStatus`] - any other non-2xx status
    /// - [`FetchError::Parse`] - 2xx with a body that is not a valid document
    /// - [`FetchError::Transport`] - connection, DNS, timeout or body read failure
    pub async fn fetch(&self, base_url: &str) -> FetchOutcome {
        let url = feed_url(base_url);
        tracing::debug!(url = %url, "Fetching feed document");

        let response = self.transport.get(&url).await.map_err(|e| {
            tracing::warn!(url = %url, error = %e, "Feed request failed");
            FetchError::Transport(e)
        })?;

        match response.status {
            200..=299 => {}
            404 => {
                tracing::warn!(url = %url, "Feed document not found");
                return Err(FetchError::NotFound);
            }
            status => {
                tracing::warn!(url = %url, status = status, "Feed request returned error status");
                return Err(FetchError::HttpStatus(status));
            }
        }

        Document::from_json(&response.body).map_err(|e| {
            tracing::warn!(url = %url, error = %e, "Feed document failed to decode");
            FetchError::Parse(e)
        })
    }
}
