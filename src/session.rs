//! Observable feed loading state.
//!
//! [`FeedSession`] owns the state machine that presentation code watches:
//!
//! ```text
//! Initial ──load──▶ Loading ──▶ Success | NotFound | Failed
//!                      ▲                     │
//!                      └────────load─────────┘
//! ```
//!
//! State lives in a `tokio::sync::watch` channel, so the current value can be
//! read synchronously at any time and observers are notified of every
//! transition from the moment they subscribe. Each `load` takes a sequence
//! number; a completed fetch is applied only if no later-issued fetch has
//! already been applied, so a slow response can never overwrite a newer one.

use crate::feed::{Document, FeedClient, FetchError, FetchOutcome};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// UI-facing load state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Initial,
    Loading,
    Success,
    NotFound,
    Failed,
}

/// Immutable view of the session published to observers.
///
/// Cloning is cheap: the document and strings are reference counted.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub state: FeedState,
    /// Instance URL passed to the most recent `load`
    pub instance_url: Option<Arc<str>>,
    /// Last successfully loaded document. Kept across `NotFound` and `Failed`.
    pub document: Option<Arc<Document>>,
    /// Detail of the failure behind `NotFound`/`Failed`, for display
    pub error: Option<Arc<str>>,
    /// Sequence number of the most recent `load` call
    pub requested: u64,
    /// Sequence number of the load whose outcome this snapshot reflects (0 = none)
    pub applied: u64,
}

impl FeedSnapshot {
    fn initial() -> Self {
        Self {
            state: FeedState::Initial,
            instance_url: None,
            document: None,
            error: None,
            requested: 0,
            applied: 0,
        }
    }

    /// True while the most recently issued load has not been applied yet.
    pub fn is_pending(&self) -> bool {
        self.applied < self.requested
    }
}

struct Shared {
    tx: watch::Sender<FeedSnapshot>,
}

impl Shared {
    /// Applies a completed fetch unless a later-issued one was applied first.
    fn apply(&self, seq: u64, outcome: FetchOutcome) {
        let applied = self.tx.send_if_modified(move |snap| {
            if seq <= snap.applied {
                return false;
            }
            snap.applied = seq;
            match outcome {
                Ok(document) => {
                    snap.document = Some(Arc::new(document));
                    snap.state = FeedState::Success;
                    snap.error = None;
                }
                Err(FetchError::NotFound) => {
                    snap.state = FeedState::NotFound;
                    snap.error = Some(FetchError::NotFound.to_string().into());
                }
                Err(e) => {
                    snap.state = FeedState::Failed;
                    snap.error = Some(e.to_string().into());
                }
            }
            true
        });

        if applied {
            tracing::debug!(seq = seq, "Applied feed load outcome");
        } else {
            tracing::warn!(seq = seq, "Discarded stale feed load outcome");
        }
    }
}

/// Drives feed loading for one instance URL at a time and publishes its state.
pub struct FeedSession {
    client: FeedClient,
    shared: Arc<Shared>,
    next_seq: AtomicU64,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl FeedSession {
    pub fn new(client: FeedClient) -> Self {
        let (tx, _rx) = watch::channel(FeedSnapshot::initial());
        Self {
            client,
            shared: Arc::new(Shared { tx }),
            next_seq: AtomicU64::new(0),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Starts loading `url` and returns the load's sequence number.
    ///
    /// `Loading` is published before this returns; the fetch itself runs on a
    /// spawned task. Calls made while another load is in flight are accepted,
    /// and the earlier fetch is left to finish.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn load(&self, url: &str) -> u64 {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let instance_url: Arc<str> = Arc::from(url);

        self.shared.tx.send_modify(|snap| {
            snap.state = FeedState::Loading;
            snap.instance_url = Some(Arc::clone(&instance_url));
            snap.error = None;
            snap.requested = snap.requested.max(seq);
        });
        tracing::debug!(url = %url, seq = seq, "Feed load started");

        let client = self.client.clone();
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        let handle = tokio::spawn(async move {
            let outcome = client.fetch(&instance_url).await;
            match shared.upgrade() {
                Some(shared) => shared.apply(seq, outcome),
                None => tracing::debug!(seq = seq, "Session closed, dropping feed load outcome"),
            }
        });

        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.retain(|h| !h.is_finished());
        tasks.push(handle);

        seq
    }

    /// Current snapshot, read without waiting.
    pub fn current(&self) -> FeedSnapshot {
        self.shared.tx.borrow().clone()
    }

    pub fn state(&self) -> FeedState {
        self.shared.tx.borrow().state
    }

    pub fn document(&self) -> Option<Arc<Document>> {
        self.shared.tx.borrow().document.clone()
    }

    pub fn instance_url(&self) -> Option<Arc<str>> {
        self.shared.tx.borrow().instance_url.clone()
    }

    /// Subscribes to future transitions. The receiver's current value is the
    /// snapshot at the time of subscription; earlier transitions are not replayed.
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.shared.tx.subscribe()
    }

    /// Waits until the most recently issued load has been applied.
    ///
    /// Returns immediately when no load is pending.
    pub async fn wait_until_settled(&self) -> FeedSnapshot {
        let mut rx = self.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let settled = match rx.wait_for(|snap| !snap.is_pending()).await {
            Ok(snap) => snap.clone(),
            Err(_) => self.current(),
        };
        settled
    }

    /// Waits for every fetch started so far to finish, including ones whose
    /// outcome ends up discarded.
    pub async fn wait_idle(&self) {
        let handles: Vec<_> = {
            let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
            tasks.drain(..).collect()
        };
        for result in futures::future::join_all(handles).await {
            if let Err(e) = result {
                if e.is_panic() {
                    tracing::error!(error = %e, "Feed load task panicked");
                }
            }
        }
    }
}

/// Abort in-flight fetches; their outcomes have nowhere to go.
impl Drop for FeedSession {
    fn drop(&mut self) {
        let tasks = self.tasks.get_mut().unwrap_or_else(|e| e.into_inner());
        for handle in tasks.drain(..) {
            handle.abort();
        }
        tracing::debug!("Feed session closed");
    }
}
