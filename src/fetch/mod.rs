pub mod http;

use thiserror::Error;

use crate::tweet::Tweet;

/// Terminal failure of a timeline request. The display strings are the two
/// messages shown verbatim in place of results; transport failures without an
/// HTTP status surface as code 0.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("No data for this user!")]
    NoData,
    #[error("Ooops! Something went wrong while fetching user data from Twitter. (Code {0})")]
    ServiceFailure(u16),
}

/// Lifecycle of the current timeline request. Exactly one state is current
/// at a time; entering `Fetching` drops any previously displayed tweets, so
/// a failed re-query can never resurrect stale results.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Fetching { subject: String },
    Success { tweets: Vec<Tweet> },
    Error(FetchError),
}

impl FetchState {
    pub fn is_fetching(&self) -> bool {
        matches!(self, FetchState::Fetching { .. })
    }
}

/// Generation stamp handed out by [`FetchCoordinator::request`]. A response
/// carrying an old token is stale and gets dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// What an I/O task reports back once its request settles. `status` is the
/// HTTP status, or 0 when the transport failed before producing one.
#[derive(Debug, Clone)]
pub struct FetchMessage {
    pub token: RequestToken,
    pub status: u16,
    pub body: String,
}

/// State machine governing how a timeline request is issued, tracked, and
/// superseded. Purely synchronous; the async edge lives in
/// [`crate::browser::TimelineBrowser`], which feeds responses back through
/// [`resolve`](FetchCoordinator::resolve).
///
/// The generation counter is what makes overlapping requests safe: every
/// `request` or `reset` bumps it, so the eventual response of any earlier
/// request no longer matches and is discarded on arrival.
#[derive(Debug, Default)]
pub struct FetchCoordinator {
    state: FetchState,
    generation: u64,
}

impl FetchCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    /// Begin a request for `subject`. A blank subject is a no-op from any
    /// state and issues nothing. Otherwise the coordinator enters `Fetching`
    /// and returns the token the eventual response must present.
    pub fn request(&mut self, subject: &str) -> Option<RequestToken> {
        let subject = subject.trim();
        if subject.is_empty() {
            return None;
        }
        self.generation += 1;
        self.state = FetchState::Fetching {
            subject: subject.to_string(),
        };
        Some(RequestToken(self.generation))
    }

    /// User-initiated clear: back to `Idle`, no tweets, no error. Bumps the
    /// generation so any in-flight response is stale when it lands.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = FetchState::Idle;
    }

    /// Apply a settled response. Returns false when the response was stale
    /// (superseded by a newer request or a reset) and changed nothing.
    pub fn resolve(&mut self, token: RequestToken, status: u16, body: &str) -> bool {
        if token.0 != self.generation || !self.state.is_fetching() {
            tracing::debug!(status, "dropping stale timeline response");
            return false;
        }

        self.state = match status {
            200..=299 => match serde_json::from_str::<Vec<serde_json::Value>>(body) {
                Ok(records) => {
                    let tweets = records
                        .iter()
                        .enumerate()
                        .map(|(i, raw)| Tweet::from_raw(raw, i))
                        .collect();
                    FetchState::Success { tweets }
                }
                Err(err) => {
                    // A 2xx body that is not a record array degrades to the
                    // generic failure carrying the real status.
                    tracing::warn!(%err, status, "timeline body was not a record array");
                    FetchState::Error(FetchError::ServiceFailure(status))
                }
            },
            400..=499 => FetchState::Error(FetchError::NoData),
            other => FetchState::Error(FetchError::ServiceFailure(other)),
        };
        true
    }
}
