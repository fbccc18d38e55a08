use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::Config;
use crate::fetch::http::{HttpTimelineClient, TimelineClient};
use crate::fetch::{FetchCoordinator, FetchMessage, FetchState};
use crate::filters::{FilterRegistry, FilterState, FilterValue};
use crate::query;
use crate::stats::TimelineStats;
use crate::tweet::Tweet;

/// The boundary the presentation layer talks to: one object owning the fetch
/// coordinator, the filter registry, and the current filter state.
///
/// Requests run on spawned tasks and report back through an mpsc channel;
/// [`pump`](Self::pump) drains settled responses into the coordinator, which
/// drops anything superseded in the meantime. Call it once per frame (or
/// after awaiting) before reading state. Must be used inside a tokio runtime.
pub struct TimelineBrowser {
    client: Arc<dyn TimelineClient>,
    coordinator: FetchCoordinator,
    registry: FilterRegistry,
    filter_values: FilterState,
    tx: mpsc::UnboundedSender<FetchMessage>,
    rx: mpsc::UnboundedReceiver<FetchMessage>,
}

impl TimelineBrowser {
    pub fn new(client: Arc<dyn TimelineClient>) -> Self {
        Self::with_registry(client, FilterRegistry::standard())
    }

    pub fn with_registry(client: Arc<dyn TimelineClient>, registry: FilterRegistry) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client,
            coordinator: FetchCoordinator::new(),
            registry,
            filter_values: FilterState::new(),
            tx,
            rx,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(HttpTimelineClient::new(config)))
    }

    /// Request the timeline for `subject`. A blank subject changes nothing.
    /// Any in-flight request is superseded: its response will be dropped on
    /// arrival no matter when it lands.
    pub fn submit_query(&mut self, subject: &str) {
        let Some(token) = self.coordinator.request(subject) else {
            return;
        };

        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let subject = subject.trim().to_string();
        tokio::spawn(async move {
            let response = client.fetch_timeline(&subject).await;
            // The receiver only closes when the browser is dropped; a failed
            // send just means nobody is left to care.
            let _ = tx.send(FetchMessage {
                token,
                status: response.status,
                body: response.body,
            });
        });
    }

    /// User cleared the search box: back to idle, results and errors gone,
    /// any outstanding response silently dropped when it arrives.
    pub fn clear_query(&mut self) {
        self.coordinator.reset();
    }

    /// Drain settled responses into the coordinator. Non-blocking.
    pub fn pump(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            self.coordinator.resolve(msg.token, msg.status, &msg.body);
        }
    }

    /// Await the next settled response and apply it. Returns false if it was
    /// stale. Intended for callers that block on completion rather than
    /// polling each frame.
    pub async fn pump_one(&mut self) -> bool {
        match self.rx.recv().await {
            Some(msg) => self.coordinator.resolve(msg.token, msg.status, &msg.body),
            None => false,
        }
    }

    /// Replace one filter slot's value (`None` clears it). Produces a fresh
    /// filter state; snapshots already handed out are unaffected.
    pub fn set_filter_value(&mut self, index: usize, value: Option<FilterValue>) {
        self.filter_values = self.filter_values.with_value(index, value);
    }

    pub fn filter_values(&self) -> &FilterState {
        &self.filter_values
    }

    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    pub fn fetch_state(&self) -> &FetchState {
        self.coordinator.state()
    }

    /// The exact display string for the current error, if any.
    pub fn error_message(&self) -> Option<String> {
        match self.coordinator.state() {
            FetchState::Error(err) => Some(err.to_string()),
            _ => None,
        }
    }

    /// Current output of the query engine: the latest results narrowed by the
    /// current filter state. Empty until a fetch succeeds.
    pub fn visible_tweets(&self) -> Vec<&Tweet> {
        match self.coordinator.state() {
            FetchState::Success { tweets } => {
                query::visible(tweets, &self.filter_values, &self.registry)
            }
            _ => Vec::new(),
        }
    }

    /// Statistics over the full (unfiltered) result set; `None` until a fetch
    /// succeeds.
    pub fn stats(&self) -> Option<TimelineStats> {
        match self.coordinator.state() {
            FetchState::Success { tweets } => Some(TimelineStats::from_tweets(tweets)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::http::TimelineResponse;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    /// Always answers immediately with the same canned response.
    struct CannedClient {
        status: u16,
        body: String,
    }

    #[async_trait]
    impl TimelineClient for CannedClient {
        async fn fetch_timeline(&self, _subject: &str) -> TimelineResponse {
            TimelineResponse {
                status: self.status,
                body: self.body.clone(),
            }
        }
    }

    /// Holds each subject's response until the test releases it, so arrival
    /// order can be scripted independently of request order.
    struct GatedClient {
        gates: Mutex<HashMap<String, oneshot::Receiver<TimelineResponse>>>,
    }

    impl GatedClient {
        fn new() -> (Arc<Self>, GateControl) {
            let client = Arc::new(Self {
                gates: Mutex::new(HashMap::new()),
            });
            (Arc::clone(&client), GateControl { client })
        }
    }

    struct GateControl {
        client: Arc<GatedClient>,
    }

    impl GateControl {
        fn arm(&self, subject: &str) -> oneshot::Sender<TimelineResponse> {
            let (tx, rx) = oneshot::channel();
            self.client
                .gates
                .lock()
                .unwrap()
                .insert(subject.to_string(), rx);
            tx
        }
    }

    #[async_trait]
    impl TimelineClient for GatedClient {
        async fn fetch_timeline(&self, subject: &str) -> TimelineResponse {
            let gate = self.gates.lock().unwrap().remove(subject);
            match gate {
                Some(rx) => rx.await.unwrap_or(TimelineResponse {
                    status: 0,
                    body: String::new(),
                }),
                None => TimelineResponse {
                    status: 404,
                    body: String::new(),
                },
            }
        }
    }

    fn canned(status: u16, body: &str) -> Arc<dyn TimelineClient> {
        Arc::new(CannedClient {
            status,
            body: body.to_string(),
        })
    }

    #[tokio::test]
    async fn test_successful_query_exposes_tweets() {
        let mut browser = TimelineBrowser::new(canned(200, r#"[{"text":"hi #rust"}]"#));
        assert!(browser.visible_tweets().is_empty());

        browser.submit_query("alice");
        assert!(browser.fetch_state().is_fetching());
        assert!(browser.pump_one().await);

        let visible = browser.visible_tweets();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].text, "hi #rust");
        assert!(browser.error_message().is_none());
    }

    #[tokio::test]
    async fn test_blank_subject_stays_idle() {
        let mut browser = TimelineBrowser::new(canned(200, "[]"));
        browser.submit_query("   ");
        assert_eq!(*browser.fetch_state(), FetchState::Idle);
    }

    #[tokio::test]
    async fn test_error_message_for_missing_user() {
        let mut browser = TimelineBrowser::new(canned(404, ""));
        browser.submit_query("nobody");
        browser.pump_one().await;
        assert_eq!(
            browser.error_message().as_deref(),
            Some("No data for this user!")
        );
        assert!(browser.visible_tweets().is_empty());
    }

    #[tokio::test]
    async fn test_late_response_of_superseded_request_is_ignored() {
        let (client, control) = GatedClient::new();
        let alice_gate = control.arm("alice");
        let bob_gate = control.arm("bob");

        let mut browser = TimelineBrowser::new(client);
        browser.submit_query("alice");
        browser.submit_query("bob");

        // Bob's response settles first, then Alice's arrives late.
        bob_gate
            .send(TimelineResponse {
                status: 200,
                body: r#"[{"text":"from bob"}]"#.to_string(),
            })
            .unwrap();
        assert!(browser.pump_one().await);

        alice_gate
            .send(TimelineResponse {
                status: 200,
                body: r#"[{"text":"from alice"}]"#.to_string(),
            })
            .unwrap();
        assert!(!browser.pump_one().await);

        let visible = browser.visible_tweets();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].text, "from bob");
    }

    #[tokio::test]
    async fn test_clear_query_drops_in_flight_response() {
        let (client, control) = GatedClient::new();
        let gate = control.arm("alice");

        let mut browser = TimelineBrowser::new(client);
        browser.submit_query("alice");
        browser.clear_query();
        assert_eq!(*browser.fetch_state(), FetchState::Idle);

        gate.send(TimelineResponse {
            status: 200,
            body: r#"[{"text":"too late"}]"#.to_string(),
        })
        .unwrap();
        assert!(!browser.pump_one().await);
        assert_eq!(*browser.fetch_state(), FetchState::Idle);
        assert!(browser.visible_tweets().is_empty());
    }

    #[tokio::test]
    async fn test_filters_narrow_visible_set() {
        let body = r#"[
            {"text":"keep #rust", "favourite_count": 9},
            {"text":"drop me", "favourite_count": 9},
            {"text":"also #rust but unpopular", "favourite_count": 1}
        ]"#;
        let mut browser = TimelineBrowser::new(canned(200, body));
        browser.submit_query("alice");
        browser.pump_one().await;
        assert_eq!(browser.visible_tweets().len(), 3);

        browser.set_filter_value(6, Some(FilterValue::Text("rust".into())));
        assert_eq!(browser.visible_tweets().len(), 2);

        browser.set_filter_value(
            5,
            Some(FilterValue::IntRange {
                min: Some(5),
                max: None,
            }),
        );
        let visible = browser.visible_tweets();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].text, "keep #rust");

        browser.set_filter_value(6, None);
        assert_eq!(browser.visible_tweets().len(), 2);
    }

    #[tokio::test]
    async fn test_stats_ignore_filters() {
        let body = r##"[{"text":"#a one"},{"text":"#b two"}]"##;
        let mut browser = TimelineBrowser::new(canned(200, body));
        browser.submit_query("alice");
        browser.pump_one().await;

        browser.set_filter_value(6, Some(FilterValue::Text("a".into())));
        assert_eq!(browser.visible_tweets().len(), 1);
        assert_eq!(browser.stats().unwrap().tweet_count, 2);
    }

    #[tokio::test]
    async fn test_stats_absent_before_success() {
        let mut browser = TimelineBrowser::new(canned(503, ""));
        assert!(browser.stats().is_none());
        browser.submit_query("alice");
        browser.pump_one().await;
        assert!(browser.stats().is_none());
        assert_eq!(
            browser.error_message().as_deref(),
            Some("Ooops! Something went wrong while fetching user data from Twitter. (Code 503)")
        );
    }

    #[tokio::test]
    async fn test_pump_drains_all_pending() {
        let mut browser = TimelineBrowser::new(canned(200, r#"[{"text":"x"}]"#));
        browser.submit_query("alice");
        // Wait for the spawned task's message, then pump() should be a no-op
        // against an empty channel.
        assert!(browser.pump_one().await);
        browser.pump();
        assert_eq!(browser.visible_tweets().len(), 1);
    }
}
