use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;

/// Raw outcome of one timeline request: the HTTP status plus the unparsed
/// body. A transport failure that never produced a status is reported as
/// status 0 with an empty body.
#[derive(Debug, Clone)]
pub struct TimelineResponse {
    pub status: u16,
    pub body: String,
}

/// Seam between the coordinator and the network. Tests swap in stub clients
/// to script statuses, bodies, and arrival order.
#[async_trait]
pub trait TimelineClient: Send + Sync {
    async fn fetch_timeline(&self, subject: &str) -> TimelineResponse;
}

/// Fetches timelines from the remote service over HTTP:
/// `GET {service_url}?u=<url-encoded subject>`.
pub struct HttpTimelineClient {
    service_url: String,
    client: reqwest::Client,
}

impl HttpTimelineClient {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            service_url: config.service_url.clone(),
            client,
        }
    }

    fn request_url(&self, subject: &str) -> String {
        format!("{}?u={}", self.service_url, urlencoding::encode(subject))
    }
}

#[async_trait]
impl TimelineClient for HttpTimelineClient {
    async fn fetch_timeline(&self, subject: &str) -> TimelineResponse {
        let url = self.request_url(subject);

        let response = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(err) => {
                tracing::warn!(%err, subject, "timeline request failed before a status arrived");
                return TimelineResponse {
                    status: 0,
                    body: String::new(),
                };
            }
        };

        let status = response.status().as_u16();
        // An unreadable body on a success status ends up as a malformed-body
        // failure downstream; on error statuses the body is unused anyway.
        let body = response.text().await.unwrap_or_default();

        TimelineResponse { status, body }
    }
}
