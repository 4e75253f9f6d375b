//! openFDA report fetching
//!
//! One GET per query, no retries. Every failure is folded into
//! `FetchOutcome::Unavailable` and logged here; nothing is raised to the
//! caller.

use super::query_builder::request_url;
use crate::config::OpenFdaConfig;
use crate::errors::{AppError, Result};
use crate::metrics;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

/// Three-way result of a report fetch
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The API answered with a document
    Found(Value),
    /// The API answered "not found": a valid, empty result
    Empty,
    /// Transport or protocol failure
    Unavailable(String),
}

impl FetchOutcome {
    /// Document handed to the compactor; `None` only when unavailable
    pub fn into_document(self) -> Option<Value> {
        match self {
            FetchOutcome::Found(doc) => Some(doc),
            FetchOutcome::Empty => Some(empty_document()),
            FetchOutcome::Unavailable(_) => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            FetchOutcome::Found(_) => "found",
            FetchOutcome::Empty => "empty",
            FetchOutcome::Unavailable(_) => "unavailable",
        }
    }
}

/// Canonical zero-match document, shaped like a real openFDA response
pub fn empty_document() -> Value {
    json!({"meta": {"results": {"total": 0}}, "results": []})
}

/// Source of raw adverse-event documents
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Run one query string (possibly empty) against the reporting API
    async fn fetch(&self, query: &str) -> FetchOutcome;
}

// Sessions opened and released on this thread
#[cfg(test)]
thread_local! {
    static SESSION_COUNTS: std::cell::Cell<(usize, usize)> = const { std::cell::Cell::new((0, 0)) };
}

/// Transport session scoped to a single fetch. Released on drop.
struct FdaSession {
    client: reqwest::Client,
}

impl FdaSession {
    fn open(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        tracing::debug!(timeout_secs = timeout.as_secs(), "openFDA session opened");
        #[cfg(test)]
        SESSION_COUNTS.with(|c| {
            let (opened, released) = c.get();
            c.set((opened + 1, released));
        });
        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<FetchOutcome> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            tracing::info!("No records found for query");
            return Ok(FetchOutcome::Empty);
        }

        if !status.is_success() {
            return Err(AppError::OpenFda {
                message: format!("HTTP {}", status),
            });
        }

        Ok(FetchOutcome::Found(response.json::<Value>().await?))
    }
}

impl Drop for FdaSession {
    fn drop(&mut self) {
        tracing::debug!("openFDA session released");
        #[cfg(test)]
        SESSION_COUNTS.with(|c| {
            let (opened, released) = c.get();
            c.set((opened, released + 1));
        });
    }
}

/// openFDA food adverse-event client
pub struct OpenFdaClient {
    base_url: String,
    timeout: Duration,
}

impl OpenFdaClient {
    pub fn new(config: &OpenFdaConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
        }
    }
}

#[async_trait]
impl ReportSource for OpenFdaClient {
    async fn fetch(&self, query: &str) -> FetchOutcome {
        let url = request_url(&self.base_url, query);
        tracing::info!(url = %url, "Querying openFDA");

        let start = Instant::now();
        let result = match FdaSession::open(self.timeout) {
            Ok(session) => session.get(&url).await,
            Err(e) => Err(e),
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, url = %url, "openFDA request failed");
                FetchOutcome::Unavailable(e.to_string())
            }
        };

        metrics::record_openfda(start.elapsed().as_secs_f64(), outcome.label());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Sessions opened and released by this test so far
    fn session_counts() -> (usize, usize) {
        SESSION_COUNTS.with(|c| c.get())
    }

    fn client_for(server: &MockServer) -> OpenFdaClient {
        OpenFdaClient::new(&OpenFdaConfig {
            base_url: format!("{}/food/event.json", server.uri()),
            timeout_secs: 2,
        })
    }

    #[tokio::test]
    async fn test_found_document() {
        let server = MockServer::start().await;
        let body = json!({"meta": {"results": {"total": 3}}, "results": [{"report_number": "1"}]});

        Mock::given(method("GET"))
            .and(path("/food/event.json"))
            .and(query_param("limit", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client_for(&server).fetch(r#"search=reactions:"NAUSEA"&limit=50"#).await;
        assert_eq!(outcome, FetchOutcome::Found(body));
        assert_eq!(session_counts(), (1, 1));
    }

    #[tokio::test]
    async fn test_not_found_is_empty_result() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": "NOT_FOUND", "message": "No matches found!"}
            })))
            .mount(&server)
            .await;

        let outcome = client_for(&server).fetch("search=x&limit=50").await;
        assert_eq!(outcome, FetchOutcome::Empty);
        assert_eq!(session_counts(), (1, 1));
        assert_eq!(
            outcome.into_document(),
            Some(json!({"meta": {"results": {"total": 0}}, "results": []}))
        );
    }

    #[tokio::test]
    async fn test_other_status_is_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let outcome = client_for(&server).fetch("search=x&limit=50").await;
        assert!(matches!(outcome, FetchOutcome::Unavailable(ref m) if m.contains("500")));
        assert_eq!(session_counts(), (1, 1));
        assert_eq!(outcome.into_document(), None);
    }

    #[tokio::test]
    async fn test_malformed_body_is_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let outcome = client_for(&server).fetch("").await;
        assert!(matches!(outcome, FetchOutcome::Unavailable(_)));
        assert_eq!(session_counts(), (1, 1));
    }

    #[tokio::test]
    async fn test_empty_query_sends_no_parameters() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/food/event.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(empty_document()))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client_for(&server).fetch("").await;
        assert!(matches!(outcome, FetchOutcome::Found(_)));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), None);
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(empty_document())
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = OpenFdaClient {
            base_url: server.uri(),
            timeout: Duration::from_millis(200),
        };
        assert!(matches!(client.fetch("").await, FetchOutcome::Unavailable(_)));
        assert_eq!(session_counts(), (1, 1));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_unavailable() {
        let client = OpenFdaClient {
            base_url: "http://127.0.0.1:1/food/event.json".to_string(),
            timeout: Duration::from_secs(1),
        };
        assert!(matches!(client.fetch("").await, FetchOutcome::Unavailable(_)));
        assert_eq!(session_counts(), (1, 1));
    }
}
