// # HTTP Spec Source
//
// This crate fetches OpenAPI documents over HTTP for the typesync system.
//
// ## Behavior
//
// - One GET request per pipeline run, no caching between runs
// - Non-success statuses are reported with the status code and a
//   truncated response body for diagnosis
// - Network failures (refused, timed out, DNS) surface as fetch errors;
//   all fetch errors are recoverable and leave the previous artifact
//   in place

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use typesync_core::error::{Error, Result};
use typesync_core::traits::SpecSource;

/// Request timeout applied to each fetch
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Longest response body prefix carried inside a fetch error
const ERROR_BODY_LIMIT: usize = 512;

/// HTTP-based OpenAPI spec source
pub struct HttpSpecSource {
    /// Absolute URL of the OpenAPI document
    url: String,

    /// HTTP client, reused across runs
    client: reqwest::Client,
}

impl HttpSpecSource {
    /// Create a new HTTP spec source
    ///
    /// # Parameters
    ///
    /// - `url`: URL of the OpenAPI document (e.g., "http://localhost:3000/api-json")
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl SpecSource for HttpSpecSource {
    async fn fetch(&self) -> Result<serde_json::Value> {
        debug!(url = %self.url, "Fetching OpenAPI document");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|err| Error::fetch(format!("Request to {} failed: {}", self.url, err)))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            body.truncate(ERROR_BODY_LIMIT);
            return Err(Error::fetch_response(
                format!("Spec source {} returned {}", self.url, status),
                status.as_u16(),
                body,
            ));
        }

        let document = response
            .json::<serde_json::Value>()
            .await
            .map_err(|err| Error::fetch(format!("Invalid JSON from {}: {}", self.url, err)))?;

        Ok(document)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetches_a_json_document() {
        let server = MockServer::start().await;
        let document = json!({ "openapi": "3.0.0", "paths": {} });

        Mock::given(method("GET"))
            .and(path("/api-json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(document.clone()))
            .mount(&server)
            .await;

        let source = HttpSpecSource::new(format!("{}/api-json", server.uri()));
        let fetched = source.fetch().await.unwrap();
        assert_eq!(fetched, document);
    }

    #[tokio::test]
    async fn error_status_captures_status_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api-json"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal server error"))
            .mount(&server)
            .await;

        let source = HttpSpecSource::new(format!("{}/api-json", server.uri()));
        let err = source.fetch().await.unwrap_err();

        match err {
            Error::Fetch { status, body, .. } => {
                assert_eq!(status, Some(500));
                assert_eq!(body.as_deref(), Some("internal server error"));
            }
            other => panic!("expected fetch error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_body_is_a_fetch_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api-json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let source = HttpSpecSource::new(format!("{}/api-json", server.uri()));
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, Error::Fetch { status: None, .. }), "{err:?}");
    }

    #[tokio::test]
    async fn unreachable_host_is_a_fetch_error() {
        // Port 9 (discard) is reserved and closed in test environments
        let source = HttpSpecSource::new("http://127.0.0.1:9/api-json".to_string());
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, Error::Fetch { status: None, .. }), "{err:?}");
    }
}
