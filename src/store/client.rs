use async_trait::async_trait;
use reqwest::redirect::Policy;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::types::{StoreError, StoreWrite};
use crate::util::read_limited_text;

/// Cap on response bodies from the endpoint (1 MiB).
const MAX_RESPONSE_SIZE: usize = 1024 * 1024;

/// Raw combined state as returned by the endpoint's GET.
///
/// Both halves are kept as untyped JSON: a missing or wrong-shaped field is
/// a signal to fall back to defaults, which the repository decides per field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RemotePayload {
    pub profile: Option<serde_json::Value>,
    pub links: Option<serde_json::Value>,
}

/// Transport seam to the durable store.
///
/// Two verbs only: read everything, or overwrite one record.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the combined state. `Err(StoreError::NotConfigured)` when there
    /// is no endpoint.
    async fn fetch(&self) -> Result<RemotePayload, StoreError>;

    /// Overwrite one record. Never retried.
    async fn save(&self, write: &StoreWrite) -> Result<(), StoreError>;
}

/// Create the HTTP client used for the endpoint.
///
/// Script hosts answer POSTs with a redirect to the result page, so redirects
/// are followed, but capped at 5 hops with loop detection.
pub fn build_http_client() -> Result<reqwest::Client, StoreError> {
    let policy = Policy::custom(|attempt| {
        if attempt.previous().len() >= 5 {
            return attempt.error("Too many redirects (max 5)");
        }

        let url = attempt.url();
        for prev in attempt.previous() {
            if prev.as_str() == url.as_str() {
                return attempt.error("Redirect loop detected");
            }
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    });

    Ok(reqwest::Client::builder().redirect(policy).build()?)
}

/// Client for the spreadsheet-backed web endpoint.
///
/// GET returns `{ profile, links }`; POST takes `{ action, data }`.
#[derive(Clone)]
pub struct SheetClient {
    client: reqwest::Client,
    endpoint: Option<Url>,
    timeout: Duration,
}

impl SheetClient {
    pub fn new(client: reqwest::Client, endpoint: Option<Url>, timeout: Duration) -> Self {
        Self {
            client,
            endpoint,
            timeout,
        }
    }

    /// A client with no endpoint: every call reports `NotConfigured`.
    pub fn unconfigured() -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: None,
            timeout: Duration::from_secs(20),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    fn endpoint(&self) -> Result<&Url, StoreError> {
        self.endpoint.as_ref().ok_or(StoreError::NotConfigured)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, StoreError> {
        let exchange = async {
            let response = request.send().await?;
            if !response.status().is_success() {
                return Err(StoreError::HttpStatus(response.status().as_u16()));
            }
            Ok(read_limited_text(response, MAX_RESPONSE_SIZE).await?)
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout.as_secs()))?
    }
}

#[async_trait]
impl RemoteStore for SheetClient {
    async fn fetch(&self) -> Result<RemotePayload, StoreError> {
        let endpoint = self.endpoint()?;
        let body = self.send(self.client.get(endpoint.clone())).await?;

        serde_json::from_str(&body).map_err(|e| StoreError::MalformedPayload(e.to_string()))
    }

    async fn save(&self, write: &StoreWrite) -> Result<(), StoreError> {
        let endpoint = self.endpoint()?;
        let body = write
            .to_body()
            .map_err(|e| StoreError::MalformedPayload(e.to_string()))?;

        // text/plain keeps the request "simple" so script hosts accept it without a preflight
        let request = self
            .client
            .post(endpoint.clone())
            .header("Content-Type", "text/plain;charset=utf-8")
            .body(body);

        let reply = self.send(request).await?;

        // Any JSON reply counts as success; anything else means the script did not run
        serde_json::from_str::<serde_json::Value>(&reply)
            .map_err(|e| StoreError::MalformedPayload(e.to_string()))?;

        tracing::debug!(action = write.kind().action(), "Remote write accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::{default_links, Profile};
    use wiremock::matchers::{body_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SheetClient {
        let url = Url::parse(&server.uri()).unwrap();
        SheetClient::new(
            build_http_client().unwrap(),
            Some(url),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_fetch_combined_state() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"profile": {"name": "X"}, "links": []}"#,
            ))
            .mount(&mock_server)
            .await;

        let payload = client_for(&mock_server).fetch().await.unwrap();
        assert_eq!(payload.profile.unwrap()["name"], "X");
        assert_eq!(payload.links, Some(serde_json::json!([])));
    }

    #[tokio::test]
    async fn test_fetch_tolerates_missing_fields() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&mock_server)
            .await;

        let payload = client_for(&mock_server).fetch().await.unwrap();
        assert_eq!(payload, RemotePayload::default());
    }

    #[tokio::test]
    async fn test_fetch_non_json_is_malformed() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).fetch().await;
        assert!(matches!(result, Err(StoreError::MalformedPayload(_))));
    }

    #[tokio::test]
    async fn test_fetch_http_500() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).fetch().await;
        assert!(matches!(result, Err(StoreError::HttpStatus(500))));
    }

    #[tokio::test]
    async fn test_save_posts_action_envelope() {
        let mock_server = MockServer::start().await;
        let links = default_links();
        Mock::given(method("POST"))
            .and(header("Content-Type", "text/plain;charset=utf-8"))
            .and(body_json(serde_json::json!({
                "action": "saveLinks",
                "data": serde_json::to_value(&links).unwrap(),
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status":"ok"}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        client_for(&mock_server)
            .save(&StoreWrite::Links(links))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_save_non_success_is_error_and_not_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server)
            .save(&StoreWrite::Profile(Profile::default()))
            .await;
        assert!(matches!(result, Err(StoreError::HttpStatus(503))));
    }

    #[tokio::test]
    async fn test_save_requires_json_reply() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server)
            .save(&StoreWrite::Profile(Profile::default()))
            .await;
        assert!(matches!(result, Err(StoreError::MalformedPayload(_))));
    }

    #[tokio::test]
    async fn test_oversized_response_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(MAX_RESPONSE_SIZE + 1)))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).fetch().await;
        assert!(matches!(result, Err(StoreError::ResponseTooLarge(_))));
    }

    #[tokio::test]
    async fn test_unconfigured_short_circuits() {
        let client = SheetClient::unconfigured();
        assert!(!client.is_configured());
        assert!(matches!(client.fetch().await, Err(StoreError::NotConfigured)));
        assert!(matches!(
            client.save(&StoreWrite::Links(Vec::new())).await,
            Err(StoreError::NotConfigured)
        ));
    }
}
