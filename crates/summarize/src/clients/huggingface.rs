use crate::config::Config;
use crate::summarization::{Summarization, SummarizationRequest, SummarizationResponse};
use crate::{Error, Result};
use async_trait::async_trait;
use derive_builder::Builder;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

pub use crate::config::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Client for the Hugging Face hosted inference endpoint.
///
/// Each call is a single POST to `{base_url}/models/{model}`. There is no retry,
/// caching or deduplication; concurrent calls are independent.
#[derive(Debug, Clone, Builder)]
#[builder(derive(Debug))]
#[builder(setter(into))]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Client {
    #[builder(default)]
    http_client: reqwest::Client,
    #[builder(default = "DEFAULT_BASE_URL.to_string()")]
    base_url: String,
    #[builder(default = "DEFAULT_MODEL.to_string()")]
    model: String,
    api_key: SecretString,
}

impl ClientBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        match &self.api_key {
            Some(api_key) => crate::config::validate_api_key(api_key).map_err(|e| e.to_string()),
            None => Ok(()),
        }
    }
}

impl Client {
    pub fn new(api_key: &str) -> Result<Self> {
        Self::from_config(&Config::new(api_key)?)
    }

    pub fn from_url(api_key: &str, base_url: &str) -> Result<Self> {
        let mut config = Config::new(api_key)?;
        config.base_url = base_url.to_string();
        Self::from_config(&config)
    }

    /// Reads the credential from `HF_TOKEN` (and optional overrides, see [`Config::from_env`]).
    pub fn from_env() -> Result<Self> {
        Self::from_config(&Config::from_env()?)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        crate::config::validate_api_key(&config.api_key)?;

        let mut http_client = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            http_client = http_client.timeout(timeout);
        }

        Ok(Self {
            http_client: http_client.build()?,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}",
            crate::utils::uri::ensure_no_trailing_slash(&*self.base_url),
            self.model
        )
    }

    async fn send(&self, request: &SummarizationRequest) -> Result<SummarizationResponse> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&format!(
                "Bearer {}",
                self.api_key.expose_secret()
            ))
            .map_err(|e| {
                Error::InvalidHeaderValue(reqwest::header::AUTHORIZATION.to_string(), e)
            })?,
        );
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let url = self.endpoint();
        debug!(
            model = %self.model,
            url = %url,
            max_length = request.parameters.max_length,
            min_length = request.parameters.min_length,
            input_len = request.inputs.len(),
            "sending summarization request"
        );

        let response = self
            .http_client
            .post(url)
            .headers(headers)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = status.as_u16(), "summarization request failed");
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Unauthorized {
                    status: status.as_u16(),
                    body,
                },
                _ => Error::ServiceError {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let body = response.bytes().await?;
        debug!(
            status = status.as_u16(),
            body_len = body.len(),
            "received summarization response"
        );

        SummarizationResponse::from_slice(&body).inspect_err(|e| {
            warn!(error = %e, "summarization response did not match the expected contract");
        })
    }
}

#[async_trait]
impl Summarization for Client {
    async fn summarize(&self, request: &SummarizationRequest) -> Result<SummarizationResponse> {
        match &request.cancellation_token {
            Some(token) => {
                tokio::select! {
                    _ = token.cancelled() => {
                        debug!("summarization request cancelled");
                        Err(Error::Cancelled)
                    }
                    result = self.send(request) => result,
                }
            }
            None => self.send(request).await,
        }
    }
}

impl super::Client for Client {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::summarization::SummarizationRequestBuilder;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    const MODEL_PATH: &str = "/models/facebook/bart-large-cnn";

    fn client_for(server: &MockServer) -> Client {
        Client::from_url("hf_test_token", &server.base_url()).unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_summary() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(MODEL_PATH)
                    .header("authorization", "Bearer hf_test_token")
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "inputs": "The quick brown fox jumps over the lazy dog.",
                        "parameters": {
                            "max_length": 150,
                            "min_length": 30,
                            "do_sample": false
                        }
                    }));
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"[{"summary_text": "A fox jumps over a dog."}]"#);
            })
            .await;

        let client = client_for(&server);
        let summary = client
            .summarize_text("The quick brown fox jumps over the lazy dog.", 150, 30)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(summary, "A fox jumps over a dog.");
    }

    #[tokio::test]
    async fn test_returns_summary_text_exactly() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH);
                then.status(200).body(r#"[{"summary_text": "X"}]"#);
            })
            .await;

        let summary = client_for(&server)
            .summarize_text("anything", 150, 30)
            .await
            .unwrap();
        assert_eq!(summary, "X");
    }

    #[tokio::test]
    async fn test_inverted_lengths_are_submitted_as_is() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH).json_body(json!({
                    "inputs": "text",
                    "parameters": {
                        "max_length": 50,
                        "min_length": 200,
                        "do_sample": false
                    }
                }));
                then.status(200).body(r#"[{"summary_text": "short"}]"#);
            })
            .await;

        let result = client_for(&server).summarize_text("text", 50, 200).await;

        mock.assert_async().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_missing_summary_text() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH);
                then.status(200).body(r#"[{"generated_text": "X"}]"#);
            })
            .await;

        let err = client_for(&server)
            .summarize_text("text", 150, 30)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingSummaryText));
        assert_eq!(err.kind(), crate::ErrorKind::ResponseFormat);
    }

    #[tokio::test]
    async fn test_invalid_utf8_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH);
                then.status(200).body(vec![0x5b, 0xff, 0xfe, 0x5d]);
            })
            .await;

        let err = client_for(&server)
            .summarize_text("text", 150, 30)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUtf8(_)));
    }

    #[tokio::test]
    async fn test_malformed_json_and_empty_array() {
        let server = MockServer::start_async().await;
        let malformed = server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH);
                then.status(200).body("not json");
            })
            .await;

        let client = client_for(&server);
        let err = client.summarize_text("text", 150, 30).await.unwrap_err();
        assert!(matches!(err, Error::InvalidJson(_)));

        malformed.delete_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH);
                then.status(200).body("[]");
            })
            .await;

        let err = client.summarize_text("text", 150, 30).await.unwrap_err();
        assert!(matches!(err, Error::EmptyResponse));
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH);
                then.status(401).body(r#"{"error":"Invalid credentials in Authorization header"}"#);
            })
            .await;

        let err = client_for(&server)
            .summarize_text("text", 150, 30)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized { status: 401, .. }));
        assert_eq!(err.kind(), crate::ErrorKind::Configuration);
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_forbidden_is_unauthorized() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH);
                then.status(403).body(r#"{"error":"Token does not have access to this model"}"#);
            })
            .await;

        let err = client_for(&server)
            .summarize_text("text", 150, 30)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized { status: 403, .. }));
        assert_eq!(err.kind(), crate::ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_service_error_is_retryable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH);
                then.status(503)
                    .body(r#"{"error":"Model facebook/bart-large-cnn is currently loading","estimated_time":20.0}"#);
            })
            .await;

        let err = client_for(&server)
            .summarize_text("text", 150, 30)
            .await
            .unwrap_err();
        match &err {
            Error::ServiceError { status, body } => {
                assert_eq!(*status, 503);
                assert!(body.contains("currently loading"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_timeout_is_a_transport_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH);
                then.status(200)
                    .delay(Duration::from_millis(500))
                    .body(r#"[{"summary_text": "late"}]"#);
            })
            .await;

        let mut config = Config::new("hf_test_token").unwrap();
        config.base_url = server.base_url();
        config.timeout = Some(Duration::from_millis(50));
        let client = Client::from_config(&config).unwrap();

        let err = client.summarize_text("text", 150, 30).await.unwrap_err();
        assert!(matches!(err, Error::ReqwestError(ref e) if e.is_timeout()));
        assert_eq!(err.kind(), crate::ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_cancellation() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH);
                then.status(200)
                    .delay(Duration::from_secs(5))
                    .body(r#"[{"summary_text": "never seen"}]"#);
            })
            .await;

        let token = CancellationToken::new();
        let request = SummarizationRequestBuilder::default()
            .inputs("text")
            .cancellation_token(token.clone())
            .build()
            .unwrap();

        tokio::spawn({
            let token = token.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                token.cancel();
            }
        });

        let err = client_for(&server).summarize(&request).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[test]
    fn test_endpoint_and_builder() {
        let client = ClientBuilder::default()
            .api_key("hf_test_token")
            .base_url("http://localhost:8080/")
            .model("google/pegasus-xsum")
            .build()
            .unwrap();

        assert_eq!(client.model(), "google/pegasus-xsum");
        assert_eq!(
            client.endpoint(),
            "http://localhost:8080/models/google/pegasus-xsum"
        );
    }

    #[tokio::test]
    async fn test_builder_rejects_blank_credential_before_any_call() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH);
                then.status(200).body(r#"[{"summary_text": "X"}]"#);
            })
            .await;

        assert!(ClientBuilder::default()
            .api_key("")
            .base_url(server.base_url())
            .build()
            .is_err());
        assert!(ClientBuilder::default()
            .api_key(" hf_padded ")
            .build()
            .is_err());
        assert!(ClientBuilder::default().build().is_err());

        mock.assert_hits_async(0).await;
    }

    #[test]
    fn test_blank_credential_is_rejected_before_any_call() {
        let err = Client::new("").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Configuration);
    }
}
