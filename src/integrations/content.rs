//! Remote content service client.
//!
//! The content service generates post text from a profile and accepts
//! scheduling requests. Only the client side of the contract lives here.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::Profile;
use crate::workflow::ScheduleRequest;

/// Route: POST /generate_post
pub const GENERATE_POST: &str = "/generate_post";

/// Route: POST /schedule_post
pub const SCHEDULE_POST: &str = "/schedule_post";

/// Route: POST /analyze_profile
pub const ANALYZE_PROFILE: &str = "/analyze_profile";

/// Error type for content service calls.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Transport-level failure (connection refused, DNS, TLS).
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// The request did not finish within the configured timeout.
    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The service answered with a non-success status.
    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// The response lacked a required field.
    #[error("Response is missing the '{0}' field")]
    MissingField(&'static str),

    /// The client could not be built.
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

/// Result type for content service calls.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Confirmation returned by a successful scheduling call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfirmation {
    /// Optional status text echoed by the service
    #[serde(default)]
    pub status: Option<String>,
}

/// Client-side contract with the content service.
#[async_trait]
pub trait ContentService: Send + Sync {
    /// Generate post text for a profile.
    async fn generate_post(&self, profile: &Profile) -> ServiceResult<String>;

    /// Ask the service to publish content at a future time.
    async fn schedule_post(&self, request: &ScheduleRequest) -> ServiceResult<ScheduleConfirmation>;

    /// Summarize a profile.
    async fn analyze_profile(&self, profile: &Profile) -> ServiceResult<String>;

    /// Service name for display.
    fn name(&self) -> &str;
}

/// Response body of `POST /generate_post`.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    post_content: Option<String>,
}

/// Response body of `POST /analyze_profile`.
#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    summary: Option<String>,
}

/// HTTP implementation of the content service contract.
#[derive(Debug, Clone)]
pub struct HttpContentService {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpContentService {
    /// Create a client for a service base URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ServiceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("brandpost/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ServiceError::Config(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ServiceError::Config("service base URL is empty".to_string()));
        }

        Ok(Self { client, base_url, timeout })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    fn map_transport(&self, err: reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            ServiceError::Timeout(self.timeout)
        } else {
            ServiceError::Http(err)
        }
    }

    /// Send a prepared request and return the successful response.
    async fn send(&self, request: reqwest::RequestBuilder) -> ServiceResult<reqwest::Response> {
        let response = request.send().await.map_err(|e| self.map_transport(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status { status, body });
        }

        Ok(response)
    }

    /// Read a JSON body, distinguishing timeouts from malformed payloads.
    async fn json<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ServiceResult<T> {
        let bytes = response.bytes().await.map_err(|e| self.map_transport(e))?;
        serde_json::from_slice(&bytes).map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ContentService for HttpContentService {
    async fn generate_post(&self, profile: &Profile) -> ServiceResult<String> {
        tracing::info!(user = %profile.user_id, "Requesting post generation");

        let response = self.send(self.client.post(self.url(GENERATE_POST)).json(profile)).await?;
        let body: GenerateResponse = self.json(response).await?;

        body.post_content.ok_or(ServiceError::MissingField("post_content"))
    }

    async fn schedule_post(&self, request: &ScheduleRequest) -> ServiceResult<ScheduleConfirmation> {
        tracing::info!(
            user = %request.user_id,
            scheduled_time = %request.scheduled_time,
            "Requesting post scheduling"
        );

        // user_id is also read from the query string.
        let builder = self
            .client
            .post(self.url(SCHEDULE_POST))
            .query(&[("user_id", request.user_id.as_str())])
            .json(request);
        let response = self.send(builder).await?;

        // Any 2xx is a confirmation; the body is optional.
        let bytes = response.bytes().await.map_err(|e| self.map_transport(e))?;
        Ok(serde_json::from_slice(&bytes).unwrap_or_default())
    }

    async fn analyze_profile(&self, profile: &Profile) -> ServiceResult<String> {
        tracing::info!(user = %profile.user_id, "Requesting profile analysis");

        let response = self.send(self.client.post(self.url(ANALYZE_PROFILE)).json(profile)).await?;
        let body: AnalyzeResponse = self.json(response).await?;

        body.summary.ok_or(ServiceError::MissingField("summary"))
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let service =
            HttpContentService::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(service.base_url(), "http://localhost:8000");
        assert_eq!(service.url(GENERATE_POST), "http://localhost:8000/generate_post");
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let result = HttpContentService::new("", Duration::from_secs(5));
        assert!(matches!(result, Err(ServiceError::Config(_))));
    }

    #[test]
    fn test_generate_response_missing_field() {
        let body: GenerateResponse = serde_json::from_str(r#"{"other": 1}"#).unwrap();
        assert!(body.post_content.is_none());

        let body: GenerateResponse = serde_json::from_str(r#"{"post_content": null}"#).unwrap();
        assert!(body.post_content.is_none());
    }

    #[test]
    fn test_confirmation_status_is_optional() {
        let confirmation: ScheduleConfirmation = serde_json::from_str("{}").unwrap();
        assert!(confirmation.status.is_none());

        let confirmation: ScheduleConfirmation =
            serde_json::from_str(r#"{"status": "Post scheduled"}"#).unwrap();
        assert_eq!(confirmation.status.as_deref(), Some("Post scheduled"));
    }

    #[test]
    fn test_error_messages() {
        let err = ServiceError::Status { status: 503, body: "busy".to_string() };
        assert_eq!(err.to_string(), "Service returned 503: busy");

        let err = ServiceError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "Request timed out after 30s");

        let err = ServiceError::MissingField("post_content");
        assert_eq!(err.to_string(), "Response is missing the 'post_content' field");
    }
}
