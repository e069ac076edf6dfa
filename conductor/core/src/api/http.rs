//! HTTP Companion API
//!
//! reqwest-backed client for the companion backend: one shared
//! `reqwest::Client`, URL helpers per endpoint, and explicit status checks
//! before decoding.
//!
//! The client keeps a cookie store so the session cookie set by the sign-in
//! flow accompanies the auth calls.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::traits::CompanionApi;
use super::{
    ApiError, ChatReply, ChatRequest, ResourceReply, ResourceRequest, StrategyReply,
    StrategyRequest, UserProfile,
};
use crate::config::CompanionConfigFile;

/// HTTP client for the companion backend
#[derive(Clone)]
pub struct HttpCompanionApi {
    /// Base URL including the `/api` prefix, without trailing slash
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpCompanionApi {
    /// Create a new client
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(request_timeout)
            .cookie_store(true)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::default()
            });

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        }
    }

    /// Create from loaded configuration
    #[must_use]
    pub fn from_config(config: &CompanionConfigFile) -> Self {
        Self::new(config.api_base_url.clone(), config.request_timeout)
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Health lives at the service root, outside the `/api` prefix
    fn health_url(&self) -> String {
        let root = self.base_url.strip_suffix("/api").unwrap_or(&self.base_url);
        format!("{root}/health")
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, ApiError>
    where
        Req: Serialize + Sync + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = self.url(path);
        tracing::debug!(url = %url, "POST");

        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;

        Self::decode(response).await
    }

    /// Check status, then decode the body as JSON
    async fn decode<Resp: DeserializeOwned>(response: reqwest::Response) -> Result<Resp, ApiError> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            tracing::warn!(status = status.as_u16(), "Companion API returned error status");
            return Err(ApiError::from_status_body(status.as_u16(), &text));
        }

        serde_json::from_slice(&body).map_err(|e| ApiError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl CompanionApi for HttpCompanionApi {
    fn name(&self) -> &'static str {
        "HTTP"
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "Health check failed");
                false
            }
        }
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        let reply: ChatReply = self.post_json("/chat", request).await?;
        reply.validate()?;
        Ok(reply)
    }

    async fn suggest_resources(
        &self,
        request: &ResourceRequest,
    ) -> Result<ResourceReply, ApiError> {
        self.post_json("/suggest/resources", request).await
    }

    async fn suggest_strategy(
        &self,
        request: &StrategyRequest,
    ) -> Result<StrategyReply, ApiError> {
        self.post_json("/suggest/strategy", request).await
    }

    async fn me(&self) -> Result<Option<UserProfile>, ApiError> {
        let response = self
            .http_client
            .get(self.url("/auth/me"))
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;

        let profile: UserProfile = Self::decode(response).await?;
        Ok((!profile.is_anonymous()).then_some(profile))
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let response = self
            .http_client
            .post(self.url("/auth/logout"))
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status_body(status.as_u16(), &body))
        }
    }

    fn login_url(&self) -> String {
        self.url("/auth/google")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let api = HttpCompanionApi::new("http://127.0.0.1:8000/api/", Duration::from_secs(5));
        assert_eq!(api.base_url(), "http://127.0.0.1:8000/api");
        assert_eq!(api.url("/chat"), "http://127.0.0.1:8000/api/chat");
        assert_eq!(api.health_url(), "http://127.0.0.1:8000/health");
        assert_eq!(api.login_url(), "http://127.0.0.1:8000/api/auth/google");
    }

    #[test]
    fn test_health_url_without_api_prefix() {
        let api = HttpCompanionApi::new("http://localhost:9000", Duration::from_secs(5));
        assert_eq!(api.health_url(), "http://localhost:9000/health");
    }
}
