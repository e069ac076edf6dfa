//! Companion API Trait
//!
//! Abstraction over the backend so the conductor can be driven by the HTTP
//! client in production and by scripted mocks in tests.

use async_trait::async_trait;

use super::{
    ApiError, ChatReply, ChatRequest, ResourceReply, ResourceRequest, StrategyReply,
    StrategyRequest, UserProfile,
};

/// Companion backend
///
/// Implementations handle transport details (base URL, cookies, timeouts) and
/// must normalise every failure into an [`ApiError`].
#[async_trait]
pub trait CompanionApi: Send + Sync {
    /// Get the backend name (e.g., "HTTP")
    fn name(&self) -> &str;

    /// Check if the backend is healthy and reachable
    async fn health_check(&self) -> bool;

    /// Run one chat exchange
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError>;

    /// Ask for resource suggestions
    async fn suggest_resources(
        &self,
        request: &ResourceRequest,
    ) -> Result<ResourceReply, ApiError>;

    /// Ask for an alternative strategy
    async fn suggest_strategy(&self, request: &StrategyRequest)
        -> Result<StrategyReply, ApiError>;

    /// Current signed-in user, `None` when anonymous
    async fn me(&self) -> Result<Option<UserProfile>, ApiError>;

    /// End the server-side session
    async fn logout(&self) -> Result<(), ApiError>;

    /// URL that starts the browser sign-in flow
    fn login_url(&self) -> String;
}
