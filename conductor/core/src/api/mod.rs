//! Companion API
//!
//! Typed access to the companion backend through a common trait, so the
//! conductor can run against the real HTTP service or an in-process mock.
//!
//! # Endpoints
//!
//! All paths are relative to the configured base (default `.../api`):
//! - `POST /chat` - one exchange: mood, strategy, encouragement, safety
//! - `POST /suggest/resources` - ranked videos/articles/books
//! - `POST /suggest/strategy` - an alternative micro-step
//! - `GET /auth/me`, `GET /auth/google`, `POST /auth/logout` - session lifecycle
//!
//! # Usage
//!
//! ```ignore
//! use companion_core::api::{ChatRequest, CompanionApi, HttpCompanionApi};
//!
//! let api = HttpCompanionApi::new("http://127.0.0.1:8000/api", Duration::from_secs(30));
//! let reply = api.chat(&ChatRequest::new("I feel hopeless", "user-1")).await?;
//! ```

mod error;
mod http;
mod traits;
mod types;

pub use error::ApiError;
pub use http::HttpCompanionApi;
pub use traits::CompanionApi;
pub use types::{
    ChatReply, ChatRequest, HistoryTurn, ResourceReply, ResourceRequest, StrategyReply,
    StrategyRequest, UserProfile,
};

use serde::{Deserialize, Deserializer};

/// Deserialize a possibly-null string as an owned string (null → "")
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize an optional string, treating blank values as absent
pub(crate) fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}
