//! Session Authentication
//!
//! The companion works anonymously; signing in only personalises the greeting.
//! The session check is therefore time-bounded and abortable: if `GET /auth/me`
//! has not answered within the timeout (8 seconds by default) or the caller
//! cancels, the session is treated as unauthenticated.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::api::{ApiError, CompanionApi, UserProfile};

/// Default bound on the session check
pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(8);

/// Authentication status
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthStatus {
    /// Check not finished yet
    #[default]
    Checking,
    /// Signed in
    SignedIn(UserProfile),
    /// Not signed in (or the check failed/timed out)
    Anonymous,
}

impl AuthStatus {
    /// Whether a user is signed in
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }

    /// Signed-in profile, if any
    #[must_use]
    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            Self::SignedIn(profile) => Some(profile),
            Self::Checking | Self::Anonymous => None,
        }
    }
}

/// Ask the backend who is signed in
///
/// # Errors
///
/// Returns [`ApiError::Timeout`] when `timeout` elapses first and
/// [`ApiError::Cancelled`] when `cancel` fires; transport errors pass through.
pub async fn fetch_profile<A: CompanionApi + ?Sized>(
    api: &A,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Option<UserProfile>, ApiError> {
    tokio::select! {
        () = cancel.cancelled() => Err(ApiError::Cancelled),
        result = tokio::time::timeout(timeout, api.me()) => match result {
            Ok(inner) => inner,
            Err(_) => Err(ApiError::Timeout),
        },
    }
}

/// Resolve the session status, degrading every failure to anonymous
pub async fn check_session<A: CompanionApi + ?Sized>(
    api: &A,
    timeout: Duration,
    cancel: &CancellationToken,
) -> AuthStatus {
    match fetch_profile(api, timeout, cancel).await {
        Ok(Some(profile)) => {
            tracing::info!(user = ?profile.display_name(), "Signed in");
            AuthStatus::SignedIn(profile)
        }
        Ok(None) => AuthStatus::Anonymous,
        Err(e) => {
            tracing::warn!(error = %e, "Session check failed, continuing anonymously");
            AuthStatus::Anonymous
        }
    }
}
