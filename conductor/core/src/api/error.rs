//! API error taxonomy
//!
//! Every failure at the call boundary is normalised into one of these so the
//! session can turn it into a single human-readable chat line.

use thiserror::Error;

/// Errors from the companion API
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The service could not be reached
    #[error("could not reach the companion service ({0})")]
    Network(String),

    /// The request did not complete in time
    #[error("the companion service took too long to answer")]
    Timeout,

    /// Non-success HTTP status
    #[error("the companion service returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message extracted from the error body
        message: String,
    },

    /// Body was not the JSON we expected
    #[error("unexpected response from the companion service ({0})")]
    Malformed(String),

    /// The caller aborted the request
    #[error("request cancelled")]
    Cancelled,
}

impl ApiError {
    /// Classify a transport-level reqwest error
    pub(crate) fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            }
        } else {
            Self::Network(err.to_string())
        }
    }

    /// Build a status error from the raw error body
    ///
    /// Structured bodies (`{"message": ..}`, `{"detail": ..}`, `{"error": ..}`)
    /// contribute their text; anything else is used verbatim, truncated.
    pub(crate) fn from_status_body(status: u16, body: &str) -> Self {
        const MAX_BODY_CHARS: usize = 200;

        let structured = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                ["message", "detail", "error"]
                    .iter()
                    .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(str::to_string))
            });

        let message = match structured {
            Some(text) => text,
            None => body.trim().chars().take(MAX_BODY_CHARS).collect(),
        };

        let message = if message.is_empty() {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("request failed")
                .to_string()
        } else {
            message
        };

        Self::Status { status, message }
    }

    /// Whether a retry could plausibly succeed
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Malformed(_) | Self::Cancelled => false,
        }
    }
}
