//! Companion Messages
//!
//! Messages sent from the Conductor to UI surfaces. These represent all the ways
//! the session core can tell a surface (TUI, web view, test harness) what to show.
//!
//! # Design Philosophy
//!
//! Surfaces are pure renderers. They never mutate session state directly; they
//! forward `SurfaceEvent`s up and render whatever `CompanionMessage`s come down.
//! This keeps the data flow unidirectional and independent of any UI framework.

use serde::{Deserialize, Serialize};

use crate::auth::AuthStatus;
use crate::insight::InsightSnapshot;
use crate::resources::ResourcePanel;

/// Messages from Conductor to UI Surface
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum CompanionMessage {
    // ============================================
    // Conversation Messages
    // ============================================
    /// A message was appended to the log
    Message {
        /// Unique message ID for tracking
        id: MessageId,
        /// Who sent this message
        role: MessageRole,
        /// The message content
        content: String,
        /// Content type hint for rendering
        #[serde(default)]
        content_type: ContentType,
    },

    // ============================================
    // Insight Panel
    // ============================================
    /// The insight snapshot changed
    Insight {
        /// The new snapshot
        snapshot: InsightSnapshot,
    },

    /// The resource panel changed
    Resources {
        /// The new panel contents
        panel: ResourcePanel,
    },

    // ============================================
    // Session Lifecycle
    // ============================================
    /// Exchange state change
    State {
        /// The new state
        state: ExchangeState,
    },

    /// Session information
    SessionInfo {
        /// Session ID
        session_id: SessionId,
        /// Stable identity sent as `user_id`
        user_id: String,
    },

    /// Authentication status resolved or changed
    Auth {
        /// Current status
        status: AuthStatus,
    },

    /// URL the user should open to sign in
    LoginUrl {
        /// Absolute login URL
        url: String,
    },

    // ============================================
    // System Messages
    // ============================================
    /// System notification
    Notify {
        /// Notification level
        level: NotifyLevel,
        /// Title (optional)
        title: Option<String>,
        /// Message content
        message: String,
    },

    /// Acknowledgment of received event
    Ack {
        /// Event ID being acknowledged
        event_id: EventId,
    },

    /// Request surface to quit
    Quit {
        /// Optional goodbye message
        message: Option<String>,
    },
}

/// Message identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generate a new unique message ID
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(format!("msg_{id}"))
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

/// Event identifier (for acks)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

/// Session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a new unique session ID
    ///
    /// Uses an atomic counter combined with timestamp to ensure uniqueness
    /// even when multiple sessions are created in the same millisecond.
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        use std::time::{SystemTime, UNIX_EPOCH};

        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let count = COUNTER.fetch_add(1, Ordering::SeqCst);
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        Self(format!("session_{timestamp}_{count}"))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Who sent a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User input
    User,
    /// The companion
    Assistant,
}

/// Content type hints for message rendering
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ContentType {
    /// Plain text content
    #[default]
    Plain,
    /// Error message content
    Error,
}

/// Notification levels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyLevel {
    /// Informational
    Info,
    /// Warning
    Warning,
    /// Error
    Error,
    /// Success
    Success,
}

/// Chat exchange states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeState {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// A chat request is in flight
    AwaitingResponse,
    /// The last exchange succeeded
    SettledOk,
    /// The last exchange failed
    SettledError,
}

impl ExchangeState {
    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::AwaitingResponse => "Thinking...",
            Self::SettledOk => "Ready",
            Self::SettledError => "Something went wrong",
        }
    }

    /// Whether a new submission would be accepted
    #[must_use]
    pub fn accepts_input(&self) -> bool {
        !matches!(self, Self::AwaitingResponse)
    }
}
