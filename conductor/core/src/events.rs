//! Surface Events
//!
//! Events sent from UI surfaces to the Conductor. These represent all the ways
//! a UI can report user actions to the session core.
//!
//! # Design Philosophy
//!
//! UI surfaces are "dumb" renderers that forward user actions to the Conductor.
//! They don't interpret what actions mean - they just report what happened.
//! The Conductor decides how to respond. Purely visual state such as the
//! scroll position stays in the surface.

use serde::{Deserialize, Serialize};

use crate::messages::EventId;

/// Events from UI Surface to Conductor
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SurfaceEvent {
    // ============================================
    // Connection Events
    // ============================================
    /// Surface connected to Conductor
    Connected {
        /// Event ID for acknowledgment
        event_id: EventId,
        /// Surface type identifier
        surface_type: SurfaceType,
    },

    // ============================================
    // User Input Events
    // ============================================
    /// User submitted a message
    UserMessage {
        /// Event ID for acknowledgment
        event_id: EventId,
        /// The message content
        content: String,
    },

    /// User asked for more resources than the ones shown
    MoreResourcesRequested {
        /// Event ID for acknowledgment
        event_id: EventId,
    },

    /// User asked for a different strategy
    AnotherStrategyRequested {
        /// Event ID for acknowledgment
        event_id: EventId,
    },

    // ============================================
    // Account Events
    // ============================================
    /// User wants to sign in
    LoginRequested {
        /// Event ID for acknowledgment
        event_id: EventId,
    },

    /// User wants to sign out
    LogoutRequested {
        /// Event ID for acknowledgment
        event_id: EventId,
    },

    // ============================================
    // Lifecycle Events
    // ============================================
    /// User requested quit
    QuitRequested {
        /// Event ID for acknowledgment
        event_id: EventId,
    },
}

impl SurfaceEvent {
    /// Generate a new event ID for this event
    pub fn new_event_id() -> EventId {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        EventId(format!("evt_{id}"))
    }

    /// Get the event ID
    pub fn event_id(&self) -> &EventId {
        match self {
            Self::Connected { event_id, .. }
            | Self::UserMessage { event_id, .. }
            | Self::MoreResourcesRequested { event_id }
            | Self::AnotherStrategyRequested { event_id }
            | Self::LoginRequested { event_id }
            | Self::LogoutRequested { event_id }
            | Self::QuitRequested { event_id } => event_id,
        }
    }
}

/// Type of UI surface
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceType {
    /// Terminal UI (ratatui/crossterm)
    Tui,
}

impl SurfaceType {
    /// Human-readable name
    pub fn name(&self) -> &str {
        match self {
            Self::Tui => "Terminal",
        }
    }
}
