//! Display State Types
//!
//! Types that represent the current display state for the TUI.
//! These are derived from CompanionMessages and used for rendering.
//!
//! # Design Philosophy
//!
//! The TUI is a "thin client" - it just renders what the Conductor tells it to.
//! Display state is the bridge between CompanionMessages and rendering.
//!
//! - DisplayMessage: A rendered conversation message
//! - DisplayNotification: A transient toast in the status area
//! - DisplayState: Everything the next frame needs

use std::time::Duration;

use companion_core::{
    AuthStatus, CompanionMessage, ContentType, ExchangeState, InsightSnapshot, MessageId,
    MessageRole, NotifyLevel, ResourcePanel, SessionId,
};

/// How long a notification stays up
const NOTIFICATION_TTL: Duration = Duration::from_secs(8);

/// A rendered conversation message
#[derive(Clone, Debug)]
pub struct DisplayMessage {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent this message
    pub role: DisplayRole,
    /// The message content
    pub content: String,
}

impl DisplayMessage {
    /// Create a new display message
    pub fn new(id: MessageId, role: MessageRole, content: String, content_type: &ContentType) -> Self {
        let role = match (role, content_type) {
            (_, ContentType::Error) => DisplayRole::Error,
            (MessageRole::User, _) => DisplayRole::User,
            (MessageRole::Assistant, _) => DisplayRole::Companion,
        };
        Self { id, role, content }
    }

    /// Content with its speaker prefix
    pub fn prefixed(&self) -> String {
        format!("{}{}", self.role.prefix(), self.content)
    }
}

/// Display role for messages
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayRole {
    /// User input
    User,
    /// The companion
    Companion,
    /// A failed exchange
    Error,
}

impl DisplayRole {
    /// Get the prefix for this role
    pub fn prefix(&self) -> &'static str {
        match self {
            DisplayRole::User => "You: ",
            DisplayRole::Companion => "Companion: ",
            DisplayRole::Error => "",
        }
    }
}

/// A notification to display
#[derive(Clone, Debug)]
pub struct DisplayNotification {
    /// Notification level
    pub level: NotifyLevel,
    /// Optional title
    pub title: Option<String>,
    /// Message content
    pub message: String,
    /// Time left on screen
    pub remaining: Duration,
}

impl DisplayNotification {
    /// Title and message on one line
    pub fn text(&self) -> String {
        match &self.title {
            Some(title) => format!("{title}: {}", self.message),
            None => self.message.clone(),
        }
    }
}

/// The full display state for the TUI
#[derive(Debug, Default)]
pub struct DisplayState {
    /// Conversation messages
    pub messages: Vec<DisplayMessage>,
    /// Latest insight
    pub insight: InsightSnapshot,
    /// Suggested resources
    pub resources: ResourcePanel,
    /// Exchange state
    pub exchange_state: ExchangeState,
    /// Sign-in status
    pub auth: AuthStatus,
    /// Session info
    pub session_id: Option<SessionId>,
    /// Stable identity
    pub user_id: Option<String>,
    /// Where to sign in, once asked for
    pub login_url: Option<String>,
    /// Pending notification (if any)
    pub notification: Option<DisplayNotification>,
    /// Goodbye line from the Conductor
    pub quit_message: Option<String>,
    /// The Conductor asked us to quit
    pub quit_requested: bool,
}

impl DisplayState {
    /// Create a new display state
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a CompanionMessage to update display state
    pub fn apply_message(&mut self, msg: CompanionMessage) {
        match msg {
            CompanionMessage::Message {
                id,
                role,
                content,
                content_type,
            } => {
                // A reconnect replays the log
                if self.messages.iter().any(|m| m.id == id) {
                    return;
                }
                self.messages
                    .push(DisplayMessage::new(id, role, content, &content_type));
            }
            CompanionMessage::Insight { snapshot } => {
                self.insight = snapshot;
            }
            CompanionMessage::Resources { panel } => {
                self.resources = panel;
            }
            CompanionMessage::State { state } => {
                self.exchange_state = state;
            }
            CompanionMessage::SessionInfo {
                session_id,
                user_id,
            } => {
                self.session_id = Some(session_id);
                self.user_id = Some(user_id);
            }
            CompanionMessage::Auth { status } => {
                self.auth = status;
            }
            CompanionMessage::LoginUrl { url } => {
                self.notify(
                    NotifyLevel::Info,
                    Some("Sign in".to_string()),
                    format!("open {url} in your browser"),
                );
                self.login_url = Some(url);
            }
            CompanionMessage::Notify {
                level,
                title,
                message,
            } => {
                self.notify(level, title, message);
            }
            CompanionMessage::Quit { message } => {
                self.quit_message = message;
                self.quit_requested = true;
            }
            CompanionMessage::Ack { .. } => {
                // No display state change needed
            }
        }
    }

    fn notify(&mut self, level: NotifyLevel, title: Option<String>, message: String) {
        self.notification = Some(DisplayNotification {
            level,
            title,
            message,
            remaining: NOTIFICATION_TTL,
        });
    }

    /// Update timers
    pub fn update(&mut self, delta: Duration) {
        if let Some(notification) = &mut self.notification {
            notification.remaining = notification.remaining.saturating_sub(delta);
            if notification.remaining.is_zero() {
                self.notification = None;
            }
        }
    }

    /// Clear the notification
    pub fn clear_notification(&mut self) {
        self.notification = None;
    }

    /// Whether the crisis banner should be shown
    pub fn show_crisis_banner(&self) -> bool {
        self.insight.needs_crisis_support() || self.resources.needs_clinician
    }

    /// Crisis-support link: the backend's, else `fallback`
    pub fn crisis_link<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.resources.crisis_link.as_deref().unwrap_or(fallback)
    }

    /// Whether a reply is pending
    pub fn is_waiting(&self) -> bool {
        !self.exchange_state.accepts_input()
    }

    /// Name for the status bar
    pub fn account_label(&self) -> String {
        match &self.auth {
            AuthStatus::Checking => "checking sign-in...".to_string(),
            AuthStatus::Anonymous => "anonymous".to_string(),
            AuthStatus::SignedIn(profile) => match profile.display_name() {
                Some(name) => format!("signed in as {name}"),
                None => "signed in".to_string(),
            },
        }
    }
}
