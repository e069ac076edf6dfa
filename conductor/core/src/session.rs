//! Chat Session
//!
//! The state machine behind one conversation: the ordered message log, the
//! live insight snapshot and the resource panel.
//!
//! ```text
//!            submit                on_response
//!   Idle ───────────▶ Awaiting ───────────────▶ SettledOk ──┐
//!    ▲                Response ───────────────▶ SettledError┤
//!    │                   ▲       on_error                   │
//!    │                   └──────────── submit ──────────────┘
//! ```
//!
//! At most one exchange is outstanding. Every submission gets an
//! [`ExchangeTicket`]; outcomes name the ticket they belong to, and outcomes
//! for anything but the current exchange are rejected as [`StaleOutcome`].
//!
//! The session never talks to the network. It hands back queries
//! ([`ResourceQuery`], [`StrategyQuery`]) for the caller to run and feed back.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::{
    ApiError, ChatReply, HistoryTurn, ResourceReply, ResourceRequest, StrategyReply,
    StrategyRequest,
};
use crate::insight::{InsightSnapshot, Mood, SafetyLevel};
use crate::messages::{ContentType, ExchangeState, MessageId, MessageRole, SessionId};
use crate::resources::ResourcePanel;
use crate::security::{InputLimits, InputValidator, ValidationResult};

/// A message in the conversation log
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent this message
    pub role: MessageRole,
    /// Message content
    pub content: String,
    /// Rendering hint
    pub content_type: ContentType,
    /// When the message was created (Unix timestamp ms)
    pub timestamp: u64,
}

impl ChatMessage {
    fn new(role: MessageRole, content: String, content_type: ContentType) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content,
            content_type,
            timestamp: now_ms(),
        }
    }

    /// Whether this is an error reply
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.content_type == ContentType::Error
    }
}

/// Handle for one submitted exchange
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangeTicket {
    /// Monotonic exchange number within the session
    pub id: u64,
    /// The trimmed text that was submitted
    pub user_text: String,
}

/// Why a submission was not accepted
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SubmitRejection {
    /// Empty or whitespace-only input
    #[error("message is empty")]
    Empty,
    /// An exchange is already in flight
    #[error("still waiting for the previous reply")]
    Busy,
    /// Input failed validation
    #[error("{0}")]
    Invalid(String),
}

impl SubmitRejection {
    /// Silent rejections produce no user-visible feedback
    #[must_use]
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Empty | Self::Busy)
    }
}

/// Outcome for an exchange that is no longer current
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("outcome for exchange {ticket} arrived after it was superseded")]
pub struct StaleOutcome {
    /// Ticket the outcome belonged to
    pub ticket: u64,
}

/// Resource lookup to run for an exchange
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceQuery {
    /// Exchange the resources belong to
    pub ticket: u64,
    /// Request body
    pub request: ResourceRequest,
}

/// Strategy lookup to run for an exchange
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrategyQuery {
    /// Exchange the strategy belongs to
    pub ticket: u64,
    /// Request body
    pub request: StrategyRequest,
}

/// Session tuning
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Messages sent as suggestion context
    pub history_window: usize,
    /// Ask for resources after every successful exchange
    pub fetch_resources: bool,
    /// Input limits
    pub limits: InputLimits,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_window: 8,
            fetch_resources: true,
            limits: InputLimits::default(),
        }
    }
}

/// Read-only copy of everything a surface renders
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Session ID
    pub session_id: SessionId,
    /// Exchange state
    pub state: ExchangeState,
    /// Conversation log
    pub messages: Vec<ChatMessage>,
    /// Live insight
    pub insight: InsightSnapshot,
    /// Resource panel
    pub resources: ResourcePanel,
}

/// The most recent successful exchange
#[derive(Clone, Debug)]
struct SettledExchange {
    ticket: u64,
    user_text: String,
    mood: String,
}

/// One conversation
#[derive(Debug)]
pub struct ChatSession {
    id: SessionId,
    state: ExchangeState,
    messages: Vec<ChatMessage>,
    insight: InsightSnapshot,
    resources: ResourcePanel,
    pending: Option<ExchangeTicket>,
    last_ok: Option<SettledExchange>,
    next_ticket: u64,
    validator: InputValidator,
    config: SessionConfig,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl ChatSession {
    /// Create a new session
    pub fn new(config: SessionConfig) -> Self {
        Self {
            id: SessionId::new(),
            state: ExchangeState::Idle,
            messages: Vec::new(),
            insight: InsightSnapshot::default(),
            resources: ResourcePanel::default(),
            pending: None,
            last_ok: None,
            next_ticket: 1,
            validator: InputValidator::new(config.limits.clone()),
            config,
        }
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Submit user text
    ///
    /// On success the user message is already in the log when this returns.
    ///
    /// # Errors
    ///
    /// Rejects empty input, input over the limits, and any submission while an
    /// exchange is outstanding. A rejection leaves the session untouched.
    pub fn submit(&mut self, text: &str) -> Result<ExchangeTicket, SubmitRejection> {
        if !self.state.accepts_input() {
            return Err(SubmitRejection::Busy);
        }

        match self.validator.validate_message(text) {
            ValidationResult::Valid => {}
            ValidationResult::Empty => return Err(SubmitRejection::Empty),
            ValidationResult::Invalid(reason) => return Err(SubmitRejection::Invalid(reason)),
        }

        let user_text = text.trim().to_string();
        self.messages.push(ChatMessage::new(
            MessageRole::User,
            user_text.clone(),
            ContentType::Plain,
        ));
        self.resources = ResourcePanel::default();
        self.insight.analyzing = true;
        self.state = ExchangeState::AwaitingResponse;
        self.last_ok = None;

        let ticket = ExchangeTicket {
            id: self.next_ticket,
            user_text,
        };
        self.next_ticket += 1;
        self.pending = Some(ticket.clone());

        tracing::debug!(exchange = ticket.id, "Exchange submitted");
        Ok(ticket)
    }

    /// Apply whichever way the chat call ended
    ///
    /// # Errors
    ///
    /// Returns [`StaleOutcome`] if `ticket` is not the outstanding exchange.
    pub fn settle(
        &mut self,
        ticket: u64,
        result: Result<ChatReply, ApiError>,
    ) -> Result<Option<ResourceQuery>, StaleOutcome> {
        match result {
            Ok(reply) => self.on_response(ticket, reply),
            Err(e) => self.on_error(ticket, &e).map(|()| None),
        }
    }

    /// Apply a chat reply
    ///
    /// A reply without encouragement or mood settles the exchange as an error.
    /// Returns the resource lookup to run, if resource fetching is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`StaleOutcome`] if `ticket` is not the outstanding exchange.
    pub fn on_response(
        &mut self,
        ticket: u64,
        reply: ChatReply,
    ) -> Result<Option<ResourceQuery>, StaleOutcome> {
        if let Err(e) = reply.validate() {
            return self.on_error(ticket, &e).map(|()| None);
        }
        let exchange = self.take_pending(ticket)?;

        self.messages.push(ChatMessage::new(
            MessageRole::Assistant,
            reply.encouragement.trim().to_string(),
            ContentType::Plain,
        ));

        let mood = reply.mood.trim().to_string();
        let safety = reply.safety.unwrap_or_default();
        let strategy = reply.strategy.trim();
        self.insight = InsightSnapshot {
            mood: Some(mood.clone()),
            mood_confidence: reply.mood_confidence,
            strategy: (!strategy.is_empty()).then(|| strategy.to_string()),
            strategy_why: reply.strategy_why,
            strategy_source: reply.strategy_source.filter(|s| !s.is_empty()),
            safety,
            analyzing: false,
        };
        self.state = ExchangeState::SettledOk;
        self.last_ok = Some(SettledExchange {
            ticket,
            user_text: exchange.user_text,
            mood: canonical_mood(&mood),
        });

        tracing::info!(
            exchange = ticket,
            mood = %mood,
            safety = ?self.insight.safety.level,
            "Exchange settled"
        );

        if !self.config.fetch_resources {
            return Ok(None);
        }
        self.resources = ResourcePanel::loading();
        Ok(self.resource_query(Vec::new()))
    }

    /// Apply a failed chat call
    ///
    /// Appends an `Error: …` reply and clears `analyzing`; mood and strategy
    /// stay as they were.
    ///
    /// # Errors
    ///
    /// Returns [`StaleOutcome`] if `ticket` is not the outstanding exchange.
    pub fn on_error(&mut self, ticket: u64, error: &ApiError) -> Result<(), StaleOutcome> {
        self.take_pending(ticket)?;

        let content = if error.is_transient() {
            format!("Error: {error}. Please try again in a moment.")
        } else {
            format!("Error: {error}")
        };
        self.messages.push(ChatMessage::new(
            MessageRole::Assistant,
            content,
            ContentType::Error,
        ));
        self.insight.analyzing = false;
        self.state = ExchangeState::SettledError;

        tracing::warn!(exchange = ticket, error = %error, "Exchange failed");
        Ok(())
    }

    /// Apply resource suggestions
    ///
    /// # Errors
    ///
    /// Returns [`StaleOutcome`] if `ticket` is not the latest successful exchange.
    pub fn on_resources(&mut self, ticket: u64, reply: ResourceReply) -> Result<(), StaleOutcome> {
        self.check_current(ticket)?;
        self.resources = ResourcePanel {
            options: reply.options,
            needs_clinician: reply.needs_clinician,
            crisis_link: reply.crisis_link,
            loading: false,
        };
        Ok(())
    }

    /// Degrade the resource panel after a failed lookup
    ///
    /// The chat exchange itself is unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`StaleOutcome`] if `ticket` is not the latest successful exchange.
    pub fn on_resources_failed(
        &mut self,
        ticket: u64,
        error: &ApiError,
    ) -> Result<(), StaleOutcome> {
        self.check_current(ticket)?;
        tracing::warn!(exchange = ticket, error = %error, "Resource lookup failed");
        self.resources = ResourcePanel::default();
        Ok(())
    }

    /// Replace the strategy text with an alternative
    ///
    /// Blank strategies are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StaleOutcome`] if `ticket` is not the latest successful exchange.
    pub fn on_strategy(&mut self, ticket: u64, reply: StrategyReply) -> Result<(), StaleOutcome> {
        self.check_current(ticket)?;
        let strategy = reply.strategy.trim();
        if !strategy.is_empty() {
            self.insight.strategy = Some(strategy.to_string());
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Follow-up queries
    // ------------------------------------------------------------------

    /// Lookup for resources beyond the ones shown
    ///
    /// `None` unless the last exchange succeeded and no lookup is running.
    pub fn more_resources(&mut self) -> Option<ResourceQuery> {
        if self.state != ExchangeState::SettledOk || self.resources.loading {
            return None;
        }
        let exclude_ids = self.resources.shown_ids();
        let query = self.resource_query(exclude_ids)?;
        self.resources.loading = true;
        Some(query)
    }

    /// Lookup for an alternative strategy
    ///
    /// `None` unless the last exchange succeeded and nothing is in flight.
    #[must_use]
    pub fn strategy_query(&self) -> Option<StrategyQuery> {
        if self.state != ExchangeState::SettledOk {
            return None;
        }
        let exchange = self.last_ok.as_ref()?;
        Some(StrategyQuery {
            ticket: exchange.ticket,
            request: StrategyRequest {
                user_text: exchange.user_text.clone(),
                mood: exchange.mood.clone(),
                crisis: self.insight.safety.level.crisis(),
                history: self.history(self.config.history_window),
            },
        })
    }

    /// The last `n` conversation turns, oldest first
    ///
    /// Error replies are not conversation and are skipped.
    #[must_use]
    pub fn history(&self, n: usize) -> Vec<HistoryTurn> {
        let turns: Vec<_> = self.messages.iter().filter(|m| !m.is_error()).collect();
        let start = turns.len().saturating_sub(n);
        turns[start..]
            .iter()
            .map(|m| HistoryTurn {
                role: m.role,
                content: m.content.clone(),
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Session ID
    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Current exchange state
    #[must_use]
    pub fn state(&self) -> ExchangeState {
        self.state
    }

    /// Conversation log
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Live insight
    #[must_use]
    pub fn insight(&self) -> &InsightSnapshot {
        &self.insight
    }

    /// Resource panel
    #[must_use]
    pub fn resources(&self) -> &ResourcePanel {
        &self.resources
    }

    /// Outstanding exchange, if any
    #[must_use]
    pub fn pending(&self) -> Option<&ExchangeTicket> {
        self.pending.as_ref()
    }

    /// Safety level of the live insight
    #[must_use]
    pub fn safety_level(&self) -> SafetyLevel {
        self.insight.safety.level
    }

    /// Copy of everything a surface renders
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            state: self.state,
            messages: self.messages.clone(),
            insight: self.insight.clone(),
            resources: self.resources.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn take_pending(&mut self, ticket: u64) -> Result<ExchangeTicket, StaleOutcome> {
        match self.pending.take() {
            Some(pending) if pending.id == ticket => Ok(pending),
            other => {
                self.pending = other;
                tracing::debug!(exchange = ticket, "Ignoring stale chat outcome");
                Err(StaleOutcome { ticket })
            }
        }
    }

    fn check_current(&self, ticket: u64) -> Result<(), StaleOutcome> {
        match &self.last_ok {
            Some(exchange) if exchange.ticket == ticket && self.pending.is_none() => Ok(()),
            _ => {
                tracing::debug!(exchange = ticket, "Ignoring stale follow-up outcome");
                Err(StaleOutcome { ticket })
            }
        }
    }

    fn resource_query(&self, exclude_ids: Vec<String>) -> Option<ResourceQuery> {
        let exchange = self.last_ok.as_ref()?;
        Some(ResourceQuery {
            ticket: exchange.ticket,
            request: ResourceRequest {
                user_text: exchange.user_text.clone(),
                mood: exchange.mood.clone(),
                crisis: self.insight.safety.level.crisis(),
                history: self.history(self.config.history_window),
                exclude_ids,
            },
        })
    }
}

/// Lowercase known categories; pass anything else through
fn canonical_mood(label: &str) -> String {
    Mood::from_label(label).map_or_else(|| label.to_string(), |m| m.as_str().to_string())
}

/// Get current timestamp in milliseconds
fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
