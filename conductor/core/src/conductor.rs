//! Conductor - The Session Driver
//!
//! The Conductor owns one [`ChatSession`] and drives it against the companion
//! API. It orchestrates:
//! - Chat exchanges and their follow-up resource/strategy lookups
//! - The timed session check and sign-out
//! - The stable user identity
//! - Communication with UI surfaces
//!
//! # Design Philosophy
//!
//! The Conductor is UI-agnostic. It communicates through:
//! - `CompanionMessage`: what the surface should render, sent TO the surface
//! - `SurfaceEvent`: what the user did, received FROM the surface
//!
//! Network calls run as spawned tasks. Their outcomes come back on an internal
//! channel and are applied by [`Conductor::poll`], so the session is only ever
//! mutated from the surface's own loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::Timelike;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::api::{
    ApiError, ChatReply, ChatRequest, CompanionApi, ResourceReply, StrategyReply,
};
use crate::auth::{self, AuthStatus, DEFAULT_AUTH_TIMEOUT};
use crate::config::{CompanionConfigFile, DEFAULT_CRISIS_SUPPORT_URL};
use crate::events::SurfaceEvent;
use crate::identity::{self, IdentityProvider};
use crate::messages::{CompanionMessage, EventId, NotifyLevel};
use crate::security::InputLimits;
use crate::session::{ChatSession, ResourceQuery, SessionConfig, StrategyQuery};

/// Conductor configuration
#[derive(Clone, Debug)]
pub struct ConductorConfig {
    /// Session tuning
    pub session: SessionConfig,
    /// Bound on the session check
    pub auth_timeout: Duration,
    /// Check who is signed in on start
    pub check_auth_on_start: bool,
    /// Send a time-of-day greeting on start
    pub greet_on_start: bool,
    /// Crisis-support link used when the backend supplies none
    pub crisis_support_url: String,
}

impl Default for ConductorConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            auth_timeout: DEFAULT_AUTH_TIMEOUT,
            check_auth_on_start: true,
            greet_on_start: true,
            crisis_support_url: DEFAULT_CRISIS_SUPPORT_URL.to_string(),
        }
    }
}

impl ConductorConfig {
    /// Build from loaded configuration
    #[must_use]
    pub fn from_file(config: &CompanionConfigFile) -> Self {
        Self {
            session: SessionConfig {
                history_window: config.history_window,
                fetch_resources: config.fetch_resources,
                limits: InputLimits {
                    max_input_chars: config.max_input_chars,
                },
            },
            auth_timeout: config.auth_timeout,
            crisis_support_url: config.crisis_support_url.clone(),
            ..Self::default()
        }
    }
}

/// Result of a spawned network call
#[derive(Debug)]
enum Outcome {
    Chat {
        ticket: u64,
        result: Result<ChatReply, ApiError>,
    },
    Resources {
        ticket: u64,
        result: Result<ResourceReply, ApiError>,
    },
    Strategy {
        ticket: u64,
        result: Result<StrategyReply, ApiError>,
    },
    Auth(AuthStatus),
    LoggedOut(Result<(), ApiError>),
}

/// The Conductor - headless session core
pub struct Conductor<A: CompanionApi> {
    /// Configuration
    config: ConductorConfig,
    /// Companion backend
    api: Arc<A>,
    /// Identity source
    identity: Arc<dyn IdentityProvider>,
    /// Current session
    session: ChatSession,
    /// Resolved identity
    user_id: Option<String>,
    /// Sign-in status
    auth: AuthStatus,
    /// Channel to send messages to UI surface
    tx: mpsc::Sender<CompanionMessage>,
    /// Outcomes of spawned calls
    outcome_tx: mpsc::UnboundedSender<Outcome>,
    outcome_rx: mpsc::UnboundedReceiver<Outcome>,
    /// Spawned calls whose outcome has not been applied yet
    in_flight: usize,
    /// Aborts every call still in flight
    cancel: CancellationToken,
}

impl<A: CompanionApi + 'static> Conductor<A> {
    /// Create a new Conductor
    pub fn new(
        api: A,
        identity: impl IdentityProvider + 'static,
        config: ConductorConfig,
        tx: mpsc::Sender<CompanionMessage>,
    ) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            session: ChatSession::new(config.session.clone()),
            config,
            api: Arc::new(api),
            identity: Arc::new(identity),
            user_id: None,
            auth: AuthStatus::Checking,
            tx,
            outcome_tx,
            outcome_rx,
            in_flight: 0,
            cancel: CancellationToken::new(),
        }
    }

    /// Get the session
    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Get the sign-in status
    pub fn auth(&self) -> &AuthStatus {
        &self.auth
    }

    /// Get the resolved identity
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Start the Conductor
    ///
    /// Probes the backend, resolves the identity, announces the session and
    /// kicks off the session check in the background.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        if !self.api.health_check().await {
            self.notify(
                NotifyLevel::Warning,
                "Companion service not reachable yet - messages may fail",
            )
            .await;
        }

        let user_id = match self.identity.user_id().await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "Identity store unavailable, using a temporary id");
                self.notify(
                    NotifyLevel::Warning,
                    "Could not load your saved identity; this session starts fresh",
                )
                .await;
                identity::mint_user_id()
            }
        };
        self.user_id = Some(user_id.clone());

        self.send(CompanionMessage::SessionInfo {
            session_id: self.session.id().clone(),
            user_id,
        })
        .await;
        self.send(CompanionMessage::State {
            state: self.session.state(),
        })
        .await;

        if self.config.check_auth_on_start {
            self.send(CompanionMessage::Auth {
                status: AuthStatus::Checking,
            })
            .await;
            self.spawn_auth_check();
        } else {
            self.auth = AuthStatus::Anonymous;
        }

        if self.config.greet_on_start {
            self.notify(NotifyLevel::Info, &greeting(chrono::Local::now().hour()))
                .await;
        }

        tracing::info!(
            session = %self.session.id().0,
            backend = self.api.name(),
            "Conductor started"
        );
        Ok(())
    }

    /// Handle an event from the UI surface
    pub async fn handle_event(&mut self, event: SurfaceEvent) -> anyhow::Result<()> {
        match event {
            SurfaceEvent::Connected {
                event_id,
                surface_type,
            } => {
                tracing::info!(surface = surface_type.name(), "Surface connected");
                self.ack(event_id).await;
                self.replay().await;
            }

            SurfaceEvent::UserMessage { event_id, content } => {
                self.ack(event_id).await;
                self.handle_user_message(&content).await;
            }

            SurfaceEvent::MoreResourcesRequested { event_id } => {
                self.ack(event_id).await;
                match self.session.more_resources() {
                    Some(query) => {
                        self.send_resources().await;
                        self.spawn_resources(query);
                    }
                    None if self.session.resources().loading => {
                        self.notify(NotifyLevel::Info, "Still looking for resources")
                            .await;
                    }
                    None => {
                        self.notify(
                            NotifyLevel::Info,
                            "Share how you're doing first, then I can find more resources",
                        )
                        .await;
                    }
                }
            }

            SurfaceEvent::AnotherStrategyRequested { event_id } => {
                self.ack(event_id).await;
                match self.session.strategy_query() {
                    Some(query) => self.spawn_strategy(query),
                    None => {
                        self.notify(
                            NotifyLevel::Info,
                            "Share how you're doing first, then I can suggest something",
                        )
                        .await;
                    }
                }
            }

            SurfaceEvent::LoginRequested { event_id } => {
                self.ack(event_id).await;
                self.send(CompanionMessage::LoginUrl {
                    url: self.api.login_url(),
                })
                .await;
            }

            SurfaceEvent::LogoutRequested { event_id } => {
                self.ack(event_id).await;
                self.spawn_logout();
            }

            SurfaceEvent::QuitRequested { event_id } => {
                self.ack(event_id).await;
                self.shutdown().await?;
            }
        }

        Ok(())
    }

    /// Handle a user message
    async fn handle_user_message(&mut self, content: &str) {
        let ticket = match self.session.submit(content) {
            Ok(ticket) => ticket,
            Err(rejection) if rejection.is_silent() => {
                tracing::debug!(reason = %rejection, "Submission ignored");
                return;
            }
            Err(rejection) => {
                self.notify(NotifyLevel::Warning, &rejection.to_string())
                    .await;
                return;
            }
        };

        self.send_last_message().await;
        self.send_insight().await;
        self.send_resources().await;
        self.send_state().await;

        let request = ChatRequest {
            user_text: ticket.user_text,
            user_id: self.user_id.clone(),
        };
        let api = Arc::clone(&self.api);
        self.spawn(move |outcome_tx, cancel| async move {
            let result = tokio::select! {
                () = cancel.cancelled() => Err(ApiError::Cancelled),
                result = api.chat(&request) => result,
            };
            let _ = outcome_tx.send(Outcome::Chat {
                ticket: ticket.id,
                result,
            });
        });
    }

    /// Apply every outcome that has arrived
    ///
    /// Call this regularly (e.g. once per frame). Returns true if there was
    /// activity.
    pub async fn poll(&mut self) -> bool {
        let mut outcomes = Vec::new();
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            outcomes.push(outcome);
        }

        if outcomes.is_empty() {
            return false;
        }

        for outcome in outcomes {
            self.apply(outcome).await;
        }
        true
    }

    /// Number of spawned calls still outstanding
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Wait for the next outcome and apply it
    ///
    /// Returns false right away when nothing is in flight.
    pub async fn wait_for_outcome(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.outcome_rx.recv().await {
            Some(outcome) => {
                self.apply(outcome).await;
                true
            }
            None => false,
        }
    }

    async fn apply(&mut self, outcome: Outcome) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match outcome {
            Outcome::Chat { ticket, result } => {
                let query = match self.session.settle(ticket, result) {
                    Ok(query) => query,
                    Err(stale) => {
                        tracing::debug!(%stale, "Dropped chat outcome");
                        return;
                    }
                };

                self.send_last_message().await;
                self.send_insight().await;
                self.send_state().await;

                if self.session.insight().needs_crisis_support() {
                    let url = self.crisis_link();
                    self.send(CompanionMessage::Notify {
                        level: NotifyLevel::Warning,
                        title: Some("You don't have to go through this alone".to_string()),
                        message: format!("If you might be in danger, please reach out now: {url}"),
                    })
                    .await;
                }

                if let Some(query) = query {
                    self.send_resources().await;
                    self.spawn_resources(query);
                }
            }

            Outcome::Resources { ticket, result } => {
                let applied = match result {
                    Ok(reply) => self.session.on_resources(ticket, reply),
                    Err(e) => self.session.on_resources_failed(ticket, &e),
                };
                if applied.is_ok() {
                    self.send_resources().await;
                }
            }

            Outcome::Strategy { ticket, result } => match result {
                Ok(reply) => {
                    if self.session.on_strategy(ticket, reply).is_ok() {
                        self.send_insight().await;
                    }
                }
                Err(e) => {
                    tracing::warn!(exchange = ticket, error = %e, "Strategy lookup failed");
                    self.notify(NotifyLevel::Info, "No other idea right now - try again in a bit")
                        .await;
                }
            },

            Outcome::Auth(status) => {
                if let Some(name) = status.profile().and_then(|p| p.display_name()) {
                    self.notify(NotifyLevel::Success, &format!("Signed in as {name}"))
                        .await;
                }
                self.auth = status.clone();
                self.send(CompanionMessage::Auth { status }).await;
            }

            Outcome::LoggedOut(result) => match result {
                Ok(()) => {
                    self.auth = AuthStatus::Anonymous;
                    self.send(CompanionMessage::Auth {
                        status: AuthStatus::Anonymous,
                    })
                    .await;
                    self.notify(NotifyLevel::Success, "Signed out").await;
                }
                Err(e) => {
                    self.notify(NotifyLevel::Error, &format!("Sign-out failed: {e}"))
                        .await;
                }
            },
        }
    }

    /// Cancel outstanding calls and tell the surface to quit
    pub async fn shutdown(&mut self) -> anyhow::Result<()> {
        self.cancel.cancel();
        tracing::info!(session = %self.session.id().0, "Conductor shutting down");

        self.send(CompanionMessage::Quit {
            message: Some("Take care of yourself.".to_string()),
        })
        .await;

        Ok(())
    }

    // ------------------------------------------------------------------
    // Spawned calls
    // ------------------------------------------------------------------

    fn spawn<F, Fut>(&mut self, job: F)
    where
        F: FnOnce(mpsc::UnboundedSender<Outcome>, CancellationToken) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        self.in_flight += 1;
        tokio::spawn(job(self.outcome_tx.clone(), self.cancel.clone()));
    }

    fn spawn_resources(&mut self, query: ResourceQuery) {
        let api = Arc::clone(&self.api);
        self.spawn(move |outcome_tx, cancel| async move {
            let result = tokio::select! {
                () = cancel.cancelled() => Err(ApiError::Cancelled),
                result = api.suggest_resources(&query.request) => result,
            };
            let _ = outcome_tx.send(Outcome::Resources {
                ticket: query.ticket,
                result,
            });
        });
    }

    fn spawn_strategy(&mut self, query: StrategyQuery) {
        let api = Arc::clone(&self.api);
        self.spawn(move |outcome_tx, cancel| async move {
            let result = tokio::select! {
                () = cancel.cancelled() => Err(ApiError::Cancelled),
                result = api.suggest_strategy(&query.request) => result,
            };
            let _ = outcome_tx.send(Outcome::Strategy {
                ticket: query.ticket,
                result,
            });
        });
    }

    fn spawn_auth_check(&mut self) {
        let api = Arc::clone(&self.api);
        let timeout = self.config.auth_timeout;
        self.spawn(move |outcome_tx, cancel| async move {
            let status = auth::check_session(api.as_ref(), timeout, &cancel).await;
            let _ = outcome_tx.send(Outcome::Auth(status));
        });
    }

    fn spawn_logout(&mut self) {
        let api = Arc::clone(&self.api);
        self.spawn(move |outcome_tx, cancel| async move {
            let result = tokio::select! {
                () = cancel.cancelled() => Err(ApiError::Cancelled),
                result = api.logout() => result,
            };
            let _ = outcome_tx.send(Outcome::LoggedOut(result));
        });
    }

    // ------------------------------------------------------------------
    // Surface messages
    // ------------------------------------------------------------------

    /// Re-send everything a freshly connected surface needs
    async fn replay(&self) {
        for message in self.session.messages() {
            self.send(CompanionMessage::Message {
                id: message.id.clone(),
                role: message.role,
                content: message.content.clone(),
                content_type: message.content_type.clone(),
            })
            .await;
        }
        self.send_insight().await;
        self.send_resources().await;
        self.send_state().await;
        self.send(CompanionMessage::Auth {
            status: self.auth.clone(),
        })
        .await;
    }

    fn crisis_link(&self) -> String {
        self.session
            .resources()
            .crisis_link
            .clone()
            .unwrap_or_else(|| self.config.crisis_support_url.clone())
    }

    async fn send_last_message(&self) {
        if let Some(message) = self.session.messages().last() {
            self.send(CompanionMessage::Message {
                id: message.id.clone(),
                role: message.role,
                content: message.content.clone(),
                content_type: message.content_type.clone(),
            })
            .await;
        }
    }

    async fn send_insight(&self) {
        self.send(CompanionMessage::Insight {
            snapshot: self.session.insight().clone(),
        })
        .await;
    }

    async fn send_resources(&self) {
        self.send(CompanionMessage::Resources {
            panel: self.session.resources().clone(),
        })
        .await;
    }

    async fn send_state(&self) {
        self.send(CompanionMessage::State {
            state: self.session.state(),
        })
        .await;
    }

    /// Send acknowledgment
    async fn ack(&self, event_id: EventId) {
        self.send(CompanionMessage::Ack { event_id }).await;
    }

    /// Send notification
    async fn notify(&self, level: NotifyLevel, message: &str) {
        self.send(CompanionMessage::Notify {
            level,
            title: None,
            message: message.to_string(),
        })
        .await;
    }

    /// Send a message to the UI surface
    async fn send(&self, msg: CompanionMessage) {
        if let Err(e) = self.tx.send(msg).await {
            tracing::warn!("Failed to send message to surface: {}", e);
        }
    }
}

impl<A: CompanionApi> Drop for Conductor<A> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Opening line for the hour of day
fn greeting(hour: u32) -> String {
    let part = match hour {
        5..=11 => "Good morning",
        12..=16 => "Good afternoon",
        17..=20 => "Good evening",
        _ => "Hi there, up late",
    };
    format!("{part}. How are you feeling right now?")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::UserProfile;
    use crate::identity::StaticIdentity;
    use crate::insight::{Safety, SafetyLevel};
    use crate::messages::{ContentType, ExchangeState, MessageRole};
    use crate::resources::{ResourceKind, ResourceOption};

    // Mock backend for testing
    #[derive(Clone)]
    struct MockApi {
        chat: Result<ChatReply, ApiError>,
        resources: Result<ResourceReply, ApiError>,
        strategy: Result<StrategyReply, ApiError>,
        profile: Option<UserProfile>,
    }

    impl Default for MockApi {
        fn default() -> Self {
            Self {
                chat: Ok(ChatReply {
                    mood: "sadness".to_string(),
                    strategy: "Try a 60s breath".to_string(),
                    encouragement: "You're not alone in this.".to_string(),
                    crisis_detected: false,
                    safety: None,
                    strategy_why: None,
                    strategy_source: None,
                    advice_given: true,
                    mood_confidence: Some(0.8),
                }),
                resources: Ok(ResourceReply {
                    options: vec![ResourceOption {
                        id: "yt-1".to_string(),
                        kind: ResourceKind::Video,
                        title: "Box breathing".to_string(),
                        url: "https://example.com/box".to_string(),
                        duration: Some("2m".to_string()),
                        why: None,
                        source: None,
                    }],
                    needs_clinician: false,
                    crisis_link: None,
                }),
                strategy: Ok(StrategyReply {
                    strategy: "Step outside for two minutes".to_string(),
                }),
                profile: None,
            }
        }
    }

    #[async_trait::async_trait]
    impl CompanionApi for MockApi {
        fn name(&self) -> &str {
            "Mock"
        }

        async fn health_check(&self) -> bool {
            true
        }

        async fn chat(&self, _request: &ChatRequest) -> Result<ChatReply, ApiError> {
            self.chat.clone()
        }

        async fn suggest_resources(
            &self,
            _request: &crate::api::ResourceRequest,
        ) -> Result<ResourceReply, ApiError> {
            self.resources.clone()
        }

        async fn suggest_strategy(
            &self,
            _request: &crate::api::StrategyRequest,
        ) -> Result<StrategyReply, ApiError> {
            self.strategy.clone()
        }

        async fn me(&self) -> Result<Option<UserProfile>, ApiError> {
            Ok(self.profile.clone())
        }

        async fn logout(&self) -> Result<(), ApiError> {
            Ok(())
        }

        fn login_url(&self) -> String {
            "http://mock/api/auth/google".to_string()
        }
    }

    fn quiet_config() -> ConductorConfig {
        ConductorConfig {
            check_auth_on_start: false,
            greet_on_start: false,
            ..ConductorConfig::default()
        }
    }

    fn conductor(
        api: MockApi,
        config: ConductorConfig,
    ) -> (Conductor<MockApi>, mpsc::Receiver<CompanionMessage>) {
        let (tx, rx) = mpsc::channel(100);
        let conductor = Conductor::new(api, StaticIdentity("u_test".to_string()), config, tx);
        (conductor, rx)
    }

    fn drain(rx: &mut mpsc::Receiver<CompanionMessage>) -> Vec<CompanionMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    fn user_message(content: &str) -> SurfaceEvent {
        SurfaceEvent::UserMessage {
            event_id: SurfaceEvent::new_event_id(),
            content: content.to_string(),
        }
    }

    fn chat_lines(messages: &[CompanionMessage]) -> Vec<(MessageRole, String)> {
        messages
            .iter()
            .filter_map(|m| match m {
                CompanionMessage::Message { role, content, .. } => Some((*role, content.clone())),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_start_announces_session() {
        let (mut conductor, mut rx) = conductor(MockApi::default(), quiet_config());
        conductor.start().await.unwrap();

        let messages = drain(&mut rx);
        assert!(messages.iter().any(|m| matches!(
            m,
            CompanionMessage::SessionInfo { user_id, .. } if user_id == "u_test"
        )));
        assert_eq!(conductor.user_id(), Some("u_test"));
        assert_eq!(conductor.auth(), &AuthStatus::Anonymous);
    }

    #[tokio::test]
    async fn test_start_resolves_auth_in_background() {
        let api = MockApi {
            profile: Some(UserProfile {
                sub: Some("1".into()),
                email: Some("sam@example.com".into()),
                name: Some("Sam".into()),
                picture: None,
            }),
            ..MockApi::default()
        };
        let (mut conductor, mut rx) = conductor(api, ConductorConfig::default());
        conductor.start().await.unwrap();
        assert_eq!(conductor.auth(), &AuthStatus::Checking);

        assert!(conductor.wait_for_outcome().await);
        assert!(conductor.auth().is_signed_in());

        let messages = drain(&mut rx);
        assert!(messages.iter().any(|m| matches!(
            m,
            CompanionMessage::Auth { status: AuthStatus::SignedIn(_) }
        )));
    }

    #[tokio::test]
    async fn test_exchange_round_trip() {
        let (mut conductor, mut rx) = conductor(MockApi::default(), quiet_config());
        conductor.start().await.unwrap();
        drain(&mut rx);

        conductor.handle_event(user_message("I feel hopeless")).await.unwrap();

        // The user line is out before the reply resolves
        let before = drain(&mut rx);
        assert_eq!(
            chat_lines(&before),
            vec![(MessageRole::User, "I feel hopeless".to_string())]
        );
        assert!(before.iter().any(|m| matches!(
            m,
            CompanionMessage::State { state: ExchangeState::AwaitingResponse }
        )));

        assert!(conductor.wait_for_outcome().await);
        let after = drain(&mut rx);
        assert_eq!(
            chat_lines(&after),
            vec![(MessageRole::Assistant, "You're not alone in this.".to_string())]
        );
        assert!(after.iter().any(|m| matches!(
            m,
            CompanionMessage::Insight { snapshot } if snapshot.mood.as_deref() == Some("sadness") && !snapshot.analyzing
        )));
        assert_eq!(conductor.session().state(), ExchangeState::SettledOk);

        // Resource lookup follows
        assert!(conductor.wait_for_outcome().await);
        assert_eq!(conductor.session().resources().options.len(), 1);
        assert!(!conductor.session().resources().loading);
    }

    #[tokio::test]
    async fn test_wait_for_outcome_returns_when_idle() {
        let (mut conductor, _rx) = conductor(MockApi::default(), quiet_config());
        assert_eq!(conductor.in_flight(), 0);
        let waited =
            tokio::time::timeout(Duration::from_millis(300), conductor.wait_for_outcome()).await;
        assert_eq!(waited, Ok(false));

        conductor.start().await.unwrap();
        conductor.handle_event(user_message("hello")).await.unwrap();
        assert_eq!(conductor.in_flight(), 1);
        assert!(conductor.wait_for_outcome().await);
        assert!(conductor.wait_for_outcome().await);
        assert_eq!(conductor.in_flight(), 0);
        assert!(!conductor.wait_for_outcome().await);
    }

    #[tokio::test]
    async fn test_more_resources_waits_for_first_lookup() {
        let (mut conductor, mut rx) = conductor(MockApi::default(), quiet_config());
        conductor.start().await.unwrap();
        conductor.handle_event(user_message("hello")).await.unwrap();
        assert!(conductor.wait_for_outcome().await);
        assert!(conductor.session().resources().loading);
        drain(&mut rx);

        conductor
            .handle_event(SurfaceEvent::MoreResourcesRequested {
                event_id: SurfaceEvent::new_event_id(),
            })
            .await
            .unwrap();
        assert_eq!(conductor.in_flight(), 1);
        assert!(drain(&mut rx).iter().any(|m| matches!(
            m,
            CompanionMessage::Notify { message, .. } if message == "Still looking for resources"
        )));
    }

    #[tokio::test]
    async fn test_network_error_becomes_error_line() {
        let api = MockApi {
            chat: Err(ApiError::Network("connection refused".to_string())),
            ..MockApi::default()
        };
        let (mut conductor, mut rx) = conductor(api, quiet_config());

        conductor.handle_event(user_message("hello")).await.unwrap();
        conductor.wait_for_outcome().await;

        let messages = drain(&mut rx);
        let error_line = messages.iter().rev().find_map(|m| match m {
            CompanionMessage::Message {
                content,
                content_type: ContentType::Error,
                ..
            } => Some(content.clone()),
            _ => None,
        });
        assert!(error_line.unwrap().starts_with("Error:"));
        assert_eq!(conductor.session().state(), ExchangeState::SettledError);
        assert!(conductor.session().insight().mood.is_none());
    }

    #[tokio::test]
    async fn test_second_message_while_waiting_is_ignored() {
        let (mut conductor, mut rx) = conductor(MockApi::default(), quiet_config());

        conductor.handle_event(user_message("first")).await.unwrap();
        conductor.handle_event(user_message("second")).await.unwrap();

        let lines = chat_lines(&drain(&mut rx));
        assert_eq!(lines, vec![(MessageRole::User, "first".to_string())]);
        assert_eq!(conductor.session().messages().len(), 1);
    }

    #[tokio::test]
    async fn test_overlong_message_is_reported() {
        let (mut conductor, mut rx) = conductor(MockApi::default(), quiet_config());
        conductor
            .handle_event(user_message(&"x".repeat(5000)))
            .await
            .unwrap();

        let messages = drain(&mut rx);
        assert!(messages.iter().any(|m| matches!(
            m,
            CompanionMessage::Notify { level: NotifyLevel::Warning, .. }
        )));
        assert!(conductor.session().messages().is_empty());
    }

    #[tokio::test]
    async fn test_resource_failure_does_not_touch_chat() {
        let api = MockApi {
            resources: Err(ApiError::from_status_body(500, "")),
            ..MockApi::default()
        };
        let (mut conductor, _rx) = conductor(api, quiet_config());

        conductor.handle_event(user_message("hi")).await.unwrap();
        conductor.wait_for_outcome().await;
        conductor.wait_for_outcome().await;

        assert_eq!(conductor.session().state(), ExchangeState::SettledOk);
        assert!(conductor.session().resources().is_empty());
        assert!(!conductor.session().resources().needs_clinician);
        assert_eq!(conductor.session().messages().len(), 2);
    }

    #[tokio::test]
    async fn test_crisis_reply_sends_support_notice() {
        let mut api = MockApi::default();
        if let Ok(reply) = api.chat.as_mut() {
            reply.safety = Some(Safety {
                level: SafetyLevel::CrisisSelf,
                reason: "self-harm language".to_string(),
            });
            reply.crisis_detected = true;
        }
        let (mut conductor, mut rx) = conductor(api, quiet_config());

        conductor.handle_event(user_message("I want to disappear")).await.unwrap();
        conductor.wait_for_outcome().await;

        let messages = drain(&mut rx);
        assert!(messages.iter().any(|m| matches!(
            m,
            CompanionMessage::Notify { message, .. } if message.contains("https://findahelpline.com")
        )));
    }

    #[tokio::test]
    async fn test_another_strategy() {
        let (mut conductor, _rx) = conductor(MockApi::default(), quiet_config());

        conductor.handle_event(user_message("hi")).await.unwrap();
        conductor.wait_for_outcome().await;
        conductor.wait_for_outcome().await;

        conductor
            .handle_event(SurfaceEvent::AnotherStrategyRequested {
                event_id: SurfaceEvent::new_event_id(),
            })
            .await
            .unwrap();
        conductor.wait_for_outcome().await;

        assert_eq!(
            conductor.session().insight().strategy.as_deref(),
            Some("Step outside for two minutes")
        );
    }

    #[tokio::test]
    async fn test_login_and_logout() {
        let (mut conductor, mut rx) = conductor(MockApi::default(), quiet_config());

        conductor
            .handle_event(SurfaceEvent::LoginRequested {
                event_id: SurfaceEvent::new_event_id(),
            })
            .await
            .unwrap();
        let messages = drain(&mut rx);
        assert!(messages.iter().any(|m| matches!(
            m,
            CompanionMessage::LoginUrl { url } if url.ends_with("/auth/google")
        )));

        conductor
            .handle_event(SurfaceEvent::LogoutRequested {
                event_id: SurfaceEvent::new_event_id(),
            })
            .await
            .unwrap();
        conductor.wait_for_outcome().await;
        assert_eq!(conductor.auth(), &AuthStatus::Anonymous);
    }

    #[tokio::test]
    async fn test_quit_cancels_and_says_goodbye() {
        let (mut conductor, mut rx) = conductor(MockApi::default(), quiet_config());
        conductor
            .handle_event(SurfaceEvent::QuitRequested {
                event_id: SurfaceEvent::new_event_id(),
            })
            .await
            .unwrap();

        let messages = drain(&mut rx);
        assert!(matches!(messages.last(), Some(CompanionMessage::Quit { .. })));
        assert!(!conductor.poll().await);
    }

    #[test]
    fn test_greeting_by_hour() {
        assert!(greeting(8).starts_with("Good morning"));
        assert!(greeting(14).starts_with("Good afternoon"));
        assert!(greeting(19).starts_with("Good evening"));
        assert!(greeting(3).contains("up late"));
    }
}
