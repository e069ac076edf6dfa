//! Integration Tests for TUI + Conductor
//!
//! These tests drive the App the way a user would (key presses in, frames
//! out) against a scripted companion API, rendering into ratatui's
//! `TestBackend`.
//!
//! # Test Coverage
//!
//! 1. **Exchange Flow**: typed message, reply, insight and resources on screen
//! 2. **Crisis Banner**: crisis safety level shows the support link
//! 3. **Error Line**: a failed exchange shows a single error line
//! 4. **Follow-ups**: Ctrl+N / Ctrl+S with and without a prior exchange
//! 5. **Quit**: Esc ends the loop with the Conductor's goodbye

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;

use companion_core::api::{
    ChatReply, ChatRequest, ResourceReply, ResourceRequest, StrategyReply, StrategyRequest,
    UserProfile,
};
use companion_core::{
    ApiError, CompanionApi, CompanionConfigFile, ConductorConfig, ExchangeState, ResourceKind,
    ResourceOption, Safety, SafetyLevel, StaticIdentity,
};
use companion_tui::conductor_client::ConductorClient;
use companion_tui::App;

// ============================================================================
// Scripted API
// ============================================================================

#[derive(Clone)]
struct ScriptedApi {
    chat: Result<ChatReply, ApiError>,
    resources: Result<ResourceReply, ApiError>,
    strategy: Result<StrategyReply, ApiError>,
    resource_calls: Arc<AtomicUsize>,
}

impl ScriptedApi {
    fn new() -> Self {
        Self {
            chat: Ok(reply("sadness", SafetyLevel::Safe)),
            resources: Ok(ResourceReply {
                options: vec![ResourceOption {
                    id: "yt-1".into(),
                    kind: ResourceKind::Video,
                    title: "Box breathing".into(),
                    url: "https://example.com/box".into(),
                    duration: Some("3m".into()),
                    why: None,
                    source: None,
                }],
                needs_clinician: false,
                crisis_link: None,
            }),
            strategy: Ok(StrategyReply {
                strategy: "Step outside for two minutes".into(),
            }),
            resource_calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

fn reply(mood: &str, level: SafetyLevel) -> ChatReply {
    ChatReply {
        mood: mood.into(),
        strategy: "Try a 60s breath".into(),
        encouragement: "You're not alone in this.".into(),
        crisis_detected: level.is_crisis(),
        safety: Some(Safety {
            level,
            reason: String::new(),
        }),
        strategy_why: None,
        strategy_source: None,
        advice_given: true,
        mood_confidence: Some(0.8),
    }
}

#[async_trait]
impl CompanionApi for ScriptedApi {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn health_check(&self) -> bool {
        true
    }

    async fn chat(&self, _request: &ChatRequest) -> Result<ChatReply, ApiError> {
        self.chat.clone()
    }

    async fn suggest_resources(
        &self,
        _request: &ResourceRequest,
    ) -> Result<ResourceReply, ApiError> {
        self.resource_calls.fetch_add(1, Ordering::SeqCst);
        self.resources.clone()
    }

    async fn suggest_strategy(
        &self,
        _request: &StrategyRequest,
    ) -> Result<StrategyReply, ApiError> {
        self.strategy.clone()
    }

    async fn me(&self) -> Result<Option<UserProfile>, ApiError> {
        Ok(None)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        Ok(())
    }

    fn login_url(&self) -> String {
        "http://127.0.0.1:8000/api/auth/google".into()
    }
}

// ============================================================================
// Harness
// ============================================================================

async fn started_app(api: ScriptedApi) -> App<ScriptedApi> {
    let client = ConductorClient::new(
        api,
        StaticIdentity("u_tui".into()),
        ConductorConfig {
            check_auth_on_start: false,
            greet_on_start: false,
            ..ConductorConfig::default()
        },
    );
    let mut app = App::new(client, &CompanionConfigFile::default(), (110, 32));
    app.conductor_mut().start().await.unwrap();
    app.conductor_mut().connect().await.unwrap();
    app.process_conductor_messages();
    app
}

async fn type_text(app: &mut App<ScriptedApi>, text: &str) {
    for c in text.chars() {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
            .await;
    }
}

async fn press(app: &mut App<ScriptedApi>, code: KeyCode, modifiers: KeyModifiers) {
    app.handle_key(KeyEvent::new(code, modifiers)).await;
}

/// Wait for `n` network calls to land, then pull the resulting messages
async fn settle(app: &mut App<ScriptedApi>, n: usize) {
    for _ in 0..n {
        assert!(app.conductor_mut().wait_for_outcome().await);
    }
    app.process_conductor_messages();
}

fn screen(app: &mut App<ScriptedApi>, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|frame| app.draw(frame)).unwrap();
    let buffer = terminal.backend().buffer();
    (0..buffer.area.height)
        .map(|y| {
            (0..buffer.area.width)
                .map(|x| buffer[(x, y)].symbol().to_string())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Test 1: Exchange Flow
// ============================================================================

#[tokio::test]
async fn test_exchange_renders_reply_insight_and_resources() {
    let api = ScriptedApi::new();
    let resource_calls = Arc::clone(&api.resource_calls);
    let mut app = started_app(api).await;

    type_text(&mut app, "I feel hopeless").await;
    assert_eq!(app.input(), "I feel hopeless");
    press(&mut app, KeyCode::Enter, KeyModifiers::NONE).await;
    assert_eq!(app.input(), "");

    app.process_conductor_messages();
    assert_eq!(app.display().exchange_state, ExchangeState::AwaitingResponse);
    assert!(screen(&mut app, 110, 32).contains("Companion is thinking..."));

    settle(&mut app, 2).await;
    assert_eq!(resource_calls.load(Ordering::SeqCst), 1);

    let display = app.display();
    assert_eq!(display.messages.len(), 2);
    assert_eq!(display.insight.mood.as_deref(), Some("sadness"));
    assert_eq!(display.resources.options.len(), 1);

    let frame = screen(&mut app, 110, 32);
    assert!(frame.contains("You: I feel hopeless"));
    assert!(frame.contains("Companion: You're not alone in this."));
    assert!(frame.contains("Mood: sadness"));
    assert!(frame.contains("Box breathing"));
    assert!(!frame.contains("reach out now"));
}

#[tokio::test]
async fn test_blank_input_is_not_sent() {
    let mut app = started_app(ScriptedApi::new()).await;
    type_text(&mut app, "   ").await;
    press(&mut app, KeyCode::Enter, KeyModifiers::NONE).await;
    app.process_conductor_messages();

    assert!(app.display().messages.is_empty());
    assert_eq!(app.display().exchange_state, ExchangeState::Idle);
}

#[tokio::test]
async fn test_narrow_terminal_hides_side_panel() {
    let mut app = started_app(ScriptedApi::new()).await;
    type_text(&mut app, "hello").await;
    press(&mut app, KeyCode::Enter, KeyModifiers::NONE).await;
    settle(&mut app, 2).await;

    let frame = screen(&mut app, 60, 24);
    assert!(frame.contains("You: hello"));
    assert!(!frame.contains("How you're doing"));
}

// ============================================================================
// Test 2: Crisis Banner
// ============================================================================

#[tokio::test]
async fn test_crisis_reply_shows_banner() {
    let mut api = ScriptedApi::new();
    api.chat = Ok(reply("distress", SafetyLevel::CrisisSelf));
    api.resources = Ok(ResourceReply {
        options: Vec::new(),
        needs_clinician: true,
        crisis_link: Some("https://988lifeline.org".into()),
    });
    let mut app = started_app(api).await;

    type_text(&mut app, "I don't want to be here").await;
    press(&mut app, KeyCode::Enter, KeyModifiers::NONE).await;
    settle(&mut app, 2).await;

    let frame = screen(&mut app, 140, 40);
    let banner = frame.lines().next().unwrap();
    assert!(banner.contains("reach out now: https://988lifeline.org"));
    assert!(frame.contains("[Crisis (self)]"));
}

// ============================================================================
// Test 3: Error Line
// ============================================================================

#[tokio::test]
async fn test_failed_exchange_shows_error_line() {
    let mut api = ScriptedApi::new();
    api.chat = Err(ApiError::Timeout);
    let resource_calls = Arc::clone(&api.resource_calls);
    let mut app = started_app(api).await;

    type_text(&mut app, "hello").await;
    press(&mut app, KeyCode::Enter, KeyModifiers::NONE).await;
    settle(&mut app, 1).await;

    assert_eq!(app.display().exchange_state, ExchangeState::SettledError);
    assert_eq!(resource_calls.load(Ordering::SeqCst), 0);

    let frame = screen(&mut app, 110, 32);
    assert!(frame.contains("Error: the companion service took too long to answer"));
    assert!(!frame.contains("Companion: "));
}

// ============================================================================
// Test 4: Follow-ups
// ============================================================================

#[tokio::test]
async fn test_more_resources_needs_an_exchange() {
    let api = ScriptedApi::new();
    let resource_calls = Arc::clone(&api.resource_calls);
    let mut app = started_app(api).await;

    press(&mut app, KeyCode::Char('n'), KeyModifiers::CONTROL).await;
    app.process_conductor_messages();

    assert_eq!(resource_calls.load(Ordering::SeqCst), 0);
    assert!(app
        .display()
        .notification
        .as_ref()
        .unwrap()
        .message
        .contains("Share how you're doing first"));
    // Ctrl+N is not typed into the input
    assert_eq!(app.input(), "");
}

#[tokio::test]
async fn test_sending_clears_stale_notification() {
    let mut app = started_app(ScriptedApi::new()).await;
    press(&mut app, KeyCode::Char('n'), KeyModifiers::CONTROL).await;
    app.process_conductor_messages();
    assert!(app.display().notification.is_some());

    type_text(&mut app, "hello").await;
    press(&mut app, KeyCode::Enter, KeyModifiers::NONE).await;
    assert!(app.display().notification.is_none());
}

#[tokio::test]
async fn test_more_resources_and_another_strategy() {
    let api = ScriptedApi::new();
    let resource_calls = Arc::clone(&api.resource_calls);
    let mut app = started_app(api).await;

    type_text(&mut app, "can't sleep").await;
    press(&mut app, KeyCode::Enter, KeyModifiers::NONE).await;
    settle(&mut app, 2).await;

    press(&mut app, KeyCode::Char('n'), KeyModifiers::CONTROL).await;
    settle(&mut app, 1).await;
    assert_eq!(resource_calls.load(Ordering::SeqCst), 2);

    press(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL).await;
    settle(&mut app, 1).await;
    assert_eq!(
        app.display().insight.strategy.as_deref(),
        Some("Step outside for two minutes")
    );
}

#[tokio::test]
async fn test_login_shows_url() {
    let mut app = started_app(ScriptedApi::new()).await;
    press(&mut app, KeyCode::Char('l'), KeyModifiers::CONTROL).await;
    app.process_conductor_messages();

    assert_eq!(
        app.display().login_url.as_deref(),
        Some("http://127.0.0.1:8000/api/auth/google")
    );
    assert!(screen(&mut app, 110, 32).contains("Sign in: open http://127.0.0.1:8000/api/auth/google"));
}

// ============================================================================
// Test 5: Quit
// ============================================================================

#[tokio::test]
async fn test_escape_quits_with_goodbye() {
    let mut app = started_app(ScriptedApi::new()).await;
    assert!(app.is_running());

    press(&mut app, KeyCode::Esc, KeyModifiers::NONE).await;

    assert!(!app.is_running());
    assert!(app.display().quit_requested);
    assert_eq!(app.goodbye(), Some("Take care of yourself."));
}
