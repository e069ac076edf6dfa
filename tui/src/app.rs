//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, mouse, resize)
//! - ConductorClient for orchestration
//! - DisplayState for rendering
//!
//! The App:
//! 1. Converts terminal events to SurfaceEvents
//! 2. Sends events to the embedded Conductor via ConductorClient
//! 3. Receives CompanionMessages and updates DisplayState
//! 4. Renders based on DisplayState

use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, EventStream, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind,
};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};
use unicode_width::UnicodeWidthChar;

use companion_core::{CompanionApi, CompanionConfigFile, HttpCompanionApi, ScrollTracker};

use crate::conductor_client::ConductorClient;
use crate::display::{DisplayRole, DisplayState};
use crate::theme::{self, COMPANION_TEAL, CRISIS_BG, DIM_GRAY, ERROR_RED, USER_GREEN};
use crate::widgets::{InsightPanel, Paragraphs, ResourceList, TextBlock};

/// Input box height (lines) for text wrapping
const INPUT_HEIGHT: u16 = 4;

/// Width of the insight/resources column
const SIDE_PANEL_WIDTH: u16 = 42;

/// Below this terminal width the side panel is hidden
const SIDE_PANEL_MIN_TERMINAL: u16 = 90;

/// Rows moved per mouse wheel notch
const WHEEL_ROWS: isize = 3;

/// Idle tick between frames
const TICK: Duration = Duration::from_millis(50);

/// Goodbye lines shown when the Conductor has none
const QUICK_GOODBYES: &[&str] = &[
    "Take care of yourself.",
    "Be gentle with yourself today.",
    "One small step at a time.",
    "You did something good by checking in.",
    "Rest if you can.",
];

/// Main application state
pub struct App<A: CompanionApi + 'static = HttpCompanionApi> {
    // === Core State ===
    /// Is the app still running?
    running: bool,
    /// Goodbye message to show on exit
    goodbye_message: Option<String>,

    // === Conductor Integration ===
    /// Client for communicating with the embedded Conductor
    conductor: ConductorClient<A>,
    /// Display state derived from CompanionMessages
    display: DisplayState,

    // === Input State ===
    /// User input buffer
    input_buffer: String,
    /// Conversation scroll
    scroll: ScrollTracker,

    // === Settings ===
    /// Crisis-support link used when the backend supplies none
    crisis_support_url: String,

    // === Misc State ===
    /// Last frame time (for notification timers)
    last_frame: Instant,
    /// Terminal size
    size: (u16, u16),
}

impl<A: CompanionApi + 'static> App<A> {
    /// Create a new App instance
    pub fn new(conductor: ConductorClient<A>, config: &CompanionConfigFile, size: (u16, u16)) -> Self {
        Self {
            running: true,
            goodbye_message: None,
            conductor,
            display: DisplayState::new(),
            input_buffer: String::new(),
            scroll: ScrollTracker::new(config.stick_threshold),
            crisis_support_url: config.crisis_support_url.clone(),
            last_frame: Instant::now(),
            size,
        }
    }

    /// Main event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        // Render initial frame immediately so user sees UI
        terminal.draw(|frame| self.draw(frame))?;

        if let Err(e) = self.conductor.start().await {
            tracing::warn!(error = %e, "Conductor start error");
        }
        if let Err(e) = self.conductor.connect().await {
            tracing::warn!(error = %e, "Conductor connect error");
        }

        // Create async event stream for non-blocking terminal events
        let mut event_stream = EventStream::new();

        while self.running {
            tokio::select! {
                biased;

                // Check for terminal events - highest priority
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        // Only handle Press events (not Release or Repeat)
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            self.handle_key(key).await;
                        }
                        Some(Ok(Event::Mouse(mouse))) => self.handle_mouse(mouse),
                        Some(Ok(Event::Resize(w, h))) => self.size = (w, h),
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "Terminal event error");
                        }
                        None => self.running = false,
                    }
                }

                () = tokio::time::sleep(TICK) => {}
            }

            // Apply finished network calls
            self.conductor.poll().await;

            // Receive and process messages from Conductor
            self.process_conductor_messages();

            self.update();

            terminal.draw(|frame| self.draw(frame))?;

            if self.display.quit_requested {
                self.running = false;
            }
        }

        Ok(())
    }

    /// Process all pending messages from the Conductor
    pub fn process_conductor_messages(&mut self) {
        for msg in self.conductor.recv_all() {
            self.display.apply_message(msg);
        }
        if let Some(message) = &self.display.quit_message {
            self.goodbye_message = Some(message.clone());
        }
    }

    /// Handle keyboard input
    pub async fn handle_key(&mut self, key: event::KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let result = match key.code {
            // Quit
            KeyCode::Esc => self.quit().await,
            KeyCode::Char('c') if ctrl => self.quit().await,

            // Follow-up lookups
            KeyCode::Char('n') if ctrl => self.conductor.request_more_resources().await,
            KeyCode::Char('s') if ctrl => self.conductor.request_another_strategy().await,

            // Account
            KeyCode::Char('l') if ctrl => self.conductor.request_login().await,
            KeyCode::Char('o') if ctrl => self.conductor.request_logout().await,

            // Submit message
            KeyCode::Enter => {
                if self.input_buffer.trim().is_empty() || self.display.is_waiting() {
                    Ok(())
                } else {
                    let message = std::mem::take(&mut self.input_buffer);
                    self.scroll.stick_to_bottom();
                    self.display.clear_notification();
                    self.conductor.send_message(message).await
                }
            }

            // Typing
            KeyCode::Char(c) if !ctrl => {
                self.input_buffer.push(c);
                Ok(())
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
                Ok(())
            }

            // Conversation scrolling
            KeyCode::PageUp => {
                self.scroll.scroll_by(-self.page_rows());
                Ok(())
            }
            KeyCode::PageDown => {
                self.scroll.scroll_by(self.page_rows());
                Ok(())
            }
            KeyCode::Home if ctrl => {
                self.scroll.scroll_to(0);
                Ok(())
            }
            KeyCode::End if ctrl => {
                self.scroll.stick_to_bottom();
                Ok(())
            }

            _ => Ok(()),
        };

        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to forward key to Conductor");
        }
    }

    /// Handle mouse input
    fn handle_mouse(&mut self, mouse: event::MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.scroll.scroll_by(-WHEEL_ROWS),
            MouseEventKind::ScrollDown => self.scroll.scroll_by(WHEEL_ROWS),
            _ => {}
        }
    }

    async fn quit(&mut self) -> anyhow::Result<()> {
        self.generate_goodbye();
        self.running = false;
        let result = self.conductor.request_quit().await;
        self.process_conductor_messages();
        result
    }

    fn page_rows(&self) -> isize {
        let rows = self.size.1.saturating_sub(INPUT_HEIGHT + 1) / 2;
        isize::try_from(rows.max(1)).unwrap_or(1)
    }

    /// Update timers
    fn update(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;
        self.display.update(delta);
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Draw one frame
    pub fn draw(&mut self, frame: &mut Frame<'_>) {
        let area = frame.area();
        self.size = (area.width, area.height);

        let banner_height = u16::from(self.display.show_crisis_banner());
        let [banner, body, input, status] = Layout::vertical([
            Constraint::Length(banner_height),
            Constraint::Min(3),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(1),
        ])
        .areas(area);

        if banner_height > 0 {
            self.render_crisis_banner(frame, banner);
        }

        if area.width >= SIDE_PANEL_MIN_TERMINAL {
            let [conversation, side] =
                Layout::horizontal([Constraint::Min(30), Constraint::Length(SIDE_PANEL_WIDTH)])
                    .areas(body);
            self.render_conversation(frame, conversation);
            self.render_side_panel(frame, side);
        } else {
            self.render_conversation(frame, body);
        }

        self.render_input(frame, input);
        self.render_status(frame, status);
    }

    fn render_crisis_banner(&self, frame: &mut Frame<'_>, area: Rect) {
        let link = self.display.crisis_link(&self.crisis_support_url);
        let text = format!(" You don't have to face this alone. If you might be in danger, reach out now: {link}");
        let style = Style::default()
            .bg(CRISIS_BG)
            .fg(ratatui::style::Color::White)
            .add_modifier(Modifier::BOLD);
        frame.render_widget(Paragraph::new(fit(&text, area.width)).style(style), area);
    }

    /// Render conversation pane
    fn render_conversation(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let area = Rect {
            x: area.x + 1,
            width: area.width.saturating_sub(2),
            ..area
        };

        let mut paragraphs: Paragraphs = self
            .display
            .messages
            .iter()
            .map(|msg| {
                let style = match msg.role {
                    DisplayRole::User => Style::default().fg(USER_GREEN),
                    DisplayRole::Companion => Style::default().fg(COMPANION_TEAL),
                    DisplayRole::Error => Style::default().fg(ERROR_RED),
                };
                (msg.prefixed(), style)
            })
            .collect();

        if self.display.is_waiting() {
            paragraphs.push((
                "Companion is thinking...".to_string(),
                Style::default().fg(DIM_GRAY).add_modifier(Modifier::ITALIC),
            ));
        }

        frame.render_stateful_widget(TextBlock::new(&paragraphs), area, &mut self.scroll);
    }

    fn render_side_panel(&self, frame: &mut Frame<'_>, area: Rect) {
        let [insight, resources] =
            Layout::vertical([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(area);
        frame.render_widget(InsightPanel::new(&self.display.insight), insight);
        frame.render_widget(ResourceList::new(&self.display.resources), resources);
    }

    /// Render input box
    fn render_input(&self, frame: &mut Frame<'_>, area: Rect) {
        if area.height < 2 || area.width < 5 {
            return;
        }

        let separator = "-".repeat(area.width as usize);
        frame.render_widget(
            Paragraph::new(separator).style(Style::default().fg(DIM_GRAY)),
            Rect { height: 1, ..area },
        );

        let text_height = area.height.saturating_sub(1) as usize;
        let text_width = area.width.saturating_sub(1) as usize;

        let full_input = format!("You: {}_", self.input_buffer);
        let wrapped: Vec<String> = textwrap::wrap(&full_input, text_width)
            .into_iter()
            .map(std::borrow::Cow::into_owned)
            .collect();
        let skip = wrapped.len().saturating_sub(text_height);
        let lines: Vec<Line<'_>> = wrapped
            .into_iter()
            .skip(skip)
            .map(|l| Line::from(Span::styled(l, Style::default().fg(USER_GREEN))))
            .collect();

        frame.render_widget(
            Paragraph::new(lines),
            Rect {
                y: area.y + 1,
                height: area.height - 1,
                ..area
            },
        );
    }

    /// Render status bar
    fn render_status(&self, frame: &mut Frame<'_>, area: Rect) {
        let (text, style) = match &self.display.notification {
            Some(notification) => (
                format!(" {}", notification.text()),
                Style::default().fg(theme::notify(notification.level)),
            ),
            None => {
                let scroll_info = if self.scroll.is_stuck() {
                    String::new()
                } else {
                    format!(" [^{} rows - PgDn]", self.scroll.distance_from_bottom())
                };
                (
                    format!(
                        " {} | {} | Enter send  ^N more  ^S strategy  ^L sign in  ^O sign out  Esc quit{}",
                        self.display.exchange_state.description(),
                        self.display.account_label(),
                        scroll_info,
                    ),
                    Style::default().fg(DIM_GRAY),
                )
            }
        };
        frame.render_widget(Paragraph::new(fit(&text, area.width)).style(style), area);
    }

    /// Generate a quick goodbye message
    fn generate_goodbye(&mut self) {
        let idx = rand::random::<usize>() % QUICK_GOODBYES.len();
        self.goodbye_message = Some(QUICK_GOODBYES[idx].to_string());
    }

    /// Get the goodbye message for display after TUI closes
    pub fn goodbye(&self) -> Option<&str> {
        self.goodbye_message.as_deref()
    }

    /// Current display state
    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Text typed so far
    pub fn input(&self) -> &str {
        &self.input_buffer
    }

    /// Whether the loop is still running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Embedded client
    pub fn conductor_mut(&mut self) -> &mut ConductorClient<A> {
        &mut self.conductor
    }
}

/// Cut `text` to fit `width` terminal columns
fn fit(text: &str, width: u16) -> String {
    let mut used = 0;
    text.chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= width as usize
        })
        .collect()
}
