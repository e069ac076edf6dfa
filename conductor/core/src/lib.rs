//! Companion Core - Headless Chat Session Core for the companion client
//!
//! This crate provides the client-side logic of the mental-health companion,
//! completely independent of any UI framework. Mood classification, strategy
//! selection, crisis detection and resource ranking live behind the backend
//! HTTP API; what lives here is the session state machine that drives it, the
//! mood gauge geometry, and the identity/auth plumbing around them.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        UI Surfaces                            │
//! │  ┌─────────┐  ┌──────────────────┐  ┌──────────────────────┐  │
//! │  │   TUI   │  │  mood-gauge CLI  │  │  Headless / tests    │  │
//! │  │(ratatui)│  │      (SVG)       │  │                      │  │
//! │  └────┬────┘  └────────┬─────────┘  └──────────┬───────────┘  │
//! │       │                │                       │              │
//! │       └───────  SurfaceEvent (up)  ────────────┘              │
//! │              CompanionMessage (down)                          │
//! └──────────────────────────┼────────────────────────────────────┘
//!                            │
//! ┌──────────────────────────┼────────────────────────────────────┐
//! │                    COMPANION CORE                             │
//! │  ┌───────────────────────┴─────────────────────────────────┐  │
//! │  │                      Conductor                           │  │
//! │  │  ┌─────────────┐  ┌──────────┐  ┌──────────┐  ┌───────┐  │  │
//! │  │  │ ChatSession │  │ Identity │  │   Auth   │  │  API  │  │  │
//! │  │  └─────────────┘  └──────────┘  └──────────┘  └───────┘  │  │
//! │  └──────────────────────────────────────────────────────────┘  │
//! │        gauge · scroll · security · config                      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Conductor`]: Drives one session against the companion API
//! - [`ChatSession`]: The exchange state machine (message log, insight, resources)
//! - [`CompanionMessage`]: Messages sent from Conductor to UI surfaces
//! - [`SurfaceEvent`]: Events sent from UI surfaces to Conductor
//! - [`GaugeLayout`]: Mood dial geometry, rendered to SVG or a terminal canvas
//!
//! # Quick Start
//!
//! ```ignore
//! use companion_core::{
//!     Conductor, ConductorConfig, HttpCompanionApi, FileIdentityStore,
//!     events::{SurfaceEvent, SurfaceType},
//! };
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = companion_core::load_config()?;
//!     let (tx, mut rx) = mpsc::channel(100);
//!
//!     let api = HttpCompanionApi::from_config(&config);
//!     let identity = FileIdentityStore::from_override(config.identity_path.as_deref());
//!     let mut conductor = Conductor::new(api, identity, ConductorConfig::from_file(&config), tx);
//!     conductor.start().await?;
//!
//!     conductor.handle_event(SurfaceEvent::UserMessage {
//!         event_id: SurfaceEvent::new_event_id(),
//!         content: "I feel hopeless".into(),
//!     }).await?;
//!
//!     loop {
//!         while let Ok(msg) = rx.try_recv() {
//!             // Render message
//!         }
//!         conductor.poll().await;
//!     }
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`api`]: Companion API trait, HTTP client, wire types and errors
//! - [`auth`]: Timed, cancellable session check
//! - [`conductor`]: Main Conductor struct
//! - [`config`]: TOML/env/CLI configuration
//! - [`events`]: Events from UI surfaces to Conductor
//! - [`gauge`]: Mood gauge geometry and SVG rendering
//! - [`identity`]: Stable user identity providers
//! - [`insight`]: Mood, safety and strategy snapshot
//! - [`messages`]: Messages from Conductor to UI surfaces
//! - [`resources`]: Suggested resources panel
//! - [`scroll`]: Auto-stick-to-bottom scroll tracking
//! - [`security`]: Input validation
//! - [`session`]: The chat session state machine
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework. It's pure client logic that can be used anywhere.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod auth;
pub mod conductor;
pub mod config;
pub mod events;
pub mod gauge;
pub mod identity;
pub mod insight;
pub mod messages;
pub mod resources;
pub mod scroll;
pub mod security;
pub mod session;

// Re-exports for convenience
pub use api::{ApiError, CompanionApi, HttpCompanionApi};
pub use auth::{check_session, AuthStatus};
pub use conductor::{Conductor, ConductorConfig};
pub use events::{SurfaceEvent, SurfaceType};
pub use gauge::{render_svg, GaugeLayout};
pub use identity::{FileIdentityStore, IdentityProvider, StaticIdentity};
pub use insight::{Crisis, InsightSnapshot, Mood, Safety, SafetyLevel, StrategySource};
pub use messages::{
    CompanionMessage, ContentType, EventId, ExchangeState, MessageId, MessageRole, NotifyLevel,
    SessionId,
};
pub use resources::{ResourceKind, ResourceOption, ResourcePanel};
pub use scroll::ScrollTracker;
pub use security::{InputLimits, InputValidator, ValidationResult};
pub use session::{
    ChatMessage, ChatSession, ExchangeTicket, SessionConfig, SessionSnapshot, StaleOutcome,
    SubmitRejection,
};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, CompanionConfigFile, CompanionToml,
    ConfigError, ConfigOverrides, ConfigSource,
};
