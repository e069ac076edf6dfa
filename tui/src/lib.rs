//! Companion TUI - Terminal interface for the mental-health companion
//!
//! A full-screen chat client: the conversation on the left, and on the right
//! an insight panel (mood gauge, suggested micro-step, safety badge) above the
//! suggested resources.
//!
//! # Architecture
//!
//! - **ConductorClient**: Embeds the headless session core
//! - **DisplayState**: Render state derived from `CompanionMessage`s
//! - **Widgets**: Conversation text block, mood gauge, insight and resource panels
//! - **Theme**: Palette shared by every widget

pub mod app;
pub mod conductor_client;
pub mod display;
pub mod theme;
pub mod widgets;

pub use app::App;
