//! Widgets
//!
//! Borderless building blocks the app composes each frame.

pub mod gauge;
pub mod insight;
pub mod resources;
pub mod text_block;

pub use gauge::MoodGauge;
pub use insight::InsightPanel;
pub use resources::ResourceList;
pub use text_block::{Paragraphs, TextBlock};
