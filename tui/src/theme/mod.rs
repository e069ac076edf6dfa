//! Theme and Colors
//!
//! The companion palette: calm teal for the companion's voice, soft green for
//! the user, and the mood gauge colours shared with the SVG renderer.

use companion_core::gauge::{self, Rgb};
use companion_core::{Mood, NotifyLevel, SafetyLevel};
use ratatui::style::Color;

// ============================================================================
// Conversation
// ============================================================================

/// Companion replies
pub const COMPANION_TEAL: Color = Color::Rgb(94, 194, 184);

/// User input green
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

/// System/dim text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Faded rows at the edge of a scrolled view
pub const FADE_GRAY: Color = Color::Rgb(80, 80, 80);

/// Error red
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Success green
pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);

/// Warning amber
pub const WARNING_AMBER: Color = Color::Rgb(245, 180, 70);

// ============================================================================
// Panels
// ============================================================================

/// Panel borders and headers
pub const PANEL_BORDER: Color = Color::Rgb(70, 90, 110);

/// Crisis banner background
pub const CRISIS_BG: Color = Color::Rgb(120, 20, 30);

/// Gauge background the dimmed segments fade into
pub const GAUGE_BACKGROUND: Rgb = Rgb(18, 18, 24);

/// Convert a gauge colour
pub fn rgb(color: Rgb) -> Color {
    Color::Rgb(color.0, color.1, color.2)
}

/// Gauge colour faded toward the background by `opacity`
pub fn faded(color: Rgb, opacity: f64) -> Color {
    let opacity = opacity.clamp(0.0, 1.0);
    let mix = |fg: u8, bg: u8| -> u8 {
        let value = f64::from(bg) + (f64::from(fg) - f64::from(bg)) * opacity;
        value.round().clamp(0.0, 255.0) as u8
    };
    Color::Rgb(
        mix(color.0, GAUGE_BACKGROUND.0),
        mix(color.1, GAUGE_BACKGROUND.1),
        mix(color.2, GAUGE_BACKGROUND.2),
    )
}

/// Colour for a mood label; labels outside the six categories are gray
pub fn mood(label: &str) -> Color {
    Mood::from_label(label).map_or(DIM_GRAY, |m| rgb(gauge::mood_color(m)))
}

/// Safety badge colour
pub fn safety(level: SafetyLevel) -> Color {
    match level {
        SafetyLevel::Safe => SUCCESS_GREEN,
        SafetyLevel::Watch => WARNING_AMBER,
        SafetyLevel::CrisisSelf | SafetyLevel::CrisisOthers => ERROR_RED,
    }
}

/// Notification colour
pub fn notify(level: NotifyLevel) -> Color {
    match level {
        NotifyLevel::Info => COMPANION_TEAL,
        NotifyLevel::Warning => WARNING_AMBER,
        NotifyLevel::Error => ERROR_RED,
        NotifyLevel::Success => SUCCESS_GREEN,
    }
}
