//! Mood Gauge
//!
//! A half-circle dial spanning the six mood categories, negative on the left
//! and positive on the right. Rendering is split in two stages:
//!
//! 1. [`GaugeLayout::new`] computes the geometry (segments, ticks, needle, hub,
//!    optional confidence badge) in pixel space.
//! 2. [`GaugeLayout::to_svg`] serialises that geometry as an SVG document.
//!
//! The terminal surface draws the same layout on a canvas, so both outputs
//! agree on every angle.
//!
//! Angles are in degrees, 180° at the left end of the dial and 0° at the
//! right. Pixel space has y growing downward, so a point at angle θ is
//! `(cx + r·cos θ, cy − r·sin θ)`.
//!
//! Nothing here fails: an unknown mood label points at the first segment.

use crate::insight::Mood;

/// Smallest size (px) the dial is drawn at
pub const MIN_GAUGE_SIZE: u32 = 40;

/// Opacity of the segments that are not active
pub const DIMMED_OPACITY: f64 = 0.35;

/// Confidence below this is flagged as uncertain
pub const UNCERTAIN_BELOW: f32 = 0.55;

/// Angular width of one segment
pub const SEGMENT_SWEEP: f64 = 180.0 / Mood::ORDERED.len() as f64;

/// Colour of a mood segment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// `#rrggbb`
    #[must_use]
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Fixed colour per category
#[must_use]
pub fn mood_color(mood: Mood) -> Rgb {
    match mood {
        Mood::Anger => Rgb(0xdc, 0x26, 0x26),
        Mood::Distress => Rgb(0xf9, 0x73, 0x16),
        Mood::Sadness => Rgb(0x3b, 0x82, 0xf6),
        Mood::Neutral => Rgb(0x9c, 0xa3, 0xaf),
        Mood::Optimism => Rgb(0x84, 0xcc, 0x16),
        Mood::Joy => Rgb(0x22, 0xc5, 0x5e),
    }
}

/// Gauge index for a mood label; unknown labels map to 0
#[must_use]
pub fn mood_index(label: &str) -> usize {
    Mood::from_label(label).map_or(0, Mood::index)
}

/// Needle angle for a segment: the midpoint of its arc
#[must_use]
pub fn needle_angle(index: usize) -> f64 {
    let index = index.min(Mood::ORDERED.len() - 1) as f64;
    180.0 - index * SEGMENT_SWEEP - SEGMENT_SWEEP / 2.0
}

/// A point in pixel space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    /// Horizontal, growing right
    pub x: f64,
    /// Vertical, growing down
    pub y: f64,
}

/// One coloured arc
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    /// Category this arc stands for
    pub mood: Mood,
    /// Left end, degrees
    pub start_angle: f64,
    /// Right end, degrees
    pub end_angle: f64,
    /// Stroke colour
    pub color: Rgb,
    /// 1.0 when active, [`DIMMED_OPACITY`] otherwise
    pub opacity: f64,
    /// Whether the needle points here
    pub active: bool,
    /// SVG path data for the arc
    pub path: String,
}

/// Radial tick between segments
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    /// Angle, degrees
    pub angle: f64,
    /// Inner end
    pub from: Point,
    /// Outer end
    pub to: Point,
}

/// Confidence badge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Badge {
    /// Rounded percentage, 0..=100; below 55 whenever `uncertain`
    pub percent: u8,
    /// Confidence below [`UNCERTAIN_BELOW`]
    pub uncertain: bool,
}

impl Badge {
    /// Badge for a confidence value; `None` for NaN or infinities
    #[must_use]
    pub fn from_confidence(confidence: f32) -> Option<Self> {
        if !confidence.is_finite() {
            return None;
        }
        let clamped = confidence.clamp(0.0, 1.0);
        let uncertain = clamped < UNCERTAIN_BELOW;
        let mut percent = (clamped * 100.0).round() as u8;
        // 0.549 must not read as "55%"
        if uncertain && f32::from(percent) >= UNCERTAIN_BELOW * 100.0 {
            percent -= 1;
        }
        Some(Self { percent, uncertain })
    }

    /// Display text, e.g. `"82%"`
    #[must_use]
    pub fn text(&self) -> String {
        format!("{}%", self.percent)
    }
}

/// Computed dial geometry
#[derive(Clone, Debug, PartialEq)]
pub struct GaugeLayout {
    /// Width of the drawing, px
    pub width: f64,
    /// Height of the drawing, px
    pub height: f64,
    /// Dial centre
    pub center: Point,
    /// Arc radius (centre of the stroke)
    pub radius: f64,
    /// Arc stroke width
    pub stroke_width: f64,
    /// Six segments, left to right
    pub segments: Vec<Segment>,
    /// Seven boundary ticks, left to right
    pub ticks: Vec<Tick>,
    /// Index of the active segment
    pub active_index: usize,
    /// Needle angle, degrees
    pub needle_angle: f64,
    /// Needle tip
    pub needle_tip: Point,
    /// Hub radius
    pub hub_radius: f64,
    /// Confidence badge, when confidence was given
    pub badge: Option<Badge>,
    /// Mood label used for the accessible title
    pub label: String,
}

impl GaugeLayout {
    /// Compute the layout for a mood label and optional confidence
    #[must_use]
    pub fn new(mood: &str, confidence: Option<f32>, size: u32) -> Self {
        let width = f64::from(size.max(MIN_GAUGE_SIZE));
        let stroke_width = width * 0.09;
        let radius = width / 2.0 - stroke_width;
        let center = Point {
            x: width / 2.0,
            y: radius + stroke_width,
        };
        let height = center.y + stroke_width * 2.5;

        let active_index = mood_index(mood);

        let segments = Mood::ORDERED
            .iter()
            .enumerate()
            .map(|(i, &m)| {
                let start_angle = 180.0 - i as f64 * SEGMENT_SWEEP;
                let end_angle = start_angle - SEGMENT_SWEEP;
                let active = i == active_index;
                Segment {
                    mood: m,
                    start_angle,
                    end_angle,
                    color: mood_color(m),
                    opacity: if active { 1.0 } else { DIMMED_OPACITY },
                    active,
                    path: arc_path(center, radius, start_angle, end_angle),
                }
            })
            .collect();

        let ticks = (0..=Mood::ORDERED.len())
            .map(|k| {
                let angle = 180.0 - k as f64 * SEGMENT_SWEEP;
                Tick {
                    angle,
                    from: polar(center, radius - stroke_width, angle),
                    to: polar(center, radius - stroke_width * 0.55, angle),
                }
            })
            .collect();

        let needle_angle = needle_angle(active_index);
        let label = mood.trim();

        Self {
            width,
            height,
            center,
            radius,
            stroke_width,
            segments,
            ticks,
            active_index,
            needle_angle,
            needle_tip: polar(center, radius * 0.82, needle_angle),
            hub_radius: stroke_width * 0.55,
            badge: confidence.and_then(Badge::from_confidence),
            label: if label.is_empty() {
                "unknown".to_string()
            } else {
                label.to_string()
            },
        }
    }

    /// Serialise as a standalone SVG document
    #[must_use]
    pub fn to_svg(&self) -> String {
        let mut parts = Vec::with_capacity(self.segments.len() + self.ticks.len() + 8);

        parts.push(format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" role="img" aria-label="Mood: {label}">"#,
            w = fmt_num(self.width),
            h = fmt_num(self.height),
            label = escape_xml(&self.label),
        ));
        parts.push(format!("<title>Mood: {}</title>", escape_xml(&self.label)));

        for segment in &self.segments {
            parts.push(format!(
                r#"<path class="segment{active}" d="{d}" fill="none" stroke="{color}" stroke-width="{sw}" stroke-opacity="{op}"/>"#,
                active = if segment.active { " active" } else { "" },
                d = segment.path,
                color = segment.color.hex(),
                sw = fmt_num(self.stroke_width),
                op = fmt_num(segment.opacity),
            ));
        }

        for tick in &self.ticks {
            parts.push(format!(
                r##"<line class="tick" x1="{}" y1="{}" x2="{}" y2="{}" stroke="#6b7280" stroke-width="1"/>"##,
                fmt_num(tick.from.x),
                fmt_num(tick.from.y),
                fmt_num(tick.to.x),
                fmt_num(tick.to.y),
            ));
        }

        parts.push(format!(
            r##"<line class="needle" x1="{}" y1="{}" x2="{}" y2="{}" stroke="#111827" stroke-width="{}" stroke-linecap="round"/>"##,
            fmt_num(self.center.x),
            fmt_num(self.center.y),
            fmt_num(self.needle_tip.x),
            fmt_num(self.needle_tip.y),
            fmt_num((self.stroke_width * 0.3).max(1.5)),
        ));
        parts.push(format!(
            r##"<circle class="hub" cx="{}" cy="{}" r="{}" fill="#111827"/>"##,
            fmt_num(self.center.x),
            fmt_num(self.center.y),
            fmt_num(self.hub_radius),
        ));

        if let Some(badge) = self.badge {
            let (class, fill) = if badge.uncertain {
                ("badge uncertain", "#b45309")
            } else {
                ("badge", "#374151")
            };
            parts.push(format!(
                r#"<text class="{class}" x="{}" y="{}" text-anchor="middle" font-size="{}" fill="{fill}"{style}>{}</text>"#,
                fmt_num(self.center.x),
                fmt_num(self.center.y + self.stroke_width * 2.0),
                fmt_num((self.width * 0.075).max(8.0)),
                badge.text(),
                style = if badge.uncertain {
                    r#" font-style="italic""#
                } else {
                    ""
                },
            ));
        }

        parts.push("</svg>".to_string());
        parts.join("\n")
    }
}

/// Render a mood gauge as SVG
#[must_use]
pub fn render_svg(mood: &str, confidence: Option<f32>, size: u32) -> String {
    GaugeLayout::new(mood, confidence, size).to_svg()
}

/// Point at `radius` from `center` along `angle` degrees
#[must_use]
pub fn polar(center: Point, radius: f64, angle: f64) -> Point {
    let theta = angle.to_radians();
    Point {
        x: center.x + radius * theta.cos(),
        y: center.y - radius * theta.sin(),
    }
}

/// Clockwise (on screen) arc from `start` to `end` degrees
fn arc_path(center: Point, radius: f64, start: f64, end: f64) -> String {
    let from = polar(center, radius, start);
    let to = polar(center, radius, end);
    format!(
        "M {} {} A {r} {r} 0 0 1 {} {}",
        fmt_num(from.x),
        fmt_num(from.y),
        fmt_num(to.x),
        fmt_num(to.y),
        r = fmt_num(radius),
    )
}

/// Two decimals, trailing zeros trimmed
fn fmt_num(value: f64) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
