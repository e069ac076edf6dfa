//! MoodGauge Widget
//!
//! Draws a [`GaugeLayout`] on a braille canvas. The layout is in pixel space
//! with y growing down; the canvas has y growing up, so every point is
//! flipped against the layout height.

use companion_core::gauge::{polar, GaugeLayout, Point, Segment};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine, Points};
use ratatui::widgets::Widget;

use crate::theme::{self, DIM_GRAY, WARNING_AMBER};

/// Angular step between sampled arc points, degrees
const ARC_STEP: f64 = 1.5;

/// Radial samples across the stroke
const STROKE_SAMPLES: usize = 4;

/// Needle and hub
const NEEDLE: Color = Color::Rgb(235, 235, 235);

/// Terminal rendering of the mood dial
pub struct MoodGauge<'a> {
    layout: &'a GaugeLayout,
}

impl<'a> MoodGauge<'a> {
    pub fn new(layout: &'a GaugeLayout) -> Self {
        Self { layout }
    }
}

/// Sampled canvas points covering one segment's stroke
pub fn arc_points(layout: &GaugeLayout, segment: &Segment) -> Vec<(f64, f64)> {
    let steps = ((segment.start_angle - segment.end_angle) / ARC_STEP).ceil() as usize;
    let inner = layout.radius - layout.stroke_width / 2.0;
    let band = layout.stroke_width / (STROKE_SAMPLES - 1) as f64;

    let mut points = Vec::with_capacity((steps + 1) * STROKE_SAMPLES);
    for step in 0..=steps {
        let angle = (segment.start_angle - step as f64 * ARC_STEP).max(segment.end_angle);
        for sample in 0..STROKE_SAMPLES {
            let p = polar(layout.center, inner + band * sample as f64, angle);
            points.push(flip(layout, p));
        }
    }
    points
}

fn flip(layout: &GaugeLayout, p: Point) -> (f64, f64) {
    (p.x, layout.height - p.y)
}

impl Widget for MoodGauge<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 8 || area.height < 3 {
            return;
        }

        let layout = self.layout;
        let segments: Vec<(Vec<(f64, f64)>, Color)> = layout
            .segments
            .iter()
            .map(|s| (arc_points(layout, s), theme::faded(s.color, s.opacity)))
            .collect();

        let hub = flip(layout, layout.center);
        let tip = flip(layout, layout.needle_tip);
        let hub_points: Vec<(f64, f64)> = (0..24)
            .map(|k| {
                let p = polar(layout.center, layout.hub_radius, f64::from(k) * 15.0);
                flip(layout, p)
            })
            .collect();

        let badge = layout.badge.map(|badge| {
            let style = if badge.uncertain {
                Style::default()
                    .fg(WARNING_AMBER)
                    .add_modifier(Modifier::ITALIC)
            } else {
                Style::default().fg(DIM_GRAY)
            };
            (badge.text(), style)
        });

        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([0.0, layout.width])
            .y_bounds([0.0, layout.height])
            .paint(|ctx| {
                for (coords, color) in &segments {
                    ctx.draw(&Points {
                        coords,
                        color: *color,
                    });
                }
                for tick in &layout.ticks {
                    let (x1, y1) = flip(layout, tick.from);
                    let (x2, y2) = flip(layout, tick.to);
                    ctx.draw(&CanvasLine::new(x1, y1, x2, y2, DIM_GRAY));
                }
                ctx.draw(&CanvasLine::new(hub.0, hub.1, tip.0, tip.1, NEEDLE));
                ctx.draw(&Points {
                    coords: &hub_points,
                    color: NEEDLE,
                });
                if let Some((text, style)) = &badge {
                    let x = layout.center.x - layout.width * 0.05;
                    let y = layout.height - (layout.center.y + layout.stroke_width * 1.6);
                    ctx.print(x, y, Span::styled(text.clone(), *style));
                }
            })
            .render(area, buf);
    }
}
