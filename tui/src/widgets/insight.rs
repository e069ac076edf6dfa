//! InsightPanel Widget
//!
//! Mood gauge on top, then the mood line, the suggested micro-step with its
//! rationale and source, and the safety badge.

use companion_core::gauge::GaugeLayout;
use companion_core::InsightSnapshot;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};

use super::MoodGauge;
use crate::theme::{self, COMPANION_TEAL, DIM_GRAY, PANEL_BORDER};

/// Rows given to the gauge when there is room
const GAUGE_ROWS: u16 = 7;

/// Pixel size the gauge geometry is computed at
const GAUGE_PX: u32 = 160;

/// Insight panel
pub struct InsightPanel<'a> {
    insight: &'a InsightSnapshot,
}

impl<'a> InsightPanel<'a> {
    pub fn new(insight: &'a InsightSnapshot) -> Self {
        Self { insight }
    }

    /// Text lines below the gauge
    pub fn lines(&self) -> Vec<Line<'static>> {
        let insight = self.insight;
        let mut lines = Vec::new();

        if insight.analyzing {
            lines.push(Line::from(Span::styled(
                "Listening...",
                Style::default().fg(DIM_GRAY).add_modifier(Modifier::ITALIC),
            )));
        }

        match insight.mood.as_deref() {
            Some(mood) => {
                let mut spans = vec![
                    Span::styled("Mood: ", Style::default().fg(DIM_GRAY)),
                    Span::styled(
                        mood.to_string(),
                        Style::default()
                            .fg(theme::mood(mood))
                            .add_modifier(Modifier::BOLD),
                    ),
                ];
                if let Some(badge) = insight
                    .mood_confidence
                    .and_then(companion_core::gauge::Badge::from_confidence)
                {
                    let note = if badge.uncertain { " (unsure)" } else { "" };
                    spans.push(Span::styled(
                        format!("  {}{note}", badge.text()),
                        Style::default().fg(DIM_GRAY),
                    ));
                }
                lines.push(Line::from(spans));
            }
            None if !insight.analyzing => {
                lines.push(Line::from(Span::styled(
                    "Tell me how you're feeling.",
                    Style::default().fg(DIM_GRAY),
                )));
            }
            None => {}
        }

        if let Some(strategy) = &insight.strategy {
            lines.push(Line::default());
            lines.push(Line::from(vec![
                Span::styled("Try: ", Style::default().fg(DIM_GRAY)),
                Span::styled(strategy.clone(), Style::default().fg(COMPANION_TEAL)),
            ]));
            if let Some(why) = &insight.strategy_why {
                lines.push(Line::from(Span::styled(
                    format!("Why: {why}"),
                    Style::default().fg(DIM_GRAY),
                )));
            }
            if let Some(source) = insight.strategy_source.as_ref().filter(|s| !s.is_empty()) {
                let text = match (source.name.trim(), source.url.trim()) {
                    (name, "") => format!("Source: {name}"),
                    ("", url) => format!("Source: {url}"),
                    (name, url) => format!("Source: {name} ({url})"),
                };
                lines.push(Line::from(Span::styled(text, Style::default().fg(DIM_GRAY))));
            }
        }

        if insight.mood.is_some() {
            let level = insight.safety.level;
            lines.push(Line::default());
            let mut spans = vec![
                Span::styled("Safety: ", Style::default().fg(DIM_GRAY)),
                Span::styled(
                    format!("[{}]", level.label()),
                    Style::default()
                        .fg(theme::safety(level))
                        .add_modifier(Modifier::BOLD),
                ),
            ];
            if !insight.safety.reason.is_empty() {
                spans.push(Span::styled(
                    format!(" {}", insight.safety.reason),
                    Style::default().fg(DIM_GRAY),
                ));
            }
            lines.push(Line::from(spans));
        }

        lines
    }
}

impl Widget for InsightPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(PANEL_BORDER))
            .title(" How you're doing ");
        let inner = block.inner(area);
        block.render(area, buf);

        let show_gauge = self.insight.mood.is_some() && inner.height > GAUGE_ROWS + 2;
        let [gauge_area, text_area] = if show_gauge {
            Layout::vertical([Constraint::Length(GAUGE_ROWS), Constraint::Min(1)]).areas(inner)
        } else {
            [Rect::default(), inner]
        };

        if show_gauge {
            let mood = self.insight.mood.as_deref().unwrap_or_default();
            let layout = GaugeLayout::new(mood, self.insight.mood_confidence, GAUGE_PX);
            MoodGauge::new(&layout).render(gauge_area, buf);
        }

        Paragraph::new(self.lines())
            .wrap(Wrap { trim: true })
            .render(text_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use companion_core::{Safety, SafetyLevel, StrategySource};

    fn text(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_empty_insight_prompts() {
        let insight = InsightSnapshot::default();
        let lines = text(&InsightPanel::new(&insight).lines());
        assert_eq!(lines, vec!["Tell me how you're feeling."]);
    }

    #[test]
    fn test_analyzing_placeholder() {
        let insight = InsightSnapshot {
            analyzing: true,
            ..InsightSnapshot::default()
        };
        let lines = text(&InsightPanel::new(&insight).lines());
        assert_eq!(lines, vec!["Listening..."]);
    }

    #[test]
    fn test_full_insight() {
        let insight = InsightSnapshot {
            mood: Some("sadness".into()),
            mood_confidence: Some(0.4),
            strategy: Some("Try a 60s breath".into()),
            strategy_why: Some("Slows the heart rate".into()),
            strategy_source: Some(StrategySource {
                url: "https://www.nhs.uk".into(),
                name: "NHS".into(),
            }),
            safety: Safety {
                level: SafetyLevel::Watch,
                reason: "low mood".into(),
            },
            analyzing: false,
        };
        let lines = text(&InsightPanel::new(&insight).lines());
        assert_eq!(lines[0], "Mood: sadness  40% (unsure)");
        assert!(lines.contains(&"Try: Try a 60s breath".to_string()));
        assert!(lines.contains(&"Source: NHS (https://www.nhs.uk)".to_string()));
        assert_eq!(lines.last().unwrap(), "Safety: [Watch] low mood");
    }

    #[test]
    fn test_render_with_gauge() {
        let insight = InsightSnapshot {
            mood: Some("joy".into()),
            ..InsightSnapshot::default()
        };
        let area = Rect::new(0, 0, 36, 16);
        let mut buf = Buffer::empty(area);
        InsightPanel::new(&insight).render(area, &mut buf);

        let all: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(all.contains("How you're doing"));
        assert!(all.contains("Mood: joy"));
    }
}
