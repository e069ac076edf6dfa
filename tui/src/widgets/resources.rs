//! ResourceList Widget
//!
//! Suggested videos, articles and books for the latest exchange.

use companion_core::ResourcePanel;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};

use crate::theme::{COMPANION_TEAL, DIM_GRAY, ERROR_RED, PANEL_BORDER};

/// Resource panel
pub struct ResourceList<'a> {
    panel: &'a ResourcePanel,
}

impl<'a> ResourceList<'a> {
    pub fn new(panel: &'a ResourcePanel) -> Self {
        Self { panel }
    }

    pub fn lines(&self) -> Vec<Line<'static>> {
        let panel = self.panel;
        let dim = Style::default().fg(DIM_GRAY);
        let mut lines = Vec::new();

        if panel.loading {
            lines.push(Line::from(Span::styled(
                "Finding resources...",
                dim.add_modifier(Modifier::ITALIC),
            )));
            return lines;
        }

        if panel.needs_clinician {
            lines.push(Line::from(Span::styled(
                "Talking to a professional could really help.",
                Style::default().fg(ERROR_RED),
            )));
            lines.push(Line::default());
        }

        if panel.is_empty() {
            lines.push(Line::from(Span::styled("No suggestions yet.", dim)));
            return lines;
        }

        for (i, option) in panel.options.iter().enumerate() {
            let mut header = vec![
                Span::styled(format!("{}. ", i + 1), dim),
                Span::styled(
                    option.title.clone(),
                    Style::default()
                        .fg(COMPANION_TEAL)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" [{}]", option.kind.label()), dim),
            ];
            if let Some(duration) = &option.duration {
                header.push(Span::styled(format!(" {duration}"), dim));
            }
            lines.push(Line::from(header));

            if let Some(why) = &option.why {
                lines.push(Line::from(Span::raw(format!("   {why}"))));
            }
            let link = match &option.source {
                Some(source) => format!("   {source}: {}", option.url),
                None => format!("   {}", option.url),
            };
            lines.push(Line::from(Span::styled(link, dim)));
        }

        lines.push(Line::default());
        lines.push(Line::from(Span::styled("Ctrl+N for more", dim)));
        lines
    }
}

impl Widget for ResourceList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(PANEL_BORDER))
            .title(" Might help ");
        Paragraph::new(self.lines())
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
