//! TextBlock Widget
//!
//! A borderless, scrollable text region that grows at the bottom. Scroll
//! state lives in a [`ScrollTracker`], so the view follows new paragraphs
//! while the user is near the end and stays put once they scroll up.

use companion_core::ScrollTracker;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::StatefulWidget;
use textwrap::wrap;

use crate::theme::{DIM_GRAY, FADE_GRAY};

/// Styled paragraphs, oldest first
pub type Paragraphs = Vec<(String, Style)>;

/// Wrap paragraphs to `width`, one blank row after each
pub fn wrap_paragraphs(paragraphs: &[(String, Style)], width: usize) -> Vec<(String, Style)> {
    let width = width.max(1);
    let mut rows = Vec::new();
    for (text, style) in paragraphs {
        for line in text.lines() {
            if line.is_empty() {
                rows.push((String::new(), *style));
            } else {
                rows.extend(wrap(line, width).into_iter().map(|cow| (cow.into_owned(), *style)));
            }
        }
        rows.push((String::new(), Style::default()));
    }
    rows
}

/// A borderless, scrollable text block
pub struct TextBlock<'a> {
    paragraphs: &'a [(String, Style)],
}

impl<'a> TextBlock<'a> {
    pub fn new(paragraphs: &'a [(String, Style)]) -> Self {
        Self { paragraphs }
    }
}

impl StatefulWidget for TextBlock<'_> {
    type State = ScrollTracker;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let rows = wrap_paragraphs(self.paragraphs, area.width as usize);
        let height = area.height as usize;
        state.set_dimensions(rows.len(), height);

        let has_content_above = state.offset() > 0;
        let has_content_below = state.distance_from_bottom() > 0;

        for (i, (line, style)) in rows.iter().skip(state.offset()).take(height).enumerate() {
            // Fade the edge rows when there is more to scroll to
            let style = if has_content_above && i == 0
                || has_content_below && i == height.saturating_sub(1)
            {
                Style::default().fg(FADE_GRAY)
            } else if has_content_above && i == 1
                || has_content_below && i == height.saturating_sub(2)
            {
                Style::default().fg(DIM_GRAY)
            } else {
                *style
            };
            let y = area.y + i as u16;
            buf.set_stringn(area.x, y, line, area.width as usize, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraphs(n: usize) -> Paragraphs {
        (0..n)
            .map(|i| (format!("line {i}"), Style::default()))
            .collect()
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn test_wrap_adds_spacing() {
        let rows = wrap_paragraphs(&paragraphs(2), 20);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].0, "line 0");
        assert!(rows[1].0.is_empty());
    }

    #[test]
    fn test_wrap_long_line() {
        let text = vec![("aaaa bbbb cccc".to_string(), Style::default())];
        let rows = wrap_paragraphs(&text, 9);
        assert_eq!(rows[0].0, "aaaa bbbb");
        assert_eq!(rows[1].0, "cccc");
    }

    #[test]
    fn test_follows_bottom() {
        let area = Rect::new(0, 0, 20, 4);
        let mut buf = Buffer::empty(area);
        let mut scroll = ScrollTracker::default();
        let text = paragraphs(5);

        TextBlock::new(&text).render(area, &mut buf, &mut scroll);

        // 10 rows, 4 visible, pinned to the end
        assert_eq!(scroll.offset(), 6);
        assert_eq!(row(&buf, 2), "line 4");
    }

    #[test]
    fn test_scrolled_up_stays_put() {
        let area = Rect::new(0, 0, 20, 4);
        let mut buf = Buffer::empty(area);
        let mut scroll = ScrollTracker::default();
        let text = paragraphs(5);
        TextBlock::new(&text).render(area, &mut buf, &mut scroll);

        scroll.scroll_to(0);
        assert!(!scroll.is_stuck());

        let text = paragraphs(8);
        let mut buf = Buffer::empty(area);
        TextBlock::new(&text).render(area, &mut buf, &mut scroll);
        assert_eq!(scroll.offset(), 0);
        assert_eq!(row(&buf, 0), "line 0");
    }
}
