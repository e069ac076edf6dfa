//! Auto-stick scrolling
//!
//! The conversation view follows new messages only while the user is at (or
//! within `threshold` rows of) the bottom. Scrolling up detaches it; scrolling
//! back down re-attaches. The state is advisory and recomputed on every scroll
//! event.

/// Scroll state for a list that grows at the bottom
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrollTracker {
    /// Rows above the viewport's top edge
    offset: usize,
    /// Total content rows
    content: usize,
    /// Visible rows
    viewport: usize,
    /// Distance from the bottom that still counts as "at the bottom"
    threshold: usize,
    /// Follow new content
    stick: bool,
}

impl Default for ScrollTracker {
    fn default() -> Self {
        Self::new(2)
    }
}

impl ScrollTracker {
    /// New tracker, stuck to the bottom
    #[must_use]
    pub fn new(threshold: usize) -> Self {
        Self {
            offset: 0,
            content: 0,
            viewport: 0,
            threshold,
            stick: true,
        }
    }

    fn max_offset(&self) -> usize {
        self.content.saturating_sub(self.viewport)
    }

    /// Rows between the viewport's bottom edge and the end of content
    #[must_use]
    pub fn distance_from_bottom(&self) -> usize {
        self.max_offset().saturating_sub(self.offset)
    }

    /// Current top offset
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether new content scrolls into view automatically
    #[must_use]
    pub fn is_stuck(&self) -> bool {
        self.stick
    }

    /// Content or viewport size changed
    pub fn set_dimensions(&mut self, content: usize, viewport: usize) {
        self.content = content;
        self.viewport = viewport;
        if self.stick {
            self.offset = self.max_offset();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    /// User moved the view by `delta` rows (negative is up)
    pub fn scroll_by(&mut self, delta: isize) {
        let target = if delta.is_negative() {
            self.offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.offset.saturating_add(delta.unsigned_abs())
        };
        self.scroll_to(target);
    }

    /// User moved the view to an absolute offset
    pub fn scroll_to(&mut self, offset: usize) {
        self.offset = offset.min(self.max_offset());
        self.stick = self.distance_from_bottom() <= self.threshold;
    }

    /// Jump to the end and follow again
    pub fn stick_to_bottom(&mut self) {
        self.offset = self.max_offset();
        self.stick = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follows_new_content_while_stuck() {
        let mut scroll = ScrollTracker::new(2);
        scroll.set_dimensions(10, 5);
        assert_eq!(scroll.offset(), 5);

        scroll.set_dimensions(14, 5);
        assert_eq!(scroll.offset(), 9);
        assert!(scroll.is_stuck());
    }

    #[test]
    fn test_scrolling_up_detaches() {
        let mut scroll = ScrollTracker::new(2);
        scroll.set_dimensions(30, 10);
        scroll.scroll_by(-5);
        assert!(!scroll.is_stuck());
        assert_eq!(scroll.offset(), 15);

        scroll.set_dimensions(40, 10);
        assert_eq!(scroll.offset(), 15);
    }

    #[test]
    fn test_within_threshold_still_sticks() {
        let mut scroll = ScrollTracker::new(2);
        scroll.set_dimensions(30, 10);
        scroll.scroll_by(-2);
        assert!(scroll.is_stuck());

        scroll.scroll_by(-10);
        assert!(!scroll.is_stuck());
        scroll.scroll_by(100);
        assert!(scroll.is_stuck());
        assert_eq!(scroll.distance_from_bottom(), 0);
    }

    #[test]
    fn test_short_content_never_scrolls() {
        let mut scroll = ScrollTracker::default();
        scroll.set_dimensions(3, 10);
        scroll.scroll_by(-4);
        assert_eq!(scroll.offset(), 0);
        assert!(scroll.is_stuck());
    }

    #[test]
    fn test_shrinking_content_clamps_offset() {
        let mut scroll = ScrollTracker::new(0);
        scroll.set_dimensions(50, 10);
        scroll.scroll_to(5);
        scroll.set_dimensions(12, 10);
        assert_eq!(scroll.offset(), 2);

        scroll.stick_to_bottom();
        assert!(scroll.is_stuck());
    }
}
