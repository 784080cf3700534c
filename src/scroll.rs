//! Near-bottom detection for the list viewport.

use crate::state::ListScreen;

/// Visible window over the list body, in rows. Starts at the same
/// `scroll_top` the list screen renders from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub top: usize,
    pub height: usize,
    pub content: usize,
}

impl Viewport {
    pub fn of(screen: &ListScreen, rows: usize) -> Self {
        Self {
            top: screen.scroll_top,
            height: rows,
            content: screen.visible_count(),
        }
    }

    pub fn bottom(&self) -> usize {
        self.top + self.height
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollTrigger {
    threshold: usize,
}

impl ScrollTrigger {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    /// The viewport's bottom edge is within `threshold` rows of the content end.
    pub fn near_bottom(&self, viewport: Viewport) -> bool {
        viewport.bottom() + self.threshold >= viewport.content
    }

    /// Whether scrolling to `viewport` should request another page.
    pub fn should_load(&self, screen: &ListScreen, viewport: Viewport) -> bool {
        !screen.list.is_loading() && !screen.list.is_exhausted() && self.near_bottom(viewport)
    }
}
