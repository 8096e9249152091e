//! Selection state shared by the image panel and the results panel
//!
//! There is one authoritative selected index regardless of which panel
//! triggered the selection. Every change to a new index requests two scroll
//! effects, one per panel; each effect is independent, idempotent, and
//! skipped when its target is already fully visible. A rapid re-selection
//! simply redirects the (interruptible) smooth scroll to the new target, so
//! no cancellation token exists.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in a scroll container's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Whether `other` lies entirely inside this rectangle.
    pub fn contains(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.right() <= self.right()
            && other.top >= self.top
            && other.bottom() <= self.bottom()
    }
}

/// How a panel positions its target when scrolling it into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollAlign {
    /// Center the target in the viewport (the marker on the image panel).
    Center,
    /// Minimal movement to make the target visible (the card in the list).
    Nearest,
}

/// A request to bring the element for one issue index into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollEffect {
    pub index: usize,
    pub align: ScrollAlign,
}

/// A target already fully inside the viewport needs no scroll.
pub fn needs_scroll(target: &Rect, viewport: &Rect) -> bool {
    !viewport.contains(target)
}

/// The selected-issue state machine.
#[derive(Debug, Default)]
pub struct SelectionController {
    selected: Option<usize>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Select an issue. Marker clicks and card clicks are symmetric: both
    /// land here and produce the same state and the same pair of effects.
    ///
    /// Returns the scroll effects to run — marker centered in the image
    /// panel, card brought into view in the results panel — or `None` when
    /// the index was already selected (no state change, nothing to do).
    pub fn select(&mut self, index: usize) -> Option<[ScrollEffect; 2]> {
        if self.selected == Some(index) {
            return None;
        }
        self.selected = Some(index);
        Some([
            ScrollEffect {
                index,
                align: ScrollAlign::Center,
            },
            ScrollEffect {
                index,
                align: ScrollAlign::Nearest,
            },
        ])
    }

    /// Drop the selection (e.g. when a new result replaces the current one).
    pub fn clear(&mut self) {
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn starts_unselected() {
        let controller = SelectionController::new();
        assert_eq!(controller.selected(), None);
    }

    #[test]
    fn marker_and_card_selection_are_equivalent() {
        // Both panels call the same entry point; selecting index 3 from
        // either side yields identical state and effects.
        let mut via_marker = SelectionController::new();
        let mut via_card = SelectionController::new();

        let marker_effects = via_marker.select(3);
        let card_effects = via_card.select(3);

        assert_eq!(via_marker.selected(), Some(3));
        assert_eq!(via_card.selected(), Some(3));
        assert_eq!(marker_effects, card_effects);
    }

    #[test]
    fn selection_change_fires_both_panel_effects() {
        let mut controller = SelectionController::new();
        let effects = controller.select(1).unwrap();

        assert_eq!(effects[0].index, 1);
        assert_eq!(effects[0].align, ScrollAlign::Center);
        assert_eq!(effects[1].index, 1);
        assert_eq!(effects[1].align, ScrollAlign::Nearest);
    }

    #[test]
    fn reselecting_same_index_is_not_a_change() {
        let mut controller = SelectionController::new();
        assert!(controller.select(2).is_some());
        assert!(controller.select(2).is_none());
        assert_eq!(controller.selected(), Some(2));
    }

    #[test]
    fn reselection_redirects_to_new_target() {
        let mut controller = SelectionController::new();
        controller.select(0);
        let effects = controller.select(5).unwrap();
        assert_eq!(controller.selected(), Some(5));
        assert_eq!(effects[0].index, 5);
    }

    #[test]
    fn clear_resets_selection() {
        let mut controller = SelectionController::new();
        controller.select(4);
        controller.clear();
        assert_eq!(controller.selected(), None);
        // Selecting the old index again counts as a change after a clear
        assert!(controller.select(4).is_some());
    }

    #[test]
    fn fully_visible_target_skips_scrolling() {
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        let inside = Rect::new(100.0, 100.0, 28.0, 28.0);
        assert!(!needs_scroll(&inside, &viewport));
    }

    #[test]
    fn partially_visible_target_scrolls() {
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        // Straddles the bottom edge
        let straddling = Rect::new(100.0, 590.0, 28.0, 28.0);
        assert!(needs_scroll(&straddling, &viewport));
    }

    #[test]
    fn offscreen_target_scrolls() {
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        let below = Rect::new(100.0, 900.0, 28.0, 28.0);
        let left_of = Rect::new(-50.0, 100.0, 28.0, 28.0);
        assert!(needs_scroll(&below, &viewport));
        assert!(needs_scroll(&left_of, &viewport));
    }

    #[test]
    fn target_on_viewport_edge_counts_as_visible() {
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        let flush = Rect::new(772.0, 572.0, 28.0, 28.0);
        assert!(!needs_scroll(&flush, &viewport));
    }
}
