//! Screenshot viewer logic
//!
//! Pure view-state for the two-panel audit display: marker placement on the
//! zoomable screenshot, the selection state shared by both panels, and the
//! zoom controller. No DOM types here; the wasm app binds these to elements
//! and runs the scroll effects they request.

pub mod layout;
pub mod selection;
pub mod zoom;

pub use layout::{marker_position, paint_order, pick_marker};
pub use selection::{needs_scroll, Rect, ScrollAlign, ScrollEffect, SelectionController};
pub use zoom::ZoomController;
