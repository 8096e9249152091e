//! Interactive audit results view
//!
//! One [`AuditViewer`] instance backs one results view: it owns the selected
//! index and zoom scale, and the arenas mapping an issue's original index to
//! its mounted marker and card elements. The arenas are populated as
//! elements mount and cleared as they unmount; lookups are by index, never
//! by tree search.

use std::collections::HashMap;

use wasm_bindgen::prelude::*;
use web_sys::{Element, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition};

use audit_engine::{group_by_severity, ScoreBand, SeverityCounts};
use shared_types::AuditResult;
use viewer_core::{
    marker_position, needs_scroll, paint_order, pick_marker, Rect, ScrollAlign, ScrollEffect,
    SelectionController, ZoomController,
};

/// Pointer picking tolerance, in screen pixels.
const HIT_RADIUS: f64 = 14.0;

#[wasm_bindgen]
pub struct AuditViewer {
    result: AuditResult,
    selection: SelectionController,
    zoom: ZoomController,
    markers: HashMap<usize, Element>,
    cards: HashMap<usize, Element>,
    image_container: Option<Element>,
    results_container: Option<Element>,
    intrinsic_width: f64,
    intrinsic_height: f64,
}

#[wasm_bindgen]
impl AuditViewer {
    /// Build a viewer from a serialized [`AuditResult`].
    #[wasm_bindgen(constructor)]
    pub fn new(result_json: &str) -> Result<AuditViewer, JsValue> {
        let result: AuditResult = serde_json::from_str(result_json)
            .map_err(|e| JsValue::from_str(&format!("invalid audit result: {}", e)))?;
        Ok(Self {
            result,
            selection: SelectionController::new(),
            zoom: ZoomController::new(),
            markers: HashMap::new(),
            cards: HashMap::new(),
            image_container: None,
            results_container: None,
            intrinsic_width: 0.0,
            intrinsic_height: 0.0,
        })
    }

    /// Record the screenshot's intrinsic (unscaled) pixel size, from the
    /// loaded image element.
    pub fn set_image_size(&mut self, width: f64, height: f64) {
        self.intrinsic_width = width;
        self.intrinsic_height = height;
    }

    /// The scrollable container of the screenshot panel.
    pub fn set_image_container(&mut self, element: Element) {
        self.image_container = Some(element);
    }

    /// The scrollable container of the results panel.
    pub fn set_results_container(&mut self, element: Element) {
        self.results_container = Some(element);
    }

    // -- element arenas ----------------------------------------------------

    pub fn register_marker(&mut self, index: usize, element: Element) {
        self.markers.insert(index, element);
    }

    pub fn unregister_marker(&mut self, index: usize) {
        self.markers.remove(&index);
    }

    pub fn register_card(&mut self, index: usize, element: Element) {
        self.cards.insert(index, element);
    }

    pub fn unregister_card(&mut self, index: usize) {
        self.cards.remove(&index);
    }

    // -- render model ------------------------------------------------------

    pub fn issue_count(&self) -> usize {
        self.result.issues.len()
    }

    pub fn score(&self) -> i64 {
        self.result.score
    }

    pub fn summary(&self) -> String {
        self.result.summary.clone()
    }

    /// CSS modifier for the score chip: "good", "fair" or "poor".
    pub fn score_band(&self) -> String {
        match ScoreBand::from_score(self.result.score) {
            ScoreBand::Good => "good".to_string(),
            ScoreBand::Fair => "fair".to_string(),
            ScoreBand::Poor => "poor".to_string(),
        }
    }

    /// Severity sections with members carrying their original indices,
    /// serialized for the results panel renderer.
    pub fn groups_json(&self) -> Result<String, JsValue> {
        let groups = group_by_severity(&self.result.issues);
        serde_json::to_string(&groups).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Per-severity totals for the badge row.
    pub fn counts_json(&self) -> Result<String, JsValue> {
        let counts = SeverityCounts::tally(&self.result.issues);
        serde_json::to_string(&counts).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// CSS modifier for one marker: "critical", "major" or "minor".
    pub fn severity_class(&self, index: usize) -> Option<String> {
        self.result
            .issues
            .get(index)
            .map(|issue| issue.severity.to_string())
    }

    /// Marker indices in paint order; later entries mount later and paint
    /// on top, so overlapping markers surface the worst issue.
    pub fn paint_order(&self) -> Vec<usize> {
        paint_order(&self.result.issues)
    }

    // -- marker layout -----------------------------------------------------

    /// Derived pixel position of a marker at the current zoom. Recomputed on
    /// every call; zoom changes invalidate nothing because nothing is cached.
    pub fn marker_left(&self, index: usize) -> f64 {
        self.position(index).0
    }

    pub fn marker_top(&self, index: usize) -> f64 {
        self.position(index).1
    }

    fn position(&self, index: usize) -> (f64, f64) {
        match self.result.issues.get(index) {
            Some(issue) => marker_position(
                issue,
                self.intrinsic_width,
                self.intrinsic_height,
                self.zoom.scale(),
            ),
            None => (0.0, 0.0),
        }
    }

    // -- selection ---------------------------------------------------------

    /// Select an issue. Marker clicks and card clicks both land here.
    pub fn select(&mut self, index: usize) {
        if let Some(effects) = self.selection.select(index) {
            for effect in effects {
                self.run_scroll_effect(effect);
            }
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.selection.selected()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Resolve a pointer position on the image surface to a marker and
    /// select it. Coordinates are relative to the scaled surface.
    pub fn click_at(&mut self, x: f64, y: f64) -> Option<usize> {
        let hit = pick_marker(
            &self.result.issues,
            x,
            y,
            self.intrinsic_width,
            self.intrinsic_height,
            self.zoom.scale(),
            HIT_RADIUS,
        )?;
        self.select(hit);
        Some(hit)
    }

    fn run_scroll_effect(&self, effect: ScrollEffect) {
        let (arena, container) = match effect.align {
            ScrollAlign::Center => (&self.markers, &self.image_container),
            ScrollAlign::Nearest => (&self.cards, &self.results_container),
        };
        let Some(element) = arena.get(&effect.index) else {
            return;
        };

        // Already fully visible: skip instead of animating
        if let Some(container) = container {
            let target = client_rect(element);
            let viewport = client_rect(container);
            if !needs_scroll(&target, &viewport) {
                return;
            }
        }

        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        match effect.align {
            ScrollAlign::Center => {
                options.set_block(ScrollLogicalPosition::Center);
                options.set_inline(ScrollLogicalPosition::Center);
            }
            ScrollAlign::Nearest => {
                options.set_block(ScrollLogicalPosition::Nearest);
                options.set_inline(ScrollLogicalPosition::Nearest);
            }
        }
        element.scroll_into_view_with_scroll_into_view_options(&options);
    }

    // -- zoom --------------------------------------------------------------

    pub fn zoom_in(&mut self) -> f64 {
        self.zoom.zoom_in()
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.zoom.zoom_out()
    }

    pub fn reset_zoom(&mut self) -> f64 {
        self.zoom.reset()
    }

    pub fn zoom_scale(&self) -> f64 {
        self.zoom.scale()
    }

    /// Whole-number percentage for the zoom readout.
    pub fn zoom_percent(&self) -> u32 {
        self.zoom.percent()
    }
}

fn client_rect(element: &Element) -> Rect {
    let rect = element.get_bounding_client_rect();
    Rect::new(rect.left(), rect.top(), rect.width(), rect.height())
}
