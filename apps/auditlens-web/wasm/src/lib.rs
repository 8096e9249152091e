//! AuditLens - browser glue for the audit results view
//!
//! Binds the pure view logic in `viewer-core` to DOM elements: marker and
//! card element arenas keyed by original issue index, scroll-into-view
//! effects, pointer picking, and the upload/run-audit API calls.

use wasm_bindgen::prelude::*;

pub mod api;
pub mod viewer;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"AuditLens WASM initialized".into());
}
