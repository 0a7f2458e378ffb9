use wasm_bindgen::prelude::*;

mod common;
mod session;
mod surface;

pub use session::WasmMapSession;

/// Called automatically when the WASM module is instantiated.
/// Sets up panic hook so Rust panics appear as console.error in the browser,
/// and routes tracing output to the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    common::init_console_tracing();
}
