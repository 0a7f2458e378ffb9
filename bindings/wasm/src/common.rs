use std::io;

use anyhow::{Result, anyhow};
use serde::Serialize;
use wasm_bindgen::JsValue;

use countymap_core::Overlay;

pub(crate) fn js_err(e: impl ToString) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Serialize through JSON so that maps become plain JS objects.
pub(crate) fn to_js(value: &impl Serialize) -> Result<JsValue> {
    let json = serde_json::to_string(value)?;
    js_sys::JSON::parse(&json).map_err(|e| anyhow!("Failed to parse JSON string: {:?}", e))
}

pub(crate) fn parse_overlay(overlay: &str) -> Result<Overlay> {
    Overlay::from_str(overlay).ok_or_else(|| {
        anyhow!(
            "Unknown overlay {:?}. Expected one of: population, income, age, density, election",
            overlay
        )
    })
}

/// Forwards formatted tracing lines to `console.log`.
struct ConsoleWriter;

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        let line = text.trim_end();
        if !line.is_empty() {
            web_sys::console::log_1(&JsValue::from_str(line));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

/// Install a global fmt subscriber at INFO. A second call is a no-op.
pub(crate) fn init_console_tracing() {
    // No clock on wasm32-unknown-unknown, so no timestamps.
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .without_time()
        .with_writer(|| ConsoleWriter)
        .try_init();
}
