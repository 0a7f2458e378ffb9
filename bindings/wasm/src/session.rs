use std::sync::Arc;

use serde::Serialize;
use wasm_bindgen::{JsValue, prelude::wasm_bindgen};

use countymap_core::{
    DataKind, LoadError, MapConfig, MapSession, Overlay, PaintOutcome, PointerEvent, PointerKind,
    parse_demographics, parse_elections, parse_geometry,
};

use crate::{common::*, surface::JsSurface};

#[wasm_bindgen]
pub struct WasmMapSession {
    inner: MapSession<JsSurface>,
}

#[derive(Serialize)]
struct LoadErrorView {
    kind: &'static str,
    message: String,
}

fn outcome(result: anyhow::Result<PaintOutcome>) -> Result<String, JsValue> {
    result.map(|o| o.to_str().to_string()).map_err(js_err)
}

#[wasm_bindgen]
impl WasmMapSession {
    /// `surface` is the JS adapter object over the map library.
    /// `config` is an optional map configuration as JSON text.
    #[wasm_bindgen(constructor)]
    pub fn new(surface: JsValue, config: Option<String>) -> Result<WasmMapSession, JsValue> {
        let config = match config {
            Some(json) => Arc::new(MapConfig::from_json_str(&json).map_err(js_err)?),
            None => MapConfig::builtin(),
        };
        let surface = JsSurface::new(surface).map_err(js_err)?;
        Ok(WasmMapSession { inner: MapSession::new(config, surface) })
    }

    /// Geometry fetch completed; `text` is the GeoJSON body.
    /// Returns the repaint outcome: "applied", "awaiting-layer" or "awaiting-data".
    pub fn load_geometry(&mut self, text: &str) -> Result<String, JsValue> {
        outcome(self.inner.set_geometry(parse_geometry(text.as_bytes())))
    }

    pub fn load_demographics(&mut self, text: &str) -> Result<String, JsValue> {
        outcome(self.inner.set_demographics(parse_demographics(text.as_bytes())))
    }

    pub fn load_elections(&mut self, text: &str) -> Result<String, JsValue> {
        outcome(self.inner.set_elections(parse_elections(text.as_bytes())))
    }

    /// A fetch failed. `kind` is "geometry", "demographics" or "elections".
    pub fn fail_load(&mut self, kind: &str, message: &str) -> Result<String, JsValue> {
        let kind = DataKind::from_str(kind).ok_or_else(|| js_err(format!("Unknown data kind {kind:?}")))?;
        let err = LoadError::Fetch { kind, message: message.to_string() };
        outcome(match kind {
            DataKind::Geometry => self.inner.set_geometry(Err(err)),
            DataKind::Demographics => self.inner.set_demographics(Err(err)),
            DataKind::Elections => self.inner.set_elections(Err(err)),
        })
    }

    pub fn set_overlay(&mut self, overlay: &str) -> Result<String, JsValue> {
        let overlay = parse_overlay(overlay).map_err(js_err)?;
        outcome(self.inner.set_overlay(overlay))
    }

    pub fn overlay(&self) -> String { self.inner.state().overlay().to_str().to_string() }

    /// Overlay buttons as `[[key, label], ...]`, in display order.
    pub fn overlays(&self) -> Result<JsValue, JsValue> {
        let buttons: Vec<(&str, &str)> = Overlay::ALL.iter().map(|o| (o.to_str(), o.label())).collect();
        serde_wasm_bindgen::to_value(&buttons).map_err(|e| e.into())
    }

    /// Pointer moved over the fill layer; `fips` is the feature id under it, if any.
    pub fn pointer_move(&mut self, fips: Option<String>) -> Result<(), JsValue> {
        let event = PointerEvent { kind: PointerKind::Move, fips: fips.map(Into::into) };
        self.inner.handle_pointer(event).map_err(js_err)
    }

    /// Pointer moved to a lon/lat position; off every county this is a leave.
    pub fn pointer_move_at(&mut self, lon: f64, lat: f64) -> Result<(), JsValue> {
        self.inner.handle_pointer_at(PointerKind::Move, lon, lat).map_err(js_err)
    }

    pub fn click_at(&mut self, lon: f64, lat: f64) -> Result<(), JsValue> {
        self.inner.handle_pointer_at(PointerKind::Click, lon, lat).map_err(js_err)
    }

    pub fn pointer_leave(&mut self) -> Result<(), JsValue> {
        self.inner.handle_pointer(PointerEvent::leave()).map_err(js_err)
    }

    pub fn click(&mut self, fips: Option<String>) -> Result<(), JsValue> {
        let event = PointerEvent { kind: PointerKind::Click, fips: fips.map(Into::into) };
        self.inner.handle_pointer(event).map_err(js_err)
    }

    pub fn clear_selection(&mut self) -> bool { self.inner.clear_selection() }

    /// Legend for the active overlay, or `null` while its data are unavailable.
    pub fn legend(&self) -> Result<JsValue, JsValue> {
        match self.inner.legend() {
            Some(legend) => to_js(&legend).map_err(js_err),
            None => Ok(JsValue::NULL),
        }
    }

    /// Sidebar model for the selected (else hovered) county, or `null`.
    pub fn detail(&self) -> Result<JsValue, JsValue> {
        match self.inner.detail() {
            Some(detail) => to_js(&detail).map_err(js_err),
            None => Ok(JsValue::NULL),
        }
    }

    /// Failed loads as `[{ kind, message }]`, for the error banner.
    pub fn load_errors(&self) -> Result<JsValue, JsValue> {
        let errors: Vec<LoadErrorView> = self.inner.load_errors().iter()
            .map(|e| LoadErrorView { kind: e.kind().to_str(), message: e.to_string() })
            .collect();
        serde_wasm_bindgen::to_value(&errors).map_err(|e| e.into())
    }

    pub fn is_loading(&self) -> bool { self.inner.is_loading() }
}
