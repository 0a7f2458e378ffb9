use anyhow::{Result, anyhow};
use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};

use countymap_core::{ColorMapping, CountyCollection, Fips, LayerSpec, MapSurface, PointerKind};

use crate::common::to_js;

/// Map surface backed by a JS object. Each trait call becomes a method call on
/// that object, with camelCase names:
/// `setSourceData(id, geojson)`, `hasLayer(id)`, `addLayer(spec)`,
/// `setPaintColorMapping(layerId, property, mapping, fallback)`,
/// `setFeatureHoverFlag(sourceId, fips, hovered)`, `onPointer(layerId, kind)`.
pub(crate) struct JsSurface {
    target: Object,
}

impl JsSurface {
    pub(crate) fn new(target: JsValue) -> Result<Self> {
        let target: Object = target.dyn_into().map_err(|_| anyhow!("surface must be an object"))?;
        Ok(Self { target })
    }

    fn call(&self, method: &str, args: &[JsValue]) -> Result<JsValue> {
        let function: Function = Reflect::get(&self.target, &JsValue::from_str(method))
            .map_err(|e| anyhow!("error getting surface.{method}: {e:?}"))?
            .dyn_into()
            .map_err(|_| anyhow!("surface.{method} is not a function"))?;
        let args = args.iter().collect::<Array>();
        Reflect::apply(&function, &self.target, &args)
            .map_err(|e| anyhow!("surface.{method} threw: {e:?}"))
    }
}

impl MapSurface for JsSurface {
    fn set_source_data(&mut self, source_id: &str, data: &CountyCollection) -> Result<()> {
        self.call("setSourceData", &[JsValue::from_str(source_id), to_js(&data.to_geojson())?])?;
        Ok(())
    }

    fn has_layer(&self, layer_id: &str) -> bool {
        match self.call("hasLayer", &[JsValue::from_str(layer_id)]) {
            Ok(value) => value.is_truthy(),
            Err(err) => {
                tracing::warn!(target: "countymap::session", layer = layer_id, error = %err, "hasLayer failed");
                false
            }
        }
    }

    fn add_layer(&mut self, layer: &LayerSpec) -> Result<()> {
        self.call("addLayer", &[to_js(layer)?])?;
        Ok(())
    }

    fn set_paint_color_mapping(&mut self, layer_id: &str, property: &str, mapping: &ColorMapping) -> Result<()> {
        self.call("setPaintColorMapping", &[
            JsValue::from_str(layer_id),
            JsValue::from_str(property),
            to_js(&mapping.to_json())?,
            JsValue::from_str(&mapping.fallback().to_hex()),
        ])?;
        Ok(())
    }

    fn set_feature_hover_flag(&mut self, source_id: &str, fips: &Fips, hovered: bool) -> Result<()> {
        self.call("setFeatureHoverFlag", &[
            JsValue::from_str(source_id),
            JsValue::from_str(fips.as_str()),
            JsValue::from_bool(hovered),
        ])?;
        Ok(())
    }

    fn on_pointer(&mut self, layer_id: &str, kind: PointerKind) -> Result<()> {
        self.call("onPointer", &[JsValue::from_str(layer_id), JsValue::from_str(kind.to_str())])?;
        Ok(())
    }
}
