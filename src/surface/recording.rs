use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;

use crate::{data::CountyCollection, scale::ColorMapping, types::Fips};

use super::{LayerSpec, MapSurface, PointerKind};

/// One call received by a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    SetSourceData { source: String, features: usize },
    AddLayer(LayerSpec),
    SetPaint { layer: String, property: String, mapping: ColorMapping },
    SetHoverFlag { source: String, fips: Fips, hovered: bool },
    OnPointer { layer: String, kind: PointerKind },
}

/// In-memory surface that accepts every call and keeps a log of them, along
/// with the resulting layers, paint and hover flags.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    calls: Vec<SurfaceCall>,
    layers: Vec<LayerSpec>,
    preexisting: BTreeSet<String>,
    paint: BTreeMap<String, ColorMapping>,
    hovered: BTreeSet<(String, Fips)>,
}

impl RecordingSurface {
    pub fn new() -> Self { Self::default() }

    /// Surface that already has the given layers, as after a remount of the map.
    pub fn with_layers<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self { preexisting: ids.into_iter().map(str::to_string).collect(), ..Self::default() }
    }

    #[inline]
    pub fn calls(&self) -> &[SurfaceCall] { &self.calls }

    /// Drain the call log, leaving the surface state in place.
    pub fn take_calls(&mut self) -> Vec<SurfaceCall> { std::mem::take(&mut self.calls) }

    /// Hover-flag calls only, in order.
    pub fn hover_calls(&self) -> Vec<(Fips, bool)> {
        self.calls.iter()
            .filter_map(|call| match call {
                SurfaceCall::SetHoverFlag { fips, hovered, .. } => Some((fips.clone(), *hovered)),
                _ => None,
            })
            .collect()
    }

    /// Layers added through [`MapSurface::add_layer`].
    #[inline]
    pub fn layers(&self) -> &[LayerSpec] { &self.layers }

    /// Current paint mapping of a layer.
    pub fn paint(&self, layer_id: &str) -> Option<&ColorMapping> { self.paint.get(layer_id) }

    /// Features currently carrying the hover flag.
    pub fn hovered(&self) -> Vec<&Fips> { self.hovered.iter().map(|(_, fips)| fips).collect() }

    pub fn subscriptions(&self) -> Vec<(&str, PointerKind)> {
        self.calls.iter()
            .filter_map(|call| match call {
                SurfaceCall::OnPointer { layer, kind } => Some((layer.as_str(), *kind)),
                _ => None,
            })
            .collect()
    }
}

impl MapSurface for RecordingSurface {
    fn set_source_data(&mut self, source_id: &str, data: &CountyCollection) -> Result<()> {
        self.calls.push(SurfaceCall::SetSourceData { source: source_id.to_string(), features: data.len() });
        Ok(())
    }

    fn has_layer(&self, layer_id: &str) -> bool {
        self.preexisting.contains(layer_id) || self.layers.iter().any(|l| l.id == layer_id)
    }

    fn add_layer(&mut self, layer: &LayerSpec) -> Result<()> {
        self.calls.push(SurfaceCall::AddLayer(layer.clone()));
        self.layers.push(layer.clone());
        Ok(())
    }

    fn set_paint_color_mapping(&mut self, layer_id: &str, property: &str, mapping: &ColorMapping) -> Result<()> {
        self.calls.push(SurfaceCall::SetPaint {
            layer: layer_id.to_string(),
            property: property.to_string(),
            mapping: mapping.clone(),
        });
        self.paint.insert(layer_id.to_string(), mapping.clone());
        Ok(())
    }

    fn set_feature_hover_flag(&mut self, source_id: &str, fips: &Fips, hovered: bool) -> Result<()> {
        self.calls.push(SurfaceCall::SetHoverFlag { source: source_id.to_string(), fips: fips.clone(), hovered });
        let key = (source_id.to_string(), fips.clone());
        if hovered {
            self.hovered.insert(key);
        } else {
            self.hovered.remove(&key);
        }
        Ok(())
    }

    fn on_pointer(&mut self, layer_id: &str, kind: PointerKind) -> Result<()> {
        self.calls.push(SurfaceCall::OnPointer { layer: layer_id.to_string(), kind });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SurfaceConfig, scale::Rgb};

    #[test]
    fn tracks_layers_and_flags() {
        let mut surface = RecordingSurface::with_layers(["counties-border"]);
        assert!(surface.has_layer("counties-border"));
        assert!(!surface.has_layer("counties-fill"));

        surface.add_layer(&LayerSpec::fill(&SurfaceConfig::default())).unwrap();
        assert!(surface.has_layer("counties-fill"));

        let fips = Fips::from("04013");
        surface.set_feature_hover_flag("counties", &fips, true).unwrap();
        assert_eq!(surface.hovered(), vec![&fips]);
        surface.set_feature_hover_flag("counties", &fips, false).unwrap();
        assert!(surface.hovered().is_empty());
        assert_eq!(surface.hover_calls(), vec![(fips.clone(), true), (fips, false)]);
    }

    #[test]
    fn keeps_latest_paint() {
        let mut surface = RecordingSurface::new();
        let first = ColorMapping::new(BTreeMap::new(), Rgb::UNKNOWN);
        let second = ColorMapping::new(BTreeMap::new(), Rgb::new(0, 0, 0));
        surface.set_paint_color_mapping("counties-fill", "fill-color", &first).unwrap();
        surface.set_paint_color_mapping("counties-fill", "fill-color", &second).unwrap();

        assert_eq!(surface.paint("counties-fill"), Some(&second));
        assert_eq!(surface.take_calls().len(), 2);
        assert!(surface.calls().is_empty());
        assert_eq!(surface.paint("counties-fill"), Some(&second));
    }
}
