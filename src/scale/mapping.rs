use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::{
    data::{DemographicRecord, ElectionRecord},
    types::{Fips, Overlay},
};

use super::{ColorScale, DivergingScale, QuantizeScale, Rgb};

/// Per-county fill colors sent to the map surface, plus the color for any
/// feature whose FIPS is not in the mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMapping {
    colors: BTreeMap<Fips, Rgb>,
    fallback: Rgb,
}

impl ColorMapping {
    pub fn new(colors: BTreeMap<Fips, Rgb>, fallback: Rgb) -> Self { Self { colors, fallback } }

    /// Color every demographic record by its overlay value; records without a
    /// value get the fallback.
    pub fn for_demographics(overlay: Overlay, records: &[DemographicRecord], scale: &QuantizeScale) -> Self {
        let colors = records.iter()
            .map(|r| (r.fips.clone(), scale.color_or_fallback(r.overlay_value(overlay))))
            .collect();
        Self { colors, fallback: scale.fallback() }
    }

    /// Color every election record independently by its signed margin.
    pub fn for_elections(records: &[ElectionRecord], scale: &DivergingScale) -> Self {
        let colors = records.iter()
            .map(|r| (r.fips.clone(), scale.color(r.signed_margin())))
            .collect();
        Self { colors, fallback: scale.fallback() }
    }

    /// Mapping for the active overlay and its scale.
    pub fn build(
        overlay: Overlay,
        scale: &ColorScale,
        demographics: &[DemographicRecord],
        elections: &[ElectionRecord],
    ) -> Self {
        match scale {
            ColorScale::Quantize(scale) => Self::for_demographics(overlay, demographics, scale),
            ColorScale::Diverging(scale) => Self::for_elections(elections, scale),
        }
    }

    /// Color for a feature; unknown FIPS codes get the fallback.
    pub fn get(&self, fips: &str) -> Rgb { self.colors.get(fips).copied().unwrap_or(self.fallback) }

    #[inline]
    pub fn fallback(&self) -> Rgb { self.fallback }

    #[inline]
    pub fn len(&self) -> usize { self.colors.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.colors.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&Fips, Rgb)> + '_ {
        self.colors.iter().map(|(fips, &color)| (fips, color))
    }

    /// `{ "<fips>": "#rrggbb", ... }` for hosts that look colors up by feature property.
    pub fn to_json(&self) -> Value {
        Value::Object(self.colors.iter()
            .map(|(fips, color)| (fips.to_string(), Value::String(color.to_hex())))
            .collect::<Map<_, _>>())
    }
}
