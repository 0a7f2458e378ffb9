//! Scale engine: turns the active overlay and the loaded records into colors.

mod color;
mod diverging;
mod mapping;
mod quantize;

pub use color::{ParseColorError, Rgb};
pub use diverging::DivergingScale;
pub use mapping::ColorMapping;
pub use quantize::QuantizeScale;

use crate::{
    config::MapConfig,
    data::{DemographicRecord, ElectionRecord},
    types::Overlay,
};

/// Value → color function for one overlay, with its domain and discrete range.
/// Rebuilt whenever the overlay or the data change; never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorScale {
    Quantize(QuantizeScale),
    Diverging(DivergingScale),
}

impl ColorScale {
    pub fn color(&self, value: f64) -> Rgb {
        match self {
            ColorScale::Quantize(scale) => scale.color(value),
            ColorScale::Diverging(scale) => scale.color(value),
        }
    }

    pub fn domain(&self) -> Option<(f64, f64)> {
        match self {
            ColorScale::Quantize(scale) => scale.domain(),
            ColorScale::Diverging(scale) => scale.domain(),
        }
    }

    pub fn range(&self) -> Vec<Rgb> {
        match self {
            ColorScale::Quantize(scale) => scale.range().to_vec(),
            ColorScale::Diverging(scale) => scale.range(),
        }
    }

    pub fn fallback(&self) -> Rgb {
        match self {
            ColorScale::Quantize(scale) => scale.fallback(),
            ColorScale::Diverging(scale) => scale.fallback(),
        }
    }
}

/// Build the scale for an overlay.
///
/// Magnitude overlays quantize the values defined on `records` (records without
/// a value take no part in the domain). The election overlay ignores `records`:
/// each county is colored from its own result on the signed-margin ramp.
pub fn build_scale(overlay: Overlay, records: &[DemographicRecord], config: &MapConfig) -> ColorScale {
    if !overlay.is_magnitude() {
        return ColorScale::Diverging(election_scale(config));
    }

    let scale = QuantizeScale::from_values(
        records.iter().filter_map(|r| r.overlay_value(overlay)),
        config.palettes.for_overlay(overlay).to_vec(),
        config.fallback_color,
    );

    if scale.is_degenerate() {
        tracing::debug!(
            target: "countymap::scale",
            overlay = overlay.to_str(),
            records = records.len(),
            "degenerate domain; using a single bucket"
        );
    }

    ColorScale::Quantize(scale)
}

pub fn election_scale(config: &MapConfig) -> DivergingScale {
    DivergingScale::new(&config.election.domain, &config.election.colors, config.fallback_color)
}

/// Fill color of a county under the election overlay; a missing result gets the fallback.
pub fn election_color(record: Option<&ElectionRecord>, scale: &DivergingScale) -> Rgb {
    record.map(|r| scale.color(r.signed_margin())).unwrap_or(scale.fallback())
}

/// Fill color of a county under a magnitude overlay; a join miss or an
/// undefined value gets the fallback.
pub fn county_color(record: Option<&DemographicRecord>, overlay: Overlay, scale: &QuantizeScale) -> Rgb {
    scale.color_or_fallback(record.and_then(|r| r.overlay_value(overlay)))
}
