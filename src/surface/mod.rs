//! The rendering engine, seen from the session: a geometry source, a fill and
//! a border layer, a paint mapping, per-feature hover flags and pointer events.

mod recording;
mod svg;

pub use recording::{RecordingSurface, SurfaceCall};
pub use svg::SvgSurface;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{
    config::SurfaceConfig,
    data::CountyCollection,
    scale::{ColorMapping, Rgb},
    types::Fips,
};

/// Capability the session drives. All coloring and highlighting is expressed as
/// data sent through these calls.
pub trait MapSurface {
    /// Add or replace a geometry source. Features are addressed by FIPS.
    fn set_source_data(&mut self, source_id: &str, data: &CountyCollection) -> Result<()>;

    fn has_layer(&self, layer_id: &str) -> bool;

    fn add_layer(&mut self, layer: &LayerSpec) -> Result<()>;

    /// Color each feature of `layer_id` by FIPS; features not in the mapping take its fallback.
    fn set_paint_color_mapping(&mut self, layer_id: &str, property: &str, mapping: &ColorMapping) -> Result<()>;

    fn set_feature_hover_flag(&mut self, source_id: &str, fips: &Fips, hovered: bool) -> Result<()>;

    /// Ask for pointer events of `kind` on `layer_id`. The host delivers them
    /// back as [`PointerEvent`]s through `MapSession::handle_pointer`.
    fn on_pointer(&mut self, layer_id: &str, kind: PointerKind) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerKind {
    /// Polygon fill; hovered features use `hover_opacity`.
    Fill { color: Rgb, opacity: f64, hover_opacity: f64 },
    Line { color: Rgb, width: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub id: String,
    pub source: String,
    #[serde(flatten)]
    pub kind: LayerKind,
}

impl LayerSpec {
    pub fn fill(config: &SurfaceConfig) -> Self {
        Self {
            id: config.fill_layer_id.clone(),
            source: config.source_id.clone(),
            kind: LayerKind::Fill {
                color: config.fill_color,
                opacity: config.fill_opacity,
                hover_opacity: config.hover_opacity,
            },
        }
    }

    pub fn border(config: &SurfaceConfig) -> Self {
        Self {
            id: config.border_layer_id.clone(),
            source: config.source_id.clone(),
            kind: LayerKind::Line { color: config.border_color, width: config.border_width },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Move,
    Leave,
    Click,
}

impl PointerKind {
    pub const ALL: [PointerKind; 3] = [PointerKind::Move, PointerKind::Leave, PointerKind::Click];

    pub fn to_str(&self) -> &'static str {
        match self {
            PointerKind::Move => "move",
            PointerKind::Leave => "leave",
            PointerKind::Click => "click",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "move" | "mousemove" => Some(PointerKind::Move),
            "leave" | "mouseleave" => Some(PointerKind::Leave),
            "click" => Some(PointerKind::Click),
            _ => None,
        }
    }
}

/// Pointer event delivered by the host. `fips` is the identifier of the
/// feature under the pointer, when there is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub fips: Option<Fips>,
}

impl PointerEvent {
    pub fn moved(fips: impl Into<Fips>) -> Self { Self { kind: PointerKind::Move, fips: Some(fips.into()) } }

    pub fn leave() -> Self { Self { kind: PointerKind::Leave, fips: None } }

    pub fn click(fips: impl Into<Fips>) -> Self { Self { kind: PointerKind::Click, fips: Some(fips.into()) } }
}
