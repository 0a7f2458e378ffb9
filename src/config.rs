//! Map configuration: palettes, election ramp, surface ids and data file names.
//!
//! Loaded from JSON; every field has a default, and the built-in configuration
//! (`data/map_config.json`) matches those defaults.

use std::{env, fs, io, path::{Path, PathBuf}, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{data::Party, scale::Rgb, types::Overlay};

pub const BUILTIN_MAP_CONFIG: &str = include_str!("data/map_config.json");

/// Environment variable naming a config file that replaces the built-in one.
pub const CONFIG_ENV_VAR: &str = "COUNTYMAP_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapConfig {
    pub default_overlay: Overlay,
    pub palettes: PaletteConfig,
    pub election: ElectionScaleConfig,
    pub fallback_color: Rgb,
    pub party_colors: PartyColors,
    pub surface: SurfaceConfig,
    pub files: FileConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_overlay: Overlay::Population,
            palettes: PaletteConfig::default(),
            election: ElectionScaleConfig::default(),
            fallback_color: Rgb::UNKNOWN,
            party_colors: PartyColors::default(),
            surface: SurfaceConfig::default(),
            files: FileConfig::default(),
        }
    }
}

fn palette(hex: [&str; 5]) -> Vec<Rgb> {
    hex.iter().filter_map(|h| h.parse().ok()).collect()
}

/// Fixed-size ordered color lists for the magnitude overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub population: Vec<Rgb>,
    pub income: Vec<Rgb>,
    pub age: Vec<Rgb>,
    pub density: Vec<Rgb>,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            population: palette(["#feedde", "#fdbe85", "#fd8d3c", "#e6550d", "#a63603"]),
            income: palette(["#edf8e9", "#bae4b3", "#74c476", "#31a354", "#006d2c"]),
            age: palette(["#eff3ff", "#bdd7e7", "#6baed6", "#3182bd", "#08519c"]),
            density: palette(["#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6"]),
        }
    }
}

impl PaletteConfig {
    /// Palette for a magnitude overlay; the election overlay has none.
    pub fn for_overlay(&self, overlay: Overlay) -> &[Rgb] {
        match overlay {
            Overlay::Population => &self.population,
            Overlay::Income => &self.income,
            Overlay::Age => &self.age,
            Overlay::Density => &self.density,
            Overlay::Election => &[],
        }
    }
}

/// Control points of the signed-margin ramp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectionScaleConfig {
    pub domain: Vec<f64>,
    pub colors: Vec<Rgb>,
}

impl Default for ElectionScaleConfig {
    fn default() -> Self {
        Self {
            domain: crate::scale::DivergingScale::MARGIN_DOMAIN.to_vec(),
            colors: crate::scale::DivergingScale::MARGIN_COLORS.to_vec(),
        }
    }
}

/// Swatch colors for candidate parties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartyColors {
    pub republican: Rgb,
    pub democratic: Rgb,
    pub libertarian: Rgb,
    pub green: Rgb,
    pub other: Rgb,
}

impl Default for PartyColors {
    fn default() -> Self {
        Self {
            republican: Rgb::new(0xdc, 0x14, 0x3c),
            democratic: Rgb::new(0x00, 0x15, 0xbc),
            libertarian: Rgb::new(0xfe, 0xd1, 0x05),
            green: Rgb::new(0x17, 0xaa, 0x5c),
            other: Rgb::new(0x80, 0x80, 0x80),
        }
    }
}

impl PartyColors {
    pub fn get(&self, party: Party) -> Rgb {
        match party {
            Party::Republican => self.republican,
            Party::Democratic => self.democratic,
            Party::Libertarian => self.libertarian,
            Party::Green => self.green,
            Party::Other => self.other,
        }
    }
}

/// Identifiers and base paint for the source and layers the session creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurfaceConfig {
    pub source_id: String,
    pub fill_layer_id: String,
    pub border_layer_id: String,
    pub fill_property: String,
    pub fill_color: Rgb,
    pub fill_opacity: f64,
    pub hover_opacity: f64,
    pub border_color: Rgb,
    pub border_width: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            source_id: "counties".to_string(),
            fill_layer_id: "counties-fill".to_string(),
            border_layer_id: "counties-border".to_string(),
            fill_property: "fill-color".to_string(),
            fill_color: Rgb::new(0x62, 0x7b, 0xc1),
            fill_opacity: 0.5,
            hover_opacity: 0.7,
            border_color: Rgb::new(0x62, 0x7b, 0xc1),
            border_width: 2.0,
        }
    }
}

/// File names of the three static datasets, relative to a data directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub geometry: String,
    pub demographics: String,
    pub elections: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            geometry: "arizona-counties.json".to_string(),
            demographics: "demographics.json".to_string(),
            elections: "election-results-2024.json".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse map config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read map config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid map config: {0}")]
    Invalid(String),
}

impl MapConfig {
    pub fn builtin() -> Arc<Self> {
        Arc::new(
            serde_json::from_str(BUILTIN_MAP_CONFIG)
                .expect("builtin map config should parse"),
        )
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: MapConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Check the invariants the scale engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for overlay in Overlay::ALL.into_iter().filter(Overlay::is_magnitude) {
            if self.palettes.for_overlay(overlay).is_empty() {
                return Err(ConfigError::Invalid(format!("palette for {:?} is empty", overlay.to_str())));
            }
        }

        let election = &self.election;
        if election.domain.len() < 2 {
            return Err(ConfigError::Invalid("election scale needs at least two control points".into()));
        }
        if election.domain.len() != election.colors.len() {
            return Err(ConfigError::Invalid(format!(
                "election scale has {} control points but {} colors",
                election.domain.len(),
                election.colors.len(),
            )));
        }
        if !election.domain.windows(2).all(|w| w[0] < w[1]) {
            return Err(ConfigError::Invalid("election control points must be strictly increasing".into()));
        }

        for (name, value) in [("fillOpacity", self.surface.fill_opacity), ("hoverOpacity", self.surface.hover_opacity)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!("{name} must be within [0, 1], got {value}")));
            }
        }

        Ok(())
    }
}

/// Load the configuration named by `COUNTYMAP_CONFIG`, or an explicit path,
/// falling back to the built-in configuration when neither loads.
pub fn load_map_config(path: Option<&Path>) -> Arc<MapConfig> {
    let candidate = path.map(Path::to_path_buf)
        .or_else(|| env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from));

    if let Some(path) = candidate {
        match MapConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "countymap::config",
                    path = %path.display(),
                    "map_config.loaded=file"
                );
                return Arc::new(config);
            }
            Err(err) => {
                tracing::warn!(
                    target: "countymap::config",
                    path = %path.display(),
                    error = %err,
                    "map_config.load_failed"
                );
            }
        }
    }

    tracing::info!(target: "countymap::config", "map_config.loaded=builtin");
    MapConfig::builtin()
}
