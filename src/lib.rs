#![doc = "County overlay coloring and interaction engine"]
mod config;
mod data;
mod interaction;
mod present;
mod scale;
mod session;
mod surface;
mod types;

#[doc(inline)]
pub use types::{Fips, Overlay};

#[doc(inline)]
pub use config::{
    BUILTIN_MAP_CONFIG, CONFIG_ENV_VAR, ConfigError, ElectionScaleConfig, FileConfig, MapConfig,
    PaletteConfig, PartyColors, SurfaceConfig, load_map_config,
};

#[doc(inline)]
pub use data::{
    AgeDistribution, CandidateResult, CountyCollection, CountyFeature, DataKind, DataSlot, Dataset,
    DemographicRecord, ElectionRecord, Keyed, LoadError, Party, Tally, parse_demographics,
    parse_elections, parse_geometry,
};

#[cfg(feature = "fs")]
#[doc(inline)]
pub use data::{DataPaths, LoadedData, load_all, read_demographics_file, read_elections_file, read_geometry_file};

#[doc(inline)]
pub use scale::{
    ColorMapping, ColorScale, DivergingScale, ParseColorError, QuantizeScale, Rgb, build_scale,
    county_color, election_color, election_scale,
};

#[doc(inline)]
pub use interaction::{HoverChange, InteractionPhase, InteractionState};

#[doc(inline)]
pub use surface::{
    LayerKind, LayerSpec, MapSurface, PointerEvent, PointerKind, RecordingSurface, SurfaceCall,
    SvgSurface,
};

#[doc(inline)]
pub use present::{
    AgeShare, CandidateLine, CountyDetail, DemographicSummary, ElectionSummary, Legend, NOT_AVAILABLE,
    TurnoutLine, format_currency, format_density, format_number, format_percent,
    format_value,
};

#[doc(inline)]
pub use session::{MapSession, PaintOutcome};
