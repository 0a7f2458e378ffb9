use std::path::PathBuf;

use countymap::Overlay;

/// County map CLI: legends, county details and choropleth SVGs from the static data files
#[derive(clap::Parser, Debug)]
#[command(name = "countymap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Map configuration file (JSON); defaults to $COUNTYMAP_CONFIG, then the built-in config
    #[arg(long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Print the color legend for an overlay
    Legend(LegendArgs),

    /// Print the detail sidebar for one county
    Inspect(InspectArgs),

    /// Render the colored map to an SVG file
    Render(RenderArgs),
}

/// Location of the three data files.
#[derive(clap::Args, Debug)]
pub struct DataArgs {
    /// Directory holding the geometry, demographics and election files
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub data_dir: PathBuf,

    /// Geometry file, overriding the configured name inside DATA_DIR
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub geometry: Option<PathBuf>,

    /// Demographics file, overriding the configured name inside DATA_DIR
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub demographics: Option<PathBuf>,

    /// Election results file, overriding the configured name inside DATA_DIR
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub elections: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct LegendArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// population, income, age, density or election; defaults to the configured overlay
    #[arg(short = 'O', long, value_parser = parse_overlay)]
    pub overlay: Option<Overlay>,
}

#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// FIPS code (e.g. 04013) or county name (e.g. "Maricopa")
    pub county: String,
}

#[derive(clap::Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// population, income, age, density or election; defaults to the configured overlay
    #[arg(short = 'O', long, value_parser = parse_overlay)]
    pub overlay: Option<Overlay>,

    /// County to draw with hover emphasis (FIPS or name)
    #[arg(long)]
    pub hover: Option<String>,

    /// Hover whatever county lies under this position, given as LON,LAT
    #[arg(long, value_name = "LON,LAT", value_parser = parse_lon_lat, allow_hyphen_values = true, conflicts_with = "hover")]
    pub hover_at: Option<(f64, f64)>,

    /// County to select (FIPS or name); its detail is printed
    #[arg(long)]
    pub select: Option<String>,

    /// Output SVG file, defaults to "./map.svg"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long, default_value_t = 1200)]
    pub width: u32,
}

fn parse_overlay(s: &str) -> Result<Overlay, String> {
    Overlay::from_str(s).ok_or_else(|| {
        format!("unknown overlay {s:?}; expected one of: population, income, age, density, election")
    })
}

fn parse_lon_lat(s: &str) -> Result<(f64, f64), String> {
    let (lon, lat) = s.split_once(',')
        .ok_or_else(|| format!("expected LON,LAT, got {s:?}"))?;
    let parse = |v: &str| v.trim().parse::<f64>().map_err(|e| format!("invalid coordinate {v:?}: {e}"));
    Ok((parse(lon)?, parse(lat)?))
}
