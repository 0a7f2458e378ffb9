use serde::{Deserialize, Serialize};

/// Data dimension the county fill is colored by. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overlay {
    #[default]
    Population, // Total population
    Income,     // Median household income
    Age,        // Senior (65+) share of population
    Density,    // Population per square mile
    Election,   // Signed winning margin
}

impl Overlay {
    pub const ALL: [Overlay; 5] = [
        Overlay::Population,
        Overlay::Income,
        Overlay::Age,
        Overlay::Density,
        Overlay::Election,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            Overlay::Population => "population",
            Overlay::Income => "income",
            Overlay::Age => "age",
            Overlay::Density => "density",
            Overlay::Election => "election",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "population" => Some(Overlay::Population),
            "income" => Some(Overlay::Income),
            "age" => Some(Overlay::Age),
            "density" => Some(Overlay::Density),
            "election" => Some(Overlay::Election),
            _ => None,
        }
    }

    /// Human-readable title used by the legend and overlay buttons.
    pub fn label(&self) -> &'static str {
        match self {
            Overlay::Population => "Population",
            Overlay::Income => "Median Income",
            Overlay::Age => "Senior Population (65+)",
            Overlay::Density => "Population Density",
            Overlay::Election => "2024 Election",
        }
    }

    /// Magnitude overlays are quantized over the demographic records;
    /// the election overlay colors each county from its own result.
    pub fn is_magnitude(&self) -> bool { !matches!(self, Overlay::Election) }
}
