//! View models for the legend and the county sidebar.

mod detail;
mod format;
mod legend;

pub use detail::{AgeShare, CandidateLine, CountyDetail, DemographicSummary, ElectionSummary, TurnoutLine};
pub use format::{NOT_AVAILABLE, format_currency, format_density, format_number, format_percent};
pub use legend::{Legend, format_value};
