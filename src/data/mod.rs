mod dataset;
mod demographics;
mod election;
mod error;
mod geometry;
mod load;

pub use dataset::{Dataset, Keyed};
pub use demographics::{AgeDistribution, DemographicRecord};
pub use election::{CandidateResult, ElectionRecord, Party, Tally};
pub use error::{DataKind, LoadError};
pub use geometry::{CountyCollection, CountyFeature};
pub use load::*;
