mod fips;
mod overlay;

pub use fips::Fips;
pub use overlay::Overlay;
