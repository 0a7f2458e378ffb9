use std::{borrow::Borrow, fmt, sync::Arc};

use serde::{Deserialize, Serialize};

/// Join key shared by the geometry, demographic and election datasets.
/// Keeps the original zero-padded text (e.g. "04013") and never compares numerically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fips(Arc<str>);

impl Fips {
    /// Width of a state + county code.
    pub const COUNTY_LEN: usize = 5;

    pub fn new(id: impl Into<Arc<str>>) -> Self { Self(id.into()) }

    /// Build a county code from a numeric feature id, restoring the leading zeros
    /// that a numeric encoding drops (4013 -> "04013").
    pub fn from_numeric(id: u64) -> Self {
        Self(Arc::from(format!("{:0width$}", id, width = Self::COUNTY_LEN)))
    }

    #[inline]
    pub fn as_str(&self) -> &str { &self.0 }
}

impl Borrow<str> for Fips {
    fn borrow(&self) -> &str { &self.0 }
}

impl AsRef<str> for Fips {
    fn as_ref(&self) -> &str { &self.0 }
}

impl fmt::Display for Fips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for Fips {
    fn from(id: &str) -> Self { Self::new(id) }
}

impl From<String> for Fips {
    fn from(id: String) -> Self { Self::new(id) }
}
