use std::{fmt, io, path::PathBuf};

use thiserror::Error;

/// Which of the three static sources an operation concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Geometry,
    Demographics,
    Elections,
}

impl DataKind {
    pub fn to_str(&self) -> &'static str {
        match self {
            DataKind::Geometry => "geometry",
            DataKind::Demographics => "demographics",
            DataKind::Elections => "elections",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "geometry" | "counties" => Some(DataKind::Geometry),
            "demographics" => Some(DataKind::Demographics),
            "elections" | "election" => Some(DataKind::Elections),
            _ => None,
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.to_str()) }
}

/// A static file could not be fetched or decoded. Never fatal: the session falls
/// back to an empty collection and surfaces the error to the presentation layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {kind} from {path:?}: {source}")]
    Read {
        kind: DataKind,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {kind}: {source}")]
    Parse {
        kind: DataKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed {kind}: {message}")]
    Format { kind: DataKind, message: String },
    #[error("failed to fetch {kind}: {message}")]
    Fetch { kind: DataKind, message: String },
}

impl LoadError {
    pub fn kind(&self) -> DataKind {
        match self {
            LoadError::Read { kind, .. }
            | LoadError::Parse { kind, .. }
            | LoadError::Format { kind, .. }
            | LoadError::Fetch { kind, .. } => *kind,
        }
    }
}
