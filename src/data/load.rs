use serde::de::DeserializeOwned;

use super::{
    dataset::Dataset,
    demographics::DemographicRecord,
    election::{ElectionRecord, RawElectionRecord},
    error::{DataKind, LoadError},
    geometry::CountyCollection,
};

/// Completion state of one asynchronous load.
#[derive(Debug, Default)]
pub enum DataSlot<T> {
    #[default]
    Pending,
    Ready(T),
    Failed(LoadError),
}

impl<T> DataSlot<T> {
    pub fn from_result(result: Result<T, LoadError>) -> Self {
        match result {
            Ok(data) => DataSlot::Ready(data),
            Err(err) => DataSlot::Failed(err),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            DataSlot::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&LoadError> {
        match self {
            DataSlot::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool { matches!(self, DataSlot::Pending) }
}

impl<T> DataSlot<Dataset<T>> {
    /// Loaded records, or an empty slice while pending or after a failure.
    pub fn records(&self) -> &[T] {
        self.ready().map(Dataset::records).unwrap_or(&[])
    }

    pub fn lookup(&self, fips: &str) -> Option<&T>
    where
        T: super::dataset::Keyed,
    {
        self.ready().and_then(|data| data.lookup(fips))
    }
}

fn parse_array<T: DeserializeOwned>(kind: DataKind, bytes: &[u8]) -> Result<Vec<T>, LoadError> {
    serde_json::from_slice(bytes).map_err(|source| LoadError::Parse { kind, source })
}

/// Parse the demographics file: a JSON array of county records.
pub fn parse_demographics(bytes: &[u8]) -> Result<Dataset<DemographicRecord>, LoadError> {
    let records: Vec<DemographicRecord> = parse_array(DataKind::Demographics, bytes)?;
    tracing::info!(target: "countymap::load", count = records.len(), "demographics parsed");
    Ok(Dataset::new(records))
}

/// Parse the election results file. Records that cannot name a winner are skipped.
pub fn parse_elections(bytes: &[u8]) -> Result<Dataset<ElectionRecord>, LoadError> {
    let raw: Vec<RawElectionRecord> = parse_array(DataKind::Elections, bytes)?;

    let mut records = Vec::with_capacity(raw.len());
    for item in raw {
        match ElectionRecord::try_from(item) {
            Ok(record) => records.push(record),
            Err(err) => tracing::warn!(target: "countymap::load", error = %err, "election record skipped"),
        }
    }

    tracing::info!(target: "countymap::load", count = records.len(), "election results parsed");
    Ok(Dataset::new(records))
}

/// Parse the county geometry file (GeoJSON FeatureCollection).
pub fn parse_geometry(bytes: &[u8]) -> Result<CountyCollection, LoadError> {
    let counties = CountyCollection::from_geojson_bytes(bytes)?;
    tracing::info!(target: "countymap::load", count = counties.len(), "county geometry parsed");
    Ok(counties)
}

#[cfg(feature = "fs")]
mod files {
    use std::path::{Path, PathBuf};

    use super::*;

    fn read(kind: DataKind, path: &Path) -> Result<Vec<u8>, LoadError> {
        tracing::info!(target: "countymap::load", %kind, path = %path.display(), "reading");
        std::fs::read(path).map_err(|source| LoadError::Read { kind, path: path.to_path_buf(), source })
    }

    pub fn read_geometry_file(path: &Path) -> Result<CountyCollection, LoadError> {
        parse_geometry(&read(DataKind::Geometry, path)?)
    }

    pub fn read_demographics_file(path: &Path) -> Result<Dataset<DemographicRecord>, LoadError> {
        parse_demographics(&read(DataKind::Demographics, path)?)
    }

    pub fn read_elections_file(path: &Path) -> Result<Dataset<ElectionRecord>, LoadError> {
        parse_elections(&read(DataKind::Elections, path)?)
    }

    /// Locations of the three static files.
    #[derive(Debug, Clone)]
    pub struct DataPaths {
        pub geometry: PathBuf,
        pub demographics: PathBuf,
        pub elections: PathBuf,
    }

    /// Results of the three independent loads; any of them may have failed.
    #[derive(Debug)]
    pub struct LoadedData {
        pub geometry: Result<CountyCollection, LoadError>,
        pub demographics: Result<Dataset<DemographicRecord>, LoadError>,
        pub elections: Result<Dataset<ElectionRecord>, LoadError>,
    }

    /// Read and parse all three files concurrently. No ordering between them.
    pub fn load_all(paths: &DataPaths) -> LoadedData {
        let (geometry, (demographics, elections)) = rayon::join(
            || read_geometry_file(&paths.geometry),
            || rayon::join(
                || read_demographics_file(&paths.demographics),
                || read_elections_file(&paths.elections),
            ),
        );

        for err in [geometry.as_ref().err(), demographics.as_ref().err(), elections.as_ref().err()]
            .into_iter()
            .flatten()
        {
            tracing::warn!(target: "countymap::load", kind = %err.kind(), error = %err, "load failed");
        }

        LoadedData { geometry, demographics, elections }
    }
}

#[cfg(feature = "fs")]
pub use files::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_states() {
        let pending: DataSlot<Dataset<DemographicRecord>> = DataSlot::default();
        assert!(pending.is_pending());
        assert!(pending.records().is_empty());
        assert!(pending.lookup("04013").is_none());

        let failed: DataSlot<Dataset<DemographicRecord>> = DataSlot::from_result(parse_demographics(b"[{"));
        assert!(!failed.is_pending());
        assert!(failed.records().is_empty());
        assert_eq!(failed.error().map(LoadError::kind), Some(DataKind::Demographics));
    }

    #[test]
    fn parse_demographics_array() {
        let data = parse_demographics(br#"[
            { "fips": "04013", "name": "Maricopa", "population": 100, "medianIncome": 5 },
            { "fips": "04019", "name": "Pima", "population": 200, "medianIncome": 6 }
        ]"#).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.lookup("04019").map(|r| r.population), Some(200));
    }

    #[test]
    fn parse_elections_skips_records_without_winner() {
        let data = parse_elections(br#"[
            { "fips": "04001", "name": "Apache", "totalVotes": 10,
              "candidates": [ { "name": "A", "party": "Green", "votes": 6, "percentage": 60.0 },
                              { "name": "B", "party": "Other", "votes": 4, "percentage": 40.0 } ] },
            { "fips": "04003", "name": "Cochise", "totalVotes": 0 }
        ]"#).unwrap();
        assert_eq!(data.len(), 1);
        let apache = data.lookup("04001").unwrap();
        assert_eq!(apache.winner, "A");
        assert_eq!(apache.margin, 20.0);
    }

    #[test]
    fn wrong_shape_is_a_parse_error() {
        let err = parse_elections(br#"{ "fips": "04001" }"#).unwrap_err();
        assert!(matches!(err, LoadError::Parse { kind: DataKind::Elections, .. }));
    }

    #[cfg(feature = "fs")]
    #[test]
    fn load_all_reports_each_failure_independently() {
        let dir = tempfile::tempdir().unwrap();
        let demographics = dir.path().join("demographics.json");
        std::fs::write(&demographics, r#"[{ "fips": "04013", "population": 1, "medianIncome": 2 }]"#).unwrap();
        let elections = dir.path().join("elections.json");
        std::fs::write(&elections, "not json").unwrap();

        let loaded = load_all(&DataPaths {
            geometry: dir.path().join("missing.json"),
            demographics,
            elections,
        });

        assert!(matches!(loaded.geometry, Err(LoadError::Read { kind: DataKind::Geometry, .. })));
        assert_eq!(loaded.demographics.unwrap().len(), 1);
        assert!(matches!(loaded.elections, Err(LoadError::Parse { .. })));
    }
}
