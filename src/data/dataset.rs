use ahash::AHashMap;

use crate::types::Fips;

/// A record that can be joined to a county by its FIPS code.
pub trait Keyed {
    fn fips(&self) -> &Fips;
    fn name(&self) -> &str;
}

/// Read-only collection of records indexed by FIPS.
///
/// Lookups are exact, case-sensitive string matches. A missing key is an expected
/// outcome (geometry without matching data) and is reported as `None`.
#[derive(Debug, Clone)]
pub struct Dataset<T> {
    records: Vec<T>,
    index: AHashMap<Fips, u32>, // Map between FIPS codes and record positions.
}

impl<T> Default for Dataset<T> {
    fn default() -> Self {
        Self { records: Vec::new(), index: AHashMap::new() }
    }
}

impl<T: Keyed> Dataset<T> {
    /// Index records in file order. When a FIPS appears twice, the first record
    /// wins and later ones are dropped, so lookups, scales and paint all agree.
    pub fn new(records: Vec<T>) -> Self {
        let mut index = AHashMap::with_capacity(records.len());
        let mut kept = Vec::with_capacity(records.len());
        for record in records {
            if index.contains_key(record.fips()) {
                tracing::warn!(
                    target: "countymap::load",
                    fips = %record.fips(),
                    "duplicate record ignored"
                );
                continue;
            }
            index.insert(record.fips().clone(), kept.len() as u32);
            kept.push(record);
        }
        Self { records: kept, index }
    }

    pub fn lookup(&self, fips: &str) -> Option<&T> {
        self.index.get(fips).map(|&i| &self.records[i as usize])
    }

    pub fn contains(&self, fips: &str) -> bool { self.index.contains_key(fips) }

    /// Case-insensitive match on the record's display name.
    pub fn find_by_name(&self, name: &str) -> Option<&T> {
        let name = name.trim();
        self.records.iter().find(|r| r.name().eq_ignore_ascii_case(name))
    }
}

impl<T> Dataset<T> {
    #[inline]
    pub fn len(&self) -> usize { self.records.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    #[inline]
    pub fn records(&self) -> &[T] { &self.records }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ { self.records.iter() }
}

impl<T: Keyed> FromIterator<T> for Dataset<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self { Self::new(iter.into_iter().collect()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Row { fips: Fips, name: String, value: u32 }

    impl Keyed for Row {
        fn fips(&self) -> &Fips { &self.fips }
        fn name(&self) -> &str { &self.name }
    }

    fn row(fips: &str, name: &str, value: u32) -> Row {
        Row { fips: Fips::from(fips), name: name.into(), value }
    }

    fn make_dataset() -> Dataset<Row> {
        Dataset::new(vec![
            row("04013", "Maricopa", 1),
            row("04019", "Pima", 2),
            row("04012", "La Paz", 3),
        ])
    }

    #[test]
    fn lookup_hits_exact_key() {
        let data = make_dataset();
        assert_eq!(data.len(), 3);
        assert_eq!(data.lookup("04019").map(|r| r.value), Some(2));
        assert!(data.contains("04012"));
    }

    #[test]
    fn lookup_miss_is_none() {
        let data = make_dataset();
        assert!(data.lookup("04099").is_none());
        assert!(data.lookup("4013").is_none()); // no numeric coercion
        assert!(data.lookup("").is_none());
        assert!(!data.contains(" 04013"));
    }

    #[test]
    fn empty_dataset_never_panics() {
        let data: Dataset<Row> = Dataset::default();
        assert!(data.is_empty());
        assert!(data.lookup("04013").is_none());
        assert!(data.find_by_name("Pima").is_none());
    }

    #[test]
    fn duplicate_keys_keep_first() {
        let data = Dataset::new(vec![
            row("04013", "Maricopa", 1),
            row("04019", "Pima", 2),
            row("04013", "Maricopa", 9),
        ]);
        assert_eq!(data.lookup("04013").map(|r| r.value), Some(1));
        assert_eq!(data.lookup("04019").map(|r| r.value), Some(2));
        assert_eq!(data.len(), 2);
        let values: Vec<u32> = data.iter().map(|r| r.value).collect();
        assert_eq!(values, [1, 2]);
    }

    #[test]
    fn find_by_name_ignores_case() {
        let data = make_dataset();
        assert_eq!(data.find_by_name("la paz").map(|r| r.value), Some(3));
        assert_eq!(data.find_by_name(" PIMA ").map(|r| r.value), Some(2));
        assert!(data.find_by_name("Yuma").is_none());
    }
}
