use serde::{Deserialize, Serialize};

use crate::types::{Fips, Overlay};

use super::dataset::Keyed;

/// Population split into three age buckets. The buckets should sum to roughly
/// the county population, but this is not enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeDistribution {
    pub under18: u64,
    pub age18to64: u64,
    pub age65_plus: u64,
}

impl AgeDistribution {
    pub fn total(&self) -> u64 { self.under18 + self.age18to64 + self.age65_plus }
}

/// County demographics as produced by the census generator script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicRecord {
    pub fips: Fips,
    #[serde(default)]
    pub name: String,
    pub population: u64,
    pub median_income: u64,
    #[serde(default)]
    pub age_distribution: AgeDistribution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub housing_units: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_square_miles: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population_density: Option<f64>,
}

impl DemographicRecord {
    /// Stored density if present, otherwise population / area when the area is positive.
    pub fn population_density(&self) -> Option<f64> {
        self.population_density.or_else(|| {
            self.area_square_miles
                .filter(|&area| area > 0.0)
                .map(|area| self.population as f64 / area)
        })
    }

    /// Share of the population aged 65 and over. Undefined for empty counties.
    pub fn senior_fraction(&self) -> Option<f64> {
        (self.population > 0).then(|| self.age_distribution.age65_plus as f64 / self.population as f64)
    }

    /// Numeric value this record contributes to a magnitude overlay.
    /// The election overlay has no demographic value.
    pub fn overlay_value(&self, overlay: Overlay) -> Option<f64> {
        let value = match overlay {
            Overlay::Population => Some(self.population as f64),
            Overlay::Income => Some(self.median_income as f64),
            Overlay::Age => self.senior_fraction(),
            Overlay::Density => self.population_density(),
            Overlay::Election => None,
        };
        value.filter(|v| v.is_finite())
    }
}

impl Keyed for DemographicRecord {
    fn fips(&self) -> &Fips { &self.fips }
    fn name(&self) -> &str { &self.name }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maricopa() -> DemographicRecord {
        serde_json::from_str(r#"{
            "fips": "04013",
            "name": "Maricopa",
            "population": 4485414,
            "medianIncome": 69872,
            "ageDistribution": { "under18": 1031645, "age18to64": 2646394, "age65Plus": 807375 },
            "housingUnits": 1842753,
            "areaSquareMiles": 9224,
            "populationDensity": 486.28
        }"#).unwrap()
    }

    #[test]
    fn parses_camel_case_fields() {
        let record = maricopa();
        assert_eq!(record.fips.as_str(), "04013");
        assert_eq!(record.median_income, 69872);
        assert_eq!(record.age_distribution.age65_plus, 807375);
        assert_eq!(record.housing_units, Some(1842753));
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let record: DemographicRecord = serde_json::from_str(
            r#"{ "fips": "04011", "population": 9563, "medianIncome": 63542 }"#,
        ).unwrap();
        assert_eq!(record.housing_units, None);
        assert_eq!(record.population_density(), None);
        assert_eq!(record.age_distribution.total(), 0);
    }

    #[test]
    fn density_is_derived_from_area_when_missing() {
        let mut record = maricopa();
        record.population_density = None;
        let density = record.population_density().unwrap();
        assert!((density - 4485414.0 / 9224.0).abs() < 1e-9);

        record.area_square_miles = Some(0.0);
        assert_eq!(record.population_density(), None);
    }

    #[test]
    fn overlay_values() {
        let record = maricopa();
        assert_eq!(record.overlay_value(Overlay::Population), Some(4485414.0));
        assert_eq!(record.overlay_value(Overlay::Income), Some(69872.0));
        assert_eq!(record.overlay_value(Overlay::Density), Some(486.28));
        assert_eq!(record.overlay_value(Overlay::Election), None);

        let age = record.overlay_value(Overlay::Age).unwrap();
        assert!((age - 807375.0 / 4485414.0).abs() < 1e-12);
    }

    #[test]
    fn senior_fraction_undefined_for_empty_population() {
        let mut record = maricopa();
        record.population = 0;
        assert_eq!(record.overlay_value(Overlay::Age), None);
    }
}
