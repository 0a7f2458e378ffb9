use std::fmt::Write;

use serde::Serialize;

use crate::{
    config::PartyColors,
    data::{DemographicRecord, ElectionRecord, Party},
    scale::Rgb,
    types::Fips,
};

use super::format::{format_currency, format_density, format_number, format_percent};

/// Sidebar contents for the displayed county, with every value already formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountyDetail {
    pub fips: Fips,
    pub name: String,
    pub selected: bool,
    /// `None` renders as "Data Unavailable".
    pub demographics: Option<DemographicSummary>,
    pub election: Option<ElectionSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicSummary {
    pub population: String,
    pub density: Option<String>,
    pub median_income: String,
    pub age_shares: Vec<AgeShare>,
    pub housing_units: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeShare {
    pub label: &'static str,
    pub share: String,
    /// Bar width in [0, 100].
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionSummary {
    pub winner: String,
    pub winner_party: Party,
    pub winner_color: Rgb,
    pub margin: String,
    /// Ordered by votes, highest first.
    pub candidates: Vec<CandidateLine>,
    pub turnout: Option<TurnoutLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateLine {
    pub name: String,
    pub party: Party,
    pub color: Rgb,
    pub percentage: String,
    pub votes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnoutLine {
    pub percentage: String,
    pub registered: String,
}

impl DemographicSummary {
    pub fn new(record: &DemographicRecord) -> Self {
        let population = record.population as f64;
        let ages = &record.age_distribution;
        let age_shares = [("Under 18", ages.under18), ("18 to 64", ages.age18to64), ("65 and Over", ages.age65_plus)]
            .into_iter()
            .map(|(label, count)| AgeShare {
                label,
                share: format_percent(count as f64, population),
                width: if population > 0.0 { (count as f64 / population * 100.0).clamp(0.0, 100.0) } else { 0.0 },
            })
            .collect();

        Self {
            population: format_number(population),
            density: record.population_density().map(|d| format_density(d)),
            median_income: format_currency(record.median_income as f64),
            age_shares,
            housing_units: record.housing_units.map(|n| format_number(n as f64)),
        }
    }
}

impl ElectionSummary {
    pub fn new(record: &ElectionRecord, colors: &PartyColors) -> Self {
        let candidates = record.ranked_candidates().into_iter()
            .map(|c| CandidateLine {
                name: c.name.clone(),
                party: c.party,
                color: colors.get(c.party),
                percentage: format!("{:.1}%", c.percentage),
                votes: format_number(c.votes as f64),
            })
            .collect();

        let turnout = record.turnout_percentage
            .filter(|&t| t != 0.0)
            .map(|t| TurnoutLine {
                percentage: format!("{t:.1}%"),
                registered: format!(
                    "{} of {} registered",
                    format_number(record.total_votes as f64),
                    format_number(record.registered_voters.unwrap_or(0) as f64),
                ),
            });

        Self {
            winner: record.winner.clone(),
            winner_party: record.winner_party,
            winner_color: colors.get(record.winner_party),
            margin: format!("{:.1}%", record.margin),
            candidates,
            turnout,
        }
    }
}

impl CountyDetail {
    pub fn new(
        fips: Fips,
        name: impl Into<String>,
        selected: bool,
        demographics: Option<&DemographicRecord>,
        election: Option<&ElectionRecord>,
        colors: &PartyColors,
    ) -> Self {
        Self {
            fips,
            name: name.into(),
            selected,
            demographics: demographics.map(DemographicSummary::new),
            election: election.map(|r| ElectionSummary::new(r, colors)),
        }
    }

    pub fn title(&self) -> String { format!("{} County", self.name) }

    /// Plain-text sidebar.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        write!(out, "{}", self.title())?;
        if self.selected { write!(out, " [Selected]")? }
        writeln!(out, " ({})", self.fips)?;
        writeln!(out)?;

        match &self.demographics {
            None => {
                writeln!(out, "Data Unavailable")?;
                writeln!(out, "  Demographic data for this county is not available.")?;
            }
            Some(demo) => {
                writeln!(out, "Population: {}", demo.population)?;
                if let Some(density) = &demo.density { writeln!(out, "  {density}")? }
                writeln!(out, "Median Household Income: {}", demo.median_income)?;
                writeln!(out, "Age Distribution")?;
                for age in &demo.age_shares {
                    writeln!(out, "  {:<12} {:>6}", age.label, age.share)?;
                }
                if let Some(units) = &demo.housing_units { writeln!(out, "Housing Units: {units}")? }
            }
        }

        if let Some(election) = &self.election {
            writeln!(out)?;
            writeln!(out, "2024 Presidential Election")?;
            writeln!(out, "Winner: {} ({})", election.winner, election.winner_party.to_str())?;
            writeln!(out, "Margin: {}", election.margin)?;
            writeln!(out, "Results")?;
            let width = election.candidates.iter().map(|c| c.name.len()).max().unwrap_or(0);
            for c in &election.candidates {
                writeln!(out, "  {:<width$}  {:>6}  {:>12}", c.name, c.percentage, c.votes)?;
            }
            if let Some(turnout) = &election.turnout {
                writeln!(out, "Voter Turnout: {}", turnout.percentage)?;
                writeln!(out, "  {}", turnout.registered)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AgeDistribution, CandidateResult};

    fn maricopa() -> DemographicRecord {
        DemographicRecord {
            fips: Fips::from("04013"),
            name: "Maricopa".into(),
            population: 4_485_414,
            median_income: 69_872,
            age_distribution: AgeDistribution { under18: 1_031_645, age18to64: 2_646_394, age65_plus: 807_375 },
            housing_units: Some(1_842_753),
            area_square_miles: Some(9224.0),
            population_density: None,
        }
    }

    fn apache_result() -> ElectionRecord {
        let candidates = vec![
            CandidateResult { name: "Donald Trump".into(), party: Party::Republican, votes: 11_200, percentage: 38.0 },
            CandidateResult { name: "Kamala Harris".into(), party: Party::Democratic, votes: 17_850, percentage: 60.6 },
            CandidateResult { name: "Other".into(), party: Party::Other, votes: 400, percentage: 1.4 },
        ];
        ElectionRecord::from_candidates(Fips::from("04001"), "Apache", 29_450, Some(45_000), candidates).unwrap()
    }

    #[test]
    fn demographics_are_formatted() {
        let detail = CountyDetail::new(Fips::from("04013"), "Maricopa", false, Some(&maricopa()), None, &PartyColors::default());
        let demo = detail.demographics.as_ref().unwrap();
        assert_eq!(demo.population, "4,485,414");
        assert_eq!(demo.median_income, "$69,872");
        assert_eq!(demo.density.as_deref(), Some("486.3 per sq mi"));
        assert_eq!(demo.housing_units.as_deref(), Some("1,842,753"));
        let shares: Vec<_> = demo.age_shares.iter().map(|a| a.share.as_str()).collect();
        assert_eq!(shares, ["23.0%", "59.0%", "18.0%"]);
        assert!(detail.election.is_none());
    }

    #[test]
    fn missing_demographics_render_unavailable() {
        let detail = CountyDetail::new(Fips::from("04099"), "Nowhere", true, None, None, &PartyColors::default());
        let text = detail.render_text();
        assert!(text.starts_with("Nowhere County [Selected] (04099)"));
        assert!(text.contains("Data Unavailable"));
    }

    #[test]
    fn election_block_ranks_candidates() {
        let colors = PartyColors::default();
        let detail = CountyDetail::new(Fips::from("04001"), "Apache", false, None, Some(&apache_result()), &colors);
        let election = detail.election.as_ref().unwrap();

        assert_eq!(election.winner, "Kamala Harris");
        assert_eq!(election.winner_party, Party::Democratic);
        assert_eq!(election.winner_color, colors.democratic);
        assert_eq!(election.margin, "22.6%");
        let names: Vec<_> = election.candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Kamala Harris", "Donald Trump", "Other"]);
        assert_eq!(election.candidates[0].votes, "17,850");

        let turnout = election.turnout.as_ref().unwrap();
        assert_eq!(turnout.percentage, "65.4%");
        assert_eq!(turnout.registered, "29,450 of 45,000 registered");

        let text = detail.render_text();
        assert!(text.contains("Winner: Kamala Harris (Democratic)"));
        assert!(text.contains("Voter Turnout: 65.4%"));
    }

    #[test]
    fn zero_population_shares_are_unavailable() {
        let mut record = maricopa();
        record.population = 0;
        let summary = DemographicSummary::new(&record);
        assert!(summary.age_shares.iter().all(|a| a.share == "N/A" && a.width == 0.0));
    }
}
