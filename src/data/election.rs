use serde::{Deserialize, Serialize};

use crate::types::Fips;

use super::{
    dataset::Keyed,
    error::{DataKind, LoadError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Party {
    Republican,
    Democratic,
    Libertarian,
    Green,
    Other,
}

impl Party {
    pub fn to_str(&self) -> &'static str {
        match self {
            Party::Republican => "Republican",
            Party::Democratic => "Democratic",
            Party::Libertarian => "Libertarian",
            Party::Green => "Green",
            Party::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub name: String,
    pub party: Party,
    pub votes: u64,
    pub percentage: f64,
}

/// Winner and runner-up positions within a candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub winner: usize,
    pub runner_up: Option<usize>,
}

impl Tally {
    /// Pick the candidate with strictly maximal votes; on equal votes the one
    /// encountered first keeps the lead. The runner-up is chosen the same way
    /// among the remaining candidates. Returns `None` for an empty list.
    pub fn of(candidates: &[CandidateResult]) -> Option<Self> {
        let leader = |skip: Option<usize>| {
            candidates.iter().enumerate()
                .filter(|&(i, _)| Some(i) != skip)
                .fold(None, |best: Option<(usize, u64)>, (i, c)| match best {
                    Some((_, votes)) if c.votes <= votes => best,
                    _ => Some((i, c.votes)),
                })
                .map(|(i, _)| i)
        };

        let winner = leader(None)?;
        Some(Self { winner, runner_up: leader(Some(winner)) })
    }

    /// Winner percentage minus runner-up percentage, in percentage points.
    /// An uncontested race has the winner's full share as its margin.
    pub fn margin(&self, candidates: &[CandidateResult]) -> f64 {
        let winner = candidates[self.winner].percentage;
        let runner_up = self.runner_up.map(|i| candidates[i].percentage).unwrap_or(0.0);
        (winner - runner_up).max(0.0)
    }
}

/// County election result. `winner`, `winner_party` and `margin` are always
/// populated: taken from the file when present, otherwise derived from the candidates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionRecord {
    pub fips: Fips,
    pub name: String,
    pub total_votes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registered_voters: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turnout_percentage: Option<f64>,
    pub candidates: Vec<CandidateResult>,
    pub winner: String,
    pub winner_party: Party,
    pub margin: f64,
}

/// Wire form of an election record; derived fields are optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawElectionRecord {
    pub fips: Fips,
    #[serde(default)]
    pub name: String,
    pub total_votes: u64,
    #[serde(default)]
    pub registered_voters: Option<u64>,
    #[serde(default)]
    pub turnout_percentage: Option<f64>,
    #[serde(default)]
    pub candidates: Vec<CandidateResult>,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub winner_party: Option<Party>,
    #[serde(default)]
    pub margin: Option<f64>,
}

/// Round to one decimal place, as the generator script stores percentages.
fn round1(x: f64) -> f64 { (x * 10.0).round() / 10.0 }

impl ElectionRecord {
    /// Build a record from raw candidate results, deriving winner, party, margin and turnout.
    pub fn from_candidates(
        fips: Fips,
        name: impl Into<String>,
        total_votes: u64,
        registered_voters: Option<u64>,
        candidates: Vec<CandidateResult>,
    ) -> Result<Self, LoadError> {
        let raw = RawElectionRecord {
            fips,
            name: name.into(),
            total_votes,
            registered_voters,
            turnout_percentage: None,
            candidates,
            winner: None,
            winner_party: None,
            margin: None,
        };
        raw.try_into()
    }

    /// Margin signed by direction: negative for a Democratic win, positive otherwise.
    pub fn signed_margin(&self) -> f64 {
        match self.winner_party {
            Party::Democratic => -self.margin,
            _ => self.margin,
        }
    }

    /// Candidates ordered by votes, highest first. Equal counts keep file order.
    pub fn ranked_candidates(&self) -> Vec<&CandidateResult> {
        let mut ranked: Vec<_> = self.candidates.iter().collect();
        ranked.sort_by(|a, b| b.votes.cmp(&a.votes));
        ranked
    }
}

impl TryFrom<RawElectionRecord> for ElectionRecord {
    type Error = LoadError;

    fn try_from(raw: RawElectionRecord) -> Result<Self, Self::Error> {
        let tally = Tally::of(&raw.candidates);

        let (winner, winner_party) = match (raw.winner, raw.winner_party, tally) {
            (Some(name), Some(party), _) => (name, party),
            (name, party, Some(tally)) => {
                let leader = &raw.candidates[tally.winner];
                (name.unwrap_or_else(|| leader.name.clone()), party.unwrap_or(leader.party))
            }
            (_, _, None) => {
                return Err(LoadError::Format {
                    kind: DataKind::Elections,
                    message: format!("county {} has no candidates and no recorded winner", raw.fips),
                });
            }
        };

        let margin = match (raw.margin, tally) {
            (Some(margin), _) => margin,
            (None, Some(tally)) => round1(tally.margin(&raw.candidates)),
            (None, None) => 0.0,
        };

        let turnout_percentage = raw.turnout_percentage.or_else(|| {
            raw.registered_voters
                .filter(|&registered| registered > 0)
                .map(|registered| round1(raw.total_votes as f64 / registered as f64 * 100.0))
        });

        Ok(Self {
            fips: raw.fips,
            name: raw.name,
            total_votes: raw.total_votes,
            registered_voters: raw.registered_voters,
            turnout_percentage,
            candidates: raw.candidates,
            winner,
            winner_party,
            margin,
        })
    }
}

impl Keyed for ElectionRecord {
    fn fips(&self) -> &Fips { &self.fips }
    fn name(&self) -> &str { &self.name }
}
