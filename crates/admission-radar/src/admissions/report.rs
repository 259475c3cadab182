use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Institution, InstitutionId, StudentProfile};
use super::evaluation::{match_catalog, rank, InstitutionMatch};
use super::filter::{filter, ResultQuery};
use super::timing::{self, Countdown};

/// Headline counts for a match run. `total_institutions == 0` means the
/// catalog itself was empty, as opposed to no unit admitting the student.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub total_institutions: usize,
    pub matched_institutions: usize,
    pub total_eligible_units: usize,
    pub open_units: usize,
    pub closed_units: usize,
}

/// Ranked matches for one student against one catalog snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    pub evaluated_at: DateTime<Utc>,
    pub ranked: Vec<InstitutionMatch>,
    pub summary: MatchSummary,
}

/// Live countdown for a ranked institution. `deadline` is the soonest apply
/// deadline across all of its units; `units` ticks each eligible unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionCountdown {
    pub institution_id: InstitutionId,
    pub institution_name: String,
    pub deadline: DateTime<Utc>,
    pub countdown: Countdown,
    pub units: Vec<UnitCountdown>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitCountdown {
    pub unit_id: String,
    pub unit_name: String,
    pub deadline: DateTime<Utc>,
    pub countdown: Countdown,
}

impl MatchReport {
    /// Match then rank from scratch.
    pub fn build(catalog: &[Institution], student: &StudentProfile, now: DateTime<Utc>) -> Self {
        let ranked = rank(match_catalog(catalog, student, now));
        let total_eligible_units = ranked.iter().map(|entry| entry.total_eligible_units).sum();
        let open_units = ranked.iter().map(InstitutionMatch::open_units).sum();

        Self {
            evaluated_at: now,
            summary: MatchSummary {
                total_institutions: catalog.len(),
                matched_institutions: ranked.len(),
                total_eligible_units,
                open_units,
                closed_units: total_eligible_units - open_units,
            },
            ranked,
        }
    }

    pub fn is_catalog_empty(&self) -> bool {
        self.summary.total_institutions == 0
    }

    pub fn filtered(&self, query: &ResultQuery) -> Vec<InstitutionMatch> {
        filter(&self.ranked, query)
    }

    /// Recompute countdowns for a display tick. Gates and ranking are not re-run.
    pub fn countdowns(&self, now: DateTime<Utc>) -> Vec<InstitutionCountdown> {
        self.ranked
            .iter()
            .filter_map(|entry| {
                let institution = &entry.institution;
                let deadline = institution.earliest_apply_deadline()?;
                let units = entry
                    .eligible_units
                    .iter()
                    .map(|unit_match| UnitCountdown {
                        unit_id: unit_match.unit.unit_id.clone(),
                        unit_name: unit_match.unit.unit_name.clone(),
                        deadline: unit_match.unit.apply_deadline,
                        countdown: timing::remaining(now, unit_match.unit.apply_deadline),
                    })
                    .collect();

                Some(InstitutionCountdown {
                    institution_id: institution.id.clone(),
                    institution_name: institution.name.clone(),
                    deadline,
                    countdown: timing::remaining(now, deadline),
                    units,
                })
            })
            .collect()
    }
}
