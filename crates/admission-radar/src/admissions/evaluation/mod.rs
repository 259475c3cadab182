mod policy;
mod rules;

pub use policy::rank;
pub use rules::{evaluate, screen, Ineligibility};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{Gpa, Institution, ProgramUnit, StudentProfile};
use super::timing::DeadlineStatus;

/// A unit that admits the student, with its deadline state at evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitMatch {
    pub unit: ProgramUnit,
    pub status: DeadlineStatus,
    pub days_until_deadline: i64,
}

/// An institution with at least one unit admitting the student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionMatch {
    pub institution: Institution,
    pub eligible_units: Vec<UnitMatch>,
    pub total_eligible_units: usize,
}

impl InstitutionMatch {
    pub fn has_open_unit(&self) -> bool {
        self.eligible_units
            .iter()
            .any(|entry| entry.status.is_open())
    }

    pub fn all_closed(&self) -> bool {
        self.eligible_units
            .iter()
            .all(|entry| entry.status == DeadlineStatus::Closed)
    }

    pub fn open_units(&self) -> usize {
        self.eligible_units
            .iter()
            .filter(|entry| entry.status.is_open())
            .count()
    }

    pub fn soonest_deadline_days(&self) -> Option<i64> {
        self.eligible_units
            .iter()
            .map(|entry| entry.days_until_deadline)
            .min()
    }

    pub fn highest_total_gpa_bar(&self) -> Option<Gpa> {
        self.eligible_units
            .iter()
            .map(|entry| entry.unit.min_total_gpa)
            .max()
    }
}

/// Apply the eligibility gates across a catalog snapshot. Institutions with no
/// admitting unit are left out; catalog order is preserved.
pub fn match_catalog(
    catalog: &[Institution],
    student: &StudentProfile,
    now: DateTime<Utc>,
) -> Vec<InstitutionMatch> {
    let mut cohort_rejections = 0usize;

    let matches: Vec<InstitutionMatch> = catalog
        .iter()
        .filter_map(|institution| {
            if rules::screen_institution(institution, student).is_err() {
                cohort_rejections += 1;
                return None;
            }

            let eligible_units: Vec<UnitMatch> = institution
                .units
                .iter()
                .filter(|unit| rules::screen_unit(unit, institution, student).is_ok())
                .map(|unit| rules::unit_match(unit, now))
                .collect();

            if eligible_units.is_empty() {
                return None;
            }

            Some(InstitutionMatch {
                institution: institution.clone(),
                total_eligible_units: eligible_units.len(),
                eligible_units,
            })
        })
        .collect();

    debug!(
        institutions = catalog.len(),
        matched = matches.len(),
        cohort_rejections,
        "catalog matched"
    );

    matches
}
