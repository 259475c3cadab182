use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::domain::{Exam, Gpa, Institution, ProgramUnit, StudentProfile};
use super::super::timing;
use super::UnitMatch;

/// First gate a unit failed, kept so rejections can be explained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ineligibility {
    InstitutionCohort { exam: Exam, year: u16 },
    UnitCohort { exam: Exam, year: u16 },
    Track { track: String },
    TotalGpa { required: Gpa, actual: Gpa },
    ExamGpa { exam: Exam, required: Gpa, actual: Gpa },
}

impl Ineligibility {
    pub fn summary(&self) -> String {
        match self {
            Ineligibility::InstitutionCohort { exam, year } => format!(
                "institution does not admit the {} {} cohort",
                exam.label(),
                year
            ),
            Ineligibility::UnitCohort { exam, year } => {
                format!("unit does not admit the {} {} cohort", exam.label(), year)
            }
            Ineligibility::Track { track } => format!("unit is closed to the {track} track"),
            Ineligibility::TotalGpa { required, actual } => {
                format!("total GPA {actual} below required {required}")
            }
            Ineligibility::ExamGpa {
                exam,
                required,
                actual,
            } => format!(
                "{} GPA {} below required {}",
                exam.label(),
                actual,
                required
            ),
        }
    }
}

fn admits_year(allowed: Option<&BTreeSet<u16>>, year: u16) -> bool {
    allowed
        .map(|years| years.is_empty() || years.contains(&year))
        .unwrap_or(true)
}

/// Institution-level cohort gate. Failing it rules out every unit.
pub(crate) fn screen_institution(
    institution: &Institution,
    student: &StudentProfile,
) -> Result<(), Ineligibility> {
    for exam in [Exam::Ssc, Exam::Hsc] {
        let year = student.year_for(exam);
        if !admits_year(institution.allowed_years(exam), year) {
            return Err(Ineligibility::InstitutionCohort { exam, year });
        }
    }

    Ok(())
}

/// Unit-level gates: cohort years (unit override, else institution), track,
/// then GPA thresholds.
pub(crate) fn screen_unit(
    unit: &ProgramUnit,
    institution: &Institution,
    student: &StudentProfile,
) -> Result<(), Ineligibility> {
    for exam in [Exam::Ssc, Exam::Hsc] {
        let year = student.year_for(exam);
        let allowed = unit
            .allowed_cohort_years
            .as_ref()
            .and_then(|years| years.for_exam(exam))
            .or_else(|| institution.allowed_years(exam));
        if !admits_year(allowed, year) {
            return Err(Ineligibility::UnitCohort { exam, year });
        }
    }

    if !unit.allowed_tracks.contains(student.track.label()) && !unit.admits_every_track() {
        return Err(Ineligibility::Track {
            track: student.track.label().to_string(),
        });
    }

    let total = student.total_gpa();
    if total < unit.min_total_gpa {
        return Err(Ineligibility::TotalGpa {
            required: unit.min_total_gpa,
            actual: total,
        });
    }

    for (exam, actual) in [(Exam::Ssc, student.ssc_gpa), (Exam::Hsc, student.hsc_gpa)] {
        if let Some(required) = unit.min_gpa_for(exam) {
            if actual < required {
                return Err(Ineligibility::ExamGpa {
                    exam,
                    required,
                    actual,
                });
            }
        }
    }

    Ok(())
}

/// Explain why `unit` rejects `student`, or `Ok(())` when every gate passes.
pub fn screen(
    unit: &ProgramUnit,
    institution: &Institution,
    student: &StudentProfile,
) -> Result<(), Ineligibility> {
    screen_institution(institution, student)?;
    screen_unit(unit, institution, student)
}

/// Decide whether `unit` admits `student`, attaching deadline facts for `now`.
pub fn evaluate(
    unit: &ProgramUnit,
    institution: &Institution,
    student: &StudentProfile,
    now: DateTime<Utc>,
) -> Option<UnitMatch> {
    screen(unit, institution, student).ok()?;
    Some(unit_match(unit, now))
}

pub(crate) fn unit_match(unit: &ProgramUnit, now: DateTime<Utc>) -> UnitMatch {
    UnitMatch {
        unit: unit.clone(),
        status: timing::status(now, unit.apply_deadline),
        days_until_deadline: timing::days_until(now, unit.apply_deadline),
    }
}
