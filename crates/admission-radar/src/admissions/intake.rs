use serde::{Deserialize, Serialize};

use super::domain::{Exam, Gpa, StudentProfile, Track};

/// Exam year as entered: the intake form posts years as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YearInput {
    Number(i64),
    Text(String),
}

impl YearInput {
    fn raw(&self) -> String {
        match self {
            YearInput::Number(value) => value.to_string(),
            YearInput::Text(value) => value.clone(),
        }
    }
}

impl From<u16> for YearInput {
    fn from(value: u16) -> Self {
        YearInput::Number(i64::from(value))
    }
}

/// Unvalidated scores posted by a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSubmission {
    pub ssc_year: YearInput,
    pub hsc_year: YearInput,
    #[serde(rename = "sscGPA")]
    pub ssc_gpa: f64,
    #[serde(rename = "hscGPA")]
    pub hsc_gpa: f64,
    #[serde(alias = "group")]
    pub track: String,
}

/// Validation errors raised by the intake guard.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("{} year '{value}' is not a four-digit year", .exam.label())]
    InvalidYear { exam: Exam, value: String },
    #[error("{} GPA {value} must be between 0.00 and 5.00", .exam.label())]
    GpaOutOfRange { exam: Exam, value: f64 },
    #[error("{} GPA {value} has more than two decimal places", .exam.label())]
    GpaPrecision { exam: Exam, value: f64 },
    #[error("unknown track '{0}' (expected Science, Business Studies, or Humanities)")]
    UnknownTrack(String),
    #[error("HSC year {hsc} precedes SSC year {ssc}")]
    CohortOrder { ssc: u16, hsc: u16 },
}

const EARLIEST_YEAR: i64 = 1000;
const LATEST_YEAR: i64 = 9999;

/// Guard responsible for producing `StudentProfile` instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    /// Convert an inbound submission into an immutable profile.
    pub fn profile_from_submission(
        &self,
        submission: StudentSubmission,
    ) -> Result<StudentProfile, IntakeViolation> {
        let ssc_year = parse_year(Exam::Ssc, &submission.ssc_year)?;
        let hsc_year = parse_year(Exam::Hsc, &submission.hsc_year)?;
        if hsc_year < ssc_year {
            return Err(IntakeViolation::CohortOrder {
                ssc: ssc_year,
                hsc: hsc_year,
            });
        }

        let ssc_gpa = parse_gpa(Exam::Ssc, submission.ssc_gpa)?;
        let hsc_gpa = parse_gpa(Exam::Hsc, submission.hsc_gpa)?;

        let track = Track::parse(&submission.track)
            .ok_or_else(|| IntakeViolation::UnknownTrack(submission.track.clone()))?;

        Ok(StudentProfile {
            ssc_year,
            hsc_year,
            ssc_gpa,
            hsc_gpa,
            track,
        })
    }
}

fn parse_year(exam: Exam, input: &YearInput) -> Result<u16, IntakeViolation> {
    let invalid = || IntakeViolation::InvalidYear {
        exam,
        value: input.raw(),
    };

    let year = match input {
        YearInput::Number(value) => *value,
        YearInput::Text(value) => value.trim().parse::<i64>().map_err(|_| invalid())?,
    };

    if !(EARLIEST_YEAR..=LATEST_YEAR).contains(&year) {
        return Err(invalid());
    }

    u16::try_from(year).map_err(|_| invalid())
}

fn parse_gpa(exam: Exam, value: f64) -> Result<Gpa, IntakeViolation> {
    if !(0.0..=Gpa::MAX_PER_EXAM.points()).contains(&value) {
        return Err(IntakeViolation::GpaOutOfRange { exam, value });
    }

    Gpa::from_points(value).ok_or(IntakeViolation::GpaPrecision { exam, value })
}
