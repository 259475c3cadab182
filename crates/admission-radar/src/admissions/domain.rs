use std::collections::BTreeSet;
use std::fmt;
use std::ops::Add;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::wire;

/// Slack for binary representation error when scaling decimal input, e.g.
/// `4.49 * 100.0 == 448.99999999999994`.
const HUNDREDTHS_TOLERANCE: f64 = 1e-6;

/// Grade point average held in hundredths so threshold comparisons are exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Gpa(u16);

impl Gpa {
    pub const ZERO: Gpa = Gpa(0);
    /// Ceiling of a single SSC or HSC result.
    pub const MAX_PER_EXAM: Gpa = Gpa(500);
    /// Ceiling of a combined SSC + HSC total.
    pub const MAX_TOTAL: Gpa = Gpa(1000);

    pub const fn from_hundredths(hundredths: u16) -> Self {
        Self(hundredths)
    }

    /// Convert a decimal grade that is an exact multiple of 0.01. Negative,
    /// non-finite and finer-grained input is rejected rather than rounded.
    pub fn from_points(points: f64) -> Option<Self> {
        if !points.is_finite() || points < 0.0 {
            return None;
        }

        let scaled = points * 100.0;
        let hundredths = scaled.round();
        if (scaled - hundredths).abs() > HUNDREDTHS_TOLERANCE || hundredths > f64::from(u16::MAX) {
            return None;
        }

        Some(Self(hundredths as u16))
    }

    pub fn points(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl Add for Gpa {
    type Output = Gpa;

    fn add(self, rhs: Gpa) -> Gpa {
        Gpa(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Gpa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Gpa {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.points())
    }
}

impl<'de> Deserialize<'de> for Gpa {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let points = f64::deserialize(deserializer)?;
        Gpa::from_points(points).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "GPA must be non-negative with at most two decimal places (found {points})"
            ))
        })
    }
}

/// Public examination a cohort year or GPA refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exam {
    Ssc,
    Hsc,
}

impl Exam {
    pub const fn label(self) -> &'static str {
        match self {
            Exam::Ssc => "SSC",
            Exam::Hsc => "HSC",
        }
    }
}

/// Academic stream a student sat their exams in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Track {
    Science,
    #[serde(rename = "Business Studies", alias = "Business")]
    BusinessStudies,
    Humanities,
}

/// Unit-side track entry that admits every student.
pub const ALL_TRACKS: &str = "All";

impl Track {
    pub const fn label(self) -> &'static str {
        match self {
            Track::Science => "Science",
            Track::BusinessStudies => "Business Studies",
            Track::Humanities => "Humanities",
        }
    }

    pub fn ordered() -> [Track; 3] {
        [Track::Science, Track::BusinessStudies, Track::Humanities]
    }

    pub fn parse(raw: &str) -> Option<Track> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "science" => Some(Track::Science),
            "business studies" | "business" => Some(Track::BusinessStudies),
            "humanities" => Some(Track::Humanities),
            _ => None,
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Validated student scores. Only produced by the intake guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub ssc_year: u16,
    pub hsc_year: u16,
    #[serde(rename = "sscGPA")]
    pub ssc_gpa: Gpa,
    #[serde(rename = "hscGPA")]
    pub hsc_gpa: Gpa,
    pub track: Track,
}

impl StudentProfile {
    pub fn total_gpa(&self) -> Gpa {
        self.ssc_gpa + self.hsc_gpa
    }

    pub fn year_for(&self, exam: Exam) -> u16 {
        match exam {
            Exam::Ssc => self.ssc_year,
            Exam::Hsc => self.hsc_year,
        }
    }
}

/// Cohort-year restriction. An absent side defers to the enclosing level; an
/// empty set admits every year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortYears {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssc: Option<BTreeSet<u16>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hsc: Option<BTreeSet<u16>>,
}

impl CohortYears {
    pub fn for_exam(&self, exam: Exam) -> Option<&BTreeSet<u16>> {
        match exam {
            Exam::Ssc => self.ssc.as_ref(),
            Exam::Hsc => self.hsc.as_ref(),
        }
    }
}

/// Catalog key for an institution.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstitutionId(pub String);

impl fmt::Display for InstitutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstitutionKind {
    Public,
    Private,
}

impl InstitutionKind {
    pub const fn label(self) -> &'static str {
        match self {
            InstitutionKind::Public => "Public",
            InstitutionKind::Private => "Private",
        }
    }
}

fn default_true() -> bool {
    true
}

/// University or college record as held by the catalog store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Institution {
    pub id: InstitutionId,
    pub name: String,
    #[serde(alias = "type")]
    pub kind: InstitutionKind,
    #[serde(default, alias = "website")]
    pub homepage_url: String,
    #[serde(default, alias = "admission_page")]
    pub admission_portal_url: String,
    #[serde(with = "wire::flexible_date")]
    pub last_updated: NaiveDate,
    #[serde(default = "default_true", alias = "editable")]
    pub is_editable: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(with = "wire::flexible_instant")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        alias = "allowedYears",
        skip_serializing_if = "Option::is_none"
    )]
    pub allowed_cohort_years: Option<CohortYears>,
    #[serde(default)]
    pub units: Vec<ProgramUnit>,
}

impl Institution {
    pub fn unit(&self, unit_id: &str) -> Option<&ProgramUnit> {
        self.units.iter().find(|unit| unit.unit_id == unit_id)
    }

    /// Years admitted by the institution for `exam`; empty means unrestricted.
    pub fn allowed_years(&self, exam: Exam) -> Option<&BTreeSet<u16>> {
        self.allowed_cohort_years
            .as_ref()
            .and_then(|years| years.for_exam(exam))
    }

    /// Soonest apply deadline across every unit, eligible or not.
    pub fn earliest_apply_deadline(&self) -> Option<DateTime<Utc>> {
        self.units.iter().map(|unit| unit.apply_deadline).min()
    }

    /// Non-fatal data-quality findings for this record.
    pub fn quality_warnings(&self) -> Vec<DataDefect> {
        let mut warnings = Vec::new();

        if self.units.is_empty() {
            warnings.push(DataDefect {
                institution_id: Some(self.id.0.clone()),
                unit_id: None,
                kind: DefectKind::NoUnits,
                detail: format!("{} lists no program units", self.name),
            });
        }

        for unit in &self.units {
            if unit.apply_deadline >= unit.exam_date {
                warnings.push(DataDefect {
                    institution_id: Some(self.id.0.clone()),
                    unit_id: Some(unit.unit_id.clone()),
                    kind: DefectKind::DeadlineAfterExam,
                    detail: format!(
                        "apply deadline {} does not precede exam date {}",
                        unit.apply_deadline, unit.exam_date
                    ),
                });
            }
        }

        warnings
    }
}

/// Admissible program inside an institution with its own thresholds and dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramUnit {
    pub unit_id: String,
    pub unit_name: String,
    #[serde(rename = "minTotalGPA")]
    pub min_total_gpa: Gpa,
    #[serde(
        rename = "minSscGPA",
        alias = "minSSC_GPA",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub min_ssc_gpa: Option<Gpa>,
    #[serde(
        rename = "minHscGPA",
        alias = "minHSC_GPA",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub min_hsc_gpa: Option<Gpa>,
    #[serde(alias = "groupAllowed")]
    pub allowed_tracks: BTreeSet<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(with = "wire::flexible_date")]
    pub last_verified: NaiveDate,
    #[serde(with = "wire::flexible_instant")]
    pub exam_date: DateTime<Utc>,
    #[serde(alias = "lastApplyDate", with = "wire::flexible_instant")]
    pub apply_deadline: DateTime<Utc>,
    #[serde(
        default,
        alias = "allowedYears",
        skip_serializing_if = "Option::is_none"
    )]
    pub allowed_cohort_years: Option<CohortYears>,
}

impl ProgramUnit {
    pub fn min_gpa_for(&self, exam: Exam) -> Option<Gpa> {
        match exam {
            Exam::Ssc => self.min_ssc_gpa,
            Exam::Hsc => self.min_hsc_gpa,
        }
    }

    pub fn admits_every_track(&self) -> bool {
        self.allowed_tracks.contains(ALL_TRACKS)
    }
}

/// Category of a data-quality finding in catalog records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectKind {
    MalformedInstitution,
    MalformedUnit,
    NoUnits,
    DeadlineAfterExam,
}

impl DefectKind {
    /// Skipped records are dropped from the snapshot; the rest are warnings.
    pub const fn skips_record(self) -> bool {
        matches!(
            self,
            DefectKind::MalformedInstitution | DefectKind::MalformedUnit
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDefect {
    pub institution_id: Option<String>,
    pub unit_id: Option<String>,
    pub kind: DefectKind,
    pub detail: String,
}
