use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::evaluation::InstitutionMatch;

/// Deadline-status narrowing applied on top of ranked results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    /// Institutions with at least one open unit.
    #[serde(alias = "open")]
    OpenOnly,
    /// Institutions whose eligible units are all closed.
    #[serde(alias = "closed")]
    ClosedOnly,
}

impl StatusFilter {
    pub fn admits(self, entry: &InstitutionMatch) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::OpenOnly => entry.has_open_unit(),
            StatusFilter::ClosedOnly => entry.all_closed(),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "open" | "open_only" => Ok(StatusFilter::OpenOnly),
            "closed" | "closed_only" => Ok(StatusFilter::ClosedOnly),
            other => Err(format!(
                "unknown status filter '{other}' (expected all, open, or closed)"
            )),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatusFilter::All => "all",
            StatusFilter::OpenOnly => "open",
            StatusFilter::ClosedOnly => "closed",
        };
        f.write_str(label)
    }
}

/// Free-text and status query over ranked matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultQuery {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub status: StatusFilter,
}

impl ResultQuery {
    pub fn admits(&self, entry: &InstitutionMatch) -> bool {
        let text_matches = match self.text.as_deref() {
            None | Some("") => true,
            Some(needle) => entry
                .institution
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
        };

        text_matches && self.status.admits(entry)
    }
}

/// Narrow ranked results without reordering them.
pub fn filter(ranked: &[InstitutionMatch], query: &ResultQuery) -> Vec<InstitutionMatch> {
    ranked
        .iter()
        .filter(|entry| query.admits(entry))
        .cloned()
        .collect()
}
