//! Admission eligibility matching: intake, catalog store, gates, ranking,
//! filtering, and the HTTP surface over them.

pub mod access;
pub mod admin;
pub mod catalog;
pub mod domain;
pub(crate) mod evaluation;
pub mod filter;
pub mod intake;
pub mod report;
pub mod router;
pub mod service;
pub mod timing;
pub mod wire;

#[cfg(test)]
mod tests;

pub use access::{AccessDenied, AdminAllowList, Principal};
pub use admin::{AdminError, CatalogAdminService, CatalogViolation, InstitutionDraft};
pub use catalog::{
    default_institutions, CatalogDecodeError, CatalogError, CatalogSnapshot, CatalogStore,
    CatalogSubscription, DecodedCatalog, InMemoryCatalogStore, SnapshotPublisher,
};
pub use domain::{
    CohortYears, DataDefect, DefectKind, Exam, Gpa, Institution, InstitutionId, InstitutionKind,
    ProgramUnit, StudentProfile, Track, ALL_TRACKS,
};
pub use evaluation::{
    evaluate, match_catalog, rank, screen, Ineligibility, InstitutionMatch, UnitMatch,
};
pub use filter::{filter, ResultQuery, StatusFilter};
pub use intake::{IntakeGuard, IntakeViolation, StudentSubmission, YearInput};
pub use report::{InstitutionCountdown, MatchReport, MatchSummary, UnitCountdown};
pub use router::{catalog_router, eligibility_router, MatchRequest, MatchResponse};
pub use service::{EligibilityFeed, EligibilityService, ServiceError};
pub use timing::{Countdown, DeadlineStatus};
