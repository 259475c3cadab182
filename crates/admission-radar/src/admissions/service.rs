use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::catalog::{CatalogError, CatalogStore, CatalogSubscription};
use super::domain::{Institution, StudentProfile};
use super::intake::{IntakeGuard, IntakeViolation, StudentSubmission};
use super::report::MatchReport;

/// Service composing the intake guard, the catalog store, and the matcher.
pub struct EligibilityService<S> {
    guard: IntakeGuard,
    store: Arc<S>,
}

impl<S> EligibilityService<S>
where
    S: CatalogStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            guard: IntakeGuard,
            store,
        }
    }

    /// Validate a submission and match it against the store's current catalog.
    pub fn check(
        &self,
        submission: StudentSubmission,
        now: DateTime<Utc>,
    ) -> Result<MatchReport, ServiceError> {
        let student = self.guard.profile_from_submission(submission)?;
        self.check_profile(&student, now)
    }

    pub fn check_profile(
        &self,
        student: &StudentProfile,
        now: DateTime<Utc>,
    ) -> Result<MatchReport, ServiceError> {
        let catalog = self.store.list()?;
        Ok(run(&catalog, student, now))
    }

    /// Match against a caller-supplied catalog instead of the store.
    pub fn check_against(
        &self,
        catalog: &[Institution],
        submission: StudentSubmission,
        now: DateTime<Utc>,
    ) -> Result<MatchReport, ServiceError> {
        let student = self.guard.profile_from_submission(submission)?;
        Ok(run(catalog, &student, now))
    }

    /// Subscribe `student` to catalog changes, starting from the current snapshot.
    pub fn feed(&self, student: StudentProfile, now: DateTime<Utc>) -> EligibilityFeed {
        EligibilityFeed::new(self.store.subscribe(), student, now)
    }
}

fn run(catalog: &[Institution], student: &StudentProfile, now: DateTime<Utc>) -> MatchReport {
    let report = MatchReport::build(catalog, student, now);
    info!(
        institutions = report.summary.total_institutions,
        matched = report.summary.matched_institutions,
        open_units = report.summary.open_units,
        "eligibility check completed"
    );
    report
}

/// Live report for one student, rebuilt from scratch on every catalog snapshot.
#[derive(Debug)]
pub struct EligibilityFeed {
    subscription: CatalogSubscription,
    student: StudentProfile,
    revision: u64,
    report: MatchReport,
}

impl EligibilityFeed {
    fn new(
        mut subscription: CatalogSubscription,
        student: StudentProfile,
        now: DateTime<Utc>,
    ) -> Self {
        let snapshot = subscription.current();
        let report = MatchReport::build(snapshot.institutions(), &student, now);
        Self {
            subscription,
            student,
            revision: snapshot.revision(),
            report,
        }
    }

    pub fn report(&self) -> &MatchReport {
        &self.report
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn student(&self) -> &StudentProfile {
        &self.student
    }

    /// Wait for the next snapshot and replace the report. `None` once the
    /// store has gone away.
    pub async fn next_report(&mut self, now: DateTime<Utc>) -> Option<&MatchReport> {
        let snapshot = self.subscription.changed().await?;
        self.revision = snapshot.revision();
        self.report = MatchReport::build(snapshot.institutions(), &self.student, now);
        debug!(
            revision = self.revision,
            matched = self.report.summary.matched_institutions,
            "eligibility feed refreshed"
        );
        Some(&self.report)
    }
}

/// Error raised by the eligibility service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
