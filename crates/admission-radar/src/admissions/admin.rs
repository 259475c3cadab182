use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::access::{AccessDenied, AdminAllowList, Principal};
use super::catalog::{default_institutions, CatalogError, CatalogStore};
use super::domain::{
    CohortYears, DataDefect, Gpa, Institution, InstitutionId, InstitutionKind, ProgramUnit,
};

/// Institution fields supplied by an administrator before an id is assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionDraft {
    pub name: String,
    #[serde(alias = "type")]
    pub kind: InstitutionKind,
    #[serde(default, alias = "website")]
    pub homepage_url: String,
    #[serde(default, alias = "admission_page")]
    pub admission_portal_url: String,
    #[serde(default, alias = "allowedYears")]
    pub allowed_cohort_years: Option<CohortYears>,
    #[serde(default)]
    pub units: Vec<ProgramUnit>,
}

/// Reasons a catalog record is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogViolation {
    #[error("institution name must not be empty")]
    EmptyName,
    #[error("unit id must not be empty")]
    EmptyUnitId,
    #[error("unit id '{0}' appears more than once")]
    DuplicateUnit(String),
    #[error("unit '{unit_id}' {field} threshold {value} exceeds {limit}")]
    ThresholdOutOfRange {
        unit_id: String,
        field: &'static str,
        value: Gpa,
        limit: Gpa,
    },
    #[error("institution '{0}' is read-only")]
    ReadOnly(InstitutionId),
}

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error(transparent)]
    Access(#[from] AccessDenied),
    #[error(transparent)]
    Invalid(#[from] CatalogViolation),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

static INSTITUTION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_institution_id(now: DateTime<Utc>) -> InstitutionId {
    let sequence = INSTITUTION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    InstitutionId(format!("inst-{}-{sequence:04}", now.timestamp_millis()))
}

/// Check a record before it is written. Returns non-fatal warnings on success.
pub fn validate(institution: &Institution) -> Result<Vec<DataDefect>, CatalogViolation> {
    if institution.name.trim().is_empty() {
        return Err(CatalogViolation::EmptyName);
    }

    let mut seen = BTreeSet::new();
    for unit in &institution.units {
        if unit.unit_id.trim().is_empty() {
            return Err(CatalogViolation::EmptyUnitId);
        }
        if !seen.insert(unit.unit_id.as_str()) {
            return Err(CatalogViolation::DuplicateUnit(unit.unit_id.clone()));
        }

        let thresholds = [
            ("total GPA", Some(unit.min_total_gpa), Gpa::MAX_TOTAL),
            ("SSC GPA", unit.min_ssc_gpa, Gpa::MAX_PER_EXAM),
            ("HSC GPA", unit.min_hsc_gpa, Gpa::MAX_PER_EXAM),
        ];
        for (field, value, limit) in thresholds {
            if let Some(value) = value.filter(|value| *value > limit) {
                return Err(CatalogViolation::ThresholdOutOfRange {
                    unit_id: unit.unit_id.clone(),
                    field,
                    value,
                    limit,
                });
            }
        }
    }

    Ok(institution.quality_warnings())
}

/// Allow-list gated write access to the catalog store.
pub struct CatalogAdminService<S> {
    store: Arc<S>,
    admins: AdminAllowList,
}

impl<S> CatalogAdminService<S>
where
    S: CatalogStore + 'static,
{
    pub fn new(store: Arc<S>, admins: AdminAllowList) -> Self {
        Self { store, admins }
    }

    pub fn is_admin(&self, principal: &Principal) -> bool {
        self.admins.permits(principal)
    }

    pub fn list(&self, principal: &Principal) -> Result<Vec<Institution>, AdminError> {
        self.admins.authorize(principal)?;
        let mut institutions = self.store.list()?;
        institutions.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(institutions)
    }

    /// Create a record from a draft, assigning its id and creation time.
    pub fn add(
        &self,
        principal: &Principal,
        draft: InstitutionDraft,
        now: DateTime<Utc>,
    ) -> Result<Institution, AdminError> {
        self.admins.authorize(principal)?;

        let institution = Institution {
            id: next_institution_id(now),
            name: draft.name.trim().to_string(),
            kind: draft.kind,
            homepage_url: draft.homepage_url,
            admission_portal_url: draft.admission_portal_url,
            last_updated: now.date_naive(),
            is_editable: true,
            is_active: true,
            created_at: now,
            allowed_cohort_years: draft.allowed_cohort_years,
            units: draft.units,
        };

        log_warnings(&validate(&institution)?);
        self.store.put(institution.clone())?;
        info!(institution = %institution.id, units = institution.units.len(), "institution added");
        Ok(institution)
    }

    /// Replace an existing record. `created_at` is kept from the stored record.
    pub fn edit(
        &self,
        principal: &Principal,
        mut institution: Institution,
        now: DateTime<Utc>,
    ) -> Result<Institution, AdminError> {
        self.admins.authorize(principal)?;

        let existing = self
            .store
            .list()?
            .into_iter()
            .find(|candidate| candidate.id == institution.id)
            .ok_or_else(|| CatalogError::NotFound(institution.id.clone()))?;
        if !existing.is_editable {
            return Err(CatalogViolation::ReadOnly(existing.id).into());
        }

        institution.created_at = existing.created_at;
        institution.last_updated = now.date_naive();

        log_warnings(&validate(&institution)?);
        self.store.update(institution.clone())?;
        info!(institution = %institution.id, units = institution.units.len(), "institution updated");
        Ok(institution)
    }

    pub fn remove(&self, principal: &Principal, id: &InstitutionId) -> Result<(), AdminError> {
        self.admins.authorize(principal)?;
        self.store.remove(id)?;
        info!(institution = %id, "institution removed");
        Ok(())
    }

    /// Load the built-in catalog into an empty store. Returns whether anything
    /// was written.
    pub fn seed_defaults(&self, principal: &Principal) -> Result<bool, AdminError> {
        self.admins.authorize(principal)?;
        let seeded = self.store.initialize_if_empty(default_institutions())?;
        info!(seeded, "default catalog seed requested");
        Ok(seeded)
    }
}

fn log_warnings(warnings: &[DataDefect]) {
    for warning in warnings {
        warn!(
            institution = warning.institution_id.as_deref().unwrap_or("-"),
            unit = warning.unit_id.as_deref().unwrap_or("-"),
            kind = ?warning.kind,
            detail = %warning.detail,
            "catalog record saved with warning"
        );
    }
}
