use std::collections::BTreeSet;
use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::admissions::access::{AdminAllowList, Principal};
use crate::admissions::admin::CatalogAdminService;
use crate::admissions::catalog::{
    CatalogError, CatalogStore, CatalogSubscription, InMemoryCatalogStore, SnapshotPublisher,
};
use crate::admissions::domain::{
    CohortYears, Gpa, Institution, InstitutionId, InstitutionKind, ProgramUnit, StudentProfile,
    Track,
};
use crate::admissions::intake::{StudentSubmission, YearInput};
use crate::admissions::service::EligibilityService;

pub(super) const ADMIN_EMAIL: &str = "registrar@example.edu";

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn gpa(points: f64) -> Gpa {
    Gpa::from_points(points).expect("valid gpa")
}

pub(super) fn years(values: &[u16]) -> BTreeSet<u16> {
    values.iter().copied().collect()
}

pub(super) fn tracks(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|track| track.to_string()).collect()
}

pub(super) fn student() -> StudentProfile {
    StudentProfile {
        ssc_year: 2023,
        hsc_year: 2025,
        ssc_gpa: gpa(4.0),
        hsc_gpa: gpa(4.5),
        track: Track::Science,
    }
}

pub(super) fn submission() -> StudentSubmission {
    StudentSubmission {
        ssc_year: YearInput::Text("2023".to_string()),
        hsc_year: YearInput::Text("2025".to_string()),
        ssc_gpa: 4.0,
        hsc_gpa: 4.5,
        track: "Science".to_string(),
    }
}

/// Science unit with the thresholds of the basic eligible scenario, closing
/// `deadline_in` after [`now`].
pub(super) fn unit(unit_id: &str, deadline_in: Duration) -> ProgramUnit {
    let apply_deadline = now() + deadline_in;
    ProgramUnit {
        unit_id: unit_id.to_string(),
        unit_name: format!("Unit {unit_id}"),
        min_total_gpa: gpa(8.0),
        min_ssc_gpa: Some(gpa(3.5)),
        min_hsc_gpa: Some(gpa(3.5)),
        allowed_tracks: tracks(&["Science"]),
        notes: String::new(),
        last_verified: NaiveDate::from_ymd_opt(2025, 8, 1).expect("valid date"),
        exam_date: apply_deadline + Duration::days(14),
        apply_deadline,
        allowed_cohort_years: None,
    }
}

pub(super) fn institution(id: &str, name: &str, units: Vec<ProgramUnit>) -> Institution {
    Institution {
        id: InstitutionId(id.to_string()),
        name: name.to_string(),
        kind: InstitutionKind::Public,
        homepage_url: format!("https://{id}.example.edu"),
        admission_portal_url: format!("https://{id}.example.edu/admission"),
        last_updated: NaiveDate::from_ymd_opt(2025, 8, 1).expect("valid date"),
        is_editable: true,
        is_active: true,
        created_at: now() - Duration::days(30),
        allowed_cohort_years: None,
        units,
    }
}

pub(super) fn restricted(mut institution: Institution, ssc: &[u16], hsc: &[u16]) -> Institution {
    institution.allowed_cohort_years = Some(CohortYears {
        ssc: Some(years(ssc)),
        hsc: Some(years(hsc)),
    });
    institution
}

/// Three institutions: one open, one closed, one with a mix of both.
pub(super) fn mixed_catalog() -> Vec<Institution> {
    vec![
        institution(
            "closed-u",
            "Closed Valley University",
            vec![unit("A", -Duration::days(2))],
        ),
        institution(
            "open-u",
            "Open Hills University",
            vec![unit("A", Duration::days(10))],
        ),
        institution(
            "mixed-u",
            "Mixed Plains College",
            vec![unit("A", -Duration::days(1)), unit("B", Duration::days(20))],
        ),
    ]
}

pub(super) fn store_with(catalog: Vec<Institution>) -> Arc<InMemoryCatalogStore> {
    Arc::new(InMemoryCatalogStore::from_institutions(catalog))
}

pub(super) fn eligibility_service(
    catalog: Vec<Institution>,
) -> (EligibilityService<InMemoryCatalogStore>, Arc<InMemoryCatalogStore>) {
    let store = store_with(catalog);
    (EligibilityService::new(store.clone()), store)
}

pub(super) fn admin_service(
    catalog: Vec<Institution>,
) -> (CatalogAdminService<InMemoryCatalogStore>, Arc<InMemoryCatalogStore>) {
    let store = store_with(catalog);
    let service = CatalogAdminService::new(store.clone(), AdminAllowList::new([ADMIN_EMAIL]));
    (service, store)
}

pub(super) fn admin() -> Principal {
    Principal::with_email(ADMIN_EMAIL)
}

pub(super) fn outsider() -> Principal {
    Principal::with_email("student@example.edu")
}

pub(super) struct UnavailableCatalogStore {
    publisher: SnapshotPublisher,
}

impl Default for UnavailableCatalogStore {
    fn default() -> Self {
        Self {
            publisher: SnapshotPublisher::new(Vec::new()),
        }
    }
}

fn offline() -> CatalogError {
    CatalogError::Unavailable("record store offline".to_string())
}

impl CatalogStore for UnavailableCatalogStore {
    fn list(&self) -> Result<Vec<Institution>, CatalogError> {
        Err(offline())
    }

    fn put(&self, _institution: Institution) -> Result<(), CatalogError> {
        Err(offline())
    }

    fn update(&self, _institution: Institution) -> Result<(), CatalogError> {
        Err(offline())
    }

    fn remove(&self, _id: &InstitutionId) -> Result<(), CatalogError> {
        Err(offline())
    }

    fn subscribe(&self) -> CatalogSubscription {
        self.publisher.subscribe()
    }

    fn initialize_if_empty(&self, _defaults: Vec<Institution>) -> Result<bool, CatalogError> {
        Err(offline())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
