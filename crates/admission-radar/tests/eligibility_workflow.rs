//! End-to-end eligibility checks against the built-in catalog through the
//! public service facade and HTTP routers.

mod common {
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};

    use admission_radar::admissions::{
        default_institutions, AdminAllowList, CatalogAdminService, CatalogStore,
        EligibilityService, InMemoryCatalogStore, StudentSubmission, YearInput,
    };

    pub(super) const ADMIN_EMAIL: &str = "admissions-desk@example.edu";

    pub(super) fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 15, 0, 0, 0)
            .single()
            .expect("valid instant")
    }

    pub(super) fn science_submission() -> StudentSubmission {
        StudentSubmission {
            ssc_year: YearInput::Text("2023".to_string()),
            hsc_year: YearInput::Text("2025".to_string()),
            ssc_gpa: 4.0,
            hsc_gpa: 4.5,
            track: "Science".to_string(),
        }
    }

    pub(super) fn seeded_store() -> Arc<InMemoryCatalogStore> {
        let store = Arc::new(InMemoryCatalogStore::default());
        store
            .initialize_if_empty(default_institutions())
            .expect("seed succeeds");
        store
    }

    pub(super) fn services() -> (
        Arc<EligibilityService<InMemoryCatalogStore>>,
        Arc<CatalogAdminService<InMemoryCatalogStore>>,
    ) {
        let store = seeded_store();
        let eligibility = Arc::new(EligibilityService::new(store.clone()));
        let admin = Arc::new(CatalogAdminService::new(
            store,
            AdminAllowList::new([ADMIN_EMAIL]),
        ));
        (eligibility, admin)
    }
}

use admission_radar::admissions::{
    catalog_router, eligibility_router, DeadlineStatus, MatchSummary, ResultQuery, StatusFilter,
};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::*;
use serde_json::{json, Value};
use tower::ServiceExt;

fn ranked_ids(report: &admission_radar::admissions::MatchReport) -> Vec<&str> {
    report
        .ranked
        .iter()
        .map(|entry| entry.institution.id.0.as_str())
        .collect()
}

#[test]
fn science_student_matches_the_built_in_catalog() {
    let (service, _) = services();

    let report = service
        .check(science_submission(), now())
        .expect("report builds");

    assert_eq!(ranked_ids(&report), vec!["du", "ju", "nsu"]);
    assert_eq!(
        report.summary,
        MatchSummary {
            total_institutions: 5,
            matched_institutions: 3,
            total_eligible_units: 3,
            open_units: 2,
            closed_units: 1,
        }
    );

    let dhaka = &report.ranked[0].eligible_units[0];
    assert_eq!(dhaka.unit.unit_id, "A");
    assert_eq!(dhaka.status, DeadlineStatus::Open);
    assert_eq!(dhaka.days_until_deadline, 16);
    assert_eq!(
        report.ranked[2].eligible_units[0].status,
        DeadlineStatus::Closed
    );
}

#[test]
fn status_and_text_filters_narrow_without_reordering() {
    let (service, _) = services();
    let report = service
        .check(science_submission(), now())
        .expect("report builds");

    let open = report.filtered(&ResultQuery {
        text: None,
        status: StatusFilter::OpenOnly,
    });
    let closed = report.filtered(&ResultQuery {
        text: None,
        status: StatusFilter::ClosedOnly,
    });
    let north = report.filtered(&ResultQuery {
        text: Some("NORTH".to_string()),
        status: StatusFilter::All,
    });

    assert_eq!(open.len(), 2);
    assert_eq!(open[0].institution.id.0, "du");
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].institution.id.0, "nsu");
    assert_eq!(north.len(), 1);
}

#[tokio::test]
async fn admin_edits_flow_into_the_next_match() {
    let (eligibility, admin) = services();
    let catalog = catalog_router(admin);
    let matcher = eligibility_router(eligibility);

    let deleted = catalog
        .oneshot(
            Request::delete("/api/v1/catalog/du")
                .header("x-principal-email", ADMIN_EMAIL.to_uppercase())
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("route executes");
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let body = json!({
        "student": {
            "sscYear": 2023,
            "hscYear": 2025,
            "sscGPA": 4.0,
            "hscGPA": 4.5,
            "group": "Science"
        },
        "now": "2025-09-15T00:00:00Z"
    });
    let response = matcher
        .oneshot(
            Request::post("/api/v1/eligibility/match")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).expect("serialize")))
                .expect("request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    let payload: Value = serde_json::from_slice(&bytes).expect("json payload");
    let ids: Vec<&str> = payload["ranked"]
        .as_array()
        .expect("ranked list")
        .iter()
        .filter_map(|entry| entry["institution"]["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["ju", "nsu"]);
    assert_eq!(payload["summary"]["totalInstitutions"], 4);
}
