use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::access::Principal;
use super::admin::{AdminError, CatalogAdminService, CatalogViolation, InstitutionDraft};
use super::catalog::{CatalogError, CatalogStore, DecodedCatalog};
use super::domain::{Institution, InstitutionId};
use super::evaluation::InstitutionMatch;
use super::filter::ResultQuery;
use super::intake::StudentSubmission;
use super::report::MatchSummary;
use super::service::{EligibilityService, ServiceError};
use super::wire;

/// Header carrying the caller's email as asserted by the identity proxy.
pub const PRINCIPAL_HEADER: &str = "x-principal-email";

/// Body of a match request. Without `catalog` the store snapshot is used.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub student: StudentSubmission,
    #[serde(default)]
    pub catalog: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "wire::optional_instant::deserialize")]
    pub now: Option<DateTime<Utc>>,
    #[serde(default)]
    pub query: ResultQuery,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub evaluated_at: DateTime<Utc>,
    pub ranked: Vec<InstitutionMatch>,
    pub summary: MatchSummary,
    pub skipped_records: usize,
}

/// Router builder exposing the student-facing match endpoint.
pub fn eligibility_router<S>(service: Arc<EligibilityService<S>>) -> Router
where
    S: CatalogStore + 'static,
{
    Router::new()
        .route("/api/v1/eligibility/match", post(match_handler::<S>))
        .with_state(service)
}

/// Router builder exposing the allow-listed catalog administration endpoints.
pub fn catalog_router<S>(service: Arc<CatalogAdminService<S>>) -> Router
where
    S: CatalogStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/catalog",
            get(list_handler::<S>).post(create_handler::<S>),
        )
        .route("/api/v1/catalog/seed", post(seed_handler::<S>))
        .route(
            "/api/v1/catalog/:institution_id",
            put(update_handler::<S>).delete(delete_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn match_handler<S>(
    State(service): State<Arc<EligibilityService<S>>>,
    axum::Json(request): axum::Json<MatchRequest>,
) -> Response
where
    S: CatalogStore + 'static,
{
    let now = request.now.unwrap_or_else(Utc::now);

    let (result, skipped_records) = match request.catalog {
        Some(raw) => match DecodedCatalog::from_value(raw) {
            Ok(decoded) => (
                service.check_against(&decoded.institutions, request.student, now),
                decoded.skipped(),
            ),
            Err(error) => {
                let payload = json!({
                    "error": error.to_string(),
                });
                return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
            }
        },
        None => (service.check(request.student, now), 0),
    };

    match result {
        Ok(report) => {
            let view = MatchResponse {
                evaluated_at: report.evaluated_at,
                ranked: report.filtered(&request.query),
                summary: report.summary,
                skipped_records,
            };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(ServiceError::Intake(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(ServiceError::Catalog(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn list_handler<S>(
    State(service): State<Arc<CatalogAdminService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: CatalogStore + 'static,
{
    match service.list(&principal_from(&headers)) {
        Ok(institutions) => (StatusCode::OK, axum::Json(institutions)).into_response(),
        Err(error) => admin_error_response(error),
    }
}

pub(crate) async fn create_handler<S>(
    State(service): State<Arc<CatalogAdminService<S>>>,
    headers: HeaderMap,
    axum::Json(draft): axum::Json<InstitutionDraft>,
) -> Response
where
    S: CatalogStore + 'static,
{
    match service.add(&principal_from(&headers), draft, Utc::now()) {
        Ok(institution) => (StatusCode::CREATED, axum::Json(institution)).into_response(),
        Err(error) => admin_error_response(error),
    }
}

pub(crate) async fn update_handler<S>(
    State(service): State<Arc<CatalogAdminService<S>>>,
    headers: HeaderMap,
    Path(institution_id): Path<String>,
    axum::Json(mut institution): axum::Json<Institution>,
) -> Response
where
    S: CatalogStore + 'static,
{
    institution.id = InstitutionId(institution_id);
    match service.edit(&principal_from(&headers), institution, Utc::now()) {
        Ok(institution) => (StatusCode::OK, axum::Json(institution)).into_response(),
        Err(error) => admin_error_response(error),
    }
}

pub(crate) async fn delete_handler<S>(
    State(service): State<Arc<CatalogAdminService<S>>>,
    headers: HeaderMap,
    Path(institution_id): Path<String>,
) -> Response
where
    S: CatalogStore + 'static,
{
    let id = InstitutionId(institution_id);
    match service.remove(&principal_from(&headers), &id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => admin_error_response(error),
    }
}

pub(crate) async fn seed_handler<S>(
    State(service): State<Arc<CatalogAdminService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: CatalogStore + 'static,
{
    match service.seed_defaults(&principal_from(&headers)) {
        Ok(seeded) => (StatusCode::OK, axum::Json(json!({ "seeded": seeded }))).into_response(),
        Err(error) => admin_error_response(error),
    }
}

fn principal_from(headers: &HeaderMap) -> Principal {
    Principal {
        email: headers
            .get(PRINCIPAL_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    }
}

fn admin_error_response(error: AdminError) -> Response {
    let status = match &error {
        AdminError::Access(_) => StatusCode::FORBIDDEN,
        AdminError::Invalid(CatalogViolation::ReadOnly(_)) => StatusCode::CONFLICT,
        AdminError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AdminError::Catalog(CatalogError::NotFound(_)) => StatusCode::NOT_FOUND,
        AdminError::Catalog(CatalogError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
