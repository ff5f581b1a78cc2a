use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    RouteDraft, RouteId, RouteRecord, StaffDraft, StaffId, StaffPatch, StaffRecord,
};
use super::repository::{RecordRepository, RepositoryError};
use super::service::{ComplianceService, ServiceError};
use super::session::{Principal, RoleClaim};

pub const PRINCIPAL_ID_HEADER: &str = "x-principal-id";
pub const PRINCIPAL_EMAIL_HEADER: &str = "x-principal-email";
pub const PRINCIPAL_ROLE_HEADER: &str = "x-principal-role";

/// Router builder exposing the staff, route, and summary endpoints.
pub fn compliance_router<S, R>(service: Arc<ComplianceService<S, R>>) -> Router
where
    S: RecordRepository<StaffRecord> + 'static,
    R: RecordRepository<RouteRecord> + 'static,
{
    Router::new()
        .route(
            "/api/v1/staff",
            get(list_staff_handler::<S, R>).post(add_staff_handler::<S, R>),
        )
        .route(
            "/api/v1/staff/:staff_id",
            get(get_staff_handler::<S, R>)
                .patch(update_staff_handler::<S, R>)
                .delete(delete_staff_handler::<S, R>),
        )
        .route(
            "/api/v1/routes",
            get(list_routes_handler::<S, R>).post(add_route_handler::<S, R>),
        )
        .route(
            "/api/v1/routes/:route_id",
            axum::routing::delete(delete_route_handler::<S, R>),
        )
        .route(
            "/api/v1/routes/:route_id/approve",
            post(approve_route_handler::<S, R>),
        )
        .route("/api/v1/compliance/summary", get(summary_handler::<S, R>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AsOfQuery {
    #[serde(default)]
    pub(crate) as_of: Option<NaiveDate>,
}

impl AsOfQuery {
    fn resolve(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }
}

/// Principal forwarded by the upstream identity proxy.
pub(crate) fn principal_from_headers(headers: &HeaderMap) -> Result<Principal, Response> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let uid = header(PRINCIPAL_ID_HEADER).ok_or_else(|| {
        let payload = json!({ "error": "sign in required" });
        (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
    })?;

    Ok(Principal {
        uid,
        email: header(PRINCIPAL_EMAIL_HEADER),
        role: header(PRINCIPAL_ROLE_HEADER).and_then(|raw| RoleClaim::parse(&raw)),
    })
}

/// Dashboards are only served to principals holding a recognised claim.
fn viewer_from_headers(headers: &HeaderMap) -> Result<Principal, Response> {
    let principal = principal_from_headers(headers)?;
    if principal.role.is_none() {
        let payload = json!({ "error": "no role assigned to this account" });
        return Err((StatusCode::FORBIDDEN, Json(payload)).into_response());
    }
    Ok(principal)
}

/// Body rejections use the same `{"error": ...}` shape as service errors.
fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    body.map(|Json(value)| value).map_err(|rejection| {
        let payload = json!({ "error": rejection.body_text() });
        (rejection.status(), Json(payload)).into_response()
    })
}

pub(crate) fn error_response(error: ServiceError) -> Response {
    let status = match &error {
        ServiceError::Forbidden => StatusCode::FORBIDDEN,
        ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::AlreadyApproved | ServiceError::NotEligible => StatusCode::CONFLICT,
        ServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}

pub(crate) async fn list_staff_handler<S, R>(
    State(service): State<Arc<ComplianceService<S, R>>>,
    headers: HeaderMap,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    S: RecordRepository<StaffRecord> + 'static,
    R: RecordRepository<RouteRecord> + 'static,
{
    if let Err(response) = viewer_from_headers(&headers) {
        return response;
    }
    match service.list_staff(query.resolve()) {
        Ok(staff) => (StatusCode::OK, Json(staff)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_staff_handler<S, R>(
    State(service): State<Arc<ComplianceService<S, R>>>,
    headers: HeaderMap,
    Path(staff_id): Path<String>,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    S: RecordRepository<StaffRecord> + 'static,
    R: RecordRepository<RouteRecord> + 'static,
{
    if let Err(response) = viewer_from_headers(&headers) {
        return response;
    }
    match service.get_staff(&StaffId(staff_id), query.resolve()) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn add_staff_handler<S, R>(
    State(service): State<Arc<ComplianceService<S, R>>>,
    headers: HeaderMap,
    body: Result<Json<StaffDraft>, JsonRejection>,
) -> Response
where
    S: RecordRepository<StaffRecord> + 'static,
    R: RecordRepository<RouteRecord> + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };
    let draft = match parse_body(body) {
        Ok(draft) => draft,
        Err(response) => return response,
    };
    match service.add_staff(&principal, draft, Utc::now()) {
        Ok(id) => (StatusCode::CREATED, Json(json!({ "id": id }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_staff_handler<S, R>(
    State(service): State<Arc<ComplianceService<S, R>>>,
    headers: HeaderMap,
    Path(staff_id): Path<String>,
    body: Result<Json<StaffPatch>, JsonRejection>,
) -> Response
where
    S: RecordRepository<StaffRecord> + 'static,
    R: RecordRepository<RouteRecord> + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };
    let patch = match parse_body(body) {
        Ok(patch) => patch,
        Err(response) => return response,
    };
    match service.update_staff(&principal, &StaffId(staff_id), patch, Utc::now()) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_staff_handler<S, R>(
    State(service): State<Arc<ComplianceService<S, R>>>,
    headers: HeaderMap,
    Path(staff_id): Path<String>,
) -> Response
where
    S: RecordRepository<StaffRecord> + 'static,
    R: RecordRepository<RouteRecord> + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };
    match service.delete_staff(&principal, &StaffId(staff_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_routes_handler<S, R>(
    State(service): State<Arc<ComplianceService<S, R>>>,
    headers: HeaderMap,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    S: RecordRepository<StaffRecord> + 'static,
    R: RecordRepository<RouteRecord> + 'static,
{
    let principal = match viewer_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };
    match service.list_routes(&principal, query.resolve()) {
        Ok(routes) => (StatusCode::OK, Json(routes)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn add_route_handler<S, R>(
    State(service): State<Arc<ComplianceService<S, R>>>,
    headers: HeaderMap,
    body: Result<Json<RouteDraft>, JsonRejection>,
) -> Response
where
    S: RecordRepository<StaffRecord> + 'static,
    R: RecordRepository<RouteRecord> + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };
    let draft = match parse_body(body) {
        Ok(draft) => draft,
        Err(response) => return response,
    };
    match service.add_route(&principal, draft, Utc::now()) {
        Ok(id) => (StatusCode::CREATED, Json(json!({ "id": id }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_route_handler<S, R>(
    State(service): State<Arc<ComplianceService<S, R>>>,
    headers: HeaderMap,
    Path(route_id): Path<String>,
) -> Response
where
    S: RecordRepository<StaffRecord> + 'static,
    R: RecordRepository<RouteRecord> + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };
    match service.delete_route(&principal, &RouteId(route_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn approve_route_handler<S, R>(
    State(service): State<Arc<ComplianceService<S, R>>>,
    headers: HeaderMap,
    Path(route_id): Path<String>,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    S: RecordRepository<StaffRecord> + 'static,
    R: RecordRepository<RouteRecord> + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };
    match service.approve_route(&principal, &RouteId(route_id), query.resolve(), Utc::now()) {
        Ok(route) => (StatusCode::OK, Json(route)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn summary_handler<S, R>(
    State(service): State<Arc<ComplianceService<S, R>>>,
    headers: HeaderMap,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    S: RecordRepository<StaffRecord> + 'static,
    R: RecordRepository<RouteRecord> + 'static,
{
    if let Err(response) = viewer_from_headers(&headers) {
        return response;
    }
    match service.summary(query.resolve()) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}
