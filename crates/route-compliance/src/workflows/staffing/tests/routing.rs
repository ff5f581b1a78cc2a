use super::common::*;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::workflows::staffing::router::{
    approve_route_handler, compliance_router, AsOfQuery, PRINCIPAL_EMAIL_HEADER,
    PRINCIPAL_ID_HEADER, PRINCIPAL_ROLE_HEADER,
};
use crate::workflows::staffing::session::Principal;

fn headers_for(principal: &Principal) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        PRINCIPAL_ID_HEADER,
        HeaderValue::from_str(&principal.uid).expect("header value"),
    );
    if let Some(email) = &principal.email {
        headers.insert(
            PRINCIPAL_EMAIL_HEADER,
            HeaderValue::from_str(email).expect("header value"),
        );
    }
    if let Some(role) = principal.role {
        headers.insert(PRINCIPAL_ROLE_HEADER, HeaderValue::from_static(role.as_str()));
    }
    headers
}

fn request(method: &str, uri: &str, principal: Option<&Principal>, body: Body) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(principal) = principal {
        for (name, value) in headers_for(principal).iter() {
            builder = builder.header(name, value);
        }
    }
    builder.body(body).expect("request builds")
}

#[tokio::test]
async fn listing_staff_requires_sign_in() {
    let (service, _, _) = build_service();
    let response = compliance_router(service)
        .oneshot(request("GET", "/api/v1/staff", None, Body::empty()))
        .await
        .expect("router responds");
    assert_status(&response, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn principal_without_claim_cannot_view_dashboards() {
    let (service, _, _) = build_service();
    let principal = Principal {
        uid: "uid-pending".to_string(),
        email: None,
        role: None,
    };
    let response = compliance_router(service)
        .oneshot(request(
            "GET",
            "/api/v1/routes",
            Some(&principal),
            Body::empty(),
        ))
        .await
        .expect("router responds");
    assert_status(&response, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn ops_sees_read_only_staff_board() {
    let (service, _, _) = build_service();
    seed(&service);
    let response = compliance_router(service)
        .oneshot(request(
            "GET",
            "/api/v1/staff?as_of=2024-06-01",
            Some(&ops()),
            Body::empty(),
        ))
        .await
        .expect("router responds");
    assert_status(&response, StatusCode::OK);

    let body = json_body(response).await;
    let rows = body.as_array().expect("array body");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["status"], json!("Compliant"));
    assert_eq!(rows[1]["status_label"], json!("Expiring Soon"));
    assert_eq!(rows[2]["status"], json!("Non-Compliant"));
}

#[tokio::test]
async fn admin_creates_staff_over_http() {
    let (service, _, _) = build_service();
    let payload = json!({
        "staff_name": "Frankie Vale",
        "role": "Operations",
        "dbs_expiry_date": "2025-02-01",
        "license_expiry_date": "2025-08-01",
    });
    let response = compliance_router(service.clone())
        .oneshot(request(
            "POST",
            "/api/v1/staff",
            Some(&admin()),
            Body::from(serde_json::to_vec(&payload).expect("payload")),
        ))
        .await
        .expect("router responds");
    assert_status(&response, StatusCode::CREATED);

    let body = json_body(response).await;
    assert!(body["id"].as_str().expect("id string").starts_with("staff_compliance-"));
    assert_eq!(service.list_staff(as_of()).expect("listed").len(), 1);
}

#[tokio::test]
async fn malformed_staff_body_gets_json_error() {
    let (service, _, _) = build_service();
    let payload = json!({
        "staff_name": "Frankie Vale",
        "role": "Operations",
        "dbs_expiry_date": "2025-02-01",
        "license_expiry_date": "01/08/2025",
    });
    let body = serde_json::to_vec(&payload).expect("payload");

    let response = compliance_router(service.clone())
        .oneshot(request("POST", "/api/v1/staff", None, Body::from(body.clone())))
        .await
        .expect("router responds");
    assert_status(&response, StatusCode::UNAUTHORIZED);

    let response = compliance_router(service.clone())
        .oneshot(request("POST", "/api/v1/staff", Some(&admin()), Body::from(body)))
        .await
        .expect("router responds");
    assert_status(&response, StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert!(body["error"].is_string());
    assert!(service.list_staff(as_of()).expect("listed").is_empty());
}

#[tokio::test]
async fn route_with_unknown_staff_is_unprocessable() {
    let (service, _, _) = build_service();
    let payload = json!({
        "route_name": "Harbour Shuttle",
        "planned_journey_minutes": 30,
        "staff_id": "staff_compliance-000042",
    });
    let response = compliance_router(service)
        .oneshot(request(
            "POST",
            "/api/v1/routes",
            Some(&admin()),
            Body::from(serde_json::to_vec(&payload).expect("payload")),
        ))
        .await
        .expect("router responds");
    assert_status(&response, StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("staff_compliance-000042"));
}

#[tokio::test]
async fn ops_cannot_create_routes() {
    let (service, _, _) = build_service();
    let payload = json!({
        "route_name": "Harbour Shuttle",
        "planned_journey_minutes": 30,
        "staff_id": "staff_compliance-000001",
    });
    let response = compliance_router(service)
        .oneshot(request(
            "POST",
            "/api/v1/routes",
            Some(&ops()),
            Body::from(serde_json::to_vec(&payload).expect("payload")),
        ))
        .await
        .expect("router responds");
    assert_status(&response, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn approve_route_over_http_then_conflicts() {
    let (service, _, _) = build_service();
    let seeded = seed(&service);
    let uri = format!(
        "/api/v1/routes/{}/approve?as_of=2024-06-01",
        seeded.long_compliant_route
    );

    let response = compliance_router(service.clone())
        .oneshot(request("POST", &uri, Some(&admin()), Body::empty()))
        .await
        .expect("router responds");
    assert_status(&response, StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["approved"], json!(true));
    assert!(body["approved_at"].is_string());

    let response = compliance_router(service)
        .oneshot(request("POST", &uri, Some(&admin()), Body::empty()))
        .await
        .expect("router responds");
    assert_status(&response, StatusCode::CONFLICT);
}

#[tokio::test]
async fn approve_handler_refuses_ineligible_route() {
    let (service, _, _) = build_service();
    let seeded = seed(&service);

    let response = approve_route_handler(
        State(service),
        headers_for(&admin()),
        Path(seeded.long_expiring_route.0.clone()),
        Query(AsOfQuery {
            as_of: Some(as_of()),
        }),
    )
    .await;

    assert_status(&response, StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("not eligible"));
}

#[tokio::test]
async fn deleting_unknown_staff_is_not_found() {
    let (service, _, _) = build_service();
    let response = compliance_router(service)
        .oneshot(request(
            "DELETE",
            "/api/v1/staff/staff_compliance-999999",
            Some(&admin()),
            Body::empty(),
        ))
        .await
        .expect("router responds");
    assert_status(&response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn summary_endpoint_reports_counts() {
    let (service, _, _) = build_service();
    seed(&service);
    let response = compliance_router(service)
        .oneshot(request(
            "GET",
            "/api/v1/compliance/summary?as_of=2024-06-01",
            Some(&ops()),
            Body::empty(),
        ))
        .await
        .expect("router responds");
    assert_status(&response, StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["total_staff"], json!(3));
    assert_eq!(body["pending_routes"], json!(3));
}
