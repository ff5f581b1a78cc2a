use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::staffing::domain::{
    Record, RouteDraft, RouteId, RouteRecord, StaffDraft, StaffId, StaffRecord, StaffRole,
};
use crate::workflows::staffing::repository::{
    InMemoryRecordRepository, RecordRepository, RepositoryError,
};
use crate::workflows::staffing::session::{Principal, RoleClaim};
use crate::workflows::staffing::{ComplianceService, PolicyThresholds};

pub(super) type StaffStore = InMemoryRecordRepository<StaffRecord>;
pub(super) type RouteStore = InMemoryRecordRepository<RouteRecord>;
pub(super) type MemoryService = ComplianceService<StaffStore, RouteStore>;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn as_of() -> NaiveDate {
    date(2024, 6, 1)
}

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn thresholds() -> PolicyThresholds {
    PolicyThresholds::default()
}

pub(super) fn admin() -> Principal {
    Principal {
        uid: "uid-admin".to_string(),
        email: Some("admin@depot.example".to_string()),
        role: Some(RoleClaim::Admin),
    }
}

pub(super) fn ops() -> Principal {
    Principal {
        uid: "uid-ops".to_string(),
        email: Some("ops@depot.example".to_string()),
        role: Some(RoleClaim::Ops),
    }
}

pub(super) fn staff_draft(name: &str, license_expiry: NaiveDate) -> StaffDraft {
    StaffDraft {
        staff_name: name.to_string(),
        role: StaffRole::Operations,
        dbs_expiry_date: date(2025, 1, 15),
        license_expiry_date: license_expiry,
    }
}

pub(super) fn route_draft(name: &str, minutes: u32, staff_id: &StaffId) -> RouteDraft {
    RouteDraft {
        route_name: name.to_string(),
        planned_journey_minutes: minutes,
        staff_id: staff_id.clone(),
    }
}

pub(super) fn build_service() -> (Arc<MemoryService>, Arc<StaffStore>, Arc<RouteStore>) {
    let staff = Arc::new(StaffStore::default());
    let routes = Arc::new(RouteStore::default());
    let service = Arc::new(ComplianceService::new(
        staff.clone(),
        routes.clone(),
        thresholds(),
    ));
    (service, staff, routes)
}

/// Seeds one compliant, one expiring, and one lapsed driver plus three routes.
pub(super) struct SeededBoard {
    pub(super) compliant: StaffId,
    pub(super) expiring: StaffId,
    pub(super) lapsed: StaffId,
    pub(super) short_route: RouteId,
    pub(super) long_compliant_route: RouteId,
    pub(super) long_expiring_route: RouteId,
}

pub(super) fn seed(service: &MemoryService) -> SeededBoard {
    let admin = admin();
    let compliant = service
        .add_staff(&admin, staff_draft("Avery Stone", date(2024, 12, 1)), now())
        .expect("staff added");
    let expiring = service
        .add_staff(&admin, staff_draft("Blake Rivers", date(2024, 6, 25)), now())
        .expect("staff added");
    let lapsed = service
        .add_staff(&admin, staff_draft("Casey Moor", date(2024, 5, 31)), now())
        .expect("staff added");

    let short_route = service
        .add_route(&admin, route_draft("Town Loop", 45, &lapsed), now())
        .expect("route added");
    let long_compliant_route = service
        .add_route(&admin, route_draft("Coastal Run", 46, &compliant), now())
        .expect("route added");
    let long_expiring_route = service
        .add_route(&admin, route_draft("Moorland Link", 90, &expiring), now())
        .expect("route added");

    SeededBoard {
        compliant,
        expiring,
        lapsed,
        short_route,
        long_compliant_route,
        long_expiring_route,
    }
}

pub(super) struct UnavailableRepository;

impl<T: Record> RecordRepository<T> for UnavailableRepository {
    fn list(&self) -> Result<Vec<T>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn get(&self, _id: &T::Id) -> Result<Option<T>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn add(&self, _record: T) -> Result<T::Id, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn update(&self, _record: T) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn update_if(
        &self,
        _record: T,
        _expected: &dyn Fn(&T) -> bool,
    ) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn delete(&self, _id: &T::Id) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json body")
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}
