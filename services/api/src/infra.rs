use chrono::{DateTime, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use route_compliance::workflows::staffing::{
    ComplianceService, InMemoryRecordRepository, PolicyThresholds, Principal, RoleClaim,
    RouteDraft, RouteRecord, ServiceError, StaffDraft, StaffRecord, StaffRole,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type StaffStore = InMemoryRecordRepository<StaffRecord>;
pub(crate) type RouteStore = InMemoryRecordRepository<RouteRecord>;
pub(crate) type MemoryComplianceService = ComplianceService<StaffStore, RouteStore>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn build_service(thresholds: PolicyThresholds) -> MemoryComplianceService {
    ComplianceService::new(
        Arc::new(StaffStore::default()),
        Arc::new(RouteStore::default()),
        thresholds,
    )
}

/// Principal the demo acts as when seeding records.
pub(crate) fn demo_admin() -> Principal {
    Principal {
        uid: "demo-admin".to_string(),
        email: Some("admin@depot.example".to_string()),
        role: Some(RoleClaim::Admin),
    }
}

/// Populate a depot with drivers spread across all three licence states.
pub(crate) fn seed_demo_depot(
    service: &MemoryComplianceService,
    as_of: NaiveDate,
    now: DateTime<Utc>,
) -> Result<(), ServiceError> {
    let admin = demo_admin();
    let staff = [
        ("Avery Stone", StaffRole::Operations, 180),
        ("Blake Rivers", StaffRole::Operations, 21),
        ("Casey Moor", StaffRole::Admin, -3),
    ];

    let mut ids = Vec::with_capacity(staff.len());
    for (name, role, licence_days) in staff {
        let id = service.add_staff(
            &admin,
            StaffDraft {
                staff_name: name.to_string(),
                role,
                dbs_expiry_date: as_of + chrono::Duration::days(365),
                license_expiry_date: as_of + chrono::Duration::days(licence_days),
            },
            now,
        )?;
        ids.push(id);
    }

    let routes = [
        ("Coastal Run", 70, 0),
        ("Moorland Link", 90, 1),
        ("Town Loop", 35, 2),
    ];
    for (name, minutes, staff_index) in routes {
        service.add_route(
            &admin,
            RouteDraft {
                route_name: name.to_string(),
                planned_journey_minutes: minutes,
                staff_id: ids[staff_index].clone(),
            },
            now,
        )?;
    }

    Ok(())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
