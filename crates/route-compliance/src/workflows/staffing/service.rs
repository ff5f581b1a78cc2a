use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{
    RouteDraft, RouteId, RouteRecord, StaffDraft, StaffId, StaffPatch, StaffRecord, StaffRole,
};
use super::evaluation::{
    ApprovalRequest, ComplianceEvaluator, ComplianceStatus, PolicyThresholds,
    RouteComplianceAlert,
};
use super::repository::{RecordRepository, RepositoryError};
use super::session::Principal;

const UNASSIGNED_LABEL: &str = "Unassigned";

/// Service composing the staff and route stores with the compliance rules.
pub struct ComplianceService<S, R> {
    staff: Arc<S>,
    routes: Arc<R>,
    evaluator: ComplianceEvaluator,
}

impl<S, R> ComplianceService<S, R>
where
    S: RecordRepository<StaffRecord> + 'static,
    R: RecordRepository<RouteRecord> + 'static,
{
    pub fn new(staff: Arc<S>, routes: Arc<R>, thresholds: PolicyThresholds) -> Self {
        Self {
            staff,
            routes,
            evaluator: ComplianceEvaluator::new(thresholds),
        }
    }

    pub fn thresholds(&self) -> &PolicyThresholds {
        self.evaluator.thresholds()
    }

    /// Staff board with statuses recomputed for `as_of`.
    pub fn list_staff(&self, as_of: NaiveDate) -> Result<Vec<StaffStatusView>, ServiceError> {
        let records = self.staff.list()?;
        Ok(records
            .iter()
            .map(|record| self.staff_view(record, as_of))
            .collect())
    }

    pub fn get_staff(
        &self,
        id: &StaffId,
        as_of: NaiveDate,
    ) -> Result<StaffStatusView, ServiceError> {
        let record = self.staff.get(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(self.staff_view(&record, as_of))
    }

    pub fn add_staff(
        &self,
        principal: &Principal,
        draft: StaffDraft,
        now: DateTime<Utc>,
    ) -> Result<StaffId, ServiceError> {
        ensure_admin(principal)?;
        let staff_name = required_text("staff_name", &draft.staff_name)?;

        let record = StaffRecord {
            id: StaffId(String::new()),
            staff_name,
            role: draft.role,
            dbs_expiry_date: draft.dbs_expiry_date,
            license_expiry_date: draft.license_expiry_date,
            compliance_status: Some(
                self.evaluator
                    .status(draft.license_expiry_date, now.date_naive()),
            ),
            created_at: now,
            updated_at: now,
            created_by: principal.email.clone().or_else(|| Some(principal.uid.clone())),
        };

        let id = self.staff.add(record)?;
        info!(staff_id = %id, by = %principal.uid, "staff record added");
        Ok(id)
    }

    pub fn update_staff(
        &self,
        principal: &Principal,
        id: &StaffId,
        patch: StaffPatch,
        now: DateTime<Utc>,
    ) -> Result<StaffRecord, ServiceError> {
        ensure_admin(principal)?;
        if patch.is_empty() {
            return Err(ServiceError::Validation(
                "update must change at least one field".to_string(),
            ));
        }
        if let Some(name) = &patch.staff_name {
            required_text("staff_name", name)?;
        }

        let mut record = self.staff.get(id)?.ok_or(RepositoryError::NotFound)?;
        patch.apply(&mut record);
        record.staff_name = record.staff_name.trim().to_string();
        record.compliance_status = Some(
            self.evaluator
                .status(record.license_expiry_date, now.date_naive()),
        );
        record.updated_at = now;

        self.staff.update(record.clone())?;
        info!(staff_id = %id, by = %principal.uid, "staff record updated");
        Ok(record)
    }

    pub fn delete_staff(&self, principal: &Principal, id: &StaffId) -> Result<(), ServiceError> {
        ensure_admin(principal)?;
        self.staff.delete(id)?;
        info!(staff_id = %id, by = %principal.uid, "staff record deleted");
        Ok(())
    }

    /// Route board as seen by `principal`, including per-route approval eligibility.
    pub fn list_routes(
        &self,
        principal: &Principal,
        as_of: NaiveDate,
    ) -> Result<Vec<RouteView>, ServiceError> {
        let staff: HashMap<StaffId, StaffRecord> = self
            .staff
            .list()?
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();

        let routes = self.routes.list()?;
        Ok(routes
            .into_iter()
            .map(|route| {
                let assigned = staff.get(&route.staff_id);
                self.route_view(route, assigned, principal, as_of)
            })
            .collect())
    }

    pub fn add_route(
        &self,
        principal: &Principal,
        draft: RouteDraft,
        now: DateTime<Utc>,
    ) -> Result<RouteId, ServiceError> {
        ensure_admin(principal)?;
        let route_name = required_text("route_name", &draft.route_name)?;
        let staff_id = StaffId(required_text("staff_id", &draft.staff_id.0)?);
        if self.staff.get(&staff_id)?.is_none() {
            return Err(ServiceError::Validation(format!(
                "staff_id {staff_id} does not match a staff record"
            )));
        }

        let record = RouteRecord {
            id: RouteId(String::new()),
            route_name,
            planned_journey_minutes: draft.planned_journey_minutes,
            staff_id,
            approved: false,
            approved_at: None,
            created_at: now,
        };

        let id = self.routes.add(record)?;
        info!(route_id = %id, by = %principal.uid, "route added");
        Ok(id)
    }

    pub fn delete_route(&self, principal: &Principal, id: &RouteId) -> Result<(), ServiceError> {
        ensure_admin(principal)?;
        self.routes.delete(id)?;
        info!(route_id = %id, by = %principal.uid, "route deleted");
        Ok(())
    }

    /// Mark a route approved once the approval rule allows it.
    pub fn approve_route(
        &self,
        principal: &Principal,
        id: &RouteId,
        as_of: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<RouteRecord, ServiceError> {
        ensure_admin(principal)?;
        let mut route = self.routes.get(id)?.ok_or(RepositoryError::NotFound)?;

        if route.approved {
            return Err(ServiceError::AlreadyApproved);
        }

        let request = self.approval_request(&route, as_of)?;
        if !self.evaluator.can_approve(&request, principal.is_admin()) {
            warn!(
                route_id = %id,
                minutes = route.planned_journey_minutes,
                staff_status = ?request.staff_status,
                "route approval denied"
            );
            return Err(ServiceError::NotEligible);
        }

        route.approved = true;
        route.approved_at = Some(now);
        let pending = |stored: &RouteRecord| !stored.approved;
        if !self.routes.update_if(route.clone(), &pending)? {
            return Err(ServiceError::AlreadyApproved);
        }
        info!(route_id = %id, by = %principal.uid, "route approved");
        Ok(route)
    }

    /// Counts for the dashboard header.
    pub fn summary(&self, as_of: NaiveDate) -> Result<ComplianceSummary, ServiceError> {
        let staff = self.staff.list()?;
        let routes = self.routes.list()?;

        let mut summary = ComplianceSummary {
            as_of,
            total_staff: staff.len(),
            compliant: 0,
            expiring_soon: 0,
            non_compliant: 0,
            total_routes: routes.len(),
            approved_routes: 0,
            pending_routes: 0,
        };

        for record in &staff {
            match self.evaluator.status(record.license_expiry_date, as_of) {
                ComplianceStatus::Compliant => summary.compliant += 1,
                ComplianceStatus::ExpiringSoon => summary.expiring_soon += 1,
                ComplianceStatus::NonCompliant => summary.non_compliant += 1,
            }
        }

        for route in &routes {
            if route.approved {
                summary.approved_routes += 1;
            } else {
                summary.pending_routes += 1;
            }
        }

        Ok(summary)
    }

    fn approval_request(
        &self,
        route: &RouteRecord,
        as_of: NaiveDate,
    ) -> Result<ApprovalRequest, ServiceError> {
        let staff_status = self
            .staff
            .get(&route.staff_id)?
            .map(|record| self.evaluator.status(record.license_expiry_date, as_of));

        Ok(ApprovalRequest {
            planned_journey_minutes: route.planned_journey_minutes,
            staff_status,
        })
    }

    fn staff_view(&self, record: &StaffRecord, as_of: NaiveDate) -> StaffStatusView {
        let status = self.evaluator.status(record.license_expiry_date, as_of);
        StaffStatusView {
            id: record.id.clone(),
            staff_name: record.staff_name.clone(),
            role: record.role,
            role_label: record.role.label(),
            dbs_expiry_date: record.dbs_expiry_date,
            license_expiry_date: record.license_expiry_date,
            status,
            status_label: status.label(),
            status_color: status.color(),
        }
    }

    fn route_view(
        &self,
        route: RouteRecord,
        assigned: Option<&StaffRecord>,
        principal: &Principal,
        as_of: NaiveDate,
    ) -> RouteView {
        let request = ApprovalRequest {
            planned_journey_minutes: route.planned_journey_minutes,
            staff_status: assigned
                .map(|record| self.evaluator.status(record.license_expiry_date, as_of)),
        };
        let alert = self.evaluator.alert(&request);
        let can_approve =
            !route.approved && self.evaluator.can_approve(&request, principal.is_admin());

        RouteView {
            id: route.id,
            route_name: route.route_name,
            planned_journey_minutes: route.planned_journey_minutes,
            staff_id: route.staff_id,
            staff_name: assigned
                .map(|record| record.staff_name.clone())
                .unwrap_or_else(|| UNASSIGNED_LABEL.to_string()),
            needs_compliance_check: self
                .evaluator
                .thresholds()
                .requires_compliance_check(route.planned_journey_minutes),
            staff_status: request.staff_status,
            compliance_alert: alert,
            compliance_alert_label: alert.label(),
            approved: route.approved,
            approved_at: route.approved_at,
            can_approve,
        }
    }
}

fn ensure_admin(principal: &Principal) -> Result<(), ServiceError> {
    if principal.is_admin() {
        Ok(())
    } else {
        warn!(uid = %principal.uid, "admin action rejected for non-admin principal");
        Err(ServiceError::Forbidden)
    }
}

fn required_text(field: &str, value: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ServiceError::Validation(format!("{field} must not be empty")))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Staff record with its status recomputed for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffStatusView {
    pub id: StaffId,
    pub staff_name: String,
    pub role: StaffRole,
    pub role_label: &'static str,
    pub dbs_expiry_date: NaiveDate,
    pub license_expiry_date: NaiveDate,
    pub status: ComplianceStatus,
    pub status_label: &'static str,
    pub status_color: &'static str,
}

/// Route with its assignment resolved and eligibility evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteView {
    pub id: RouteId,
    pub route_name: String,
    pub planned_journey_minutes: u32,
    pub staff_id: StaffId,
    pub staff_name: String,
    pub needs_compliance_check: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_status: Option<ComplianceStatus>,
    pub compliance_alert: RouteComplianceAlert,
    pub compliance_alert_label: &'static str,
    pub approved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    pub can_approve: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceSummary {
    pub as_of: NaiveDate,
    pub total_staff: usize,
    pub compliant: usize,
    pub expiring_soon: usize,
    pub non_compliant: usize,
    pub total_routes: usize,
    pub approved_routes: usize,
    pub pending_routes: usize,
}

/// Error raised by the compliance service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("only administrators may perform this action")]
    Forbidden,
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("route is already approved")]
    AlreadyApproved,
    #[error("route is not eligible for approval: assigned staff licence must be compliant")]
    NotEligible,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
