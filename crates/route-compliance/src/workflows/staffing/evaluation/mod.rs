mod approval;
mod config;
mod status;

pub use approval::{can_approve, ApprovalRequest, RouteComplianceAlert};
pub use config::{PolicyThresholds, DEFAULT_EXPIRY_WARNING_DAYS, DEFAULT_LONG_ROUTE_MINUTES};
pub use status::{compute_status, compute_status_from_str, parse_calendar_date, ComplianceStatus};

use chrono::NaiveDate;

/// Stateless evaluator binding the thresholds to both rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplianceEvaluator {
    thresholds: PolicyThresholds,
}

impl ComplianceEvaluator {
    pub fn new(thresholds: PolicyThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &PolicyThresholds {
        &self.thresholds
    }

    pub fn status(&self, license_expiry_date: NaiveDate, as_of: NaiveDate) -> ComplianceStatus {
        compute_status(license_expiry_date, as_of, &self.thresholds)
    }

    pub fn can_approve(&self, request: &ApprovalRequest, caller_is_admin: bool) -> bool {
        can_approve(request, caller_is_admin, &self.thresholds)
    }

    pub fn alert(&self, request: &ApprovalRequest) -> RouteComplianceAlert {
        RouteComplianceAlert::evaluate(request, &self.thresholds)
    }
}
