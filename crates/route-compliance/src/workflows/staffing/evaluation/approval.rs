use serde::{Deserialize, Serialize};

use super::config::PolicyThresholds;
use super::status::ComplianceStatus;

/// Inputs the approval rule needs about a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub planned_journey_minutes: u32,
    /// Freshly computed status of the assigned staff member, `None` when unassigned.
    pub staff_status: Option<ComplianceStatus>,
}

/// Only admins approve. Short routes always pass; long routes need a
/// compliant assigned driver.
pub fn can_approve(
    request: &ApprovalRequest,
    caller_is_admin: bool,
    thresholds: &PolicyThresholds,
) -> bool {
    if !caller_is_admin {
        return false;
    }

    if !thresholds.requires_compliance_check(request.planned_journey_minutes) {
        return true;
    }

    request.staff_status == Some(ComplianceStatus::Compliant)
}

/// Compliance alert shown next to each route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteComplianceAlert {
    #[serde(rename = "Not Required")]
    NotRequired,
    #[serde(rename = "Compliant")]
    Compliant,
    #[serde(rename = "Not Compliant")]
    NotCompliant,
}

impl RouteComplianceAlert {
    pub fn evaluate(request: &ApprovalRequest, thresholds: &PolicyThresholds) -> Self {
        if !thresholds.requires_compliance_check(request.planned_journey_minutes) {
            Self::NotRequired
        } else if request.staff_status == Some(ComplianceStatus::Compliant) {
            Self::Compliant
        } else {
            Self::NotCompliant
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RouteComplianceAlert::NotRequired => "Not Required",
            RouteComplianceAlert::Compliant => "Compliant",
            RouteComplianceAlert::NotCompliant => "Not Compliant",
        }
    }
}
