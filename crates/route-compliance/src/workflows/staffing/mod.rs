//! Staff licence compliance and delivery-route approval.
//!
//! `evaluation` holds the two pure rules (licence status and approval
//! eligibility); the service, repository, session, and router modules wire
//! them to record stores and an HTTP surface.

pub mod domain;
pub mod evaluation;
pub mod repository;
pub mod router;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use domain::{
    Record, RouteDraft, RouteId, RouteRecord, StaffDraft, StaffId, StaffPatch, StaffRecord,
    StaffRole,
};
pub use evaluation::{
    can_approve, compute_status, compute_status_from_str, parse_calendar_date, ApprovalRequest,
    ComplianceEvaluator, ComplianceStatus, PolicyThresholds, RouteComplianceAlert,
};
pub use repository::{InMemoryRecordRepository, RecordRepository, RepositoryError};
pub use router::compliance_router;
pub use service::{
    ComplianceService, ComplianceSummary, RouteView, ServiceError, StaffStatusView,
};
pub use session::{Principal, RoleClaim, SessionContext, SessionState};
