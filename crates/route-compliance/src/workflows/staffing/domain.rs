use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::evaluation::ComplianceStatus;

/// Identifier assigned by the record store when a staff member is created.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffId(pub String);

/// Identifier assigned by the record store when a route is created.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(pub String);

impl std::fmt::Display for StaffId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Job title held by a staff member. Unrelated to the sign-in role claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaffRole {
    Admin,
    Operations,
}

impl StaffRole {
    pub fn label(&self) -> &'static str {
        match self {
            StaffRole::Admin => "Admin",
            StaffRole::Operations => "Operations",
        }
    }
}

/// Certification record for a single staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffRecord {
    pub id: StaffId,
    pub staff_name: String,
    pub role: StaffRole,
    pub dbs_expiry_date: NaiveDate,
    pub license_expiry_date: NaiveDate,
    /// Label captured at write time for display. Decisions always recompute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_status: Option<ComplianceStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// Fields supplied by an admin when creating a staff record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffDraft {
    pub staff_name: String,
    pub role: StaffRole,
    pub dbs_expiry_date: NaiveDate,
    pub license_expiry_date: NaiveDate,
}

/// Partial edit of a staff record; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaffPatch {
    #[serde(default)]
    pub staff_name: Option<String>,
    #[serde(default)]
    pub role: Option<StaffRole>,
    #[serde(default)]
    pub dbs_expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub license_expiry_date: Option<NaiveDate>,
}

impl StaffPatch {
    pub fn is_empty(&self) -> bool {
        self.staff_name.is_none()
            && self.role.is_none()
            && self.dbs_expiry_date.is_none()
            && self.license_expiry_date.is_none()
    }

    pub(crate) fn apply(self, record: &mut StaffRecord) {
        if let Some(name) = self.staff_name {
            record.staff_name = name;
        }
        if let Some(role) = self.role {
            record.role = role;
        }
        if let Some(date) = self.dbs_expiry_date {
            record.dbs_expiry_date = date;
        }
        if let Some(date) = self.license_expiry_date {
            record.license_expiry_date = date;
        }
    }
}

/// Delivery route awaiting (or holding) admin approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub id: RouteId,
    pub route_name: String,
    pub planned_journey_minutes: u32,
    /// Weak reference; the staff record may since have been deleted.
    pub staff_id: StaffId,
    #[serde(default)]
    pub approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by an admin when planning a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDraft {
    pub route_name: String,
    pub planned_journey_minutes: u32,
    pub staff_id: StaffId,
}

/// Record shapes the store knows how to key and order.
pub trait Record: Clone + Send + Sync + 'static {
    type Id: Clone + Eq + std::hash::Hash + std::fmt::Display + Send + Sync + 'static;

    const COLLECTION: &'static str;

    fn id(&self) -> &Self::Id;

    /// Replace the placeholder id with the one minted by the store.
    fn assign_id(&mut self, raw: String);

    /// Field that `list` orders by, ascending.
    fn sort_key(&self) -> &str;
}

impl Record for StaffRecord {
    type Id = StaffId;

    const COLLECTION: &'static str = "staff_compliance";

    fn id(&self) -> &StaffId {
        &self.id
    }

    fn assign_id(&mut self, raw: String) {
        self.id = StaffId(raw);
    }

    fn sort_key(&self) -> &str {
        &self.staff_name
    }
}

impl Record for RouteRecord {
    type Id = RouteId;

    const COLLECTION: &'static str = "routes";

    fn id(&self) -> &RouteId {
        &self.id
    }

    fn assign_id(&mut self, raw: String) {
        self.id = RouteId(raw);
    }

    fn sort_key(&self) -> &str {
        &self.route_name
    }
}
