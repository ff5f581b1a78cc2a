use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use super::config::PolicyThresholds;

/// Freshness of a staff member's licence relative to a reference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplianceStatus {
    #[serde(rename = "Compliant")]
    Compliant,
    #[serde(rename = "Expiring Soon")]
    ExpiringSoon,
    #[serde(rename = "Non-Compliant")]
    NonCompliant,
}

impl ComplianceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "Compliant",
            ComplianceStatus::ExpiringSoon => "Expiring Soon",
            ComplianceStatus::NonCompliant => "Non-Compliant",
        }
    }

    /// Background colour used by the dashboards.
    pub fn color(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "#d4edda",
            ComplianceStatus::ExpiringSoon => "#fff3cd",
            ComplianceStatus::NonCompliant => "#f8d7da",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "compliant" => Some(Self::Compliant),
            "expiring-soon" => Some(Self::ExpiringSoon),
            "non-compliant" => Some(Self::NonCompliant),
            _ => None,
        }
    }
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a licence expiry date against `as_of`, both at day granularity.
///
/// A licence expiring on `as_of` itself has not lapsed yet and counts as
/// expiring soon.
pub fn compute_status(
    license_expiry_date: NaiveDate,
    as_of: NaiveDate,
    thresholds: &PolicyThresholds,
) -> ComplianceStatus {
    if license_expiry_date < as_of {
        return ComplianceStatus::NonCompliant;
    }

    let days_until_expiry = (license_expiry_date - as_of).num_days();
    if days_until_expiry <= i64::from(thresholds.expiry_warning_days) {
        ComplianceStatus::ExpiringSoon
    } else {
        ComplianceStatus::Compliant
    }
}

/// Parse and classify a raw expiry value. Unparseable input is non-compliant.
pub fn compute_status_from_str(
    raw: &str,
    as_of: NaiveDate,
    thresholds: &PolicyThresholds,
) -> ComplianceStatus {
    match parse_calendar_date(raw) {
        Some(expiry) => compute_status(expiry, as_of, thresholds),
        None => {
            tracing::warn!(value = raw, "unparseable licence expiry date treated as non-compliant");
            ComplianceStatus::NonCompliant
        }
    }
}

/// Accepts `YYYY-MM-DD`, or an RFC 3339 timestamp truncated to its date.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        })
}
