use serde::{Deserialize, Serialize};

pub const DEFAULT_LONG_ROUTE_MINUTES: u32 = 45;
pub const DEFAULT_EXPIRY_WARNING_DAYS: u32 = 30;

/// Policy dials for the licence freshness and route approval rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyThresholds {
    /// Routes longer than this many minutes need a compliant driver.
    pub long_route_minutes: u32,
    /// Licences expiring within this many days are flagged as expiring soon.
    pub expiry_warning_days: u32,
}

impl Default for PolicyThresholds {
    fn default() -> Self {
        Self {
            long_route_minutes: DEFAULT_LONG_ROUTE_MINUTES,
            expiry_warning_days: DEFAULT_EXPIRY_WARNING_DAYS,
        }
    }
}

impl PolicyThresholds {
    pub fn requires_compliance_check(&self, planned_journey_minutes: u32) -> bool {
        planned_journey_minutes > self.long_route_minutes
    }
}
