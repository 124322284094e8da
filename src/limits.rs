//! Usage limits per plan.
//!
//! Limits are plain integers where [`UNLIMITED`] (`-1`) means no cap.
//!
//! Counted resources (appointments, vehicles) answer "is there room for one
//! more?", so a tenant holding exactly `limit` items is at the limit. Storage
//! answers "are the bytes used so far within budget?", so the boundary byte
//! count is still allowed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel limit value meaning "unlimited".
pub const UNLIMITED: i64 = -1;

const KIB: f64 = 1024.0;
const STORAGE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// A resource with a per-plan usage limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitResource {
    Appointments,
    Vehicles,
    Storage,
}

impl LimitResource {
    pub const ALL: [LimitResource; 3] = [
        LimitResource::Appointments,
        LimitResource::Vehicles,
        LimitResource::Storage,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Appointments => "appointments",
            Self::Vehicles => "vehicles",
            Self::Storage => "storage",
        }
    }

    /// Whether usage equal to the limit is still within it.
    #[must_use]
    pub fn is_inclusive(&self) -> bool {
        matches!(self, Self::Storage)
    }
}

impl fmt::Display for LimitResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource limits for a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    /// Maximum number of existing appointments.
    pub appointments: i64,
    /// Maximum number of registered vehicles.
    pub vehicles: i64,
    /// Storage budget in bytes.
    pub storage_bytes: i64,
}

impl PlanLimits {
    /// Limits with every resource uncapped.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            appointments: UNLIMITED,
            vehicles: UNLIMITED,
            storage_bytes: UNLIMITED,
        }
    }

    /// Get the raw limit value for a resource.
    #[must_use]
    pub fn get(&self, resource: LimitResource) -> i64 {
        match resource {
            LimitResource::Appointments => self.appointments,
            LimitResource::Vehicles => self.vehicles,
            LimitResource::Storage => self.storage_bytes,
        }
    }

    /// Check whether `used` is within the limit for `resource`.
    #[must_use]
    pub fn is_within(&self, resource: LimitResource, used: i64) -> bool {
        self.check(resource, used).is_allowed()
    }

    /// Check a resource usage against this plan's limit.
    #[must_use]
    pub fn check(&self, resource: LimitResource, current: i64) -> LimitCheckResult {
        let max = self.get(resource);
        if max == UNLIMITED {
            return LimitCheckResult::Unlimited;
        }

        let within = if resource.is_inclusive() {
            current <= max
        } else {
            current < max
        };

        if within {
            LimitCheckResult::WithinLimit { current, max }
        } else {
            LimitCheckResult::AtLimit { current, max }
        }
    }
}

/// Result of checking a resource limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LimitCheckResult {
    /// No limit on this resource.
    Unlimited,
    /// Usage is within the limit.
    WithinLimit { current: i64, max: i64 },
    /// Usage has reached or exceeded the limit.
    AtLimit { current: i64, max: i64 },
}

impl LimitCheckResult {
    /// Check if usage is allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Unlimited | Self::WithinLimit { .. })
    }

    /// Check if at or over limit.
    #[must_use]
    pub fn is_at_limit(&self) -> bool {
        matches!(self, Self::AtLimit { .. })
    }
}

/// Format a byte count for display.
///
/// Uses 1024-based units up to GB with one decimal place. The unlimited
/// sentinel renders as `"Unlimited"`.
///
/// ```rust
/// use workshop_entitlements::format_storage_size;
///
/// assert_eq!(format_storage_size(1_572_864), "1.5 MB");
/// assert_eq!(format_storage_size(-1), "Unlimited");
/// ```
#[must_use]
pub fn format_storage_size(bytes: i64) -> String {
    if bytes == UNLIMITED {
        return "Unlimited".to_string();
    }
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= KIB && unit < STORAGE_UNITS.len() - 1 {
        value /= KIB;
        unit += 1;
    }

    format!("{:.1} {}", value, STORAGE_UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    const FREE: PlanLimits = PlanLimits {
        appointments: 20,
        vehicles: 5,
        storage_bytes: 104_857_600,
    };

    #[test]
    fn test_counted_limits_are_strict() {
        assert_eq!(
            FREE.check(LimitResource::Appointments, 19),
            LimitCheckResult::WithinLimit { current: 19, max: 20 }
        );
        assert_eq!(
            FREE.check(LimitResource::Appointments, 20),
            LimitCheckResult::AtLimit { current: 20, max: 20 }
        );
        assert!(FREE.is_within(LimitResource::Vehicles, 4));
        assert!(!FREE.is_within(LimitResource::Vehicles, 5));
        assert!(!FREE.is_within(LimitResource::Vehicles, 6));
    }

    #[test]
    fn test_storage_limit_is_inclusive() {
        assert!(FREE.is_within(LimitResource::Storage, 104_857_600));
        assert!(!FREE.is_within(LimitResource::Storage, 104_857_601));
    }

    #[test]
    fn test_unlimited_sentinel() {
        let limits = PlanLimits::unlimited();
        for resource in LimitResource::ALL {
            assert_eq!(limits.check(resource, i64::MAX), LimitCheckResult::Unlimited);
        }
    }

    #[test]
    fn test_negative_usage_is_compared_as_given() {
        assert!(FREE.is_within(LimitResource::Appointments, -5));
    }

    #[test]
    fn test_format_storage_size() {
        assert_eq!(format_storage_size(-1), "Unlimited");
        assert_eq!(format_storage_size(0), "0 B");
        assert_eq!(format_storage_size(512), "512.0 B");
        assert_eq!(format_storage_size(1024), "1.0 KB");
        assert_eq!(format_storage_size(1_572_864), "1.5 MB");
        assert_eq!(format_storage_size(104_857_600), "100.0 MB");
        assert_eq!(format_storage_size(1_073_741_824), "1.0 GB");
        assert_eq!(format_storage_size(10_737_418_240), "10.0 GB");
    }

    #[test]
    fn test_format_caps_at_gigabytes() {
        assert_eq!(format_storage_size(1024 * 1_073_741_824), "1024.0 GB");
    }

    #[test]
    fn test_limit_check_serializes_with_status() {
        let json = serde_json::to_value(LimitCheckResult::AtLimit { current: 5, max: 5 }).unwrap();
        assert_eq!(json["status"], "at_limit");
        assert_eq!(json["max"], 5);
    }
}
