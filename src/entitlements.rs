//! Entitlements and feature gating.
//!
//! The free functions in this module evaluate against the builtin
//! [`PlanCatalog`]. They are pure and can be called from any thread.
//!
//! ```rust
//! use workshop_entitlements::{get_upgrade_message, has_access, Feature};
//!
//! if !has_access("starter", Feature::Inventory) {
//!     assert_eq!(
//!         get_upgrade_message(Feature::Inventory),
//!         "This feature is available starting from the pro plan."
//!     );
//! }
//! ```
//!
//! Request handlers usually reach for the guards instead, which turn a denial
//! into an [`EntitlementError`] that renders as a `403` response:
//!
//! ```rust,ignore
//! async fn list_inventory(tenant: TenantRecord) -> Result<Json<Vec<Part>>, EntitlementError> {
//!     require_feature(tenant.tier(), Feature::Inventory)?;
//!     // ...
//! }
//! ```

use serde::Serialize;

use crate::catalog::PlanCatalog;
use crate::error::{EntitlementError, Result};
use crate::features::Feature;
use crate::limits::{LimitCheckResult, LimitResource, PlanLimits};
use crate::plans::{normalize_plan, PlanTier};

pub use crate::limits::format_storage_size;

/// Check whether a raw plan identifier grants a feature.
#[must_use]
pub fn has_access(plan: &str, feature: Feature) -> bool {
    PlanCatalog::builtin().has_access(plan, feature)
}

/// Check access for a feature identifier taken from untyped input.
///
/// Unknown features are denied rather than reported.
#[must_use]
pub fn has_access_by_name(plan: &str, feature: &str) -> bool {
    PlanCatalog::builtin().has_access_by_name(plan, feature)
}

/// The lowest tier that unlocks a feature.
#[must_use]
pub fn get_minimum_plan_for_feature(feature: Feature) -> PlanTier {
    PlanCatalog::builtin().get_minimum_plan_for_feature(feature)
}

/// Message shown to users when a feature is locked on their plan.
#[must_use]
pub fn get_upgrade_message(feature: Feature) -> String {
    PlanCatalog::builtin().get_upgrade_message(feature)
}

/// Usage limits for a tier.
#[must_use]
pub fn get_plan_limits(plan: PlanTier) -> PlanLimits {
    PlanCatalog::builtin().get_plan_limits(plan)
}

/// Whether a tenant holding `used_count` appointments may create another.
#[must_use]
pub fn is_within_appointment_limit(plan: PlanTier, used_count: i64) -> bool {
    PlanCatalog::builtin().is_within_limit(plan, LimitResource::Appointments, used_count)
}

/// Whether a tenant holding `count` vehicles may register another.
#[must_use]
pub fn is_within_vehicle_limit(plan: PlanTier, count: i64) -> bool {
    PlanCatalog::builtin().is_within_limit(plan, LimitResource::Vehicles, count)
}

/// Whether `used_bytes` fits within a tier's storage budget.
#[must_use]
pub fn is_within_storage_limit(plan: PlanTier, used_bytes: i64) -> bool {
    PlanCatalog::builtin().is_within_limit(plan, LimitResource::Storage, used_bytes)
}

/// Resolved entitlements for a tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[must_use]
pub struct Entitlements {
    /// The normalized plan.
    pub plan: PlanTier,
    /// Features available on this plan.
    pub features: Vec<Feature>,
    /// Resource limits.
    pub limits: PlanLimits,
}

impl Entitlements {
    /// Entitlements for a tier from the builtin catalog.
    pub fn for_tier(plan: PlanTier) -> Self {
        Self::from_catalog(PlanCatalog::builtin(), plan)
    }

    /// Entitlements for a raw plan identifier from the builtin catalog.
    pub fn for_plan(plan: &str) -> Self {
        Self::for_tier(normalize_plan(plan))
    }

    /// Entitlements for a tier from a specific catalog.
    pub fn from_catalog(catalog: &PlanCatalog, plan: PlanTier) -> Self {
        Self {
            plan,
            features: catalog.features_for(plan),
            limits: catalog.get_plan_limits(plan),
        }
    }

    /// Check if a feature is available.
    #[must_use]
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    /// Check a limit against current usage.
    #[must_use]
    pub fn check_limit(&self, resource: LimitResource, current: i64) -> LimitCheckResult {
        self.limits.check(resource, current)
    }
}

/// Result of checking a feature for a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureCheckResult {
    /// Feature is available.
    Allowed,
    /// Feature needs at least `required`.
    UpgradeRequired { required: PlanTier },
}

impl FeatureCheckResult {
    /// Check if the feature is allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Check a feature against a raw plan identifier.
#[must_use = "feature check result must be used to enforce access control"]
pub fn check_feature(plan: &str, feature: Feature) -> FeatureCheckResult {
    check_feature_in(PlanCatalog::builtin(), normalize_plan(plan), feature)
}

/// Check a feature for a tier against a specific catalog.
#[must_use = "feature check result must be used to enforce access control"]
pub fn check_feature_in(catalog: &PlanCatalog, tier: PlanTier, feature: Feature) -> FeatureCheckResult {
    if catalog.tier_has_access(tier, feature) {
        FeatureCheckResult::Allowed
    } else {
        FeatureCheckResult::UpgradeRequired {
            required: catalog.get_minimum_plan_for_feature(feature),
        }
    }
}

/// Require a feature for a tier.
///
/// # Errors
///
/// Returns `EntitlementError::UpgradeRequired` when the tier does not unlock
/// the feature.
pub fn require_feature(plan: PlanTier, feature: Feature) -> Result<()> {
    require_feature_in(PlanCatalog::builtin(), plan, feature)
}

/// Require a feature for a tier against a specific catalog.
///
/// # Errors
///
/// Returns `EntitlementError::UpgradeRequired` when the tier does not unlock
/// the feature.
pub fn require_feature_in(catalog: &PlanCatalog, plan: PlanTier, feature: Feature) -> Result<()> {
    match check_feature_in(catalog, plan, feature) {
        FeatureCheckResult::Allowed => Ok(()),
        FeatureCheckResult::UpgradeRequired { required } => {
            tracing::debug!(
                plan = %plan,
                feature = %feature,
                required = %required,
                "feature locked on plan"
            );
            Err(EntitlementError::UpgradeRequired {
                feature,
                current: plan,
                required,
            })
        }
    }
}

/// Require that `used` is within a tier's limit for `resource`.
///
/// # Errors
///
/// Returns `EntitlementError::LimitReached` when the usage is at or over the
/// limit.
pub fn require_within_limit(plan: PlanTier, resource: LimitResource, used: i64) -> Result<()> {
    require_within_limit_in(PlanCatalog::builtin(), plan, resource, used)
}

/// Require that `used` is within a tier's limit against a specific catalog.
///
/// # Errors
///
/// Returns `EntitlementError::LimitReached` when the usage is at or over the
/// limit.
pub fn require_within_limit_in(
    catalog: &PlanCatalog,
    plan: PlanTier,
    resource: LimitResource,
    used: i64,
) -> Result<()> {
    match catalog.get_plan_limits(plan).check(resource, used) {
        LimitCheckResult::Unlimited | LimitCheckResult::WithinLimit { .. } => Ok(()),
        LimitCheckResult::AtLimit { current, max } => {
            tracing::debug!(
                plan = %plan,
                resource = %resource,
                current,
                max,
                "usage limit reached"
            );
            Err(EntitlementError::LimitReached {
                resource,
                plan,
                limit: max,
            })
        }
    }
}
