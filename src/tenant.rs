//! Tenant records as fetched from the hosted database.
//!
//! Only the columns the entitlement engine reads are modelled. Tenant state
//! can be missing or still loading, so the plan column is optional.

use serde::{Deserialize, Serialize};

use crate::catalog::PlanCatalog;
use crate::entitlements::Entitlements;
use crate::plans::PlanTier;

/// A workshop account row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRecord {
    pub id: String,
    #[serde(default)]
    pub subscription_plan: Option<String>,
}

impl TenantRecord {
    pub fn new(id: impl Into<String>, subscription_plan: Option<&str>) -> Self {
        Self {
            id: id.into(),
            subscription_plan: subscription_plan.map(str::to_string),
        }
    }

    /// The tenant's tier, falling back to `free`.
    ///
    /// A plan value that is present but unrecognized is logged so a
    /// misconfigured tenant can be told apart from a free one.
    #[must_use]
    pub fn tier(&self) -> PlanTier {
        let Some(raw) = self.subscription_plan.as_deref() else {
            return PlanTier::Free;
        };

        match PlanTier::parse(raw) {
            Some(tier) => tier,
            None => {
                tracing::warn!(
                    tenant_id = %self.id,
                    subscription_plan = %raw,
                    "unrecognized subscription plan, treating tenant as free"
                );
                PlanTier::Free
            }
        }
    }

    /// Entitlements for this tenant from the builtin catalog.
    pub fn entitlements(&self) -> Entitlements {
        Entitlements::for_tier(self.tier())
    }

    /// Entitlements for this tenant from a specific catalog.
    pub fn entitlements_in(&self, catalog: &PlanCatalog) -> Entitlements {
        Entitlements::from_catalog(catalog, self.tier())
    }
}
