//! Plan catalog: which tier unlocks each feature, and the limits per tier.
//!
//! The catalog stores only the *minimum* tier per feature. Availability at
//! higher tiers is derived from the tier order, so a feature available at
//! some tier is always available at every tier above it.
//!
//! # Builtin catalog
//!
//! [`PlanCatalog::builtin()`] is a process-wide static snapshot:
//!
//! | Tier | Newly unlocked features |
//! |---|---|
//! | free | appointment, quotations |
//! | starter | chat, sms, file_upload_chat, custom_branding_basic |
//! | pro | inventory, multiple_workshops, custom_branding_full |
//! | enterprise | api_access, advanced_analytics |
//!
//! # Loaded catalogs
//!
//! Deployments that manage plans outside the binary can load a catalog file
//! once at startup. The result is immutable like the builtin one.
//!
//! ```toml
//! [features]
//! appointment = "free"
//! quotations = "free"
//! chat = "starter"
//! # ... every feature must be listed
//!
//! [limits.free]
//! appointments = 20
//! vehicles = 5
//! storage_bytes = 104857600
//! # ... one table per tier, -1 means unlimited
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{EntitlementError, Result};
use crate::features::Feature;
use crate::limits::{LimitResource, PlanLimits, UNLIMITED};
use crate::plans::{normalize_plan, PlanTier};

const MIB: i64 = 1024 * 1024;
const GIB: i64 = 1024 * MIB;

static BUILTIN: PlanCatalog = PlanCatalog {
    // Indexed by `Feature` declaration order.
    minimum_plans: [
        PlanTier::Free,       // appointment
        PlanTier::Starter,    // chat
        PlanTier::Starter,    // sms
        PlanTier::Starter,    // file_upload_chat
        PlanTier::Pro,        // inventory
        PlanTier::Enterprise, // api_access
        PlanTier::Free,       // quotations
        PlanTier::Pro,        // multiple_workshops
        PlanTier::Enterprise, // advanced_analytics
        PlanTier::Starter,    // custom_branding_basic
        PlanTier::Pro,        // custom_branding_full
    ],
    // Indexed by `PlanTier` rank.
    limits: [
        PlanLimits {
            appointments: 20,
            vehicles: 5,
            storage_bytes: 100 * MIB,
        },
        PlanLimits {
            appointments: 50,
            vehicles: 10,
            storage_bytes: GIB,
        },
        PlanLimits {
            appointments: 200,
            vehicles: 50,
            storage_bytes: 10 * GIB,
        },
        PlanLimits::unlimited(),
    ],
};

/// An immutable snapshot of plan entitlements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanCatalog {
    minimum_plans: [PlanTier; Feature::COUNT],
    limits: [PlanLimits; PlanTier::COUNT],
}

impl PlanCatalog {
    /// The compiled-in catalog.
    #[must_use]
    pub fn builtin() -> &'static PlanCatalog {
        &BUILTIN
    }

    /// Parse a catalog from TOML.
    ///
    /// # Errors
    ///
    /// Returns `EntitlementError::InvalidCatalog` if the document does not
    /// parse or fails validation.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(input).map_err(|e| EntitlementError::InvalidCatalog {
            reason: e.to_string(),
        })?;
        file.into_catalog()
    }

    /// Parse a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns `EntitlementError::InvalidCatalog` if the document does not
    /// parse or fails validation.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let file: CatalogFile =
            serde_json::from_str(input).map_err(|e| EntitlementError::InvalidCatalog {
                reason: e.to_string(),
            })?;
        file.into_catalog()
    }

    /// Load a catalog file. Files ending in `.json` are read as JSON, anything
    /// else as TOML.
    ///
    /// # Errors
    ///
    /// Returns `EntitlementError::CatalogIo` if the file cannot be read and
    /// `EntitlementError::InvalidCatalog` if its contents are invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| EntitlementError::CatalogIo {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let catalog = if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_toml_str(&contents)
        };

        match &catalog {
            Ok(_) => tracing::info!(path = %path.display(), "loaded plan catalog"),
            Err(e) => tracing::error!(path = %path.display(), error = %e, "failed to load plan catalog"),
        }

        catalog
    }

    /// Check whether a raw plan identifier grants a feature.
    ///
    /// Unknown plan identifiers are treated as `free`.
    #[must_use]
    pub fn has_access(&self, plan: &str, feature: Feature) -> bool {
        self.tier_has_access(normalize_plan(plan), feature)
    }

    /// Check whether a tier grants a feature.
    #[must_use]
    pub fn tier_has_access(&self, tier: PlanTier, feature: Feature) -> bool {
        tier >= self.get_minimum_plan_for_feature(feature)
    }

    /// Like [`has_access`](Self::has_access) for a feature identifier that
    /// has not been parsed yet. Unknown features are denied.
    #[must_use]
    pub fn has_access_by_name(&self, plan: &str, feature: &str) -> bool {
        Feature::parse(feature).is_some_and(|f| self.has_access(plan, f))
    }

    /// The lowest tier that unlocks a feature.
    #[must_use]
    pub fn get_minimum_plan_for_feature(&self, feature: Feature) -> PlanTier {
        self.minimum_plans[feature.index()]
    }

    /// Message shown to users who hit a locked feature.
    #[must_use]
    pub fn get_upgrade_message(&self, feature: Feature) -> String {
        upgrade_message_for(self.get_minimum_plan_for_feature(feature))
    }

    /// Usage limits for a tier.
    #[must_use]
    pub fn get_plan_limits(&self, tier: PlanTier) -> PlanLimits {
        self.limits[tier.rank()]
    }

    /// Check `used` against a tier's limit for `resource`.
    #[must_use]
    pub fn is_within_limit(&self, tier: PlanTier, resource: LimitResource, used: i64) -> bool {
        self.get_plan_limits(tier).is_within(resource, used)
    }

    /// Every feature available on a tier.
    #[must_use]
    pub fn features_for(&self, tier: PlanTier) -> Vec<Feature> {
        Feature::ALL
            .into_iter()
            .filter(|f| self.tier_has_access(tier, *f))
            .collect()
    }

    /// Features whose minimum tier is exactly `tier`.
    #[must_use]
    pub fn features_unlocked_at(&self, tier: PlanTier) -> Vec<Feature> {
        Feature::ALL
            .into_iter()
            .filter(|f| self.get_minimum_plan_for_feature(*f) == tier)
            .collect()
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

pub(crate) fn upgrade_message_for(tier: PlanTier) -> String {
    format!("This feature is available starting from the {} plan.", tier.as_str())
}

/// On-disk catalog shape. Keys stay strings so unknown names are reported by
/// name instead of as a generic parse error.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    features: BTreeMap<String, String>,
    limits: BTreeMap<String, PlanLimits>,
}

impl CatalogFile {
    fn into_catalog(self) -> Result<PlanCatalog> {
        let mut minimum_plans: [Option<PlanTier>; Feature::COUNT] = [None; Feature::COUNT];
        for (name, tier) in &self.features {
            let feature = Feature::parse(name).ok_or_else(|| invalid(format!("unknown feature '{}'", name)))?;
            let tier = PlanTier::parse(tier)
                .ok_or_else(|| invalid(format!("unknown plan '{}' for feature '{}'", tier, name)))?;
            minimum_plans[feature.index()] = Some(tier);
        }

        let mut limits: [Option<PlanLimits>; PlanTier::COUNT] = [None; PlanTier::COUNT];
        for (name, plan_limits) in &self.limits {
            let tier = PlanTier::parse(name).ok_or_else(|| invalid(format!("unknown plan '{}' in limits", name)))?;
            for resource in LimitResource::ALL {
                let value = plan_limits.get(resource);
                if value < UNLIMITED {
                    return Err(invalid(format!(
                        "{} limit for plan '{}' must be -1 or greater, got {}",
                        resource, name, value
                    )));
                }
            }
            limits[tier.rank()] = Some(*plan_limits);
        }

        let mut catalog = BUILTIN.clone();
        for feature in Feature::ALL {
            catalog.minimum_plans[feature.index()] = minimum_plans[feature.index()]
                .ok_or_else(|| invalid(format!("missing minimum plan for feature '{}'", feature)))?;
        }
        for tier in PlanTier::ALL {
            catalog.limits[tier.rank()] =
                limits[tier.rank()].ok_or_else(|| invalid(format!("missing limits for plan '{}'", tier)))?;
        }

        Ok(catalog)
    }
}

fn invalid(reason: String) -> EntitlementError {
    EntitlementError::InvalidCatalog { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_TOML: &str = r#"
        [features]
        appointment = "free"
        quotations = "free"
        chat = "free"
        sms = "starter"
        file_upload_chat = "starter"
        custom_branding_basic = "starter"
        inventory = "starter"
        multiple_workshops = "pro"
        custom_branding_full = "pro"
        api_access = "pro"
        advanced_analytics = "enterprise"

        [limits.free]
        appointments = 10
        vehicles = 3
        storage_bytes = 1048576

        [limits.starter]
        appointments = 100
        vehicles = 20
        storage_bytes = 1073741824

        [limits.pro]
        appointments = -1
        vehicles = 100
        storage_bytes = -1

        [limits.enterprise]
        appointments = -1
        vehicles = -1
        storage_bytes = -1
    "#;

    #[test]
    fn test_builtin_newly_unlocked_table() {
        let catalog = PlanCatalog::builtin();
        assert_eq!(
            catalog.features_unlocked_at(PlanTier::Free),
            vec![Feature::Appointment, Feature::Quotations]
        );
        assert_eq!(
            catalog.features_unlocked_at(PlanTier::Starter),
            vec![
                Feature::Chat,
                Feature::Sms,
                Feature::FileUploadChat,
                Feature::CustomBrandingBasic
            ]
        );
        assert_eq!(
            catalog.features_unlocked_at(PlanTier::Pro),
            vec![
                Feature::Inventory,
                Feature::MultipleWorkshops,
                Feature::CustomBrandingFull
            ]
        );
        assert_eq!(
            catalog.features_unlocked_at(PlanTier::Enterprise),
            vec![Feature::ApiAccess, Feature::AdvancedAnalytics]
        );
    }

    #[test]
    fn test_builtin_limits() {
        let catalog = PlanCatalog::builtin();
        assert_eq!(
            catalog.get_plan_limits(PlanTier::Free),
            PlanLimits {
                appointments: 20,
                vehicles: 5,
                storage_bytes: 104_857_600
            }
        );
        assert_eq!(
            catalog.get_plan_limits(PlanTier::Starter).storage_bytes,
            1_073_741_824
        );
        assert_eq!(
            catalog.get_plan_limits(PlanTier::Pro).storage_bytes,
            10_737_418_240
        );
        assert_eq!(
            catalog.get_plan_limits(PlanTier::Enterprise),
            PlanLimits::unlimited()
        );
    }

    #[test]
    fn test_features_for_is_cumulative() {
        let catalog = PlanCatalog::builtin();
        assert_eq!(catalog.features_for(PlanTier::Free).len(), 2);
        assert_eq!(catalog.features_for(PlanTier::Starter).len(), 6);
        assert_eq!(catalog.features_for(PlanTier::Pro).len(), 9);
        assert_eq!(catalog.features_for(PlanTier::Enterprise).len(), Feature::COUNT);
    }

    #[test]
    fn test_has_access_by_name_fails_closed() {
        let catalog = PlanCatalog::builtin();
        assert!(catalog.has_access_by_name("starter", "chat"));
        assert!(!catalog.has_access_by_name("enterprise", "teleport"));
        assert!(!catalog.has_access_by_name("enterprise", ""));
    }

    #[test]
    fn test_load_toml_catalog() {
        let catalog = PlanCatalog::from_toml_str(FULL_TOML).unwrap();
        assert_eq!(catalog.get_minimum_plan_for_feature(Feature::Chat), PlanTier::Free);
        assert!(catalog.has_access("starter", Feature::Inventory));
        assert_eq!(
            catalog.get_upgrade_message(Feature::ApiAccess),
            "This feature is available starting from the pro plan."
        );
        assert!(catalog.is_within_limit(PlanTier::Pro, LimitResource::Appointments, 1_000_000));
        assert!(!catalog.is_within_limit(PlanTier::Free, LimitResource::Vehicles, 3));
    }

    #[test]
    fn test_load_json_catalog() {
        let toml_catalog = PlanCatalog::from_toml_str(FULL_TOML).unwrap();
        let value: toml::Value = toml::from_str(FULL_TOML).unwrap();
        let json = serde_json::to_string(&value).unwrap();

        let json_catalog = PlanCatalog::from_json_str(&json).unwrap();
        assert_eq!(json_catalog, toml_catalog);
    }

    #[test]
    fn test_missing_feature_is_rejected() {
        let input = FULL_TOML.replace("advanced_analytics = \"enterprise\"", "");
        let err = PlanCatalog::from_toml_str(&input).unwrap_err();
        assert_eq!(
            err,
            EntitlementError::InvalidCatalog {
                reason: "missing minimum plan for feature 'advanced_analytics'".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_names_are_rejected() {
        let input = FULL_TOML.replace("sms = \"starter\"", "sms = \"Starter\"");
        let err = PlanCatalog::from_toml_str(&input).unwrap_err();
        assert!(err.to_string().contains("unknown plan 'Starter'"));

        let input = FULL_TOML.replace("sms = \"starter\"", "sms = \"starter\"\nfax = \"pro\"");
        let err = PlanCatalog::from_toml_str(&input).unwrap_err();
        assert!(err.to_string().contains("unknown feature 'fax'"));
    }

    #[test]
    fn test_missing_tier_limits_are_rejected() {
        let input = FULL_TOML.replace("[limits.enterprise]", "[limits.enterprise_old]");
        let err = PlanCatalog::from_toml_str(&input).unwrap_err();
        assert!(err.to_string().contains("unknown plan 'enterprise_old'"));
    }

    #[test]
    fn test_limits_below_sentinel_are_rejected() {
        let input = FULL_TOML.replace("vehicles = 3", "vehicles = -2");
        let err = PlanCatalog::from_toml_str(&input).unwrap_err();
        assert!(err.to_string().contains("vehicles limit for plan 'free'"));
    }

    #[test]
    fn test_malformed_document() {
        let err = PlanCatalog::from_toml_str("features = 3").unwrap_err();
        assert!(matches!(err, EntitlementError::InvalidCatalog { .. }));
    }
}
