//! Gated features.
//!
//! The feature set is closed and fixed at build time. Which tier unlocks
//! each feature lives in the [`PlanCatalog`](crate::catalog::PlanCatalog).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EntitlementError;

/// A capability gated by plan tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Appointment,
    Chat,
    Sms,
    FileUploadChat,
    Inventory,
    ApiAccess,
    Quotations,
    MultipleWorkshops,
    AdvancedAnalytics,
    CustomBrandingBasic,
    CustomBrandingFull,
}

impl Feature {
    /// Number of features.
    pub const COUNT: usize = 11;

    /// Every feature, in declaration order.
    pub const ALL: [Feature; Feature::COUNT] = [
        Feature::Appointment,
        Feature::Chat,
        Feature::Sms,
        Feature::FileUploadChat,
        Feature::Inventory,
        Feature::ApiAccess,
        Feature::Quotations,
        Feature::MultipleWorkshops,
        Feature::AdvancedAnalytics,
        Feature::CustomBrandingBasic,
        Feature::CustomBrandingFull,
    ];

    /// Parse an exact snake_case feature identifier.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.as_str() == raw)
    }

    /// The snake_case identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Appointment => "appointment",
            Self::Chat => "chat",
            Self::Sms => "sms",
            Self::FileUploadChat => "file_upload_chat",
            Self::Inventory => "inventory",
            Self::ApiAccess => "api_access",
            Self::Quotations => "quotations",
            Self::MultipleWorkshops => "multiple_workshops",
            Self::AdvancedAnalytics => "advanced_analytics",
            Self::CustomBrandingBasic => "custom_branding_basic",
            Self::CustomBrandingFull => "custom_branding_full",
        }
    }

    /// Human readable label.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Appointment => "Appointments",
            Self::Chat => "Chat",
            Self::Sms => "SMS notifications",
            Self::FileUploadChat => "File uploads in chat",
            Self::Inventory => "Inventory",
            Self::ApiAccess => "API access",
            Self::Quotations => "Quotations",
            Self::MultipleWorkshops => "Multiple workshops",
            Self::AdvancedAnalytics => "Advanced analytics",
            Self::CustomBrandingBasic => "Basic custom branding",
            Self::CustomBrandingFull => "Full custom branding",
        }
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = EntitlementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| EntitlementError::UnknownFeature {
            feature: s.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_indexed_in_order() {
        for (i, feature) in Feature::ALL.iter().enumerate() {
            assert_eq!(feature.index(), i);
        }
    }

    #[test]
    fn test_parse_round_trips_identifiers() {
        for feature in Feature::ALL {
            assert_eq!(Feature::parse(feature.as_str()), Some(feature));
        }
        assert_eq!(Feature::parse("Chat"), None);
        assert_eq!(Feature::parse("teleport"), None);
    }

    #[test]
    fn test_serde_matches_as_str() {
        for feature in Feature::ALL {
            let json = serde_json::to_string(&feature).unwrap();
            assert_eq!(json, format!("\"{}\"", feature.as_str()));
        }
    }

    #[test]
    fn test_from_str_error() {
        let err = "teleport".parse::<Feature>().unwrap_err();
        assert!(matches!(err, EntitlementError::UnknownFeature { .. }));
    }
}
