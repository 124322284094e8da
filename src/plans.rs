//! Subscription plan tiers.
//!
//! Tiers form a closed, ordered set: `free < starter < pro < enterprise`.
//! The order defines the upgrade direction and "minimum plan" semantics used
//! throughout the crate.
//!
//! Raw plan identifiers coming from tenant records are converted with
//! [`normalize_plan`], which is the only place a string becomes a tier:
//!
//! ```rust
//! use workshop_entitlements::{normalize_plan, PlanTier};
//!
//! assert_eq!(normalize_plan("pro"), PlanTier::Pro);
//! assert_eq!(normalize_plan("Pro"), PlanTier::Free);
//! assert_eq!(normalize_plan(""), PlanTier::Free);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EntitlementError;

/// A subscription plan tier.
///
/// Variants are declared in ascending order so the derived `Ord` matches the
/// upgrade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Starter,
    Pro,
    Enterprise,
}

impl PlanTier {
    /// Number of tiers.
    pub const COUNT: usize = 4;

    /// Every tier, lowest first.
    pub const ALL: [PlanTier; PlanTier::COUNT] = [
        PlanTier::Free,
        PlanTier::Starter,
        PlanTier::Pro,
        PlanTier::Enterprise,
    ];

    /// Parse an exact tier identifier.
    ///
    /// No case folding or trimming is applied: `"Pro"` and `" pro"` are not tiers.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "free" => Some(Self::Free),
            "starter" => Some(Self::Starter),
            "pro" => Some(Self::Pro),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }

    /// The lowercase identifier stored in tenant records.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Starter => "starter",
            Self::Pro => "pro",
            Self::Enterprise => "enterprise",
        }
    }

    /// Capitalized name for display in upgrade prompts.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Starter => "Starter",
            Self::Pro => "Pro",
            Self::Enterprise => "Enterprise",
        }
    }

    /// Position in the tier order, starting at 0 for `free`.
    #[must_use]
    pub fn rank(&self) -> usize {
        *self as usize
    }

    /// The next tier up, if any.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        Self::ALL.get(self.rank() + 1).copied()
    }

    /// The next tier down, if any.
    #[must_use]
    pub fn previous(&self) -> Option<Self> {
        self.rank().checked_sub(1).map(|i| Self::ALL[i])
    }

    /// Check if this tier ranks at or above `other`.
    #[must_use]
    pub fn is_at_least(&self, other: PlanTier) -> bool {
        *self >= other
    }

    /// Check if this is a paid tier.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        !matches!(self, Self::Free)
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = EntitlementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| EntitlementError::UnknownPlan {
            plan: s.to_string(),
        })
    }
}

/// Classify a raw plan identifier, defaulting anything unrecognized to `free`.
///
/// This never grants more than the free tier for missing or unknown input.
#[must_use]
pub fn normalize_plan(raw: &str) -> PlanTier {
    PlanTier::parse(raw).unwrap_or(PlanTier::Free)
}
