//! Plan-based entitlements for multi-tenant workshop software.
//!
//! Decides whether a tenant on a subscription plan may use a feature, what
//! limits apply to its usage, and what upgrade message to show when it hits
//! a wall.
//!
//! # Features
//!
//! - **Plans**: the closed, ordered tier set `free < starter < pro < enterprise`
//! - **Feature gating**: minimum-plan lookups with upward-monotonic access
//! - **Usage limits**: appointments, vehicles and storage with an unlimited sentinel
//! - **Catalogs**: the builtin tables, or an immutable snapshot loaded from TOML/JSON
//! - **Guards**: denials as errors that render as `403` axum responses
//!
//! # Quick Start
//!
//! ```rust
//! use workshop_entitlements::{
//!     get_upgrade_message, has_access, is_within_appointment_limit, normalize_plan, Feature,
//! };
//!
//! let plan = "starter";
//!
//! assert!(has_access(plan, Feature::Chat));
//! assert!(!has_access(plan, Feature::Inventory));
//! assert_eq!(
//!     get_upgrade_message(Feature::Inventory),
//!     "This feature is available starting from the pro plan."
//! );
//!
//! assert!(is_within_appointment_limit(normalize_plan(plan), 49));
//! assert!(!is_within_appointment_limit(normalize_plan(plan), 50));
//! ```

pub mod catalog;
mod config;
pub mod entitlements;
mod error;
pub mod features;
pub mod limits;
pub mod plans;
pub mod tenant;
mod utils;

// Re-exports for public API
pub use catalog::PlanCatalog;
pub use config::{ConfigBuilder, EntitlementsConfig, LoadedCatalog, LoggingConfig};
pub use entitlements::{
    Entitlements, FeatureCheckResult, check_feature, check_feature_in, get_minimum_plan_for_feature,
    get_plan_limits, get_upgrade_message, has_access, has_access_by_name, is_within_appointment_limit,
    is_within_storage_limit, is_within_vehicle_limit, require_feature, require_feature_in,
    require_within_limit, require_within_limit_in,
};
pub use error::{EntitlementError, ErrorResponse, Result};
pub use features::Feature;
pub use limits::{LimitCheckResult, LimitResource, PlanLimits, UNLIMITED, format_storage_size};
pub use plans::{PlanTier, normalize_plan};
pub use tenant::TenantRecord;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "workshop_entitlements=debug")
/// - `WORKSHOP_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = utils::get_env_with_prefix("LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Initialize tracing with a custom configuration
pub fn init_tracing_with_config(config: &EntitlementsConfig) {
    let env_filter = EnvFilter::new(&config.logging.level);

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
