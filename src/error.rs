use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::features::Feature;
use crate::limits::{LimitResource, format_storage_size};
use crate::plans::PlanTier;

/// Errors raised at the edges of the entitlement engine.
///
/// The engine's lookups never fail; these cover parsing at the string
/// boundary, guard denials, and catalog/config loading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntitlementError {
    #[error("Unknown plan: {plan}")]
    UnknownPlan { plan: String },

    #[error("Unknown feature: {feature}")]
    UnknownFeature { feature: String },

    /// Display is the exact upgrade message shown to end users.
    #[error("This feature is available starting from the {required} plan.")]
    UpgradeRequired {
        feature: Feature,
        current: PlanTier,
        required: PlanTier,
    },

    #[error("{}", limit_reached_message(.resource, .plan, .limit))]
    LimitReached {
        resource: LimitResource,
        plan: PlanTier,
        limit: i64,
    },

    #[error("Invalid plan catalog: {reason}")]
    InvalidCatalog { reason: String },

    #[error("Failed to read plan catalog '{path}': {message}")]
    CatalogIo { path: String, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, EntitlementError>;

fn limit_reached_message(resource: &LimitResource, plan: &PlanTier, limit: &i64) -> String {
    match resource {
        LimitResource::Storage => format!(
            "The {} plan allows {} of storage",
            plan,
            format_storage_size(*limit)
        ),
        _ => format!("The {} plan allows {} {}", plan, limit, resource),
    }
}

/// JSON body returned for entitlement errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
    error_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    feature: Option<Feature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource: Option<LimitResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_plan: Option<PlanTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    required_plan: Option<PlanTier>,
}

impl EntitlementError {
    /// The tier a caller must upgrade to, if this is an upgrade denial.
    #[must_use]
    pub fn required_plan(&self) -> Option<PlanTier> {
        match self {
            Self::UpgradeRequired { required, .. } => Some(*required),
            Self::LimitReached { plan, .. } => plan.next(),
            _ => None,
        }
    }

    /// Check if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownPlan { .. }
                | Self::UnknownFeature { .. }
                | Self::UpgradeRequired { .. }
                | Self::LimitReached { .. }
        )
    }

    /// Check if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownPlan { .. } | Self::UnknownFeature { .. } => StatusCode::BAD_REQUEST,
            Self::UpgradeRequired { .. } | Self::LimitReached { .. } => StatusCode::FORBIDDEN,
            Self::InvalidCatalog { .. } | Self::CatalogIo { .. } | Self::InvalidConfig(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to return to clients.
    ///
    /// Catalog and config failures can leak file paths, so server errors get a
    /// generic message.
    fn safe_message(&self) -> String {
        if self.is_server_error() {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for EntitlementError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                status = status.as_u16(),
                error_id = %error_id,
                error = %self,
                "entitlement request failed"
            );
        } else {
            tracing::debug!(
                status = status.as_u16(),
                error_id = %error_id,
                error = %self,
                "entitlement request denied"
            );
        }

        let (feature, resource, current_plan) = match &self {
            Self::UpgradeRequired { feature, current, .. } => (Some(*feature), None, Some(*current)),
            Self::LimitReached { resource, plan, .. } => (None, Some(*resource), Some(*plan)),
            _ => (None, None, None),
        };

        let body = ErrorResponse {
            error: self.safe_message(),
            error_id,
            feature,
            resource,
            current_plan,
            required_plan: self.required_plan(),
        };

        (status, Json(body)).into_response()
    }
}
