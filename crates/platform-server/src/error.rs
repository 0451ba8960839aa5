//! API error types
//!
//! This module provides the transport-facing error taxonomy. Every
//! internal failure is folded into one of six categories, each with a
//! stable HTTP status and machine-readable code, so handlers never leak
//! storage or policy internals.

use thiserror::Error;

use platform_moderation::TransitionError;
use platform_policy::{DenyReason, Verdict};
use platform_roles::RoleError;

use crate::identity::IdentityError;
use crate::store::StoreError;

/// Errors surfaced to API callers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// No valid credential was presented
    #[error("authentication required")]
    Unauthenticated,

    /// Valid credential, insufficient role or ownership
    #[error("operation not permitted")]
    Forbidden,

    /// The resource does not exist, or its existence is masked
    #[error("resource not found")]
    NotFound,

    /// The operation is illegal in the resource's current state
    #[error("conflict: {0}")]
    Conflict(String),

    /// The request shape is invalid
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// Unexpected internal failure
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict(_) => 409,
            Self::ValidationFailed(_) => 422,
            Self::Internal(_) => 500,
        }
    }

    /// Get the machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict(_) => "conflict",
            Self::ValidationFailed(_) => "validation_failed",
            Self::Internal(_) => "internal",
        }
    }

    /// Convert a policy denial into its transport error.
    ///
    /// [`DenyReason::Hidden`] maps to [`ApiError::NotFound`]: a caller
    /// without read access must not learn whether the item exists.
    pub fn from_denial(reason: DenyReason) -> Self {
        match reason {
            DenyReason::Unauthenticated => Self::Unauthenticated,
            DenyReason::Forbidden => Self::Forbidden,
            DenyReason::Hidden => Self::NotFound,
        }
    }
}

/// Turn a policy verdict into an early return.
pub fn require(verdict: Verdict) -> ApiResult<()> {
    match verdict {
        Verdict::Allow => Ok(()),
        Verdict::Deny(reason) => Err(ApiError::from_denial(reason)),
    }
}

impl From<TransitionError> for ApiError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Conflict { .. } => Self::Conflict(err.to_string()),
            TransitionError::NotModerator { .. } | TransitionError::NotOwner { .. } => {
                Self::Forbidden
            }
        }
    }
}

impl From<RoleError> for ApiError {
    fn from(err: RoleError) -> Self {
        Self::Conflict(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound,
            StoreError::Backend(message) => Self::Internal(message),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(_: IdentityError) -> Self {
        Self::Unauthenticated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Unauthenticated.status_code(), 401);
        assert_eq!(ApiError::Forbidden.status_code(), 403);
        assert_eq!(ApiError::NotFound.status_code(), 404);
        assert_eq!(ApiError::Conflict("x".into()).status_code(), 409);
        assert_eq!(ApiError::ValidationFailed("x".into()).status_code(), 422);
        assert_eq!(ApiError::Internal("x".into()).status_code(), 500);
    }

    #[test]
    fn test_hidden_denials_mask_existence() {
        assert_eq!(ApiError::from_denial(DenyReason::Hidden), ApiError::NotFound);
        assert_eq!(
            ApiError::from_denial(DenyReason::Unauthenticated),
            ApiError::Unauthenticated
        );
        assert_eq!(
            ApiError::from_denial(DenyReason::Forbidden),
            ApiError::Forbidden
        );
    }

    #[test]
    fn test_transition_conflicts_map_to_conflict() {
        let err = TransitionError::Conflict {
            action: "approve",
            status: "rejected",
        };
        assert!(matches!(ApiError::from(err), ApiError::Conflict(_)));
        assert_eq!(
            ApiError::from(TransitionError::NotOwner { action: "edit" }),
            ApiError::Forbidden
        );
    }

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        assert_eq!(ApiError::from(StoreError::NotFound), ApiError::NotFound);
        assert!(matches!(
            ApiError::from(StoreError::Backend("down".into())),
            ApiError::Internal(_)
        ));
    }
}
