//! Error responses
//!
//! Every rejection the gateway produces goes through [`ApiError`], so the
//! JSON shapes stay fixed:
//!
//! - identity problems and ambiguous paths: `403 { "error" }`
//! - policy denials: `403 { "error", "details": { "user_type", "resource", "action" } }`
//! - downstream failures: `502`/`504 { "error" }`

use crate::error::{AccessDeniedError, AuthError, UpstreamError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::error;

// Client-facing messages are the strings existing clients already match on.

/// Message returned when the request carries no usable identity
pub const INVALID_IDENTITY_MESSAGE: &str = "Tipo de usuario no válido";

/// Message returned when the policy denies the request
pub const FORBIDDEN_MESSAGE: &str = "No tienes permisos para acceder a este recurso";

/// Message returned when the path has `.` or `..` segments
pub const INVALID_PATH_MESSAGE: &str = "Ruta de solicitud no válida";

/// Message returned when the downstream service cannot be reached
pub const UPSTREAM_UNAVAILABLE_MESSAGE: &str = "Servicio no disponible";

/// Message returned when the downstream service does not answer in time
pub const UPSTREAM_TIMEOUT_MESSAGE: &str = "El servicio no respondió a tiempo";

/// JSON error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<DenialDetails>,
}

/// Audit fields attached to a policy denial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenialDetails {
    pub user_type: String,
    pub resource: String,
    pub action: String,
}

impl From<AccessDeniedError> for DenialDetails {
    fn from(err: AccessDeniedError) -> Self {
        Self {
            user_type: err.role,
            resource: err.resource,
            action: err.action,
        }
    }
}

/// Request-terminating error
#[derive(Debug)]
pub enum ApiError {
    /// Identity missing or unusable
    Unauthenticated(AuthError),
    /// Path the gate cannot classify the same way the downstream service routes it
    AmbiguousPath,
    /// Policy denied the request
    Forbidden(AccessDeniedError),
    /// Downstream service failed
    Upstream(UpstreamError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            // 403 rather than 401 so clients see one "forbidden" class
            ApiError::Unauthenticated(_) | ApiError::AmbiguousPath | ApiError::Forbidden(_) => {
                StatusCode::FORBIDDEN
            }
            ApiError::Upstream(UpstreamError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn body(self) -> ErrorBody {
        match self {
            ApiError::Unauthenticated(_) => ErrorBody {
                error: INVALID_IDENTITY_MESSAGE.to_string(),
                details: None,
            },
            ApiError::AmbiguousPath => ErrorBody {
                error: INVALID_PATH_MESSAGE.to_string(),
                details: None,
            },
            ApiError::Forbidden(denied) => ErrorBody {
                error: FORBIDDEN_MESSAGE.to_string(),
                details: Some(denied.into()),
            },
            ApiError::Upstream(UpstreamError::Timeout { .. }) => ErrorBody {
                error: UPSTREAM_TIMEOUT_MESSAGE.to_string(),
                details: None,
            },
            ApiError::Upstream(_) => ErrorBody {
                error: UPSTREAM_UNAVAILABLE_MESSAGE.to_string(),
                details: None,
            },
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthenticated(err)
    }
}

impl From<AccessDeniedError> for ApiError {
    fn from(err: AccessDeniedError) -> Self {
        ApiError::Forbidden(err)
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        ApiError::Upstream(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Upstream(err) = &self {
            // Details stay server-side
            error!(error = %err, "Downstream request failed");
        }
        let status = self.status();
        (status, Json(self.body())).into_response()
    }
}
