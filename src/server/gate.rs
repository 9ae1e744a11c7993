//! Access gate middleware
//!
//! Runs on every protected request:
//! 1. read the caller's role (reject with 403 if there is none)
//! 2. reject paths with `.`/`..` segments, then classify the request
//!    (unclassified routes pass through)
//! 3. evaluate the policy (deny with 403 and audit details, or pass through)
//!
//! Allowed requests reach the next service exactly as they arrived.

use crate::access_control::{
    AccessDecision, AccessResolver, Classification, classify, has_dot_segment,
};
use crate::auth::Identity;
use crate::error::AccessDeniedError;
use crate::server::response::ApiError;
use axum::extract::{OriginalUri, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, info, warn};

/// Gate a request against the role policy
pub async fn access_gate(
    State(resolver): State<AccessResolver>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.path().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let role = match Identity::role_from_extensions(request.extensions()) {
        Ok(role) => role.to_string(),
        Err(err) => {
            warn!(
                method = %method,
                path = %path,
                error = %err,
                outcome = "reject",
                "Request has no usable identity"
            );
            return ApiError::from(err).into_response();
        }
    };

    if has_dot_segment(&path) {
        warn!(
            method = %method,
            path = %path,
            role = %role,
            outcome = "reject",
            "Path has dot segments"
        );
        return ApiError::AmbiguousPath.into_response();
    }

    let Some(Classification { resource, action }) = classify(&path, &method) else {
        debug!(
            method = %method,
            path = %path,
            role = %role,
            outcome = "ungoverned",
            "Route not governed by policy"
        );
        return next.run(request).await;
    };

    match resolver.check(&role, resource, action) {
        AccessDecision::Allowed => {
            info!(
                method = %method,
                path = %path,
                role = %role,
                resource = %resource,
                action = %action,
                outcome = "allow",
                "Access granted"
            );
            next.run(request).await
        }
        AccessDecision::Denied(reason) => {
            warn!(
                method = %method,
                path = %path,
                role = %role,
                resource = %resource,
                action = %action,
                outcome = "deny",
                reason = %reason,
                "Access denied"
            );
            ApiError::from(AccessDeniedError::new(
                role,
                resource.as_str(),
                action.as_str(),
            ))
            .into_response()
        }
    }
}
