//! Router assembly
//!
//! ```text
//! GET /health                      → liveness, no identity needed
//! GET {prefix}/user/permissions    → introspection, identity required
//! *                                → access gate → downstream CRUD service
//! ```

use crate::access_control::{AccessResolver, AccessRule};
use crate::auth::{Identity, SharedIdentityProvider};
use crate::config::ServerConfig;
use crate::server::authenticate::authenticate;
use crate::server::gate::access_gate;
use crate::server::response::ApiError;
use crate::upstream::UpstreamClient;
use axum::extract::{Request, State};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router, middleware};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state for the gateway router
#[derive(Clone)]
pub struct AppState {
    pub resolver: AccessResolver,
    pub upstream: Arc<UpstreamClient>,
    pub identity: SharedIdentityProvider,
}

/// Body of the permission introspection endpoint
#[derive(Debug, Clone, Serialize)]
pub struct PermissionsResponse {
    pub user_type: String,
    pub permissions: Vec<AccessRule>,
}

/// Body of the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Build the full gateway router
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    let downstream = Router::new()
        .fallback(forward_downstream)
        .layer(middleware::from_fn_with_state(
            state.resolver.clone(),
            access_gate,
        ))
        .with_state(state.upstream.clone());

    Router::new()
        .route("/health", get(health))
        .route(&server.permissions_path(), get(user_permissions))
        .with_state(state.resolver.clone())
        .fallback_service(downstream)
        .layer(middleware::from_fn_with_state(
            state.identity.clone(),
            authenticate,
        ))
        .layer(TraceLayer::new_for_http())
}

/// Liveness probe
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Clinical records gateway is running",
    })
}

/// Everything the calling role may do, for client-side UI hints
pub async fn user_permissions(
    State(resolver): State<AccessResolver>,
    identity: Identity,
) -> Json<PermissionsResponse> {
    let permissions = resolver.permissions_for(&identity.role).to_vec();
    Json(PermissionsResponse {
        user_type: identity.role,
        permissions,
    })
}

/// Hand an allowed request to the CRUD service
async fn forward_downstream(
    State(upstream): State<Arc<UpstreamClient>>,
    request: Request,
) -> Result<Response, ApiError> {
    Ok(upstream.forward(request).await?)
}
