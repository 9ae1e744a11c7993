//! Identity provider trait
//!
//! Defines how the gateway learns who is calling. Token validation happens
//! outside this crate; a provider only turns whatever the authentication step
//! left on the request into an [`Identity`].

use crate::auth::identity::Identity;
use crate::error::AuthError;
// async_trait required for dyn-compatibility with Arc<dyn IdentityProvider>
use async_trait::async_trait;
use axum::http::HeaderMap;
use std::sync::Arc;

/// Identity provider trait
///
/// Implementations resolve the caller identity for a request.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the caller identity from request headers
    ///
    /// Returns `Ok(None)` for anonymous requests and an error for requests
    /// that carry identity data which cannot be trusted.
    async fn identify(&self, headers: &HeaderMap) -> Result<Option<Identity>, AuthError>;

    /// Get a description of the provider (for logging)
    fn provider_type(&self) -> &'static str;
}

/// Shared provider handle used by the server
pub type SharedIdentityProvider = Arc<dyn IdentityProvider>;
