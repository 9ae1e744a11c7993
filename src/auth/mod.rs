//! Caller identity
//!
//! Token validation is the job of the authentication proxy in front of the
//! gateway. This module only carries its result: a typed [`Identity`] in the
//! request extensions, resolved by an [`IdentityProvider`].

pub mod headers;
pub mod identity;
pub mod provider;

pub use headers::TrustedHeaderProvider;
pub use identity::Identity;
pub use provider::{IdentityProvider, SharedIdentityProvider};

use crate::config::AuthConfig;
use crate::error::ConfigError;
use std::sync::Arc;

/// Create an identity provider from configuration
pub fn create_identity_provider(
    config: &AuthConfig,
) -> Result<SharedIdentityProvider, ConfigError> {
    Ok(Arc::new(TrustedHeaderProvider::from_config(config)?))
}
