//! Trusted header identity
//!
//! Reads the identity that the fronting authentication proxy writes into
//! request headers after validating the caller's token. Only deploy this
//! provider behind such a proxy: the headers are taken at face value.

use crate::auth::identity::Identity;
use crate::auth::provider::IdentityProvider;
use crate::config::AuthConfig;
use crate::error::{AuthError, ConfigError};
use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderName};

/// Identity provider backed by proxy-set headers
#[derive(Debug, Clone)]
pub struct TrustedHeaderProvider {
    role_header: HeaderName,
    user_id_header: HeaderName,
}

impl TrustedHeaderProvider {
    /// Create a provider reading the given headers
    pub fn new(role_header: &str, user_id_header: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            role_header: parse_header_name(role_header)?,
            user_id_header: parse_header_name(user_id_header)?,
        })
    }

    /// Create from the `[auth]` configuration section
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        Self::new(&config.role_header, &config.user_id_header)
    }

    pub fn role_header(&self) -> &HeaderName {
        &self.role_header
    }

    pub fn user_id_header(&self) -> &HeaderName {
        &self.user_id_header
    }
}

fn parse_header_name(name: &str) -> Result<HeaderName, ConfigError> {
    HeaderName::from_bytes(name.trim().as_bytes()).map_err(|e| ConfigError::Invalid {
        message: format!("invalid header name '{}': {}", name, e),
    })
}

#[async_trait]
impl IdentityProvider for TrustedHeaderProvider {
    async fn identify(&self, headers: &HeaderMap) -> Result<Option<Identity>, AuthError> {
        let Some(role) = headers.get(&self.role_header) else {
            return Ok(None);
        };

        let role = role
            .to_str()
            .map_err(|_| AuthError::InvalidRole)?
            .trim();
        if role.is_empty() {
            return Err(AuthError::InvalidRole);
        }

        let raw_id = headers
            .get(&self.user_id_header)
            .ok_or_else(|| AuthError::InvalidUserId("missing".to_string()))?
            .to_str()
            .map_err(|_| AuthError::InvalidUserId("not valid UTF-8".to_string()))?;

        let user_id = raw_id
            .trim()
            .parse::<i64>()
            .map_err(|_| AuthError::InvalidUserId(raw_id.to_string()))?;

        Ok(Some(Identity::new(role, user_id)))
    }

    fn provider_type(&self) -> &'static str {
        "Trusted proxy headers"
    }
}
