//! Request-scoped caller identity
//!
//! The authentication step stores an [`Identity`] in the request extensions;
//! everything downstream reads it back through [`Identity::from_extensions`]
//! or the axum extractor, never through an untyped lookup.

use crate::error::AuthError;
use crate::server::ApiError;
use axum::extract::FromRequestParts;
use axum::http::Extensions;
use axum::http::request::Parts;

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Role name, the sole input to authorization decisions
    pub role: String,
    /// Numeric user id, for downstream row-level checks
    pub user_id: i64,
}

impl Identity {
    pub fn new(role: impl Into<String>, user_id: i64) -> Self {
        Self {
            role: role.into(),
            user_id,
        }
    }

    /// Read the identity attached to a request.
    ///
    /// Fails when nothing was attached or when the role is blank.
    pub fn from_extensions(extensions: &Extensions) -> Result<&Identity, AuthError> {
        let identity = extensions
            .get::<Identity>()
            .ok_or(AuthError::MissingIdentity)?;

        if identity.role.trim().is_empty() {
            return Err(AuthError::InvalidRole);
        }

        Ok(identity)
    }

    /// Read just the role attached to a request
    pub fn role_from_extensions(extensions: &Extensions) -> Result<&str, AuthError> {
        Self::from_extensions(extensions).map(|identity| identity.role.as_str())
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Identity::from_extensions(&parts.extensions)
            .cloned()
            .map_err(ApiError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_identity() {
        let extensions = Extensions::new();
        assert_eq!(
            Identity::from_extensions(&extensions),
            Err(AuthError::MissingIdentity)
        );
    }

    #[test]
    fn test_blank_role_is_invalid() {
        let mut extensions = Extensions::new();
        extensions.insert(Identity::new("  ", 1));
        assert_eq!(
            Identity::role_from_extensions(&extensions),
            Err(AuthError::InvalidRole)
        );
    }

    #[test]
    fn test_role_is_read_back() {
        let mut extensions = Extensions::new();
        extensions.insert(Identity::new("medico", 12));
        assert_eq!(Identity::role_from_extensions(&extensions), Ok("medico"));
        assert_eq!(Identity::from_extensions(&extensions).unwrap().user_id, 12);
    }

    #[test]
    fn test_other_extension_types_ignored() {
        let mut extensions = Extensions::new();
        extensions.insert(String::from("admin"));
        assert!(Identity::from_extensions(&extensions).is_err());
    }
}
