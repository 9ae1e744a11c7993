//! Error types for clinica-gate
//!
//! This module defines the error hierarchy used throughout the gateway.
//! We use `thiserror` for library-style errors that are part of the API,
//! and convert to HTTP responses at the boundary (see `server::response`).

use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Access denied: {0}")]
    AccessDenied(#[from] AccessDeniedError),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reading the caller identity attached by the authentication step
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("No identity attached to the request")]
    MissingIdentity,

    #[error("Identity carries an empty role")]
    InvalidRole,

    #[error("Invalid user id: {0}")]
    InvalidUserId(String),
}

/// A rule-based denial.
///
/// Carries only the three audit fields; nothing from the request body or the
/// record being accessed ever ends up here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("role '{role}' may not {action} '{resource}'")]
pub struct AccessDeniedError {
    pub role: String,
    pub resource: String,
    pub action: String,
}

impl AccessDeniedError {
    pub fn new(
        role: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            resource: resource.into(),
            action: action.into(),
        }
    }
}

/// Errors talking to the downstream CRUD service
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upstream request timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    #[error("Failed to relay body: {0}")]
    Body(String),
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for upstream operations
pub type UpstreamResult<T> = std::result::Result<T, UpstreamError>;
