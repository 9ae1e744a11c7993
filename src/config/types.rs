//! Configuration types for clinica-gate
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use serde::Deserialize;
use std::collections::HashMap;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,

    /// Downstream CRUD service
    pub upstream: UpstreamConfig,

    /// Where the authentication proxy puts the caller identity
    pub auth: AuthConfig,

    /// Role policy (replaces the built-in table when non-empty)
    pub policy: PolicyConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Values given on the command line, which win over every other source
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub upstream_url: Option<String>,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Prefix of the versioned API (introspection lives under it)
    pub api_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            api_prefix: "/api/v1".to_string(),
        }
    }
}

impl ServerConfig {
    /// Path of the permission introspection endpoint
    pub fn permissions_path(&self) -> String {
        format!("{}/user/permissions", self.api_prefix.trim_end_matches('/'))
    }
}

/// Downstream CRUD service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the CRUD service (e.g., `http://127.0.0.1:8080`)
    pub url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Largest request body relayed downstream
    pub max_body_bytes: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8080".to_string(),
            timeout_secs: 30,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Identity header configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Header carrying the caller's role
    pub role_header: String,

    /// Header carrying the caller's numeric user id
    pub user_id_header: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            role_header: "x-user-role".to_string(),
            user_id_header: "x-user-id".to_string(),
        }
    }
}

/// Role policy configuration
///
/// ```toml
/// [[policy.roles.medico]]
/// resource = "recetas"
/// actions = ["read", "create", "update", "delete"]
/// ```
///
/// Rules keep the order they are written in; the first rule for a resource
/// is the one that counts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub roles: HashMap<String, Vec<RuleConfig>>,
}

/// A single configured rule, validated when the policy table is built
#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    pub resource: String,
    pub actions: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}
