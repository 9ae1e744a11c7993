//! Configuration loader with layered sources
//!
//! Loads configuration from multiple sources with the following precedence
//! (highest to lowest):
//! 1. Environment variables (CLINICA_GATE__*)
//! 2. Configuration file (TOML)
//! 3. Default values

use crate::access_control::PolicyTable;
use crate::config::types::{AppConfig, ConfigOverrides};
use crate::error::ConfigError;
use config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "clinica-gate.toml",
    ".clinica-gate.toml",
    "~/.config/clinica-gate/config.toml",
    "/etc/clinica-gate/config.toml",
];

/// Environment variable prefix; `__` separates nested keys
const ENV_PREFIX: &str = "CLINICA_GATE";

/// Load configuration from a TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(toml_str, FileFormat::Toml))
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Load configuration from files and environment
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        // Explicit path provided - must exist
        if !Path::new(path).exists() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        builder = builder.add_source(File::new(path, FileFormat::Toml));
    } else {
        // Try default paths (first existing one wins)
        for path in DEFAULT_CONFIG_PATHS {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
                break;
            }
        }
    }

    // e.g., CLINICA_GATE__SERVER__PORT, CLINICA_GATE__UPSTREAM__URL
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Apply command-line overrides on top of a loaded configuration and
/// validate the result again
pub fn apply_overrides(
    mut config: AppConfig,
    overrides: ConfigOverrides,
) -> Result<AppConfig, ConfigError> {
    if let Some(host) = overrides.host {
        config.server.host = host;
    }
    if let Some(port) = overrides.port {
        config.server.port = port;
    }
    if let Some(url) = overrides.upstream_url {
        config.upstream.url = url;
    }

    validate_config(&config)?;

    Ok(config)
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.upstream.url.is_empty() {
        return Err(ConfigError::Missing {
            field: "upstream.url".to_string(),
        });
    }

    if !config.upstream.url.starts_with("http://") && !config.upstream.url.starts_with("https://")
    {
        return Err(ConfigError::Invalid {
            message: format!(
                "upstream.url must start with http:// or https://, got: {}",
                config.upstream.url
            ),
        });
    }

    if config.upstream.timeout_secs == 0 {
        return Err(ConfigError::Invalid {
            message: "upstream.timeout_secs must be greater than 0".to_string(),
        });
    }

    if config.server.port == 0 {
        return Err(ConfigError::Invalid {
            message: "server.port must be greater than 0".to_string(),
        });
    }

    if !config.server.api_prefix.starts_with('/') {
        return Err(ConfigError::Invalid {
            message: format!(
                "server.api_prefix must start with '/', got: {}",
                config.server.api_prefix
            ),
        });
    }

    for (field, value) in [
        ("auth.role_header", &config.auth.role_header),
        ("auth.user_id_header", &config.auth.user_id_header),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: field.to_string(),
            });
        }
        if axum::http::HeaderName::from_bytes(value.as_bytes()).is_err() {
            return Err(ConfigError::Invalid {
                message: format!("{} is not a valid header name: {}", field, value),
            });
        }
    }

    // Surface policy mistakes at startup rather than on the first request
    PolicyTable::from_config(&config.policy)?;

    Ok(())
}
