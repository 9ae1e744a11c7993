//! Gateway configuration
//!
//! Server, downstream, identity header, policy and logging settings, layered
//! from defaults, a TOML file and `CLINICA_GATE__*` environment variables.

pub mod loader;
pub mod types;

pub use loader::{apply_overrides, load_config, load_config_from_str, validate_config};
pub use types::*;
