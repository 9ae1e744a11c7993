//! Clinical records RBAC gateway
//!
//! Sits behind the authentication proxy and in front of the CRUD service.

use clap::Parser;
use clinica_gate::{
    access_control::{AccessResolver, PolicyTable},
    auth::create_identity_provider,
    config::{AppConfig, ConfigOverrides, LogFormat, apply_overrides, load_config},
    server::{AppState, bind_address, build_router, serve},
    upstream::UpstreamClient,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Clinical records gateway - role-based access control in front of the CRUD API
#[derive(Parser, Debug)]
#[command(name = "clinica-gate")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "CLINICA_GATE_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); defaults to logging.level
    #[arg(long, env = "CLINICA_GATE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Bind host; defaults to server.host
    #[arg(long, env = "CLINICA_GATE_HOST")]
    host: Option<String>,

    /// Bind port; defaults to server.port
    #[arg(long, env = "CLINICA_GATE_PORT")]
    port: Option<u16>,

    /// Base URL of the CRUD service; defaults to upstream.url
    #[arg(long, env = "CLINICA_GATE_UPSTREAM_URL")]
    upstream_url: Option<String>,
}

fn init_logging(config: &AppConfig, level_override: Option<&str>) {
    let level = level_override.unwrap_or(&config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Logging is configured from the file, so load it before anything logs
    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return Err(e.into());
        }
    };

    init_logging(&config, args.log_level.as_deref());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting clinical records gateway"
    );

    // CLI flags win over the file and are held to the same checks
    let overrides = ConfigOverrides {
        host: args.host,
        port: args.port,
        upstream_url: args.upstream_url,
    };
    let config = apply_overrides(config, overrides)
        .inspect_err(|e| error!(error = %e, "Invalid command-line override"))?;

    // Build the policy once; it is read-only from here on
    let table = PolicyTable::from_config(&config.policy)
        .inspect_err(|e| error!(error = %e, "Failed to build policy table"))?;
    info!(roles = ?table.roles(), "Policy loaded");
    let resolver = AccessResolver::new(table);

    let identity = create_identity_provider(&config.auth)
        .inspect_err(|e| error!(error = %e, "Failed to create identity provider"))?;
    info!(provider = identity.provider_type(), "Identity provider ready");

    let upstream = Arc::new(
        UpstreamClient::new(&config.upstream)
            .inspect_err(|e| error!(error = %e, "Failed to create upstream client"))?,
    );
    info!(url = upstream.base_url(), "Relaying allowed requests downstream");

    let bind = bind_address(&config.server.host, config.server.port)
        .inspect_err(|e| error!(error = %e, "Invalid bind address"))?;

    let state = AppState {
        resolver,
        upstream,
        identity,
    };
    let router = build_router(state, &config.server);

    serve(router, bind).await
}
