//! Clinical records RBAC gateway
//!
//! A role-based access control gate in front of a CRUD API for clinical
//! records: users, consulting rooms, consultations, medical records,
//! schedules, prescriptions and logs.
//!
//! ## Features
//!
//! - **Static role policy** built once at startup and shared read-only
//! - **Path/method classification** into a (resource, action) pair
//! - **axum middleware** that allows, or rejects with a structured 403
//! - **Permission introspection** endpoint for client-side UI hints
//! - **Gateway binary** that relays allowed requests to the CRUD service
//!
//! ## Decision Model
//!
//! ```text
//! identity? ── no ──▶ 403 { error }
//!    │
//!   yes ─▶ classify(path, method) ── none ──▶ pass through
//!              │
//!      (resource, action) ─▶ first rule for resource grants action?
//!                                 ├─ yes ─▶ pass through
//!                                 └─ no  ─▶ 403 { error, details }
//! ```
//!
//! ## Using the gate in another axum app
//!
//! ```no_run
//! use axum::{Router, middleware, routing::get};
//! use clinica_gate::access_control::AccessResolver;
//! use clinica_gate::server::access_gate;
//!
//! let resolver = AccessResolver::clinical_default();
//! let app: Router = Router::new()
//!     .route("/api/v1/recetas", get(|| async { "[]" }))
//!     .layer(middleware::from_fn_with_state(resolver, access_gate));
//! ```
//!
//! An upstream layer must have stored an [`auth::Identity`] in the request
//! extensions; requests without one are rejected.

pub mod access_control;
pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod upstream;

// Re-export main types
pub use access_control::{AccessResolver, PolicyTable};
pub use config::{AppConfig, load_config};
pub use error::{AppError, Result};
pub use server::{AppState, build_router};
