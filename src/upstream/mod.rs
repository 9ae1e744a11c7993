//! Downstream CRUD service
//!
//! The gateway owns no records; allowed requests are handed to this client.

pub mod client;

pub use client::UpstreamClient;
