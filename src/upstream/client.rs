//! Downstream CRUD service client
//!
//! Relays requests the gate has allowed to the service that owns the
//! clinical records, and relays its answers back unchanged.

use crate::config::UpstreamConfig;
use crate::error::{UpstreamError, UpstreamResult};
use axum::body::Body;
use axum::extract::Request;
use axum::http::{HeaderMap, header};
use axum::response::Response;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Headers that describe a single connection and must not be relayed
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Client for the downstream CRUD service
pub struct UpstreamClient {
    http: Client,
    base_url: String,
    timeout_secs: u64,
    max_body_bytes: usize,
}

impl UpstreamClient {
    /// Create a new client from configuration
    pub fn new(config: &UpstreamConfig) -> UpstreamResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(UpstreamError::Request)?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// Base URL requests are relayed to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the downstream URL for a path and query
    fn url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }

    /// Relay a request and return the downstream response.
    ///
    /// Method, path, query, body and end-to-end headers pass through as they
    /// arrived.
    #[instrument(skip(self, request), fields(method = %request.method(), path = %request.uri().path()))]
    pub async fn forward(&self, request: Request) -> UpstreamResult<Response> {
        let (parts, body) = request.into_parts();

        let target = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let url = self.url(target);

        let body = axum::body::to_bytes(body, self.max_body_bytes)
            .await
            .map_err(|e| UpstreamError::Body(e.to_string()))?;

        let mut headers = parts.headers;
        strip_hop_by_hop(&mut headers);
        headers.remove(header::HOST);
        headers.remove(header::CONTENT_LENGTH);

        debug!(url = %url, "Forwarding request downstream");

        let response = self
            .http
            .request(parts.method, &url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UpstreamError::Timeout {
                        timeout_secs: self.timeout_secs,
                    }
                } else {
                    warn!("Downstream request failed: {}", e);
                    UpstreamError::Request(e)
                }
            })?;

        let status = response.status();
        let mut headers = response.headers().clone();
        strip_hop_by_hop(&mut headers);
        headers.remove(header::CONTENT_LENGTH);

        let bytes = response.bytes().await.map_err(UpstreamError::Request)?;

        let mut relayed = Response::new(Body::from(bytes));
        *relayed.status_mut() = status;
        *relayed.headers_mut() = headers;

        Ok(relayed)
    }
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(*name);
    }
}
