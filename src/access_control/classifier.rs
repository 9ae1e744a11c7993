//! Request classification
//!
//! Derives the governed (resource, action) pair from a request path and
//! method.
//!
//! Resource names match exactly and case-sensitively, so `/api/v1/RECETAS`
//! is ungoverned. The downstream service must route case-sensitively too, or
//! such a path reaches a governed collection unchecked.

use crate::access_control::types::{Action, Resource};
use axum::http::Method;

/// What a request touches and how
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub resource: Resource,
    pub action: Action,
}

/// Classify a request.
///
/// Segments are scanned left to right, skipping empty ones, and the first
/// segment naming a known resource wins; non-matching segments such as `api`
/// or `v1` do not stop the scan. Returns `None` when no segment names a
/// resource, which callers treat as an ungoverned route.
pub fn classify(path: &str, method: &Method) -> Option<Classification> {
    let resource = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .find_map(Resource::try_parse)?;

    Some(Classification {
        resource,
        action: Action::from_method(method),
    })
}

/// Whether the path has a `.` or `..` segment, literal or percent-encoded.
///
/// HTTP clients resolve these before sending, so the path the downstream
/// service sees would differ from the one that was classified. Backslashes
/// count as separators because URL parsers treat them that way for http(s).
pub fn has_dot_segment(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| {
        let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
        decoded == "." || decoded == ".."
    })
}
