//! Access control module
//!
//! Role-based access control for the clinical records API.
//!
//! ## Access Control Model
//!
//! Every role owns an ordered list of rules, each naming one resource and the
//! actions allowed on it:
//!
//! ```text
//! request path + method → (resource, action) → role's rules → allow / deny
//! ```
//!
//! - The resource is the first path segment that names a known collection
//!   (`/api/v1/recetas/42` → `recetas`). Paths naming none are not governed.
//! - The action comes from the method: `GET` → read, `POST` → create,
//!   `PUT`/`PATCH` → update, `DELETE` → delete, anything else → read.
//! - The first rule naming the resource decides. Unknown roles and unlisted
//!   resources are denied.
//!
//! ## Example Configuration
//!
//! ```toml
//! [[policy.roles.enfermera]]
//! resource = "expedientes"
//! actions = ["read", "create", "update"]
//!
//! [[policy.roles.enfermera]]
//! resource = "horarios"
//! actions = ["read"]
//! ```

pub mod classifier;
pub mod policy;
pub mod resolver;
pub mod types;

pub use classifier::{Classification, classify, has_dot_segment};
pub use policy::PolicyTable;
pub use resolver::{AccessDecision, AccessResolver};
pub use types::{AccessRule, Action, Resource};
