//! Permission evaluation
//!
//! [`AccessResolver`] answers "may this role perform this action on this
//! resource" against a shared, immutable [`PolicyTable`].

use crate::access_control::policy::PolicyTable;
use crate::access_control::types::{AccessRule, Action, Resource};
use crate::error::AccessDeniedError;
use std::sync::Arc;
use tracing::trace;

/// Permission evaluator
///
/// Cheap to clone; every clone shares the same table.
#[derive(Debug, Clone)]
pub struct AccessResolver {
    table: Arc<PolicyTable>,
}

/// Result of access check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Access is allowed
    Allowed,
    /// Access is denied with a reason (for logs, never for the caller)
    Denied(String),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, AccessDecision::Denied(_))
    }
}

impl AccessResolver {
    /// Create a resolver over a policy table
    pub fn new(table: PolicyTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    /// Resolver over the built-in clinical policy
    pub fn clinical_default() -> Self {
        Self::new(PolicyTable::clinical_default())
    }

    /// The underlying table
    pub fn table(&self) -> &PolicyTable {
        &self.table
    }

    /// Check whether a role may perform an action on a resource
    pub fn check(&self, role: &str, resource: Resource, action: Action) -> AccessDecision {
        if !self.table.contains_role(role) {
            trace!(role, "Role not present in policy");
            return AccessDecision::Denied(format!("role '{}' has no rules", role));
        }

        let Some(rule) = self
            .table
            .rules_for(role)
            .iter()
            .find(|rule| rule.resource == resource)
        else {
            return AccessDecision::Denied(format!("no rule for resource '{}'", resource));
        };

        if rule.permits(action) {
            AccessDecision::Allowed
        } else {
            AccessDecision::Denied(format!(
                "rule for '{}' does not grant '{}'",
                resource, action
            ))
        }
    }

    /// Boolean form of [`check`](Self::check)
    pub fn is_allowed(&self, role: &str, resource: Resource, action: Action) -> bool {
        self.table.is_allowed(role, resource, action)
    }

    /// Check using raw names. Names outside the known sets are denied.
    pub fn is_allowed_by_name(&self, role: &str, resource: &str, action: &str) -> bool {
        match (Resource::try_parse(resource), Action::try_parse(action)) {
            (Some(resource), Some(action)) => self.is_allowed(role, resource, action),
            _ => false,
        }
    }

    /// Check access, returning an error carrying the audit fields if denied
    pub fn require(
        &self,
        role: &str,
        resource: Resource,
        action: Action,
    ) -> Result<(), AccessDeniedError> {
        match self.check(role, resource, action) {
            AccessDecision::Allowed => Ok(()),
            AccessDecision::Denied(_) => Err(AccessDeniedError::new(
                role,
                resource.as_str(),
                action.as_str(),
            )),
        }
    }

    /// Everything a role may do, in policy order. Unknown roles get an empty
    /// list.
    pub fn permissions_for(&self, role: &str) -> &[AccessRule] {
        self.table.rules_for(role)
    }
}
