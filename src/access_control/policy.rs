//! Role policy table
//!
//! Maps each role to an ordered list of [`AccessRule`]s. The table is built
//! once at startup and only read afterwards.

use crate::access_control::types::{AccessRule, Action, Resource};
use crate::config::PolicyConfig;
use crate::error::ConfigError;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Immutable role → rules mapping
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    roles: HashMap<String, Vec<AccessRule>>,
}

impl PolicyTable {
    /// Build a table from explicit rule lists.
    ///
    /// A resource listed twice for the same role is kept as written; only the
    /// first occurrence is ever consulted.
    pub fn new<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = (R, Vec<AccessRule>)>,
        R: Into<String>,
    {
        let roles: HashMap<String, Vec<AccessRule>> =
            roles.into_iter().map(|(r, rules)| (r.into(), rules)).collect();

        for (role, rules) in &roles {
            let mut seen = HashSet::new();
            for rule in rules {
                if !seen.insert(rule.resource) {
                    warn!(
                        role = %role,
                        resource = %rule.resource,
                        "Duplicate rule for resource; only the first one applies"
                    );
                }
            }
        }

        Self { roles }
    }

    /// The clinical policy shipped with the gateway
    pub fn clinical_default() -> Self {
        use Action::{Create, Delete, Read, Update};
        use Resource::*;

        Self::new([
            (
                "admin",
                vec![
                    AccessRule::full(Usuarios),
                    AccessRule::full(Consultorios),
                    AccessRule::full(Consultas),
                    AccessRule::full(Expedientes),
                    AccessRule::full(Horarios),
                    AccessRule::full(Recetas),
                    AccessRule::new(Logs, &[Read, Delete]),
                ],
            ),
            (
                "medico",
                vec![
                    AccessRule::new(Consultorios, &[Read]),
                    AccessRule::full(Consultas),
                    AccessRule::new(Expedientes, &[Read, Create, Update]),
                    AccessRule::full(Horarios),
                    AccessRule::full(Recetas),
                ],
            ),
            (
                "enfermera",
                vec![
                    AccessRule::new(Consultorios, &[Read]),
                    AccessRule::new(Consultas, &[Read, Create, Update]),
                    AccessRule::new(Expedientes, &[Read, Create, Update]),
                    AccessRule::new(Horarios, &[Read]),
                    AccessRule::new(Recetas, &[Read, Create, Update]),
                ],
            ),
            (
                "paciente",
                vec![
                    AccessRule::new(Consultas, &[Read]),
                    AccessRule::new(Expedientes, &[Read]),
                    AccessRule::new(Recetas, &[Read]),
                    AccessRule::new(Usuarios, &[Read]),
                    AccessRule::new(Consultorios, &[Read]),
                ],
            ),
        ])
    }

    /// Build the table from configuration.
    ///
    /// An empty `[policy]` section yields the built-in clinical policy; a
    /// non-empty one replaces it entirely.
    pub fn from_config(config: &PolicyConfig) -> Result<Self, ConfigError> {
        if config.roles.is_empty() {
            return Ok(Self::clinical_default());
        }

        let mut roles = Vec::with_capacity(config.roles.len());
        for (role, rule_configs) in &config.roles {
            if role.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    message: "policy role names must not be empty".to_string(),
                });
            }

            let mut rules = Vec::with_capacity(rule_configs.len());
            for rule in rule_configs {
                let resource =
                    Resource::try_parse(&rule.resource).ok_or_else(|| ConfigError::Invalid {
                        message: format!(
                            "Unknown resource '{}' in policy for role '{}'",
                            rule.resource, role
                        ),
                    })?;

                if rule.actions.is_empty() {
                    return Err(ConfigError::Invalid {
                        message: format!(
                            "Rule for '{}' in role '{}' grants no actions",
                            rule.resource, role
                        ),
                    });
                }

                let actions = rule
                    .actions
                    .iter()
                    .map(|name| {
                        Action::try_parse(name).ok_or_else(|| ConfigError::Invalid {
                            message: format!(
                                "Unknown action '{}' for '{}' in role '{}'",
                                name, rule.resource, role
                            ),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                rules.push(AccessRule::new(resource, &actions));
            }
            roles.push((role.clone(), rules));
        }

        Ok(Self::new(roles))
    }

    /// Rules for a role, in evaluation order. Unknown roles have none.
    pub fn rules_for(&self, role: &str) -> &[AccessRule] {
        self.roles.get(role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the role appears in the table at all
    pub fn contains_role(&self, role: &str) -> bool {
        self.roles.contains_key(role)
    }

    /// Configured role names, sorted
    pub fn roles(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.roles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Evaluate a request against the table.
    ///
    /// The first rule naming the resource decides; later rules for the same
    /// resource are never consulted. Unknown roles and unlisted resources are
    /// denied.
    pub fn is_allowed(&self, role: &str, resource: Resource, action: Action) -> bool {
        let Some(rules) = self.roles.get(role) else {
            return false;
        };

        rules
            .iter()
            .find(|rule| rule.resource == resource)
            .is_some_and(|rule| rule.permits(action))
    }
}
