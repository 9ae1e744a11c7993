//! Access control types
//!
//! Core types used by the access control system.

use axum::http::Method;
use serde::Serialize;
use std::fmt;

/// Protected collection of clinical records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Usuarios,
    Consultorios,
    Consultas,
    Expedientes,
    Horarios,
    Recetas,
    Logs,
}

impl Resource {
    /// Get the canonical resource name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Resource::Usuarios => "usuarios",
            Resource::Consultorios => "consultorios",
            Resource::Consultas => "consultas",
            Resource::Expedientes => "expedientes",
            Resource::Horarios => "horarios",
            Resource::Recetas => "recetas",
            Resource::Logs => "logs",
        }
    }

    /// Try to parse a resource from its canonical name.
    ///
    /// Matching is exact: `Recetas` or `recetas.json` are not resources.
    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "usuarios" => Some(Resource::Usuarios),
            "consultorios" => Some(Resource::Consultorios),
            "consultas" => Some(Resource::Consultas),
            "expedientes" => Some(Resource::Expedientes),
            "horarios" => Some(Resource::Horarios),
            "recetas" => Some(Resource::Recetas),
            "logs" => Some(Resource::Logs),
            _ => None,
        }
    }

    /// Get all resources
    pub fn all() -> &'static [Resource] {
        &[
            Resource::Usuarios,
            Resource::Consultorios,
            Resource::Consultas,
            Resource::Expedientes,
            Resource::Horarios,
            Resource::Recetas,
            Resource::Logs,
        ]
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operation a request performs on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    /// Map an HTTP method to an action.
    ///
    /// Anything that is not a recognised write verb is a read.
    pub fn from_method(method: &Method) -> Self {
        match method.as_str() {
            "POST" => Action::Create,
            "PUT" | "PATCH" => Action::Update,
            "DELETE" => Action::Delete,
            _ => Action::Read,
        }
    }

    /// Get the action name as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    /// Try to parse an action from its name
    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "read" => Some(Action::Read),
            "create" => Some(Action::Create),
            "update" => Some(Action::Update),
            "delete" => Some(Action::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A (resource, allowed actions) pair scoped to one role.
///
/// Serialized with capitalized field names, which is what existing clients of
/// the permissions endpoint read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessRule {
    #[serde(rename = "Resource")]
    pub resource: Resource,
    #[serde(rename = "Actions")]
    pub actions: Vec<Action>,
}

impl AccessRule {
    pub fn new(resource: Resource, actions: &[Action]) -> Self {
        let mut unique = Vec::with_capacity(actions.len());
        for action in actions {
            if !unique.contains(action) {
                unique.push(*action);
            }
        }
        Self {
            resource,
            actions: unique,
        }
    }

    /// Rule granting every action on a resource
    pub fn full(resource: Resource) -> Self {
        Self::new(
            resource,
            &[Action::Read, Action::Create, Action::Update, Action::Delete],
        )
    }

    /// Check whether this rule grants an action
    pub fn permits(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }
}
