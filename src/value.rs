// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deferred Provider Values
//!
//! Identifiers and addresses in a provisioning plan are assigned by the
//! cloud provider at apply time, so the plan cannot carry them as literals.
//! [`Value`] stands in for them: a literal string, a reference to an
//! attribute of a resource in the same stack, an import of another stack's
//! named export, or a concatenation mixing literals with deferred parts.
//!
//! The external provisioning engine resolves refs and imports when it
//! applies the plan; concatenations resolve once every part has.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource attribute a [`Value::Ref`] can resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Provider-assigned resource identifier
    Id,
    /// Private address of an instance
    PrivateIp,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Id => write!(f, "id"),
            Attribute::PrivateIp => write!(f, "private_ip"),
        }
    }
}

/// A value that may only be known at apply time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// Plain literal, known at plan-construction time
    Literal(String),
    /// Attribute of a resource in the same stack
    Ref { resource: String, attribute: Attribute },
    /// Named export published by another stack
    Import { export: String },
    /// Concatenation of parts, resolved once every part is
    Concat(Vec<Value>),
}

impl Value {
    /// A literal value
    pub fn literal(value: impl Into<String>) -> Self {
        Value::Literal(value.into())
    }

    /// A reference to an attribute of a resource in the same stack
    pub fn reference(resource: impl Into<String>, attribute: Attribute) -> Self {
        Value::Ref {
            resource: resource.into(),
            attribute,
        }
    }

    /// An import of a named cross-stack export
    pub fn import(export: impl Into<String>) -> Self {
        Value::Import {
            export: export.into(),
        }
    }

    /// A concatenation of literal and deferred parts
    pub fn concat(parts: impl IntoIterator<Item = Value>) -> Self {
        Value::Concat(parts.into_iter().collect())
    }

    /// Whether this value is fully known at plan-construction time
    pub fn is_resolved(&self) -> bool {
        match self {
            Value::Literal(_) => true,
            Value::Ref { .. } | Value::Import { .. } => false,
            Value::Concat(parts) => parts.iter().all(Value::is_resolved),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Literal(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Literal(value)
    }
}
