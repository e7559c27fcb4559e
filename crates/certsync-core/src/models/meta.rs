//! Object metadata shared by every stored resource.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity and bookkeeping fields common to all resources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectMeta {
    pub namespace: String,
    pub name: String,
    /// Store-assigned unique identifier. Owner references point here.
    pub uid: Uuid,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub owner_references: Vec<OwnerReference>,
    pub created_at: DateTime<Utc>,
}

impl ObjectMeta {
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(&self.namespace, &self.name)
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    /// The owner reference flagged as the managing controller, if any.
    pub fn controller_ref(&self) -> Option<&OwnerReference> {
        self.owner_references.iter().find(|r| r.controller)
    }
}

/// A link from a dependent object to the object that owns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OwnerReference {
    pub kind: String,
    pub name: String,
    pub uid: Uuid,
    /// At most one owner reference per object is the controller.
    #[serde(default)]
    pub controller: bool,
}

/// A `namespace/name` pair used to address a single object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

/// Why a key string could not be split into namespace and name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    #[error("key is empty")]
    Empty,
    #[error("key {0:?} has too many segments")]
    TooManySegments(String),
    #[error("key {0:?} has an empty segment")]
    EmptySegment(String),
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Split a `namespace/name` key. A bare `name` resolves into
    /// `default_namespace`.
    pub fn parse(key: &str, default_namespace: &str) -> Result<Self, KeyParseError> {
        if key.is_empty() {
            return Err(KeyParseError::Empty);
        }
        let mut parts = key.split('/');
        let (namespace, name) = match (parts.next(), parts.next(), parts.next()) {
            (Some(name), None, None) => (default_namespace, name),
            (Some(namespace), Some(name), None) => (namespace, name),
            _ => return Err(KeyParseError::TooManySegments(key.to_string())),
        };
        if namespace.is_empty() || name.is_empty() {
            return Err(KeyParseError::EmptySegment(key.to_string()));
        }
        Ok(Self::new(namespace, name))
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
