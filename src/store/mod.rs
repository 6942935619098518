//! Repository collaborators
//!
//! The synchronization engine never talks to storage directly. It goes
//! through two traits:
//!
//! - [`AuthorizableStore`] - users, groups and the properties stored on them
//! - [`NodeStore`] - the hierarchical nodes underneath, with type metadata
//!
//! [`MemoryRepository`] implements both for embedding and tests.

mod memory;
mod node_type;

pub use memory::{GROUPS_ROOT, MemoryRepository, USERS_ROOT};
pub use node_type::{NodeTypeDef, PropertyDefinition};

use std::fmt;
use crate::core::{PropertyValue, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorizableKind {
    User,
    Group,
}

impl fmt::Display for AuthorizableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Group => write!(f, "group"),
        }
    }
}

/// Handle to a stored user or group
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthorizableRef {
    id: String,
    kind: AuthorizableKind,
    path: String,
}

impl AuthorizableRef {
    pub fn new(id: impl Into<String>, kind: AuthorizableKind, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            path: path.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> AuthorizableKind {
        self.kind
    }

    #[inline]
    pub fn is_group(&self) -> bool {
        self.kind == AuthorizableKind::Group
    }

    /// Absolute path of the authorizable's root node
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Access to users, groups and their properties
///
/// Property paths are relative to the authorizable's root node and may
/// address nested nodes (`profile/email`).
pub trait AuthorizableStore: Send + Sync {
    fn get_authorizable(&self, id: &str) -> Result<Option<AuthorizableRef>>;

    fn find_by_path(&self, path: &str) -> Result<Option<AuthorizableRef>>;

    fn create_user(&self, id: &str, password: &str) -> Result<AuthorizableRef>;

    fn create_group(&self, id: &str) -> Result<AuthorizableRef>;

    fn remove_authorizable(&self, authorizable: &AuthorizableRef) -> Result<()>;

    fn has_property(&self, authorizable: &AuthorizableRef, rel_path: &str) -> Result<bool>;

    fn get_property(&self, authorizable: &AuthorizableRef, rel_path: &str) -> Result<Option<PropertyValue>>;

    fn set_property(&self, authorizable: &AuthorizableRef, rel_path: &str, value: PropertyValue) -> Result<()>;

    /// Returns whether a property was removed
    fn remove_property(&self, authorizable: &AuthorizableRef, rel_path: &str) -> Result<bool>;

    fn verify_password(&self, user: &AuthorizableRef, password: &str) -> Result<bool>;

    fn change_password(&self, user: &AuthorizableRef, password: &str) -> Result<()>;

    fn disable(&self, user: &AuthorizableRef, reason: &str) -> Result<()>;

    fn enable(&self, user: &AuthorizableRef) -> Result<()>;

    fn disabled_reason(&self, user: &AuthorizableRef) -> Result<Option<String>>;

    /// Returns whether membership changed
    fn add_member(&self, group: &AuthorizableRef, member: &AuthorizableRef) -> Result<bool>;

    /// Returns whether membership changed
    fn remove_member(&self, group: &AuthorizableRef, member: &AuthorizableRef) -> Result<bool>;

    fn members(&self, group: &AuthorizableRef) -> Result<Vec<String>>;

    fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.get_authorizable(id)?.is_some())
    }
}

/// Access to the hierarchical node structure and its type system
pub trait NodeStore: Send + Sync {
    fn node_exists(&self, path: &str) -> Result<bool>;

    /// Adds `name` below `parent_path`; `None` uses the store's default type.
    /// Returns the new node's path.
    fn add_child_node(&self, parent_path: &str, name: &str, node_type: Option<&str>) -> Result<String>;

    fn primary_type(&self, path: &str) -> Result<String>;

    fn mixin_types(&self, path: &str) -> Result<Vec<String>>;

    fn add_mixin(&self, path: &str, mixin: &str) -> Result<()>;

    fn set_primary_type(&self, path: &str, node_type: &str) -> Result<()>;

    fn node_type(&self, name: &str) -> Result<Option<NodeTypeDef>>;

    fn is_node_type(&self, path: &str, node_type: &str) -> Result<bool> {
        if self.primary_type(path)? == node_type {
            return Ok(true);
        }
        Ok(self.mixin_types(path)?.iter().any(|m| m == node_type))
    }
}
