// ============================================================================
// Change Records
// ============================================================================
//
// Every mutation applied to the repository is reported as a Change so the
// caller can tell what was created, modified or deleted, in order.
//
// ============================================================================

use std::fmt;
use serde::Serialize;
use crate::core::{Result, SyncError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Create,
    Modify,
    Delete,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "created"),
            Self::Modify => write!(f, "modified"),
            Self::Delete => write!(f, "deleted"),
        }
    }
}

/// A single applied mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    kind: ChangeKind,
    source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    destination: Option<String>,
}

impl Change {
    pub fn created(path: impl Into<String>) -> Self {
        Self { kind: ChangeKind::Create, source: path.into(), destination: None }
    }

    pub fn modified(path: impl Into<String>) -> Self {
        Self { kind: ChangeKind::Modify, source: path.into(), destination: None }
    }

    pub fn deleted(path: impl Into<String>) -> Self {
        Self { kind: ChangeKind::Delete, source: path.into(), destination: None }
    }

    /// Attach a second path, e.g. the member added to a group
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub fn path(&self) -> &str {
        &self.source
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.destination {
            Some(dest) => write!(f, "{} {} -> {}", self.kind, self.source, dest),
            None => write!(f, "{} {}", self.kind, self.source),
        }
    }
}

/// Ordered, append-only sink of change records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeLog {
    changes: Vec<Change>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn kinds(&self) -> Vec<ChangeKind> {
        self.changes.iter().map(Change::kind).collect()
    }

    pub fn count(&self, kind: ChangeKind) -> usize {
        self.changes.iter().filter(|c| c.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }

    /// JSON array of `{kind, source, destination?}` objects
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.changes)
            .map_err(|e| SyncError::Repository(format!("Failed to serialize changes: {}", e)))
    }
}

impl IntoIterator for ChangeLog {
    type Item = Change;
    type IntoIter = std::vec::IntoIter<Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}
