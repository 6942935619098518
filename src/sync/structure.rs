use log::warn;
use crate::change::{Change, ChangeLog};
use crate::core::{Result, SyncError, path};
use crate::request::{RequestProperty, RequestPropertyTree};
use crate::store::{AuthorizableRef, NodeStore};

/// One step of walking from the entity root down to a target node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentStep {
    pub path: String,
    pub created: bool,
}

/// Applies `jcr:primaryType` / `jcr:mixinTypes` pseudo-properties, creating
/// the addressed nodes on the way
pub struct StructureBuilder<'a, N: NodeStore + ?Sized> {
    nodes: &'a N,
    default_node_type: Option<&'a str>,
}

impl<'a, N: NodeStore + ?Sized> StructureBuilder<'a, N> {
    pub fn new(nodes: &'a N) -> Self {
        Self { nodes, default_node_type: None }
    }

    /// Primary type for new nodes that have none declared in the request.
    /// Without one the store's own default applies.
    pub fn with_default_node_type(mut self, node_type: &'a str) -> Self {
        self.default_node_type = Some(node_type);
        self
    }

    /// Fails if any primary type pseudo-property resolves to the entity root
    pub fn check_root_immutable(root_path: &str, tree: &RequestPropertyTree) -> Result<()> {
        for prop in tree.iter().filter(|p| p.is_primary_type() && p.has_values()) {
            let Some(parent) = prop.parent_path() else {
                continue;
            };
            if path::join(root_path, parent) == root_path {
                return Err(SyncError::ImmutabilityViolation(format!(
                    "Cannot change primary type of authorizable node {}",
                    root_path
                )));
            }
        }
        Ok(())
    }

    pub fn process_create(
        &self,
        authorizable: &AuthorizableRef,
        tree: &RequestPropertyTree,
        changes: &mut ChangeLog,
    ) -> Result<()> {
        let root = authorizable.path();
        Self::check_root_immutable(root, tree)?;

        for prop in tree.iter().filter(|p| p.has_values() && p.is_pseudo_property()) {
            // the authorizable's own node type is fixed
            if prop.is_primary_type() && prop.parent_path().is_none() {
                continue;
            }

            let target = match prop.parent_path() {
                None | Some("/") => root.to_string(),
                Some(parent) => path::join(root, parent),
            };
            if !path::is_same_or_descendant(root, &target) {
                warn!("Ignoring {}: {} is outside of {}", prop.path(), target, root);
                continue;
            }

            let Some(values) = prop.string_values() else {
                continue;
            };

            let node_path = self.ensure_node(root, &target, tree, changes)?;
            let change_path = path::join(root, prop.path());

            if prop.is_primary_type() {
                self.apply_primary_type(root, &node_path, prop, &values, &change_path, changes)?;
            } else {
                for mixin in values.iter().filter(|m| !m.is_empty()) {
                    if !self.nodes.is_node_type(&node_path, mixin)? {
                        self.nodes.add_mixin(&node_path, mixin)?;
                        changes.push(Change::modified(change_path.clone()));
                    }
                }
            }
        }

        Ok(())
    }

    fn apply_primary_type(
        &self,
        root: &str,
        node_path: &str,
        prop: &RequestProperty,
        values: &[String],
        change_path: &str,
        changes: &mut ChangeLog,
    ) -> Result<()> {
        if node_path == root {
            return Err(SyncError::ImmutabilityViolation(format!(
                "Cannot change primary type of authorizable node {} via {}",
                root,
                prop.path()
            )));
        }

        let Some(node_type) = values.first().filter(|t| !t.is_empty()) else {
            return Ok(());
        };

        if !self.nodes.is_node_type(node_path, node_type)? {
            self.nodes.set_primary_type(node_path, node_type)?;
            changes.push(Change::modified(change_path));
        }
        Ok(())
    }

    /// Returns `target`, creating it and its missing ancestors below `root`
    fn ensure_node(
        &self,
        root: &str,
        target: &str,
        tree: &RequestPropertyTree,
        changes: &mut ChangeLog,
    ) -> Result<String> {
        if self.nodes.node_exists(target)? {
            return Ok(target.to_string());
        }

        for step in self.ensure_segments(root, target, tree)? {
            if step.created {
                changes.push(Change::created(step.path));
            }
        }
        Ok(target.to_string())
    }

    /// Walks from `root` to `target` segment by segment, creating what is
    /// missing. A segment gets the primary type declared for it in `tree`,
    /// else the builder's default type, else the store's.
    pub fn ensure_segments(
        &self,
        root: &str,
        target: &str,
        tree: &RequestPropertyTree,
    ) -> Result<Vec<SegmentStep>> {
        let relative = path::relative_to(root, target).ok_or_else(|| {
            SyncError::Validation(format!("{} is not below {}", target, root))
        })?;

        let mut steps = Vec::new();
        let mut current = root.to_string();

        for segment in relative.split(path::SEPARATOR).filter(|s| !s.is_empty()) {
            let next = path::join(&current, segment);

            let created = if self.nodes.node_exists(&next)? {
                false
            } else {
                let declared = path::relative_to(root, &next)
                    .and_then(|rel| tree.declared_primary_type(&format!("/{}", rel)));
                let node_type = declared.as_deref().or(self.default_node_type);
                self.nodes.add_child_node(&current, segment, node_type)?;
                true
            };

            steps.push(SegmentStep { path: next.clone(), created });
            current = next;
        }

        Ok(steps)
    }
}
