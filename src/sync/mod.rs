//! Request-to-repository property synchronization
//!
//! A [`RequestPropertyTree`] is applied to an authorizable in three ordered
//! stages, each appending to the same [`ChangeLog`]:
//!
//! 1. [`DeleteProcessor`] - `@Delete` directives
//! 2. [`StructureBuilder`] - `jcr:primaryType` / `jcr:mixinTypes`
//! 3. [`ContentWriter`] - every other property, typed by [`TypeResolver`]

mod content;
mod delete;
mod structure;
mod type_resolver;

pub use content::{
    ContentWriter, GROUP_ID_PARAM, PASSWORD_CONFIRM_PARAM, PASSWORD_PARAM, USER_ID_PARAM,
    is_identity_property,
};
pub use delete::DeleteProcessor;
pub use structure::{SegmentStep, StructureBuilder};
pub use type_resolver::{ResolvedType, TypeResolver};

use crate::change::ChangeLog;
use crate::coercion::DateParser;
use crate::core::Result;
use crate::request::RequestPropertyTree;
use crate::store::{AuthorizableRef, AuthorizableStore, NodeStore};

/// Runs the delete, structure and content stages against one store
pub struct PropertySync<'a, S: AuthorizableStore + NodeStore + ?Sized> {
    store: &'a S,
    dates: &'a DateParser,
    default_node_type: Option<&'a str>,
}

impl<'a, S: AuthorizableStore + NodeStore + ?Sized> PropertySync<'a, S> {
    pub fn new(store: &'a S, dates: &'a DateParser) -> Self {
        Self { store, dates, default_node_type: None }
    }

    /// Primary type for intermediate nodes the request creates without declaring one
    pub fn with_default_node_type(mut self, node_type: &'a str) -> Self {
        self.default_node_type = Some(node_type);
        self
    }

    /// Rejects requests that would retype the authorizable's own node;
    /// call before creating anything for the request
    pub fn check(&self, root_path: &str, tree: &RequestPropertyTree) -> Result<()> {
        StructureBuilder::<S>::check_root_immutable(root_path, tree)
    }

    pub fn apply(
        &self,
        authorizable: &AuthorizableRef,
        tree: &RequestPropertyTree,
        changes: &mut ChangeLog,
    ) -> Result<()> {
        self.check(authorizable.path(), tree)?;
        DeleteProcessor::new(self.store).process_deletes(authorizable, tree, changes)?;
        let mut structure = StructureBuilder::new(self.store);
        if let Some(node_type) = self.default_node_type {
            structure = structure.with_default_node_type(node_type);
        }
        structure.process_create(authorizable, tree, changes)?;
        ContentWriter::new(self.store, self.dates).write_content(authorizable, tree, changes)?;
        Ok(())
    }
}
