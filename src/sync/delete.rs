use crate::change::{Change, ChangeLog};
use crate::core::{Result, path};
use crate::request::RequestPropertyTree;
use crate::store::{AuthorizableRef, AuthorizableStore};

/// Removes properties flagged with `@Delete`
///
/// Runs before structure building and content writing, so a property that
/// is deleted and written in the same request ends up with the new value.
pub struct DeleteProcessor<'a, S: AuthorizableStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: AuthorizableStore + ?Sized> DeleteProcessor<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn process_deletes(
        &self,
        authorizable: &AuthorizableRef,
        tree: &RequestPropertyTree,
        changes: &mut ChangeLog,
    ) -> Result<()> {
        for prop in tree.iter().filter(|p| p.is_delete()) {
            let rel_path = prop.relative_path();
            if rel_path.is_empty() {
                continue;
            }
            if self.store.has_property(authorizable, &rel_path)? {
                self.store.remove_property(authorizable, &rel_path)?;
                changes.push(Change::deleted(path::join(authorizable.path(), &rel_path)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ChangeKind;
    use crate::core::Value;
    use crate::request::RequestParameters;
    use crate::store::MemoryRepository;

    #[test]
    fn test_only_existing_properties_produce_records() {
        let repo = MemoryRepository::new().hash_cost(4);
        let alice = repo.create_user("alice", "pw").unwrap();
        repo.set_property(&alice, "present", Value::from("x").into()).unwrap();

        let params = RequestParameters::new()
            .with("present@Delete", "true")
            .with("absent@Delete", "true");
        let tree = RequestPropertyTree::from_parameters(&params);

        let mut changes = ChangeLog::new();
        DeleteProcessor::new(&repo).process_deletes(&alice, &tree, &mut changes).unwrap();

        assert_eq!(changes.kinds(), vec![ChangeKind::Delete]);
        assert_eq!(changes.changes()[0].path(), "/home/users/alice/present");
        assert!(!repo.has_property(&alice, "present").unwrap());
    }
}
