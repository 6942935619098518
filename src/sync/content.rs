use log::debug;
use crate::change::{Change, ChangeLog};
use crate::coercion::{self, DateParser};
use crate::core::{PropertyType, PropertyValue, Result, Value, ValueEntry, path};
use crate::request::{RequestProperty, RequestPropertyTree};
use crate::store::{AuthorizableKind, AuthorizableRef, AuthorizableStore, NodeStore};
use super::type_resolver::{ResolvedType, TypeResolver};

pub const USER_ID_PARAM: &str = "userId";
pub const GROUP_ID_PARAM: &str = "groupId";
pub const PASSWORD_PARAM: &str = "pwd";
pub const PASSWORD_CONFIRM_PARAM: &str = "pwdConfirm";

/// Request properties that describe the authorizable itself and are never
/// stored as attributes
pub fn is_identity_property(kind: AuthorizableKind, name: &str) -> bool {
    match kind {
        AuthorizableKind::User => {
            matches!(name, USER_ID_PARAM | PASSWORD_PARAM | PASSWORD_CONFIRM_PARAM)
        }
        AuthorizableKind::Group => name == GROUP_ID_PARAM,
    }
}

/// Writes ordinary request properties onto an authorizable
pub struct ContentWriter<'a, S: AuthorizableStore + NodeStore + ?Sized> {
    store: &'a S,
    dates: &'a DateParser,
}

impl<'a, S: AuthorizableStore + NodeStore + ?Sized> ContentWriter<'a, S> {
    pub fn new(store: &'a S, dates: &'a DateParser) -> Self {
        Self { store, dates }
    }

    pub fn write_content(
        &self,
        authorizable: &AuthorizableRef,
        tree: &RequestPropertyTree,
        changes: &mut ChangeLog,
    ) -> Result<()> {
        for prop in tree.iter() {
            if !prop.has_values()
                || prop.is_pseudo_property()
                || is_identity_property(authorizable.kind(), prop.name())
            {
                continue;
            }
            if prop.is_file_upload() {
                debug!("Ignoring file upload for {} on {}", prop.path(), authorizable.id());
                continue;
            }
            self.set_property_as_is(authorizable, prop, changes)?;
        }
        Ok(())
    }

    /// Writes, clears or removes a single property according to its values
    pub fn set_property_as_is(
        &self,
        authorizable: &AuthorizableRef,
        prop: &RequestProperty,
        changes: &mut ChangeLog,
    ) -> Result<()> {
        let rel_path = prop.relative_path();
        let change_path = path::join(authorizable.path(), &rel_path);
        let parent_node = match prop.parent_path() {
            Some(parent) => path::join(authorizable.path(), parent),
            None => authorizable.path().to_string(),
        };
        let resolved = TypeResolver::new(self.store).resolve(prop, &parent_node)?;

        let Some(values) = prop.effective_values() else {
            if self.store.remove_property(authorizable, &rel_path)? {
                changes.push(Change::deleted(change_path));
            }
            return Ok(());
        };

        match values.as_slice() {
            [] => {
                // clear an existing property, never create an empty one
                if self.store.has_property(authorizable, &rel_path)? {
                    self.store
                        .set_property(authorizable, &rel_path, PropertyValue::Multiple(Vec::new()))?;
                    changes.push(Change::modified(change_path));
                }
            }
            [single] if single.as_string().is_empty() => {
                if self.store.remove_property(authorizable, &rel_path)? {
                    changes.push(Change::deleted(change_path));
                }
            }
            // set_property replaces any existing value in place
            [single] => {
                let value = self.single_value(single, resolved);
                self.store.set_property(authorizable, &rel_path, value)?;
                changes.push(Change::modified(change_path));
            }
            many => {
                let values = self.multiple_values(many, resolved);
                self.store
                    .set_property(authorizable, &rel_path, PropertyValue::Multiple(values))?;
                changes.push(Change::modified(change_path));
            }
        }

        Ok(())
    }

    fn single_value(&self, entry: &ValueEntry, resolved: ResolvedType) -> PropertyValue {
        let value = if resolved.property_type.is_undefined() {
            Value::String(entry.as_string().into_owned())
        } else {
            coercion::coerce_or_string(entry, resolved.property_type, self.dates)
        };

        if resolved.multiple {
            PropertyValue::Multiple(vec![value])
        } else {
            PropertyValue::Single(value)
        }
    }

    /// Dates are all-or-nothing: one unparseable entry leaves every entry
    /// as a plain string
    fn multiple_values(&self, entries: &[ValueEntry], resolved: ResolvedType) -> Vec<Value> {
        match resolved.property_type {
            PropertyType::Date => {
                let raw: Vec<String> = entries.iter().map(|e| e.as_string().into_owned()).collect();
                match self.dates.parse_all(&raw) {
                    Some(dates) => dates.into_iter().map(Value::Date).collect(),
                    None => raw.into_iter().map(Value::String).collect(),
                }
            }
            PropertyType::Undefined => entries
                .iter()
                .map(|e| Value::String(e.as_string().into_owned()))
                .collect(),
            target => coercion::coerce_all(entries, target, self.dates),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ChangeKind;
    use crate::request::RequestParameters;
    use crate::store::{MemoryRepository, NodeTypeDef};
    use chrono::Datelike;

    fn setup() -> (MemoryRepository, AuthorizableRef, DateParser) {
        let repo = MemoryRepository::new().hash_cost(4);
        let alice = repo.create_user("alice", "pw").unwrap();
        (repo, alice, DateParser::default())
    }

    fn write(repo: &MemoryRepository, who: &AuthorizableRef, dates: &DateParser, params: RequestParameters) -> ChangeLog {
        let tree = RequestPropertyTree::from_parameters(&params);
        let mut changes = ChangeLog::new();
        ContentWriter::new(repo, dates).write_content(who, &tree, &mut changes).unwrap();
        changes
    }

    #[test]
    fn test_untyped_single_value_is_string() {
        let (repo, alice, dates) = setup();
        let changes = write(&repo, &alice, &dates, RequestParameters::new().with("city", "Berlin"));

        assert_eq!(changes.kinds(), vec![ChangeKind::Modify]);
        assert_eq!(
            repo.get_property(&alice, "city").unwrap(),
            Some(PropertyValue::Single(Value::String("Berlin".into())))
        );
    }

    #[test]
    fn test_typed_multi_values_keep_order() {
        let (repo, alice, dates) = setup();
        let params = RequestParameters::new()
            .with("flags", "true")
            .with("flags", "false")
            .with("flags@TypeHint", "Boolean[]")
            .with("sizes", "3")
            .with("sizes", "1")
            .with("sizes@TypeHint", "Long");
        write(&repo, &alice, &dates, params);

        assert_eq!(
            repo.get_property(&alice, "flags").unwrap(),
            Some(PropertyValue::Multiple(vec![Value::Boolean(true), Value::Boolean(false)]))
        );
        assert_eq!(
            repo.get_property(&alice, "sizes").unwrap(),
            Some(PropertyValue::Multiple(vec![Value::Long(3), Value::Long(1)]))
        );
    }

    #[test]
    fn test_multi_value_hint_wraps_single_value() {
        let (repo, alice, dates) = setup();
        let params = RequestParameters::new().with("n", "7").with("n@TypeHint", "Long[]");
        write(&repo, &alice, &dates, params);

        assert_eq!(
            repo.get_property(&alice, "n").unwrap(),
            Some(PropertyValue::Multiple(vec![Value::Long(7)]))
        );
    }

    #[test]
    fn test_dates() {
        let (repo, alice, dates) = setup();
        let params = RequestParameters::new()
            .with("born", "1990-05-17")
            .with("born@TypeHint", "Date")
            .with("bad", "someday")
            .with("bad@TypeHint", "Date")
            .with("mixed", "2020-01-01")
            .with("mixed", "later")
            .with("mixed@TypeHint", "Date");
        write(&repo, &alice, &dates, params);

        let born = repo.get_property(&alice, "born").unwrap().unwrap();
        assert_eq!(born.as_single().and_then(Value::as_date).unwrap().year(), 1990);

        assert_eq!(
            repo.get_property(&alice, "bad").unwrap(),
            Some(PropertyValue::Single(Value::String("someday".into())))
        );
        assert_eq!(
            repo.get_property(&alice, "mixed").unwrap(),
            Some(PropertyValue::Multiple(vec![
                Value::String("2020-01-01".into()),
                Value::String("later".into()),
            ]))
        );
    }

    #[test]
    fn test_schema_type_applies_without_hint() {
        let (repo, alice, dates) = setup();
        repo.define_node_type(NodeTypeDef::mixin("test:aged").property("age", PropertyType::Long, false))
            .unwrap();
        repo.add_mixin(alice.path(), "test:aged").unwrap();

        write(&repo, &alice, &dates, RequestParameters::new().with("age", "33"));
        assert_eq!(
            repo.get_property(&alice, "age").unwrap(),
            Some(PropertyValue::Single(Value::Long(33)))
        );
    }

    #[test]
    fn test_bad_number_degrades_to_string() {
        let (repo, alice, dates) = setup();
        let params = RequestParameters::new().with("n", "many").with("n@TypeHint", "Long");
        write(&repo, &alice, &dates, params);

        assert_eq!(
            repo.get_property(&alice, "n").unwrap(),
            Some(PropertyValue::Single(Value::String("many".into())))
        );
    }

    #[test]
    fn test_empty_string_removes_existing_property() {
        let (repo, alice, dates) = setup();
        repo.set_property(&alice, "nick", Value::from("al").into()).unwrap();

        let changes = write(&repo, &alice, &dates, RequestParameters::new().with("nick", ""));
        assert_eq!(changes.kinds(), vec![ChangeKind::Delete]);
        assert!(!repo.has_property(&alice, "nick").unwrap());

        let changes = write(&repo, &alice, &dates, RequestParameters::new().with("nick", ""));
        assert!(changes.is_empty());
    }

    #[test]
    fn test_overwrite_replaces_value_in_place() {
        let (repo, alice, dates) = setup();
        repo.set_property(&alice, "nick", Value::from("al").into()).unwrap();

        let changes = write(&repo, &alice, &dates, RequestParameters::new().with("nick", "ally"));
        assert_eq!(changes.kinds(), vec![ChangeKind::Modify]);
        assert_eq!(
            repo.get_property(&alice, "nick").unwrap(),
            Some(PropertyValue::Single(Value::String("ally".into())))
        );
    }

    #[test]
    fn test_failed_overwrite_keeps_previous_value() {
        let (repo, alice, dates) = setup();
        repo.set_property(&alice, "nick", Value::from("al").into()).unwrap();
        repo.set_property(&alice, "tags", vec![Value::from("a")].into()).unwrap();

        // same node, unknown principal: the store refuses the write
        let stale = AuthorizableRef::new("ghost", AuthorizableKind::User, alice.path());
        let params = RequestParameters::new()
            .with("nick", "ally")
            .with("tags", "b")
            .with("tags", "c");
        let tree = RequestPropertyTree::from_parameters(&params);
        let mut changes = ChangeLog::new();
        let writer = ContentWriter::new(&repo, &dates);

        for prop in tree.iter() {
            assert!(writer.set_property_as_is(&stale, prop, &mut changes).is_err());
        }

        assert!(changes.is_empty());
        assert_eq!(
            repo.get_property(&alice, "nick").unwrap(),
            Some(PropertyValue::Single(Value::String("al".into())))
        );
        assert_eq!(
            repo.get_property(&alice, "tags").unwrap(),
            Some(PropertyValue::Multiple(vec![Value::String("a".into())]))
        );
    }

    #[test]
    fn test_empty_value_list_clears_existing_only() {
        let (repo, alice, dates) = setup();
        repo.set_property(&alice, "tags", vec![Value::from("a")].into()).unwrap();

        let mut params = RequestParameters::new();
        params.set("tags", vec![]);
        params.set("other", vec![]);
        let changes = write(&repo, &alice, &dates, params);

        assert_eq!(changes.kinds(), vec![ChangeKind::Modify]);
        assert_eq!(repo.get_property(&alice, "tags").unwrap(), Some(PropertyValue::Multiple(vec![])));
        assert!(!repo.has_property(&alice, "other").unwrap());
    }

    #[test]
    fn test_identity_and_upload_properties_are_skipped() {
        let (repo, alice, dates) = setup();
        let mut params = RequestParameters::new()
            .with("pwd", "secret")
            .with("pwdConfirm", "secret")
            .with("jcr:mixinTypes", "mix:title");
        params.add_file("avatar", "me.png", Some("image/png"), vec![1, 2]);

        let changes = write(&repo, &alice, &dates, params);
        assert!(changes.is_empty());
        assert!(!repo.has_property(&alice, "pwd").unwrap());
        assert!(!repo.has_property(&alice, "avatar").unwrap());
    }

    #[test]
    fn test_nested_property_path() {
        let (repo, alice, dates) = setup();
        let changes = write(&repo, &alice, &dates, RequestParameters::new().with("profile/email", "a@x.org"));

        assert_eq!(changes.changes()[0].path(), "/home/users/alice/profile/email");
        assert!(repo.has_property(&alice, "profile/email").unwrap());
    }

    #[test]
    fn test_identity_names_depend_on_kind() {
        assert!(is_identity_property(AuthorizableKind::User, "pwd"));
        assert!(!is_identity_property(AuthorizableKind::Group, "pwd"));
        assert!(is_identity_property(AuthorizableKind::Group, "groupId"));
    }
}
