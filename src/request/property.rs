use log::debug;
use crate::core::{TypeHint, ValueEntry, path};

pub const JCR_PRIMARY_TYPE: &str = "jcr:primaryType";
pub const JCR_MIXIN_TYPES: &str = "jcr:mixinTypes";

/// One pending mutation target of a create or update request
#[derive(Debug, Clone, PartialEq)]
pub struct RequestProperty {
    path: String,
    name: String,
    parent_path: Option<String>,
    type_hint: Option<String>,
    default_values: Vec<ValueEntry>,
    values: Option<Vec<ValueEntry>>,
    delete: bool,
}

impl RequestProperty {
    /// `path` is absolute, relative to the entity root
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            name: path::name_of(path).to_string(),
            parent_path: path::parent_of(path).map(str::to_string),
            type_hint: None,
            default_values: Vec::new(),
            values: None,
            delete: false,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` when the property sits directly on the entity root
    pub fn parent_path(&self) -> Option<&str> {
        self.parent_path.as_deref()
    }

    /// Path below the entity root without the leading separator
    pub fn relative_path(&self) -> String {
        path::normalize(&self.path).trim_start_matches(path::SEPARATOR).to_string()
    }

    pub fn type_hint(&self) -> Option<&str> {
        self.type_hint.as_deref()
    }

    pub fn set_type_hint(&mut self, hint: &str) {
        self.type_hint = Some(hint.to_string());
    }

    /// The parsed type hint; unknown type names yield `None`
    pub fn parsed_type_hint(&self) -> Option<TypeHint> {
        let raw = self.type_hint.as_deref()?;
        match raw.parse() {
            Ok(hint) => Some(hint),
            Err(err) => {
                debug!("Ignoring type hint for {}: {}", self.path, err);
                None
            }
        }
    }

    pub fn has_multi_value_type_hint(&self) -> bool {
        self.type_hint
            .as_deref()
            .is_some_and(TypeHint::is_multi_value_hint)
    }

    pub fn default_values(&self) -> &[ValueEntry] {
        &self.default_values
    }

    pub fn set_default_values(&mut self, values: Vec<ValueEntry>) {
        self.default_values = values;
    }

    /// `None` means no value was supplied
    pub fn values(&self) -> Option<&[ValueEntry]> {
        self.values.as_deref()
    }

    pub fn set_values(&mut self, values: Vec<ValueEntry>) {
        self.values = Some(values);
    }

    pub fn has_values(&self) -> bool {
        self.values.is_some()
    }

    /// Values to write: a lone empty string falls back to the first default
    pub fn effective_values(&self) -> Option<Vec<ValueEntry>> {
        let values = self.values.as_ref()?;
        match (values.as_slice(), self.default_values.first()) {
            ([single], Some(default)) if single.as_string().is_empty() => {
                Some(vec![default.clone()])
            }
            _ => Some(values.clone()),
        }
    }

    /// String form of [`effective_values`](Self::effective_values)
    pub fn string_values(&self) -> Option<Vec<String>> {
        self.effective_values()
            .map(|values| values.iter().map(|v| v.as_string().into_owned()).collect())
    }

    pub fn is_delete(&self) -> bool {
        self.delete
    }

    pub fn set_delete(&mut self, delete: bool) {
        self.delete = delete;
    }

    pub fn is_file_upload(&self) -> bool {
        self.values
            .as_ref()
            .is_some_and(|values| values.iter().any(ValueEntry::is_file_upload))
    }

    pub fn is_primary_type(&self) -> bool {
        self.name == JCR_PRIMARY_TYPE
    }

    pub fn is_mixin_types(&self) -> bool {
        self.name == JCR_MIXIN_TYPES
    }

    /// Structural marker rather than an ordinary attribute
    pub fn is_pseudo_property(&self) -> bool {
        self.is_primary_type() || self.is_mixin_types()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PropertyType;

    #[test]
    fn test_path_parts() {
        let prop = RequestProperty::new("/nested/deep/title");
        assert_eq!(prop.name(), "title");
        assert_eq!(prop.parent_path(), Some("/nested/deep"));
        assert_eq!(prop.relative_path(), "nested/deep/title");

        let top = RequestProperty::new("/title");
        assert_eq!(top.parent_path(), None);
        assert_eq!(top.relative_path(), "title");
    }

    #[test]
    fn test_type_hint() {
        let mut prop = RequestProperty::new("/flags");
        prop.set_type_hint("Boolean[]");
        assert!(prop.has_multi_value_type_hint());
        assert_eq!(prop.parsed_type_hint().unwrap().property_type, PropertyType::Boolean);

        prop.set_type_hint("Nonsense");
        assert!(prop.parsed_type_hint().is_none());
        assert!(!prop.has_multi_value_type_hint());
    }

    #[test]
    fn test_default_value_substitution() {
        let mut prop = RequestProperty::new("/color");
        assert_eq!(prop.effective_values(), None);

        prop.set_default_values(vec!["blue".into()]);
        prop.set_values(vec!["".into()]);
        assert_eq!(prop.string_values(), Some(vec!["blue".to_string()]));

        prop.set_values(vec!["red".into()]);
        assert_eq!(prop.string_values(), Some(vec!["red".to_string()]));
    }

    #[test]
    fn test_pseudo_properties() {
        assert!(RequestProperty::new("/a/jcr:primaryType").is_pseudo_property());
        assert!(RequestProperty::new("/jcr:mixinTypes").is_mixin_types());
        assert!(!RequestProperty::new("/jcr:title").is_pseudo_property());
    }
}
