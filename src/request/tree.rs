use std::collections::HashMap;
use log::warn;
use crate::core::ValueEntry;
use super::classifier::{self, Suffix};
use super::params::RequestParameters;
use super::property::{JCR_PRIMARY_TYPE, RequestProperty};

/// All pending property mutations of one request, keyed by path
///
/// Properties keep the order in which their path was first seen.
#[derive(Debug, Clone, Default)]
pub struct RequestPropertyTree {
    properties: Vec<RequestProperty>,
    index: HashMap<String, usize>,
}

impl RequestPropertyTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds the parameter map into property records
    pub fn from_parameters(params: &RequestParameters) -> Self {
        let mut tree = Self::new();
        let require_prefix = classifier::requires_item_path_prefix(params);

        for (name, values) in params.iter() {
            let Some(classified) = classifier::classify(name, require_prefix) else {
                continue;
            };

            match classified.suffix {
                Some(Suffix::TypeHint) => {
                    let prop = tree.get_or_create(&classified.path);
                    if let Some(first) = values.first() {
                        prop.set_type_hint(&first.as_string());
                    }
                }
                Some(Suffix::DefaultValue) => {
                    tree.get_or_create(&classified.path)
                        .set_default_values(values.to_vec());
                }
                Some(Suffix::ValueFrom) => {
                    let prop = tree.get_or_create(&classified.path);
                    if let Some(referenced) = Self::referenced_values(params, values) {
                        prop.set_values(referenced);
                    }
                }
                Some(Suffix::Delete) => {
                    tree.get_or_create(&classified.path).set_delete(true);
                }
                Some(suffix @ (Suffix::MoveFrom | Suffix::CopyFrom)) => {
                    warn!(
                        "{} is not supported for authorizables, ignoring parameter '{}'",
                        suffix.as_str(),
                        name
                    );
                }
                None => {
                    tree.get_or_create(&classified.path).set_values(values.to_vec());
                }
            }
        }

        tree
    }

    /// Value of the parameter named by a `@ValueFrom` directive; both the
    /// directive and the referenced parameter must be single-valued
    fn referenced_values(params: &RequestParameters, directive: &[ValueEntry]) -> Option<Vec<ValueEntry>> {
        let [reference] = directive else {
            return None;
        };
        match params.get(&reference.as_string()) {
            Some([single]) => Some(vec![single.clone()]),
            _ => None,
        }
    }

    /// Returns the record for `path`, inserting an empty one if absent
    pub fn get_or_create(&mut self, path: &str) -> &mut RequestProperty {
        let idx = match self.index.get(path) {
            Some(&idx) => idx,
            None => {
                self.properties.push(RequestProperty::new(path));
                let idx = self.properties.len() - 1;
                self.index.insert(path.to_string(), idx);
                idx
            }
        };
        &mut self.properties[idx]
    }

    pub fn get(&self, path: &str) -> Option<&RequestProperty> {
        self.index.get(path).map(|&idx| &self.properties[idx])
    }

    /// Primary type declared for the node at `node_path` (entity-relative,
    /// with leading separator), if any
    pub fn declared_primary_type(&self, node_path: &str) -> Option<String> {
        let key = format!("{}/{}", node_path.trim_end_matches('/'), JCR_PRIMARY_TYPE);
        self.get(&key)
            .and_then(RequestProperty::string_values)
            .and_then(|values| values.into_iter().next())
    }

    pub fn iter(&self) -> impl Iterator<Item = &RequestProperty> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
