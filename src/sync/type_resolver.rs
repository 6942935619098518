use crate::core::{PropertyType, Result};
use crate::request::RequestProperty;
use crate::store::NodeStore;

/// Target type and multiplicity of a property write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedType {
    pub property_type: PropertyType,
    pub multiple: bool,
}

impl ResolvedType {
    pub const UNDEFINED: ResolvedType = ResolvedType {
        property_type: PropertyType::Undefined,
        multiple: false,
    };
}

/// Resolves property types: explicit hint, then schema, then untyped
///
/// Nothing is cached; each write resolves again.
pub struct TypeResolver<'a, N: NodeStore + ?Sized> {
    nodes: &'a N,
}

impl<'a, N: NodeStore + ?Sized> TypeResolver<'a, N> {
    pub fn new(nodes: &'a N) -> Self {
        Self { nodes }
    }

    /// `parent_node_path` is the absolute path of the node holding the property
    pub fn resolve(&self, prop: &RequestProperty, parent_node_path: &str) -> Result<ResolvedType> {
        if let Some(resolved) = Self::from_type_hint(prop) {
            return Ok(resolved);
        }
        if let Some(resolved) = self.from_schema(prop.name(), parent_node_path)? {
            return Ok(resolved);
        }
        Ok(ResolvedType::UNDEFINED)
    }

    pub fn from_type_hint(prop: &RequestProperty) -> Option<ResolvedType> {
        prop.parsed_type_hint().map(|hint| ResolvedType {
            property_type: hint.property_type,
            multiple: hint.multiple,
        })
    }

    /// Looks the property up on the node's primary type, then on each mixin
    /// in declaration order. The first definition found wins.
    pub fn from_schema(&self, property_name: &str, parent_node_path: &str) -> Result<Option<ResolvedType>> {
        if !self.nodes.node_exists(parent_node_path)? {
            return Ok(None);
        }

        let mut type_names = vec![self.nodes.primary_type(parent_node_path)?];
        type_names.extend(self.nodes.mixin_types(parent_node_path)?);

        for type_name in type_names {
            let Some(node_type) = self.nodes.node_type(&type_name)? else {
                continue;
            };
            if let Some(def) = node_type.definition(property_name) {
                return Ok(Some(ResolvedType {
                    property_type: def.required_type,
                    multiple: def.multiple,
                }));
            }
        }

        Ok(None)
    }
}
