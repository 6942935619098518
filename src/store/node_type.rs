use crate::core::PropertyType;

/// Declared type and multiplicity of a named property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDefinition {
    pub name: String,
    pub required_type: PropertyType,
    pub multiple: bool,
}

/// A primary or mixin node type with its property definitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTypeDef {
    name: String,
    mixin: bool,
    properties: Vec<PropertyDefinition>,
}

impl NodeTypeDef {
    pub fn primary(name: &str) -> Self {
        Self { name: name.to_string(), mixin: false, properties: Vec::new() }
    }

    pub fn mixin(name: &str) -> Self {
        Self { name: name.to_string(), mixin: true, properties: Vec::new() }
    }

    /// Declare a property
    pub fn property(mut self, name: &str, required_type: PropertyType, multiple: bool) -> Self {
        self.properties.push(PropertyDefinition {
            name: name.to_string(),
            required_type,
            multiple,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_mixin(&self) -> bool {
        self.mixin
    }

    pub fn definition(&self, property: &str) -> Option<&PropertyDefinition> {
        self.properties.iter().find(|d| d.name == property)
    }

    pub fn definitions(&self) -> &[PropertyDefinition] {
        &self.properties
    }
}
