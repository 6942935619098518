use std::fmt;
use std::str::FromStr;

/// Closed set of property types a stored attribute can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    String,
    Binary,
    Long,
    Double,
    Decimal,
    Date,
    Boolean,
    Name,
    Path,
    Reference,
    WeakReference,
    Uri,
    /// No type information; values are stored as strings
    Undefined,
}

impl PropertyType {
    pub const ALL: [PropertyType; 13] = [
        Self::String,
        Self::Binary,
        Self::Long,
        Self::Double,
        Self::Decimal,
        Self::Date,
        Self::Boolean,
        Self::Name,
        Self::Path,
        Self::Reference,
        Self::WeakReference,
        Self::Uri,
        Self::Undefined,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Binary => "Binary",
            Self::Long => "Long",
            Self::Double => "Double",
            Self::Decimal => "Decimal",
            Self::Date => "Date",
            Self::Boolean => "Boolean",
            Self::Name => "Name",
            Self::Path => "Path",
            Self::Reference => "Reference",
            Self::WeakReference => "WeakReference",
            Self::Uri => "URI",
            Self::Undefined => "undefined",
        }
    }

    /// Looks a type up by name, ignoring ASCII case
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parsed form of a `@TypeHint` value such as `Long` or `String[]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeHint {
    pub property_type: PropertyType,
    pub multiple: bool,
}

impl TypeHint {
    pub const MULTI_VALUE_SUFFIX: &'static str = "[]";

    /// True if the raw hint text denotes the array form, whether or not the
    /// type name itself is recognized
    pub fn is_multi_value_hint(raw: &str) -> bool {
        raw.trim().ends_with(Self::MULTI_VALUE_SUFFIX)
    }
}

impl FromStr for TypeHint {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let (name, multiple) = match raw.strip_suffix(Self::MULTI_VALUE_SUFFIX) {
            Some(name) => (name, true),
            None => (raw, false),
        };

        let property_type = PropertyType::from_name(name)
            .ok_or_else(|| format!("Unknown property type '{}'", name))?;

        Ok(Self { property_type, multiple })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names_are_case_insensitive() {
        assert_eq!(PropertyType::from_name("long"), Some(PropertyType::Long));
        assert_eq!(PropertyType::from_name("WEAKREFERENCE"), Some(PropertyType::WeakReference));
        assert_eq!(PropertyType::from_name("uri"), Some(PropertyType::Uri));
        assert_eq!(PropertyType::from_name("Undefined"), Some(PropertyType::Undefined));
        assert_eq!(PropertyType::from_name("Integer"), None);
    }

    #[test]
    fn test_type_hint_parsing() {
        let hint: TypeHint = "Boolean[]".parse().unwrap();
        assert_eq!(hint.property_type, PropertyType::Boolean);
        assert!(hint.multiple);

        let hint: TypeHint = "Date".parse().unwrap();
        assert_eq!(hint.property_type, PropertyType::Date);
        assert!(!hint.multiple);

        assert!("Bogus[]".parse::<TypeHint>().is_err());
        assert!(TypeHint::is_multi_value_hint("Bogus[]"));
    }
}
