use log::{debug, warn};
use crate::core::path;
use super::params::RequestParameters;

/// Names starting with this prefix are commands, never properties
pub const RESERVED_PREFIX: &str = ":";
/// Form charset marker parameter
pub const CHARSET_PARAMETER: &str = "_charset_";

pub const CURRENT_NODE_PREFIX: &str = "./";
pub const PARENT_NODE_PREFIX: &str = "../";
pub const ABSOLUTE_PREFIX: &str = "/";

/// Directive suffix of a parameter name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suffix {
    TypeHint,
    DefaultValue,
    ValueFrom,
    Delete,
    MoveFrom,
    CopyFrom,
}

impl Suffix {
    /// Recognition order
    pub const ALL: [Suffix; 6] = [
        Self::TypeHint,
        Self::DefaultValue,
        Self::ValueFrom,
        Self::Delete,
        Self::MoveFrom,
        Self::CopyFrom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TypeHint => "@TypeHint",
            Self::DefaultValue => "@DefaultValue",
            Self::ValueFrom => "@ValueFrom",
            Self::Delete => "@Delete",
            Self::MoveFrom => "@MoveFrom",
            Self::CopyFrom => "@CopyFrom",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::MoveFrom | Self::CopyFrom)
    }
}

/// A parameter name split into its target path and directive suffix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedName {
    pub path: String,
    pub suffix: Option<Suffix>,
}

/// True if some parameter addresses the current node explicitly, in which
/// case every property parameter must carry a path prefix
pub fn requires_item_path_prefix(params: &RequestParameters) -> bool {
    params.names().any(|name| name.starts_with(CURRENT_NODE_PREFIX))
}

pub fn has_item_path_prefix(name: &str) -> bool {
    name.starts_with(ABSOLUTE_PREFIX)
        || name.starts_with(CURRENT_NODE_PREFIX)
        || name.starts_with(PARENT_NODE_PREFIX)
}

pub fn is_ignored_parameter(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX) || name == CHARSET_PARAMETER
}

/// Classifies a raw parameter name
///
/// Returns `None` for command parameters, unprefixed names when a prefix is
/// required, and paths containing a `..` segment.
pub fn classify(name: &str, require_prefix: bool) -> Option<ClassifiedName> {
    if is_ignored_parameter(name) {
        return None;
    }

    if require_prefix && !has_item_path_prefix(name) {
        debug!("Skipping parameter '{}' without item path prefix", name);
        return None;
    }

    let full_path = match name.strip_prefix('.') {
        Some(rest) if name.starts_with(CURRENT_NODE_PREFIX) => rest.to_string(),
        _ => format!("{}{}", ABSOLUTE_PREFIX, name),
    };

    let (target, suffix) = Suffix::ALL
        .iter()
        .find_map(|suffix| {
            full_path
                .strip_suffix(suffix.as_str())
                .map(|stripped| (stripped.to_string(), Some(*suffix)))
        })
        .unwrap_or((full_path, None));

    if path::has_parent_segment(&target) {
        warn!("Ignoring parameter '{}': relative paths are not allowed", name);
        return None;
    }

    Some(ClassifiedName { path: target, suffix })
}
