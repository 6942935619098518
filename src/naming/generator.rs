use crate::config::SyncConfig;
use crate::request::RequestParameters;
use crate::store::AuthorizableKind;
use super::filter::PrincipalNameFilter;

/// Exact principal name, used verbatim
pub const NAME_PARAM: &str = ":name";
/// Free-form hint that is filtered and may be made unique
pub const NAME_HINT_PARAM: &str = ":nameHint";
pub const VALUE_FROM_SUFFIX: &str = "@ValueFrom";

/// A generated principal name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameInfo {
    principal_name: String,
    make_unique: bool,
}

impl NameInfo {
    pub fn new(principal_name: impl Into<String>, make_unique: bool) -> Self {
        Self {
            principal_name: principal_name.into(),
            make_unique,
        }
    }

    /// Name that must be used as given
    pub fn exact(principal_name: impl Into<String>) -> Self {
        Self::new(principal_name, false)
    }

    pub fn principal_name(&self) -> &str {
        &self.principal_name
    }

    /// Whether a collision suffix may be appended
    pub fn is_make_unique(&self) -> bool {
        self.make_unique
    }

    pub fn into_principal_name(self) -> String {
        self.principal_name
    }
}

/// Strategy that derives a principal name from request parameters
///
/// `default_generator` is the lowest-ranked registered generator and may be
/// delegated to; it is `None` when this generator is the default.
pub trait PrincipalNameGenerator: Send + Sync {
    fn principal_name(
        &self,
        params: &RequestParameters,
        kind: AuthorizableKind,
        filter: Option<&dyn PrincipalNameFilter>,
        default_generator: Option<&dyn PrincipalNameGenerator>,
    ) -> Option<NameInfo>;
}

/// Exact name first, then the name hint, then the configured hint properties
#[derive(Debug, Clone)]
pub struct DefaultPrincipalNameGenerator {
    user_hint_properties: Vec<String>,
    group_hint_properties: Vec<String>,
    max_length: usize,
}

impl DefaultPrincipalNameGenerator {
    pub fn new(user_hint_properties: Vec<String>, group_hint_properties: Vec<String>, max_length: usize) -> Self {
        Self {
            user_hint_properties,
            group_hint_properties,
            max_length,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(
            config.user_name_hint_properties.clone(),
            config.group_name_hint_properties.clone(),
            config.principal_name_max_length,
        )
    }

    fn hint_properties(&self, kind: AuthorizableKind) -> &[String] {
        match kind {
            AuthorizableKind::User => &self.user_hint_properties,
            AuthorizableKind::Group => &self.group_hint_properties,
        }
    }

    fn hint(&self, params: &RequestParameters, kind: AuthorizableKind) -> Option<String> {
        parameter_value(params, NAME_HINT_PARAM).or_else(|| {
            self.hint_properties(kind)
                .iter()
                .find_map(|name| parameter_value(params, name))
        })
    }

    fn truncate(&self, name: String) -> String {
        if name.chars().count() <= self.max_length {
            name
        } else {
            name.chars().take(self.max_length).collect()
        }
    }
}

impl PrincipalNameGenerator for DefaultPrincipalNameGenerator {
    fn principal_name(
        &self,
        params: &RequestParameters,
        kind: AuthorizableKind,
        filter: Option<&dyn PrincipalNameFilter>,
        _default_generator: Option<&dyn PrincipalNameGenerator>,
    ) -> Option<NameInfo> {
        if let Some(exact) = parameter_value(params, NAME_PARAM) {
            return Some(NameInfo::exact(exact));
        }

        let hint = self.hint(params, kind)?;
        let filtered = match filter {
            Some(filter) => filter.filter(&hint),
            None => hint,
        };
        Some(NameInfo::new(self.truncate(filtered), true))
    }
}

/// Single non-empty value of `name`, either given directly or through
/// `name@ValueFrom`
pub fn parameter_value(params: &RequestParameters, name: &str) -> Option<String> {
    let direct = params.get_string(name).filter(|value| !value.is_empty());
    direct.or_else(|| {
        let reference = params.get_string(&format!("{}{}", name, VALUE_FROM_SUFFIX))?;
        params.get_string(&reference).filter(|value| !value.is_empty())
    })
}
