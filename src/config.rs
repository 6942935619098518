use serde::Deserialize;
use crate::core::{Result, SyncError};

/// Pattern name standing for RFC 3339 / ISO 8601 timestamps
pub const ISO8601_FORMAT: &str = "ISO8601";

/// Property synchronization configuration
///
/// Process-wide settings, fixed once a service has been built from them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Ordered chrono patterns tried when a value is written as a date
    pub date_formats: Vec<String>,

    /// Maximum length of a principal name derived from a hint
    pub principal_name_max_length: usize,

    /// Parameters consulted, in order, for a user name hint
    pub user_name_hint_properties: Vec<String>,

    /// Parameters consulted, in order, for a group name hint
    pub group_name_hint_properties: Vec<String>,

    /// Number of random suffixes tried before giving up on a unique name
    pub collision_retry_limit: usize,

    /// Exclusive upper bound of the random collision suffix
    pub collision_suffix_bound: u32,

    /// Node type for intermediate nodes created without an explicit type
    pub default_node_type: String,
}

impl SyncConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self {
            date_formats: vec![
                "%a %b %d %Y %H:%M:%S GMT%z".to_string(),
                ISO8601_FORMAT.to_string(),
                "%Y-%m-%dT%H:%M:%S%.f".to_string(),
                "%Y-%m-%dT%H:%M:%S".to_string(),
                "%Y-%m-%d".to_string(),
                "%d.%m.%Y %H:%M:%S".to_string(),
                "%d.%m.%Y".to_string(),
            ],
            principal_name_max_length: 20,
            user_name_hint_properties: vec!["displayName".to_string()],
            group_name_hint_properties: vec!["displayName".to_string()],
            collision_retry_limit: 1000,
            collision_suffix_bound: 9999,
            default_node_type: "nt:unstructured".to_string(),
        }
    }

    /// Replace the date format list
    pub fn date_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_formats = formats.into_iter().map(Into::into).collect();
        self
    }

    /// Set the maximum hint-derived principal name length
    pub fn principal_name_max_length(mut self, max: usize) -> Self {
        self.principal_name_max_length = max;
        self
    }

    /// Set the user name hint parameters
    pub fn user_name_hint_properties<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_name_hint_properties = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the group name hint parameters
    pub fn group_name_hint_properties<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_name_hint_properties = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the collision retry bound
    pub fn collision_retry_limit(mut self, limit: usize) -> Self {
        self.collision_retry_limit = limit;
        self
    }

    /// Set the exclusive upper bound for random collision suffixes
    pub fn collision_suffix_bound(mut self, bound: u32) -> Self {
        self.collision_suffix_bound = bound;
        self
    }

    /// Set the default node type
    pub fn default_node_type(mut self, node_type: &str) -> Self {
        self.default_node_type = node_type.to_string();
        self
    }

    /// Parse from a JSON document; absent keys keep their defaults
    ///
    /// # Examples
    ///
    /// ```
    /// # use authsync::SyncConfig;
    /// let config = SyncConfig::from_json(r#"{ "principal_name_max_length": 32 }"#).unwrap();
    /// assert_eq!(config.principal_name_max_length, 32);
    /// assert_eq!(config.collision_retry_limit, 1000);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SyncError::Validation(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.date_formats.is_empty() {
            return Err(SyncError::Validation("date_formats cannot be empty".into()));
        }

        if self.principal_name_max_length == 0 {
            return Err(SyncError::Validation(
                "principal_name_max_length must be > 0".into(),
            ));
        }

        if self.collision_retry_limit == 0 {
            return Err(SyncError::Validation("collision_retry_limit must be > 0".into()));
        }

        if self.collision_suffix_bound == 0 {
            return Err(SyncError::Validation("collision_suffix_bound must be > 0".into()));
        }

        if self.default_node_type.is_empty() {
            return Err(SyncError::Validation("default_node_type cannot be empty".into()));
        }

        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}
