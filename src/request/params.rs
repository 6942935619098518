use crate::core::ValueEntry;

/// Insertion-ordered multimap of request parameters
///
/// # Examples
///
/// ```
/// use authsync::RequestParameters;
///
/// let params = RequestParameters::new()
///     .with(":name", "alice")
///     .with("tags", "a")
///     .with("tags", "b");
///
/// assert_eq!(params.get_string(":name").as_deref(), Some("alice"));
/// assert_eq!(params.get_strings("tags"), vec!["a", "b"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParameters {
    entries: Vec<(String, Vec<ValueEntry>)>,
}

impl RequestParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`add`](Self::add)
    pub fn with(mut self, name: &str, value: impl Into<ValueEntry>) -> Self {
        self.add(name, value);
        self
    }

    /// Appends one value to `name`, creating the parameter if needed
    pub fn add(&mut self, name: &str, value: impl Into<ValueEntry>) -> &mut Self {
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name.to_string(), vec![value])),
        }
        self
    }

    /// Appends an uploaded file to `name`
    pub fn add_file(
        &mut self,
        name: &str,
        file_name: &str,
        content_type: Option<&str>,
        data: Vec<u8>,
    ) -> &mut Self {
        self.add(
            name,
            ValueEntry::Binary {
                data,
                file_name: Some(file_name.to_string()),
                content_type: content_type.map(str::to_string),
            },
        )
    }

    /// Replaces all values of `name`
    pub fn set(&mut self, name: &str, values: Vec<ValueEntry>) -> &mut Self {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((name.to_string(), values)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&[ValueEntry]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// The value of `name` if it holds exactly one
    pub fn get_string(&self, name: &str) -> Option<String> {
        match self.get(name) {
            Some([single]) => Some(single.as_string().into_owned()),
            _ => None,
        }
    }

    pub fn get_strings(&self, name: &str) -> Vec<String> {
        self.get(name)
            .map(|values| values.iter().map(|v| v.as_string().into_owned()).collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ValueEntry])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RequestParameters
where
    K: AsRef<str>,
    V: Into<ValueEntry>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.add(name.as_ref(), value);
        }
        params
    }
}
