use std::borrow::Cow;
use std::fmt;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use rust_decimal::Decimal;
use uuid::Uuid;
use crate::core::PropertyType;

/// Typed value stored on an authorizable or one of its nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Binary(Vec<u8>),
    Long(i64),
    Double(f64),
    Decimal(Decimal),
    Date(DateTime<FixedOffset>),
    Boolean(bool),
    Name(String),
    Path(String),
    Reference(Uuid),
    WeakReference(Uuid),
    Uri(String),
}

impl Value {
    pub fn property_type(&self) -> PropertyType {
        match self {
            Self::String(_) => PropertyType::String,
            Self::Binary(_) => PropertyType::Binary,
            Self::Long(_) => PropertyType::Long,
            Self::Double(_) => PropertyType::Double,
            Self::Decimal(_) => PropertyType::Decimal,
            Self::Date(_) => PropertyType::Date,
            Self::Boolean(_) => PropertyType::Boolean,
            Self::Name(_) => PropertyType::Name,
            Self::Path(_) => PropertyType::Path,
            Self::Reference(_) => PropertyType::Reference,
            Self::WeakReference(_) => PropertyType::WeakReference,
            Self::Uri(_) => PropertyType::Uri,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Name(s) | Self::Path(s) | Self::Uri(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Long(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(f) => Some(*f),
            Self::Long(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Self::Date(d) => Some(d),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) | Self::Name(s) | Self::Path(s) | Self::Uri(s) => write!(f, "{}", s),
            Self::Binary(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            Self::Long(i) => write!(f, "{}", i),
            Self::Double(d) => write!(f, "{}", d),
            Self::Decimal(d) => write!(f, "{}", d),
            Self::Date(d) => write!(f, "{}", d.to_rfc3339_opts(SecondsFormat::Millis, false)),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Reference(u) | Self::WeakReference(u) => write!(f, "{}", u),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Long(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Double(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

/// Single- or multi-valued property content
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Single(Value),
    Multiple(Vec<Value>),
}

impl PropertyValue {
    pub fn is_multiple(&self) -> bool {
        matches!(self, Self::Multiple(_))
    }

    /// All values in stored order; a single value is a one-element slice
    pub fn values(&self) -> &[Value] {
        match self {
            Self::Single(v) => std::slice::from_ref(v),
            Self::Multiple(vs) => vs,
        }
    }

    pub fn first(&self) -> Option<&Value> {
        self.values().first()
    }

    pub fn as_single(&self) -> Option<&Value> {
        match self {
            Self::Single(v) => Some(v),
            Self::Multiple(_) => None,
        }
    }
}

impl From<Value> for PropertyValue {
    fn from(v: Value) -> Self {
        Self::Single(v)
    }
}

impl From<Vec<Value>> for PropertyValue {
    fn from(vs: Vec<Value>) -> Self {
        Self::Multiple(vs)
    }
}

/// One raw value of a request parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueEntry {
    Text(String),
    Binary {
        data: Vec<u8>,
        file_name: Option<String>,
        content_type: Option<String>,
    },
}

impl ValueEntry {
    /// String form of the entry; binary content is decoded lossily as UTF-8
    pub fn as_string(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s),
            Self::Binary { data, .. } => String::from_utf8_lossy(data),
        }
    }

    /// Uploaded files carry a file name; plain binary bodies do not
    pub fn is_file_upload(&self) -> bool {
        matches!(self, Self::Binary { file_name: Some(_), .. })
    }
}

impl From<&str> for ValueEntry {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ValueEntry {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_types() {
        assert_eq!(Value::from(42i64).property_type(), PropertyType::Long);
        assert_eq!(Value::from("x").property_type(), PropertyType::String);
        assert_eq!(Value::Uri("http://a".into()).as_str(), Some("http://a"));
        assert_eq!(Value::Long(3).as_f64(), Some(3.0));
    }

    #[test]
    fn test_property_value_slices() {
        let single = PropertyValue::from(Value::from(true));
        assert_eq!(single.values().len(), 1);
        assert!(!single.is_multiple());

        let multi = PropertyValue::from(vec![Value::Long(1), Value::Long(2)]);
        assert!(multi.is_multiple());
        assert_eq!(multi.first(), Some(&Value::Long(1)));
        assert!(multi.as_single().is_none());
    }

    #[test]
    fn test_file_upload_detection() {
        let upload = ValueEntry::Binary {
            data: b"abc".to_vec(),
            file_name: Some("a.txt".into()),
            content_type: Some("text/plain".into()),
        };
        assert!(upload.is_file_upload());
        assert_eq!(upload.as_string(), "abc");

        let body = ValueEntry::Binary { data: vec![], file_name: None, content_type: None };
        assert!(!body.is_file_upload());
        assert!(!ValueEntry::from("x").is_file_upload());
    }
}
