use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use crate::config::{ISO8601_FORMAT, SyncConfig};

/// Parses date strings against an ordered list of chrono patterns
///
/// The first pattern that accepts a value wins. Patterns without a zone are
/// read as UTC; date-only patterns resolve to midnight.
#[derive(Debug, Clone)]
pub struct DateParser {
    formats: Vec<String>,
}

impl DateParser {
    pub fn new<I, S>(formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            formats: formats.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.date_formats.iter().cloned())
    }

    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    pub fn parse(&self, value: &str) -> Option<DateTime<FixedOffset>> {
        self.formats
            .iter()
            .find_map(|format| parse_with_format(value, format))
    }

    /// Parses every value or none: one failure yields `None`
    pub fn parse_all<S: AsRef<str>>(&self, values: &[S]) -> Option<Vec<DateTime<FixedOffset>>> {
        values.iter().map(|v| self.parse(v.as_ref())).collect()
    }
}

impl Default for DateParser {
    fn default() -> Self {
        Self::from_config(&SyncConfig::default())
    }
}

fn parse_with_format(value: &str, format: &str) -> Option<DateTime<FixedOffset>> {
    if format == ISO8601_FORMAT {
        return DateTime::parse_from_rfc3339(value).ok();
    }

    if let Ok(dt) = DateTime::parse_from_str(value, format) {
        return Some(dt);
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
        return Some(naive.and_utc().fixed_offset());
    }

    NaiveDate::parse_from_str(value, format)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_first_matching_format_wins() {
        let parser = DateParser::default();

        let dt = parser.parse("2024-01-15T10:30:00+02:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(dt.hour(), 10);

        let dt = parser.parse("2024-01-15").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 1, 15));
        assert_eq!(dt.hour(), 0);

        let dt = parser.parse("15.01.2024 08:05:00").unwrap();
        assert_eq!((dt.day(), dt.hour(), dt.minute()), (15, 8, 5));
    }

    #[test]
    fn test_javascript_date_string() {
        let parser = DateParser::default();
        let dt = parser.parse("Mon Jan 15 2024 10:30:00 GMT+0100").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 3600);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_unparseable_date() {
        let parser = DateParser::default();
        assert!(parser.parse("next tuesday").is_none());
        assert!(parser.parse("").is_none());
    }

    #[test]
    fn test_parse_all_is_all_or_nothing() {
        let parser = DateParser::new(["%Y-%m-%d"]);
        assert_eq!(parser.parse_all(&["2024-01-01", "2024-02-01"]).unwrap().len(), 2);
        assert!(parser.parse_all(&["2024-01-01", "garbage"]).is_none());
    }
}
