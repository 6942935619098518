use lazy_static::lazy_static;
use regex::Regex;

/// Rewrites a name hint into a valid principal name
pub trait PrincipalNameFilter: Send + Sync {
    fn filter(&self, name: &str) -> String;
}

lazy_static! {
    static ref DISALLOWED: Regex = Regex::new(r"[^a-z0-9_]+").unwrap();
    static ref REPEATED_UNDERSCORE: Regex = Regex::new(r"_{2,}").unwrap();
}

/// Lower-cases the hint and collapses every run of characters outside
/// `[a-z0-9_]` into a single underscore
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPrincipalNameFilter;

impl PrincipalNameFilter for DefaultPrincipalNameFilter {
    fn filter(&self, name: &str) -> String {
        let lowered = name.to_lowercase();
        let replaced = DISALLOWED.replace_all(&lowered, "_");
        let collapsed = REPEATED_UNDERSCORE.replace_all(&replaced, "_");
        let trimmed = collapsed.trim_matches('_');
        if trimmed.is_empty() {
            "_".to_string()
        } else {
            trimmed.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        let filter = DefaultPrincipalNameFilter;
        assert_eq!(filter.filter("Bob"), "bob");
        assert_eq!(filter.filter("Jane Q. Public"), "jane_q_public");
        assert_eq!(filter.filter("a  --  b"), "a_b");
        assert_eq!(filter.filter("snake_case_ok"), "snake_case_ok");
        assert_eq!(filter.filter("Zoë"), "zo");
        assert_eq!(filter.filter("!!!"), "_");
    }
}
