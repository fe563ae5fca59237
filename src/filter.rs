//! Region selector.
//!
//! The selection is a typed value that is matched against region names with
//! plain equality. It never becomes part of a query string.

use std::fmt;

/// Label of the "no restriction" option in the selector.
pub const ALL_REGIONS: &str = "All Regions";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RegionFilter {
    #[default]
    All,
    Named(String),
}

impl RegionFilter {
    /// Interpret a selector value. `All Regions` (any case) is the sentinel;
    /// anything else names a region, even one that does not exist.
    pub fn from_selection(selection: &str) -> Self {
        let selection = selection.trim();
        if selection.eq_ignore_ascii_case(ALL_REGIONS) {
            RegionFilter::All
        } else {
            RegionFilter::Named(selection.to_string())
        }
    }

    pub fn matches(&self, region_name: &str) -> bool {
        match self {
            RegionFilter::All => true,
            RegionFilter::Named(name) => name == region_name,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            RegionFilter::All => ALL_REGIONS,
            RegionFilter::Named(name) => name,
        }
    }
}

impl fmt::Display for RegionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_case_insensitive() {
        assert_eq!(RegionFilter::from_selection("All Regions"), RegionFilter::All);
        assert_eq!(RegionFilter::from_selection(" all regions "), RegionFilter::All);
    }

    #[test]
    fn named_filter_matches_exactly() {
        let f = RegionFilter::from_selection("Northeast");
        assert!(f.matches("Northeast"));
        assert!(!f.matches("northeast"));
        assert!(!f.matches("Southeast"));
        assert!(RegionFilter::All.matches("anything"));
    }

    #[test]
    fn quotes_in_names_are_plain_text() {
        let f = RegionFilter::from_selection("O'Brien' OR '1'='1");
        assert!(f.matches("O'Brien' OR '1'='1"));
        assert!(!f.matches("Northeast"));
        assert_eq!(f.label(), "O'Brien' OR '1'='1");
    }
}
