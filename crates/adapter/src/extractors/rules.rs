// ABOUTME: Serde models for the site extraction rules (page, listing, search).
// ABOUTME: Every selector and pattern tied to the site's markup is named here.

//! Site extraction rules.
//!
//! CSS selectors are matched with `scraper`; patterns are `regex` syntax and
//! run against the raw page markup. Named capture groups are part of the
//! contract: `label` for the type heading, `title` and `artist` for the
//! song heading, `artist` for the listing banner.

use serde::{Deserialize, Serialize};

use crate::error::AdapterError;
use crate::extractors::compiled::{get_or_compile_regex, get_or_compile_selector};
use crate::site::host_matches;

/// Rules for a single tablature page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRules {
    /// Pattern with a `label` group, e.g. `<h2>Bass Tabs :</h2>`
    pub type_heading: String,
    /// Pattern with `title` and `artist` groups
    pub title_heading: String,
    /// Selector for the panels; the rating panel is picked by index
    pub rating_panel: String,
    /// Zero-based index into the `rating_panel` matches
    #[serde(default)]
    pub rating_panel_index: usize,
    /// Selector for one star inside the rating panel
    pub rating_marker: String,
    /// Selector for the tablature body block
    pub body: String,
}

/// Rules for the paginated artist listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRules {
    /// Appended to the artist slug, e.g. `nirvana-Tabs`
    pub path_suffix: String,
    /// Selector for candidate tables
    pub table: String,
    /// Direct child element that marks the listing table
    pub header: String,
    /// Zero-based cell holding the type label
    pub type_column: usize,
    /// Zero-based cell holding the star markers
    pub rating_column: usize,
    /// Selector for one star inside the rating cell
    pub rating_marker: String,
    /// Pattern with an `artist` group
    pub artist_pattern: String,
}

/// Rules for the free-text search results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRules {
    /// Path of the search endpoint relative to the base URL
    pub path: String,
    /// Query parameter carrying the title
    pub query_param: String,
    /// Tag of the section headings
    pub section_heading: String,
    /// Heading text of the song results section
    pub section_title: String,
    /// Selector for result lists inside the section
    pub list: String,
    /// Selector for the title link inside a list item
    pub title_link: String,
}

/// The complete extraction strategy for the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRules {
    /// Canonical host
    pub domain: String,
    /// Other hosts serving the same pages
    #[serde(default)]
    pub supported_domains: Vec<String>,
    pub page: PageRules,
    pub listing: ListingRules,
    pub search: SearchRules,
}

impl SiteRules {
    /// Parses rules from JSON without validating selectors or patterns.
    pub fn from_json(json: &str) -> Result<Self, AdapterError> {
        serde_json::from_str(json)
            .map_err(|e| AdapterError::config("LoadRules", Some(anyhow::Error::new(e))))
    }

    /// Checks that every selector and pattern compiles.
    pub fn validate(&self) -> Result<(), AdapterError> {
        let selectors = [
            ("page.rating_panel", &self.page.rating_panel),
            ("page.rating_marker", &self.page.rating_marker),
            ("page.body", &self.page.body),
            ("listing.table", &self.listing.table),
            ("listing.header", &self.listing.header),
            ("listing.rating_marker", &self.listing.rating_marker),
            ("search.section_heading", &self.search.section_heading),
            ("search.list", &self.search.list),
            ("search.title_link", &self.search.title_link),
        ];
        for (name, css) in selectors {
            if get_or_compile_selector(css).is_none() {
                return Err(invalid_rule(name, "selector", css));
            }
        }

        let patterns = [
            ("page.type_heading", &self.page.type_heading, &["label"][..]),
            (
                "page.title_heading",
                &self.page.title_heading,
                &["title", "artist"][..],
            ),
            (
                "listing.artist_pattern",
                &self.listing.artist_pattern,
                &["artist"][..],
            ),
        ];
        for (name, pattern, groups) in patterns {
            let re = get_or_compile_regex(pattern)
                .ok_or_else(|| invalid_rule(name, "pattern", pattern))?;
            let names: Vec<&str> = re.capture_names().flatten().collect();
            for group in groups {
                if !names.contains(group) {
                    return Err(AdapterError::config(
                        "ValidateRules",
                        Some(anyhow::anyhow!(
                            "{}: pattern is missing the `{}` group",
                            name,
                            group
                        )),
                    ));
                }
            }
        }

        if self.domain.trim().is_empty() {
            return Err(AdapterError::config(
                "ValidateRules",
                Some(anyhow::anyhow!("domain must not be empty")),
            ));
        }
        Ok(())
    }

    /// Returns true if `host` is the canonical domain, its `www.` form, or
    /// one of the supported domains. Case-insensitive, exact.
    pub fn matches_host(&self, host: &str) -> bool {
        host_matches(host, &self.domain)
            || self
                .supported_domains
                .iter()
                .any(|d| d.eq_ignore_ascii_case(host))
    }
}

fn invalid_rule(name: &str, what: &str, value: &str) -> AdapterError {
    AdapterError::config(
        "ValidateRules",
        Some(anyhow::anyhow!("{}: invalid {} {:?}", name, what, value)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::loader::load_builtin_rules;

    #[test]
    fn from_json_rejects_missing_sections() {
        let err = SiteRules::from_json(r#"{"domain": "example.com"}"#).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn validate_rejects_bad_selector() {
        let mut rules = load_builtin_rules();
        rules.page.body = "[[[invalid".to_string();
        let err = rules.validate().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("page.body"));
    }

    #[test]
    fn validate_rejects_pattern_without_group() {
        let mut rules = load_builtin_rules();
        rules.page.title_heading = "<h1>(?P<title>.*?)</h1>".to_string();
        let err = rules.validate().unwrap_err();
        assert!(err.to_string().contains("artist"));
    }

    #[test]
    fn matches_host_is_exact_and_case_insensitive() {
        let rules = load_builtin_rules();
        assert!(rules.matches_host("guitartabsexplorer.com"));
        assert!(rules.matches_host("WWW.GuitarTabsExplorer.com"));
        assert!(!rules.matches_host("sub.guitartabsexplorer.com"));
        assert!(!rules.matches_host("guitartabsexplorer.com.evil.net"));
        assert!(!rules.matches_host("example.com"));
    }

    #[test]
    fn serde_roundtrip_keeps_rules() {
        let rules = load_builtin_rules();
        let json = serde_json::to_string(&rules).expect("serialize");
        let parsed = SiteRules::from_json(&json).expect("deserialize");
        assert_eq!(parsed, rules);
    }
}
