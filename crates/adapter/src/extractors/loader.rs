// ABOUTME: Loader for the built-in site rules from embedded JSON data.
// ABOUTME: Provides load_builtin_rules() to initialize the default SiteRules.

//! Built-in site rules loader.
//!
//! The default rules ship inside the binary so the adapter works without
//! any configuration. Hosts that need to follow a site redesign before a
//! new release can load their own JSON through [`SiteRules::from_json`].

use once_cell::sync::Lazy;

use crate::extractors::rules::SiteRules;

/// Embedded JSON containing the rules for guitartabsexplorer.com.
const BUILTIN_RULES_JSON: &str = include_str!("../../data/guitartabsexplorer.json");

static BUILTIN_RULES: Lazy<SiteRules> = Lazy::new(|| {
    SiteRules::from_json(BUILTIN_RULES_JSON).expect("failed to parse builtin site rules")
});

/// Returns a copy of the built-in rules.
///
/// # Panics
///
/// Panics if the embedded JSON is malformed or cannot be deserialized.
pub fn load_builtin_rules() -> SiteRules {
    BUILTIN_RULES.clone()
}
