// ABOUTME: Markup extraction for guitartabsexplorer.com pages.
// ABOUTME: Rules describe where data lives; the other submodules apply them.

//! Extraction module.
//!
//! All knowledge of the site's markup lives in [`rules::SiteRules`]. The
//! page, listing and search extractors read their selectors and patterns
//! from it, so a site redesign means editing one JSON document.
//!
//! Submodules:
//! - `rules`: serde models for the extraction rules.
//! - `loader`: built-in rules embedded from `data/`.
//! - `compiled`: process-wide cache of compiled selectors and regexes.
//! - `select`: optional-returning DOM and regex helpers.
//! - `page`: single tablature page extraction.
//! - `listing`: artist listing page extraction and pagination.
//! - `search`: free-text search page extraction.

pub mod compiled;
pub mod listing;
pub mod loader;
pub mod page;
pub mod rules;
pub mod search;
pub mod select;
