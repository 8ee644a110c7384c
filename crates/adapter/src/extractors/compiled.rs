// ABOUTME: Pre-compiled CSS selector and regex cache for O(1) rule lookup.
// ABOUTME: Eliminates repeated parsing of the site rules on every page.

//! Rule caching for efficient repeated DOM and markup queries.
//!
//! Rules are plain strings so they can be loaded from JSON. This module
//! compiles each string once and reuses the result for all later pages.
//! Invalid rules are cached as `None`.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;

static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Option<Selector>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

static REGEX_CACHE: Lazy<RwLock<HashMap<String, Option<Regex>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

// Entries are never mutated after insert, so a poisoned lock is still usable.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

fn get_or_insert<V: Clone>(
    cache: &RwLock<HashMap<String, Option<V>>>,
    key: &str,
    compile: impl FnOnce(&str) -> Option<V>,
) -> Option<V> {
    if let Some(cached) = read(cache).get(key) {
        return cached.clone();
    }

    let compiled = compile(key);
    let mut guard = write(cache);
    guard
        .entry(key.to_string())
        .or_insert(compiled)
        .clone()
}

/// Gets or compiles a CSS selector, caching the result.
///
/// Returns `None` if the selector is invalid.
pub fn get_or_compile_selector(css: &str) -> Option<Selector> {
    get_or_insert(&SELECTOR_CACHE, css, |s| Selector::parse(s).ok())
}

/// Gets or compiles a regex, caching the result.
///
/// Returns `None` if the pattern is invalid.
pub fn get_or_compile_regex(pattern: &str) -> Option<Regex> {
    get_or_insert(&REGEX_CACHE, pattern, |p| Regex::new(p).ok())
}
