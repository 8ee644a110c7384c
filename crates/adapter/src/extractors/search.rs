// ABOUTME: Extraction of the free-text search results page ("Matching songs" section).
// ABOUTME: Items missing a link or a recognizable type label are dropped.

use anyhow::anyhow;
use scraper::{ElementRef, Html};
use tracing::debug;

use crate::extractors::rules::SearchRules;
use crate::extractors::select::{
    children_named, matches, next_element_sibling, raw_text, select_all, select_all_in,
    select_first_in, text,
};
use crate::models::TablatureType;

/// One song entry from the search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchItem {
    pub artist: String,
    pub title: String,
    pub href: String,
    pub kind: TablatureType,
}

/// Extracts the song entries of a search results page.
///
/// A page without the songs section has no matches and yields an empty
/// list. A section heading with nothing after it is a structure error.
pub fn extract_search_items(html: &str, rules: &SearchRules) -> anyhow::Result<Vec<SearchItem>> {
    let doc = Html::parse_document(html);

    let Some(heading) = select_all(&doc, &rules.section_heading)
        .into_iter()
        .find(|h| text(h).eq_ignore_ascii_case(rules.section_title.trim()))
    else {
        debug!(section = %rules.section_title, "search page has no songs section");
        return Ok(vec![]);
    };

    let container = next_element_sibling(&heading)
        .ok_or_else(|| anyhow!("{:?} heading has no results container", rules.section_title))?;

    let mut lists = Vec::new();
    if matches(&container, &rules.list) {
        lists.push(container);
    }
    lists.extend(select_all_in(&container, &rules.list));

    let mut items = Vec::new();
    let mut skipped = 0usize;
    for list in &lists {
        for li in children_named(list, "li") {
            match extract_item(&li, rules) {
                Some(item) => items.push(item),
                None => skipped += 1,
            }
        }
    }

    debug!(
        lists = lists.len(),
        items = items.len(),
        skipped,
        "extracted search page"
    );
    Ok(items)
}

fn extract_item(li: &ElementRef<'_>, rules: &SearchRules) -> Option<SearchItem> {
    let artist = children_named(li, "a").next().map(|a| text(&a))?;

    let link = select_first_in(li, &rules.title_link)?;
    let href = link.value().attr("href")?.trim().to_string();
    if href.is_empty() {
        return None;
    }
    let title = text(&link);

    let kind = trailing_label(&raw_text(li)).and_then(TablatureType::from_label)?;

    Some(SearchItem {
        artist,
        title,
        href,
        kind,
    })
}

/// Text after the last `(`, without the parentheses.
fn trailing_label(s: &str) -> Option<&str> {
    let start = s.rfind('(')?;
    let label = s[start + 1..].trim();
    Some(label.trim_end_matches(')').trim())
}
