// ABOUTME: Extraction of artist listing pages: song rows, banner artist name and page count.
// ABOUTME: Ad rows and rows with an unknown type are dropped here; type filtering is left to the caller.

use anyhow::anyhow;
use scraper::{ElementRef, Html};
use tracing::debug;

use crate::extractors::rules::ListingRules;
use crate::extractors::select::{
    capture, child_elements, children_named, count_in, fragment_text, matches,
    next_element_sibling, select_all, text,
};
use crate::models::{TablatureRating, TablatureType};

/// One song row of an artist listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    pub title: String,
    pub href: String,
    pub kind: TablatureType,
    pub rating: TablatureRating,
}

/// Everything read from one listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Artist name as the site spells it, from the page banner
    pub artist: Option<String>,
    pub rows: Vec<ListingRow>,
    /// Highest page number in the pagination control, if there is one
    pub total_pages: Option<u32>,
}

/// Extracts a listing page. Fails only when no listing table exists.
pub fn extract_listing(html: &str, rules: &ListingRules) -> anyhow::Result<ListingPage> {
    let doc = Html::parse_document(html);

    let table = find_listing_table(&doc, rules)
        .ok_or_else(|| anyhow!("no table with a {:?} header", rules.header))?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for tbody in children_named(&table, "tbody") {
        for tr in children_named(&tbody, "tr") {
            match extract_row(&tr, rules) {
                Some(row) => rows.push(row),
                None => skipped += 1,
            }
        }
    }

    let total_pages = next_element_sibling(&table).and_then(|p| max_page_number(&p));

    let artist = capture(html, &rules.artist_pattern, "artist")
        .map(|a| fragment_text(&a))
        .filter(|a| !a.is_empty());

    debug!(
        rows = rows.len(),
        skipped,
        total_pages = ?total_pages,
        "extracted listing page"
    );

    Ok(ListingPage {
        artist,
        rows,
        total_pages,
    })
}

fn find_listing_table<'a>(doc: &'a Html, rules: &ListingRules) -> Option<ElementRef<'a>> {
    select_all(doc, &rules.table).into_iter().find(|table| {
        child_elements(table).any(|child| matches(&child, &rules.header))
    })
}

// Rows without a link are embedded adverts.
fn extract_row(tr: &ElementRef<'_>, rules: &ListingRules) -> Option<ListingRow> {
    let cells: Vec<ElementRef<'_>> = children_named(tr, "td").collect();

    let link = cells
        .iter()
        .find_map(|td| children_named(td, "a").next())?;
    let href = link.value().attr("href")?.trim().to_string();
    if href.is_empty() {
        return None;
    }
    let title = text(&link);

    let kind = cells
        .get(rules.type_column)
        .and_then(|td| TablatureType::from_label(&text(td)))?;

    let stars = cells
        .get(rules.rating_column)
        .map(|td| count_in(td, &rules.rating_marker))
        .unwrap_or(0);

    Some(ListingRow {
        title,
        href,
        kind,
        rating: TablatureRating::from_count(stars),
    })
}

/// Largest number among the text nodes of a pagination control. Labels
/// such as "Next" or "..." are ignored.
pub fn max_page_number(pagination: &ElementRef<'_>) -> Option<u32> {
    pagination
        .text()
        .filter_map(|chunk| chunk.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::loader::load_builtin_rules;
    use pretty_assertions::assert_eq;

    fn rules() -> ListingRules {
        load_builtin_rules().listing
    }

    const LISTING: &str = r#"<html><body>
<p>Browse our Nirvana collection of tabs</p>
<table class="sidebar"><tr><td>Popular</td></tr></table>
<table>
  <thead><tr><th>Song</th><th>Type</th><th>Rating</th></tr></thead>
  <tbody>
    <tr><td><a href="/nirvana-tabs/lithium-tab.html">Lithium</a></td><td>Guitar Tabs</td><td><i class="fa fa-star"></i><i class="fa fa-star"></i><i class="fa fa-star-o"></i></td></tr>
    <tr><td colspan="3"><script>ads()</script></td></tr>
    <tr><td><a href="/nirvana-tabs/polly-bass.html">Polly</a></td><td>Bass Tabs</td><td></td></tr>
    <tr><td><a href="/nirvana-tabs/about-a-girl-lesson.html">About A Girl</a></td><td>Video Lesson</td><td></td></tr>
    <tr><td><a href="/nirvana-tabs/come-as-you-are-chords.html">Come As You Are</a></td><td>Chords</td><td><i class="fa fa-star"></i></td></tr>
  </tbody>
</table>
<ul class="pagination">
  <li class="current"><a href="/nirvana-Tabs/1/">1</a></li>
  <li><a href="/nirvana-Tabs/2/">2</a></li>
  <li><a href="/nirvana-Tabs/3/">3</a></li>
  <li><a href="/nirvana-Tabs/2/">Next</a></li>
</ul>
</body></html>"#;

    #[test]
    fn extracts_rows_in_document_order() {
        let page = extract_listing(LISTING, &rules()).expect("listing");
        let titles: Vec<&str> = page.rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Lithium", "Polly", "Come As You Are"]);

        assert_eq!(page.rows[0].href, "/nirvana-tabs/lithium-tab.html");
        assert_eq!(page.rows[0].kind, TablatureType::Guitar);
        assert_eq!(page.rows[0].rating, TablatureRating::Two);
        assert_eq!(page.rows[1].kind, TablatureType::Bass);
        assert_eq!(page.rows[1].rating, TablatureRating::None);
        assert_eq!(page.rows[2].kind, TablatureType::Chords);
        assert_eq!(page.rows[2].rating, TablatureRating::One);
    }

    #[test]
    fn reads_banner_artist_and_page_count() {
        let page = extract_listing(LISTING, &rules()).expect("listing");
        assert_eq!(page.artist.as_deref(), Some("Nirvana"));
        assert_eq!(page.total_pages, Some(3));
    }

    #[test]
    fn page_count_ignores_next_label_position() {
        // Last page: no "Next" link, current page rendered without a link.
        let html = r#"<table><thead><tr><th>Song</th></tr></thead><tbody></tbody></table>
<div class="pagination"><a href="/x/1/">1</a> <a href="/x/2/">2</a> <span>3</span></div>"#;
        let page = extract_listing(html, &rules()).expect("listing");
        assert_eq!(page.total_pages, Some(3));
        assert!(page.rows.is_empty());
    }

    #[test]
    fn missing_pagination_is_none() {
        let html = r#"<table><thead><tr><th>Song</th></tr></thead>
<tbody><tr><td><a href="/a.html">A</a></td><td>Tabs</td><td></td></tr></tbody></table>"#;
        let page = extract_listing(html, &rules()).expect("listing");
        assert_eq!(page.total_pages, None);
        assert_eq!(page.artist, None);
        assert_eq!(page.rows.len(), 1);
    }

    #[test]
    fn unparsable_pagination_is_none() {
        let html = r#"<table><thead><tr><th>Song</th></tr></thead><tbody></tbody></table>
<div><a href="/next">Next</a> <a href="/more">...</a></div>"#;
        let page = extract_listing(html, &rules()).expect("listing");
        assert_eq!(page.total_pages, None);
    }

    #[test]
    fn missing_table_is_an_error() {
        let html = r#"<html><body><p>Artist not found</p></body></html>"#;
        assert!(extract_listing(html, &rules()).is_err());
    }
}
