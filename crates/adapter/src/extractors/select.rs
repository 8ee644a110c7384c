// ABOUTME: Optional-returning DOM and regex helpers used by the page, listing and search extractors.
// ABOUTME: Every lookup yields Option so missing markup never panics.

//! Selector-based extraction utilities.
//!
//! Key behaviors:
//! - Invalid selectors or patterns behave like "no match".
//! - Text helpers either keep the raw text (for `<pre>` bodies) or collapse
//!   whitespace (for labels and names).
//! - Child/sibling helpers skip text and comment nodes.

use scraper::{ElementRef, Html};

use crate::extractors::compiled::{get_or_compile_regex, get_or_compile_selector};

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Concatenated text of an element and its descendants, entities decoded.
pub fn raw_text(el: &ElementRef<'_>) -> String {
    el.text().collect()
}

/// Text of an element with whitespace normalized.
pub fn text(el: &ElementRef<'_>) -> String {
    normalize_whitespace(&raw_text(el))
}

/// Decodes entities and drops tags from a markup fragment captured by a regex.
pub fn fragment_text(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    normalize_whitespace(&fragment.root_element().text().collect::<String>())
}

/// First element in the document matching `css`.
pub fn select_first<'a>(doc: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = get_or_compile_selector(css)?;
    doc.select(&selector).next()
}

/// The `index`-th (zero-based) element in the document matching `css`.
pub fn select_nth<'a>(doc: &'a Html, css: &str, index: usize) -> Option<ElementRef<'a>> {
    let selector = get_or_compile_selector(css)?;
    doc.select(&selector).nth(index)
}

/// All elements in the document matching `css`, in document order.
pub fn select_all<'a>(doc: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match get_or_compile_selector(css) {
        Some(selector) => doc.select(&selector).collect(),
        None => vec![],
    }
}

/// First descendant of `scope` matching `css`.
pub fn select_first_in<'a>(scope: &ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = get_or_compile_selector(css)?;
    scope.select(&selector).next()
}

/// All descendants of `scope` matching `css`, in document order.
pub fn select_all_in<'a>(scope: &ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match get_or_compile_selector(css) {
        Some(selector) => scope.select(&selector).collect(),
        None => vec![],
    }
}

/// Number of descendants of `scope` matching `css`.
pub fn count_in(scope: &ElementRef<'_>, css: &str) -> usize {
    match get_or_compile_selector(css) {
        Some(selector) => scope.select(&selector).count(),
        None => 0,
    }
}

/// True if `el` itself matches `css`.
pub fn matches(el: &ElementRef<'_>, css: &str) -> bool {
    get_or_compile_selector(css).is_some_and(|selector| selector.matches(el))
}

/// Direct element children of `el`.
pub fn child_elements<'a>(el: &ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

/// Direct element children of `el` with the given tag name.
pub fn children_named<'a>(
    el: &ElementRef<'a>,
    name: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> {
    child_elements(el).filter(move |c| c.value().name().eq_ignore_ascii_case(name))
}

/// The next sibling of `el` that is an element.
pub fn next_element_sibling<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

/// Named capture group of the first match of `pattern` in `haystack`.
pub fn capture(haystack: &str, pattern: &str, group: &str) -> Option<String> {
    let re = get_or_compile_regex(pattern)?;
    let caps = re.captures(haystack)?;
    caps.name(group).map(|m| m.as_str().to_string())
}

/// Several named groups from the first match of `pattern`; groups that did
/// not participate come back as `None`.
pub fn capture_groups(haystack: &str, pattern: &str, groups: &[&str]) -> Vec<Option<String>> {
    let caps = get_or_compile_regex(pattern).and_then(|re| {
        re.captures(haystack).map(|c| {
            groups
                .iter()
                .map(|g| c.name(g).map(|m| m.as_str().to_string()))
                .collect::<Vec<_>>()
        })
    });
    caps.unwrap_or_else(|| vec![None; groups.len()])
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <html><body>
            <h1>  Main   Title  </h1>
            <div class="panel show-for-medium-up">first</div>
            <div class="panel show-for-medium-up">second <img src="/images/star.png"><img src="/images/star.png"></div>
            <table><thead><tr><th>Song</th></tr></thead></table>
            text between
            <div class="pagination"><a href="/2">2</a></div>
            <pre>e|--0--|
B|--1--|</pre>
        </body></html>
    "#;

    fn doc() -> Html {
        Html::parse_document(SAMPLE_HTML)
    }

    #[test]
    fn text_normalizes_whitespace() {
        let doc = doc();
        let h1 = select_first(&doc, "h1").unwrap();
        assert_eq!(text(&h1), "Main Title");
    }

    #[test]
    fn raw_text_keeps_line_breaks() {
        let doc = doc();
        let pre = select_first(&doc, "pre").unwrap();
        assert_eq!(raw_text(&pre), "e|--0--|\nB|--1--|");
    }

    #[test]
    fn select_nth_and_count() {
        let doc = doc();
        let panel = select_nth(&doc, "div[class='panel show-for-medium-up']", 1).unwrap();
        assert_eq!(count_in(&panel, "img[src='/images/star.png']"), 2);
        assert!(select_nth(&doc, "div[class='panel show-for-medium-up']", 2).is_none());
    }

    #[test]
    fn next_element_sibling_skips_text() {
        let doc = doc();
        let table = select_first(&doc, "table").unwrap();
        let next = next_element_sibling(&table).unwrap();
        assert_eq!(next.value().attr("class"), Some("pagination"));
    }

    #[test]
    fn children_named_only_direct() {
        let doc = doc();
        let table = select_first(&doc, "table").unwrap();
        assert_eq!(children_named(&table, "thead").count(), 1);
        assert_eq!(children_named(&table, "tr").count(), 0);
    }

    #[test]
    fn invalid_selector_is_no_match() {
        let doc = doc();
        assert!(select_first(&doc, "[[[invalid").is_none());
        assert!(select_all(&doc, "[[[invalid").is_empty());
    }

    #[test]
    fn capture_named_groups() {
        let html = r#"<h1>"Lithium" by Nirvana</h1>"#;
        let pattern = r#"<h1>"(?P<title>.*?)" by (?P<artist>.*?)</h1>"#;
        assert_eq!(capture(html, pattern, "artist").as_deref(), Some("Nirvana"));
        assert_eq!(
            capture_groups(html, pattern, &["title", "artist"]),
            vec![Some("Lithium".to_string()), Some("Nirvana".to_string())]
        );
        assert_eq!(
            capture_groups("nothing", pattern, &["title", "artist"]),
            vec![None, None]
        );
    }

    #[test]
    fn fragment_text_decodes_entities() {
        assert_eq!(fragment_text("Simon &amp; Garfunkel"), "Simon & Garfunkel");
        assert_eq!(fragment_text("<b>Bold</b> text"), "Bold text");
    }
}
