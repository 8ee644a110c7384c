// ABOUTME: Extraction of a single tablature page into an AttributedTablature.
// ABOUTME: Applies PageRules to raw markup; returns None when type or body is missing.

use scraper::Html;
use tracing::debug;

use crate::extractors::rules::PageRules;
use crate::extractors::select::{
    capture, capture_groups, count_in, fragment_text, raw_text, select_first, select_nth,
};
use crate::models::{AttributedTablature, TablatureRating, TablatureType};

/// Fields pulled from a tablature page before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFields {
    pub kind: Option<TablatureType>,
    pub artist: String,
    pub title: String,
    pub rating: Option<TablatureRating>,
    pub contents: Option<String>,
}

impl PageFields {
    /// Builds the tablature, or `None` if the type or body is missing.
    pub fn into_tablature(self) -> Option<AttributedTablature> {
        let kind = self.kind?;
        let contents = self.contents.filter(|c| !c.trim().is_empty())?;
        let mut tab = AttributedTablature::new(self.artist, self.title, kind).with_contents(contents);
        tab.rating = self.rating;
        Some(tab)
    }
}

/// Pulls every known field out of a tablature page. Missing markup leaves
/// the corresponding field empty.
pub fn extract_page_fields(html: &str, rules: &PageRules) -> PageFields {
    let kind = capture(html, &rules.type_heading, "label")
        .and_then(|label| TablatureType::from_label(&label));

    let mut heading = capture_groups(html, &rules.title_heading, &["title", "artist"]).into_iter();
    let title = heading.next().flatten().map(|t| fragment_text(&t));
    let artist = heading.next().flatten().map(|a| fragment_text(&a));

    let doc = Html::parse_document(html);

    let rating = select_nth(&doc, &rules.rating_panel, rules.rating_panel_index)
        .map(|panel| TablatureRating::from_count(count_in(&panel, &rules.rating_marker)));

    let contents = select_first(&doc, &rules.body).map(|pre| raw_text(&pre));

    debug!(
        kind = ?kind,
        has_heading = title.is_some(),
        has_rating_panel = rating.is_some(),
        has_body = contents.is_some(),
        "extracted page fields"
    );

    PageFields {
        kind,
        artist: artist.unwrap_or_default(),
        title: title.unwrap_or_default(),
        rating,
        contents,
    }
}

/// Extracts a tablature from page markup.
pub fn extract_tablature(html: &str, rules: &PageRules) -> Option<AttributedTablature> {
    extract_page_fields(html, rules).into_tablature()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::loader::load_builtin_rules;
    use pretty_assertions::assert_eq;

    fn rules() -> PageRules {
        load_builtin_rules().page
    }

    const FULL_PAGE: &str = r#"<html><body>
<div class="panel show-for-medium-up">Share</div>
<div class="panel show-for-medium-up">
  Rating: <img src="/images/star.png"><img src="/images/star.png"><img src="/images/star.png"><img src="/images/star-empty.png">
</div>
<h2>Bass Tabs :</h2>
<h1>"Smells Like Teen Spirit" by Nirvana</h1>
<pre>G|-----------|
D|--3-3-6-6--|</pre>
</body></html>"#;

    #[test]
    fn extracts_minimal_page() {
        let html = r#"<html><body><h2>Bass :</h2><h1>"Song" by Artist</h1><pre>x-x-x</pre></body></html>"#;
        let tab = extract_tablature(html, &rules()).expect("should parse");
        assert_eq!(tab.artist, "Artist");
        assert_eq!(tab.title, "Song");
        assert_eq!(tab.kind, TablatureType::Bass);
        assert_eq!(tab.contents, "x-x-x");
        assert_eq!(tab.rating, None);
    }

    #[test]
    fn extracts_full_page_with_rating() {
        let tab = extract_tablature(FULL_PAGE, &rules()).expect("should parse");
        assert_eq!(tab.artist, "Nirvana");
        assert_eq!(tab.title, "Smells Like Teen Spirit");
        assert_eq!(tab.kind, TablatureType::Bass);
        assert_eq!(tab.contents, "G|-----------|\nD|--3-3-6-6--|");
        assert_eq!(tab.rating, Some(TablatureRating::Three));
    }

    #[test]
    fn missing_body_yields_none() {
        let html = r#"<h2>Bass :</h2><h1>"Song" by Artist</h1>"#;
        assert_eq!(extract_tablature(html, &rules()), None);
    }

    #[test]
    fn blank_body_yields_none() {
        let html = r#"<h2>Chords :</h2><h1>"Song" by Artist</h1><pre>   </pre>"#;
        assert_eq!(extract_tablature(html, &rules()), None);
    }

    #[test]
    fn unknown_type_yields_none() {
        let html = r#"<h2>Drums :</h2><h1>"Song" by Artist</h1><pre>x-x-x</pre>"#;
        assert_eq!(extract_tablature(html, &rules()), None);

        let no_heading = r#"<h1>"Song" by Artist</h1><pre>x-x-x</pre>"#;
        assert_eq!(extract_tablature(no_heading, &rules()), None);
    }

    #[test]
    fn missing_title_heading_defaults_to_empty() {
        let html = r#"<h2>Guitar Tabs :</h2><pre>e|---|</pre>"#;
        let tab = extract_tablature(html, &rules()).expect("should parse");
        assert_eq!(tab.artist, "");
        assert_eq!(tab.title, "");
        assert_eq!(tab.kind, TablatureType::Guitar);
    }

    #[test]
    fn heading_entities_are_decoded() {
        let html = r#"<h2>Chords :</h2><h1>"Mrs. Robinson" by Simon &amp; Garfunkel</h1><pre>C G</pre>"#;
        let tab = extract_tablature(html, &rules()).expect("should parse");
        assert_eq!(tab.artist, "Simon & Garfunkel");
    }

    #[test]
    fn single_panel_means_no_rating() {
        let html = r#"<div class="panel show-for-medium-up"><img src="/images/star.png"></div>
<h2>Tabs :</h2><h1>"Song" by Artist</h1><pre>x</pre>"#;
        let fields = extract_page_fields(html, &rules());
        assert_eq!(fields.rating, None);
    }

    #[test]
    fn rating_panel_without_stars_is_rating_none() {
        let html = r#"<div class="panel show-for-medium-up"></div><div class="panel show-for-medium-up"></div>
<h2>Tabs :</h2><h1>"Song" by Artist</h1><pre>x</pre>"#;
        let tab = extract_tablature(html, &rules()).unwrap();
        assert_eq!(tab.rating, Some(TablatureRating::None));
    }

    #[test]
    fn extraction_is_deterministic() {
        let first = extract_tablature(FULL_PAGE, &rules());
        let second = extract_tablature(FULL_PAGE, &rules());
        assert_eq!(first, second);
    }
}
