// ABOUTME: Tablature data model: type, rating, attributed tablature, search query and result.
// ABOUTME: Includes the free-text type classifier shared by the page parser and search engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Instrument/notation classification of a tablature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TablatureType {
    Guitar,
    Chords,
    Bass,
}

impl TablatureType {
    /// All types the site publishes.
    pub const ALL: [TablatureType; 3] = [
        TablatureType::Guitar,
        TablatureType::Chords,
        TablatureType::Bass,
    ];

    /// Classifies a free-text label such as "Bass Tabs" or "Chords".
    ///
    /// Case-insensitive substring match, checked in the order
    /// "bass", "chords", "tabs".
    pub fn from_label(label: &str) -> Option<TablatureType> {
        let lower = label.to_lowercase();
        if lower.contains("bass") {
            Some(TablatureType::Bass)
        } else if lower.contains("chords") {
            Some(TablatureType::Chords)
        } else if lower.contains("tabs") {
            Some(TablatureType::Guitar)
        } else {
            None
        }
    }

    /// Path segment used by artist listing pages to filter by type.
    pub fn path_segment(&self) -> &'static str {
        match self {
            TablatureType::Guitar => "tabs",
            TablatureType::Chords => "chords",
            TablatureType::Bass => "bass",
        }
    }
}

impl fmt::Display for TablatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TablatureType::Guitar => "guitar",
            TablatureType::Chords => "chords",
            TablatureType::Bass => "bass",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for TablatureType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "guitar" | "tab" | "tabs" => Ok(TablatureType::Guitar),
            "chords" | "chord" => Ok(TablatureType::Chords),
            "bass" => Ok(TablatureType::Bass),
            other => Err(format!("unknown tablature type: {}", other)),
        }
    }
}

/// Star rating shown by the site, from zero to five stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TablatureRating {
    #[default]
    None,
    One,
    Two,
    Three,
    Four,
    Five,
}

impl TablatureRating {
    /// Highest number of stars the site displays.
    pub const MAX_STARS: usize = 5;

    /// Maps a count of star markers to a rating, clamping at five stars.
    pub fn from_count(count: usize) -> TablatureRating {
        match count.min(Self::MAX_STARS) {
            0 => TablatureRating::None,
            1 => TablatureRating::One,
            2 => TablatureRating::Two,
            3 => TablatureRating::Three,
            4 => TablatureRating::Four,
            _ => TablatureRating::Five,
        }
    }

    /// Number of stars this rating represents.
    pub fn stars(&self) -> usize {
        *self as usize
    }
}

/// A tablature attributed to an artist and song title.
///
/// Search results carry these as stubs with empty `contents`; the page
/// parser fills `contents` and, when the page shows one, `rating`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributedTablature {
    pub artist: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: TablatureType,
    #[serde(default)]
    pub contents: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<TablatureRating>,
}

impl AttributedTablature {
    /// Create a tablature stub without contents.
    pub fn new(artist: impl Into<String>, title: impl Into<String>, kind: TablatureType) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            kind,
            contents: String::new(),
            rating: None,
        }
    }

    /// Set the body text.
    pub fn with_contents(mut self, contents: impl Into<String>) -> Self {
        self.contents = contents.into();
        self
    }

    /// Set the rating.
    pub fn with_rating(mut self, rating: TablatureRating) -> Self {
        self.rating = Some(rating);
        self
    }
}

/// What the host is looking for. Empty strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub artist: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<TablatureType>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn kind(mut self, kind: TablatureType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Artist with surrounding whitespace removed, if non-empty.
    pub fn artist_str(&self) -> Option<&str> {
        non_empty(self.artist.as_deref())
    }

    /// Title with surrounding whitespace removed, if non-empty.
    pub fn title_str(&self) -> Option<&str> {
        non_empty(self.title.as_deref())
    }

    /// True when `kind` passes this query's optional type filter.
    pub fn accepts(&self, kind: TablatureType) -> bool {
        self.kind.map_or(true, |wanted| wanted == kind)
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// One hit from a search, pointing at a detail page the parser can open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: SearchQuery,
    pub engine: String,
    pub tablature: AttributedTablature,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<TablatureRating>,
}
