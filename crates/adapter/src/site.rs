// ABOUTME: Static identity and capability metadata for the guitartabsexplorer.com adapter.
// ABOUTME: Also hosts the URL matcher deciding whether a URL belongs to the site.

use serde::{Deserialize, Serialize};
use url::Url;

/// Canonical host of the site.
pub const DOMAIN: &str = "guitartabsexplorer.com";

/// Where requests go unless a different base URL is configured.
pub const DEFAULT_BASE_URL: &str = "http://www.guitartabsexplorer.com/";

/// Public homepage shown to users.
pub const HOMEPAGE: &str = "http://guitartabsexplorer.com";

/// What the search engine needs and offers. Purely descriptive for hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub requires_artist: bool,
    pub requires_title: bool,
    pub requires_type: bool,
    pub supports_ratings: bool,
    pub supports_prefiltered_types: bool,
    pub max_consecutive_requests: Option<u32>,
}

/// Identity of the adapter as shown by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteInfo {
    pub name: String,
    pub display_name: String,
    pub homepage: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub copyright: String,
    pub capabilities: Capabilities,
}

impl SiteInfo {
    /// The metadata for this adapter; version follows the crate version.
    pub fn builtin() -> Self {
        Self {
            name: "Guitar Tabs Explorer".to_string(),
            display_name: "GuitarTabsExplorer.com".to_string(),
            homepage: HOMEPAGE.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Supports GuitarTabsExplorer.com tab searching and downloading."
                .to_string(),
            author: "Nate Shoffner".to_string(),
            copyright: "Copyright \u{a9} Nate Shoffner 2016".to_string(),
            capabilities: Capabilities {
                requires_artist: false,
                requires_title: false,
                requires_type: false,
                supports_ratings: true,
                supports_prefiltered_types: false,
                max_consecutive_requests: None,
            },
        }
    }
}

/// True if `host` equals `domain` or `www.` + `domain`, ignoring ASCII case.
pub fn host_matches(host: &str, domain: &str) -> bool {
    let host = host.to_ascii_lowercase();
    let domain = domain.to_ascii_lowercase();
    host == domain || host.strip_prefix("www.") == Some(domain.as_str())
}

/// True if the URL points at guitartabsexplorer.com (with or without `www.`).
///
/// Unparsable URLs and URLs without a host are not parsable.
pub fn is_url_parsable(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| host_matches(h, DOMAIN)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_bare_and_www_hosts() {
        assert!(is_url_parsable("http://guitartabsexplorer.com/nirvana-tabs/x.html"));
        assert!(is_url_parsable("https://www.guitartabsexplorer.com/"));
        assert!(is_url_parsable("http://WWW.GUITARTABSEXPLORER.COM/a"));
    }

    #[test]
    fn rejects_other_hosts() {
        assert!(!is_url_parsable("http://sub.guitartabsexplorer.com/"));
        assert!(!is_url_parsable("http://www.www.guitartabsexplorer.com/"));
        assert!(!is_url_parsable("http://guitartabsexplorer.com.example.net/"));
        assert!(!is_url_parsable("http://example.com/guitartabsexplorer.com"));
        assert!(!is_url_parsable("not a url"));
        assert!(!is_url_parsable("mailto:someone@guitartabsexplorer.com"));
    }

    #[test]
    fn builtin_info_has_static_capabilities() {
        let info = SiteInfo::builtin();
        assert_eq!(info.name, "Guitar Tabs Explorer");
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        assert!(info.capabilities.supports_ratings);
        assert!(!info.capabilities.requires_artist);
        assert_eq!(info.capabilities.max_consecutive_requests, None);
    }
}
