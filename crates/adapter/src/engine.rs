// ABOUTME: Search engine: picks artist-browse or title-search mode and aggregates results.
// ABOUTME: Builds the site's request URLs and walks artist listing pages sequentially.

//! Search over guitartabsexplorer.com.
//!
//! Two modes, chosen from the query:
//! - artist only: walk `/{artist}-Tabs/{page}/[type/]` until the last page
//!   reported by the pagination control, capped by `max_pages`.
//! - title given: one request to `search.php`, filtered by artist when an
//!   artist is also given.
//!
//! Rows that are adverts, carry an unknown type, fail the type filter or
//! belong to another artist are dropped silently.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, warn, Instrument};
use url::form_urlencoded::byte_serialize;
use url::Url;

use crate::client::Client;
use crate::error::AdapterError;
use crate::extractors::listing::extract_listing;
use crate::extractors::search::extract_search_items;
use crate::models::{AttributedTablature, SearchQuery, SearchResult, TablatureType};
use crate::options::ProxyConfig;

impl Client {
    /// True for every type the site publishes: guitar, chords and bass.
    pub fn supports_type(&self, kind: TablatureType) -> bool {
        TablatureType::ALL.contains(&kind)
    }

    /// Run a search with the client's default proxy and no cancellation.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, AdapterError> {
        self.search_with(query, None, None).await
    }

    /// Run a search, optionally through `proxy` and stoppable via `cancel`.
    ///
    /// Results keep the site's order: page by page, rows in document order.
    pub async fn search_with(
        &self,
        query: &SearchQuery,
        proxy: Option<&ProxyConfig>,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<SearchResult>, AdapterError> {
        match (query.artist_str(), query.title_str()) {
            (Some(artist), None) => {
                self.browse_artist(query, artist, proxy, cancel)
                    .instrument(info_span!("browse_artist", artist))
                    .await
            }
            (_, Some(title)) => {
                self.search_title(query, title, proxy, cancel)
                    .instrument(info_span!("search_title", title))
                    .await
            }
            (None, None) => Err(AdapterError::invalid_query(
                "Search",
                Some(anyhow::anyhow!("an artist or a title is required")),
            )),
        }
    }

    /// URL of one page of an artist's listing, e.g.
    /// `http://www.guitartabsexplorer.com/Foo-Fighters-Tabs/2/bass/`.
    pub fn artist_page_url(
        &self,
        artist: &str,
        page: u32,
        kind: Option<TablatureType>,
    ) -> Result<Url, AdapterError> {
        let slug: String = byte_serialize(artist.trim().replace(' ', "-").as_bytes()).collect();
        let mut path = format!("{}{}/{}/", slug, self.rules().listing.path_suffix, page);
        if let Some(kind) = kind {
            path.push_str(kind.path_segment());
            path.push('/');
        }
        self.join(&path, "Browse")
    }

    /// URL of the free-text search for a title; spaces become `+`.
    pub fn title_search_url(&self, title: &str) -> Result<Url, AdapterError> {
        let search = &self.rules().search;
        let mut url = self.join(&search.path, "Search")?;
        url.query_pairs_mut()
            .clear()
            .append_pair(&search.query_param, title.trim());
        Ok(url)
    }

    fn join(&self, path: &str, op: &str) -> Result<Url, AdapterError> {
        self.base_url().join(path).map_err(|e| {
            AdapterError::invalid_url(
                path,
                op,
                Some(anyhow::anyhow!("cannot join onto {}: {}", self.base_url(), e)),
            )
        })
    }

    async fn browse_artist(
        &self,
        query: &SearchQuery,
        artist: &str,
        proxy: Option<&ProxyConfig>,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<SearchResult>, AdapterError> {
        let http = self.http_for(proxy)?;
        let max_pages = self.options().max_pages.max(1);
        let mut results = Vec::new();
        let mut page = 1u32;

        loop {
            let url = self.artist_page_url(artist, page, query.kind)?;
            if cancel.is_some_and(|c| c.is_cancelled()) {
                return Err(AdapterError::cancelled(url.as_str(), "Browse"));
            }

            let html = self.fetch_text(&http, &url, cancel, "Browse").await?;
            let listing = extract_listing(&html, &self.rules().listing).map_err(|e| {
                warn!(url = %url, "artist listing does not match the listing rules");
                AdapterError::structure(url.as_str(), "Browse", Some(e))
            })?;

            let artist_name = listing.artist.as_deref().unwrap_or(artist);
            let before = results.len();
            for row in listing.rows {
                if !query.accepts(row.kind) {
                    continue;
                }
                let Some(detail) = self.resolve(&row.href) else {
                    continue;
                };
                results.push(SearchResult {
                    query: query.clone(),
                    engine: self.site_info().name.clone(),
                    tablature: AttributedTablature::new(artist_name, row.title, row.kind),
                    url: detail,
                    rating: Some(row.rating),
                });
            }

            let total = listing.total_pages.unwrap_or(page);
            debug!(page, total, added = results.len() - before, "listing page done");

            if page >= total {
                break;
            }
            if page >= max_pages {
                warn!(max_pages, total, "stopping artist listing at page ceiling");
                break;
            }
            page += 1;
        }

        Ok(results)
    }

    async fn search_title(
        &self,
        query: &SearchQuery,
        title: &str,
        proxy: Option<&ProxyConfig>,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<SearchResult>, AdapterError> {
        let url = self.title_search_url(title)?;
        if cancel.is_some_and(|c| c.is_cancelled()) {
            return Err(AdapterError::cancelled(url.as_str(), "Search"));
        }

        let http = self.http_for(proxy)?;
        let html = self.fetch_text(&http, &url, cancel, "Search").await?;
        let items = extract_search_items(&html, &self.rules().search).map_err(|e| {
            warn!(url = %url, "search page does not match the search rules");
            AdapterError::structure(url.as_str(), "Search", Some(e))
        })?;

        let wanted_artist = query.artist_str().map(str::to_lowercase);
        let mut results = Vec::new();
        for item in items {
            if let Some(wanted) = &wanted_artist {
                if item.artist.to_lowercase() != *wanted {
                    continue;
                }
            }
            if !query.accepts(item.kind) {
                continue;
            }
            let Some(detail) = self.resolve(&item.href) else {
                continue;
            };
            results.push(SearchResult {
                query: query.clone(),
                engine: self.site_info().name.clone(),
                tablature: AttributedTablature::new(item.artist, item.title, item.kind),
                url: detail,
                rating: None,
            });
        }

        debug!(results = results.len(), "title search done");
        Ok(results)
    }

    // Links on the site are root-relative; absolute links pass through.
    fn resolve(&self, href: &str) -> Option<String> {
        match self.base_url().join(href) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                debug!(href, error = %e, "skipping unresolvable link");
                None
            }
        }
    }
}
