// ABOUTME: Host-facing seams: a web importer for single pages and a search engine.
// ABOUTME: Client implements both so hosts can hold adapters behind trait objects.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::client::Client;
use crate::error::AdapterError;
use crate::models::{AttributedTablature, SearchQuery, SearchResult, TablatureType};
use crate::options::ProxyConfig;
use crate::site::SiteInfo;

/// Imports one tablature from a page on a supported site.
#[async_trait]
pub trait TablatureWebImporter: Send + Sync {
    fn site_info(&self) -> &SiteInfo;

    /// Cheap, offline check whether `parse` understands the URL.
    fn is_url_parsable(&self, url: &Url) -> bool;

    /// Fetch and parse `url`. `Ok(None)` means the page held no tablature.
    async fn parse(
        &self,
        url: &Url,
        proxy: Option<&ProxyConfig>,
    ) -> Result<Option<AttributedTablature>, AdapterError>;
}

/// Finds tablatures on a site from an artist and/or title.
#[async_trait]
pub trait TablatureSearchEngine: Send + Sync {
    fn site_info(&self) -> &SiteInfo;

    fn supports_type(&self, kind: TablatureType) -> bool;

    async fn search(
        &self,
        query: &SearchQuery,
        proxy: Option<&ProxyConfig>,
    ) -> Result<Vec<SearchResult>, AdapterError>;

    /// Like `search`, stopping with a `Cancelled` error once `cancel` fires.
    async fn search_cancellable(
        &self,
        query: &SearchQuery,
        proxy: Option<&ProxyConfig>,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>, AdapterError>;
}

#[async_trait]
impl TablatureWebImporter for Client {
    fn site_info(&self) -> &SiteInfo {
        Client::site_info(self)
    }

    fn is_url_parsable(&self, url: &Url) -> bool {
        Client::is_url_parsable(self, url)
    }

    async fn parse(
        &self,
        url: &Url,
        proxy: Option<&ProxyConfig>,
    ) -> Result<Option<AttributedTablature>, AdapterError> {
        self.parse_with(url.as_str(), proxy).await
    }
}

#[async_trait]
impl TablatureSearchEngine for Client {
    fn site_info(&self) -> &SiteInfo {
        Client::site_info(self)
    }

    fn supports_type(&self, kind: TablatureType) -> bool {
        Client::supports_type(self, kind)
    }

    async fn search(
        &self,
        query: &SearchQuery,
        proxy: Option<&ProxyConfig>,
    ) -> Result<Vec<SearchResult>, AdapterError> {
        self.search_with(query, proxy, None).await
    }

    async fn search_cancellable(
        &self,
        query: &SearchQuery,
        proxy: Option<&ProxyConfig>,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>, AdapterError> {
        self.search_with(query, proxy, Some(cancel)).await
    }
}
