// ABOUTME: The main Client struct that owns the HTTP client, site rules and site metadata.
// ABOUTME: Provides the URL matcher and the single-page parser (parse, parse_with, parse_html).

use std::borrow::Cow;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::error::AdapterError;
use crate::extractors::loader::load_builtin_rules;
use crate::extractors::page::extract_tablature;
use crate::extractors::rules::SiteRules;
use crate::models::AttributedTablature;
use crate::options::{ClientBuilder, Options, ProxyConfig};
use crate::resource::fetch;
use crate::site::SiteInfo;

/// Build a reqwest client from the options, optionally overriding the proxy.
fn build_http_client(
    opts: &Options,
    proxy: Option<&ProxyConfig>,
) -> Result<reqwest::Client, AdapterError> {
    let mut builder = reqwest::Client::builder()
        .user_agent(&opts.user_agent)
        .timeout(opts.timeout)
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .deflate(true);

    if let Some(proxy) = proxy.or(opts.proxy.as_ref()) {
        builder = builder.proxy(proxy.to_reqwest()?);
    }

    builder.build().map_err(|e| {
        AdapterError::config(
            "BuildClient",
            Some(anyhow::anyhow!("failed to build HTTP client: {}", e)),
        )
    })
}

/// Parse the base URL, making sure relative joins land below it.
fn parse_base_url(base: &str) -> Result<Url, AdapterError> {
    let mut url = Url::parse(base).map_err(|e| {
        AdapterError::invalid_url(base, "Build", Some(anyhow::anyhow!("invalid base URL: {}", e)))
    })?;
    if url.cannot_be_a_base() {
        return Err(AdapterError::invalid_url(
            base,
            "Build",
            Some(anyhow::anyhow!("base URL cannot have relative paths")),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// The adapter client for guitartabsexplorer.com.
///
/// Holds no per-call state; every `parse` and `search` creates its results
/// fresh. Cloning is cheap enough to hand one to each task.
#[derive(Debug, Clone)]
pub struct Client {
    opts: Options,
    http_client: reqwest::Client,
    rules: SiteRules,
    base_url: Url,
    info: SiteInfo,
}

impl Client {
    /// Create a new ClientBuilder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new Client with the given options.
    ///
    /// Fails if the base URL, the proxy or the extraction rules are invalid.
    pub fn new(opts: Options) -> Result<Self, AdapterError> {
        let base_url = parse_base_url(&opts.base_url)?;

        let rules = opts.rules.clone().unwrap_or_else(load_builtin_rules);
        rules.validate()?;

        let http_client = match &opts.http_client {
            Some(client) => client.clone(),
            None => build_http_client(&opts, None)?,
        };

        Ok(Self {
            opts,
            http_client,
            rules,
            base_url,
            info: SiteInfo::builtin(),
        })
    }

    /// Identity and capability metadata.
    pub fn site_info(&self) -> &SiteInfo {
        &self.info
    }

    /// The extraction rules in use.
    pub fn rules(&self) -> &SiteRules {
        &self.rules
    }

    /// Origin requests are sent to, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn options(&self) -> &Options {
        &self.opts
    }

    /// True if the URL belongs to the site. No network access.
    pub fn is_url_parsable(&self, url: &Url) -> bool {
        url.host_str()
            .map(|host| self.rules.matches_host(host))
            .unwrap_or(false)
    }

    /// Fetch and parse a tablature page.
    ///
    /// Returns `Ok(None)` when the page has no recognizable type or no body.
    pub async fn parse(&self, url: &str) -> Result<Option<AttributedTablature>, AdapterError> {
        self.parse_with(url, None).await
    }

    /// Like [`Client::parse`], routing this request through `proxy`.
    pub async fn parse_with(
        &self,
        url: &str,
        proxy: Option<&ProxyConfig>,
    ) -> Result<Option<AttributedTablature>, AdapterError> {
        if url.is_empty() {
            return Err(AdapterError::invalid_url(url, "Parse", None));
        }
        let parsed = Url::parse(url).map_err(|e| {
            AdapterError::invalid_url(url, "Parse", Some(anyhow::anyhow!("malformed URL: {}", e)))
        })?;
        if !self.is_url_parsable(&parsed) {
            debug!(url, "parsing a URL outside the site's domain");
        }

        let http = self.http_for(proxy)?;
        let html = self.fetch_text(&http, &parsed, None, "Parse").await?;
        let tab = self.parse_html(&html);
        if tab.is_none() {
            debug!(url, "page has no tablature type or body");
        }
        Ok(tab)
    }

    /// Parse already fetched page markup. Deterministic and offline.
    pub fn parse_html(&self, html: &str) -> Option<AttributedTablature> {
        extract_tablature(html, &self.rules.page)
    }

    /// The shared HTTP client, or a one-off client when a proxy is given.
    pub(crate) fn http_for(
        &self,
        proxy: Option<&ProxyConfig>,
    ) -> Result<Cow<'_, reqwest::Client>, AdapterError> {
        match proxy {
            Some(p) => Ok(Cow::Owned(build_http_client(&self.opts, Some(p))?)),
            None => Ok(Cow::Borrowed(&self.http_client)),
        }
    }

    /// Fetch a page as text, giving up early if `cancel` fires.
    pub(crate) async fn fetch_text(
        &self,
        http: &reqwest::Client,
        url: &Url,
        cancel: Option<&CancellationToken>,
        op: &str,
    ) -> Result<String, AdapterError> {
        let request = fetch(http, url, &self.opts.headers);
        let page = match cancel {
            Some(token) => {
                tokio::select! {
                    _ = token.cancelled() => {
                        return Err(AdapterError::cancelled(url.as_str(), op));
                    }
                    r = request => r?,
                }
            }
            None => request.await?,
        };
        Ok(page.text())
    }
}
