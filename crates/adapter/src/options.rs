// ABOUTME: Configuration options for the adapter including ProxyConfig, Options, and ClientBuilder.
// ABOUTME: ClientBuilder provides a fluent API for constructing Client instances with custom settings.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::AdapterError;
use crate::extractors::rules::SiteRules;
use crate::site::DEFAULT_BASE_URL;

/// Default ceiling on artist listing pages fetched by one search.
pub const DEFAULT_MAX_PAGES: u32 = 50;

/// Proxy to route requests through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Proxy URL, e.g. `http://proxy.local:3128` or `socks5://...`
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl ProxyConfig {
    /// Create a proxy configuration without credentials.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
        }
    }

    /// Add basic-auth credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Convert into a reqwest proxy applying to all schemes.
    pub fn to_reqwest(&self) -> Result<reqwest::Proxy, AdapterError> {
        let proxy = reqwest::Proxy::all(&self.url).map_err(|e| {
            AdapterError::config(
                "Proxy",
                Some(anyhow::anyhow!("invalid proxy {:?}: {}", self.url, e)),
            )
        })?;
        Ok(match &self.username {
            Some(user) => proxy.basic_auth(user, self.password.as_deref().unwrap_or_default()),
            None => proxy,
        })
    }
}

/// Configuration options for the adapter client.
#[derive(Debug, Clone)]
pub struct Options {
    pub timeout: Duration,
    pub user_agent: String,
    pub base_url: String,
    pub proxy: Option<ProxyConfig>,
    pub headers: HashMap<String, String>,
    pub max_pages: u32,
    pub http_client: Option<reqwest::Client>,
    pub rules: Option<SiteRules>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("gte-adapter/{}", env!("CARGO_PKG_VERSION")),
            base_url: DEFAULT_BASE_URL.to_string(),
            proxy: None,
            headers: HashMap::new(),
            max_pages: DEFAULT_MAX_PAGES,
            http_client: None,
            rules: None,
        }
    }
}

/// Builder for constructing Client instances with custom configuration.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    opts: Options,
}

impl ClientBuilder {
    /// Create a new ClientBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Send requests to a different origin, e.g. a mirror or a test server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.opts.base_url = base_url.into();
        self
    }

    /// Route all requests through a proxy unless a call supplies its own.
    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.opts.proxy = Some(proxy);
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Set the ceiling on artist listing pages per search (at least 1).
    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.opts.max_pages = max_pages.max(1);
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Use custom extraction rules instead of the built-in ones.
    pub fn rules(mut self, rules: SiteRules) -> Self {
        self.opts.rules = Some(rules);
        self
    }

    /// Build the Client with the configured options.
    pub fn build(self) -> Result<Client, AdapterError> {
        Client::new(self.opts)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_site() {
        let opts = Options::default();
        assert_eq!(opts.base_url, "http://www.guitartabsexplorer.com/");
        assert_eq!(opts.max_pages, DEFAULT_MAX_PAGES);
        assert_eq!(opts.timeout, Duration::from_secs(30));
        assert!(opts.user_agent.starts_with("gte-adapter/"));
    }

    #[test]
    fn max_pages_is_at_least_one() {
        let builder = ClientBuilder::new().max_pages(0);
        assert_eq!(builder.opts.max_pages, 1);
    }

    #[test]
    fn proxy_converts_to_reqwest() {
        let proxy = ProxyConfig::new("http://127.0.0.1:3128").with_credentials("user", "secret");
        assert!(proxy.to_reqwest().is_ok());
    }

    #[test]
    fn invalid_proxy_is_config_error() {
        let err = ProxyConfig::new("not a proxy url").to_reqwest().unwrap_err();
        assert!(err.is_config());
    }
}
