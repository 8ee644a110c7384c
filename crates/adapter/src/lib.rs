// ABOUTME: Main library entry point for the guitartabsexplorer.com tablature adapter.
// ABOUTME: Re-exports the public API: Client, ClientBuilder, the tablature models, errors and host traits.

//! gte-adapter - search, fetch and parse tablature from guitartabsexplorer.com.
//!
//! The crate offers three things:
//! - a URL matcher ([`is_url_parsable`], [`Client::is_url_parsable`]),
//! - a page parser turning a tablature page into an [`AttributedTablature`],
//! - a search engine browsing an artist's listing or searching by title.
//!
//! # Example
//!
//! ```no_run
//! use gte_adapter::{AdapterError, Client, SearchQuery, TablatureType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AdapterError> {
//!     let client = Client::builder().build()?;
//!
//!     let query = SearchQuery::new().artist("Nirvana").kind(TablatureType::Bass);
//!     for hit in client.search(&query).await? {
//!         println!("{} - {} ({})", hit.tablature.artist, hit.tablature.title, hit.url);
//!     }
//!
//!     if let Some(tab) = client
//!         .parse("http://www.guitartabsexplorer.com/nirvana-tabs/lithium-tab.html")
//!         .await?
//!     {
//!         println!("{}", tab.contents);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod engine;
pub mod error;
pub mod extractors;
pub mod models;
pub mod options;
pub mod resource;
pub mod site;
pub mod traits;

pub use crate::client::Client;
pub use crate::error::{AdapterError, ErrorCode};
pub use crate::extractors::loader::load_builtin_rules;
pub use crate::extractors::rules::{ListingRules, PageRules, SearchRules, SiteRules};
pub use crate::models::{
    AttributedTablature, SearchQuery, SearchResult, TablatureRating, TablatureType,
};
pub use crate::options::{ClientBuilder, Options, ProxyConfig, DEFAULT_MAX_PAGES};
pub use crate::site::{is_url_parsable, Capabilities, SiteInfo};
pub use crate::traits::{TablatureSearchEngine, TablatureWebImporter};
pub use tokio_util::sync::CancellationToken;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, AdapterError>;
