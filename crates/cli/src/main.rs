// ABOUTME: CLI for the guitartabsexplorer.com adapter: search, parse, URL matching and site info.
// ABOUTME: Prints JSON on stdout; diagnostics and tracing output go to stderr.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gte_adapter::{
    is_url_parsable, CancellationToken, Client, ProxyConfig, SearchQuery, SiteRules,
    TablatureType,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Search and import tablature from guitartabsexplorer.com.
#[derive(Parser, Debug)]
#[command(name = "gte")]
#[command(about = "Search and parse tablature from GuitarTabsExplorer.com", version)]
struct Args {
    /// Send requests to this origin instead of the live site
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Route requests through a proxy (http://, https:// or socks5://)
    #[arg(long, global = true)]
    proxy: Option<String>,

    /// JSON file with extraction rules replacing the built-in ones
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,

    /// Output compact JSON instead of pretty.
    #[arg(long, global = true, default_value_t = false)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Browse an artist's tablatures or search by title
    Search {
        #[arg(long)]
        artist: Option<String>,

        #[arg(long)]
        title: Option<String>,

        /// guitar, chords or bass
        #[arg(long = "type", value_parser = parse_type)]
        kind: Option<TablatureType>,

        /// Stop browsing an artist after this many listing pages
        #[arg(long)]
        max_pages: Option<u32>,
    },
    /// Fetch a tablature page, or read it from a file with --html
    Parse {
        #[arg(required_unless_present = "html")]
        url: Option<String>,

        /// Saved page to parse instead of fetching
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// Report whether a URL belongs to the site
    Matches { url: String },
    /// Print the adapter's identity and capabilities
    Info,
}

fn parse_type(s: &str) -> Result<TablatureType, String> {
    s.parse()
}

fn load_rules(path: &Path) -> Result<SiteRules> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading rules file {}", path.display()))?;
    Ok(SiteRules::from_json(&json)?)
}

fn build_client(args: &Args, max_pages: Option<u32>) -> Result<Client> {
    let mut builder = Client::builder().timeout(Duration::from_secs(args.timeout));
    if let Some(base_url) = &args.base_url {
        builder = builder.base_url(base_url.as_str());
    }
    if let Some(proxy) = &args.proxy {
        builder = builder.proxy(ProxyConfig::new(proxy.as_str()));
    }
    if let Some(path) = &args.rules {
        builder = builder.rules(load_rules(path)?);
    }
    if let Some(n) = max_pages {
        builder = builder.max_pages(n);
    }
    Ok(builder.build()?)
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let out = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", out);
    Ok(())
}

async fn run(args: Args) -> Result<ExitCode> {
    match &args.command {
        Command::Search {
            artist,
            title,
            kind,
            max_pages,
        } => {
            let client = build_client(&args, *max_pages)?;
            let mut query = SearchQuery::new();
            if let Some(artist) = artist {
                query = query.artist(artist.as_str());
            }
            if let Some(title) = title {
                query = query.title(title.as_str());
            }
            if let Some(kind) = kind {
                query = query.kind(*kind);
            }

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let results = client.search_with(&query, None, Some(&cancel)).await?;
            print_json(&results, args.compact)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Parse { url, html } => {
            let client = build_client(&args, None)?;
            let tab = match (html, url) {
                (Some(path), _) => {
                    let markup = fs::read_to_string(path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    client.parse_html(&markup)
                }
                (None, Some(url)) => client.parse(url).await?,
                (None, None) => anyhow::bail!("a URL or --html is required"),
            };
            match tab {
                Some(tab) => {
                    print_json(&tab, args.compact)?;
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    eprintln!("no tablature found on the page");
                    Ok(ExitCode::from(2))
                }
            }
        }
        Command::Matches { url } => {
            let parsable = is_url_parsable(url);
            print_json(
                &serde_json::json!({ "url": url, "parsable": parsable }),
                args.compact,
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Info => {
            let client = build_client(&args, None)?;
            print_json(client.site_info(), args.compact)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
