// Command-line configuration for folio.
// Parses flags with clap (env fallbacks included) and validates them into Settings.

use std::path::PathBuf;

use clap::Parser;

use crate::cache;
use crate::error::{FolioError, Result};
use crate::fetch::default_pages_repo;
use crate::github::GITHUB_API_BASE;
use crate::limiter::DEFAULT_LANGUAGE_CONCURRENCY;
use crate::state::{DEFAULT_INITIAL_PAGE_SIZE, DEFAULT_PAGE_SIZE, HomepageOverrides, SortOrder};

/// folio - browse a GitHub account's public repositories as a portfolio
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Browse a GitHub account's public repositories as a portfolio")]
#[command(version)]
pub struct Cli {
    /// GitHub login whose repositories are listed
    #[arg(short, long, env = "FOLIO_USER")]
    pub user: String,

    /// Token for authenticated requests (higher rate limit)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Base URL of the GitHub REST API
    #[arg(long, env = "FOLIO_API_URL", default_value = GITHUB_API_BASE)]
    pub api_url: String,

    /// Cache directory (defaults to the platform cache dir)
    #[arg(long, env = "FOLIO_CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Repository to hide; repeatable. Defaults to <user>.github.io
    #[arg(long = "exclude", value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Demo URL for a repository, overriding its GitHub homepage; repeatable
    #[arg(long = "homepage", value_name = "NAME=URL", value_parser = parse_homepage)]
    pub homepages: Vec<(String, String)>,

    /// Initial sort order
    #[arg(long, value_enum, default_value_t = SortOrder::Updated)]
    pub sort: SortOrder,

    /// Projects shown on first load
    #[arg(long, default_value_t = DEFAULT_INITIAL_PAGE_SIZE as i64, allow_negative_numbers = true)]
    pub initial_page_size: i64,

    /// Projects added by each "show more"
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE as i64, allow_negative_numbers = true)]
    pub page_size: i64,

    /// Language requests allowed in flight at once
    #[arg(long, default_value_t = DEFAULT_LANGUAGE_CONCURRENCY as i64, allow_negative_numbers = true)]
    pub language_concurrency: i64,

    /// Ignore the cached repository list and fetch again
    #[arg(long)]
    pub refresh: bool,

    /// Print the first page as plain text and exit
    #[arg(long)]
    pub plain: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "FOLIO_LOG", default_value = "info")]
    pub log_level: String,
}

/// Parse a `NAME=URL` pair.
pub fn parse_homepage(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, url)) if !name.trim().is_empty() && !url.trim().is_empty() => {
            Ok((name.trim().to_string(), url.trim().to_string()))
        }
        _ => Err(format!("expected NAME=URL, got '{}'", s)),
    }
}

/// Validated settings derived from the command line.
#[derive(Debug, Clone)]
pub struct Settings {
    pub user: String,
    pub token: Option<String>,
    pub api_url: String,
    pub cache_dir: PathBuf,
    pub excluded: Vec<String>,
    pub homepages: HomepageOverrides,
    pub sort: SortOrder,
    pub initial_page_size: usize,
    pub page_size: usize,
    pub language_concurrency: i64,
    pub refresh: bool,
    pub plain: bool,
    pub log_level: String,
}

impl Settings {
    /// Validate parsed arguments.
    ///
    /// The concurrency limit is range-checked when the limiter is built, so
    /// it is passed through as given.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let user = cli.user.trim().to_string();
        if user.is_empty() {
            return Err(FolioError::Config("--user must not be empty".to_string()));
        }

        let api_url = cli.api_url.trim().trim_end_matches('/').to_string();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(FolioError::Config(format!(
                "--api-url must be an http(s) URL, got '{}'",
                cli.api_url
            )));
        }

        let cache_dir = match cli.cache_dir {
            Some(dir) => dir,
            None => cache::cache_root().ok_or_else(|| {
                FolioError::Config("cannot determine a cache directory; pass --cache-dir".to_string())
            })?,
        };

        let excluded = if cli.exclude.is_empty() {
            vec![default_pages_repo(&user)]
        } else {
            cli.exclude
        };

        let token = cli.token.filter(|t| !t.trim().is_empty());

        Ok(Self {
            user,
            token,
            api_url,
            cache_dir,
            excluded,
            homepages: HomepageOverrides::new(cli.homepages),
            sort: cli.sort,
            initial_page_size: page_size("--initial-page-size", cli.initial_page_size)?,
            page_size: page_size("--page-size", cli.page_size)?,
            language_concurrency: cli.language_concurrency,
            refresh: cli.refresh,
            plain: cli.plain,
            log_level: cli.log_level,
        })
    }
}

fn page_size(flag: &str, value: i64) -> Result<usize> {
    if value <= 0 {
        return Err(FolioError::Config(format!(
            "{} must be greater than zero, got {}",
            flag, value
        )));
    }
    usize::try_from(value).map_err(|_| FolioError::Config(format!("{} is too large", flag)))
}
