// Data fetching on top of the GitHub client and the cache.
// Repository lists and per-repository language maps.

pub mod languages;
pub mod repositories;

pub use languages::{LanguageFetcher, RepoRef, language_cache_key, parse_repo_url};
pub use repositories::{RepositoryFetcher, Source, default_pages_repo, filter_repositories};
