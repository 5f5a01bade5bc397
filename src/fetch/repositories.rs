// Repository list fetching.
// Serves the account's repositories from cache or the API, with a stale fallback on rate limits.

use std::sync::Arc;

use crate::cache::{CacheStore, Lookup, Scope};
use crate::error::{FolioError, Result};
use crate::github::{GitHubClient, Repository};

/// Where a fetched repository list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// A cache entry within its TTL.
    Cache,
    /// A fresh API response.
    Network,
    /// An expired cache entry, served because the API refused the request.
    Stale,
}

/// Fetches the public, non-fork repositories of one account.
pub struct RepositoryFetcher {
    client: Arc<GitHubClient>,
    cache: Arc<CacheStore>,
    user: String,
    excluded: Vec<String>,
}

impl RepositoryFetcher {
    /// Create a fetcher for `user`. The account's `<user>.github.io`
    /// pages repository is excluded by default.
    pub fn new(client: Arc<GitHubClient>, cache: Arc<CacheStore>, user: impl Into<String>) -> Self {
        let user = user.into();
        let excluded = vec![default_pages_repo(&user)];
        Self {
            client,
            cache,
            user,
            excluded,
        }
    }

    /// Replace the exclusion list.
    pub fn with_excluded(mut self, excluded: Vec<String>) -> Self {
        self.excluded = excluded;
        self
    }

    /// Key of the list entry in the repositories scope.
    pub fn cache_key(&self) -> String {
        self.user.to_lowercase()
    }

    /// Drop the cached list so the next fetch goes to the API.
    pub fn invalidate(&self) {
        self.cache.remove(Scope::Repositories, &self.cache_key());
    }

    /// Fetch the filtered repository list.
    pub async fn fetch_repositories(&self) -> Result<Vec<Repository>> {
        self.fetch().await.map(|(repos, _)| repos)
    }

    /// Fetch the filtered repository list and report where it came from.
    ///
    /// A fresh cache entry short-circuits the request. When the API answers
    /// 403, whatever list was cached when the call began is returned even if
    /// it is past its TTL.
    pub async fn fetch(&self) -> Result<(Vec<Repository>, Source)> {
        let key = self.cache_key();

        let stale = match self.cache.lookup::<Vec<Repository>>(Scope::Repositories, &key) {
            Lookup::Fresh(repos) => {
                tracing::info!(user = %self.user, count = repos.len(), "using cached repositories");
                return Ok((repos, Source::Cache));
            }
            Lookup::Expired(repos) => Some(repos),
            Lookup::Missing => None,
        };

        match self.client.get_user_repos(&self.user).await {
            Ok(repos) => {
                let total = repos.len();
                let repos = filter_repositories(repos, &self.excluded);
                tracing::info!(user = %self.user, total, kept = repos.len(), "fetched repositories");
                self.cache.set(Scope::Repositories, &key, &repos);
                Ok((repos, Source::Network))
            }
            Err(e) if e.is_rate_limited() => match stale {
                Some(repos) => {
                    tracing::warn!(user = %self.user, count = repos.len(), "rate limited, serving stale repositories");
                    Ok((repos, Source::Stale))
                }
                None => {
                    tracing::warn!(user = %self.user, error = %e, "rate limited with nothing cached");
                    Err(e)
                }
            },
            Err(FolioError::NotFound(_)) => Err(FolioError::NotFound(self.user.clone())),
            Err(e) => {
                tracing::warn!(user = %self.user, error = %e, "repository fetch failed");
                Err(e)
            }
        }
    }
}

/// Name of the GitHub Pages repository of an account.
pub fn default_pages_repo(user: &str) -> String {
    format!("{}.github.io", user)
}

/// Drop forks, private repositories and excluded names (case-insensitive).
pub fn filter_repositories(repos: Vec<Repository>, excluded: &[String]) -> Vec<Repository> {
    repos
        .into_iter()
        .filter(|repo| !repo.fork && !repo.private)
        .filter(|repo| {
            !excluded
                .iter()
                .any(|name| name.eq_ignore_ascii_case(&repo.name))
        })
        .collect()
}
