// Per-repository language fetching.
// Resolves a repository reference, then serves its language map from cache or the API.

use std::sync::Arc;

use crate::cache::{CacheStore, Scope};
use crate::github::{GitHubClient, LanguageMap, Repository};

/// Ways a caller can point at a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoRef {
    /// A repository web or API URL, e.g. `https://github.com/octocat/hello`.
    Url(String),
    /// Owner and name, optionally with the API's `languages_url`.
    Parts {
        owner: String,
        name: String,
        languages_url: Option<String>,
    },
}

impl RepoRef {
    pub fn url(url: impl Into<String>) -> Self {
        RepoRef::Url(url.into())
    }

    pub fn parts(owner: impl Into<String>, name: impl Into<String>) -> Self {
        RepoRef::Parts {
            owner: owner.into(),
            name: name.into(),
            languages_url: None,
        }
    }

    /// Resolve to `(owner, repo)`. `None` if the reference is unusable.
    pub fn normalize(&self) -> Option<(String, String)> {
        match self {
            RepoRef::Url(url) => parse_repo_url(url),
            RepoRef::Parts { owner, name, .. } => {
                let owner = owner.trim();
                let name = name.trim();
                if owner.is_empty() || name.is_empty() {
                    None
                } else {
                    Some((owner.to_string(), name.to_string()))
                }
            }
        }
    }

    fn languages_url(&self) -> Option<&str> {
        match self {
            RepoRef::Parts {
                languages_url: Some(url),
                ..
            } if !url.is_empty() => Some(url),
            _ => None,
        }
    }
}

impl From<&Repository> for RepoRef {
    fn from(repo: &Repository) -> Self {
        RepoRef::Parts {
            owner: repo.owner.login.clone(),
            name: repo.name.clone(),
            languages_url: repo.languages_url.clone(),
        }
    }
}

/// Extract `(owner, repo)` from a github.com or api.github.com URL.
pub fn parse_repo_url(url: &str) -> Option<(String, String)> {
    let rest = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(url);
    let rest = rest.split(['?', '#']).next().unwrap_or(rest);

    let mut segments = rest.split('/').filter(|s| !s.is_empty());
    let host = segments.next()?;
    if !host.ends_with("github.com") {
        return None;
    }

    let mut owner = segments.next()?;
    if host.starts_with("api.") && owner == "repos" {
        owner = segments.next()?;
    }
    let repo = segments.next()?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() {
        return None;
    }

    Some((owner.to_string(), repo.to_string()))
}

/// Cache key of a repository's language map.
pub fn language_cache_key(owner: &str, repo: &str) -> String {
    format!("{}/{}", owner.to_lowercase(), repo.to_lowercase())
}

/// Fetches language breakdowns. Never fails: problems degrade to `None`.
pub struct LanguageFetcher {
    client: Arc<GitHubClient>,
    cache: Arc<CacheStore>,
}

impl LanguageFetcher {
    pub fn new(client: Arc<GitHubClient>, cache: Arc<CacheStore>) -> Self {
        Self { client, cache }
    }

    /// Language map of a repository, from cache when possible.
    pub async fn fetch_repository_languages(&self, repo: &RepoRef) -> Option<LanguageMap> {
        let Some((owner, name)) = repo.normalize() else {
            tracing::warn!(?repo, "cannot resolve repository reference");
            return None;
        };

        let key = language_cache_key(&owner, &name);
        if let Some(languages) = self.cache.get::<LanguageMap>(Scope::Languages, &key) {
            return Some(languages);
        }

        let result = match repo.languages_url() {
            Some(url) => self.client.get_languages_at(url).await,
            None => self.client.get_repo_languages(&owner, &name).await,
        };

        match result {
            Ok(languages) => {
                tracing::debug!(repo = %key, count = languages.len(), "fetched languages");
                self.cache.set(Scope::Languages, &key, &languages);
                Some(languages)
            }
            Err(e) => {
                tracing::warn!(repo = %key, error = %e, "language fetch failed");
                None
            }
        }
    }
}
