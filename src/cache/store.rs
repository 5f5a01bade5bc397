// Cache store for reading and writing cached data.
// Handles JSON serialization, TTL checking and lazy eviction per scope.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::backend::{CacheBackend, FileBackend, MemoryBackend, TieredBackend};
use super::paths::{languages_dir, repos_dir};

/// TTL for the repository list: 1 hour.
pub const REPOSITORIES_TTL: Duration = Duration::from_secs(60 * 60);

/// TTL for per-repository language maps: 1 hour.
pub const LANGUAGES_TTL: Duration = Duration::from_secs(60 * 60);

/// Wrapper for cached data with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    /// The cached data.
    pub data: T,
    /// When the data was cached, stored as epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new_at(data: T, cached_at: DateTime<Utc>) -> Self {
        Self { data, cached_at }
    }

    /// Check if this cached data has expired at `now`.
    /// An entry is only valid while its age is strictly below the TTL.
    pub fn is_expired_at(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        let elapsed = now
            .signed_duration_since(self.cached_at)
            .to_std()
            .unwrap_or(Duration::MAX);

        elapsed >= ttl
    }
}

/// The two independent cache scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Filtered repository list of an account.
    Repositories,
    /// Language breakdown of a single repository.
    Languages,
}

impl Scope {
    pub fn name(&self) -> &'static str {
        match self {
            Scope::Repositories => "repositories",
            Scope::Languages => "languages",
        }
    }
}

/// Outcome of a cache read.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// Present and within its TTL.
    Fresh(T),
    /// Present but past its TTL. The entry has already been evicted;
    /// the payload is handed back for stale fallbacks.
    Expired(T),
    Missing,
}

impl<T> Lookup<T> {
    /// The payload only if it was fresh.
    pub fn fresh(self) -> Option<T> {
        match self {
            Lookup::Fresh(data) => Some(data),
            _ => None,
        }
    }

    /// The payload regardless of age.
    pub fn any(self) -> Option<T> {
        match self {
            Lookup::Fresh(data) | Lookup::Expired(data) => Some(data),
            Lookup::Missing => None,
        }
    }
}

/// TTL cache over two backends, one per scope.
///
/// Storage failures never escape: they are logged and behave like a miss
/// (on read) or a no-op (on write).
pub struct CacheStore {
    repositories: Box<dyn CacheBackend>,
    languages: Box<dyn CacheBackend>,
    repositories_ttl: Duration,
    languages_ttl: Duration,
}

impl CacheStore {
    pub fn new(repositories: Box<dyn CacheBackend>, languages: Box<dyn CacheBackend>) -> Self {
        Self {
            repositories,
            languages,
            repositories_ttl: REPOSITORIES_TTL,
            languages_ttl: LANGUAGES_TTL,
        }
    }

    /// Store rooted at a cache directory: repository lists on disk,
    /// language maps in memory backed by disk.
    pub fn on_disk(root: &Path) -> Self {
        Self::new(
            Box::new(FileBackend::new(repos_dir(root))),
            Box::new(TieredBackend::new(Box::new(FileBackend::new(
                languages_dir(root),
            )))),
        )
    }

    /// Store that forgets everything on exit.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()), Box::new(MemoryBackend::new()))
    }

    /// Override the TTL of a scope.
    pub fn with_ttl(mut self, scope: Scope, ttl: Duration) -> Self {
        match scope {
            Scope::Repositories => self.repositories_ttl = ttl,
            Scope::Languages => self.languages_ttl = ttl,
        }
        self
    }

    pub fn ttl(&self, scope: Scope) -> Duration {
        match scope {
            Scope::Repositories => self.repositories_ttl,
            Scope::Languages => self.languages_ttl,
        }
    }

    fn backend(&self, scope: Scope) -> &dyn CacheBackend {
        match scope {
            Scope::Repositories => self.repositories.as_ref(),
            Scope::Languages => self.languages.as_ref(),
        }
    }

    /// Read a fresh payload, `None` if missing or expired.
    pub fn get<T: DeserializeOwned>(&self, scope: Scope, key: &str) -> Option<T> {
        self.lookup(scope, key).fresh()
    }

    /// Read an entry and classify it by age.
    pub fn lookup<T: DeserializeOwned>(&self, scope: Scope, key: &str) -> Lookup<T> {
        self.lookup_at(scope, key, Utc::now())
    }

    /// Read an entry as of `now`. Expired or unreadable entries are removed.
    pub fn lookup_at<T: DeserializeOwned>(
        &self,
        scope: Scope,
        key: &str,
        now: DateTime<Utc>,
    ) -> Lookup<T> {
        let raw = match self.backend(scope).load(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(scope = scope.name(), key, "cache miss");
                return Lookup::Missing;
            }
            Err(e) => {
                tracing::warn!(scope = scope.name(), key, error = %e, "cache read failed");
                return Lookup::Missing;
            }
        };

        let cached: CachedData<T> = match serde_json::from_str(&raw) {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(scope = scope.name(), key, error = %e, "discarding unreadable cache entry");
                self.remove(scope, key);
                return Lookup::Missing;
            }
        };

        if cached.is_expired_at(self.ttl(scope), now) {
            tracing::debug!(scope = scope.name(), key, cached_at = %cached.cached_at, "cache entry expired");
            self.remove(scope, key);
            Lookup::Expired(cached.data)
        } else {
            tracing::debug!(scope = scope.name(), key, "cache hit");
            Lookup::Fresh(cached.data)
        }
    }

    /// Write a payload stamped with the current time.
    pub fn set<T: Serialize>(&self, scope: Scope, key: &str, data: &T) {
        self.set_at(scope, key, data, Utc::now());
    }

    /// Write a payload stamped with `cached_at`.
    pub fn set_at<T: Serialize>(&self, scope: Scope, key: &str, data: &T, cached_at: DateTime<Utc>) {
        let cached = CachedData::new_at(data, cached_at);
        let json = match serde_json::to_string(&cached) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(scope = scope.name(), key, error = %e, "cache entry not serializable");
                return;
            }
        };

        if let Err(e) = self.backend(scope).store(key, &json) {
            tracing::warn!(scope = scope.name(), key, error = %e, "cache write failed");
        }
    }

    /// Delete one entry.
    pub fn remove(&self, scope: Scope, key: &str) {
        if let Err(e) = self.backend(scope).remove(key) {
            tracing::warn!(scope = scope.name(), key, error = %e, "cache remove failed");
        }
    }

    /// Delete every entry of a scope.
    pub fn clear(&self, scope: Scope) {
        if let Err(e) = self.backend(scope).clear() {
            tracing::warn!(scope = scope.name(), error = %e, "cache clear failed");
        }
    }
}
