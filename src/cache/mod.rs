// Cache module for local caching of API responses.
// Keeps repository lists and language breakdowns across runs to spare the rate limit.

pub mod backend;
pub mod paths;
pub mod store;

pub use backend::{CacheBackend, FileBackend, MemoryBackend, TieredBackend};
pub use paths::*;
pub use store::{CacheStore, CachedData, LANGUAGES_TTL, Lookup, REPOSITORIES_TTL, Scope};
