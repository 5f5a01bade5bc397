// Cache directory structure and path helpers.
// Provides consistent paths for cached API responses and logs.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Get the root cache directory for folio.
/// Returns ~/.cache/folio on Linux, ~/Library/Caches/folio on macOS.
pub fn cache_root() -> Option<PathBuf> {
    ProjectDirs::from("", "", "folio").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Directory holding cached repository lists, one file per account.
pub fn repos_dir(root: &Path) -> PathBuf {
    root.join("repos")
}

/// Directory holding cached language breakdowns, one file per repository.
pub fn languages_dir(root: &Path) -> PathBuf {
    root.join("languages")
}

/// Directory the log file is written to.
pub fn logs_dir(root: &Path) -> PathBuf {
    root.join("logs")
}

/// Path of the JSON file backing a cache key inside a directory.
pub fn key_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.json", sanitize_name(key)))
}

/// Sanitize a name for use in filesystem paths.
/// The owner/repo separator becomes `@`, which GitHub forbids in names, so
/// `a_b/c` and `a/b_c` stay distinct. Other problematic characters become underscores.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' => '@',
            '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}
