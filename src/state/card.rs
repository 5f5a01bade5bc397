// Project card view model.
// Everything the list needs to draw one repository, derived from the API data.

use chrono::{DateTime, Utc};

use crate::format::{format_project_name, format_relative_date, truncate_by_words};
use crate::github::Repository;

/// Stars needed for a project to be highlighted as popular.
pub const POPULAR_STARS_THRESHOLD: u64 = 10;

/// Longest description shown on a card, in characters.
const DESCRIPTION_MAX_CHARS: usize = 150;

/// At most this many language badges per card.
const MAX_BADGES: usize = 3;

/// Label used when a repository has no language at all.
pub const NO_LANGUAGE: &str = "N/S";

const NO_DESCRIPTION: &str = "No description available.";

/// Demo URLs configured per repository name, taking precedence over
/// the homepage set on GitHub.
#[derive(Debug, Clone, Default)]
pub struct HomepageOverrides {
    entries: Vec<(String, String)>,
}

impl HomepageOverrides {
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }

    /// Exact name match first, then case-insensitive.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(repo, _)| repo == name)
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|(repo, _)| repo.to_lowercase() == name.to_lowercase())
            })
            .map(|(_, url)| url.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectCard {
    pub name: String,
    pub title: String,
    pub description: String,
    pub has_description: bool,
    /// Badge labels, alphabetical, at most three.
    pub languages: Vec<String>,
    pub stars: u64,
    pub forks: u64,
    pub updated: String,
    pub homepage: Option<String>,
    pub url: String,
    pub popular: bool,
}

impl ProjectCard {
    /// Build a card. `fetched` holds the repository's top languages by size,
    /// or `None` if the breakdown could not be loaded.
    pub fn build(
        repo: &Repository,
        fetched: Option<&[String]>,
        overrides: &HomepageOverrides,
        now: DateTime<Utc>,
    ) -> Self {
        let description = repo
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        let homepage = overrides
            .lookup(&repo.name)
            .map(str::to_string)
            .or_else(|| repo.homepage.clone())
            .filter(|url| !url.trim().is_empty());

        Self {
            name: repo.name.clone(),
            title: format_project_name(&repo.name),
            description: description
                .map(|d| truncate_by_words(d, DESCRIPTION_MAX_CHARS, "..."))
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            has_description: description.is_some(),
            languages: badge_languages(repo.language.as_deref(), fetched),
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            updated: format_relative_date(&repo.updated_at, now),
            homepage,
            url: repo.html_url.clone(),
            popular: repo.stargazers_count >= POPULAR_STARS_THRESHOLD,
        }
    }
}

/// Primary language plus the first fetched ones, deduplicated and sorted.
fn badge_languages(primary: Option<&str>, fetched: Option<&[String]>) -> Vec<String> {
    let mut languages: Vec<String> = primary
        .into_iter()
        .chain(fetched.unwrap_or_default().iter().take(MAX_BADGES).map(String::as_str))
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
        .collect();

    languages.sort();
    languages.dedup();
    languages.truncate(MAX_BADGES);

    if languages.is_empty() {
        languages.push(NO_LANGUAGE.to_string());
    }
    languages
}

/// Badge color for a language as an RGB triple.
pub fn language_color(language: &str) -> (u8, u8, u8) {
    match language {
        "JavaScript" => (0xF7, 0xDF, 0x1E),
        "TypeScript" => (0x31, 0x78, 0xC6),
        "Python" => (0x37, 0x76, 0xAB),
        "Java" => (0xED, 0x8B, 0x00),
        "C++" => (0x00, 0x59, 0x9C),
        "C" => (0xA8, 0xB9, 0xCC),
        "C#" => (0x23, 0x91, 0x20),
        "PHP" => (0x77, 0x7B, 0xB4),
        "Ruby" => (0xCC, 0x34, 0x2D),
        "Go" => (0x00, 0xAD, 0xD8),
        "Rust" => (0xDE, 0xA5, 0x84),
        "Swift" => (0xFA, 0x73, 0x43),
        "Kotlin" => (0x7F, 0x52, 0xFF),
        "HTML" => (0xE3, 0x4F, 0x26),
        "CSS" => (0x15, 0x72, 0xB6),
        "SCSS" | "Sass" => (0xCC, 0x66, 0x99),
        "Vue" => (0x4F, 0xC0, 0x8D),
        "Dart" => (0x01, 0x75, 0xC2),
        "Shell" => (0x89, 0xE0, 0x51),
        "Lua" => (0x00, 0x00, 0x80),
        "R" => (0x27, 0x6D, 0xC3),
        "Scala" => (0xDC, 0x32, 0x2F),
        "Haskell" => (0x5D, 0x4F, 0x85),
        "Elixir" => (0x4E, 0x2A, 0x8E),
        NO_LANGUAGE => (0x99, 0x99, 0x99),
        _ => (0x66, 0x66, 0x66),
    }
}
