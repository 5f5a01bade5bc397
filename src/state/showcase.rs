// Showcase state: the repository list session.
// Owns sort order, search filter and the displayed window; never fetches on its own.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use ratatui::widgets::ListState;

use crate::error::FolioError;
use crate::fetch::{RepoRef, language_cache_key};
use crate::github::Repository;

use super::card::{HomepageOverrides, ProjectCard};
use super::{LoadError, LoadingState};

pub const DEFAULT_INITIAL_PAGE_SIZE: usize = 3;
pub const DEFAULT_PAGE_SIZE: usize = 3;

/// Order of the repository list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortOrder {
    /// Most recently updated first.
    #[default]
    Updated,
    /// Most starred first.
    Stars,
    /// Alphabetical by name.
    Name,
}

impl SortOrder {
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Updated => "Most recent",
            SortOrder::Stars => "Most stars",
            SortOrder::Name => "Name (A-Z)",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            SortOrder::Updated => SortOrder::Stars,
            SortOrder::Stars => SortOrder::Name,
            SortOrder::Name => SortOrder::Updated,
        }
    }
}

/// Visible state of the list, derived from the data and the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowcaseStatus {
    Idle,
    Loading,
    Populated,
    Empty,
    Error,
}

/// Sort in place. Stable, so equal keys keep their previous order.
pub fn sort_repositories(repos: &mut [Repository], order: SortOrder) {
    match order {
        SortOrder::Updated => repos.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
        SortOrder::Stars => repos.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count)),
        SortOrder::Name => repos.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        }),
    }
}

/// Repositories whose name contains `term`, ignoring case, in their current order.
pub fn filter_by_name<'a>(repos: &'a [Repository], term: &str) -> Vec<&'a Repository> {
    let term = term.trim().to_lowercase();
    repos
        .iter()
        .filter(|repo| term.is_empty() || repo.name.to_lowercase().contains(&term))
        .collect()
}

/// Repository list session.
#[derive(Debug)]
pub struct Showcase {
    pub repos: LoadingState<Vec<Repository>>,
    sort: SortOrder,
    filter: String,
    displayed: usize,
    initial_page_size: usize,
    page_size: usize,
    /// Top languages by repository, keyed like the language cache.
    /// An empty list means the fetch was attempted and gave nothing.
    languages: HashMap<String, Vec<String>>,
    pub list_state: ListState,
}

impl Default for Showcase {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_PAGE_SIZE, DEFAULT_PAGE_SIZE, SortOrder::default())
    }
}

impl Showcase {
    pub fn new(initial_page_size: usize, page_size: usize, sort: SortOrder) -> Self {
        Self {
            repos: LoadingState::Idle,
            sort,
            filter: String::new(),
            displayed: 0,
            initial_page_size: initial_page_size.max(1),
            page_size: page_size.max(1),
            languages: HashMap::new(),
            list_state: ListState::default(),
        }
    }

    pub fn status(&self) -> ShowcaseStatus {
        match &self.repos {
            LoadingState::Idle => ShowcaseStatus::Idle,
            LoadingState::Loading => ShowcaseStatus::Loading,
            LoadingState::Error(_) => ShowcaseStatus::Error,
            LoadingState::Loaded(_) if self.total() == 0 => ShowcaseStatus::Empty,
            LoadingState::Loaded(_) => ShowcaseStatus::Populated,
        }
    }

    pub fn set_loading(&mut self) {
        self.repos = LoadingState::Loading;
        self.displayed = 0;
        self.list_state.select(None);
    }

    /// Take a freshly fetched list and show its first page.
    pub fn set_loaded(&mut self, mut repos: Vec<Repository>) {
        sort_repositories(&mut repos, self.sort);
        self.repos = LoadingState::Loaded(repos);
        self.reset_window();
    }

    pub fn set_error(&mut self, error: &FolioError) {
        self.repos = LoadingState::Error(LoadError::from(error));
        self.displayed = 0;
        self.list_state.select(None);
    }

    pub fn error(&self) -> Option<&LoadError> {
        match &self.repos {
            LoadingState::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    /// Re-sort and start over from the first page.
    pub fn set_sort(&mut self, order: SortOrder) {
        self.sort = order;
        if let LoadingState::Loaded(repos) = &mut self.repos {
            sort_repositories(repos, order);
        }
        self.reset_window();
    }

    pub fn cycle_sort(&mut self) {
        self.set_sort(self.sort.next());
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Change the search term and start over from the first page.
    pub fn set_filter(&mut self, term: impl Into<String>) {
        self.filter = term.into();
        self.reset_window();
    }

    pub fn initial_page_size(&self) -> usize {
        self.initial_page_size
    }

    /// Repositories matching the search, in display order.
    pub fn filtered(&self) -> Vec<&Repository> {
        self.repos
            .data()
            .map(|repos| filter_by_name(repos, &self.filter))
            .unwrap_or_default()
    }

    /// The displayed window of the filtered list.
    pub fn visible(&self) -> Vec<&Repository> {
        let mut filtered = self.filtered();
        filtered.truncate(self.displayed);
        filtered
    }

    pub fn displayed(&self) -> usize {
        self.displayed
    }

    /// Number of repositories matching the search.
    pub fn total(&self) -> usize {
        self.filtered().len()
    }

    pub fn has_more(&self) -> bool {
        self.displayed < self.total()
    }

    pub fn can_show_less(&self) -> bool {
        self.displayed > self.initial_page_size
    }

    /// Reveal the next page. Returns whether anything changed.
    pub fn show_more(&mut self) -> bool {
        let total = self.total();
        if self.displayed >= total {
            return false;
        }
        self.displayed = (self.displayed + self.page_size).min(total);
        true
    }

    /// Collapse back to the first page. Returns whether anything changed.
    pub fn show_less(&mut self) -> bool {
        if !self.can_show_less() {
            return false;
        }
        self.displayed = self.initial_page_size;
        self.clamp_selection();
        true
    }

    fn reset_window(&mut self) {
        self.displayed = self.initial_page_size.min(self.total());
        if self.displayed > 0 {
            self.list_state.select(Some(0));
        } else {
            self.list_state.select(None);
        }
    }

    /// "Showing 3 of 7 projects", with "found" while searching.
    pub fn counter_text(&self) -> String {
        let total = self.total();
        let noun = if total == 1 { "project" } else { "projects" };
        if self.filter.trim().is_empty() {
            format!("Showing {} of {} {}", self.displayed, total, noun)
        } else {
            format!("Showing {} of {} {} found", self.displayed, total, noun)
        }
    }

    /// Message for the empty panel.
    pub fn empty_message(&self) -> String {
        if self.filter.trim().is_empty() {
            "No public projects available right now.".to_string()
        } else {
            format!("No projects match \"{}\". Try another search.", self.filter.trim())
        }
    }

    /// Visible repositories whose languages have not been requested yet.
    pub fn pending_languages(&self) -> Vec<RepoRef> {
        self.visible()
            .into_iter()
            .filter(|repo| !self.languages_resolved(repo))
            .map(RepoRef::from)
            .collect()
    }

    /// Whether a language fetch for `repo` has finished, successfully or not.
    pub fn languages_resolved(&self, repo: &Repository) -> bool {
        self.languages.contains_key(&repo_key(repo))
    }

    /// Record the top languages of a repository (empty if unavailable).
    pub fn set_languages(&mut self, owner: &str, name: &str, languages: Vec<String>) {
        self.languages
            .insert(language_cache_key(owner, name), languages);
    }

    pub fn languages_for(&self, repo: &Repository) -> Option<&[String]> {
        self.languages
            .get(&repo_key(repo))
            .map(Vec::as_slice)
            .filter(|langs| !langs.is_empty())
    }

    /// Cards for the displayed window.
    pub fn cards(&self, overrides: &HomepageOverrides, now: DateTime<Utc>) -> Vec<ProjectCard> {
        self.visible()
            .into_iter()
            .map(|repo| ProjectCard::build(repo, self.languages_for(repo), overrides, now))
            .collect()
    }

    /// Selected index within the displayed window.
    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    pub fn select_next(&mut self) {
        if self.displayed == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.displayed => i + 1,
            Some(i) => i, // Stay at end
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_prev(&mut self) {
        if self.displayed == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Jump to the top of the list.
    pub fn select_first(&mut self) {
        if self.displayed > 0 {
            self.list_state.select(Some(0));
        }
    }

    /// Jump to the last displayed project.
    pub fn select_last(&mut self) {
        if self.displayed > 0 {
            self.list_state.select(Some(self.displayed - 1));
        }
    }

    fn clamp_selection(&mut self) {
        if let Some(i) = self.list_state.selected() {
            if i >= self.displayed {
                self.list_state.select(self.displayed.checked_sub(1));
            }
        }
    }
}

fn repo_key(repo: &Repository) -> String {
    language_cache_key(&repo.owner.login, &repo.name)
}
