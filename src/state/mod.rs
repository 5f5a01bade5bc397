// State management module.
// Handles loading state, the repository list session, cards and toasts.

pub mod card;
pub mod showcase;
pub mod toast;

pub use card::{HomepageOverrides, NO_LANGUAGE, POPULAR_STARS_THRESHOLD, ProjectCard, language_color};
pub use showcase::{
    DEFAULT_INITIAL_PAGE_SIZE, DEFAULT_PAGE_SIZE, Showcase, ShowcaseStatus, SortOrder,
    filter_by_name, sort_repositories,
};
pub use toast::{Toast, ToastLevel, Toasts};

use crate::error::FolioError;

/// Loading state for async data.
#[derive(Debug, Clone, Default)]
pub enum LoadingState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Error(LoadError),
}

impl<T> LoadingState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            LoadingState::Loaded(data) => Some(data),
            _ => None,
        }
    }
}

/// A failed load as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub message: String,
    pub hint: Option<String>,
    pub rate_limited: bool,
}

impl From<&FolioError> for LoadError {
    fn from(error: &FolioError) -> Self {
        Self {
            message: error.to_string(),
            hint: error.hint().map(str::to_string),
            rate_limited: error.is_rate_limited(),
        }
    }
}
