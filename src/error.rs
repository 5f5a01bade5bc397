// Error types for folio.
// Covers GitHub API failures, configuration mistakes and cache problems.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolioError {
    #[error("GitHub API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Request failed with HTTP {status}")]
    Network { status: StatusCode },

    #[error("GitHub API rate limit exceeded{}", .reset_at.as_deref().map(|at| format!(", resets at {at}")).unwrap_or_default())]
    RateLimited { reset_at: Option<String> },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FolioError {
    /// Whether this error came from the API rate limiter.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FolioError::RateLimited { .. })
    }

    /// A hint to show next to the error, if there is something the user can do.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            FolioError::RateLimited { .. } => Some(
                "GitHub allows 60 unauthenticated requests per hour. \
                 Wait a few minutes and try again, or set GITHUB_TOKEN.",
            ),
            FolioError::NotFound(_) => Some("Check the --user login."),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FolioError>;
