// folio library crate.
// Fetches, caches and presents a GitHub account's public repositories.

pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod format;
pub mod github;
pub mod limiter;
pub mod logging;
pub mod state;
pub mod ui;

pub use error::{FolioError, Result};
