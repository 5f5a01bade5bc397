// App state and main event loop.
// Drives loading, language fetching, and keyboard input for the project list.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::future::join_all;
use ratatui::prelude::*;

use crate::cache::{CacheStore, Scope};
use crate::config::Settings;
use crate::error::Result;
use crate::fetch::{LanguageFetcher, RepoRef, RepositoryFetcher, Source};
use crate::github::{GitHubClient, RateLimit, top_languages};
use crate::limiter::ConcurrencyLimiter;
use crate::state::{HomepageOverrides, Showcase, ShowcaseStatus, Toasts};
use crate::ui;

/// Languages kept per repository before badges are picked.
const TOP_LANGUAGES: usize = 5;

/// Where keystrokes go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
}

/// Main application state.
pub struct App {
    /// Repository list session.
    pub showcase: Showcase,
    /// Status line notifications.
    pub toasts: Toasts,
    /// Demo URL overrides applied to cards.
    pub homepages: HomepageOverrides,
    pub user: String,
    pub input_mode: InputMode,
    /// Search text being typed.
    pub search_input: String,
    pub show_help: bool,
    /// Set when the list must be (re)fetched on the next loop turn.
    pub needs_load: bool,
    /// Announce the next successful load as a refresh.
    refreshing: bool,
    /// Whether the app should exit.
    pub should_quit: bool,
    client: Arc<GitHubClient>,
    cache: Arc<CacheStore>,
    repositories: RepositoryFetcher,
    languages: LanguageFetcher,
    limiter: ConcurrencyLimiter,
}

impl App {
    /// Build the app from validated settings, with the on-disk cache.
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Arc::new(GitHubClient::new(
            &settings.api_url,
            settings.token.as_deref(),
        )?);
        let cache = Arc::new(CacheStore::on_disk(&settings.cache_dir));
        Self::with_parts(settings, client, cache)
    }

    /// Build the app around an existing client and cache.
    pub fn with_parts(
        settings: &Settings,
        client: Arc<GitHubClient>,
        cache: Arc<CacheStore>,
    ) -> Result<Self> {
        let limiter = ConcurrencyLimiter::try_from(settings.language_concurrency)?;
        let repositories = RepositoryFetcher::new(client.clone(), cache.clone(), &settings.user)
            .with_excluded(settings.excluded.clone());
        let languages = LanguageFetcher::new(client.clone(), cache.clone());

        let mut showcase = Showcase::new(
            settings.initial_page_size,
            settings.page_size,
            settings.sort,
        );
        showcase.set_loading();

        Ok(Self {
            showcase,
            toasts: Toasts::new(),
            homepages: settings.homepages.clone(),
            user: settings.user.clone(),
            input_mode: InputMode::Normal,
            search_input: String::new(),
            show_help: false,
            needs_load: true,
            refreshing: false,
            should_quit: false,
            client,
            cache,
            repositories,
            languages,
            limiter,
        })
    }

    /// Latest rate limit headers seen from GitHub.
    pub fn rate_limit(&self) -> RateLimit {
        self.client.rate_limit()
    }

    /// Drop the cached repository list.
    pub fn invalidate(&self) {
        self.repositories.invalidate();
    }

    /// Drop everything cached, repository lists and language maps alike.
    pub fn clear_cache(&self) {
        self.cache.clear(Scope::Repositories);
        self.cache.clear(Scope::Languages);
        tracing::info!("cache cleared");
    }

    /// Queue a fetch of the repository list and show the loading state
    /// until it completes.
    pub fn request_load(&mut self) {
        self.needs_load = true;
        self.showcase.set_loading();
    }

    /// Fetch the repository list into the showcase.
    pub async fn load(&mut self) {
        self.needs_load = false;
        self.showcase.set_loading();
        let refreshing = std::mem::take(&mut self.refreshing);

        match self.repositories.fetch().await {
            Ok((repos, source)) => {
                self.showcase.set_loaded(repos);
                if source == Source::Stale {
                    self.toasts
                        .warn("GitHub rate limit reached. Showing cached projects.");
                } else if self.showcase.status() == ShowcaseStatus::Empty {
                    self.toasts.info(self.showcase.empty_message());
                } else if refreshing {
                    self.toasts.success("Projects refreshed from GitHub.");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load repositories");
                if e.is_rate_limited() {
                    self.toasts
                        .error("GitHub API rate limit reached. Wait a few minutes.");
                } else {
                    self.toasts
                        .error("Could not load projects. Check your connection.");
                }
                self.showcase.set_error(&e);
            }
        }
    }

    /// Fetch languages for displayed repositories that do not have them yet.
    ///
    /// Requests go through the limiter; a failed fetch is recorded as "no
    /// languages" so the card falls back to the primary language.
    pub async fn load_languages(&mut self) {
        let pending = self.showcase.pending_languages();
        if pending.is_empty() {
            return;
        }

        let fetcher = &self.languages;
        let limiter = &self.limiter;
        let results = join_all(pending.iter().map(|repo| async move {
            let languages = limiter
                .run(|| fetcher.fetch_repository_languages(repo))
                .await
                .ok()
                .flatten();
            (repo, languages)
        }))
        .await;

        for (repo, languages) in results {
            if let RepoRef::Parts { owner, name, .. } = repo {
                let top = languages
                    .map(|map| top_languages(&map, TOP_LANGUAGES))
                    .unwrap_or_default();
                self.showcase.set_languages(owner, name, top);
            }
        }
    }

    /// Main event loop.
    pub async fn run(&mut self, terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
        while !self.should_quit {
            if !self.step(terminal).await? {
                self.handle_events()?;
            }
        }
        Ok(())
    }

    /// Draw a frame, then run the fetch that is due, if any.
    ///
    /// The frame is drawn before awaiting, so the loading state is on screen
    /// while the request is in flight. Returns whether any work was done.
    pub async fn step(&mut self, terminal: &mut Terminal<impl Backend>) -> io::Result<bool> {
        self.toasts.tick(Instant::now());
        terminal.draw(|frame| ui::draw(frame, self))?;

        if self.needs_load {
            self.load().await;
            return Ok(true);
        }
        if !self.showcase.pending_languages().is_empty() {
            self.load_languages().await;
            return Ok(true);
        }
        Ok(false)
    }

    /// Handle keyboard and other events.
    #[allow(clippy::collapsible_if)]
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        // Raw mode swallows the interrupt signal
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key.code),
            InputMode::Search => self.handle_search_key(key.code),
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode) {
        if self.show_help {
            if matches!(code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Down | KeyCode::Char('j') => self.showcase.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.showcase.select_prev(),
            KeyCode::Home | KeyCode::Char('g') => self.showcase.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.showcase.select_last(),
            KeyCode::Char('m') | KeyCode::PageDown => {
                if self.showcase.show_more() {
                    self.showcase.select_next();
                }
            }
            KeyCode::Char('l') | KeyCode::PageUp => {
                self.showcase.show_less();
            }
            KeyCode::Char('s') => {
                self.showcase.cycle_sort();
                self.toasts
                    .info(format!("Sorted by: {}", self.showcase.sort().label()));
            }
            KeyCode::Char('/') => {
                self.search_input = self.showcase.filter().to_string();
                self.input_mode = InputMode::Search;
            }
            KeyCode::Char('c') => {
                self.search_input.clear();
                self.showcase.set_filter("");
            }
            KeyCode::Char('r') => self.request_load(),
            KeyCode::Char('R') => {
                self.invalidate();
                self.refreshing = true;
                self.request_load();
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                if self.showcase.status() == ShowcaseStatus::Empty {
                    self.toasts.info(self.showcase.empty_message());
                }
            }
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.search_input.clear();
                self.showcase.set_filter("");
            }
            KeyCode::Backspace => {
                self.search_input.pop();
                self.showcase.set_filter(self.search_input.clone());
            }
            KeyCode::Char(c) => {
                self.search_input.push(c);
                self.showcase.set_filter(self.search_input.clone());
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Cli;
    use crate::github::{Owner, Repository};
    use crate::state::ToastLevel;
    use clap::Parser;
    use mockito::{Matcher, Server};
    use ratatui::backend::TestBackend;

    fn settings() -> Settings {
        let cli = Cli::try_parse_from([
            "folio",
            "--user",
            "octocat",
            "--cache-dir",
            "/tmp/folio-app-test",
            "--api-url",
            "http://127.0.0.1:9",
        ])
        .unwrap();
        Settings::from_cli(cli).unwrap()
    }

    fn app() -> App {
        let settings = settings();
        let client = Arc::new(GitHubClient::new(&settings.api_url, None).unwrap());
        App::with_parts(&settings, client, Arc::new(CacheStore::in_memory())).unwrap()
    }

    fn app_for(server: &Server, cache: Arc<CacheStore>) -> App {
        let mut settings = settings();
        settings.api_url = server.url();
        let client = Arc::new(GitHubClient::new(&settings.api_url, None).unwrap());
        App::with_parts(&settings, client, cache).unwrap()
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    fn repo(name: &str) -> Repository {
        Repository {
            name: name.to_string(),
            owner: Owner {
                login: "octocat".to_string(),
            },
            description: None,
            language: Some("Rust".to_string()),
            languages_url: None,
            stargazers_count: 0,
            forks_count: 0,
            updated_at: chrono::Utc::now(),
            homepage: None,
            html_url: format!("https://github.com/octocat/{}", name),
            fork: false,
            private: false,
        }
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_rejects_invalid_concurrency() {
        let mut settings = settings();
        settings.language_concurrency = 0;
        let client = Arc::new(GitHubClient::new(&settings.api_url, None).unwrap());
        let result = App::with_parts(&settings, client, Arc::new(CacheStore::in_memory()));
        assert!(result.is_err());
    }

    #[test]
    fn test_search_mode_filters_live() {
        let mut app = app();
        app.showcase
            .set_loaded(vec![repo("CodeBase"), repo("portfolio"), repo("code-utils")]);

        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.input_mode, InputMode::Search);

        for c in "cod".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.showcase.total(), 2);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.showcase.filter(), "cod");

        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.showcase.total(), 3);
    }

    #[test]
    fn test_empty_search_raises_toast() {
        let mut app = app();
        app.showcase.set_loaded(vec![repo("portfolio")]);

        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Enter);

        let toast = app.toasts.current().unwrap();
        assert_eq!(toast.level, ToastLevel::Info);
        assert!(toast.message.contains("\"x\""));
    }

    #[test]
    fn test_keys_drive_pagination_and_sort() {
        let mut app = app();
        app.showcase
            .set_loaded((0..7).map(|i| repo(&format!("r{}", i))).collect());

        press(&mut app, KeyCode::Char('m'));
        assert_eq!(app.showcase.displayed(), 6);
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.showcase.displayed(), 3);

        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.showcase.sort(), crate::state::SortOrder::Stars);

        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.show_help);
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_load_failure_sets_error_state() {
        // Nothing listens on port 9, so the request fails at the transport level
        let mut app = app();
        app.load().await;

        assert_eq!(app.showcase.status(), ShowcaseStatus::Error);
        assert!(!app.needs_load);
        assert_eq!(app.toasts.current().unwrap().level, ToastLevel::Error);
    }

    #[test]
    fn test_ctrl_c_quits_from_search() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
        assert_eq!(app.search_input, "");
    }

    #[tokio::test]
    async fn test_loading_state_drawn_while_fetching() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/users/octocat/repos")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let mut app = app_for(&server, Arc::new(CacheStore::in_memory()));
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        // The first frame goes out before the request is awaited
        assert!(app.step(&mut terminal).await.unwrap());
        assert!(screen(&terminal).contains("Loading projects"));
        assert_eq!(app.showcase.status(), ShowcaseStatus::Error);

        assert!(!app.step(&mut terminal).await.unwrap());
        assert!(screen(&terminal).contains("to try again"));

        // Retrying shows the loading state again, not the old error
        press(&mut app, KeyCode::Char('r'));
        assert!(app.step(&mut terminal).await.unwrap());
        let text = screen(&terminal);
        assert!(text.contains("Loading projects"));
        assert!(!text.contains("to try again"));
    }

    #[tokio::test]
    async fn test_stale_list_raises_warning() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/users/octocat/repos")
            .match_query(Matcher::Any)
            .with_status(403)
            .create_async()
            .await;

        let cache = Arc::new(CacheStore::in_memory());
        cache.set_at(
            Scope::Repositories,
            "octocat",
            &vec![repo("portfolio")],
            chrono::Utc::now() - chrono::Duration::hours(2),
        );

        let mut app = app_for(&server, cache);
        app.load().await;

        assert_eq!(app.showcase.status(), ShowcaseStatus::Populated);
        let toast = app.toasts.current().unwrap();
        assert_eq!(toast.level, ToastLevel::Warning);
        assert!(toast.message.contains("cached"));
    }

    #[tokio::test]
    async fn test_forced_refresh_announces_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/users/octocat/repos")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(serde_json::to_string(&vec![repo("portfolio")]).unwrap())
            .expect(2)
            .create_async()
            .await;

        let mut app = app_for(&server, Arc::new(CacheStore::in_memory()));
        app.load().await;
        assert!(app.toasts.current().is_none());

        press(&mut app, KeyCode::Char('R'));
        assert!(app.needs_load);
        assert_eq!(app.showcase.status(), ShowcaseStatus::Loading);
        app.load().await;

        assert_eq!(app.toasts.current().unwrap().level, ToastLevel::Success);
        mock.assert_async().await;
    }
}
