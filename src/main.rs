// folio entry point.
// Parses flags, sets up logging, then runs the TUI or prints plain text.

use std::io;
use std::panic;
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use folio::app::App;
use folio::config::{Cli, Settings};
use folio::{logging, ui};

/// Restore the terminal before printing a panic message.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

async fn run_tui(app: &mut App) -> io::Result<()> {
    setup_panic_hook();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_plain(app: &mut App) {
    app.load().await;
    app.load_languages().await;
    print!("{}", ui::render_plain(&app.showcase, &app.homepages, Utc::now()));
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::from_cli(cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("folio: {}", e);
            return ExitCode::from(2);
        }
    };

    let _guard = match logging::init(&settings.cache_dir, &settings.log_level) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("folio: {}", e);
            return ExitCode::from(2);
        }
    };

    let mut app = match App::new(&settings) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            eprintln!("folio: {}", e);
            return ExitCode::from(2);
        }
    };

    tracing::info!(user = %settings.user, api = %settings.api_url, "starting");

    if settings.refresh {
        app.clear_cache();
    }

    if settings.plain {
        run_plain(&mut app).await;
        return if app.showcase.error().is_some() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    match run_tui(&mut app).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "terminal error");
            eprintln!("folio: {}", e);
            ExitCode::FAILURE
        }
    }
}
