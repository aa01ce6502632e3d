//! mintdash - analytics dashboard for an on-chain minting platform
//!
//! A terminal UI application that loads user, mint, split contract, revenue,
//! story and transaction data from the platform backend, caches it on disk, and
//! renders summaries and charts. `--json` prints a report instead.

use std::io;
use std::panic;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use mintdash::app::App;
use mintdash::cache::{FileStore, MemoryStore};
use mintdash::cli::{Cli, StartupConfig};
use mintdash::config::Config;
use mintdash::data::BackendClient;
use mintdash::fetch::CachePolicy;
use mintdash::loader::{Loader, SharedStore};
use mintdash::refresh::{self, LoadHandle};
use mintdash::{logging, report, ui};

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Renders the dashboard and, when toggled, the help overlay on top
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    ui::render_dashboard(frame, app);
    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

/// Loads the dataset once and prints the JSON report to stdout
async fn run_report(loader: &Loader, startup: &StartupConfig) -> Result<(), Box<dyn std::error::Error>> {
    let policy = if startup.refresh {
        CachePolicy::Refresh
    } else {
        CachePolicy::PreferCache
    };
    let loaded = loader.load(startup.dataset, &startup.filters, policy).await?;
    let report = report::build_report(&loaded, &startup.view, Utc::now(), &Local)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Runs the interactive dashboard until the user quits
async fn run_tui(loader: Arc<Loader>, startup: StartupConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(startup);
    let mut loads = LoadHandle::new();

    // Main event loop
    loop {
        for request in app.take_load_requests() {
            loads.spawn(Arc::clone(&loader), request);
        }
        while let Some(message) = refresh::try_recv(&mut loads) {
            app.apply(message);
        }

        terminal.draw(|f| render_ui(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let startup = match StartupConfig::from_cli(&cli) {
        Ok(startup) => startup,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let config = match Config::from_env(cli.api_url.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let file_store = FileStore::new();

    if startup.json {
        logging::init_stderr();
    } else if let Some(store) = &file_store {
        if let Err(e) = logging::init_file(store.dir()) {
            eprintln!("Warning: could not open log file: {}", e);
        }
    }

    let store: SharedStore = match file_store {
        Some(store) => Arc::new(store),
        None => {
            info!("No cache directory available, caching in memory");
            Arc::new(MemoryStore::new())
        }
    };

    info!(api_url = %config.api_url, environment = ?config.environment, dataset = %startup.dataset, "Starting mintdash");
    let loader = Loader::new(BackendClient::new(config.api_url.clone()), store, &config);

    if startup.json {
        if let Err(e) = run_report(&loader, &startup).await {
            error!(error = %e, "Report failed");
            eprintln!("Error: {}", e);
            process::exit(1);
        }
        return Ok(());
    }

    run_tui(Arc::new(loader), startup).await
}
