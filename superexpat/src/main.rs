//! superexpat - SuperExpat AI Agent chat
//!
//! Terminal UI for asking the SuperExpat backend about events and jobs.

mod app;
mod message_format;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use superexpat_core::{Config, HttpChatBackend};

use crate::app::App;

#[derive(Parser, Debug)]
#[command(name = "superexpat")]
#[command(about = "Find events & jobs worldwide with AI-powered search")]
#[command(version)]
struct Args {
    /// Backend base URL (overrides SUPEREXPAT_API_URL and the config file)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(url) = &args.api_url {
        config.override_base_url(url);
    }

    // Initialize logging (to file, not stdout since we have a TUI)
    let _log_guard =
        superexpat_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!(base_url = %config.backend.base_url(), "superexpat TUI starting up");

    let backend =
        HttpChatBackend::new(&config.backend).context("failed to create backend client")?;
    let mut app = App::new(Arc::new(backend));

    // Setup terminal
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;

    tracing::info!(messages = app.messages().len(), "superexpat TUI shutting down");

    result
}

/// Run the main application loop.
fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Pick up a finished request before drawing
        app.poll_pending();
        app.tick();

        terminal.draw(|frame| ui::render(frame, app))?;

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

    Ok(())
}
