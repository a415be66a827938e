//! headlines — search a news API and browse the results in the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//!                 ┌──────────┐  LoadMsg   ┌──────────┐ callbacks ┌──────────┐  draw()  ┌──────────┐
//!  source/  ◄─────│  worker  │ ─────────► │  load.rs │ ────────► │  app.rs  │ ───────► │  ui.rs   │
//! (fetch+parse)   │ (thread) │  (channel) │ (cycles) │           │ (state)  │          │ (render) │
//!                 └──────────┘            └──────────┘           └──────────┘          └──────────┘
//!                                               ▲                      ▲
//!                                               │ Command              │ handle_key_event()
//!                                               └──────── input.rs ────┘
//! ```
//!
//! * **`source/`** — URL building, HTTP fetching, JSON parsing and the
//!   connectivity check.
//! * **`load`** — runs one cancellable fetch+parse cycle at a time on a
//!   background thread and delivers its outcome.
//! * **`app`** — owns the article list, selection, search box and status.
//! * **`ui`** — pure rendering: reads `App` state and draws widgets.
//! * **`input`** — maps key events to `App` mutations and commands.
//! * **`cli`** / **`logging`** — configuration and the file log.
//! * **`main`** — wires everything together: parse args, set up the terminal,
//!   and run the event loop.

mod app;
mod cli;
mod error;
mod input;
mod load;
mod logging;
mod source;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use app::App;
use cli::Cli;
use input::Command;
use load::LoadController;
use source::{build_search_url, HttpSource, ReachabilityMonitor};

// ---------------------------------------------------------------------------
// RAII terminal guard — cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before the default hook prints the panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_path())?;
    install_panic_hook();

    let base_query_url = cli.base_query_url();
    info!(endpoint = %cli.endpoint, "headlines starting up");

    // -- pipeline ------------------------------------------------------------
    let source = HttpSource::new().context("failed to build HTTP client")?;
    let connectivity = ReachabilityMonitor::for_endpoint(&cli.endpoint)?;
    let mut loader = LoadController::new(Arc::new(source), Box::new(connectivity));

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(cli.query.clone());

    loader.start(&build_search_url(&base_query_url, &app.query), &mut app);

    // -- main event loop -----------------------------------------------------
    // ~10 fps.  Each iteration delivers a finished load, renders, then waits
    // up to one tick for keyboard input.
    let tick_rate = Duration::from_millis(100);

    loop {
        loader.deliver(&mut app);

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                match input::handle_key_event(&mut app, key) {
                    Some(Command::Search(text)) => {
                        loader.start(&build_search_url(&base_query_url, &text), &mut app);
                    }
                    Some(Command::Reload) => {
                        loader.start(&build_search_url(&base_query_url, &app.query), &mut app);
                    }
                    Some(Command::Reset) => loader.reset(&mut app),
                    None => {}
                }
            }
        }

        if app.quit {
            break;
        }
    }

    info!(state = ?loader.state(), "headlines shutting down");
    // `guard` is dropped here, restoring the terminal.
    Ok(())
}
