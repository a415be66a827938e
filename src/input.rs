//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] mutations.  Keys that need the load
//! controller (search, reload, clear) come back as a [`Command`] for the main
//! loop to carry out, since `App` does not own the controller.
//!
//! While the search box is open every printable key edits the search text;
//! Enter submits it and Esc closes the box.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::App;

/// Work the main loop must do on behalf of a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Cancel the current load and search for this text.
    Search(String),
    /// Run the last query again.
    Reload,
    /// Drop all loaded articles.
    Reset,
}

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit = true;
        return None;
    }

    if app.search_input.is_some() {
        return handle_search_key(app, key.code);
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Enter => app.show_selected_link(),
        KeyCode::Char('/') => app.open_search(),
        KeyCode::Char('r') => return Some(Command::Reload),
        KeyCode::Char('c') => return Some(Command::Reset),
        _ => {}
    }
    None
}

fn handle_search_key(app: &mut App, code: KeyCode) -> Option<Command> {
    match code {
        KeyCode::Enter => return app.submit_search().map(Command::Search),
        KeyCode::Esc => app.close_search(),
        KeyCode::Backspace => app.search_pop(),
        KeyCode::Char(c) => app.search_push(c),
        _ => {}
    }
    None
}
