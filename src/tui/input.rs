//! Input handling for the TUI.
//!
//! Processes keyboard events and updates application state.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::AppMode;
use crate::App;

/// Handle keyboard events.
pub fn handle_events(key: KeyEvent, app: &mut App) {
    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    match app.mode {
        AppMode::Login => handle_login_mode(key, app),
        AppMode::Workflow => handle_workflow_mode(key, app),
        AppMode::EditDraft | AppMode::EditTime => handle_edit_mode(key, app),
        AppMode::Help => handle_help_mode(key, app),
    }
}

/// Handle input on the login prompt.
fn handle_login_mode(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc => app.quit(),
        KeyCode::Enter => app.login(),
        KeyCode::Char('?') if app.input.is_empty() => app.show_help(),
        _ => handle_text_key(key, app),
    }
}

/// Handle input on the main workflow screen.
fn handle_workflow_mode(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('?') => app.show_help(),
        KeyCode::Char('g') => app.generate(),
        KeyCode::Char('e') => app.begin_edit_draft(),
        KeyCode::Char('t') => app.begin_edit_time(),
        KeyCode::Char('s') => app.schedule(),
        KeyCode::Char('a') | KeyCode::Enter => app.acknowledge(),
        KeyCode::Char('l') => app.logout(),
        _ => {}
    }
}

/// Handle input while editing the draft or the schedule time.
fn handle_edit_mode(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc => app.cancel_input(),
        // Alt+Enter breaks the line in the draft editor
        KeyCode::Enter
            if key.modifiers.contains(KeyModifiers::ALT) && app.mode == AppMode::EditDraft =>
        {
            app.enter_char('\n');
        }
        KeyCode::Enter => app.submit_input(),
        _ => handle_text_key(key, app),
    }
}

/// Handle input in help mode.
fn handle_help_mode(key: KeyEvent, app: &mut App) {
    if matches!(key.code, KeyCode::Esc | KeyCode::Char('?' | 'q') | KeyCode::Enter) {
        app.dismiss_help();
    }
}

/// Shared line-editing keys.
fn handle_text_key(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => app.clear_input(),
        KeyCode::Char('a') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.move_cursor_start();
        }
        KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.move_cursor_end();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => app.enter_char(c),
        KeyCode::Backspace => app.delete_char(),
        KeyCode::Delete => app.delete_char_forward(),
        KeyCode::Left => app.move_cursor_left(),
        KeyCode::Right => app.move_cursor_right(),
        KeyCode::Home => app.move_cursor_start(),
        KeyCode::End => app.move_cursor_end(),
        _ => {}
    }
}
