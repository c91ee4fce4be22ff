//! Input handling: key events onto engine methods.
//!
//! The event queue is drained non-blocking once per frame; the engine stays
//! responsive while a generation is in flight because the pipeline runs on
//! its own task.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use missive_engine::{App, SettingsFocus, Tab};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Continue,
    Quit,
}

/// Drain all pending terminal events and apply them.
pub async fn handle_events(app: &mut App) -> Result<InputOutcome> {
    while event::poll(Duration::ZERO)? {
        match event::read()? {
            Event::Key(key) => {
                if handle_key(app, key).await == InputOutcome::Quit {
                    return Ok(InputOutcome::Quit);
                }
            }
            Event::Paste(text) => handle_paste(app, &text),
            _ => {}
        }
    }
    Ok(InputOutcome::Continue)
}

/// Apply one key event. Public for tests.
pub async fn handle_key(app: &mut App, key: KeyEvent) -> InputOutcome {
    if matches!(key.kind, KeyEventKind::Release) {
        return InputOutcome::Continue;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return InputOutcome::Quit;
    }

    // A pending confirmation captures all input.
    if app.view.confirm.is_some() {
        match key.code {
            KeyCode::Char('y' | 'Y') | KeyCode::Enter => app.confirm_pending().await,
            KeyCode::Char('n' | 'N') | KeyCode::Esc => app.cancel_pending(),
            _ => {}
        }
        return InputOutcome::Continue;
    }

    match key.code {
        KeyCode::Tab => {
            app.view.tab = app.view.tab.next();
            return InputOutcome::Continue;
        }
        KeyCode::BackTab => {
            app.view.tab = app.view.tab.prev();
            return InputOutcome::Continue;
        }
        KeyCode::F(1) => {
            app.view.tab = Tab::General;
            return InputOutcome::Continue;
        }
        KeyCode::F(2) => {
            app.view.tab = Tab::Settings;
            return InputOutcome::Continue;
        }
        KeyCode::F(3) => {
            app.view.tab = Tab::History;
            return InputOutcome::Continue;
        }
        _ => {}
    }

    match app.view.tab {
        Tab::General => handle_general_key(app, key),
        Tab::Settings => handle_settings_key(app, key).await,
        Tab::History => handle_history_key(app, key).await,
    }
    InputOutcome::Continue
}

fn handle_general_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('g') => app.start_generate(),
            KeyCode::Char('t') => app.view.style = app.view.style.toggled(),
            KeyCode::Char('d') => app.save_letter(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Enter => app.start_generate(),
        KeyCode::Char(c) => app.view.url_field.insert_char(c),
        KeyCode::Backspace => app.view.url_field.backspace(),
        KeyCode::Left => app.language_prev(),
        KeyCode::Right => app.language_next(),
        KeyCode::Up => app.view.output_scroll = app.view.output_scroll.saturating_sub(1),
        KeyCode::Down => app.view.output_scroll = app.view.output_scroll.saturating_add(1),
        _ => {}
    }
}

async fn handle_settings_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('s') {
            app.save_cv().await;
        }
        return;
    }

    match key.code {
        KeyCode::Up | KeyCode::Down => {
            app.view.settings_focus = app.view.settings_focus.toggled();
        }
        KeyCode::Enter => match app.view.settings_focus {
            SettingsFocus::Cv => app.view.cv_field.newline(),
            SettingsFocus::ApiKey => app.save_api_key().await,
        },
        KeyCode::Char(c) => match app.view.settings_focus {
            SettingsFocus::Cv => app.view.cv_field.insert_char(c),
            SettingsFocus::ApiKey => app.view.api_key_field.insert_char(c),
        },
        KeyCode::Backspace => match app.view.settings_focus {
            SettingsFocus::Cv => app.view.cv_field.backspace(),
            SettingsFocus::ApiKey => app.view.api_key_field.backspace(),
        },
        _ => {}
    }
}

async fn handle_history_key(app: &mut App, key: KeyEvent) {
    let len = app.records().len();
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.view.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.view.select_next(len),
        KeyCode::Enter => app.view_selected(),
        KeyCode::Char('d') => app.request_delete_selected(),
        KeyCode::Char('c') => app.request_clear_history(),
        KeyCode::Char('e') => app.export_csv().await,
        KeyCode::Char('m') => app.add_manual_entry().await,
        _ => {}
    }
}

fn handle_paste(app: &mut App, text: &str) {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    match app.view.tab {
        Tab::General => app.view.url_field.insert_str(normalized.trim()),
        Tab::Settings => match app.view.settings_focus {
            SettingsFocus::Cv => app.view.cv_field.insert_str(&normalized),
            SettingsFocus::ApiKey => app.view.api_key_field.insert_str(normalized.trim()),
        },
        Tab::History => {}
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use missive_engine::{App, DataDir, MissiveConfig, SettingsFocus, Tab};

    use super::{InputOutcome, handle_key, handle_paste};

    async fn test_app(root: &std::path::Path) -> App {
        App::new(&MissiveConfig::default(), &DataDir::at(root.join("data")))
            .await
            .expect("app")
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn tab_key_cycles_tabs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(dir.path()).await;

        assert_eq!(app.view.tab, Tab::General);
        handle_key(&mut app, key(KeyCode::Tab)).await;
        assert_eq!(app.view.tab, Tab::Settings);
        handle_key(&mut app, key(KeyCode::BackTab)).await;
        assert_eq!(app.view.tab, Tab::General);
    }

    #[tokio::test]
    async fn typing_on_general_edits_the_url_field() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(dir.path()).await;

        for c in "https://x".chars() {
            handle_key(&mut app, key(KeyCode::Char(c))).await;
        }
        handle_key(&mut app, key(KeyCode::Backspace)).await;
        assert_eq!(app.view.url_field.as_str(), "https://");
    }

    #[tokio::test]
    async fn ctrl_c_quits() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(dir.path()).await;

        let quit = handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        )
        .await;
        assert_eq!(quit, InputOutcome::Quit);
    }

    #[tokio::test]
    async fn settings_focus_routes_typed_characters() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(dir.path()).await;
        app.view.tab = Tab::Settings;

        handle_key(&mut app, key(KeyCode::Char('a'))).await;
        handle_key(&mut app, key(KeyCode::Down)).await;
        handle_key(&mut app, key(KeyCode::Char('b'))).await;

        assert_eq!(app.view.cv_field.as_str(), "a");
        assert_eq!(app.view.api_key_field.as_str(), "b");
        assert_eq!(app.view.settings_focus, SettingsFocus::ApiKey);
    }

    #[tokio::test]
    async fn paste_lands_in_the_focused_field() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(dir.path()).await;

        handle_paste(&mut app, "https://example.com/job\n");
        assert_eq!(app.view.url_field.as_str(), "https://example.com/job");

        app.view.tab = Tab::Settings;
        handle_paste(&mut app, "line1\r\nline2");
        assert_eq!(app.view.cv_field.as_str(), "line1\nline2");
    }

    #[tokio::test]
    async fn modal_captures_y_and_n() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(dir.path()).await;

        app.view.url_field.set("https://example.com/job");
        app.add_manual_entry().await;
        app.view.tab = Tab::History;

        handle_key(&mut app, key(KeyCode::Char('d'))).await;
        assert!(app.view.confirm.is_some());

        handle_key(&mut app, key(KeyCode::Char('n'))).await;
        assert!(app.view.confirm.is_none());
        assert_eq!(app.records().len(), 1);

        handle_key(&mut app, key(KeyCode::Char('d'))).await;
        handle_key(&mut app, key(KeyCode::Char('y'))).await;
        assert!(app.records().is_empty());
    }
}
