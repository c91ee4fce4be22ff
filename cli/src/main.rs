//! Missive CLI - binary entry point and terminal session management.
//!
//! # Architecture
//!
//! The CLI bridges [`missive_engine`] (application state) and
//! [`missive_tui`] (rendering), providing RAII-based terminal management
//! with guaranteed cleanup.
//!
//! # Event loop
//!
//! A fixed render cadence drives everything:
//!
//! 1. Wait for frame tick
//! 2. Drain input queue (non-blocking)
//! 3. Advance application state (`app.tick()`: notice expiry, pipeline events)
//! 4. Render frame

use std::fs::{self, OpenOptions};
use std::io::{Stdout, Write, stdout};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use missive_engine::{App, DataDir, MissiveConfig};
use missive_tui::{InputOutcome, draw, handle_events};

const FRAME_DURATION: Duration = Duration::from_millis(16);

fn init_tracing(data_dir: &DataDir) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    let (log_file, init_warnings) = open_log_file(data_dir);

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // If we can't open a log file, prefer "no logs" over corrupting the TUI
    // by writing to stdout/stderr.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file(data_dir: &DataDir) -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let candidates = [
        data_dir.logs_dir().join("missive.log"),
        PathBuf::from(".missive").join("logs").join("missive.log"),
    ];
    let mut warnings = Vec::new();

    for candidate in candidates {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
///
/// On drop, raw mode, bracketed paste, and the alternate screen are restored
/// to their original configuration, so the terminal remains usable even
/// after panics or early returns.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnableBracketedPaste) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }
        if let Err(err) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            let _ = execute!(out, DisableBracketedPaste);
            return Err(err.into());
        }
        // Alternate scroll mode (CSI ? 1007 h): scroll wheel becomes arrow
        // keys without capturing mouse clicks, keeping text selection native.
        let _ = out.write_all(b"\x1b[?1007h");
        let _ = out.flush();

        let terminal = match Terminal::new(CrosstermBackend::new(out)) {
            Ok(t) => t,
            Err(err) => {
                let _ = disable_raw_mode();
                let mut out = stdout();
                let _ = out.write_all(b"\x1b[?1007l");
                let _ = out.flush();
                let _ = execute!(out, LeaveAlternateScreen, DisableBracketedPaste);
                return Err(err.into());
            }
        };

        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = self.terminal.backend_mut().write_all(b"\x1b[?1007l");
        let _ = std::io::Write::flush(&mut *self.terminal.backend_mut());
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableBracketedPaste
        );
        let _ = self.terminal.show_cursor();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let data_dir = DataDir::resolve();
    init_tracing(&data_dir);

    let config = match MissiveConfig::load(&data_dir.config_path()) {
        Ok(Some(config)) => config,
        Ok(None) => MissiveConfig::default(),
        Err(e) => {
            eprintln!("Warning: {e}; continuing with defaults");
            MissiveConfig::default()
        }
    };

    let mut app = App::new(&config, &data_dir).await?;

    let mut session = TerminalSession::new()?;
    let result = run_app(&mut session.terminal, &mut app).await;
    drop(session);
    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> Result<()> {
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        frames.tick().await;

        // Non-blocking input (drain queue only)
        if handle_events(app).await? == InputOutcome::Quit {
            return Ok(());
        }

        app.tick().await;

        terminal.draw(|frame| draw(frame, app))?;
    }
}
