//! UI view state owned by the controller.
//!
//! The TUI crate renders this state and maps key events onto `App` methods;
//! it holds no state of its own.

use std::time::{Duration, Instant};

use missive_types::{Language, MessageStyle, RecordId};

/// The three UI tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    General,
    Settings,
    History,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::General, Tab::Settings, Tab::History];

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Tab::General => "General",
            Tab::Settings => "Settings",
            Tab::History => "History",
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    #[must_use]
    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Which field on the Settings tab receives typed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsFocus {
    #[default]
    Cv,
    ApiKey,
}

impl SettingsFocus {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Cv => Self::ApiKey,
            Self::ApiKey => Self::Cv,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Transient inline message that self-clears after its TTL.
#[derive(Debug, Clone)]
pub struct Notice {
    text: String,
    kind: NoticeKind,
    expires_at: Instant,
}

impl Notice {
    #[must_use]
    pub fn new(text: impl Into<String>, kind: NoticeKind, ttl: Duration) -> Self {
        Self {
            text: text.into(),
            kind,
            expires_at: Instant::now() + ttl,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn kind(&self) -> NoticeKind {
        self.kind
    }

    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Minimal editable text buffer (append/backspace, no cursor movement).
#[derive(Debug, Clone, Default)]
pub struct TextField {
    content: String,
    multiline: bool,
}

impl TextField {
    #[must_use]
    pub fn single_line() -> Self {
        Self {
            content: String::new(),
            multiline: false,
        }
    }

    #[must_use]
    pub fn multiline() -> Self {
        Self {
            content: String::new(),
            multiline: true,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if c == '\n' && !self.multiline {
            return;
        }
        if c == '\n' || !c.is_control() {
            self.content.push(c);
        }
    }

    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars() {
            self.insert_char(c);
        }
    }

    pub fn backspace(&mut self) {
        self.content.pop();
    }

    pub fn newline(&mut self) {
        if self.multiline {
            self.content.push('\n');
        }
    }

    pub fn set(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn clear(&mut self) {
        self.content.clear();
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Pending destructive action awaiting interactive confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteRecord(RecordId),
    ClearHistory,
}

impl ConfirmAction {
    #[must_use]
    pub const fn question(self) -> &'static str {
        match self {
            Self::DeleteRecord(_) => "Delete this entry from history?",
            Self::ClearHistory => "Clear all history?",
        }
    }
}

/// Everything the TUI renders.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub tab: Tab,
    pub url_field: TextField,
    pub language: Language,
    pub style: MessageStyle,
    pub cv_field: TextField,
    pub api_key_field: TextField,
    /// A key is on file; the input renders a masked placeholder instead.
    pub api_key_saved: bool,
    pub settings_focus: SettingsFocus,
    /// Selection index into the displayed (reverse-chronological) list.
    pub history_selected: usize,
    pub output_scroll: u16,
    pub confirm: Option<ConfirmAction>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            tab: Tab::default(),
            url_field: TextField::single_line(),
            language: Language::default(),
            style: MessageStyle::default(),
            cv_field: TextField::multiline(),
            api_key_field: TextField::single_line(),
            api_key_saved: false,
            settings_focus: SettingsFocus::default(),
            history_selected: 0,
            output_scroll: 0,
            confirm: None,
        }
    }
}

impl ViewState {
    pub fn select_next(&mut self, len: usize) {
        if len > 0 && self.history_selected + 1 < len {
            self.history_selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.history_selected = self.history_selected.saturating_sub(1);
    }

    pub fn clamp_selection(&mut self, len: usize) {
        if len == 0 {
            self.history_selected = 0;
        } else if self.history_selected >= len {
            self.history_selected = len - 1;
        }
    }
}
