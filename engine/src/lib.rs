//! Application state and the generate pipeline.
//!
//! # Architecture
//!
//! [`App`] is the controller: it owns the stores, the generation client, the
//! cooldown, and the [`ViewState`] the TUI renders. UI key handlers call
//! `App` methods; the generate pipeline runs on a spawned task and reports
//! back over an mpsc channel drained by [`App::tick`].
//!
//! ```text
//! key event -> App::start_generate() -> spawn(run_generate)
//!                                            |
//!                  App::tick() <- mpsc <- GenerateFinished
//! ```
//!
//! Within one action the steps run in the written order (CV read completes
//! before the page fetch starts); across actions the busy flag and the
//! cooldown are the only gates, by design.

pub mod config;
pub mod cooldown;
pub mod export;
pub mod paths;
pub mod prompt;
pub mod ui;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Local;
use tokio::sync::mpsc;

use missive_pagetext::{PageFetchConfig, fetch_page_text};
use missive_providers::GenerationClient;
use missive_storage::{HistoryStore, JsonFileStore, SettingsStore, persist};
use missive_types::{ApiKey, GenerateError, HistoryRecord, Language, MessageStyle, NewRecord};

pub use config::MissiveConfig;
pub use cooldown::{Cooldown, CooldownDecision, GENERATE_COOLDOWN, wait_seconds};
pub use paths::{DataDir, DataDirSource};
pub use ui::{ConfirmAction, Notice, NoticeKind, SettingsFocus, Tab, TextField, ViewState};

const EVENT_CHANNEL_CAPACITY: usize = 16;
const INFO_NOTICE_TTL: Duration = Duration::from_secs(2);
const ERROR_NOTICE_TTL: Duration = Duration::from_secs(3);
const GENERATING_LABEL: &str = "Generating... please wait";

#[derive(Debug)]
enum AppEvent {
    GenerateFinished(Result<String, GenerateError>),
}

pub struct App {
    settings: SettingsStore<JsonFileStore>,
    history: HistoryStore<JsonFileStore>,
    client: GenerationClient,
    fetch_config: PageFetchConfig,
    export_dir: PathBuf,
    config_path: PathBuf,
    cooldown: Cooldown,
    busy: bool,
    records: Vec<HistoryRecord>,
    output: String,
    notice: Option<Notice>,
    events_tx: mpsc::Sender<AppEvent>,
    events_rx: mpsc::Receiver<AppEvent>,
    pub view: ViewState,
}

impl App {
    /// Build the app and restore persisted state (CV draft, last letter,
    /// key-on-file indicator, history).
    pub async fn new(config: &MissiveConfig, data_dir: &DataDir) -> anyhow::Result<Self> {
        persist::ensure_secure_dir(data_dir.path())?;

        let store = JsonFileStore::new(data_dir.store_path());
        let settings = SettingsStore::new(store.clone());
        let history = HistoryStore::new(store);

        let client = match config.endpoint() {
            Some(endpoint) => GenerationClient::with_base_url(endpoint),
            None => GenerationClient::new(),
        }
        .with_model(config.model());

        let export_dir = config
            .export_dir()
            .unwrap_or_else(|| export::default_export_dir(data_dir.path()));

        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let mut view = ViewState::default();
        view.language = config.default_language();
        if let Some(cv) = settings.user_cv().await {
            view.cv_field.set(cv);
        }
        view.api_key_saved = settings.has_api_key().await;

        let output = settings.generated_letter().await.unwrap_or_default();
        let records = history.list().await;

        Ok(Self {
            settings,
            history,
            client,
            fetch_config: config.page_fetch_config(),
            export_dir,
            config_path: data_dir.config_path(),
            cooldown: Cooldown::default(),
            busy: false,
            records,
            output,
            notice: None,
            events_tx,
            events_rx,
            view,
        })
    }

    /// Advance time-based state: expire the notice, drain pipeline events.
    pub async fn tick(&mut self) {
        if self
            .notice
            .as_ref()
            .is_some_and(|n| n.is_expired(Instant::now()))
        {
            self.notice = None;
        }

        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event).await;
        }
    }

    async fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::GenerateFinished(Ok(letter)) => {
                self.busy = false;
                self.view.output_scroll = 0;
                self.output = letter;
                self.refresh_records().await;
            }
            AppEvent::GenerateFinished(Err(err)) => {
                self.busy = false;
                let message = err.to_string();
                // Mirrored into both surfaces so the failure is never silent.
                self.output = message.clone();
                self.set_error(message);
            }
        }
    }

    // ----- Generate -----

    /// Kick off the generate pipeline, unless the cooldown rejects it.
    pub fn start_generate(&mut self) {
        if self.busy {
            return;
        }
        match self.cooldown.try_acquire(Instant::now()) {
            CooldownDecision::Wait(wait) => {
                self.set_error(format!(
                    "Please wait {}s before generating another letter.",
                    wait_seconds(wait)
                ));
                return;
            }
            CooldownDecision::Ready => {}
        }

        self.busy = true;
        self.view.output_scroll = 0;
        self.output = GENERATING_LABEL.to_string();

        let settings = self.settings.clone();
        let history = self.history.clone();
        let client = self.client.clone();
        let fetch_config = self.fetch_config.clone();
        let url = self.view.url_field.as_str().trim().to_string();
        let language = self.view.language;
        let style = self.view.style;
        let tx = self.events_tx.clone();

        tokio::spawn(async move {
            let result =
                run_generate(&settings, &history, &client, &fetch_config, url, language, style)
                    .await;
            let _ = tx.send(AppEvent::GenerateFinished(result)).await;
        });
    }

    /// Step the outreach language and remember the choice as the default.
    pub fn language_next(&mut self) {
        self.view.language = self.view.language.next();
        self.persist_language();
    }

    pub fn language_prev(&mut self) {
        self.view.language = self.view.language.prev();
        self.persist_language();
    }

    fn persist_language(&self) {
        if let Err(e) = MissiveConfig::persist_language(&self.config_path, self.view.language) {
            tracing::warn!("Failed to persist language preference: {e}");
        }
    }

    // ----- Settings -----

    pub async fn save_cv(&mut self) {
        let cv = self.view.cv_field.as_str().to_string();
        match self.settings.set_user_cv(&cv).await {
            Ok(()) => self.set_info("CV saved successfully!"),
            Err(e) => {
                tracing::error!("Failed to save CV: {e}");
                self.set_error(format!("Failed to save CV: {e}"));
            }
        }
    }

    pub async fn save_api_key(&mut self) {
        let key = self.view.api_key_field.as_str().trim().to_string();
        if key.is_empty() {
            self.set_error("Please enter an API key");
            return;
        }
        match self.settings.set_api_key(&key).await {
            Ok(()) => {
                self.view.api_key_field.clear();
                self.view.api_key_saved = true;
                self.set_info_for("API Key saved!", ERROR_NOTICE_TTL);
            }
            Err(e) => {
                tracing::error!("Failed to save API key: {e}");
                self.set_error(format!("Failed to save API key: {e}"));
            }
        }
    }

    // ----- History -----

    /// Record the URL field as an application without generating anything.
    pub async fn add_manual_entry(&mut self) {
        let url = self.view.url_field.as_str().trim().to_string();
        if url.is_empty() {
            self.set_error("Enter the job posting URL first");
            return;
        }
        match self.history.append(NewRecord::manual(url)).await {
            Ok(_) => {
                self.set_info("Added to history.");
                self.refresh_records().await;
            }
            Err(e) => {
                tracing::error!("Failed to add manual entry: {e}");
                self.set_error(format!("Failed to add history entry: {e}"));
            }
        }
    }

    pub fn request_delete_selected(&mut self) {
        let selected = self.selected_record().map(|record| record.id);
        if let Some(id) = selected {
            self.view.confirm = Some(ConfirmAction::DeleteRecord(id));
        }
    }

    pub fn request_clear_history(&mut self) {
        if !self.records.is_empty() {
            self.view.confirm = Some(ConfirmAction::ClearHistory);
        }
    }

    /// Execute the pending confirmation, if any.
    pub async fn confirm_pending(&mut self) {
        let Some(action) = self.view.confirm.take() else {
            return;
        };
        let result = match action {
            ConfirmAction::DeleteRecord(id) => self.history.remove(id).await,
            ConfirmAction::ClearHistory => self.history.clear().await,
        };
        match result {
            Ok(()) => {
                let message = match action {
                    ConfirmAction::DeleteRecord(_) => "Entry deleted from history",
                    ConfirmAction::ClearHistory => "History cleared",
                };
                self.set_info(message);
                self.refresh_records().await;
            }
            Err(e) => {
                tracing::error!("History update failed: {e}");
                self.set_error(format!("History update failed: {e}"));
            }
        }
    }

    pub fn cancel_pending(&mut self) {
        self.view.confirm = None;
    }

    /// Load the selected record's letter into the output pane.
    pub fn view_selected(&mut self) {
        let Some(record) = self.selected_record() else {
            return;
        };
        if let Some(letter) = record.letter.clone().filter(|l| !l.is_empty()) {
            self.output = letter;
            self.view.output_scroll = 0;
            self.view.tab = Tab::General;
        }
    }

    pub async fn export_csv(&mut self) {
        if self.records.is_empty() {
            self.set_error("No history to export");
            return;
        }
        let csv = export::history_to_csv(&self.records);
        match export::write_export(&self.export_dir, export::CSV_FILE_NAME, &csv) {
            Ok(path) => {
                self.set_info_for(
                    format!("History exported to {}", path.display()),
                    ERROR_NOTICE_TTL,
                );
            }
            Err(e) => {
                tracing::error!("CSV export failed: {e}");
                self.set_error(format!("Export failed: {e}"));
            }
        }
    }

    /// Save the current output to a text file in the export directory.
    pub fn save_letter(&mut self) {
        if self.busy || self.output.trim().is_empty() {
            self.set_error("No letter to save");
            return;
        }
        match export::write_export(&self.export_dir, export::LETTER_FILE_NAME, &self.output) {
            Ok(path) => {
                self.set_info_for(format!("Letter saved to {}", path.display()), ERROR_NOTICE_TTL);
            }
            Err(e) => {
                tracing::error!("Letter save failed: {e}");
                self.set_error(format!("Letter save failed: {e}"));
            }
        }
    }

    // ----- Accessors -----

    #[must_use]
    pub fn busy(&self) -> bool {
        self.busy
    }

    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Records in storage order (chronological); display reverses.
    #[must_use]
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// The record the display selection points at (reverse-chronological).
    #[must_use]
    pub fn selected_record(&self) -> Option<&HistoryRecord> {
        let len = self.records.len();
        if len == 0 {
            return None;
        }
        let display_idx = self.view.history_selected.min(len - 1);
        self.records.get(len - 1 - display_idx)
    }

    async fn refresh_records(&mut self) {
        self.records = self.history.list().await;
        self.view.clamp_selection(self.records.len());
    }

    fn set_info(&mut self, text: impl Into<String>) {
        self.set_info_for(text, INFO_NOTICE_TTL);
    }

    fn set_info_for(&mut self, text: impl Into<String>, ttl: Duration) {
        self.notice = Some(Notice::new(text, NoticeKind::Info, ttl));
    }

    fn set_error(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice::new(text, NoticeKind::Error, ERROR_NOTICE_TTL));
    }
}

/// The generate pipeline, in the order the contract fixes: CV, page text,
/// prompt, API call, then the success writes.
async fn run_generate(
    settings: &SettingsStore<JsonFileStore>,
    history: &HistoryStore<JsonFileStore>,
    client: &GenerationClient,
    fetch_config: &PageFetchConfig,
    url: String,
    language: Language,
    style: MessageStyle,
) -> Result<String, GenerateError> {
    let cv = settings.user_cv().await.unwrap_or_default();
    if cv.trim().is_empty() {
        return Err(GenerateError::MissingInput);
    }

    let job_text = if url.is_empty() {
        String::new()
    } else {
        match fetch_page_text(&url, fetch_config).await {
            Ok(text) => text,
            Err(e) => {
                tracing::info!("Page text unavailable, proceeding without it: {e}");
                String::new()
            }
        }
    };

    let today = Local::now().format("%d/%m/%Y").to_string();
    let prompt = prompt::compose_prompt(style, &cv, &job_text, language, &today);

    let api_key = ApiKey::new(settings.api_key().await.unwrap_or_default());
    let letter = client.generate(&prompt, &api_key).await?;

    // The letter is the user's result; persistence problems must not
    // discard it. Log and carry on.
    if let Err(e) = settings.set_generated_letter(&letter).await {
        tracing::warn!("Failed to persist generated letter: {e}");
    }

    let job_description = if job_text.trim().is_empty() {
        "N/A".to_string()
    } else {
        job_text
    };
    let record_url = if url.is_empty() {
        "Unknown URL".to_string()
    } else {
        url
    };
    if let Err(e) = history
        .append(NewRecord::generated(
            record_url,
            job_description,
            letter.clone(),
            language,
        ))
        .await
    {
        tracing::warn!("Failed to append history record: {e}");
    }

    Ok(letter)
}
