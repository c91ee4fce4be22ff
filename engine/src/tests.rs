//! Controller pipeline tests against a mock API server.

use std::path::Path;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use missive_types::Language;

use crate::config::{AppConfig, MissiveConfig};
use crate::ui::NoticeKind;
use crate::{App, DataDir, Tab};

const GENERATE_PATH: &str = "/models/gemini-2.5-flash:generateContent";

fn test_config(server: &MockServer, data_root: &Path) -> MissiveConfig {
    MissiveConfig {
        app: Some(AppConfig {
            model: None,
            language: Some("fr".to_string()),
            endpoint: Some(server.uri()),
            export_dir: Some(data_root.join("exports")),
        }),
        fetch: None,
    }
}

async fn test_app(server: &MockServer, data_root: &Path) -> App {
    let config = test_config(server, data_root);
    let data_dir = DataDir::at(data_root.join("data"));
    App::new(&config, &data_dir).await.expect("app")
}

async fn wait_for_idle(app: &mut App) {
    for _ in 0..500 {
        app.tick().await;
        if !app.busy() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("generate pipeline did not settle");
}

fn candidate_body(text: &str) -> serde_json::Value {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}

async fn seed_cv_and_key(app: &mut App, cv: &str, key: &str) {
    app.view.cv_field.set(cv);
    app.save_cv().await;
    app.view.api_key_field.set(key);
    app.save_api_key().await;
}

#[tokio::test]
async fn empty_cv_fails_inline_without_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = test_app(&server, dir.path()).await;

    app.start_generate();
    wait_for_idle(&mut app).await;

    assert!(app.output().contains("Please enter your CV"));
    assert_eq!(app.notice().map(|n| n.kind()), Some(NoticeKind::Error));
    assert!(app.records().is_empty());
}

#[tokio::test]
async fn second_trigger_within_cooldown_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("Hello there.")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = test_app(&server, dir.path()).await;
    seed_cv_and_key(&mut app, "ten years of Rust", "AIza-test").await;

    app.start_generate();
    wait_for_idle(&mut app).await;
    assert_eq!(app.output(), "Hello there.");

    app.start_generate();
    assert!(!app.busy());
    let notice = app.notice().expect("cooldown notice");
    assert!(notice.text().contains("Please wait"));
    assert_eq!(app.output(), "Hello there.");
}

#[tokio::test]
async fn generate_pipeline_persists_letter_and_history() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/job"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><body><h1>Rust role</h1><p>Build missives.</p></body></html>",
            "text/html",
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "AIza-test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(candidate_body("Dear recruiter, hello.")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = test_app(&server, dir.path()).await;
    seed_cv_and_key(&mut app, "ten years of Rust", "AIza-test").await;
    app.view.url_field.set(format!("{}/job", server.uri()));

    app.start_generate();
    wait_for_idle(&mut app).await;

    assert_eq!(app.output(), "Dear recruiter, hello.");
    let records = app.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert!(record.url.ends_with("/job"));
    assert_eq!(record.language.as_deref(), Some("fr"));
    assert!(record.job_description.as_deref().unwrap().contains("Rust role"));
    assert_eq!(record.letter.as_deref(), Some("Dear recruiter, hello."));
    assert!(!record.is_manual());

    // A fresh App over the same data dir restores the last letter and history.
    let restored = test_app(&server, dir.path()).await;
    assert_eq!(restored.output(), "Dear recruiter, hello.");
    assert_eq!(restored.records().len(), 1);
    assert!(restored.view.api_key_saved);
    assert_eq!(restored.view.cv_field.as_str(), "ten years of Rust");
}

#[tokio::test]
async fn unreachable_page_degrades_to_no_job_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("A letter.")))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = test_app(&server, dir.path()).await;
    seed_cv_and_key(&mut app, "cv", "AIza-test").await;
    // No GET mock for this path: the fetch 404s and generation proceeds.
    app.view.url_field.set(format!("{}/gone", server.uri()));

    app.start_generate();
    wait_for_idle(&mut app).await;

    assert_eq!(app.output(), "A letter.");
    assert_eq!(app.records()[0].job_description.as_deref(), Some("N/A"));
}

#[tokio::test]
async fn api_failure_is_mirrored_into_output_and_notice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = test_app(&server, dir.path()).await;
    seed_cv_and_key(&mut app, "cv", "AIza-test").await;

    app.start_generate();
    wait_for_idle(&mut app).await;

    assert!(app.output().contains("Too many requests"));
    let notice = app.notice().expect("error notice");
    assert_eq!(notice.kind(), NoticeKind::Error);
    assert!(notice.text().contains("Too many requests"));
    assert!(app.records().is_empty());
}

#[tokio::test]
async fn manual_entry_needs_a_url() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = test_app(&server, dir.path()).await;

    app.add_manual_entry().await;
    assert!(app.records().is_empty());
    assert_eq!(app.notice().map(|n| n.kind()), Some(NoticeKind::Error));

    app.view.url_field.set("https://example.com/job");
    app.add_manual_entry().await;

    let records = app.records();
    assert_eq!(records.len(), 1);
    assert!(records[0].is_manual());
    assert!(records[0].letter.is_none());
    assert!(records[0].job_description.is_none());
    assert_eq!(records[0].url, "https://example.com/job");
}

#[tokio::test]
async fn delete_and_clear_go_through_confirmation() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = test_app(&server, dir.path()).await;

    app.view.url_field.set("https://example.com/a");
    app.add_manual_entry().await;
    app.view.url_field.set("https://example.com/b");
    app.add_manual_entry().await;
    assert_eq!(app.records().len(), 2);

    // Cancelling leaves the list alone.
    app.request_delete_selected();
    assert!(app.view.confirm.is_some());
    app.cancel_pending();
    app.confirm_pending().await;
    assert_eq!(app.records().len(), 2);

    // Selection 0 is the most recent entry (/b).
    app.request_delete_selected();
    app.confirm_pending().await;
    assert_eq!(app.records().len(), 1);
    assert_eq!(app.records()[0].url, "https://example.com/a");

    app.request_clear_history();
    app.confirm_pending().await;
    assert!(app.records().is_empty());
}

#[tokio::test]
async fn view_selected_loads_the_stored_letter() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("The letter.")))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = test_app(&server, dir.path()).await;
    seed_cv_and_key(&mut app, "cv", "AIza-test").await;

    app.view.url_field.set("https://example.com/old");
    app.add_manual_entry().await;
    app.view.url_field.clear();
    app.start_generate();
    wait_for_idle(&mut app).await;

    app.view.tab = Tab::History;

    // Most recent first: selection 0 is the generated entry.
    app.view.history_selected = 0;
    app.view_selected();
    assert_eq!(app.view.tab, Tab::General);
    assert_eq!(app.output(), "The letter.");

    // The manual entry has no letter; viewing it changes nothing.
    app.view.tab = Tab::History;
    app.view.history_selected = 1;
    app.view_selected();
    assert_eq!(app.view.tab, Tab::History);
}

#[tokio::test]
async fn csv_export_writes_into_the_configured_dir() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = test_app(&server, dir.path()).await;

    app.export_csv().await;
    assert!(app.notice().expect("notice").text().contains("No history"));

    app.view.url_field.set("https://example.com/job");
    app.add_manual_entry().await;
    app.export_csv().await;

    let csv_path = dir.path().join("exports").join("missive-history.csv");
    let content = std::fs::read_to_string(csv_path).expect("csv file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "Date,URL,Type,Has Letter");
    assert!(lines[1].ends_with("\"https://example.com/job\",\"Manual\",\"No\""));
}

#[tokio::test]
async fn api_key_save_validates_and_masks() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = test_app(&server, dir.path()).await;

    app.save_api_key().await;
    assert!(!app.view.api_key_saved);
    assert!(app.notice().expect("notice").text().contains("enter an API key"));

    app.view.api_key_field.set("  AIza-test  ");
    app.save_api_key().await;
    assert!(app.view.api_key_saved);
    assert!(app.view.api_key_field.is_empty());
}

#[tokio::test]
async fn config_language_seeds_the_selector() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = test_app(&server, dir.path()).await;
    assert_eq!(app.view.language, Language::French);
}

#[tokio::test]
async fn language_change_persists_as_the_new_default() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = test_app(&server, dir.path()).await;

    // French -> English in selector order.
    app.language_next();
    assert_eq!(app.view.language, Language::English);

    let config_path = dir.path().join("data").join("config.toml");
    let persisted = MissiveConfig::load(&config_path).expect("load").expect("some");
    assert_eq!(persisted.default_language(), Language::English);
}
