//! History export.
//!
//! CSV with a fixed four-column header; every field double-quoted, interior
//! quotes doubled. `Type` distinguishes manual entries from generated ones,
//! `Has Letter` whether generated text is attached.

use std::path::{Path, PathBuf};

use missive_types::HistoryRecord;

/// Default export file name for the history CSV.
pub const CSV_FILE_NAME: &str = "missive-history.csv";
/// Default export file name for a saved letter.
pub const LETTER_FILE_NAME: &str = "missive-letter.txt";

/// Serialize records (storage order) to the export CSV.
#[must_use]
pub fn history_to_csv(records: &[HistoryRecord]) -> String {
    let mut out = String::from("Date,URL,Type,Has Letter\n");
    for record in records {
        let kind = if record.is_manual() {
            "Manual"
        } else {
            "Generated"
        };
        let has_letter = if record.has_letter() { "Yes" } else { "No" };
        out.push_str(&format!(
            "{},{},{},{}\n",
            quote(&record.date),
            quote(&record.url),
            quote(kind),
            quote(has_letter),
        ));
    }
    out
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Write `content` into `dir/file_name`, creating the directory if needed.
pub fn write_export(dir: &Path, file_name: &str, content: &str) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    missive_storage::persist::atomic_write(&path, content.as_bytes(), false)?;
    Ok(path)
}

/// Where exports land when the config does not say otherwise.
#[must_use]
pub fn default_export_dir(data_dir: &Path) -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| data_dir.join("exports"))
}
