//! HTTP client and local state for the `notebox` command-line tool.

pub mod client;
pub mod config;

pub use client::Client;
pub use config::CliConfig;

use crate::models::Note;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("server returned {status} ({code}): {msg}")]
    Api { status: u16, code: i32, msg: String },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("not logged in, run `notebox login` first")]
    NotLoggedIn,
    #[error("could not determine the user config directory")]
    NoConfigDir,
}

/// Plain-text rendering of a note for the terminal.
pub fn format_note(note: &Note) -> String {
    let title = note.title.as_deref().unwrap_or("untitled");
    let archived = if note.archived { " [archived]" } else { "" };
    format!(
        "#{} {}{}\n{}\ncreated {}",
        note.id,
        title,
        archived,
        note.content,
        note.created_at.format("%Y-%m-%d %H:%M")
    )
}

pub fn search_notes<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    notes.iter().filter(|note| note.matches(query)).collect()
}
