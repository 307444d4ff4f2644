use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: Option<String>,
    pub content: String,
    /// Username of the account that created the note.
    pub owner: String,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNote {
    pub title: Option<String>,
    pub content: String,
    pub owner: String,
    pub archived: bool,
}

/// Caller-supplied edits to an existing note.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl NoteChanges {
    /// Merges onto the stored row. Blank text fields keep the stored value;
    /// `archived` overwrites whenever it is present.
    pub fn apply_to(self, note: &mut Note) {
        if let Some(title) = self.title.filter(|t| !t.trim().is_empty()) {
            note.title = Some(title);
        }
        if let Some(content) = self.content.filter(|c| !c.trim().is_empty()) {
            note.content = content;
        }
        if let Some(archived) = self.archived {
            note.archived = archived;
        }
    }
}

impl Note {
    /// Case-sensitive substring match on title or content.
    pub fn matches(&self, query: &str) -> bool {
        self.content.contains(query)
            || self.title.as_deref().is_some_and(|title| title.contains(query))
    }
}
