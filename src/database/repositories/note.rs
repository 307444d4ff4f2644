use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::auth::verify_password;
use crate::database::{NoteStore, StoreError, StoreResult};
use crate::models::{NewNote, Note};

const NOTE_COLUMNS: &str = "id, title, content, owner, archived, created_at, updated_at";

#[derive(Debug, FromRow)]
struct NoteRow {
    id: i64,
    title: Option<String>,
    content: String,
    owner: String,
    archived: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Note {
            id: row.id,
            title: row.title,
            content: row.content,
            owner: row.owner,
            archived: row.archived,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct NoteRepository {
    pool: PgPool,
}

impl NoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteStore for NoteRepository {
    async fn create(&self, note: NewNote) -> StoreResult<Note> {
        let sql = format!(
            "INSERT INTO notes (title, content, owner, archived) VALUES ($1, $2, $3, $4) \
             RETURNING {NOTE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, NoteRow>(&sql)
            .bind(&note.title)
            .bind(&note.content)
            .bind(&note.owner)
            .bind(note.archived)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn read_by_id(&self, id: i64) -> StoreResult<Note> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1");
        sqlx::query_as::<_, NoteRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Note::from)
            .ok_or(StoreError::NotFound("note"))
    }

    async fn read_by_owner(&self, username: &str) -> StoreResult<Vec<Note>> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE owner = $1 ORDER BY id");
        let rows = sqlx::query_as::<_, NoteRow>(&sql)
            .bind(username)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Note::from).collect())
    }

    async fn update(&self, note: &Note) -> StoreResult<Note> {
        let sql = format!(
            "UPDATE notes SET title = $2, content = $3, owner = $4, archived = $5, \
             updated_at = now() WHERE id = $1 RETURNING {NOTE_COLUMNS}"
        );
        sqlx::query_as::<_, NoteRow>(&sql)
            .bind(note.id)
            .bind(&note.title)
            .bind(&note.content)
            .bind(&note.owner)
            .bind(note.archived)
            .fetch_optional(&self.pool)
            .await?
            .map(Note::from)
            .ok_or(StoreError::NotFound("note"))
    }

    async fn delete(&self, note: &Note) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(note.id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("note"));
        }
        Ok(())
    }

    async fn rename_owner(&self, from: &str, to: &str) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE notes SET owner = $2, updated_at = now() WHERE owner = $1")
            .bind(from)
            .bind(to)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn verify_owner_password(&self, username: &str, password: &str) -> StoreResult<bool> {
        let hash: Option<String> = sqlx::query_scalar(
            "SELECT password_hash FROM users WHERE username = $1 AND deleted_at IS NULL",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(hash.is_some_and(|hash| verify_password(password, &hash)))
    }
}
