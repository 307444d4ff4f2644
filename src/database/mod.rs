// Storage contracts for users and notes, with a PostgreSQL and an in-memory backend.

use async_trait::async_trait;

use crate::models::{NewNote, NewUser, Note, User};

pub mod memory;
pub mod repositories;

pub use memory::MemoryStore;
pub use repositories::{NoteRepository, UserRepository};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("storage error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the username or email is taken.
    async fn create(&self, user: NewUser) -> StoreResult<User>;

    /// Overwrites the whole row identified by `user.id`.
    async fn update(&self, user: &User) -> StoreResult<User>;

    /// Soft-deleted users are reported as `NotFound`.
    async fn get_by_username(&self, username: &str) -> StoreResult<User>;

    /// Soft-deleted users are reported as `NotFound`.
    async fn get_by_email(&self, email: &str) -> StoreResult<User>;

    /// Marks the user deleted; the row is kept.
    async fn delete(&self, id: i64) -> StoreResult<()>;

    /// Number of user rows ever created, soft-deleted ones included.
    async fn count_all(&self) -> StoreResult<i64>;
}

#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn create(&self, note: NewNote) -> StoreResult<Note>;

    async fn read_by_id(&self, id: i64) -> StoreResult<Note>;

    async fn read_by_owner(&self, username: &str) -> StoreResult<Vec<Note>>;

    /// Persists an already merged note.
    async fn update(&self, note: &Note) -> StoreResult<Note>;

    async fn delete(&self, note: &Note) -> StoreResult<()>;

    /// Moves every note of `from` to `to`, returning how many were moved.
    async fn rename_owner(&self, from: &str, to: &str) -> StoreResult<u64>;

    /// Checks `password` against the stored hash of a live user.
    async fn verify_owner_password(&self, username: &str, password: &str) -> StoreResult<bool>;

    /// Deletes the owner's notes one at a time and stops at the first failure,
    /// so an error can leave some notes deleted.
    async fn delete_all_by_owner(&self, username: &str) -> StoreResult<usize> {
        let notes = self.read_by_owner(username).await?;
        let mut deleted = 0;
        for note in &notes {
            self.delete(note).await?;
            deleted += 1;
        }
        Ok(deleted)
    }
}
