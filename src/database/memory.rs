use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{NoteStore, StoreError, StoreResult, UserStore};
use crate::auth::verify_password;
use crate::models::{NewNote, NewUser, Note, User};

#[derive(Default)]
struct MemoryState {
    users: BTreeMap<i64, User>,
    notes: BTreeMap<i64, Note>,
    /// Usernames given up by a rename, mapped to the account that held them.
    retired: BTreeMap<String, i64>,
    last_user_id: i64,
    last_note_id: i64,
}

impl MemoryState {
    fn find_conflict(&self, id: Option<i64>, username: &str, email: Option<&str>) -> Option<String> {
        if self
            .retired
            .get(username)
            .is_some_and(|holder| Some(*holder) != id)
        {
            return Some(format!("username {username} already exists"));
        }
        self.users
            .values()
            .filter(|existing| Some(existing.id) != id)
            .find_map(|existing| {
                if existing.username == username {
                    Some(format!("username {username} already exists"))
                } else if email.is_some() && existing.email.as_deref() == email {
                    Some(format!("email {} already exists", email.unwrap_or_default()))
                } else {
                    None
                }
            })
    }

    fn live_user(&self, predicate: impl Fn(&User) -> bool) -> StoreResult<User> {
        self.users
            .values()
            .find(|user| !user.is_deleted() && predicate(user))
            .cloned()
            .ok_or(StoreError::NotFound("user"))
    }
}

/// Process-local store used when no database is configured, and by tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut state = self.state.write().await;
        if let Some(conflict) = state.find_conflict(None, &user.username, user.email.as_deref()) {
            return Err(StoreError::Conflict(conflict));
        }

        state.last_user_id += 1;
        let now = Utc::now();
        let created = User {
            id: state.last_user_id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            middle_name: user.middle_name,
            last_name: user.last_name,
            dob: user.dob,
            password_hash: user.password_hash,
            role: user.role,
            level: user.level,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, user: &User) -> StoreResult<User> {
        let mut state = self.state.write().await;
        let previous = state
            .users
            .get(&user.id)
            .map(|stored| stored.username.clone())
            .ok_or(StoreError::NotFound("user"))?;
        if let Some(conflict) =
            state.find_conflict(Some(user.id), &user.username, user.email.as_deref())
        {
            return Err(StoreError::Conflict(conflict));
        }

        let mut updated = user.clone();
        updated.updated_at = Utc::now();
        state.users.insert(updated.id, updated.clone());
        if previous != updated.username {
            state.retired.entry(previous).or_insert(updated.id);
        }
        Ok(updated)
    }

    async fn get_by_username(&self, username: &str) -> StoreResult<User> {
        self.state.read().await.live_user(|user| user.username == username)
    }

    async fn get_by_email(&self, email: &str) -> StoreResult<User> {
        self.state
            .read()
            .await
            .live_user(|user| user.email.as_deref() == Some(email))
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let user = state.users.get_mut(&id).ok_or(StoreError::NotFound("user"))?;
        let now = Utc::now();
        user.deleted_at = Some(now);
        user.updated_at = now;
        Ok(())
    }

    async fn count_all(&self) -> StoreResult<i64> {
        Ok(self.state.read().await.users.len() as i64)
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn create(&self, note: NewNote) -> StoreResult<Note> {
        let mut state = self.state.write().await;
        state.last_note_id += 1;
        let now = Utc::now();
        let created = Note {
            id: state.last_note_id,
            title: note.title,
            content: note.content,
            owner: note.owner,
            archived: note.archived,
            created_at: now,
            updated_at: now,
        };
        state.notes.insert(created.id, created.clone());
        Ok(created)
    }

    async fn read_by_id(&self, id: i64) -> StoreResult<Note> {
        self.state
            .read()
            .await
            .notes
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("note"))
    }

    async fn read_by_owner(&self, username: &str) -> StoreResult<Vec<Note>> {
        let state = self.state.read().await;
        Ok(state
            .notes
            .values()
            .filter(|note| note.owner == username)
            .cloned()
            .collect())
    }

    async fn update(&self, note: &Note) -> StoreResult<Note> {
        let mut state = self.state.write().await;
        let stored = state
            .notes
            .get_mut(&note.id)
            .ok_or(StoreError::NotFound("note"))?;
        *stored = Note {
            updated_at: Utc::now(),
            ..note.clone()
        };
        Ok(stored.clone())
    }

    async fn delete(&self, note: &Note) -> StoreResult<()> {
        self.state
            .write()
            .await
            .notes
            .remove(&note.id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("note"))
    }

    async fn rename_owner(&self, from: &str, to: &str) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let mut moved = 0;
        for note in state.notes.values_mut().filter(|note| note.owner == from) {
            note.owner = to.to_string();
            moved += 1;
        }
        Ok(moved)
    }

    async fn verify_owner_password(&self, username: &str, password: &str) -> StoreResult<bool> {
        let user = match self.state.read().await.live_user(|user| user.username == username) {
            Ok(user) => user,
            Err(StoreError::NotFound(_)) => return Ok(false),
            Err(e) => return Err(e),
        };
        Ok(verify_password(password, &user.password_hash))
    }
}
