use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use super::map_unique_violation;
use crate::database::{StoreError, StoreResult, UserStore};
use crate::models::{NewUser, Role, User};

const USER_COLUMNS: &str = "id, username, email, first_name, middle_name, last_name, dob, \
     password_hash, role, level, created_at, updated_at, deleted_at";

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: Option<String>,
    first_name: String,
    middle_name: String,
    last_name: String,
    dob: Option<NaiveDate>,
    password_hash: String,
    role: String,
    level: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<Role>().map_err(StoreError::Backend)?;
        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            middle_name: row.middle_name,
            last_name: row.last_name,
            dob: row.dob,
            password_hash: row.password_hash,
            role,
            level: row.level,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

/// Whether a rename by some other account has reserved `username`.
async fn retired_by_other(
    tx: &mut Transaction<'_, Postgres>,
    username: &str,
    user_id: Option<i64>,
) -> StoreResult<bool> {
    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM retired_usernames \
         WHERE username = $1 AND user_id IS DISTINCT FROM $2)",
    )
    .bind(username)
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(taken)
}

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_live(&self, column: &str, value: &str) -> StoreResult<User> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {column} = $1 AND deleted_at IS NULL"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("user"))?;
        row.try_into()
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut tx = self.pool.begin().await?;
        if retired_by_other(&mut tx, &user.username, None).await? {
            return Err(StoreError::Conflict(format!(
                "username {} already exists",
                user.username
            )));
        }

        let sql = format!(
            "INSERT INTO users (username, email, first_name, middle_name, last_name, dob, \
             password_hash, role, level) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.middle_name)
            .bind(&user.last_name)
            .bind(user.dob)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(user.level)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                map_unique_violation(e, || "username or email already exists".to_string())
            })?;
        tx.commit().await?;

        tracing::info!("Created user {}", row.username);
        row.try_into()
    }

    async fn update(&self, user: &User) -> StoreResult<User> {
        let mut tx = self.pool.begin().await?;
        let previous: String =
            sqlx::query_scalar("SELECT username FROM users WHERE id = $1 FOR UPDATE")
                .bind(user.id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(StoreError::NotFound("user"))?;
        if previous != user.username
            && retired_by_other(&mut tx, &user.username, Some(user.id)).await?
        {
            return Err(StoreError::Conflict(format!(
                "username {} already exists",
                user.username
            )));
        }

        let sql = format!(
            "UPDATE users SET username = $2, email = $3, first_name = $4, middle_name = $5, \
             last_name = $6, dob = $7, password_hash = $8, role = $9, level = $10, \
             updated_at = now(), deleted_at = $11 \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.middle_name)
            .bind(&user.last_name)
            .bind(user.dob)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(user.level)
            .bind(user.deleted_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                map_unique_violation(e, || "username or email already exists".to_string())
            })?;

        if previous != row.username {
            sqlx::query(
                "INSERT INTO retired_usernames (username, user_id) VALUES ($1, $2) \
                 ON CONFLICT (username) DO NOTHING",
            )
            .bind(&previous)
            .bind(user.id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        row.try_into()
    }

    async fn get_by_username(&self, username: &str) -> StoreResult<User> {
        self.find_live("username", username).await
    }

    async fn get_by_email(&self, email: &str) -> StoreResult<User> {
        self.find_live("email", email).await
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = now(), updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("user"));
        }
        tracing::info!("Soft-deleted user {}", id);
        Ok(())
    }

    async fn count_all(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
