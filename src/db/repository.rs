//! User repository.
//!
//! This module provides CRUD operations for users in the database.

use sqlx::QueryBuilder;

use super::user::{NewUser, User, UserUpdate, UNUSABLE_PASSWORD};
use super::{now_timestamp, DbPool};
use crate::{FoodsavingError, Result};

const USER_COLUMNS: &str = "id, display_name, email, password, description, mail_verified,
    unverified_email, activation_key, key_expires_at, is_active, is_staff, deleted,
    deleted_at, created_at";

/// Repository for user CRUD operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    ///
    /// Returns `Conflict` if the email is already registered.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users (email, password, display_name, description)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&new_user.email)
        .bind(&new_user.password)
        .bind(&new_user.display_name)
        .bind(&new_user.description)
        .execute(self.pool)
        .await
        .map_err(map_unique_violation)?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| FoodsavingError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Get a user by email (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Check whether another account uses `email` as its current address.
    ///
    /// Pending addresses do not count; they only claim the address once
    /// verified, and the unique index rejects a clash at that point.
    pub async fn email_in_use(&self, email: &str, except_id: Option<i64>) -> Result<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM users
                WHERE email = ?1 COLLATE NOCASE AND id != ?2
            )",
        )
        .bind(email)
        .bind(except_id.unwrap_or(0))
        .fetch_one(self.pool)
        .await?;
        Ok(taken)
    }

    /// Update a user by ID.
    ///
    /// Only fields that are set in the update will be modified.
    /// Returns the updated user, or None if not found.
    pub async fn update(&self, id: i64, update: &UserUpdate) -> Result<Option<User>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut separated = query.separated(", ");

        if let Some(ref display_name) = update.display_name {
            separated.push("display_name = ");
            separated.push_bind_unseparated(display_name.clone());
        }
        if let Some(ref email) = update.email {
            separated.push("email = ");
            separated.push_bind_unseparated(email.clone());
        }
        if let Some(ref password) = update.password {
            separated.push("password = ");
            separated.push_bind_unseparated(password.clone());
        }
        if let Some(ref description) = update.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description.clone());
        }
        if let Some(mail_verified) = update.mail_verified {
            separated.push("mail_verified = ");
            separated.push_bind_unseparated(mail_verified);
        }
        if let Some(ref unverified_email) = update.unverified_email {
            separated.push("unverified_email = ");
            separated.push_bind_unseparated(unverified_email.clone());
        }
        if let Some(ref activation_key) = update.activation_key {
            separated.push("activation_key = ");
            separated.push_bind_unseparated(activation_key.clone());
        }
        if let Some(ref key_expires_at) = update.key_expires_at {
            separated.push("key_expires_at = ");
            separated.push_bind_unseparated(key_expires_at.clone());
        }
        if let Some(is_active) = update.is_active {
            separated.push("is_active = ");
            separated.push_bind_unseparated(is_active);
        }
        if let Some(is_staff) = update.is_staff {
            separated.push("is_staff = ");
            separated.push_bind_unseparated(is_staff);
        }

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(map_unique_violation)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Soft-delete a user.
    ///
    /// The row and its id stay in place; credentials and personal data are
    /// cleared and the account is deactivated. Returns the scrubbed user, or
    /// None if not found.
    pub async fn soft_delete(&self, id: i64) -> Result<Option<User>> {
        let result = sqlx::query(
            "UPDATE users SET
                description = '',
                password = ?,
                email = NULL,
                is_active = 0,
                is_staff = 0,
                activation_key = '',
                key_expires_at = NULL,
                mail_verified = 0,
                unverified_email = NULL,
                deleted_at = ?,
                deleted = 1
             WHERE id = ?",
        )
        .bind(UNUSABLE_PASSWORD)
        .bind(now_timestamp())
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// List the users `viewer_id` may see: themself and every user sharing
    /// at least one group with them.
    ///
    /// `search` filters case-insensitively on `display_name`.
    pub async fn list_visible_to(&self, viewer_id: i64, search: Option<&str>) -> Result<Vec<User>> {
        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(format!(
            "SELECT {USER_COLUMNS} FROM users WHERE (id = "
        ));
        query.push_bind(viewer_id);
        query.push(
            " OR id IN (
                SELECT other.user_id FROM group_members other
                JOIN group_members mine ON mine.group_id = other.group_id
                WHERE mine.user_id = ",
        );
        query.push_bind(viewer_id);
        query.push("))");

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            query.push(" AND display_name LIKE ");
            query.push_bind(format!("%{}%", escape_like(term)));
            query.push(" ESCAPE '\\'");
        }

        query.push(" ORDER BY id");

        let users = query.build_query_as::<User>().fetch_all(self.pool).await?;
        Ok(users)
    }

    /// Check whether `target_id` is visible to `viewer_id`.
    pub async fn is_visible_to(&self, viewer_id: i64, target_id: i64) -> Result<bool> {
        if viewer_id == target_id {
            return Ok(true);
        }

        let shared: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM group_members a
                JOIN group_members b ON a.group_id = b.group_id
                WHERE a.user_id = ? AND b.user_id = ?
            )",
        )
        .bind(viewer_id)
        .bind(target_id)
        .fetch_one(self.pool)
        .await?;
        Ok(shared)
    }

    /// Count all user rows, deleted ones included.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

fn map_unique_violation(e: sqlx::Error) -> FoodsavingError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return FoodsavingError::Conflict("email already registered".to_string());
        }
    }
    FoodsavingError::Database(e.to_string())
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
