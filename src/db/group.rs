//! Group memberships.
//!
//! Groups themselves are managed elsewhere; the account code only needs
//! membership to decide which users can see each other and to drop a user
//! from all groups before deletion.

use super::DbPool;
use crate::{FoodsavingError, Result};

/// Group entity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

/// Repository for groups and their members.
pub struct GroupRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> GroupRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a group.
    pub async fn create(&self, name: &str) -> Result<Group> {
        let id: i64 = sqlx::query_scalar("INSERT INTO groups (name) VALUES (?) RETURNING id")
            .bind(name)
            .fetch_one(self.pool)
            .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| FoodsavingError::NotFound("group".to_string()))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>("SELECT id, name, created_at FROM groups WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(group)
    }

    /// Add a user to a group. Adding an existing member is a no-op.
    pub async fn add_member(&self, group_id: i64, user_id: i64) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO group_members (group_id, user_id) VALUES (?, ?)")
            .bind(group_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Remove a user from one group. Returns true if they were a member.
    pub async fn remove_member(&self, group_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM group_members WHERE group_id = ? AND user_id = ?")
            .bind(group_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a user from every group. Returns the number of memberships removed.
    pub async fn remove_user_from_all(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM group_members WHERE user_id = ?")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// List the groups a user belongs to.
    pub async fn groups_of_user(&self, user_id: i64) -> Result<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>(
            "SELECT g.id, g.name, g.created_at FROM groups g
             JOIN group_members m ON m.group_id = g.id
             WHERE m.user_id = ?
             ORDER BY g.id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(groups)
    }
}
