//! Account lifecycle signals.
//!
//! Before a user is soft-deleted, every connected
//! [`PreUserDeleteReceiver`] is called in connection order so dependent
//! data (group memberships, planned pickups, ...) can be cleaned up while
//! the user row still holds its original values.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::db::{Database, GroupRepository, User};
use crate::Result;

/// Receiver of the pre-delete signal.
#[async_trait]
pub trait PreUserDeleteReceiver: Send + Sync {
    /// Name used in log output.
    fn name(&self) -> &'static str;

    /// Called before `user` is soft-deleted. An error aborts the deletion.
    async fn pre_user_delete(&self, db: &Database, user: &User) -> Result<()>;
}

/// Ordered set of receivers for user lifecycle signals.
#[derive(Clone, Default)]
pub struct UserSignals {
    pre_delete: Vec<Arc<dyn PreUserDeleteReceiver>>,
}

impl UserSignals {
    /// Create an empty signal set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal set with the built-in receivers connected.
    pub fn with_defaults() -> Self {
        let mut signals = Self::new();
        signals.connect_pre_delete(Arc::new(GroupMembershipCleanup));
        signals
    }

    /// Connect a receiver. Receivers run in the order they were connected.
    pub fn connect_pre_delete(&mut self, receiver: Arc<dyn PreUserDeleteReceiver>) {
        self.pre_delete.push(receiver);
    }

    /// Number of connected pre-delete receivers.
    pub fn pre_delete_receivers(&self) -> usize {
        self.pre_delete.len()
    }

    /// Send the pre-delete signal for `user`.
    pub async fn send_pre_delete(&self, db: &Database, user: &User) -> Result<()> {
        for receiver in &self.pre_delete {
            debug!(receiver = receiver.name(), user_id = user.id, "pre_user_delete");
            receiver.pre_user_delete(db, user).await?;
        }
        Ok(())
    }
}

/// Removes a user from all groups before deletion.
pub struct GroupMembershipCleanup;

#[async_trait]
impl PreUserDeleteReceiver for GroupMembershipCleanup {
    fn name(&self) -> &'static str {
        "group_membership_cleanup"
    }

    async fn pre_user_delete(&self, db: &Database, user: &User) -> Result<()> {
        let removed = GroupRepository::new(db.pool())
            .remove_user_from_all(user.id)
            .await?;
        debug!(user_id = user.id, removed, "Removed group memberships");
        Ok(())
    }
}
