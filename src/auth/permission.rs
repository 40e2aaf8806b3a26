//! Permission predicates.
//!
//! Each predicate answers one question about the caller and is checked
//! before an action runs. They do not touch the database.

use thiserror::Error;

use crate::db::User;

/// Permission-related errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    /// No authenticated caller.
    #[error("authentication required")]
    NotAuthenticated,

    /// Caller's account is deactivated or deleted.
    #[error("account is inactive")]
    AccountInactive,

    /// Caller is acting on another user's account.
    #[error("you can only modify your own account")]
    NotSameUser,

    /// Caller's mail address is already verified.
    #[error("mail address is already verified")]
    AlreadyVerified,
}

/// Require an authenticated, active caller.
///
/// # Examples
///
/// ```
/// use foodsaving::auth::permission::{is_authenticated, PermissionError};
///
/// assert!(matches!(is_authenticated(None), Err(PermissionError::NotAuthenticated)));
/// ```
pub fn is_authenticated(caller: Option<&User>) -> Result<&User, PermissionError> {
    let user = caller.ok_or(PermissionError::NotAuthenticated)?;
    if !user.is_active || user.deleted {
        return Err(PermissionError::AccountInactive);
    }
    Ok(user)
}

/// Require that the caller is the target user.
pub fn is_same_user(caller: &User, target_id: i64) -> Result<(), PermissionError> {
    if caller.id != target_id {
        return Err(PermissionError::NotSameUser);
    }
    Ok(())
}

/// Require that the caller has not verified their mail address yet.
pub fn is_not_verified(caller: &User) -> Result<(), PermissionError> {
    if caller.mail_verified {
        return Err(PermissionError::AlreadyVerified);
    }
    Ok(())
}
