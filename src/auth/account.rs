//! Account lifecycle: registration, profile changes, mail verification,
//! password reset and soft deletion.

use thiserror::Error;
use tracing::{info, warn};

use super::password::{generate_password, hash_password, verify_password, PasswordError};
use super::permission::{is_authenticated, is_not_verified, is_same_user, PermissionError};
use super::verification::{check_key, ActivationKey, KeyError};
use crate::config::MailConfig;
use crate::db::{Database, NewUser, User, UserRepository, UserUpdate};
use crate::mail::Mailer;
use crate::signals::UserSignals;
use crate::FoodsavingError;

/// Maximum display name length in characters.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 80;

/// Maximum description length in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Account operation errors.
#[derive(Error, Debug)]
pub enum AccountError {
    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Permission(#[from] PermissionError),

    #[error(transparent)]
    Key(#[from] KeyError),

    /// Email or password did not match an active account.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email address is already registered")]
    EmailTaken,

    #[error("mail address is not provided")]
    MissingEmail,

    #[error("Already verified")]
    AlreadyVerified,

    #[error("user not found")]
    NotFound,

    #[error(transparent)]
    Internal(#[from] FoodsavingError),
}

/// Registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub description: Option<String>,
}

/// Partial update input. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub description: Option<String>,
}

/// What a password reset request actually did.
///
/// Callers must answer all three identically so that registered
/// addresses cannot be probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordResetOutcome {
    /// A new password was set and mailed.
    Sent,
    /// No account uses the address.
    UnknownEmail,
    /// The account's address is not verified; nothing was changed.
    Unverified,
}

/// Account lifecycle service.
pub struct AccountService<'a> {
    db: &'a Database,
    mailer: &'a dyn Mailer,
    signals: &'a UserSignals,
    key_expiry_hours: i64,
    reset_password_length: usize,
}

impl<'a> AccountService<'a> {
    pub fn new(
        db: &'a Database,
        mailer: &'a dyn Mailer,
        signals: &'a UserSignals,
        config: &MailConfig,
    ) -> Self {
        Self {
            db,
            mailer,
            signals,
            key_expiry_hours: config.verification_key_expiry_hours,
            reset_password_length: config.reset_password_length,
        }
    }

    fn users(&self) -> UserRepository<'a> {
        UserRepository::new(self.db.pool())
    }

    /// Register a new, unverified user and mail them an activation key.
    pub async fn register(&self, registration: Registration) -> Result<User, AccountError> {
        let email = normalize_email(&registration.email)?;
        let display_name = validate_display_name(&registration.display_name)?;
        let description = registration.description.unwrap_or_default();
        validate_description(&description)?;

        if self.users().email_in_use(&email, None).await? {
            return Err(AccountError::EmailTaken);
        }

        let password_hash = hash_password(&registration.password)?;
        let new_user =
            NewUser::new(&email, password_hash, display_name).with_description(description);

        let user = self
            .users()
            .create(&new_user)
            .await
            .map_err(conflict_as_email_taken)?;
        info!(user_id = user.id, "Registered user");

        // The account exists at this point; a mail failure should not undo it.
        match self.issue_verification(&user, &email).await {
            Ok(user) => Ok(user),
            Err(e) => {
                warn!(user_id = user.id, error = %e, "Failed to send verification mail");
                Ok(user)
            }
        }
    }

    /// Check credentials and return the matching active user.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AccountError> {
        let user = self
            .users()
            .get_by_email(email.trim())
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        if !user.is_active || user.deleted {
            return Err(AccountError::InvalidCredentials);
        }

        verify_password(password, &user.password).map_err(|_| AccountError::InvalidCredentials)?;
        Ok(user)
    }

    /// Apply a partial update to the caller's own account.
    ///
    /// A new email address is kept pending until it is verified.
    pub async fn update(
        &self,
        caller: &User,
        target_id: i64,
        changes: AccountChanges,
    ) -> Result<User, AccountError> {
        let caller = is_authenticated(Some(caller))?;
        is_same_user(caller, target_id)?;

        let mut update = UserUpdate::new();

        if let Some(ref display_name) = changes.display_name {
            update = update.display_name(validate_display_name(display_name)?);
        }
        if let Some(description) = changes.description {
            validate_description(&description)?;
            update = update.description(description);
        }
        if let Some(ref password) = changes.password {
            update = update.password(hash_password(password)?);
        }

        let mut pending_address = None;
        if let Some(ref email) = changes.email {
            let email = normalize_email(email)?;
            let unchanged = caller
                .email
                .as_deref()
                .is_some_and(|current| current.eq_ignore_ascii_case(&email));

            if unchanged {
                // Withdrawn change: replace the key sent to the pending address.
                if caller.unverified_email.is_some() {
                    update = update.unverified_email(None);
                    pending_address = Some(email);
                }
            } else {
                if self.users().email_in_use(&email, Some(caller.id)).await? {
                    return Err(AccountError::EmailTaken);
                }
                update = update
                    .unverified_email(Some(email.clone()))
                    .mail_verified(false);
                pending_address = Some(email);
            }
        }

        let user = self
            .users()
            .update(caller.id, &update)
            .await
            .map_err(conflict_as_email_taken)?
            .ok_or(AccountError::NotFound)?;

        match pending_address {
            Some(address) => self.issue_verification(&user, &address).await,
            None => Ok(user),
        }
    }

    /// Confirm the caller's mail address with `key`.
    pub async fn verify_mail(&self, caller: &User, key: &str) -> Result<User, AccountError> {
        let caller = is_authenticated(Some(caller))?;
        is_not_verified(caller)?;

        let now = chrono::Utc::now().naive_utc();
        check_key(caller, key, now)?;

        let mut update = UserUpdate::new().mail_verified(true).clear_activation_key();
        if let Some(ref pending) = caller.unverified_email {
            update = update.email(Some(pending.clone())).unverified_email(None);
        }

        let user = self
            .users()
            .update(caller.id, &update)
            .await
            .map_err(conflict_as_email_taken)?
            .ok_or(AccountError::NotFound)?;
        info!(user_id = user.id, "Mail address verified");
        Ok(user)
    }

    /// Send a fresh activation key to the caller.
    pub async fn resend_verification(&self, caller: &User) -> Result<(), AccountError> {
        let caller = is_authenticated(Some(caller))?;
        if caller.mail_verified {
            return Err(AccountError::AlreadyVerified);
        }

        let address = caller
            .verification_address()
            .ok_or(AccountError::MissingEmail)?
            .to_string();
        self.issue_verification(caller, &address).await?;
        Ok(())
    }

    /// Mail a new password to the owner of `email`.
    pub async fn reset_password(
        &self,
        email: Option<&str>,
    ) -> Result<PasswordResetOutcome, AccountError> {
        let email = email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or(AccountError::MissingEmail)?;

        // Hashed up front so every outcome costs the same.
        let password = generate_password(self.reset_password_length);
        let password_hash = hash_password(&password)?;

        let Some(user) = self.users().get_by_email(email).await? else {
            return Ok(PasswordResetOutcome::UnknownEmail);
        };

        if !user.mail_verified {
            return Ok(PasswordResetOutcome::Unverified);
        }

        let update = UserUpdate::new().password(password_hash);
        let user = self
            .users()
            .update(user.id, &update)
            .await?
            .ok_or(AccountError::NotFound)?;

        let address = user.email.clone().unwrap_or_else(|| email.to_string());
        self.mailer
            .send_new_password(&user, &address, &password)
            .await?;
        info!(user_id = user.id, "Password reset");
        Ok(PasswordResetOutcome::Sent)
    }

    /// Soft-delete the caller's own account.
    ///
    /// The pre-delete signal runs first; then personal data and credentials
    /// are scrubbed while the row itself stays.
    pub async fn destroy(&self, caller: &User, target_id: i64) -> Result<User, AccountError> {
        let caller = is_authenticated(Some(caller))?;
        is_same_user(caller, target_id)?;

        let user = self
            .users()
            .get_by_id(target_id)
            .await?
            .ok_or(AccountError::NotFound)?;

        self.signals.send_pre_delete(self.db, &user).await?;

        let deleted = self
            .users()
            .soft_delete(user.id)
            .await?
            .ok_or(AccountError::NotFound)?;
        info!(user_id = deleted.id, "User deleted");
        Ok(deleted)
    }

    async fn issue_verification(&self, user: &User, address: &str) -> Result<User, AccountError> {
        let now = chrono::Utc::now().naive_utc();
        let key = ActivationKey::issue(now, self.key_expiry_hours);

        let update = UserUpdate::new().activation_key(&key.key, Some(key.expires_at.clone()));
        let user = self
            .users()
            .update(user.id, &update)
            .await?
            .ok_or(AccountError::NotFound)?;

        self.mailer
            .send_verification_code(&user, address, &key.key)
            .await?;
        Ok(user)
    }
}

fn conflict_as_email_taken(e: FoodsavingError) -> AccountError {
    match e {
        FoodsavingError::Conflict(_) => AccountError::EmailTaken,
        other => AccountError::Internal(other),
    }
}

fn normalize_email(email: &str) -> Result<String, AccountError> {
    let email = email.trim();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid || email.chars().any(char::is_whitespace) {
        return Err(AccountError::Validation("Enter a valid email address".to_string()));
    }
    Ok(email.to_string())
}

fn validate_display_name(display_name: &str) -> Result<String, AccountError> {
    let display_name = display_name.trim();
    if display_name.is_empty() {
        return Err(AccountError::Validation("Display name must not be empty".to_string()));
    }
    if display_name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
        return Err(AccountError::Validation(format!(
            "Display name must be at most {MAX_DISPLAY_NAME_LENGTH} characters"
        )));
    }
    Ok(display_name.to_string())
}

fn validate_description(description: &str) -> Result<(), AccountError> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(AccountError::Validation(format!(
            "Description must be at most {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(())
}
