//! User model.

/// Password value that never verifies against any input.
///
/// Argon2 PHC strings always start with `$`, so this can never collide
/// with a real hash.
pub const UNUSABLE_PASSWORD: &str = "!";

/// User entity.
///
/// Deleted users keep their row so that past messages and memberships
/// still resolve, but their personal fields are scrubbed.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Public display name.
    pub display_name: String,
    /// Verified (or initial) email address.
    pub email: Option<String>,
    /// Password hash (Argon2) or [`UNUSABLE_PASSWORD`].
    pub password: String,
    /// Free-text self description.
    pub description: String,
    /// Whether `email` has been confirmed with an activation key.
    pub mail_verified: bool,
    /// New address waiting for confirmation.
    pub unverified_email: Option<String>,
    /// Pending activation key (empty when none).
    pub activation_key: String,
    /// Expiry of `activation_key`.
    pub key_expires_at: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    /// Soft-delete flag.
    pub deleted: bool,
    pub deleted_at: Option<String>,
    pub created_at: String,
}

impl User {
    /// Check whether the user has a password that can be verified.
    pub fn has_usable_password(&self) -> bool {
        self.password != UNUSABLE_PASSWORD
    }

    /// The address verification mails should go to.
    ///
    /// A pending address change takes precedence over the current address.
    pub fn verification_address(&self) -> Option<&str> {
        self.unverified_email
            .as_deref()
            .or(self.email.as_deref())
    }
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Email address.
    pub email: String,
    /// Password hash (should be pre-hashed with Argon2).
    pub password: String,
    /// Display name.
    pub display_name: String,
    /// Self description.
    pub description: String,
}

impl NewUser {
    /// Create a new user with the required fields.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            display_name: display_name.into(),
            description: String::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Data for updating an existing user.
///
/// `Option<Option<_>>` fields distinguish "leave alone" from "set NULL".
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub display_name: Option<String>,
    pub email: Option<Option<String>>,
    pub password: Option<String>,
    pub description: Option<String>,
    pub mail_verified: Option<bool>,
    pub unverified_email: Option<Option<String>>,
    pub activation_key: Option<String>,
    pub key_expires_at: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
}

impl UserUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn email(mut self, email: Option<String>) -> Self {
        self.email = Some(email);
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn mail_verified(mut self, verified: bool) -> Self {
        self.mail_verified = Some(verified);
        self
    }

    pub fn unverified_email(mut self, email: Option<String>) -> Self {
        self.unverified_email = Some(email);
        self
    }

    /// Set the activation key together with its expiry.
    pub fn activation_key(mut self, key: impl Into<String>, expires_at: Option<String>) -> Self {
        self.activation_key = Some(key.into());
        self.key_expires_at = Some(expires_at);
        self
    }

    /// Clear the activation key and its expiry.
    pub fn clear_activation_key(self) -> Self {
        self.activation_key("", None)
    }

    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn is_staff(mut self, is_staff: bool) -> Self {
        self.is_staff = Some(is_staff);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.description.is_none()
            && self.mail_verified.is_none()
            && self.unverified_email.is_none()
            && self.activation_key.is_none()
            && self.key_expires_at.is_none()
            && self.is_active.is_none()
            && self.is_staff.is_none()
    }
}
