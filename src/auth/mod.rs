//! Authentication and account management.
//!
//! This module provides password hashing, permission predicates,
//! activation keys and the account lifecycle service.

mod account;
mod password;
pub mod permission;
mod verification;

pub use account::{
    AccountChanges, AccountError, AccountService, PasswordResetOutcome, Registration,
    MAX_DESCRIPTION_LENGTH, MAX_DISPLAY_NAME_LENGTH,
};
pub use password::{
    generate_password, hash_password, validate_password, verify_password, PasswordError,
    MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH,
};
pub use permission::PermissionError;
pub use verification::{check_key, ActivationKey, KeyError, ACTIVATION_KEY_LENGTH};
