//! foodsaving - backend for a community food-saving platform
//!
//! User accounts with mail verification, password reset and soft deletion,
//! group-based user visibility, and conversations between users, served as
//! a JSON API.

pub mod auth;
pub mod config;
pub mod conversation;
pub mod db;
pub mod error;
pub mod logging;
pub mod mail;
pub mod signals;
pub mod web;

pub use auth::{
    AccountChanges, AccountError, AccountService, KeyError, PasswordError, PasswordResetOutcome,
    PermissionError, Registration,
};
pub use config::Config;
pub use conversation::{Conversation, ConversationMessage, ConversationService, ConversationType};
pub use db::{Database, Group, GroupRepository, NewUser, User, UserRepository, UserUpdate};
pub use error::{FoodsavingError, Result};
pub use mail::{LogMailer, Mailer, MemoryMailer};
pub use signals::{PreUserDeleteReceiver, UserSignals};
