//! API handlers.

pub mod auth;
pub mod conversation;
pub mod user;

pub use auth::*;
pub use conversation::*;
pub use user::*;
