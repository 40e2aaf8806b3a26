//! Web API module.
//!
//! JSON REST API over axum: authentication, user accounts and
//! conversations.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::{create_app, create_router};
pub use server::WebServer;
