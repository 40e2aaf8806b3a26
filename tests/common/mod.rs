//! Common test utilities for Web API integration tests.
//!
//! Provides a test application over an in-memory database with a
//! recording mailer, plus helpers for the usual account steps.

#![allow(dead_code)]

use axum::http::header::AUTHORIZATION;
use axum_test::{TestRequest, TestServer};
use foodsaving::config::Config;
use foodsaving::mail::{MailKind, MemoryMailer};
use foodsaving::web::handlers::AppState;
use foodsaving::web::middleware::{JwtState, RateLimitState};
use foodsaving::web::router::create_app;
use foodsaving::{Database, GroupRepository, UserRepository};
use serde_json::{json, Value};
use std::sync::Arc;

pub const PASSWORD: &str = "password123";

/// Test application: HTTP server plus direct access to its collaborators.
pub struct TestApp {
    pub server: TestServer,
    pub db: Database,
    pub mailer: Arc<MemoryMailer>,
}

/// A registered user with a valid access token.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub token: String,
}

/// Create a test configuration.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config.server.jwt_secret = "test-secret-key-for-testing-only".to_string();
    config.server.jwt_access_token_expiry_secs = 900;
    config.server.auth_rate_limit = 1000;
    config
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let db = Database::open_in_memory()
            .await
            .expect("Failed to create test database");
        let mailer = Arc::new(MemoryMailer::new());

        let app_state = Arc::new(AppState::new(
            db.clone(),
            mailer.clone(),
            config.mail.clone(),
            &config.server.jwt_secret,
            config.server.jwt_access_token_expiry_secs,
        ));
        let jwt_state = Arc::new(JwtState::new(&config.server.jwt_secret));
        let rate_limit = Arc::new(
            RateLimitState::new(config.server.auth_rate_limit)
                .with_proxy_headers(config.server.trust_proxy_headers),
        );

        let router = create_app(app_state, jwt_state, rate_limit, &config.server.cors_origins);
        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server, db, mailer }
    }

    pub fn get(&self, path: &str, token: &str) -> TestRequest {
        self.server
            .get(path)
            .add_header(AUTHORIZATION, format!("Bearer {}", token))
    }

    pub fn post(&self, path: &str, token: &str) -> TestRequest {
        self.server
            .post(path)
            .add_header(AUTHORIZATION, format!("Bearer {}", token))
    }

    pub fn patch(&self, path: &str, token: &str) -> TestRequest {
        self.server
            .patch(path)
            .add_header(AUTHORIZATION, format!("Bearer {}", token))
    }

    pub fn delete(&self, path: &str, token: &str) -> TestRequest {
        self.server
            .delete(path)
            .add_header(AUTHORIZATION, format!("Bearer {}", token))
    }

    /// Register through the API and log in.
    pub async fn register(&self, email: &str, display_name: &str) -> TestUser {
        let response = self
            .server
            .post("/api/users")
            .json(&json!({
                "email": email,
                "password": PASSWORD,
                "display_name": display_name
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let id = response.json::<Value>()["data"]["id"]
            .as_i64()
            .expect("user id");

        let token = self.login(email, PASSWORD).await;
        TestUser {
            id,
            email: email.to_string(),
            token,
        }
    }

    /// Register, log in and verify the mail address.
    pub async fn register_verified(&self, email: &str, display_name: &str) -> TestUser {
        let user = self.register(email, display_name).await;
        let key = self.last_verification_key(user.id);
        self.post("/api/users/verify_mail", &user.token)
            .json(&json!({ "key": key }))
            .await
            .assert_status_ok();
        user
    }

    /// Log in and return the access token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .server
            .post("/api/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .await;
        response.assert_status_ok();
        response.json::<Value>()["data"]["access_token"]
            .as_str()
            .expect("access token")
            .to_string()
    }

    pub fn last_verification_key(&self, user_id: i64) -> String {
        self.mailer
            .last_for(user_id, MailKind::VerificationCode)
            .expect("verification mail")
            .secret
    }

    /// Put the given users into one new group.
    pub async fn share_group(&self, name: &str, users: &[&TestUser]) -> i64 {
        let groups = GroupRepository::new(self.db.pool());
        let group = groups.create(name).await.expect("create group");
        for user in users {
            groups
                .add_member(group.id, user.id)
                .await
                .expect("add member");
        }
        group.id
    }

    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(self.db.pool())
    }
}
