//! HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::Config;
use crate::db::Database;
use crate::mail::Mailer;
use crate::{FoodsavingError, Result};

use super::handlers::AppState;
use super::middleware::{JwtState, RateLimitState};
use super::router::create_app;

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// JWT state.
    jwt_state: Arc<JwtState>,
    /// Rate limiter for login and password reset.
    rate_limit: Arc<RateLimitState>,
    /// Allowed CORS origins.
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &Config, db: Database, mailer: Arc<dyn Mailer>) -> Result<Self> {
        let server = &config.server;
        let addr = format!("{}:{}", server.host, server.port)
            .parse::<SocketAddr>()
            .map_err(|e| {
                FoodsavingError::Config(format!(
                    "invalid server address {}:{}: {e}",
                    server.host, server.port
                ))
            })?;

        let app_state = AppState::new(
            db,
            mailer,
            config.mail.clone(),
            &server.jwt_secret,
            server.jwt_access_token_expiry_secs,
        );

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            jwt_state: Arc::new(JwtState::new(&server.jwt_secret)),
            rate_limit: Arc::new(
                RateLimitState::new(server.auth_rate_limit)
                    .with_proxy_headers(server.trust_proxy_headers),
            ),
            cors_origins: server.cors_origins.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Run the web server until it fails.
    pub async fn run(self) -> std::io::Result<()> {
        let router = create_app(
            self.app_state,
            self.jwt_state,
            self.rate_limit.clone(),
            &self.cors_origins,
        );

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        self.rate_limit.start_cleanup_task();
        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    }
}
