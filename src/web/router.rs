//! Router configuration for Web API.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_conversation, create_message, delete_user, get_conversation, get_user,
    list_conversations, list_messages, list_users, login, register, resend_verification,
    reset_password, update_user, verify_mail, AppState,
};
use super::middleware::{auth_rate_limit, create_cors_layer, jwt_auth, JwtState, RateLimitState};

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    rate_limit: Arc<RateLimitState>,
    cors_origins: &[String],
) -> Router {
    let login_limit = rate_limit.clone();
    let auth_routes = Router::new().route(
        "/login",
        post(login).layer(middleware::from_fn(move |req, next| {
            let state = login_limit.clone();
            auth_rate_limit(state, req, next)
        })),
    );

    let reset_limit = rate_limit;
    let user_routes = Router::new()
        .route("/", get(list_users).post(register))
        .route("/verify_mail", post(verify_mail))
        .route("/resend_verification", post(resend_verification))
        .route(
            "/reset_password",
            post(reset_password).layer(middleware::from_fn(move |req, next| {
                let state = reset_limit.clone();
                auth_rate_limit(state, req, next)
            })),
        )
        .route("/:id", get(get_user).patch(update_user).delete(delete_user));

    let conversation_routes = Router::new()
        .route("/", get(list_conversations).post(create_conversation))
        .route("/:id", get(get_conversation))
        .route("/:id/messages", get(list_messages).post(create_message));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/conversations", conversation_routes);

    // Clone jwt_state for the middleware closure
    let jwt_state_for_middleware = jwt_state.clone();

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state_for_middleware.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// API router plus health check.
pub fn create_app(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    rate_limit: Arc<RateLimitState>,
    cors_origins: &[String],
) -> Router {
    create_router(app_state, jwt_state, rate_limit, cors_origins).merge(create_health_router())
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
