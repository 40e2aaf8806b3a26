//! Authentication handlers and shared application state.

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::request::Parts,
    Json,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;

use crate::auth::{AccountError, AccountService};
use crate::config::MailConfig;
use crate::conversation::ConversationService;
use crate::db::{Database, User, UserRepository};
use crate::mail::Mailer;
use crate::signals::UserSignals;
use crate::web::dto::{ApiResponse, LoginRequest, TokenResponse, UserResponse, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, JwtClaims};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database (clones share one pool).
    pub db: Database,
    /// Outgoing account mail.
    pub mailer: Arc<dyn Mailer>,
    /// User lifecycle signal receivers.
    pub signals: UserSignals,
    /// Mail and activation key settings.
    pub mail_config: MailConfig,
    /// JWT encoding key.
    pub encoding_key: EncodingKey,
    /// Access token expiry in seconds.
    pub access_token_expiry: u64,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        db: Database,
        mailer: Arc<dyn Mailer>,
        mail_config: MailConfig,
        jwt_secret: &str,
        access_expiry: u64,
    ) -> Self {
        Self {
            db,
            mailer,
            signals: UserSignals::with_defaults(),
            mail_config,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            access_token_expiry: access_expiry,
        }
    }

    /// Replace the signal receivers.
    pub fn with_signals(mut self, signals: UserSignals) -> Self {
        self.signals = signals;
        self
    }

    /// Account service bound to this state.
    pub fn accounts(&self) -> AccountService<'_> {
        AccountService::new(
            &self.db,
            self.mailer.as_ref(),
            &self.signals,
            &self.mail_config,
        )
    }

    /// Conversation service bound to this state.
    pub fn conversations(&self) -> ConversationService<'_> {
        ConversationService::new(&self.db)
    }

    /// Generate an access token for a user.
    pub fn generate_access_token(&self, user_id: i64) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims {
            sub: user_id,
            iat: now,
            exp: now + self.access_token_expiry,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to generate token")
        })
    }
}

/// The authenticated caller's user row.
///
/// Rejects tokens whose user no longer exists, was deactivated or deleted.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;

        let user = UserRepository::new(state.db.pool())
            .get_by_id(claims.sub)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

        if !user.is_active || user.deleted {
            return Err(ApiError::unauthorized("Account is inactive"));
        }

        Ok(CurrentUser(user))
    }
}

/// POST /api/auth/login - Exchange credentials for an access token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let user = match state.accounts().authenticate(&req.email, &req.password).await {
        Ok(user) => user,
        Err(AccountError::InvalidCredentials) => {
            return Err(ApiError::unauthorized("Invalid email or password"));
        }
        Err(e) => return Err(e.into()),
    };

    let access_token = state.generate_access_token(user.id)?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(ApiResponse::new(TokenResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.access_token_expiry,
        user: UserResponse::own(&user),
    })))
}
