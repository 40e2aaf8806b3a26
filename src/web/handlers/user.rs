//! User account handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::auth::{AppState, CurrentUser};
use crate::auth::{AccountChanges, AccountError, PasswordResetOutcome, Registration};
use crate::db::UserRepository;
use crate::web::dto::{
    ApiResponse, CreateUserRequest, ListResponse, ResetPasswordRequest, UpdateUserRequest,
    UserResponse, UserSearchQuery, ValidatedJson, VerifyMailRequest,
};
use crate::web::error::ApiError;

/// POST /api/users - Register a new account.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    let user = state
        .accounts()
        .register(Registration {
            email: req.email,
            password: req.password,
            display_name: req.display_name,
            description: req.description,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(UserResponse::own(&user))),
    ))
}

/// GET /api/users - List users visible to the caller.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Query(query): Query<UserSearchQuery>,
) -> Result<Json<ListResponse<UserResponse>>, ApiError> {
    let users = UserRepository::new(state.db.pool())
        .list_visible_to(caller.id, query.search.as_deref())
        .await?;

    let items = users
        .iter()
        .map(|u| UserResponse::for_viewer(u, caller.id))
        .collect();
    Ok(Json(ListResponse::new(items)))
}

/// GET /api/users/:id - Get a visible user.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let repo = UserRepository::new(state.db.pool());

    // Invisible users are reported as missing.
    if !repo.is_visible_to(caller.id, id).await? {
        return Err(ApiError::not_found("user not found"));
    }
    let user = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    Ok(Json(ApiResponse::new(UserResponse::for_viewer(
        &user, caller.id,
    ))))
}

/// PATCH /api/users/:id - Update the caller's own account.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let changes = AccountChanges {
        display_name: req.display_name,
        email: req.email,
        password: req.password,
        description: req.description,
    };
    let user = state.accounts().update(&caller, id, changes).await?;

    Ok(Json(ApiResponse::new(UserResponse::own(&user))))
}

/// DELETE /api/users/:id - Soft-delete the caller's own account.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.accounts().destroy(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/users/verify_mail - Confirm the caller's mail address.
pub async fn verify_mail(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    ValidatedJson(req): ValidatedJson<VerifyMailRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.accounts().verify_mail(&caller, &req.key).await?;
    Ok(Json(ApiResponse::new(UserResponse::own(&user))))
}

/// POST /api/users/resend_verification - Mail a new activation key.
pub async fn resend_verification(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    state.accounts().resend_verification(&caller).await?;
    Ok(Json(ApiResponse::new(UserResponse::own(&caller))))
}

/// POST /api/users/reset_password - Mail a new password.
///
/// Unknown and unverified addresses get the same 204 as a real reset.
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> Result<StatusCode, ApiError> {
    let outcome = match state.accounts().reset_password(req.email.as_deref()).await {
        Ok(outcome) => outcome,
        Err(AccountError::MissingEmail) => {
            return Err(ApiError::bad_request("mail address is not provided"));
        }
        Err(e) => return Err(e.into()),
    };

    if outcome != PasswordResetOutcome::Sent {
        tracing::debug!(?outcome, "Password reset skipped");
    }
    Ok(StatusCode::NO_CONTENT)
}
