//! Web API User Tests
//!
//! Integration tests for registration, visibility, profile updates, mail
//! verification, password reset and account deletion.

mod common;

use axum::http::StatusCode;
use common::{TestApp, PASSWORD};
use foodsaving::db::UNUSABLE_PASSWORD;
use foodsaving::mail::MailKind;
use serde_json::{json, Value};

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/users")
        .json(&json!({
            "email": "alice@example.com",
            "password": PASSWORD,
            "display_name": "Alice",
            "description": "Saving bread"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["data"]["display_name"], "Alice");
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["description"], "Saving bread");
    assert_eq!(body["data"]["mail_verified"], false);
    assert!(body["data"].get("password").is_none());

    let id = body["data"]["id"].as_i64().unwrap();
    let mail = app
        .mailer
        .last_for(id, MailKind::VerificationCode)
        .expect("verification mail sent");
    assert_eq!(mail.to, "alice@example.com");
    assert_eq!(mail.secret.len(), 40);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::new().await;
    app.register("alice@example.com", "Alice").await;

    let response = app
        .server
        .post("/api/users")
        .json(&json!({
            "email": "Alice@Example.com",
            "password": PASSWORD,
            "display_name": "Other"
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/users")
        .json(&json!({
            "email": "not-an-email",
            "password": "short",
            "display_name": ""
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["email"].is_array());
    assert!(body["error"]["details"]["password"].is_array());
    assert!(body["error"]["details"]["display_name"].is_array());
}

// ============================================================================
// Visibility
// ============================================================================

#[tokio::test]
async fn test_list_users_shared_groups_only() {
    let app = TestApp::new().await;
    let alice = app.register("alice@example.com", "Alice").await;
    let bob = app.register("bob@example.com", "Bob").await;
    let carol = app.register("carol@example.com", "Carol").await;
    let dave = app.register("dave@example.com", "Dave").await;

    app.share_group("Group 1", &[&alice, &bob]).await;
    app.share_group("Group 2", &[&alice, &bob, &carol]).await;

    let response = app.get("/api/users", &alice.token).await;
    response.assert_status_ok();
    let body: Value = response.json();

    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![alice.id, bob.id, carol.id]);
    assert_eq!(body["meta"]["total"], 3);
    assert!(!ids.contains(&dave.id));

    // Only the caller's own entry carries private fields.
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries[0]["email"], "alice@example.com");
    assert!(entries[1].get("email").is_none());
    assert!(entries[1].get("mail_verified").is_none());
}

#[tokio::test]
async fn test_list_users_without_groups_shows_self() {
    let app = TestApp::new().await;
    let alice = app.register("alice@example.com", "Alice").await;
    app.register("bob@example.com", "Bob").await;

    let body: Value = app.get("/api/users", &alice.token).await.json();
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], alice.id);
}

#[tokio::test]
async fn test_list_users_search() {
    let app = TestApp::new().await;
    let alice = app.register("alice@example.com", "Alice").await;
    let bob = app.register("bob@example.com", "Bobby").await;
    let carol = app.register("carol@example.com", "Carol").await;
    app.share_group("Group", &[&alice, &bob, &carol]).await;

    let body: Value = app
        .get("/api/users?search=BOB", &alice.token)
        .await
        .json();
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["display_name"], "Bobby");
}

#[tokio::test]
async fn test_get_user_visibility() {
    let app = TestApp::new().await;
    let alice = app.register("alice@example.com", "Alice").await;
    let bob = app.register("bob@example.com", "Bob").await;
    let carol = app.register("carol@example.com", "Carol").await;
    app.share_group("Group", &[&alice, &bob]).await;

    let response = app.get(&format!("/api/users/{}", bob.id), &alice.token).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["display_name"], "Bob");
    assert!(body["data"].get("email").is_none());

    app.get(&format!("/api/users/{}", carol.id), &alice.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.get("/api/users/9999", &alice.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

// ============================================================================
// Updates
// ============================================================================

#[tokio::test]
async fn test_update_own_profile() {
    let app = TestApp::new().await;
    let alice = app.register("alice@example.com", "Alice").await;

    let response = app
        .patch(&format!("/api/users/{}", alice.id), &alice.token)
        .json(&json!({ "display_name": "Alicia", "description": "Hello" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["display_name"], "Alicia");
    assert_eq!(body["data"]["description"], "Hello");
}

#[tokio::test]
async fn test_update_other_user_forbidden() {
    let app = TestApp::new().await;
    let alice = app.register("alice@example.com", "Alice").await;
    let bob = app.register("bob@example.com", "Bob").await;
    app.share_group("Group", &[&alice, &bob]).await;

    let response = app
        .patch(&format!("/api/users/{}", bob.id), &alice.token)
        .json(&json!({ "display_name": "Hacked" }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let bob_row = app.users().get_by_id(bob.id).await.unwrap().unwrap();
    assert_eq!(bob_row.display_name, "Bob");
}

#[tokio::test]
async fn test_update_email_requires_verification() {
    let app = TestApp::new().await;
    let alice = app.register_verified("alice@example.com", "Alice").await;

    let response = app
        .patch(&format!("/api/users/{}", alice.id), &alice.token)
        .json(&json!({ "email": "alice@new.example.com" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["mail_verified"], false);

    let mail = app
        .mailer
        .last_for(alice.id, MailKind::VerificationCode)
        .unwrap();
    assert_eq!(mail.to, "alice@new.example.com");

    let response = app
        .post("/api/users/verify_mail", &alice.token)
        .json(&json!({ "key": mail.secret }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["email"], "alice@new.example.com");
    assert_eq!(body["data"]["mail_verified"], true);
}

#[tokio::test]
async fn test_withdrawn_email_change_needs_fresh_key() {
    let app = TestApp::new().await;
    let user = app.register("victim@example.com", "Victim").await;
    let path = format!("/api/users/{}", user.id);

    app.patch(&path, &user.token)
        .json(&json!({ "email": "mallory@example.com" }))
        .await
        .assert_status_ok();
    let other_key = app.last_verification_key(user.id);

    app.patch(&path, &user.token)
        .json(&json!({ "email": "victim@example.com" }))
        .await
        .assert_status_ok();

    app.post("/api/users/verify_mail", &user.token)
        .json(&json!({ "key": other_key }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    let row = app.users().get_by_id(user.id).await.unwrap().unwrap();
    assert!(!row.mail_verified);

    let mail = app
        .mailer
        .last_for(user.id, MailKind::VerificationCode)
        .unwrap();
    assert_eq!(mail.to, "victim@example.com");
}

#[tokio::test]
async fn test_pending_email_does_not_block_registration() {
    let app = TestApp::new().await;
    let squatter = app.register("squatter@example.com", "Squatter").await;

    app.patch(&format!("/api/users/{}", squatter.id), &squatter.token)
        .json(&json!({ "email": "owner@example.com" }))
        .await
        .assert_status_ok();

    app.server
        .post("/api/users")
        .json(&json!({
            "email": "owner@example.com",
            "password": PASSWORD,
            "display_name": "Owner"
        }))
        .await
        .assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_update_password() {
    let app = TestApp::new().await;
    let alice = app.register("alice@example.com", "Alice").await;

    app.patch(&format!("/api/users/{}", alice.id), &alice.token)
        .json(&json!({ "password": "new-password-1" }))
        .await
        .assert_status_ok();

    app.login("alice@example.com", "new-password-1").await;
    app.server
        .post("/api/auth/login")
        .json(&json!({ "email": "alice@example.com", "password": PASSWORD }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Mail verification
// ============================================================================

#[tokio::test]
async fn test_verify_mail_success() {
    let app = TestApp::new().await;
    let alice = app.register("alice@example.com", "Alice").await;
    let key = app.last_verification_key(alice.id);

    let response = app
        .post("/api/users/verify_mail", &alice.token)
        .json(&json!({ "key": key }))
        .await;

    response.assert_status_ok();
    let user = app.users().get_by_id(alice.id).await.unwrap().unwrap();
    assert!(user.mail_verified);
    assert!(user.activation_key.is_empty());
}

#[tokio::test]
async fn test_verify_mail_wrong_key() {
    let app = TestApp::new().await;
    let alice = app.register("alice@example.com", "Alice").await;

    let response = app
        .post("/api/users/verify_mail", &alice.token)
        .json(&json!({ "key": "wrong" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let user = app.users().get_by_id(alice.id).await.unwrap().unwrap();
    assert!(!user.mail_verified);
}

#[tokio::test]
async fn test_verify_mail_expired_key() {
    let app = TestApp::new().await;
    let alice = app.register("alice@example.com", "Alice").await;
    let key = app.last_verification_key(alice.id);
    app.users()
        .update(
            alice.id,
            &foodsaving::UserUpdate::new()
                .activation_key(key.clone(), Some("2000-01-01 00:00:00".to_string())),
        )
        .await
        .unwrap();

    let response = app
        .post("/api/users/verify_mail", &alice.token)
        .json(&json!({ "key": key }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verify_mail_already_verified_rejected() {
    let app = TestApp::new().await;
    let alice = app.register_verified("alice@example.com", "Alice").await;

    let response = app
        .post("/api/users/verify_mail", &alice.token)
        .json(&json!({ "key": "anything" }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_resend_verification() {
    let app = TestApp::new().await;
    let alice = app.register("alice@example.com", "Alice").await;
    let first_key = app.last_verification_key(alice.id);

    app.post("/api/users/resend_verification", &alice.token)
        .await
        .assert_status_ok();

    let second_key = app.last_verification_key(alice.id);
    assert_ne!(first_key, second_key);
}

#[tokio::test]
async fn test_resend_verification_already_verified() {
    let app = TestApp::new().await;
    let alice = app.register_verified("alice@example.com", "Alice").await;
    let sent_before = app.mailer.sent().len();

    let response = app
        .post("/api/users/resend_verification", &alice.token)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Already verified");
    assert_eq!(app.mailer.sent().len(), sent_before);
}

// ============================================================================
// Password reset
// ============================================================================

#[tokio::test]
async fn test_reset_password_verified_user() {
    let app = TestApp::new().await;
    let alice = app.register_verified("alice@example.com", "Alice").await;

    let response = app
        .server
        .post("/api/users/reset_password")
        .json(&json!({ "email": "alice@example.com" }))
        .await;

    response.assert_status(StatusCode::NO_CONTENT);
    let mail = app
        .mailer
        .last_for(alice.id, MailKind::NewPassword)
        .expect("new password mail");
    app.login("alice@example.com", &mail.secret).await;
}

#[tokio::test]
async fn test_reset_password_unknown_and_unverified_indistinguishable() {
    let app = TestApp::new().await;
    let bob = app.register("bob@example.com", "Bob").await;

    let unknown = app
        .server
        .post("/api/users/reset_password")
        .json(&json!({ "email": "nobody@example.com" }))
        .await;
    let unverified = app
        .server
        .post("/api/users/reset_password")
        .json(&json!({ "email": "bob@example.com" }))
        .await;

    unknown.assert_status(StatusCode::NO_CONTENT);
    unverified.assert_status(StatusCode::NO_CONTENT);
    assert_eq!(unknown.text(), unverified.text());
    assert!(unknown.text().is_empty());

    // Nothing was reset for the unverified account.
    assert!(app.mailer.last_for(bob.id, MailKind::NewPassword).is_none());
    app.login("bob@example.com", PASSWORD).await;
}

#[tokio::test]
async fn test_reset_password_missing_email() {
    let app = TestApp::new().await;

    app.server
        .post("/api/users/reset_password")
        .json(&json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    app.server
        .post("/api/users/reset_password")
        .json(&json!({ "email": "" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Deletion
// ============================================================================

#[tokio::test]
async fn test_delete_soft_deletes_account() {
    let app = TestApp::new().await;
    let alice = app.register_verified("alice@example.com", "Alice").await;
    let bob = app.register("bob@example.com", "Bob").await;
    app.share_group("Group", &[&alice, &bob]).await;
    let count_before = app.users().count().await.unwrap();

    app.delete(&format!("/api/users/{}", alice.id), &alice.token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let user = app.users().get_by_id(alice.id).await.unwrap().unwrap();
    assert_eq!(user.id, alice.id);
    assert!(user.email.is_none());
    assert_eq!(user.password, UNUSABLE_PASSWORD);
    assert!(user.activation_key.is_empty());
    assert!(!user.mail_verified);
    assert!(!user.is_active);
    assert!(user.deleted);
    assert_eq!(app.users().count().await.unwrap(), count_before);

    // Group memberships were dropped before deletion.
    let body: Value = app.get("/api/users", &bob.token).await.json();
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![bob.id]);

    app.server
        .post("/api/auth/login")
        .json(&json!({ "email": "alice@example.com", "password": PASSWORD }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_delete_other_user_forbidden() {
    let app = TestApp::new().await;
    let alice = app.register("alice@example.com", "Alice").await;
    let bob = app.register("bob@example.com", "Bob").await;

    app.delete(&format!("/api/users/{}", bob.id), &alice.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let bob_row = app.users().get_by_id(bob.id).await.unwrap().unwrap();
    assert!(!bob_row.deleted);
}
