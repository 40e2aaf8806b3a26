//! Outgoing account mail.
//!
//! Delivery is behind the [`Mailer`] trait. [`LogMailer`] records mails as
//! structured log events; [`MemoryMailer`] keeps them in memory so callers
//! can inspect what would have been sent.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::db::User;
use crate::Result;

/// Kind of account mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailKind {
    /// Activation key for confirming an address.
    VerificationCode,
    /// Newly generated password after a reset.
    NewPassword,
}

impl MailKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MailKind::VerificationCode => "verification_code",
            MailKind::NewPassword => "new_password",
        }
    }
}

/// Mail sending collaborator.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send the activation key for `address` to `user`.
    async fn send_verification_code(&self, user: &User, address: &str, key: &str) -> Result<()>;

    /// Send a newly generated password to `user`.
    async fn send_new_password(&self, user: &User, address: &str, password: &str) -> Result<()>;
}

/// Mailer that writes each mail as a log event.
pub struct LogMailer {
    from_address: String,
}

impl LogMailer {
    pub fn new(from_address: impl Into<String>) -> Self {
        Self {
            from_address: from_address.into(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification_code(&self, user: &User, address: &str, key: &str) -> Result<()> {
        tracing::info!(
            from = %self.from_address,
            to = %address,
            user_id = user.id,
            kind = MailKind::VerificationCode.as_str(),
            key_len = key.len(),
            "Sending verification mail"
        );
        Ok(())
    }

    async fn send_new_password(&self, user: &User, address: &str, _password: &str) -> Result<()> {
        tracing::info!(
            from = %self.from_address,
            to = %address,
            user_id = user.id,
            kind = MailKind::NewPassword.as_str(),
            "Sending new password mail"
        );
        Ok(())
    }
}

/// A mail captured by [`MemoryMailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub kind: MailKind,
    pub user_id: i64,
    pub to: String,
    /// Activation key or generated password.
    pub secret: String,
}

/// Mailer that keeps every mail in memory.
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<SentMail>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// All mails sent so far, oldest first.
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    /// The most recent mail of `kind` sent to `user_id`.
    pub fn last_for(&self, user_id: i64, kind: MailKind) -> Option<SentMail> {
        self.sent()
            .into_iter()
            .rev()
            .find(|m| m.user_id == user_id && m.kind == kind)
    }

    fn record(&self, mail: SentMail) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(mail);
        }
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send_verification_code(&self, user: &User, address: &str, key: &str) -> Result<()> {
        self.record(SentMail {
            kind: MailKind::VerificationCode,
            user_id: user.id,
            to: address.to_string(),
            secret: key.to_string(),
        });
        Ok(())
    }

    async fn send_new_password(&self, user: &User, address: &str, password: &str) -> Result<()> {
        self.record(SentMail {
            kind: MailKind::NewPassword,
            user_id: user.id,
            to: address.to_string(),
            secret: password.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64) -> User {
        User {
            id,
            display_name: "Alice".to_string(),
            email: Some("alice@example.com".to_string()),
            password: "hash".to_string(),
            description: String::new(),
            mail_verified: false,
            unverified_email: None,
            activation_key: String::new(),
            key_expires_at: None,
            is_active: true,
            is_staff: false,
            deleted: false,
            deleted_at: None,
            created_at: "2024-01-01 00:00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_memory_mailer_records() {
        let mailer = MemoryMailer::new();
        mailer
            .send_verification_code(&user(1), "alice@example.com", "key1")
            .await
            .unwrap();
        mailer
            .send_new_password(&user(1), "alice@example.com", "pw")
            .await
            .unwrap();
        mailer
            .send_verification_code(&user(1), "new@example.com", "key2")
            .await
            .unwrap();

        assert_eq!(mailer.sent().len(), 3);
        let last = mailer.last_for(1, MailKind::VerificationCode).unwrap();
        assert_eq!(last.to, "new@example.com");
        assert_eq!(last.secret, "key2");
        assert!(mailer.last_for(2, MailKind::NewPassword).is_none());
    }

    #[tokio::test]
    async fn test_log_mailer_succeeds() {
        let mailer = LogMailer::new("noreply@example.com");
        assert!(mailer
            .send_verification_code(&user(1), "alice@example.com", "key")
            .await
            .is_ok());
        assert!(mailer
            .send_new_password(&user(1), "alice@example.com", "pw")
            .await
            .is_ok());
    }

    #[test]
    fn test_mail_kind_as_str() {
        assert_eq!(MailKind::VerificationCode.as_str(), "verification_code");
        assert_eq!(MailKind::NewPassword.as_str(), "new_password");
    }
}
