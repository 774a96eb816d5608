use std::sync::Arc;

use crate::database::store::UserStore;
use crate::error::Result;
use crate::models::user::OtpChallenge;
use crate::services::mail_service::{MailMessage, Mailer};
use crate::utils::otp::CodeGenerator;
use crate::utils::time::now;

/// Outcome of handing the verification mail to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Failed,
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent)
    }
}

#[derive(Clone)]
pub struct OtpService {
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    codes: Arc<dyn CodeGenerator>,
    mail_from: String,
}

impl OtpService {
    pub fn new(
        users: Arc<dyn UserStore>,
        mailer: Arc<dyn Mailer>,
        codes: Arc<dyn CodeGenerator>,
        mail_from: String,
    ) -> Self {
        Self {
            users,
            mailer,
            codes,
            mail_from,
        }
    }

    /// Stores a fresh code on the account and mails it.
    ///
    /// The code is persisted before the mail goes out, so a transport failure
    /// never leaves an unstored code in someone's inbox. Such failures are
    /// logged and reported as [`Delivery::Failed`]. An unknown email is an
    /// `Error::NotFound`.
    pub async fn issue(&self, email: &str) -> Result<Delivery> {
        let challenge = OtpChallenge {
            code: self.codes.generate(),
            issued_at: now(),
        };
        let user = self.users.store_otp(email, challenge).await?;
        tracing::info!(user_id = %user.id, status = %user.status, "verification code stored");

        let message = MailMessage::verification_code(&self.mail_from, &user.email, challenge.code);
        match self.mailer.send(&message).await {
            Ok(()) => Ok(Delivery::Sent),
            Err(err) => {
                tracing::warn!(user_id = %user.id, error = %err, "verification mail not delivered");
                Ok(Delivery::Failed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::error::Error;
    use crate::models::user::{AccountStatus, NewUser};
    use crate::services::mail_service::MockMailer;

    struct FixedCode(i32);

    impl CodeGenerator for FixedCode {
        fn generate(&self) -> i32 {
            self.0
        }
    }

    async fn store_with_user(email: &str) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .create(NewUser {
                email: email.to_string(),
                name: None,
                password_hash: "$argon2id$stub".to_string(),
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn issue_persists_the_code_and_mails_it_once() {
        let store = store_with_user("kim@example.com").await;
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|m| m.to == "kim@example.com" && m.body == "Your OTP is 4242")
            .times(1)
            .returning(|_| Ok(()));

        let service = OtpService::new(
            store.clone(),
            Arc::new(mailer),
            Arc::new(FixedCode(4242)),
            "no-reply@quizbit.local".into(),
        );
        let delivery = service.issue("kim@example.com").await.unwrap();
        assert_eq!(delivery, Delivery::Sent);

        let user = store.find_by_email("kim@example.com").await.unwrap().unwrap();
        assert_eq!(user.status, AccountStatus::Pending);
        assert_eq!(user.otp.map(|c| c.code), Some(4242));
    }

    #[tokio::test]
    async fn transport_failure_keeps_the_stored_code() {
        let store = store_with_user("lee@example.com").await;
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .times(1)
            .returning(|_| Err(Error::Internal("relay down".into())));

        let service = OtpService::new(
            store.clone(),
            Arc::new(mailer),
            Arc::new(FixedCode(1357)),
            "no-reply@quizbit.local".into(),
        );
        let delivery = service.issue("lee@example.com").await.unwrap();
        assert_eq!(delivery, Delivery::Failed);

        let user = store.find_by_email("lee@example.com").await.unwrap().unwrap();
        assert_eq!(user.otp.map(|c| c.code), Some(1357));
    }

    #[tokio::test]
    async fn reissue_overwrites_the_previous_code() {
        let store = store_with_user("ana@example.com").await;
        let mut mailer = MockMailer::new();
        mailer.expect_send().times(2).returning(|_| Ok(()));
        let mailer: Arc<dyn Mailer> = Arc::new(mailer);

        let first = OtpService::new(
            store.clone(),
            mailer.clone(),
            Arc::new(FixedCode(1111)),
            "no-reply@quizbit.local".into(),
        );
        first.issue("ana@example.com").await.unwrap();
        let second = OtpService::new(
            store.clone(),
            mailer,
            Arc::new(FixedCode(2222)),
            "no-reply@quizbit.local".into(),
        );
        second.issue("ana@example.com").await.unwrap();

        let user = store.find_by_email("ana@example.com").await.unwrap().unwrap();
        assert_eq!(user.otp.map(|c| c.code), Some(2222));
    }

    #[tokio::test]
    async fn unknown_email_is_not_found_and_sends_nothing() {
        let store = Arc::new(MemoryStore::new());
        let mut mailer = MockMailer::new();
        mailer.expect_send().times(0);

        let service = OtpService::new(
            store,
            Arc::new(mailer),
            Arc::new(FixedCode(1000)),
            "no-reply@quizbit.local".into(),
        );
        let err = service.issue("ghost@example.com").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
