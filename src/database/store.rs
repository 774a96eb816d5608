//! Storage ports.
//!
//! Services only talk to these traits. `database::postgres` backs them with
//! sqlx in production, `database::memory` keeps everything in-process for tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::question::{AnswerOption, Question, QuestionFilter};
use crate::models::submission::{HistoryEntry, NewSubmission, Submission};
use crate::models::user::{NewUser, OtpChallenge, User};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Inserts an `unverified` account. A taken email fails with `Error::Conflict`.
    async fn create(&self, new_user: NewUser) -> Result<User>;

    /// Replaces the outstanding challenge of the account owning `email`.
    ///
    /// `unverified` accounts move to `pending`; no other status changes.
    /// Fails with `Error::NotFound` when no account has that email.
    async fn store_otp(&self, email: &str, challenge: OtpChallenge) -> Result<User>;

    /// Moves a `pending` account holding exactly `code` to `active` and clears
    /// the challenge. Returns `false` when the row no longer qualifies.
    async fn activate(&self, id: Uuid, code: i32) -> Result<bool>;
}

#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn category_exists(&self, id: i64) -> Result<bool>;

    /// Active questions matching `filter`, ordered by id.
    async fn list_active(&self, filter: QuestionFilter) -> Result<Vec<Question>>;

    async fn find_active(&self, id: i64) -> Result<Option<Question>>;

    async fn find_answer(&self, id: i64) -> Result<Option<AnswerOption>>;
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn exists(&self, user_id: Uuid, question_id: i64) -> Result<bool>;

    /// A second row for the same (user, question) fails with `Error::Conflict`.
    async fn insert(&self, submission: NewSubmission) -> Result<Submission>;

    /// Newest first.
    async fn history(&self, user_id: Uuid) -> Result<Vec<HistoryEntry>>;
}
