use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::store::{QuestionStore, SubmissionStore, UserStore};
use crate::error::{Error, Result};
use crate::models::question::{AnswerOption, Question, QuestionFilter, QuestionRow};
use crate::models::submission::{HistoryEntry, NewSubmission, Submission};
use crate::models::user::{AccountStatus, NewUser, OtpChallenge, User, UserRow};

const USER_COLUMNS: &str = "id, email, name, password_hash, status, otp_code, otp_issued_at, created_at, updated_at";

const QUESTION_SELECT: &str = r#"
    SELECT q.id, q.text, q.difficulty, q.category_id, c.name AS category_name, q.is_active
    FROM questions q
    JOIN question_categories c ON c.id = q.category_id
"#;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn attach_answers(&self, rows: Vec<QuestionRow>) -> Result<Vec<Question>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let answers = sqlx::query_as::<_, AnswerOption>(
            r#"
            SELECT id, question_id, text, is_correct
            FROM answers
            WHERE question_id = ANY($1)
            ORDER BY id ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_question: HashMap<i64, Vec<AnswerOption>> = HashMap::new();
        for answer in answers {
            by_question.entry(answer.question_id).or_default().push(answer);
        }

        rows.into_iter()
            .map(|row| {
                let answers = by_question.remove(&row.id).unwrap_or_default();
                row.into_question(answers)
            })
            .collect()
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn create(&self, new_user: NewUser) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, email, name, password_hash, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.email)
        .bind(&new_user.name)
        .bind(&new_user.password_hash)
        .bind(AccountStatus::Unverified.as_str())
        .fetch_one(&self.pool)
        .await?;
        User::try_from(row)
    }

    async fn store_otp(&self, email: &str, challenge: OtpChallenge) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET otp_code = $2,
                otp_issued_at = $3,
                status = CASE WHEN status = 'unverified' THEN 'pending' ELSE status END,
                updated_at = NOW()
            WHERE email = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(email)
        .bind(challenge.code)
        .bind(challenge.issued_at)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => User::try_from(row),
            None => Err(Error::NotFound(format!("No account registered for {}", email))),
        }
    }

    async fn activate(&self, id: Uuid, code: i32) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET status = 'active', otp_code = NULL, otp_issued_at = NULL, updated_at = NOW()
            WHERE id = $1 AND status = 'pending' AND otp_code = $2
            "#,
        )
        .bind(id)
        .bind(code)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl QuestionStore for PgStore {
    async fn category_exists(&self, id: i64) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM question_categories WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn list_active(&self, filter: QuestionFilter) -> Result<Vec<Question>> {
        let rows = sqlx::query_as::<_, QuestionRow>(&format!(
            r#"{}
            WHERE q.is_active
              AND ($1::text IS NULL OR q.difficulty = $1)
              AND ($2::bigint IS NULL OR q.category_id = $2)
            ORDER BY q.id ASC
            "#,
            QUESTION_SELECT
        ))
        .bind(filter.difficulty.map(|d| d.as_str()))
        .bind(filter.category_id)
        .fetch_all(&self.pool)
        .await?;
        self.attach_answers(rows).await
    }

    async fn find_active(&self, id: i64) -> Result<Option<Question>> {
        let row = sqlx::query_as::<_, QuestionRow>(&format!(
            "{} WHERE q.id = $1 AND q.is_active",
            QUESTION_SELECT
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.attach_answers(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_answer(&self, id: i64) -> Result<Option<AnswerOption>> {
        let answer = sqlx::query_as::<_, AnswerOption>(
            "SELECT id, question_id, text, is_correct FROM answers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(answer)
    }
}

#[async_trait]
impl SubmissionStore for PgStore {
    async fn exists(&self, user_id: Uuid, question_id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM submissions WHERE user_id = $1 AND question_id = $2)",
        )
        .bind(user_id)
        .bind(question_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert(&self, submission: NewSubmission) -> Result<Submission> {
        let row = sqlx::query_as::<_, Submission>(
            r#"
            INSERT INTO submissions (id, user_id, question_id, answer_id, is_correct)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, question_id, answer_id, is_correct, submitted_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(submission.user_id)
        .bind(submission.question_id)
        .bind(submission.answer_id)
        .bind(submission.is_correct)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn history(&self, user_id: Uuid) -> Result<Vec<HistoryEntry>> {
        let rows = sqlx::query_as::<_, HistoryEntry>(
            r#"
            SELECT s.question_id, q.text AS question_text, q.difficulty,
                   s.answer_id, a.text AS answer_text, s.is_correct, s.submitted_at
            FROM submissions s
            JOIN questions q ON q.id = s.question_id
            JOIN answers a ON a.id = s.answer_id
            WHERE s.user_id = $1
            ORDER BY s.submitted_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
