use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Submission {
    pub id: Uuid,
    pub user_id: Uuid,
    pub question_id: i64,
    pub answer_id: i64,
    pub is_correct: bool,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub user_id: Uuid,
    pub question_id: i64,
    pub answer_id: i64,
    pub is_correct: bool,
}

/// A submission joined with the question and answer it refers to.
#[derive(Debug, Clone, FromRow)]
pub struct HistoryEntry {
    pub question_id: i64,
    pub question_text: String,
    pub difficulty: String,
    pub answer_id: i64,
    pub answer_text: String,
    pub is_correct: bool,
    pub submitted_at: DateTime<Utc>,
}
