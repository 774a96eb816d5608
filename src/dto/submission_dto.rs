use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::submission::HistoryEntry;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubmitAnswerRequest {
    #[validate(range(min = 1))]
    pub question_id: i64,
    #[validate(range(min = 1))]
    pub selected_answer: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitAnswerResponse {
    pub msg: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryItem {
    pub question_id: i64,
    pub question_text: String,
    pub difficulty: String,
    pub selected_answer: i64,
    pub selected_answer_text: String,
    pub is_correct: bool,
    pub submitted_at: DateTime<Utc>,
}

impl From<HistoryEntry> for HistoryItem {
    fn from(e: HistoryEntry) -> Self {
        Self {
            question_id: e.question_id,
            question_text: e.question_text,
            difficulty: e.difficulty,
            selected_answer: e.answer_id,
            selected_answer_text: e.answer_text,
            is_correct: e.is_correct,
            submitted_at: e.submitted_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryResponse {
    /// Distinct questions the caller has answered.
    pub attempted: usize,
    pub correct: usize,
    pub submissions: Vec<HistoryItem>,
}
