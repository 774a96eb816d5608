use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::question::{Category, Difficulty, Question};

/// Raw query string of the listing endpoint; parsed by `QuestionService`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QuestionListQuery {
    pub difficulty: Option<String>,
    pub category_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnswerView {
    pub id: i64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuestionView {
    pub id: i64,
    pub text: String,
    pub difficulty: Difficulty,
    pub category: Category,
    pub answers: Vec<AnswerView>,
}

impl From<Question> for QuestionView {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            text: q.text,
            difficulty: q.difficulty,
            category: q.category,
            answers: q
                .answers
                .into_iter()
                .map(|a| AnswerView {
                    id: a.id,
                    text: a.text,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuestionListResponse {
    pub count: usize,
    pub questions: Vec<QuestionView>,
}
