use std::sync::Arc;

use crate::database::store::QuestionStore;
use crate::dto::question_dto::QuestionListQuery;
use crate::error::{Error, Result};
use crate::models::question::{Difficulty, Question, QuestionFilter};

#[derive(Clone)]
pub struct QuestionService {
    questions: Arc<dyn QuestionStore>,
}

impl QuestionService {
    pub fn new(questions: Arc<dyn QuestionStore>) -> Self {
        Self { questions }
    }

    /// Active questions matching every supplied constraint.
    ///
    /// Malformed parameters are `BadRequest`; a well-formed but unknown
    /// category is `NotFound`.
    pub async fn list(&self, query: &QuestionListQuery) -> Result<Vec<Question>> {
        let filter = parse_filter(query)?;
        if let Some(category_id) = filter.category_id {
            if !self.questions.category_exists(category_id).await? {
                return Err(Error::NotFound(format!(
                    "category_id {} does not exist",
                    category_id
                )));
            }
        }
        self.questions.list_active(filter).await
    }

    pub async fn get(&self, id: i64) -> Result<Question> {
        self.questions
            .find_active(id)
            .await?
            .ok_or_else(|| Error::NotFound("Question not found".to_string()))
    }
}

pub fn parse_filter(query: &QuestionListQuery) -> Result<QuestionFilter> {
    let difficulty = match non_blank(&query.difficulty) {
        Some(raw) => Some(
            raw.parse::<Difficulty>()
                .map_err(|e| Error::BadRequest(e.to_string()))?,
        ),
        None => None,
    };
    let category_id = match non_blank(&query.category_id) {
        Some(raw) => Some(
            raw.parse::<i64>()
                .map_err(|_| Error::BadRequest("category_id must be an integer".to_string()))?,
        ),
        None => None,
    };
    Ok(QuestionFilter {
        difficulty,
        category_id,
    })
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
