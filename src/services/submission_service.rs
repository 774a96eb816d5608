use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::database::store::{QuestionStore, SubmissionStore};
use crate::dto::submission_dto::{HistoryItem, HistoryResponse, SubmitAnswerRequest};
use crate::error::{Error, Result};
use crate::models::submission::NewSubmission;

pub const MSG_ALREADY_ANSWERED: &str = "You have already answered this question.";

#[derive(Clone)]
pub struct SubmissionService {
    questions: Arc<dyn QuestionStore>,
    submissions: Arc<dyn SubmissionStore>,
}

impl SubmissionService {
    pub fn new(questions: Arc<dyn QuestionStore>, submissions: Arc<dyn SubmissionStore>) -> Self {
        Self {
            questions,
            submissions,
        }
    }

    /// Records the caller's answer and returns whether it was correct.
    pub async fn submit(&self, user_id: Uuid, req: &SubmitAnswerRequest) -> Result<bool> {
        let question = self
            .questions
            .find_active(req.question_id)
            .await?
            .ok_or_else(|| {
                Error::BadRequest(format!("Invalid question {} - object does not exist.", req.question_id))
            })?;
        let answer = self
            .questions
            .find_answer(req.selected_answer)
            .await?
            .filter(|a| a.question_id == question.id)
            .ok_or_else(|| {
                Error::BadRequest(format!(
                    "Answer {} is not an option of question {}.",
                    req.selected_answer, question.id
                ))
            })?;

        if self.submissions.exists(user_id, question.id).await? {
            return Err(Error::Conflict(MSG_ALREADY_ANSWERED.to_string()));
        }

        let stored = self
            .submissions
            .insert(NewSubmission {
                user_id,
                question_id: question.id,
                answer_id: answer.id,
                is_correct: answer.is_correct,
            })
            .await
            .map_err(|err| match err {
                Error::Conflict(_) => Error::Conflict(MSG_ALREADY_ANSWERED.to_string()),
                other => other,
            })?;

        tracing::info!(
            user_id = %user_id,
            question_id = stored.question_id,
            is_correct = stored.is_correct,
            "answer submitted"
        );
        Ok(stored.is_correct)
    }

    pub async fn history(&self, user_id: Uuid) -> Result<HistoryResponse> {
        let entries = self.submissions.history(user_id).await?;
        let attempted = entries
            .iter()
            .map(|e| e.question_id)
            .collect::<HashSet<_>>()
            .len();
        let correct = entries.iter().filter(|e| e.is_correct).count();
        Ok(HistoryResponse {
            attempted,
            correct,
            submissions: entries.into_iter().map(HistoryItem::from).collect(),
        })
    }
}
