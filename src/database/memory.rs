//! In-process store backing the test suite.
//!
//! It enforces the same uniqueness rules as the Postgres schema (one account
//! per email, one submission per user and question) so conflict paths behave
//! identically.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::database::store::{QuestionStore, SubmissionStore, UserStore};
use crate::error::{Error, Result};
use crate::models::question::{AnswerOption, Category, Difficulty, Question, QuestionFilter};
use crate::models::submission::{HistoryEntry, NewSubmission, Submission};
use crate::models::user::{AccountStatus, NewUser, OtpChallenge, User};
use crate::utils::time::now;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    categories: HashMap<i64, Category>,
    questions: HashMap<i64, Question>,
    submissions: Vec<Submission>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user_by_email_mut(&mut self, email: &str) -> Option<&mut User> {
        self.users.values_mut().find(|u| u.email == email)
    }

    fn answer(&self, id: i64) -> Option<&AnswerOption> {
        self.questions
            .values()
            .flat_map(|q| q.answers.iter())
            .find(|a| a.id == id)
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| Error::Internal("memory store mutex poisoned".to_string()))
    }

    pub fn add_category(&self, name: &str) -> Result<Category> {
        let mut tables = self.lock()?;
        let category = Category {
            id: tables.next_id(),
            name: name.to_string(),
        };
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    /// Adds a question with its options given as `(text, is_correct)` pairs.
    pub fn add_question(
        &self,
        text: &str,
        difficulty: Difficulty,
        category_id: i64,
        is_active: bool,
        options: &[(&str, bool)],
    ) -> Result<Question> {
        let mut tables = self.lock()?;
        let category = tables
            .categories
            .get(&category_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("category {}", category_id)))?;
        let id = tables.next_id();
        let mut answers = Vec::with_capacity(options.len());
        for (option_text, is_correct) in options {
            answers.push(AnswerOption {
                id: tables.next_id(),
                question_id: id,
                text: option_text.to_string(),
                is_correct: *is_correct,
            });
        }
        let question = Question {
            id,
            text: text.to_string(),
            difficulty,
            category,
            is_active,
            answers,
        };
        tables.questions.insert(id, question.clone());
        Ok(question)
    }

    /// Administrative status override, e.g. blocking an account.
    pub fn set_status(&self, email: &str, status: AccountStatus) -> Result<()> {
        let mut tables = self.lock()?;
        let user = tables
            .user_by_email_mut(email)
            .ok_or_else(|| Error::NotFound(email.to_string()))?;
        user.status = status;
        user.updated_at = now();
        Ok(())
    }

    pub fn user_count(&self) -> Result<usize> {
        Ok(self.lock()?.users.len())
    }

    pub fn submission_count(&self) -> Result<usize> {
        Ok(self.lock()?.submissions.len())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User> {
        let mut tables = self.lock()?;
        if tables.users.values().any(|u| u.email == new_user.email) {
            return Err(Error::Conflict(format!(
                "An account with email {} already exists",
                new_user.email
            )));
        }
        let timestamp = now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            name: new_user.name,
            password_hash: new_user.password_hash,
            status: AccountStatus::Unverified,
            otp: None,
            created_at: timestamp,
            updated_at: timestamp,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn store_otp(&self, email: &str, challenge: OtpChallenge) -> Result<User> {
        let mut tables = self.lock()?;
        let user = tables
            .user_by_email_mut(email)
            .ok_or_else(|| Error::NotFound(format!("No account registered for {}", email)))?;
        user.otp = Some(challenge);
        user.status = user.status.with_challenge();
        user.updated_at = now();
        Ok(user.clone())
    }

    async fn activate(&self, id: Uuid, code: i32) -> Result<bool> {
        let mut tables = self.lock()?;
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(false);
        };
        let holds_code = user.otp.map(|c| c.code) == Some(code);
        if user.status != AccountStatus::Pending || !holds_code {
            return Ok(false);
        }
        user.status = AccountStatus::Active;
        user.otp = None;
        user.updated_at = now();
        Ok(true)
    }
}

#[async_trait]
impl QuestionStore for MemoryStore {
    async fn category_exists(&self, id: i64) -> Result<bool> {
        Ok(self.lock()?.categories.contains_key(&id))
    }

    async fn list_active(&self, filter: QuestionFilter) -> Result<Vec<Question>> {
        let tables = self.lock()?;
        let mut questions: Vec<Question> = tables
            .questions
            .values()
            .filter(|q| filter.matches(q))
            .cloned()
            .collect();
        questions.sort_by_key(|q| q.id);
        Ok(questions)
    }

    async fn find_active(&self, id: i64) -> Result<Option<Question>> {
        Ok(self
            .lock()?
            .questions
            .get(&id)
            .filter(|q| q.is_active)
            .cloned())
    }

    async fn find_answer(&self, id: i64) -> Result<Option<AnswerOption>> {
        Ok(self.lock()?.answer(id).cloned())
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn exists(&self, user_id: Uuid, question_id: i64) -> Result<bool> {
        Ok(self
            .lock()?
            .submissions
            .iter()
            .any(|s| s.user_id == user_id && s.question_id == question_id))
    }

    async fn insert(&self, submission: NewSubmission) -> Result<Submission> {
        let mut tables = self.lock()?;
        let duplicate = tables
            .submissions
            .iter()
            .any(|s| s.user_id == submission.user_id && s.question_id == submission.question_id);
        if duplicate {
            return Err(Error::Conflict(
                "duplicate key value violates unique constraint \"submissions_user_question_key\""
                    .to_string(),
            ));
        }
        let row = Submission {
            id: Uuid::new_v4(),
            user_id: submission.user_id,
            question_id: submission.question_id,
            answer_id: submission.answer_id,
            is_correct: submission.is_correct,
            submitted_at: now(),
        };
        tables.submissions.push(row.clone());
        Ok(row)
    }

    async fn history(&self, user_id: Uuid) -> Result<Vec<HistoryEntry>> {
        let tables = self.lock()?;
        let mut entries = Vec::new();
        // Insertion order doubles as submission order; walk it backwards for newest first.
        for s in tables.submissions.iter().rev().filter(|s| s.user_id == user_id) {
            let question = tables
                .questions
                .get(&s.question_id)
                .ok_or_else(|| Error::Internal(format!("question {} vanished", s.question_id)))?;
            let answer = tables
                .answer(s.answer_id)
                .ok_or_else(|| Error::Internal(format!("answer {} vanished", s.answer_id)))?;
            entries.push(HistoryEntry {
                question_id: question.id,
                question_text: question.text.clone(),
                difficulty: question.difficulty.to_string(),
                answer_id: answer.id,
                answer_text: answer.text.clone(),
                is_correct: s.is_correct,
                submitted_at: s.submitted_at,
            });
        }
        Ok(entries)
    }
}
