use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDifficulty(pub String);

impl fmt::Display for UnknownDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let allowed: Vec<&str> = Difficulty::ALL.iter().map(Difficulty::as_str).collect();
        write!(
            f,
            "Invalid difficulty '{}'. Difficulty must be one of: {}",
            self.0,
            allowed.join(", ")
        )
    }
}

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownDifficulty(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AnswerOption {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: i64,
    pub text: String,
    pub difficulty: Difficulty,
    pub category: Category,
    pub is_active: bool,
    pub answers: Vec<AnswerOption>,
}

#[derive(Debug, Clone, FromRow)]
pub struct QuestionRow {
    pub id: i64,
    pub text: String,
    pub difficulty: String,
    pub category_id: i64,
    pub category_name: String,
    pub is_active: bool,
}

impl QuestionRow {
    pub fn into_question(self, answers: Vec<AnswerOption>) -> crate::error::Result<Question> {
        let difficulty = self
            .difficulty
            .parse()
            .map_err(|e: UnknownDifficulty| crate::error::Error::Internal(e.to_string()))?;
        Ok(Question {
            id: self.id,
            text: self.text,
            difficulty,
            category: Category {
                id: self.category_id,
                name: self.category_name,
            },
            is_active: self.is_active,
            answers,
        })
    }
}

/// Conjunctive listing filter; absent fields do not constrain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestionFilter {
    pub difficulty: Option<Difficulty>,
    pub category_id: Option<i64>,
}

impl QuestionFilter {
    pub fn matches(&self, question: &Question) -> bool {
        question.is_active
            && self.difficulty.map_or(true, |d| d == question.difficulty)
            && self.category_id.map_or(true, |c| c == question.category.id)
    }
}
