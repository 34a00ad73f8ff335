use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── DIFFICULTY & KIND ─────────────────────────────────────────────────────────
//

/// Difficulty level of a trivia question, as the remote API grades them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Stable lowercase name, shared by the API query string and storage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
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

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid difficulty: {raw}")]
pub struct ParseDifficultyError {
    pub raw: String,
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(ParseDifficultyError {
                raw: other.to_string(),
            }),
        }
    }
}

/// Shape of the answer set: several choices, or true/false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Multiple,
    Boolean,
}

impl QuestionKind {
    /// Stable lowercase name, shared by the API payload and storage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::Multiple => "multiple",
            QuestionKind::Boolean => "boolean",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid question kind: {raw}")]
pub struct ParseQuestionKindError {
    pub raw: String,
}

impl FromStr for QuestionKind {
    type Err = ParseQuestionKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple" => Ok(QuestionKind::Multiple),
            "boolean" => Ok(QuestionKind::Boolean),
            other => Err(ParseQuestionKindError {
                raw: other.to_string(),
            }),
        }
    }
}

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// A decoded but not yet validated question, as produced by the fetch step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub text: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
    pub category: String,
    pub difficulty: Difficulty,
    pub kind: QuestionKind,
}

impl QuestionDraft {
    /// Validate the draft into a question that upholds the answer-set
    /// invariants: non-blank text everywhere, at least one incorrect answer,
    /// no duplicate answers (so exactly one answer is correct), and a single
    /// incorrect answer for boolean questions.
    ///
    /// # Errors
    ///
    /// Returns `QuestionValidationError` describing the first violated rule.
    pub fn validate(self, now: DateTime<Utc>) -> Result<ValidatedQuestion, QuestionValidationError> {
        let text = self.text.trim().to_string();
        if text.is_empty() {
            return Err(QuestionValidationError::BlankQuestionText);
        }

        let correct_answer = self.correct_answer.trim().to_string();
        if correct_answer.is_empty() {
            return Err(QuestionValidationError::BlankAnswer);
        }

        let mut incorrect_answers = Vec::with_capacity(self.incorrect_answers.len());
        for answer in &self.incorrect_answers {
            let answer = answer.trim();
            if answer.is_empty() {
                return Err(QuestionValidationError::BlankAnswer);
            }
            incorrect_answers.push(answer.to_string());
        }

        if incorrect_answers.is_empty() {
            return Err(QuestionValidationError::NoIncorrectAnswers);
        }

        if self.kind == QuestionKind::Boolean && incorrect_answers.len() != 1 {
            return Err(QuestionValidationError::BooleanAnswerCount {
                count: incorrect_answers.len(),
            });
        }

        for (i, answer) in incorrect_answers.iter().enumerate() {
            if *answer == correct_answer {
                return Err(QuestionValidationError::DuplicateAnswer {
                    answer: answer.clone(),
                });
            }
            if incorrect_answers[..i].contains(answer) {
                return Err(QuestionValidationError::DuplicateAnswer {
                    answer: answer.clone(),
                });
            }
        }

        Ok(ValidatedQuestion {
            text,
            correct_answer,
            incorrect_answers,
            category: self.category.trim().to_string(),
            difficulty: self.difficulty,
            kind: self.kind,
            created_at: now,
        })
    }
}

/// A question that passed validation but has no identity yet.
///
/// Identity is assigned by the storage layer at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuestion {
    text: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
    category: String,
    difficulty: Difficulty,
    kind: QuestionKind,
    created_at: DateTime<Utc>,
}

impl ValidatedQuestion {
    #[must_use]
    pub fn assign_id(self, id: QuestionId) -> Question {
        Question {
            id,
            text: self.text,
            correct_answer: self.correct_answer,
            incorrect_answers: self.incorrect_answers,
            category: self.category,
            difficulty: self.difficulty,
            kind: self.kind,
            created_at: self.created_at,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn incorrect_answers(&self) -> &[String] {
        &self.incorrect_answers
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A stored trivia question with exactly one correct answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    text: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
    category: String,
    difficulty: Difficulty,
    kind: QuestionKind,
    created_at: DateTime<Utc>,
}

impl Question {
    /// Rehydrate a question from persisted storage, re-running validation so
    /// the answer-set invariants hold for every in-memory `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionValidationError` if the persisted row violates the
    /// invariants.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: QuestionId,
        text: String,
        correct_answer: String,
        incorrect_answers: Vec<String>,
        category: String,
        difficulty: Difficulty,
        kind: QuestionKind,
        created_at: DateTime<Utc>,
    ) -> Result<Self, QuestionValidationError> {
        let draft = QuestionDraft {
            text,
            correct_answer,
            incorrect_answers,
            category,
            difficulty,
            kind,
        };
        Ok(draft.validate(created_at)?.assign_id(id))
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    /// Incorrect answers in their stored order.
    #[must_use]
    pub fn incorrect_answers(&self) -> &[String] {
        &self.incorrect_answers
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Total number of choices (correct + incorrect).
    #[must_use]
    pub fn choice_count(&self) -> usize {
        self.incorrect_answers.len() + 1
    }

    /// Whether the given selection matches the stored correct answer.
    #[must_use]
    pub fn is_correct(&self, selection: &str) -> bool {
        selection == self.correct_answer
    }
}

//
// ─── QUESTION VALIDATION ERRORS ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionValidationError {
    #[error("question text is blank")]
    BlankQuestionText,

    #[error("answer text is blank")]
    BlankAnswer,

    #[error("question has no incorrect answers")]
    NoIncorrectAnswers,

    #[error("duplicate answer in answer set: {answer}")]
    DuplicateAnswer { answer: String },

    #[error("boolean question must have exactly one incorrect answer, got {count}")]
    BooleanAnswerCount { count: usize },
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
