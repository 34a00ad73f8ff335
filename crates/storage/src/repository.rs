use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{
    Difficulty, Question, QuestionId, QuestionKind, QuestionValidationError, ValidatedQuestion,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Insert shape for a question that has no identity yet.
///
/// Identity is assigned by the repository on insert, which is what makes the
/// identifiers stable: they are minted exactly once, at load time.
#[derive(Debug, Clone)]
pub struct NewQuestionRecord {
    pub text: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
    pub category: String,
    pub difficulty: Difficulty,
    pub kind: QuestionKind,
    pub created_at: DateTime<Utc>,
}

impl NewQuestionRecord {
    #[must_use]
    pub fn from_validated(question: &ValidatedQuestion) -> Self {
        Self {
            text: question.text().to_owned(),
            correct_answer: question.correct_answer().to_owned(),
            incorrect_answers: question.incorrect_answers().to_vec(),
            category: question.category().to_owned(),
            difficulty: question.difficulty(),
            kind: question.kind(),
            created_at: question.created_at(),
        }
    }
}

/// Persisted shape for a question.
///
/// This mirrors the domain `Question` so repositories can serialize and
/// deserialize without leaking storage concerns into the domain layer.
#[derive(Debug, Clone)]
pub struct QuestionRecord {
    pub id: QuestionId,
    pub text: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
    pub category: String,
    pub difficulty: Difficulty,
    pub kind: QuestionKind,
    pub created_at: DateTime<Utc>,
}

impl QuestionRecord {
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        Self {
            id: question.id(),
            text: question.text().to_owned(),
            correct_answer: question.correct_answer().to_owned(),
            incorrect_answers: question.incorrect_answers().to_vec(),
            category: question.category().to_owned(),
            difficulty: question.difficulty(),
            kind: question.kind(),
            created_at: question.created_at(),
        }
    }

    /// Convert the record back into a domain `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionValidationError` if the persisted row violates the
    /// answer-set invariants.
    pub fn into_question(self) -> Result<Question, QuestionValidationError> {
        Question::from_persisted(
            self.id,
            self.text,
            self.correct_answer,
            self.incorrect_answers,
            self.category,
            self.difficulty,
            self.kind,
            self.created_at,
        )
    }
}

/// Repository contract for stored questions.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Persist a new question and mint its identifier.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn insert_question(
        &self,
        record: NewQuestionRecord,
    ) -> Result<QuestionId, StorageError>;

    /// Fetch a question by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read or deserialization failure. A missing
    /// row is `Ok(None)`, not an error.
    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError>;

    /// Fetch up to `limit` questions for a quiz run.
    ///
    /// The SQLite adapter returns them in random order; the in-memory adapter
    /// returns insertion order so tests stay deterministic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read or deserialization failure.
    async fn sample_questions(&self, limit: u32) -> Result<Vec<Question>, StorageError>;

    /// Total number of stored questions.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failure.
    async fn count_questions(&self) -> Result<u64, StorageError>;

    /// Delete all stored questions. Used by the seed step's `--replace` mode.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on write failure.
    async fn clear_questions(&self) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    inner: Arc<Mutex<InMemoryState>>,
}

#[derive(Default)]
struct InMemoryState {
    questions: BTreeMap<QuestionId, QuestionRecord>,
    next_id: u64,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, StorageError> {
        self.inner
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn insert_question(
        &self,
        record: NewQuestionRecord,
    ) -> Result<QuestionId, StorageError> {
        let mut guard = self.lock()?;
        guard.next_id += 1;
        let id = QuestionId::new(guard.next_id);
        guard.questions.insert(
            id,
            QuestionRecord {
                id,
                text: record.text,
                correct_answer: record.correct_answer,
                incorrect_answers: record.incorrect_answers,
                category: record.category,
                difficulty: record.difficulty,
                kind: record.kind,
                created_at: record.created_at,
            },
        );
        Ok(id)
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        let guard = self.lock()?;
        guard
            .questions
            .get(&id)
            .cloned()
            .map(|record| {
                record
                    .into_question()
                    .map_err(|e| StorageError::Serialization(e.to_string()))
            })
            .transpose()
    }

    async fn sample_questions(&self, limit: u32) -> Result<Vec<Question>, StorageError> {
        let guard = self.lock()?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let mut out = Vec::with_capacity(limit.min(guard.questions.len()));
        for record in guard.questions.values().take(limit) {
            let question = record
                .clone()
                .into_question()
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            out.push(question);
        }
        Ok(out)
    }

    async fn count_questions(&self) -> Result<u64, StorageError> {
        let guard = self.lock()?;
        Ok(guard.questions.len() as u64)
    }

    async fn clear_questions(&self) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.questions.clear();
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let questions: Arc<dyn QuestionRepository> = Arc::new(repo);
        Self { questions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionDraft;
    use quiz_core::time::fixed_now;

    fn build_record(text: &str) -> NewQuestionRecord {
        let validated = QuestionDraft {
            text: text.to_string(),
            correct_answer: "Right".to_string(),
            incorrect_answers: vec!["Wrong A".to_string(), "Wrong B".to_string()],
            category: "General Knowledge".to_string(),
            difficulty: Difficulty::Medium,
            kind: QuestionKind::Multiple,
        }
        .validate(fixed_now())
        .unwrap();
        NewQuestionRecord::from_validated(&validated)
    }

    #[tokio::test]
    async fn roundtrips_question_through_insert_and_get() {
        let repo = InMemoryRepository::new();

        let id = repo.insert_question(build_record("Q1")).await.unwrap();
        let fetched = repo.get_question(id).await.unwrap().expect("stored");

        assert_eq!(fetched.id(), id);
        assert_eq!(fetched.text(), "Q1");
        assert_eq!(fetched.correct_answer(), "Right");
        assert_eq!(
            fetched.incorrect_answers(),
            &["Wrong A".to_string(), "Wrong B".to_string()]
        );
        assert_eq!(fetched.created_at(), fixed_now());
    }

    #[tokio::test]
    async fn mints_distinct_sequential_ids() {
        let repo = InMemoryRepository::new();

        let first = repo.insert_question(build_record("Q1")).await.unwrap();
        let second = repo.insert_question(build_record("Q2")).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(repo.count_questions().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn sample_respects_limit() {
        let repo = InMemoryRepository::new();
        for i in 0..5 {
            repo.insert_question(build_record(&format!("Q{i}")))
                .await
                .unwrap();
        }

        let sampled = repo.sample_questions(3).await.unwrap();
        assert_eq!(sampled.len(), 3);

        let all = repo.sample_questions(100).await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let repo = InMemoryRepository::new();
        repo.insert_question(build_record("Q1")).await.unwrap();
        repo.clear_questions().await.unwrap();

        assert_eq!(repo.count_questions().await.unwrap(), 0);
        assert!(repo.sample_questions(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_question_is_none() {
        let repo = InMemoryRepository::new();
        let missing = repo.get_question(QuestionId::new(99)).await.unwrap();
        assert!(missing.is_none());
    }
}
