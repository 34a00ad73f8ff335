use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rng;
use rand::seq::SliceRandom;

use quiz_core::Clock;
use quiz_core::model::{Question, QuestionId, QuizSummary};
use storage::repository::QuestionRepository;

use crate::error::QuizError;

//
// ─── PREPARED QUESTION ─────────────────────────────────────────────────────────
//

/// A stored question prepared for play: its choices are shuffled exactly once
/// when the session starts, so re-rendering a question never reorders them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedQuestion {
    question: Question,
    choices: Vec<String>,
}

impl PreparedQuestion {
    fn prepare<R: rand::Rng + ?Sized>(question: Question, rng: &mut R) -> Self {
        let mut choices = Vec::with_capacity(question.choice_count());
        choices.extend(question.incorrect_answers().iter().cloned());
        choices.push(question.correct_answer().to_owned());
        choices.shuffle(rng);
        Self { question, choices }
    }

    #[must_use]
    pub fn question(&self) -> &Question {
        &self.question
    }

    /// Choices in presentation order.
    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }
}

//
// ─── ANSWER OUTCOME ────────────────────────────────────────────────────────────
//

/// Result of answering one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub question_id: QuestionId,
    pub selected: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

//
// ─── QUIZ SESSION ──────────────────────────────────────────────────────────────
//

/// In-memory interactive quiz run.
///
/// Steps through its questions sequentially; the running score is updated on
/// each answer and can never exceed the number answered.
#[derive(Clone)]
pub struct QuizSession {
    questions: Vec<PreparedQuestion>,
    current: usize,
    correct: u32,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Create a session over the given questions, shuffling each question's
    /// choices.
    ///
    /// `started_at` should come from the services layer clock to keep time
    /// deterministic.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Empty` if no questions are provided.
    pub fn new(questions: Vec<Question>, started_at: DateTime<Utc>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::Empty);
        }

        let mut rng = rng();
        let questions = questions
            .into_iter()
            .map(|question| PreparedQuestion::prepare(question, &mut rng))
            .collect();

        Ok(Self {
            questions,
            current: 0,
            correct: 0,
            started_at,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Total number of questions in this session.
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Number of questions already answered.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.current
    }

    /// Number of questions not yet answered.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.questions.len().saturating_sub(self.current)
    }

    /// Running count of correct answers.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// The next unanswered question, or `None` once the session is finished.
    #[must_use]
    pub fn current_question(&self) -> Option<&PreparedQuestion> {
        self.questions.get(self.current)
    }

    /// Grade the selection at `choice_index` against the current question's
    /// stored correct answer and advance.
    ///
    /// `answered_at` should come from the services layer clock.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Completed` if every question has been answered
    /// already, or `QuizError::InvalidChoice` when the index is out of range.
    pub fn answer_current(
        &mut self,
        choice_index: usize,
        answered_at: DateTime<Utc>,
    ) -> Result<AnswerOutcome, QuizError> {
        let Some(prepared) = self.questions.get(self.current) else {
            return Err(QuizError::Completed);
        };

        let Some(selected) = prepared.choices.get(choice_index) else {
            return Err(QuizError::InvalidChoice {
                index: choice_index,
                choices: prepared.choices.len(),
            });
        };

        let is_correct = prepared.question.is_correct(selected);
        if is_correct {
            self.correct += 1;
        }

        let outcome = AnswerOutcome {
            question_id: prepared.question.id(),
            selected: selected.clone(),
            correct_answer: prepared.question.correct_answer().to_owned(),
            is_correct,
        };

        self.current += 1;
        if self.current >= self.questions.len() {
            self.completed_at = Some(answered_at);
        }

        Ok(outcome)
    }

    /// Final score once the terminal state is reached.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Incomplete` while questions remain unanswered.
    pub fn summary(&self) -> Result<QuizSummary, QuizError> {
        let Some(completed_at) = self.completed_at else {
            return Err(QuizError::Incomplete);
        };

        let total = u32::try_from(self.questions.len()).unwrap_or(u32::MAX);
        Ok(QuizSummary::new(
            self.started_at,
            completed_at,
            total,
            self.correct,
        )?)
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("correct", &self.correct)
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── QUIZ SERVICE ──────────────────────────────────────────────────────────────
//

/// Starts quiz sessions from stored questions.
#[derive(Clone)]
pub struct QuizService {
    questions: Arc<dyn QuestionRepository>,
    clock: Clock,
}

impl QuizService {
    #[must_use]
    pub fn new(questions: Arc<dyn QuestionRepository>, clock: Clock) -> Self {
        Self { questions, clock }
    }

    /// Sample up to `amount` stored questions and begin a session.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Empty` when storage holds no questions, or
    /// `QuizError::Storage` on a read failure.
    pub async fn start(&self, amount: u32) -> Result<QuizSession, QuizError> {
        let questions = self.questions.sample_questions(amount).await?;
        QuizSession::new(questions, self.clock.now())
    }

    /// Number of questions currently stored, for the setup screen.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` on a read failure.
    pub async fn stored_count(&self) -> Result<u64, QuizError> {
        Ok(self.questions.count_questions().await?)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Difficulty, QuestionDraft, QuestionKind};
    use quiz_core::time::{fixed_clock, fixed_now};
    use storage::repository::{InMemoryRepository, NewQuestionRecord};

    fn build_question(id: u64, correct: &str, incorrect: &[&str]) -> Question {
        QuestionDraft {
            text: format!("Question {id}?"),
            correct_answer: correct.to_string(),
            incorrect_answers: incorrect.iter().map(ToString::to_string).collect(),
            category: "General Knowledge".to_string(),
            difficulty: Difficulty::Easy,
            kind: QuestionKind::Multiple,
        }
        .validate(fixed_now())
        .unwrap()
        .assign_id(QuestionId::new(id))
    }

    fn correct_index(prepared: &PreparedQuestion) -> usize {
        prepared
            .choices()
            .iter()
            .position(|choice| prepared.question().is_correct(choice))
            .expect("correct answer is always among the choices")
    }

    fn wrong_index(prepared: &PreparedQuestion) -> usize {
        prepared
            .choices()
            .iter()
            .position(|choice| !prepared.question().is_correct(choice))
            .expect("an incorrect answer is always among the choices")
    }

    #[test]
    fn empty_session_returns_error() {
        let err = QuizSession::new(Vec::new(), fixed_now()).unwrap_err();
        assert!(matches!(err, QuizError::Empty));
    }

    #[test]
    fn choices_contain_correct_and_all_incorrect_answers() {
        let question = build_question(1, "Right", &["Wrong A", "Wrong B", "Wrong C"]);
        let session = QuizSession::new(vec![question], fixed_now()).unwrap();

        let prepared = session.current_question().unwrap();
        let mut choices = prepared.choices().to_vec();
        choices.sort();
        assert_eq!(choices, vec!["Right", "Wrong A", "Wrong B", "Wrong C"]);
    }

    #[test]
    fn session_scores_and_advances() {
        let questions = vec![
            build_question(1, "A", &["B", "C"]),
            build_question(2, "X", &["Y", "Z"]),
        ];
        let mut session = QuizSession::new(questions, fixed_now()).unwrap();

        assert_eq!(session.total_questions(), 2);
        assert_eq!(session.remaining(), 2);

        let idx = correct_index(session.current_question().unwrap());
        let outcome = session.answer_current(idx, fixed_now()).unwrap();
        assert!(outcome.is_correct);
        assert_eq!(outcome.question_id, QuestionId::new(1));
        assert_eq!(session.score(), 1);
        assert!(!session.is_complete());

        let idx = wrong_index(session.current_question().unwrap());
        let outcome = session.answer_current(idx, fixed_now()).unwrap();
        assert!(!outcome.is_correct);
        assert_eq!(outcome.correct_answer, "X");
        assert_eq!(session.score(), 1);
        assert!(session.is_complete());
        assert_eq!(session.completed_at(), Some(fixed_now()));
    }

    #[test]
    fn score_never_exceeds_answered_count() {
        let questions = vec![
            build_question(1, "A", &["B"]),
            build_question(2, "A", &["B"]),
            build_question(3, "A", &["B"]),
        ];
        let mut session = QuizSession::new(questions, fixed_now()).unwrap();

        while !session.is_complete() {
            let idx = correct_index(session.current_question().unwrap());
            session.answer_current(idx, fixed_now()).unwrap();
            assert!(session.score() as usize <= session.answered_count());
        }
        assert_eq!(session.score(), 3);
    }

    #[test]
    fn answering_past_the_end_fails() {
        let mut session =
            QuizSession::new(vec![build_question(1, "A", &["B"])], fixed_now()).unwrap();
        session.answer_current(0, fixed_now()).unwrap();

        let err = session.answer_current(0, fixed_now()).unwrap_err();
        assert!(matches!(err, QuizError::Completed));
    }

    #[test]
    fn out_of_range_choice_fails_without_advancing() {
        let mut session =
            QuizSession::new(vec![build_question(1, "A", &["B"])], fixed_now()).unwrap();

        let err = session.answer_current(9, fixed_now()).unwrap_err();
        assert!(matches!(
            err,
            QuizError::InvalidChoice { index: 9, choices: 2 }
        ));
        assert_eq!(session.answered_count(), 0);
        assert!(!session.is_complete());
    }

    #[test]
    fn summary_requires_completion() {
        let mut session =
            QuizSession::new(vec![build_question(1, "A", &["B"])], fixed_now()).unwrap();
        assert!(matches!(session.summary(), Err(QuizError::Incomplete)));

        let idx = correct_index(session.current_question().unwrap());
        session.answer_current(idx, fixed_now()).unwrap();

        let summary = session.summary().unwrap();
        assert_eq!(summary.total(), 1);
        assert_eq!(summary.correct(), 1);
    }

    #[tokio::test]
    async fn service_starts_session_from_storage() {
        let repo = InMemoryRepository::new();
        for i in 1..=5 {
            let validated = QuestionDraft {
                text: format!("Q{i}?"),
                correct_answer: "A".to_string(),
                incorrect_answers: vec!["B".to_string(), "C".to_string()],
                category: "History".to_string(),
                difficulty: Difficulty::Medium,
                kind: QuestionKind::Multiple,
            }
            .validate(fixed_now())
            .unwrap();
            repo.insert_question(NewQuestionRecord::from_validated(&validated))
                .await
                .unwrap();
        }

        let service = QuizService::new(Arc::new(repo), fixed_clock());
        assert_eq!(service.stored_count().await.unwrap(), 5);

        let session = service.start(3).await.unwrap();
        assert_eq!(session.total_questions(), 3);
        assert_eq!(session.started_at(), fixed_now());
    }

    #[tokio::test]
    async fn service_fails_when_storage_is_empty() {
        let repo = InMemoryRepository::new();
        let service = QuizService::new(Arc::new(repo), fixed_clock());

        let err = service.start(10).await.unwrap_err();
        assert!(matches!(err, QuizError::Empty));
    }
}
