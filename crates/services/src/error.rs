//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::QuizSummaryError;
use storage::repository::StorageError;

/// Errors emitted by `TriviaApiClient`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    #[error("trivia API request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("trivia API returned no questions for the requested parameters")]
    NoResults,

    #[error("trivia API rejected the request parameters")]
    InvalidParameter,

    #[error("trivia API rate limit exceeded")]
    RateLimited,

    #[error("trivia API returned unexpected response code {0}")]
    UnexpectedResponseCode(u8),

    #[error("malformed {field} in trivia API payload: {reason}")]
    Decode {
        field: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `EtlService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EtlError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuizService` and `QuizSession`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no questions available for a quiz")]
    Empty,

    #[error("quiz already completed")]
    Completed,

    #[error("quiz is not finished yet")]
    Incomplete,

    #[error("choice index {index} out of range for {choices} choices")]
    InvalidChoice { index: usize, choices: usize },

    #[error(transparent)]
    Summary(#[from] QuizSummaryError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
