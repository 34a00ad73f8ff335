#![forbid(unsafe_code)]

pub mod error;
pub mod etl;
pub mod quiz;
pub mod trivia_api;

pub use quiz_core::Clock;

pub use error::{EtlError, FetchError, QuizError};
pub use etl::{EtlService, LoadReport};
pub use quiz::{AnswerOutcome, PreparedQuestion, QuizService, QuizSession};
pub use trivia_api::{FetchRequest, TriviaApiClient, TriviaApiConfig};
