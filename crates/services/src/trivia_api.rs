use std::env;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::Deserialize;

use quiz_core::model::{CategoryId, Difficulty, QuestionDraft, QuestionKind};

use crate::error::FetchError;

/// Default public endpoint of the Open Trivia Database.
pub const DEFAULT_BASE_URL: &str = "https://opentdb.com";

/// The API serves between 1 and 50 questions per call.
const MIN_AMOUNT: u8 = 1;
const MAX_AMOUNT: u8 = 50;

#[derive(Clone, Debug)]
pub struct TriviaApiConfig {
    pub base_url: String,
}

impl TriviaApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var("TRIVIA_API_BASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        Self { base_url }
    }
}

impl Default for TriviaApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Parameters for one fetch call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    pub amount: u8,
    pub category: Option<CategoryId>,
    pub difficulty: Option<Difficulty>,
}

impl FetchRequest {
    #[must_use]
    pub fn new(amount: u8) -> Self {
        Self {
            amount,
            category: None,
            difficulty: None,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    /// Amount clamped into the API's accepted window.
    #[must_use]
    pub fn clamped_amount(&self) -> u8 {
        self.amount.clamp(MIN_AMOUNT, MAX_AMOUNT)
    }
}

/// Client for the trivia question API.
///
/// Performs a single request per fetch; there is deliberately no retry or
/// backoff here.
#[derive(Clone)]
pub struct TriviaApiClient {
    client: Client,
    config: TriviaApiConfig,
}

impl TriviaApiClient {
    #[must_use]
    pub fn new(config: TriviaApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(TriviaApiConfig::from_env())
    }

    /// Fetch one batch of raw questions and decode them into drafts.
    ///
    /// Text fields are requested base64-encoded so payloads arrive free of
    /// the HTML-entity artifacts the API's default encoding produces.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` on network failure, a non-success HTTP status, a
    /// non-zero API response code, or a malformed payload.
    pub async fn fetch(&self, request: FetchRequest) -> Result<Vec<QuestionDraft>, FetchError> {
        let url = format!("{}/api.php", self.config.base_url.trim_end_matches('/'));

        let mut query: Vec<(&str, String)> = vec![
            ("amount", request.clamped_amount().to_string()),
            ("encode", "base64".to_string()),
        ];
        if let Some(category) = request.category {
            query.push(("category", category.to_string()));
        }
        if let Some(difficulty) = request.difficulty {
            query.push(("difficulty", difficulty.as_str().to_string()));
        }

        let response = self.client.get(url).query(&query).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status()));
        }

        let body: ApiResponse = response.json().await?;
        match body.response_code {
            0 => {}
            1 => return Err(FetchError::NoResults),
            2 => return Err(FetchError::InvalidParameter),
            5 => return Err(FetchError::RateLimited),
            other => return Err(FetchError::UnexpectedResponseCode(other)),
        }

        if body.results.is_empty() {
            return Err(FetchError::NoResults);
        }

        body.results.into_iter().map(RawQuestion::decode).collect()
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    response_code: u8,
    #[serde(default)]
    results: Vec<RawQuestion>,
}

/// One raw question record exactly as the API serializes it.
///
/// Every text field is base64-encoded because `fetch` asks for
/// `encode=base64`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestion {
    #[serde(rename = "type")]
    kind: String,
    difficulty: String,
    category: String,
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

impl RawQuestion {
    /// Decode all payload fields into a `QuestionDraft`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Decode` naming the first malformed field.
    pub fn decode(self) -> Result<QuestionDraft, FetchError> {
        let kind: QuestionKind = decode_field("type", &self.kind)?
            .parse()
            .map_err(|e: quiz_core::model::ParseQuestionKindError| FetchError::Decode {
                field: "type",
                reason: e.to_string(),
            })?;

        let difficulty: Difficulty = decode_field("difficulty", &self.difficulty)?
            .parse()
            .map_err(|e: quiz_core::model::ParseDifficultyError| FetchError::Decode {
                field: "difficulty",
                reason: e.to_string(),
            })?;

        let incorrect_answers = self
            .incorrect_answers
            .iter()
            .map(|raw| decode_field("incorrect_answers", raw))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QuestionDraft {
            text: decode_field("question", &self.question)?,
            correct_answer: decode_field("correct_answer", &self.correct_answer)?,
            incorrect_answers,
            category: decode_field("category", &self.category)?,
            difficulty,
            kind,
        })
    }
}

fn decode_field(field: &'static str, raw: &str) -> Result<String, FetchError> {
    let bytes = BASE64.decode(raw).map_err(|e| FetchError::Decode {
        field,
        reason: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| FetchError::Decode {
        field,
        reason: e.to_string(),
    })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
