use std::sync::Arc;

use quiz_core::Clock;
use storage::repository::{NewQuestionRecord, QuestionRepository};
use tracing::{debug, info, warn};

use crate::error::EtlError;
use crate::trivia_api::{FetchRequest, TriviaApiClient};

/// Outcome of one load run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Raw records received from the API.
    pub fetched: usize,
    /// Questions that passed validation and were written.
    pub loaded: u32,
    /// Records dropped by validation.
    pub skipped: u32,
}

/// Fetch, transform, and load trivia questions into storage.
///
/// One pass, no retries: a fetch or storage failure halts the run. Records
/// that fail validation are skipped and counted instead of aborting the
/// whole batch.
pub struct EtlService {
    client: TriviaApiClient,
    questions: Arc<dyn QuestionRepository>,
    clock: Clock,
}

impl EtlService {
    #[must_use]
    pub fn new(client: TriviaApiClient, questions: Arc<dyn QuestionRepository>, clock: Clock) -> Self {
        Self {
            client,
            questions,
            clock,
        }
    }

    /// Run the pipeline once.
    ///
    /// With `replace` set, stored questions are cleared before loading so the
    /// table reflects exactly this batch.
    ///
    /// # Errors
    ///
    /// Returns `EtlError::Fetch` if the API call or payload decoding fails,
    /// or `EtlError::Storage` on any write failure. There is no
    /// partial-commit recovery; the report says how far the run got.
    pub async fn run(&self, request: FetchRequest, replace: bool) -> Result<LoadReport, EtlError> {
        let drafts = self.client.fetch(request).await?;
        let fetched = drafts.len();
        debug!(fetched, "fetched trivia questions");

        if replace {
            self.questions.clear_questions().await?;
            debug!("cleared stored questions");
        }

        let now = self.clock.now();
        let mut loaded = 0_u32;
        let mut skipped = 0_u32;

        for draft in drafts {
            match draft.validate(now) {
                Ok(validated) => {
                    let record = NewQuestionRecord::from_validated(&validated);
                    let id = self.questions.insert_question(record).await?;
                    debug!(%id, "loaded question");
                    loaded += 1;
                }
                Err(err) => {
                    warn!(%err, "skipping invalid question");
                    skipped += 1;
                }
            }
        }

        info!(fetched, loaded, skipped, "trivia load complete");
        Ok(LoadReport {
            fetched,
            loaded,
            skipped,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
