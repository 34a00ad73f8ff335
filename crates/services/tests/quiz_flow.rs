use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use quiz_core::time::fixed_clock;
use serde_json::json;
use services::{EtlService, FetchRequest, QuizService, TriviaApiClient, TriviaApiConfig};
use storage::repository::InMemoryRepository;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn b64(text: &str) -> String {
    BASE64.encode(text)
}

fn result_json(i: usize) -> serde_json::Value {
    json!({
        "type": b64("multiple"),
        "difficulty": b64("easy"),
        "category": b64("General Knowledge"),
        "question": b64(&format!("Question number {i}?")),
        "correct_answer": b64("Correct"),
        "incorrect_answers": [b64("Wrong 1"), b64("Wrong 2"), b64("Wrong 3")],
    })
}

#[tokio::test]
async fn fetch_ten_store_ten_play_ten() {
    let server = MockServer::start().await;
    let results: Vec<_> = (1..=10).map(result_json).collect();
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response_code": 0,
            "results": results,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let repo = InMemoryRepository::new();
    let clock = fixed_clock();

    // Extract + transform + load.
    let etl = EtlService::new(
        TriviaApiClient::new(TriviaApiConfig::new(server.uri())),
        Arc::new(repo.clone()),
        clock,
    );
    let report = etl.run(FetchRequest::new(10), false).await.unwrap();
    assert_eq!(report.fetched, 10);
    assert_eq!(report.loaded, 10);
    assert_eq!(report.skipped, 0);

    // Play every stored question in sequence.
    let quiz = QuizService::new(Arc::new(repo), clock);
    assert_eq!(quiz.stored_count().await.unwrap(), 10);

    let mut session = quiz.start(10).await.unwrap();
    assert_eq!(session.total_questions(), 10);

    let mut presented = 0;
    while let Some(prepared) = session.current_question().cloned() {
        presented += 1;
        assert_eq!(prepared.choices().len(), 4);
        // Always pick the first choice; whether it is right depends on the
        // shuffle, which is exactly what the score bounds below allow for.
        session.answer_current(0, clock.now()).unwrap();
    }
    assert_eq!(presented, 10);
    assert!(session.is_complete());

    let summary = session.summary().unwrap();
    assert_eq!(summary.total(), 10);
    assert!(summary.correct() <= 10);
}
