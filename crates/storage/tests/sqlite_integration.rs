use quiz_core::model::{Difficulty, QuestionDraft, QuestionKind};
use quiz_core::time::fixed_now;
use storage::repository::{NewQuestionRecord, QuestionRepository};
use storage::sqlite::SqliteRepository;

fn build_record(text: &str, correct: &str, incorrect: &[&str]) -> NewQuestionRecord {
    let validated = QuestionDraft {
        text: text.to_string(),
        correct_answer: correct.to_string(),
        incorrect_answers: incorrect.iter().map(ToString::to_string).collect(),
        category: "Science & Nature".to_string(),
        difficulty: Difficulty::Medium,
        kind: QuestionKind::Multiple,
    }
    .validate(fixed_now())
    .unwrap();
    NewQuestionRecord::from_validated(&validated)
}

#[tokio::test]
async fn sqlite_roundtrip_preserves_text_answers_and_id() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let record = build_record(
        "Which planet is known as the Red Planet?",
        "Mars",
        &["Venus", "Jupiter", "Mercury"],
    );
    let id = repo.insert_question(record).await.unwrap();

    let fetched = repo.get_question(id).await.unwrap().expect("stored row");
    assert_eq!(fetched.id(), id);
    assert_eq!(fetched.text(), "Which planet is known as the Red Planet?");
    assert_eq!(fetched.correct_answer(), "Mars");
    assert_eq!(
        fetched.incorrect_answers(),
        &[
            "Venus".to_string(),
            "Jupiter".to_string(),
            "Mercury".to_string()
        ]
    );
    assert_eq!(fetched.category(), "Science & Nature");
    assert_eq!(fetched.difficulty(), Difficulty::Medium);
    assert_eq!(fetched.kind(), QuestionKind::Multiple);
    assert_eq!(fetched.created_at(), fixed_now());
}

#[tokio::test]
async fn sqlite_answers_with_commas_survive_storage() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_commas?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let record = build_record(
        "Where is the Louvre?",
        "Paris, France",
        &["Rome, Italy", "Madrid, Spain"],
    );
    let id = repo.insert_question(record).await.unwrap();

    let fetched = repo.get_question(id).await.unwrap().expect("stored row");
    assert_eq!(fetched.correct_answer(), "Paris, France");
    assert_eq!(
        fetched.incorrect_answers(),
        &["Rome, Italy".to_string(), "Madrid, Spain".to_string()]
    );
}

#[tokio::test]
async fn sqlite_sample_count_and_clear() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_sample?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    for i in 0..10 {
        let record = build_record(&format!("Question {i}?"), "Yes", &["No", "Maybe"]);
        repo.insert_question(record).await.unwrap();
    }
    assert_eq!(repo.count_questions().await.unwrap(), 10);

    let sampled = repo.sample_questions(4).await.unwrap();
    assert_eq!(sampled.len(), 4);

    // Asking for more than exist returns everything once, never duplicates.
    let all = repo.sample_questions(50).await.unwrap();
    assert_eq!(all.len(), 10);
    let mut ids: Vec<u64> = all.iter().map(|q| q.id().value()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 10);

    repo.clear_questions().await.unwrap();
    assert_eq!(repo.count_questions().await.unwrap(), 0);
}

#[tokio::test]
async fn sqlite_ids_are_minted_sequentially_per_insert() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_ids?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let first = repo
        .insert_question(build_record("First?", "A", &["B"]))
        .await
        .unwrap();
    let second = repo
        .insert_question(build_record("Second?", "A", &["B"]))
        .await
        .unwrap();

    assert_ne!(first, second);
    assert!(second.value() > first.value());
}
