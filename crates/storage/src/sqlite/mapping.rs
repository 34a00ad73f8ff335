use quiz_core::model::{Difficulty, Question, QuestionId, QuestionKind};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    let value =
        u64::try_from(v).map_err(|_| StorageError::Serialization("id sign overflow".into()))?;
    Ok(QuestionId::new(value))
}

pub(crate) fn question_id_to_i64(id: QuestionId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("id overflow".into()))
}

pub(crate) fn encode_answers(answers: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(answers).map_err(ser)
}

pub(crate) fn decode_answers(raw: &str) -> Result<Vec<String>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn map_question_row(row: &SqliteRow) -> Result<Question, StorageError> {
    let difficulty_str: String = row.try_get("difficulty").map_err(ser)?;
    let difficulty: Difficulty = difficulty_str.parse().map_err(ser)?;

    let kind_str: String = row.try_get("kind").map_err(ser)?;
    let kind: QuestionKind = kind_str.parse().map_err(ser)?;

    let answers_json: String = row.try_get("incorrect_answers").map_err(ser)?;
    let incorrect_answers = decode_answers(&answers_json)?;

    Question::from_persisted(
        question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get::<String, _>("question").map_err(ser)?,
        row.try_get::<String, _>("correct_answer").map_err(ser)?,
        incorrect_answers,
        row.try_get::<String, _>("category").map_err(ser)?,
        difficulty,
        kind,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_json_roundtrip_preserves_commas() {
        let answers = vec![
            "Paris, France".to_string(),
            "Berlin".to_string(),
        ];
        let encoded = encode_answers(&answers).unwrap();
        let decoded = decode_answers(&encoded).unwrap();
        assert_eq!(decoded, answers);
    }

    #[test]
    fn malformed_answers_json_is_a_serialization_error() {
        let err = decode_answers("not json").unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
