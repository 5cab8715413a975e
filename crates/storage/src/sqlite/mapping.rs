use sqlx::Row;
use std::collections::BTreeMap;

use quiz_core::model::{
    AnswerRecord, ExamKey, ExamSelector, Question, QuestionId, Scope, Snapshot, WorkingQuestion,
};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn selector_from_str(s: &str) -> Result<ExamSelector, StorageError> {
    s.parse::<ExamSelector>()
        .map_err(|_| StorageError::Serialization(format!("invalid selector: {s}")))
}

pub(crate) fn question_id_to_i64(id: QuestionId) -> Result<i64, StorageError> {
    i64::try_from(id.value())
        .map_err(|_| StorageError::Serialization("question_id overflow".into()))
}

/// Working set and answers are stored as JSON columns; the snapshot is the
/// persisted contract, so serde carries the mapping.
pub(crate) fn map_snapshot_row(row: &sqlx::sqlite::SqliteRow) -> Result<Snapshot, StorageError> {
    let working_set_json: String = row.try_get("working_set").map_err(ser)?;
    let working_set: Vec<WorkingQuestion> =
        serde_json::from_str(&working_set_json).map_err(ser)?;

    let answers_json: String = row.try_get("answers").map_err(ser)?;
    let answers: BTreeMap<QuestionId, AnswerRecord> =
        serde_json::from_str(&answers_json).map_err(ser)?;

    let cursor_i64: i64 = row.try_get("cursor").map_err(ser)?;
    let cursor = usize::try_from(cursor_i64)
        .map_err(|_| StorageError::Serialization(format!("invalid cursor: {cursor_i64}")))?;

    Ok(Snapshot {
        working_set,
        cursor,
        answers,
        started_at: row.try_get("started_at").map_err(ser)?,
        last_updated_at: row.try_get("last_updated_at").map_err(ser)?,
    })
}

pub(crate) fn map_key_row(row: &sqlx::sqlite::SqliteRow) -> Result<ExamKey, StorageError> {
    let category: String = row.try_get("category").map_err(ser)?;
    let subcategory: String = row.try_get("subcategory").map_err(ser)?;
    let selector_str: String = row.try_get("selector").map_err(ser)?;
    Ok(ExamKey::new(
        Scope::new(category, subcategory),
        selector_from_str(&selector_str)?,
    ))
}

pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StorageError> {
    let question_json: String = row.try_get("question").map_err(ser)?;
    serde_json::from_str(&question_json).map_err(ser)
}

pub(crate) fn snapshot_columns(
    snapshot: &Snapshot,
) -> Result<(String, i64, String), StorageError> {
    let working_set = serde_json::to_string(&snapshot.working_set).map_err(ser)?;
    let answers = serde_json::to_string(&snapshot.answers).map_err(ser)?;
    let cursor = i64::try_from(snapshot.cursor)
        .map_err(|_| StorageError::Serialization("cursor overflow".into()))?;
    Ok((working_set, cursor, answers))
}
