use std::collections::HashMap;
use uuid::Uuid;

use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use exam_core::model::{
    AdminUser, Exam, ExamId, ExamResult, ExamSession, Question, QuestionId, ResultId, SessionId,
    SessionToken, Student, StudentId, UserId,
};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Map an sqlx error onto the storage taxonomy. Unique-constraint hits
/// become `Conflict`; everything else is a connection failure.
pub(crate) fn map_sqlx_err(e: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db) = &e {
        if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) {
            return StorageError::Conflict;
        }
    }
    StorageError::Connection(e.to_string())
}

fn uuid_field(field: &'static str, value: &str) -> Result<Uuid, StorageError> {
    Uuid::parse_str(value)
        .map_err(|_| StorageError::Serialization(format!("invalid {field}: {value}")))
}

pub(crate) fn question_id_from_str(value: &str) -> Result<QuestionId, StorageError> {
    uuid_field("question_id", value).map(QuestionId::from_uuid)
}

pub(crate) fn exam_id_from_str(value: &str) -> Result<ExamId, StorageError> {
    uuid_field("exam_id", value).map(ExamId::from_uuid)
}

pub(crate) fn session_id_from_str(value: &str) -> Result<SessionId, StorageError> {
    uuid_field("session_id", value).map(SessionId::from_uuid)
}

pub(crate) fn result_id_from_str(value: &str) -> Result<ResultId, StorageError> {
    uuid_field("result_id", value).map(ResultId::from_uuid)
}

pub(crate) fn student_id_from_str(value: &str) -> Result<StudentId, StorageError> {
    uuid_field("student_id", value).map(StudentId::from_uuid)
}

pub(crate) fn user_id_from_str(value: &str) -> Result<UserId, StorageError> {
    uuid_field("user_id", value).map(UserId::from_uuid)
}

pub(crate) fn token_from_str(value: &str) -> Result<SessionToken, StorageError> {
    uuid_field("token", value).map(SessionToken::from_uuid)
}

// JSON-encoded collection columns.

pub(crate) fn question_ids_to_json(ids: &[QuestionId]) -> Result<String, StorageError> {
    serde_json::to_string(ids).map_err(ser)
}

pub(crate) fn question_ids_from_json(raw: &str) -> Result<Vec<QuestionId>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn options_to_json(options: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(options).map_err(ser)
}

pub(crate) fn answers_to_json(
    answers: &HashMap<QuestionId, String>,
) -> Result<String, StorageError> {
    serde_json::to_string(answers).map_err(ser)
}

pub(crate) fn answers_from_json(raw: &str) -> Result<HashMap<QuestionId, String>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn correct_to_json(
    correct: &HashMap<QuestionId, bool>,
) -> Result<String, StorageError> {
    serde_json::to_string(correct).map_err(ser)
}

pub(crate) fn correct_from_json(raw: &str) -> Result<HashMap<QuestionId, bool>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

// Row mappers.

pub(crate) fn map_question_row(row: &SqliteRow) -> Result<Question, StorageError> {
    let id = question_id_from_str(&row.try_get::<String, _>("id").map_err(ser)?)?;
    let options: Vec<String> =
        serde_json::from_str(&row.try_get::<String, _>("options").map_err(ser)?).map_err(ser)?;

    // a stored point value that is out of range falls back to 1
    let points_raw: i64 = row.try_get("points").map_err(ser)?;
    let points = u32::try_from(points_raw).ok().filter(|p| *p > 0).unwrap_or(1);

    Question::from_persisted(
        id,
        row.try_get("subject").map_err(ser)?,
        row.try_get("class_level").map_err(ser)?,
        row.try_get("prompt").map_err(ser)?,
        options,
        row.try_get("correct_answer").map_err(ser)?,
        points,
    )
    .map_err(ser)
}

pub(crate) fn map_exam_row(row: &SqliteRow) -> Result<Exam, StorageError> {
    let id = exam_id_from_str(&row.try_get::<String, _>("id").map_err(ser)?)?;
    let question_ids =
        question_ids_from_json(&row.try_get::<String, _>("question_ids").map_err(ser)?)?;

    let display_raw: Option<i64> = row.try_get("questions_to_display").map_err(ser)?;
    let questions_to_display = display_raw.and_then(|n| u32::try_from(n).ok()).filter(|n| *n > 0);

    let duration_raw: i64 = row.try_get("duration_mins").map_err(ser)?;
    let duration_mins = u32::try_from(duration_raw)
        .map_err(|_| StorageError::Serialization(format!("invalid duration_mins: {duration_raw}")))?;

    let passing_raw: i64 = row.try_get("passing_score").map_err(ser)?;
    let passing_score = u8::try_from(passing_raw)
        .map_err(|_| StorageError::Serialization(format!("invalid passing_score: {passing_raw}")))?;

    let total_raw: i64 = row.try_get("total_points").map_err(ser)?;
    let total_points = u32::try_from(total_raw)
        .map_err(|_| StorageError::Serialization(format!("invalid total_points: {total_raw}")))?;

    Exam::from_persisted(
        id,
        row.try_get("title").map_err(ser)?,
        row.try_get("class_level").map_err(ser)?,
        row.try_get("subject").map_err(ser)?,
        question_ids,
        questions_to_display,
        duration_mins,
        passing_score,
        total_points,
        row.try_get("is_active").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_session_row(row: &SqliteRow) -> Result<ExamSession, StorageError> {
    let id = session_id_from_str(&row.try_get::<String, _>("id").map_err(ser)?)?;
    let exam_id = exam_id_from_str(&row.try_get::<String, _>("exam_id").map_err(ser)?)?;
    let token = token_from_str(&row.try_get::<String, _>("token").map_err(ser)?)?;
    let question_ids =
        question_ids_from_json(&row.try_get::<String, _>("question_ids").map_err(ser)?)?;
    let answers = answers_from_json(&row.try_get::<String, _>("answers").map_err(ser)?)?;

    let index_raw: i64 = row.try_get("current_question_index").map_err(ser)?;
    let current_question_index = usize::try_from(index_raw).map_err(|_| {
        StorageError::Serialization(format!("invalid current_question_index: {index_raw}"))
    })?;

    ExamSession::from_persisted(
        id,
        exam_id,
        row.try_get("student_name").map_err(ser)?,
        row.try_get("student_number").map_err(ser)?,
        token,
        question_ids,
        answers,
        current_question_index,
        row.try_get("started_at").map_err(ser)?,
        row.try_get("ended_at").map_err(ser)?,
        row.try_get("is_completed").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_result_row(row: &SqliteRow) -> Result<ExamResult, StorageError> {
    let id = result_id_from_str(&row.try_get::<String, _>("id").map_err(ser)?)?;
    let session_id = session_id_from_str(&row.try_get::<String, _>("session_id").map_err(ser)?)?;
    let exam_id = exam_id_from_str(&row.try_get::<String, _>("exam_id").map_err(ser)?)?;
    let answers = answers_from_json(&row.try_get::<String, _>("answers").map_err(ser)?)?;
    let correct = correct_from_json(&row.try_get::<String, _>("correct").map_err(ser)?)?;

    let score_raw: i64 = row.try_get("score").map_err(ser)?;
    let score = u32::try_from(score_raw)
        .map_err(|_| StorageError::Serialization(format!("invalid score: {score_raw}")))?;

    let total_raw: i64 = row.try_get("total_points").map_err(ser)?;
    let total_points = u32::try_from(total_raw)
        .map_err(|_| StorageError::Serialization(format!("invalid total_points: {total_raw}")))?;

    let pct_raw: i64 = row.try_get("percentage").map_err(ser)?;
    let percentage = u8::try_from(pct_raw)
        .map_err(|_| StorageError::Serialization(format!("invalid percentage: {pct_raw}")))?;

    ExamResult::from_persisted(
        id,
        session_id,
        exam_id,
        row.try_get("student_name").map_err(ser)?,
        row.try_get("student_number").map_err(ser)?,
        score,
        total_points,
        percentage,
        row.try_get("passed").map_err(ser)?,
        answers,
        correct,
        row.try_get("completed_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_student_row(row: &SqliteRow) -> Result<Student, StorageError> {
    let id = student_id_from_str(&row.try_get::<String, _>("id").map_err(ser)?)?;
    Student::new(
        id,
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get::<String, _>("student_number").map_err(ser)?,
        row.try_get::<String, _>("class_level").map_err(ser)?,
        row.try_get("sex").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_user_row(row: &SqliteRow) -> Result<AdminUser, StorageError> {
    let id = user_id_from_str(&row.try_get::<String, _>("id").map_err(ser)?)?;
    AdminUser::new(
        id,
        row.try_get::<String, _>("username").map_err(ser)?,
        row.try_get::<String, _>("password_hash").map_err(ser)?,
    )
    .map_err(ser)
}
