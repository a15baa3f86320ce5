use std::collections::HashMap;
use std::sync::Arc;

use exam_core::model::{Exam, ExamId, ExamSession, Question, QuestionId, SessionId, SessionToken};
use exam_core::time::{fixed_clock, fixed_now};
use services::{ExamSessionService, SessionFlowError};
use storage::repository::{
    ExamRepository, InMemoryRepository, QuestionRepository, SessionRepository, StorageError,
};

fn build_exam(pool: Vec<QuestionId>, total_points: u32) -> Exam {
    Exam::new(
        ExamId::new(),
        "First Term Geography",
        "JSS1",
        None,
        pool,
        None,
        30,
        50,
        total_points,
        fixed_now(),
    )
    .unwrap()
}

fn service_over(repo: &InMemoryRepository, sessions: Arc<dyn SessionRepository>) -> ExamSessionService {
    ExamSessionService::new(
        fixed_clock(),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
        sessions,
        Arc::new(repo.clone()),
    )
}

/// A session store whose writes are refused, the way a misconfigured
/// backend rule set refuses them.
struct DenyingSessions;

#[async_trait::async_trait]
impl SessionRepository for DenyingSessions {
    async fn insert_session(&self, _session: &ExamSession) -> Result<(), StorageError> {
        Err(StorageError::PermissionDenied)
    }

    async fn get_session(&self, _id: SessionId) -> Result<Option<ExamSession>, StorageError> {
        Ok(None)
    }

    async fn update_session(&self, _session: &ExamSession) -> Result<(), StorageError> {
        Err(StorageError::PermissionDenied)
    }
}

#[tokio::test]
async fn refused_session_write_reads_as_not_authorized() {
    let repo = InMemoryRepository::new();
    let exam = build_exam(vec![QuestionId::new()], 1);
    repo.insert_exam(&exam).await.unwrap();

    let service = service_over(&repo, Arc::new(DenyingSessions));

    let err = service
        .start_session(exam.id(), "Ada Obi", "STU-001")
        .await
        .unwrap_err();
    assert!(matches!(err, SessionFlowError::NotAuthorized));
}

#[tokio::test]
async fn fresh_session_has_the_full_exam_clock() {
    let repo = InMemoryRepository::new();
    let exam = build_exam(vec![QuestionId::new()], 1);
    repo.insert_exam(&exam).await.unwrap();

    let service = service_over(&repo, Arc::new(repo.clone()));

    let session = service
        .start_session(exam.id(), "Ada Obi", "STU-001")
        .await
        .unwrap();

    let remaining = service
        .time_remaining(session.id(), session.token())
        .await
        .unwrap();
    assert_eq!(remaining, chrono::Duration::minutes(30));
}

#[tokio::test]
async fn submission_grades_against_the_pool_when_the_draw_is_empty() {
    // sessions persisted before sampling existed carry no drawn subset;
    // grading falls back to the exam's full pool
    let repo = InMemoryRepository::new();

    let question = Question::new(
        QuestionId::new(),
        "Geography",
        "JSS1",
        "Capital of France?",
        Vec::new(),
        "Paris",
        Some(2),
    )
    .unwrap();
    repo.insert_question(&question).await.unwrap();

    let exam = build_exam(vec![question.id()], 2);
    repo.insert_exam(&exam).await.unwrap();

    let legacy = ExamSession::new(
        SessionId::new(),
        exam.id(),
        "Ada Obi",
        "STU-001",
        SessionToken::new(),
        Vec::new(),
        fixed_now(),
    )
    .unwrap();
    repo.insert_session(&legacy).await.unwrap();

    let service = service_over(&repo, Arc::new(repo.clone()));

    let mut answers = HashMap::new();
    answers.insert(question.id(), "paris".to_string());

    let result = service
        .submit(legacy.id(), legacy.token(), answers)
        .await
        .unwrap();
    assert_eq!(result.score(), 2);
    assert_eq!(result.total_points(), 2);
    assert!(result.passed());
}
