use std::collections::{HashMap, HashSet};

use exam_core::model::{ExamId, QuestionId, SessionId, SessionToken};
use exam_core::time::fixed_clock;
use services::{
    AppServices, Command, CommandOutcome, ExamDraft, QuestionDraft, SessionFlowError, dispatch,
};

async fn portal() -> AppServices {
    AppServices::in_memory(fixed_clock()).await.unwrap()
}

fn question_draft(subject: &str, class_level: &str, correct: &str, points: u32) -> QuestionDraft {
    QuestionDraft {
        subject: subject.to_string(),
        class_level: class_level.to_string(),
        prompt: format!("{subject} question worth {points}"),
        options: Vec::new(),
        correct_answer: correct.to_string(),
        points: Some(points),
    }
}

fn exam_draft(pool: Vec<QuestionId>, display: Option<u32>, passing_score: u8) -> ExamDraft {
    ExamDraft {
        title: "First Term Geography".to_string(),
        class_level: "JSS1".to_string(),
        subject: Some("Geography".to_string()),
        question_ids: pool,
        questions_to_display: display,
        duration_mins: 30,
        passing_score,
    }
}

/// Seeds the Paris/7 two-question exam and returns (portal, q1, q2, exam id).
async fn seed_two_question_exam() -> (AppServices, QuestionId, QuestionId, ExamId) {
    let portal = portal().await;
    let q1 = portal
        .questions()
        .add_question(question_draft("Geography", "JSS1", "Paris", 2))
        .await
        .unwrap()
        .id();
    let q2 = portal
        .questions()
        .add_question(question_draft("Maths", "JSS1", "7", 3))
        .await
        .unwrap()
        .id();
    let exam = portal
        .exams()
        .create_exam(exam_draft(vec![q1, q2], None, 50))
        .await
        .unwrap();
    assert_eq!(exam.total_points(), 5);
    (portal, q1, q2, exam.id())
}

#[tokio::test]
async fn partial_credit_submission_and_idempotent_resubmit() {
    let (portal, q1, q2, exam_id) = seed_two_question_exam().await;
    let sessions = portal.sessions();

    let session = sessions
        .start_session(exam_id, "Ada Obi", "STU-001")
        .await
        .unwrap();
    assert_eq!(session.question_ids().len(), 2);
    assert!(!session.is_completed());

    let mut answers = HashMap::new();
    answers.insert(q1, "paris".to_string());
    answers.insert(q2, "8".to_string());

    let result = sessions
        .submit(session.id(), session.token(), answers)
        .await
        .unwrap();
    assert_eq!(result.score(), 2);
    assert_eq!(result.total_points(), 5);
    assert_eq!(result.percentage(), 40);
    assert!(!result.passed());
    assert_eq!(result.correct().get(&q1), Some(&true));
    assert_eq!(result.correct().get(&q2), Some(&false));

    // a retried submission with different (now perfect) answers must hand
    // back the stored result unchanged
    let mut better = HashMap::new();
    better.insert(q1, "Paris".to_string());
    better.insert(q2, "7".to_string());

    let replay = sessions
        .submit(session.id(), session.token(), better)
        .await
        .unwrap();
    assert_eq!(replay.id(), result.id());
    assert_eq!(replay.score(), 2);
    assert_eq!(replay.percentage(), 40);

    let stored = portal
        .results()
        .result_for_session(session.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.id(), result.id());
}

#[tokio::test]
async fn correct_answers_earn_full_marks() {
    let (portal, q1, q2, exam_id) = seed_two_question_exam().await;
    let sessions = portal.sessions();

    let session = sessions
        .start_session(exam_id, "Ngozi Eze", "STU-002")
        .await
        .unwrap();

    let mut answers = HashMap::new();
    answers.insert(q1, "Paris".to_string());
    answers.insert(q2, "7".to_string());

    let result = sessions
        .submit(session.id(), session.token(), answers)
        .await
        .unwrap();
    assert_eq!(result.score(), 5);
    assert_eq!(result.total_points(), 5);
    assert_eq!(result.percentage(), 100);
    assert!(result.passed());
}

#[tokio::test]
async fn display_cap_draws_a_subset_of_the_pool() {
    let portal = portal().await;

    let mut pool = Vec::new();
    for i in 0..10 {
        let q = portal
            .questions()
            .add_question(question_draft("Geography", "JSS1", &format!("A{i}"), 1))
            .await
            .unwrap();
        pool.push(q.id());
    }
    let exam = portal
        .exams()
        .create_exam(exam_draft(pool.clone(), Some(4), 50))
        .await
        .unwrap();

    let session = portal
        .sessions()
        .start_session(exam.id(), "Ada Obi", "STU-001")
        .await
        .unwrap();

    assert_eq!(session.question_ids().len(), 4);
    let pool_set: HashSet<_> = pool.into_iter().collect();
    let drawn: HashSet<_> = session.question_ids().iter().copied().collect();
    assert_eq!(drawn.len(), 4, "no duplicates in the draw");
    assert!(drawn.is_subset(&pool_set));
}

#[tokio::test]
async fn deleted_question_neither_scores_nor_penalizes() {
    let (portal, q1, q2, exam_id) = seed_two_question_exam().await;
    let sessions = portal.sessions();

    let session = sessions
        .start_session(exam_id, "Ada Obi", "STU-001")
        .await
        .unwrap();

    // the 3-point question disappears from the bank mid-session
    portal.questions().remove_question(q2).await.unwrap();

    let mut answers = HashMap::new();
    answers.insert(q1, "Paris".to_string());
    answers.insert(q2, "7".to_string());

    let result = sessions
        .submit(session.id(), session.token(), answers)
        .await
        .unwrap();
    assert_eq!(result.score(), 2);
    assert_eq!(result.total_points(), 2);
    assert_eq!(result.percentage(), 100);
    assert!(result.passed());
    assert!(!result.correct().contains_key(&q2));
}

#[tokio::test]
async fn empty_pool_grades_to_zero() {
    let portal = portal().await;

    let exam = portal
        .exams()
        .create_exam(exam_draft(Vec::new(), None, 50))
        .await
        .unwrap();
    let session = portal
        .sessions()
        .start_session(exam.id(), "Ada Obi", "STU-001")
        .await
        .unwrap();
    assert!(session.question_ids().is_empty());

    let result = portal
        .sessions()
        .submit(session.id(), session.token(), HashMap::new())
        .await
        .unwrap();
    assert_eq!(result.total_points(), 0);
    assert_eq!(result.percentage(), 0);
    assert!(!result.passed());

    // with a zero threshold the same degenerate exam passes
    let lenient = portal
        .exams()
        .create_exam(exam_draft(Vec::new(), None, 0))
        .await
        .unwrap();
    let session = portal
        .sessions()
        .start_session(lenient.id(), "Ada Obi", "STU-001")
        .await
        .unwrap();
    let result = portal
        .sessions()
        .submit(session.id(), session.token(), HashMap::new())
        .await
        .unwrap();
    assert!(result.passed());
}

#[tokio::test]
async fn token_mismatch_is_rejected() {
    let (portal, _q1, _q2, exam_id) = seed_two_question_exam().await;
    let sessions = portal.sessions();

    let session = sessions
        .start_session(exam_id, "Ada Obi", "STU-001")
        .await
        .unwrap();

    let err = sessions
        .submit(session.id(), SessionToken::new(), HashMap::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SessionFlowError::InvalidToken));

    let err = sessions
        .save_progress(session.id(), SessionToken::new(), HashMap::new(), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionFlowError::InvalidToken));

    // the real token still works afterwards
    sessions
        .save_progress(session.id(), session.token(), HashMap::new(), 1)
        .await
        .unwrap();
}

#[tokio::test]
async fn progress_autosave_stops_at_completion() {
    let (portal, q1, _q2, exam_id) = seed_two_question_exam().await;
    let sessions = portal.sessions();

    let session = sessions
        .start_session(exam_id, "Ada Obi", "STU-001")
        .await
        .unwrap();

    let mut partial = HashMap::new();
    partial.insert(q1, "Paris".to_string());
    sessions
        .save_progress(session.id(), session.token(), partial.clone(), 1)
        .await
        .unwrap();

    let questions = sessions
        .session_questions(session.id(), session.token())
        .await
        .unwrap();
    assert_eq!(questions.len(), 2);

    sessions
        .submit(session.id(), session.token(), partial)
        .await
        .unwrap();

    let err = sessions
        .save_progress(session.id(), session.token(), HashMap::new(), 0)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionFlowError::Session(exam_core::model::SessionError::AlreadyCompleted)
    ));
}

#[tokio::test]
async fn missing_exam_and_session_are_fatal() {
    let portal = portal().await;
    let sessions = portal.sessions();

    let err = sessions
        .start_session(ExamId::new(), "Ada Obi", "STU-001")
        .await
        .unwrap_err();
    assert!(matches!(err, SessionFlowError::ExamNotFound(_)));

    let err = sessions
        .submit(SessionId::new(), SessionToken::new(), HashMap::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SessionFlowError::SessionNotFound(_)));
}

#[tokio::test]
async fn exam_pool_builds_itself_from_bank_filters() {
    let portal = portal().await;
    let questions = portal.questions();

    let geo1 = questions
        .add_question(question_draft("Geography", "JSS1", "Paris", 2))
        .await
        .unwrap()
        .id();
    let geo2 = questions
        .add_question(question_draft("Geography", "JSS1", "Nile", 3))
        .await
        .unwrap()
        .id();
    // different subject and different class level stay out of the pool
    questions
        .add_question(question_draft("English", "JSS1", "Noun", 1))
        .await
        .unwrap();
    questions
        .add_question(question_draft("Geography", "JSS2", "Lagos", 1))
        .await
        .unwrap();

    let exam = portal
        .exams()
        .create_exam(exam_draft(Vec::new(), Some(1), 50))
        .await
        .unwrap();

    let pool: HashSet<_> = exam.question_ids().iter().copied().collect();
    assert_eq!(pool, HashSet::from([geo1, geo2]));
    assert_eq!(exam.total_points(), 5);

    let session = portal
        .sessions()
        .start_session(exam.id(), "Ada Obi", "STU-001")
        .await
        .unwrap();
    assert_eq!(session.question_ids().len(), 1);
}

#[tokio::test]
async fn commands_drive_the_whole_student_flow() {
    let (portal, q1, q2, exam_id) = seed_two_question_exam().await;

    portal
        .students()
        .add_student(services::StudentDraft {
            name: "Ada Obi".to_string(),
            student_number: "STU-001".to_string(),
            class_level: "JSS1".to_string(),
            sex: None,
        })
        .await
        .unwrap();

    let outcome = dispatch(
        &portal,
        Command::StudentLogin {
            name: " ada obi ".to_string(),
            student_number: "stu-001".to_string(),
        },
    )
    .await
    .unwrap();
    let CommandOutcome::Student(Some(student)) = outcome else {
        panic!("expected a roster match");
    };
    assert_eq!(student.name(), "Ada Obi");

    let outcome = dispatch(
        &portal,
        Command::ListExams {
            class_level: Some("JSS1".to_string()),
        },
    )
    .await
    .unwrap();
    let CommandOutcome::Exams(exams) = outcome else {
        panic!("expected the exam list");
    };
    assert_eq!(exams.len(), 1);

    let outcome = dispatch(
        &portal,
        Command::StartSession {
            exam_id,
            student_name: "Ada Obi".to_string(),
            student_number: "STU-001".to_string(),
        },
    )
    .await
    .unwrap();
    let CommandOutcome::Session(session) = outcome else {
        panic!("expected a session");
    };

    let outcome = dispatch(
        &portal,
        Command::LoadSessionQuestions {
            session_id: session.id(),
            token: session.token(),
        },
    )
    .await
    .unwrap();
    let CommandOutcome::Questions(questions) = outcome else {
        panic!("expected the session questions");
    };
    assert_eq!(questions.len(), 2);

    let mut answers = HashMap::new();
    answers.insert(q1, "Paris".to_string());
    answers.insert(q2, "7".to_string());

    let outcome = dispatch(
        &portal,
        Command::Submit {
            session_id: session.id(),
            token: session.token(),
            answers,
        },
    )
    .await
    .unwrap();
    let CommandOutcome::Result(result) = outcome else {
        panic!("expected a graded result");
    };
    assert_eq!(result.percentage(), 100);

    let outcome = dispatch(
        &portal,
        Command::ResultForSession {
            session_id: session.id(),
        },
    )
    .await
    .unwrap();
    let CommandOutcome::MaybeResult(Some(stored)) = outcome else {
        panic!("expected the stored result");
    };
    assert_eq!(stored.id(), result.id());
}
