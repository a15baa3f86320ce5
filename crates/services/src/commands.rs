//! Typed operation surface for the portal.
//!
//! Every UI-facing operation is one closed enum variant with an explicit
//! handler arm in [`dispatch`]; there is no string-path parsing anywhere on
//! the trust boundary.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use exam_core::model::{
    Exam, ExamId, ExamResult, ExamSession, Question, QuestionId, ResultId, SessionId,
    SessionToken, Student,
};

use crate::app_services::AppServices;
use crate::error::CommandError;

/// A portal operation, as issued by a UI shim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    StudentLogin {
        name: String,
        student_number: String,
    },
    ListExams {
        class_level: Option<String>,
    },
    StartSession {
        exam_id: ExamId,
        student_name: String,
        student_number: String,
    },
    LoadSessionQuestions {
        session_id: SessionId,
        token: SessionToken,
    },
    SaveProgress {
        session_id: SessionId,
        token: SessionToken,
        answers: HashMap<QuestionId, String>,
        current_question_index: usize,
    },
    Submit {
        session_id: SessionId,
        token: SessionToken,
        answers: HashMap<QuestionId, String>,
    },
    GetResult {
        result_id: ResultId,
    },
    ResultForSession {
        session_id: SessionId,
    },
    ListResults,
}

/// What a successfully dispatched command hands back.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum CommandOutcome {
    Student(Option<Student>),
    Exams(Vec<Exam>),
    Session(ExamSession),
    Questions(Vec<Question>),
    Saved,
    Result(ExamResult),
    MaybeResult(Option<ExamResult>),
    Results(Vec<ExamResult>),
}

/// Execute one command against the portal services.
///
/// # Errors
///
/// Returns `CommandError` wrapping the failing service's error.
pub async fn dispatch(
    services: &AppServices,
    command: Command,
) -> Result<CommandOutcome, CommandError> {
    match command {
        Command::StudentLogin {
            name,
            student_number,
        } => {
            let student = services
                .students()
                .student_login(&name, &student_number)
                .await?;
            Ok(CommandOutcome::Student(student))
        }
        Command::ListExams { class_level } => {
            let exams = services.exams().list_exams(class_level.as_deref()).await?;
            Ok(CommandOutcome::Exams(exams))
        }
        Command::StartSession {
            exam_id,
            student_name,
            student_number,
        } => {
            let session = services
                .sessions()
                .start_session(exam_id, &student_name, &student_number)
                .await?;
            Ok(CommandOutcome::Session(session))
        }
        Command::LoadSessionQuestions { session_id, token } => {
            let questions = services
                .sessions()
                .session_questions(session_id, token)
                .await?;
            Ok(CommandOutcome::Questions(questions))
        }
        Command::SaveProgress {
            session_id,
            token,
            answers,
            current_question_index,
        } => {
            services
                .sessions()
                .save_progress(session_id, token, answers, current_question_index)
                .await?;
            Ok(CommandOutcome::Saved)
        }
        Command::Submit {
            session_id,
            token,
            answers,
        } => {
            let result = services
                .sessions()
                .submit(session_id, token, answers)
                .await?;
            Ok(CommandOutcome::Result(result))
        }
        Command::GetResult { result_id } => {
            let result = services.results().get_result(result_id).await?;
            Ok(CommandOutcome::MaybeResult(result))
        }
        Command::ResultForSession { session_id } => {
            let result = services.results().result_for_session(session_id).await?;
            Ok(CommandOutcome::MaybeResult(result))
        }
        Command::ListResults => {
            let results = services.results().list_results().await?;
            Ok(CommandOutcome::Results(results))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_carry_a_typed_op_tag() {
        let command = Command::StartSession {
            exam_id: ExamId::new(),
            student_name: "Ada Obi".to_string(),
            student_number: "STU-001".to_string(),
        };

        let json = serde_json::to_string(&command).unwrap();
        assert!(json.contains("\"op\":\"start_session\""));

        let parsed: Command = serde_json::from_str(&json).unwrap();
        assert!(matches!(parsed, Command::StartSession { .. }));

        // an unknown op is rejected at parse time, not at dispatch
        assert!(serde_json::from_str::<Command>(r#"{"op":"drop_tables"}"#).is_err());
    }
}
