#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth_service;
pub mod commands;
pub mod error;
pub mod exam_service;
pub mod question_service;
pub mod results_service;
pub mod sessions;
pub mod student_service;

pub use exam_core::Clock;

pub use app_services::AppServices;
pub use auth_service::AuthService;
pub use commands::{Command, CommandOutcome, dispatch};
pub use error::{
    AppServicesError, AuthError, CommandError, ExamAdminError, QuestionBankError, RosterError,
    SessionFlowError,
};
pub use exam_service::{ExamDraft, ExamService};
pub use question_service::{QuestionDraft, QuestionService};
pub use results_service::ResultsService;
pub use sessions::{ExamSessionService, draw_question_set};
pub use student_service::{StudentDraft, StudentService};
