mod exam;
mod ids;
mod question;
mod result;
mod session;
mod student;
mod user;

pub use ids::{
    ExamId, ParseIdError, QuestionId, ResultId, SessionId, SessionToken, StudentId, UserId,
};

pub use exam::{Exam, ExamError};
pub use question::{Question, QuestionError};
pub use result::{ExamResult, ResultError};
pub use session::{ExamSession, SessionError};
pub use student::{Student, StudentError};
pub use user::{AdminUser, UserError};
