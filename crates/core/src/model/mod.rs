mod attempt;
mod ids;
mod level;
mod progress;
mod question;

pub use ids::{AttemptId, ParseIdError, QuestionId};
pub use level::{Level, LevelError};

pub use attempt::{AnsweredQuestion, AttemptError, TestAttempt};
pub use progress::{LearnerProgress, RECENT_RESULTS_KEPT, RecentResult};
pub use question::{Operation, Question, QuestionError, QuestionKind, Value};
