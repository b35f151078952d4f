mod progress;
mod session;
mod workflow;

// Public API of the practice subsystem.
pub use crate::error::{PracticeError, TestSessionError};
pub use progress::TestProgress;
pub use session::TestSession;
pub use workflow::{AnswerResult, CompletedTest, PracticeService};
