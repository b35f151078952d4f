use thiserror::Error;

use crate::model::{AttemptError, LevelError, QuestionError};
use crate::params::ParamsError;
use crate::rational::RationalError;
use crate::settings::SettingsError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Rational(#[from] RationalError),
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    Params(#[from] ParamsError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Question(#[from] QuestionError),
}
