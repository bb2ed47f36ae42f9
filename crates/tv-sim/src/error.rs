use thiserror::Error;
use tv_core::TvError;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Core(#[from] TvError),

    #[error("session {0} has already been started; reset it to run again")]
    AlreadyStarted(Uuid),
}

pub type SimResult<T> = Result<T, SimError>;
