//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `TvError` as one
//! variant.  Contention is deliberately absent: a failed acquisition is
//! ordinary simulated state, not an error.

use thiserror::Error;

use crate::ThreadId;

/// The top-level error type for `tv-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum TvError {
    #[error("thread {0} not found")]
    ThreadNotFound(ThreadId),

    /// Invalid or out-of-range setup values.  Returned before any entity is
    /// constructed.
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

/// A broken structural invariant of the simulated world.
///
/// Never a recoverable runtime path: the step engine treats it as a fatal
/// assertion in debug builds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invariant violated: {0}")]
pub struct InvariantViolation(pub String);

/// Shorthand result type for all `tv-*` crates.
pub type TvResult<T> = Result<T, TvError>;
