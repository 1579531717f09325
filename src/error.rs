//! One error type for callers that do not care which phase failed.

use thiserror::Error;

use textlambda_core::{CompileError, LexError, RegistrationError, RuntimeError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Building the type registry failed.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// The source text did not compile.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// A compiled function failed while running.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl From<LexError> for Error {
    fn from(err: LexError) -> Self {
        Error::Compile(err.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
