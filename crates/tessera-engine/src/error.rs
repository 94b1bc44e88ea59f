//! Runtime errors from problem evaluation.

use std::error::Error;
use std::fmt;

use tessera_bc::BcError;
use tessera_core::{ThreadId, VariableError};
use tessera_postprocessors::PostprocessorError;

use crate::config::ConfigError;

/// Errors from building objects into a [`Problem`](crate::Problem) or
/// evaluating them.
#[derive(Debug, PartialEq)]
pub enum EngineError {
    /// Problem construction failed.
    Config(ConfigError),
    /// A variable lookup failed outside any object.
    Variable(VariableError),
    /// A boundary condition could not be built. The source names the
    /// object where it is known.
    BcConstruction(BcError),
    /// A boundary condition failed during evaluation.
    Bc {
        /// The BC's object name.
        object: String,
        /// The underlying failure.
        source: BcError,
    },
    /// A postprocessor could not be built.
    PostprocessorConstruction(PostprocessorError),
    /// A postprocessor failed during evaluation.
    Postprocessor {
        /// The postprocessor's object name.
        object: String,
        /// The underlying failure.
        source: PostprocessorError,
    },
    /// A worker thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of the failure.
        reason: String,
    },
    /// A worker thread panicked.
    WorkerPanicked {
        /// The thread that panicked.
        thread: ThreadId,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::Variable(e) => write!(f, "variable: {e}"),
            Self::BcConstruction(e) => write!(f, "building boundary condition: {e}"),
            Self::PostprocessorConstruction(e) => write!(f, "building postprocessor: {e}"),
            Self::Bc { object, source } => write!(f, "boundary condition '{object}': {source}"),
            Self::Postprocessor { object, source } => {
                write!(f, "postprocessor '{object}': {source}")
            }
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
            Self::WorkerPanicked { thread } => write!(f, "worker thread {thread} panicked"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Variable(e) => Some(e),
            Self::BcConstruction(e) => Some(e),
            Self::PostprocessorConstruction(e) => Some(e),
            Self::Bc { source, .. } => Some(source),
            Self::Postprocessor { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<VariableError> for EngineError {
    fn from(e: VariableError) -> Self {
        Self::Variable(e)
    }
}
