//! Error type for postprocessor construction and evaluation.

use std::error::Error;
use std::fmt;

use tessera_core::{ParamError, VariableError};

/// Errors from building or evaluating a postprocessor.
#[derive(Clone, Debug, PartialEq)]
pub enum PostprocessorError {
    /// Binding the postprocessor's variable failed.
    Variable(VariableError),
    /// A parameter is missing or has the wrong type.
    Param(ParamError),
    /// The `boundary` parameter names no boundary.
    MissingBoundary {
        /// Name of the object being constructed.
        object: String,
    },
    /// A boundary name is not in the mesh's table.
    UnknownBoundary {
        /// Name of the object being constructed.
        object: String,
        /// The unresolved boundary name.
        boundary: String,
    },
    /// Face quadrature arrays and variable data disagree in length.
    InconsistentQuadrature {
        /// Name of the postprocessor.
        object: String,
        /// Quadrature points on the side.
        n_qp: usize,
        /// Values available from the variable.
        available: usize,
    },
    /// An average was requested over sides of zero total measure.
    ZeroMeasure {
        /// Name of the postprocessor.
        object: String,
    },
}

impl fmt::Display for PostprocessorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(e) => write!(f, "variable binding failed: {e}"),
            Self::Param(e) => write!(f, "parameter error: {e}"),
            Self::MissingBoundary { object } => {
                write!(f, "'{object}' does not name a boundary")
            }
            Self::UnknownBoundary { object, boundary } => {
                write!(f, "'{object}' names unknown boundary '{boundary}'")
            }
            Self::InconsistentQuadrature {
                object,
                n_qp,
                available,
            } => write!(
                f,
                "'{object}': side has {n_qp} quadrature points but {available} values"
            ),
            Self::ZeroMeasure { object } => {
                write!(f, "'{object}': integrated sides have zero measure")
            }
        }
    }
}

impl Error for PostprocessorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Variable(e) => Some(e),
            Self::Param(e) => Some(e),
            _ => None,
        }
    }
}

impl From<VariableError> for PostprocessorError {
    fn from(e: VariableError) -> Self {
        Self::Variable(e)
    }
}

impl From<ParamError> for PostprocessorError {
    fn from(e: ParamError) -> Self {
        Self::Param(e)
    }
}
