//! Error type for boundary-condition construction and evaluation.

use std::error::Error;
use std::fmt;

use tessera_core::{NodeId, ParamError, VariableError};

/// Errors from building or evaluating a boundary condition.
#[derive(Clone, Debug, PartialEq)]
pub enum BcError {
    /// Binding the BC's variable (or a coupled / save-in variable) failed.
    Variable(VariableError),
    /// A required parameter is missing or has the wrong type.
    Param(ParamError),
    /// The `boundary` parameter names no boundary.
    MissingBoundary {
        /// Name of the object being constructed.
        object: String,
    },
    /// The `boundary` parameter names a boundary the mesh does not have.
    UnknownBoundary {
        /// Name of the object being constructed.
        object: String,
        /// The unresolved boundary name.
        boundary: String,
    },
    /// The variable has no degree of freedom at the current node.
    NoDofAtNode {
        /// Variable name.
        variable: String,
        /// The node being processed.
        node: NodeId,
    },
    /// A parameter value is out of its valid range.
    InvalidParameter {
        /// Name of the object being constructed.
        object: String,
        /// Offending parameter.
        param: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl fmt::Display for BcError {
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
            Self::NoDofAtNode { variable, node } => {
                write!(f, "variable '{variable}' has no dof at node {node}")
            }
            Self::InvalidParameter {
                object,
                param,
                reason,
            } => write!(f, "'{object}' parameter '{param}': {reason}"),
        }
    }
}

impl Error for BcError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Variable(e) => Some(e),
            Self::Param(e) => Some(e),
            _ => None,
        }
    }
}

impl From<VariableError> for BcError {
    fn from(e: VariableError) -> Self {
        Self::Variable(e)
    }
}

impl From<ParamError> for BcError {
    fn from(e: ParamError) -> Self {
        Self::Param(e)
    }
}
