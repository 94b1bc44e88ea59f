//! Error types for variable resolution and parameter access.
//!
//! [`VariableError`] covers every failure of binding a consumer to a
//! field variable and of reading through that binding. Each variant
//! belongs to one [`VariableErrorKind`]; none of them are transient, so
//! callers propagate them rather than retry.

use std::error::Error;
use std::fmt;

use crate::field::{FieldArity, VarKind, VarKindFilter};
use crate::id::ThreadId;

/// Classification of a [`VariableError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariableErrorKind {
    /// The input named no variable, or a variable that does not exist.
    Configuration,
    /// The named variable exists but is not what the consumer expects.
    TypeMismatch,
    /// The accessor has no meaning for the binding's representation.
    UnsupportedOperation,
}

/// Errors from resolving a variable binding or reading through it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VariableError {
    /// Both the single-name and list forms of the parameter are absent
    /// or empty.
    EmptyVariableName {
        /// Name of the object being constructed.
        object: String,
        /// The parameter that was expected to name a variable.
        param: String,
    },
    /// No variable with this name is registered.
    UnknownVariable {
        /// The requested variable name.
        name: String,
        /// Thread whose store was searched.
        thread: ThreadId,
    },
    /// The thread index has no computation context.
    UnknownThread {
        /// The requested thread.
        thread: ThreadId,
        /// Number of thread contexts available.
        n_threads: usize,
    },
    /// A variable with this name is already registered.
    DuplicateVariable {
        /// The conflicting name.
        name: String,
    },
    /// The variable's arity differs from the consumer's.
    ArityMismatch {
        /// Variable name.
        name: String,
        /// Arity the consumer expects.
        expected: FieldArity,
        /// Arity of the registered variable.
        actual: FieldArity,
    },
    /// The variable's system kind is rejected by the consumer's filter.
    KindMismatch {
        /// Variable name.
        name: String,
        /// Kind filter the consumer asked for.
        expected: VarKindFilter,
        /// Kind of the registered variable.
        actual: VarKind,
    },
    /// A binding was attached to another thread's data.
    ThreadMismatch {
        /// Variable name.
        name: String,
        /// Thread captured at binding construction.
        bound: ThreadId,
        /// Thread of the data it was attached to.
        attached: ThreadId,
    },
    /// The accessor is undefined for a nodal binding.
    UndefinedAtNodes {
        /// Accessor that was called.
        accessor: &'static str,
        /// Variable name.
        name: String,
        /// Why the quantity has no nodal meaning.
        reason: &'static str,
    },
}

impl VariableError {
    /// Which class of failure this is.
    pub fn kind(&self) -> VariableErrorKind {
        match self {
            Self::EmptyVariableName { .. }
            | Self::UnknownVariable { .. }
            | Self::UnknownThread { .. }
            | Self::DuplicateVariable { .. } => VariableErrorKind::Configuration,
            Self::ArityMismatch { .. } | Self::KindMismatch { .. } | Self::ThreadMismatch { .. } => {
                VariableErrorKind::TypeMismatch
            }
            Self::UndefinedAtNodes { .. } => VariableErrorKind::UnsupportedOperation,
        }
    }
}

impl fmt::Display for VariableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyVariableName { object, param } => write!(
                f,
                "error constructing object '{object}' while retrieving value for '{param}' \
                 parameter: did you set {param} = '' (empty string) by accident?"
            ),
            Self::UnknownVariable { name, thread } => {
                write!(f, "unknown variable '{name}' on thread {thread}")
            }
            Self::UnknownThread { thread, n_threads } => {
                write!(f, "thread {thread} out of range ({n_threads} thread contexts)")
            }
            Self::DuplicateVariable { name } => {
                write!(f, "variable '{name}' is already registered")
            }
            Self::ArityMismatch {
                name,
                expected,
                actual,
            } => write!(
                f,
                "variable '{name}' is {actual}-valued but a {expected} variable was expected"
            ),
            Self::KindMismatch {
                name,
                expected,
                actual,
            } => write!(
                f,
                "variable '{name}' is {actual} but a {expected} variable was expected"
            ),
            Self::ThreadMismatch {
                name,
                bound,
                attached,
            } => write!(
                f,
                "binding of '{name}' belongs to thread {bound} but was attached to thread {attached}"
            ),
            Self::UndefinedAtNodes {
                accessor,
                name,
                reason,
            } => write!(f, "{accessor}() on nodal variable '{name}': {reason}"),
        }
    }
}

impl Error for VariableError {}

/// Errors from typed parameter access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamError {
    /// The parameter is not set.
    Missing {
        /// Parameter name.
        key: String,
    },
    /// The parameter holds a value of another type.
    WrongType {
        /// Parameter name.
        key: String,
        /// Type the caller asked for.
        expected: &'static str,
        /// Type actually stored.
        found: &'static str,
    },
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { key } => write!(f, "parameter '{key}' is not set"),
            Self::WrongType {
                key,
                expected,
                found,
            } => write!(f, "parameter '{key}' holds a {found}, expected a {expected}"),
        }
    }
}

impl Error for ParamError {}
