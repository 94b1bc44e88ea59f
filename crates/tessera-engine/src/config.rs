//! Problem configuration, validation, and error types.
//!
//! [`ProblemConfig`] is the input for constructing a
//! [`Problem`](crate::Problem). [`validate()`](ProblemConfig::validate)
//! checks structural invariants before anything is allocated.

use std::collections::HashSet;
use std::error::Error;
use std::fmt;

use tessera_core::{VariableDef, VariableError};

/// Upper bound on worker threads.
pub const MAX_THREADS: usize = 64;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`ProblemConfig::validate()`] and problem
/// construction.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// No variables declared.
    NoVariables,
    /// A variable definition failed validation.
    InvalidVariable {
        /// Description of the validation failure.
        reason: String,
    },
    /// Two variables share a name.
    DuplicateVariable {
        /// The repeated name.
        name: String,
    },
    /// A boundary name is empty or blank.
    EmptyBoundaryName,
    /// Two boundaries share a name.
    DuplicateBoundary {
        /// The repeated name.
        name: String,
    },
    /// More boundaries than boundary IDs can address.
    TooManyBoundaries {
        /// Number of boundaries declared.
        count: usize,
    },
    /// Registering a variable with the subproblem failed.
    Variable(VariableError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoVariables => write!(f, "no variables declared"),
            Self::InvalidVariable { reason } => write!(f, "invalid variable: {reason}"),
            Self::DuplicateVariable { name } => {
                write!(f, "variable '{name}' is declared more than once")
            }
            Self::EmptyBoundaryName => write!(f, "boundary names must not be empty"),
            Self::DuplicateBoundary { name } => {
                write!(f, "boundary '{name}' is declared more than once")
            }
            Self::TooManyBoundaries { count } => {
                write!(f, "{count} boundaries exceed the limit of {}", u16::MAX)
            }
            Self::Variable(e) => write!(f, "variable registration: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Variable(e) => Some(e),
            _ => None,
        }
    }
}

impl From<VariableError> for ConfigError {
    fn from(e: VariableError) -> Self {
        Self::Variable(e)
    }
}

// ── ProblemConfig ──────────────────────────────────────────────────

/// Complete configuration for constructing a [`Problem`](crate::Problem).
#[derive(Clone, Debug, Default)]
pub struct ProblemConfig {
    /// Variable definitions. `VariableId(n)` corresponds to `variables[n]`.
    pub variables: Vec<VariableDef>,
    /// Mesh boundary names. `BoundaryId(n)` corresponds to `boundaries[n]`.
    pub boundaries: Vec<String>,
    /// Number of worker threads. `None` = auto-detect
    /// (`available_parallelism`, clamped to `[1, 64]`).
    pub thread_count: Option<usize>,
    /// RNG seed combined with per-object seeds.
    pub seed: u64,
}

impl ProblemConfig {
    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.variables.is_empty() {
            return Err(ConfigError::NoVariables);
        }
        let mut seen = HashSet::new();
        for var in &self.variables {
            var.validate()
                .map_err(|reason| ConfigError::InvalidVariable { reason })?;
            if !seen.insert(var.name.as_str()) {
                return Err(ConfigError::DuplicateVariable {
                    name: var.name.clone(),
                });
            }
        }

        if self.boundaries.len() > usize::from(u16::MAX) {
            return Err(ConfigError::TooManyBoundaries {
                count: self.boundaries.len(),
            });
        }
        let mut seen = HashSet::new();
        for name in &self.boundaries {
            if name.trim().is_empty() {
                return Err(ConfigError::EmptyBoundaryName);
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicateBoundary { name: name.clone() });
            }
        }
        Ok(())
    }

    /// Resolve the actual thread count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[1, 64]`; zero threads would leave
    /// no computation context to bind against.
    pub fn resolved_thread_count(&self) -> usize {
        match self.thread_count {
            Some(n) => n.clamp(1, MAX_THREADS),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .clamp(1, MAX_THREADS),
        }
    }
}
