//! The binding every boundary condition shares.

use tessera_core::{BoundaryId, BoundaryTable, InputParameters, Real, ThreadId, VarKindFilter};
use tessera_vars::{Subproblem, VariableBinding};
use tracing::debug;

use crate::error::BcError;

/// What every boundary condition is attached to: a named object, one
/// boundary, one thread, and the scalar variable it constrains (read at
/// nodes).
#[derive(Clone, Debug)]
pub struct BoundaryBinding {
    object: String,
    boundary: BoundaryId,
    boundary_name: String,
    variable: VariableBinding<Real>,
}

impl BoundaryBinding {
    /// Resolve the `boundary` and `variable` parameters of `object`.
    ///
    /// The first name given under `boundary` is used.
    ///
    /// # Errors
    ///
    /// - [`BcError::MissingBoundary`] if `boundary` is absent or empty
    /// - [`BcError::UnknownBoundary`] if the table lacks the name
    /// - [`BcError::Variable`] if the variable cannot be bound as a
    ///   nonlinear scalar
    pub fn resolve(
        object: &str,
        params: &InputParameters,
        boundaries: &BoundaryTable,
        subproblem: &Subproblem,
        thread: ThreadId,
    ) -> Result<Self, BcError> {
        let boundary_name = params
            .names("boundary")
            .into_iter()
            .find(|name| !name.is_empty())
            .ok_or_else(|| BcError::MissingBoundary {
                object: object.to_string(),
            })?;
        let boundary = boundaries
            .id(boundary_name)
            .ok_or_else(|| BcError::UnknownBoundary {
                object: object.to_string(),
                boundary: boundary_name.to_string(),
            })?;
        let variable = VariableBinding::<Real>::builder(object, params)
            .nodal(true)
            .kind(VarKindFilter::Nonlinear)
            .resolve(subproblem, thread)?;
        debug!(
            object,
            boundary = boundary_name,
            variable = variable.name(),
            thread = thread.0,
            "bound boundary condition"
        );
        Ok(Self {
            object: object.to_string(),
            boundary,
            boundary_name: boundary_name.to_string(),
            variable,
        })
    }

    /// Name of the owning object.
    pub fn object(&self) -> &str {
        &self.object
    }

    /// Boundary the condition applies on.
    pub fn boundary(&self) -> BoundaryId {
        self.boundary
    }

    /// Name of that boundary.
    pub fn boundary_name(&self) -> &str {
        &self.boundary_name
    }

    /// Thread the binding was resolved for.
    pub fn thread(&self) -> ThreadId {
        self.variable.thread()
    }

    /// The constrained variable.
    pub fn variable(&self) -> &VariableBinding<Real> {
        &self.variable
    }
}
