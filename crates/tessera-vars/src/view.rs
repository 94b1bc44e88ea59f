//! Typed read access to one variable.
//!
//! [`VariableView`] dispatches every accessor on the representation fixed
//! at binding time:
//!
//! | accessor family | nodal | interpolated |
//! |---|---|---|
//! | value, old, older, dot | dof values (scalar only) | q-point solution |
//! | `dot_du` | dof sensitivity | q-point sensitivity |
//! | gradients, second derivatives | error | q-point data |
//! | test / shape second derivatives | error | variable / assembly data |
//!
//! Vector dofs are individual components, so the value family is also
//! undefined for nodal vector views. Nothing here ever substitutes a
//! default for an undefined request.

use tessera_core::{FieldArity, Real, Representation, VariableError};

use crate::assembly::AssemblyContext;
use crate::store::VariableArity;
use crate::variable::{FieldVariable, TimeLevel};

const GRADIENTS_AT_NODES: &str = "gradients are not defined at nodes";
const SECONDS_AT_NODES: &str = "second derivatives are not defined at nodes";
const VECTOR_DOFS: &str = "dofs are scalars while vector variables have vector values";

/// A binding attached to one thread's data.
///
/// Returned slices borrow the variable's storage and stay valid for the
/// computation phase the view was attached for.
#[derive(Debug)]
pub struct VariableView<'a, T: VariableArity> {
    variable: &'a FieldVariable<T>,
    assembly: &'a AssemblyContext,
    representation: Representation,
}

impl<T: VariableArity> Clone for VariableView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: VariableArity> Copy for VariableView<'_, T> {}

impl<'a, T: VariableArity> VariableView<'a, T> {
    pub(crate) fn new(
        variable: &'a FieldVariable<T>,
        assembly: &'a AssemblyContext,
        representation: Representation,
    ) -> Self {
        Self {
            variable,
            assembly,
            representation,
        }
    }

    /// The underlying variable.
    pub fn variable(&self) -> &'a FieldVariable<T> {
        self.variable
    }

    /// Whether this view reads nodal dof storage.
    pub fn is_nodal(&self) -> bool {
        self.representation == Representation::Nodal
    }

    /// Current value.
    pub fn value(&self) -> Result<&'a [T], VariableError> {
        self.value_family("value", TimeLevel::Current)
    }

    /// Value at the previous time level.
    pub fn value_old(&self) -> Result<&'a [T], VariableError> {
        self.value_family("value_old", TimeLevel::Old)
    }

    /// Value two time levels back.
    pub fn value_older(&self) -> Result<&'a [T], VariableError> {
        self.value_family("value_older", TimeLevel::Older)
    }

    /// Time derivative of the value.
    pub fn dot(&self) -> Result<&'a [T], VariableError> {
        match self.representation {
            Representation::Interpolated => Ok(self.variable.u_dot()),
            Representation::Nodal => self.nodal_values("dot", self.variable.dof_values_dot()),
        }
    }

    /// Derivative of the time derivative with respect to the current
    /// solution. Scalar for both arities, and defined at nodes for both.
    pub fn dot_du(&self) -> Result<&'a [Real], VariableError> {
        Ok(match self.representation {
            Representation::Interpolated => self.variable.du_dot_du(),
            Representation::Nodal => self.variable.dof_values_du_dot_du(),
        })
    }

    /// Current gradient at quadrature points.
    pub fn gradient(&self) -> Result<&'a [T::Gradient], VariableError> {
        self.interpolated_only("gradient", GRADIENTS_AT_NODES)?;
        Ok(self.variable.grad_sln(TimeLevel::Current))
    }

    /// Gradient at the previous time level.
    pub fn gradient_old(&self) -> Result<&'a [T::Gradient], VariableError> {
        self.interpolated_only("gradient_old", GRADIENTS_AT_NODES)?;
        Ok(self.variable.grad_sln(TimeLevel::Old))
    }

    /// Gradient two time levels back.
    pub fn gradient_older(&self) -> Result<&'a [T::Gradient], VariableError> {
        self.interpolated_only("gradient_older", GRADIENTS_AT_NODES)?;
        Ok(self.variable.grad_sln(TimeLevel::Older))
    }

    /// Current second derivative at quadrature points.
    pub fn second(&self) -> Result<&'a [T::Second], VariableError> {
        self.interpolated_only("second", SECONDS_AT_NODES)?;
        Ok(self.variable.second_sln(TimeLevel::Current))
    }

    /// Second derivative at the previous time level.
    pub fn second_old(&self) -> Result<&'a [T::Second], VariableError> {
        self.interpolated_only("second_old", SECONDS_AT_NODES)?;
        Ok(self.variable.second_sln(TimeLevel::Old))
    }

    /// Second derivative two time levels back.
    pub fn second_older(&self) -> Result<&'a [T::Second], VariableError> {
        self.interpolated_only("second_older", SECONDS_AT_NODES)?;
        Ok(self.variable.second_sln(TimeLevel::Older))
    }

    /// Second derivatives of the variable's test functions, `[i][qp]`.
    pub fn second_test(&self) -> Result<&'a [Vec<T::Second>], VariableError> {
        self.interpolated_only("second_test", SECONDS_AT_NODES)?;
        Ok(&self.variable.second_test().volume)
    }

    /// Test-function second derivatives on the current side.
    pub fn second_test_face(&self) -> Result<&'a [Vec<T::Second>], VariableError> {
        self.interpolated_only("second_test_face", SECONDS_AT_NODES)?;
        Ok(&self.variable.second_test().face)
    }

    /// Shape-function second derivatives from the assembly context.
    pub fn second_phi(&self) -> Result<&'a [Vec<T::Second>], VariableError> {
        self.interpolated_only("second_phi", SECONDS_AT_NODES)?;
        self.assembly
            .second_phi::<T>(self.variable.id())
            .ok_or_else(|| self.unregistered())
    }

    /// Shape-function second derivatives on the current side.
    pub fn second_phi_face(&self) -> Result<&'a [Vec<T::Second>], VariableError> {
        self.interpolated_only("second_phi_face", SECONDS_AT_NODES)?;
        self.assembly
            .second_phi_face::<T>(self.variable.id())
            .ok_or_else(|| self.unregistered())
    }

    fn value_family(
        &self,
        accessor: &'static str,
        level: TimeLevel,
    ) -> Result<&'a [T], VariableError> {
        match self.representation {
            Representation::Interpolated => Ok(self.variable.sln(level)),
            Representation::Nodal => self.nodal_values(accessor, self.variable.dof_values(level)),
        }
    }

    fn nodal_values(
        &self,
        accessor: &'static str,
        dofs: &'a [Real],
    ) -> Result<&'a [T], VariableError> {
        match T::ARITY {
            FieldArity::Scalar => {
                T::from_dofs(dofs).ok_or_else(|| self.undefined(accessor, VECTOR_DOFS))
            }
            FieldArity::Vector => Err(self.undefined(accessor, VECTOR_DOFS)),
        }
    }

    fn interpolated_only(
        &self,
        accessor: &'static str,
        reason: &'static str,
    ) -> Result<(), VariableError> {
        match self.representation {
            Representation::Interpolated => Ok(()),
            Representation::Nodal => Err(self.undefined(accessor, reason)),
        }
    }

    fn undefined(&self, accessor: &'static str, reason: &'static str) -> VariableError {
        VariableError::UndefinedAtNodes {
            accessor,
            name: self.variable.name().to_string(),
            reason,
        }
    }

    fn unregistered(&self) -> VariableError {
        VariableError::UnknownVariable {
            name: self.variable.name().to_string(),
            thread: self.assembly.thread(),
        }
    }
}
