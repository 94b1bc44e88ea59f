//! Mock nodal boundary conditions for engine and pipeline tests.
//!
//! - [`ConstantBc`]: residual `u - value`, diagonal `diagonal`, and a
//!   fixed coupling entry for whichever variable it is asked about.
//! - [`FailingBc`]: fails at one node, succeeds everywhere else.

use tessera_bc::{
    BcError, BoundaryBinding, NodalBc, NodalBcCore, NodalContributions, NodeContext,
};
use tessera_core::{
    BoundaryTable, InputParameters, NodeId, Real, ThreadId, VariableId, VariableSet,
};
use tessera_vars::Subproblem;

/// A linear BC with configurable Jacobian entries.
pub struct ConstantBc {
    core: NodalBcCore,
    pub value: Real,
    pub diagonal: Real,
    pub coupling: Real,
}

impl ConstantBc {
    pub fn new(
        object: &str,
        params: &InputParameters,
        boundaries: &BoundaryTable,
        subproblem: &Subproblem,
        thread: ThreadId,
    ) -> Result<Self, BcError> {
        Ok(Self {
            core: NodalBcCore::from_params(object, params, boundaries, subproblem, thread)?,
            value: 0.0,
            diagonal: 1.0,
            coupling: 0.0,
        })
    }

    pub fn with_value(mut self, value: Real) -> Self {
        self.value = value;
        self
    }

    pub fn with_diagonal(mut self, diagonal: Real) -> Self {
        self.diagonal = diagonal;
        self
    }

    pub fn with_coupling(mut self, coupling: Real) -> Self {
        self.coupling = coupling;
        self
    }
}

impl NodalBc for ConstantBc {
    fn name(&self) -> &str {
        self.core.binding().object()
    }

    fn binding(&self) -> &BoundaryBinding {
        self.core.binding()
    }

    fn compute_residual(
        &self,
        ctx: &NodeContext<'_>,
        out: &mut NodalContributions,
    ) -> Result<(), BcError> {
        let u = self.core.u(ctx)?;
        self.core.emit_residual(ctx, u - self.value, out)
    }

    fn compute_jacobian(
        &self,
        ctx: &NodeContext<'_>,
        out: &mut NodalContributions,
    ) -> Result<(), BcError> {
        self.core.emit_diagonal(ctx, self.diagonal, out)
    }

    fn coupled_variables(&self) -> &VariableSet {
        self.core.coupled().dependencies()
    }

    fn compute_off_diag_jacobian(
        &self,
        ctx: &NodeContext<'_>,
        jvar: VariableId,
        out: &mut NodalContributions,
    ) -> Result<(), BcError> {
        self.core.emit_off_diagonal(ctx, jvar, self.coupling, out)
    }

    fn set_bc_on_eigen(&mut self, is_eigen: bool) {
        self.core.set_eigen(is_eigen);
    }

    fn is_eigen(&self) -> bool {
        self.core.is_eigen()
    }
}

/// Fails with [`BcError::NoDofAtNode`] when evaluated at `fail_at`.
pub struct FailingBc {
    core: NodalBcCore,
    pub fail_at: NodeId,
}

impl FailingBc {
    pub fn new(
        object: &str,
        params: &InputParameters,
        boundaries: &BoundaryTable,
        subproblem: &Subproblem,
        thread: ThreadId,
        fail_at: NodeId,
    ) -> Result<Self, BcError> {
        Ok(Self {
            core: NodalBcCore::from_params(object, params, boundaries, subproblem, thread)?,
            fail_at,
        })
    }

    fn check(&self, ctx: &NodeContext<'_>) -> Result<(), BcError> {
        if ctx.node() == self.fail_at {
            return Err(BcError::NoDofAtNode {
                variable: self.core.binding().variable().name().to_string(),
                node: ctx.node(),
            });
        }
        Ok(())
    }
}

impl NodalBc for FailingBc {
    fn name(&self) -> &str {
        self.core.binding().object()
    }

    fn binding(&self) -> &BoundaryBinding {
        self.core.binding()
    }

    fn compute_residual(
        &self,
        ctx: &NodeContext<'_>,
        out: &mut NodalContributions,
    ) -> Result<(), BcError> {
        self.check(ctx)?;
        self.core.emit_residual(ctx, 0.0, out)
    }

    fn compute_jacobian(
        &self,
        ctx: &NodeContext<'_>,
        out: &mut NodalContributions,
    ) -> Result<(), BcError> {
        self.check(ctx)?;
        self.core.emit_diagonal(ctx, 1.0, out)
    }

    fn coupled_variables(&self) -> &VariableSet {
        self.core.coupled().dependencies()
    }

    fn compute_off_diag_jacobian(
        &self,
        _ctx: &NodeContext<'_>,
        _jvar: VariableId,
        _out: &mut NodalContributions,
    ) -> Result<(), BcError> {
        Ok(())
    }

    fn set_bc_on_eigen(&mut self, is_eigen: bool) {
        self.core.set_eigen(is_eigen);
    }

    fn is_eigen(&self) -> bool {
        self.core.is_eigen()
    }
}
