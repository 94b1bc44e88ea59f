//! Reference nodal boundary conditions.
//!
//! [`DirichletBc`] pins a variable to a constant at boundary nodes.
//! [`NoisyDirichletBc`] perturbs that constant with a deterministic
//! per-node uniform sample, the way randomized initial and boundary
//! data are produced for stochastic studies.

use tessera_core::{BoundaryTable, InputParameters, Real, ThreadId, VariableId, VariableSet};
use tessera_vars::Subproblem;

use crate::boundary::BoundaryBinding;
use crate::capabilities::RandomStream;
use crate::error::BcError;
use crate::nodal::{NodalBc, NodalBcCore, NodalContributions, NodeContext};

/// `u = value` at every node of the boundary.
///
/// Residual `u - value`, diagonal Jacobian 1, no off-diagonal coupling.
#[derive(Clone, Debug)]
pub struct DirichletBc {
    core: NodalBcCore,
    value: Real,
}

impl DirichletBc {
    /// Build from `variable`, `boundary` and `value` (default 0).
    pub fn from_params(
        object: &str,
        params: &InputParameters,
        boundaries: &BoundaryTable,
        subproblem: &Subproblem,
        thread: ThreadId,
    ) -> Result<Self, BcError> {
        let value = real_or(params, "value", 0.0)?;
        Ok(Self {
            core: NodalBcCore::from_params(object, params, boundaries, subproblem, thread)?,
            value,
        })
    }

    /// Prescribed value.
    pub fn value(&self) -> Real {
        self.value
    }

    /// Shared BC state.
    pub fn core(&self) -> &NodalBcCore {
        &self.core
    }
}

impl NodalBc for DirichletBc {
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

/// `u = value + amplitude * (2U - 1)` with `U` the node's first uniform
/// sample from a [`RandomStream`].
///
/// The target for a node is fixed for a given seed, so repeated
/// residual evaluations within a solve agree.
#[derive(Clone, Debug)]
pub struct NoisyDirichletBc {
    core: NodalBcCore,
    value: Real,
    amplitude: Real,
    random: RandomStream,
}

impl NoisyDirichletBc {
    /// Build from `variable`, `boundary`, `value` (default 0),
    /// `amplitude` (default 0) and `seed` (combined with `problem_seed`).
    ///
    /// # Errors
    ///
    /// [`BcError::InvalidParameter`] if `amplitude` is negative or not
    /// finite, plus every error of [`NodalBcCore::from_params`].
    pub fn from_params(
        object: &str,
        params: &InputParameters,
        boundaries: &BoundaryTable,
        subproblem: &Subproblem,
        thread: ThreadId,
        problem_seed: u64,
    ) -> Result<Self, BcError> {
        let value = real_or(params, "value", 0.0)?;
        let amplitude = real_or(params, "amplitude", 0.0)?;
        if !amplitude.is_finite() || amplitude < 0.0 {
            return Err(BcError::InvalidParameter {
                object: object.to_string(),
                param: "amplitude".to_string(),
                reason: format!("must be finite and >= 0, got {amplitude}"),
            });
        }
        Ok(Self {
            core: NodalBcCore::from_params(object, params, boundaries, subproblem, thread)?,
            value,
            amplitude,
            random: RandomStream::from_params(params, problem_seed)?,
        })
    }

    /// Target value at the context's node.
    pub fn target(&self, ctx: &NodeContext<'_>) -> Real {
        let u = self.random.real_for(ctx.node());
        self.value + self.amplitude * (2.0 * u - 1.0)
    }

    /// The per-node random stream.
    pub fn random(&self) -> &RandomStream {
        &self.random
    }
}

impl NodalBc for NoisyDirichletBc {
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
        self.core.emit_residual(ctx, u - self.target(ctx), out)
    }

    fn compute_jacobian(
        &self,
        ctx: &NodeContext<'_>,
        out: &mut NodalContributions,
    ) -> Result<(), BcError> {
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

fn real_or(params: &InputParameters, key: &str, default: Real) -> Result<Real, BcError> {
    if params.is_param_valid(key) {
        Ok(params.get_real(key)?)
    } else {
        Ok(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{NodeId, VariableDef};
    use tessera_vars::TimeLevel;

    fn setup(u: Real) -> (Subproblem, BoundaryTable) {
        let mut sp = Subproblem::new(1);
        sp.add_variable(VariableDef::scalar("u")).unwrap();
        let var = sp
            .thread_mut(ThreadId(0))
            .unwrap()
            .variable_mut::<Real>(VariableId(0))
            .unwrap();
        var.set_dof_indices([12]);
        var.set_dof_values(TimeLevel::Current, vec![u]);
        (sp, ["top"].into_iter().collect())
    }

    fn params() -> InputParameters {
        InputParameters::new()
            .with("variable", "u")
            .with("boundary", "top")
    }

    #[test]
    fn dirichlet_residual_and_jacobian() {
        let (sp, table) = setup(4.0);
        let bc = DirichletBc::from_params(
            "fix",
            &params().with("value", 1.5),
            &table,
            &sp,
            ThreadId(0),
        )
        .unwrap();
        assert_eq!(bc.name(), "fix");
        assert!(bc.should_apply(&NodeContext::new(sp.thread(ThreadId(0)).unwrap(), NodeId(1))));

        let ctx = NodeContext::new(sp.thread(ThreadId(0)).unwrap(), NodeId(1));
        let mut out = NodalContributions::new();
        bc.compute_residual(&ctx, &mut out).unwrap();
        bc.compute_jacobian(&ctx, &mut out).unwrap();
        bc.compute_off_diag_jacobian(&ctx, VariableId(0), &mut out)
            .unwrap();
        assert_eq!(out.residual(), &[(12, 2.5)]);
        assert_eq!(out.jacobian(), &[(12, 12, 1.0)]);
    }

    #[test]
    fn dirichlet_value_defaults_to_zero() {
        let (sp, table) = setup(0.0);
        let bc = DirichletBc::from_params("fix", &params(), &table, &sp, ThreadId(0)).unwrap();
        assert_eq!(bc.value(), 0.0);
    }

    #[test]
    fn dirichlet_eigen_flag() {
        let (sp, table) = setup(4.0);
        let mut bc =
            DirichletBc::from_params("fix", &params(), &table, &sp, ThreadId(0)).unwrap();
        bc.set_bc_on_eigen(true);
        assert!(bc.is_eigen());
        let ctx = NodeContext::new(sp.thread(ThreadId(0)).unwrap(), NodeId(1));
        let mut out = NodalContributions::new();
        bc.compute_residual(&ctx, &mut out).unwrap();
        assert_eq!(out.residual(), &[(12, 0.0)]);
    }

    #[test]
    fn noisy_target_is_bounded_and_deterministic() {
        let (sp, table) = setup(0.0);
        let p = params()
            .with("value", 10.0)
            .with("amplitude", 0.5)
            .with("seed", 3i64);
        let a = NoisyDirichletBc::from_params("noisy", &p, &table, &sp, ThreadId(0), 1).unwrap();
        let b = NoisyDirichletBc::from_params("noisy", &p, &table, &sp, ThreadId(0), 1).unwrap();
        let data = sp.thread(ThreadId(0)).unwrap();
        for node in 0..32 {
            let ctx = NodeContext::new(data, NodeId(node));
            let t = a.target(&ctx);
            assert!((9.5..=10.5).contains(&t));
            assert_eq!(t, b.target(&ctx));
        }
    }

    #[test]
    fn noisy_residual_uses_target() {
        let (sp, table) = setup(2.0);
        let p = params().with("value", 1.0).with("amplitude", 0.25);
        let bc = NoisyDirichletBc::from_params("noisy", &p, &table, &sp, ThreadId(0), 0).unwrap();
        let ctx = NodeContext::new(sp.thread(ThreadId(0)).unwrap(), NodeId(5));
        let mut out = NodalContributions::new();
        bc.compute_residual(&ctx, &mut out).unwrap();
        assert_eq!(out.residual(), &[(12, 2.0 - bc.target(&ctx))]);
    }

    #[test]
    fn noisy_rejects_negative_amplitude() {
        let (sp, table) = setup(0.0);
        let p = params().with("amplitude", -1.0);
        let err =
            NoisyDirichletBc::from_params("noisy", &p, &table, &sp, ThreadId(0), 0).unwrap_err();
        assert!(matches!(err, BcError::InvalidParameter { .. }));
    }
}
