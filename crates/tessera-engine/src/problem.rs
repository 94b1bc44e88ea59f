//! The [`Problem`]: a subproblem plus the objects evaluated against it.
//!
//! Objects are instantiated once per thread, as each thread binds its
//! own copies of the variables it reads. Evaluation fans out with
//! [`run_per_thread`], giving every worker its thread's data and object
//! list, and merges the per-thread results in thread order.

use indexmap::IndexMap;
use tessera_bc::{BcError, BoundaryTable, NodalBc, NodalContributions, NodeContext};
use tessera_core::{BoundaryId, NodeId, Real, ThreadId};
use tessera_postprocessors::{PostprocessorError, SideAccumulator, SidePostprocessor};
use tessera_vars::{Subproblem, ThreadData};
use tracing::{debug, info};

use crate::config::{ConfigError, ProblemConfig};
use crate::error::EngineError;
use crate::threaded::run_per_thread;

/// A node on a boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundaryNode {
    /// The boundary.
    pub boundary: BoundaryId,
    /// The node.
    pub node: NodeId,
}

/// An element side on a boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundarySide {
    /// The boundary.
    pub boundary: BoundaryId,
    /// Caller-defined side index, passed back to the reinit callback.
    pub side: usize,
}

/// Which nodal BC contributions to compute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodalPhase {
    /// Residual entries.
    Residual,
    /// Diagonal and off-diagonal Jacobian entries.
    Jacobian,
}

/// A configured problem.
pub struct Problem {
    subproblem: Subproblem,
    boundaries: BoundaryTable,
    seed: u64,
    nodal_bcs: Vec<Vec<Box<dyn NodalBc>>>,
    side_postprocessors: Vec<Vec<Box<dyn SidePostprocessor>>>,
}

impl Problem {
    /// Validate `config` and allocate per-thread data for every variable.
    pub fn new(config: ProblemConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let n_threads = config.resolved_thread_count();
        let mut subproblem = Subproblem::new(n_threads);
        for def in config.variables {
            subproblem.add_variable(def)?;
        }
        let boundaries: BoundaryTable = config.boundaries.into_iter().collect();
        info!(
            threads = n_threads,
            variables = subproblem.n_variables(),
            boundaries = boundaries.len(),
            "problem constructed"
        );
        Ok(Self {
            subproblem,
            boundaries,
            seed: config.seed,
            nodal_bcs: (0..n_threads).map(|_| Vec::new()).collect(),
            side_postprocessors: (0..n_threads).map(|_| Vec::new()).collect(),
        })
    }

    /// Number of worker threads.
    pub fn n_threads(&self) -> usize {
        self.subproblem.n_threads()
    }

    /// The variable registry and per-thread data.
    pub fn subproblem(&self) -> &Subproblem {
        &self.subproblem
    }

    /// Mutable access, e.g. to fill variable data between solves.
    pub fn subproblem_mut(&mut self) -> &mut Subproblem {
        &mut self.subproblem
    }

    /// Mesh boundary names.
    pub fn boundaries(&self) -> &BoundaryTable {
        &self.boundaries
    }

    /// Problem RNG seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Build a BC on every thread with `factory`, which receives the
    /// subproblem, boundary table, thread and problem seed.
    ///
    /// Nothing is added unless every thread's instance builds.
    pub fn add_nodal_bc<F>(&mut self, factory: F) -> Result<(), EngineError>
    where
        F: Fn(&Subproblem, &BoundaryTable, ThreadId, u64) -> Result<Box<dyn NodalBc>, BcError>,
    {
        let built = (0..self.n_threads())
            .map(|t| factory(&self.subproblem, &self.boundaries, ThreadId(t), self.seed))
            .collect::<Result<Vec<_>, _>>()
            .map_err(EngineError::BcConstruction)?;
        if let Some(bc) = built.first() {
            debug!(object = bc.name(), boundary = %bc.binding().boundary(), "added nodal BC");
        }
        for (slot, bc) in self.nodal_bcs.iter_mut().zip(built) {
            slot.push(bc);
        }
        Ok(())
    }

    /// Build a side postprocessor on every thread with `factory`.
    pub fn add_side_postprocessor<F>(&mut self, factory: F) -> Result<(), EngineError>
    where
        F: Fn(
            &Subproblem,
            &BoundaryTable,
            ThreadId,
        ) -> Result<Box<dyn SidePostprocessor>, PostprocessorError>,
    {
        let built = (0..self.n_threads())
            .map(|t| factory(&self.subproblem, &self.boundaries, ThreadId(t)))
            .collect::<Result<Vec<_>, _>>()
            .map_err(EngineError::PostprocessorConstruction)?;
        if let Some(pp) = built.first() {
            debug!(object = pp.name(), "added side postprocessor");
        }
        for (slot, pp) in self.side_postprocessors.iter_mut().zip(built) {
            slot.push(pp);
        }
        Ok(())
    }

    /// BCs instantiated for `thread`.
    pub fn nodal_bcs(&self, thread: ThreadId) -> &[Box<dyn NodalBc>] {
        self.nodal_bcs
            .get(thread.0)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Postprocessors instantiated for `thread`.
    pub fn side_postprocessors(&self, thread: ThreadId) -> &[Box<dyn SidePostprocessor>] {
        self.side_postprocessors
            .get(thread.0)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Apply every BC to the right-hand side of an eigenvalue problem.
    pub fn set_bcs_on_eigen(&mut self, is_eigen: bool) {
        for bc in self.nodal_bcs.iter_mut().flatten() {
            bc.set_bc_on_eigen(is_eigen);
        }
    }

    /// Shift every variable's solution history by one timestep.
    pub fn advance_timestep(&mut self) {
        self.subproblem.shift_time_levels();
        debug!("advanced timestep");
    }

    /// Evaluate nodal BCs at `nodes`.
    ///
    /// Node `i` is processed by thread `i % n_threads`. Before a node's
    /// BCs run, `reinit` positions the thread's data on it. For each BC
    /// on the node's boundary whose `should_apply` holds, the residual
    /// phase computes the residual; the Jacobian phase computes the
    /// diagonal entry and the coupling to each variable the BC declares
    /// in [`NodalBc::coupled_variables`].
    pub fn compute_nodal_bcs<R>(
        &mut self,
        phase: NodalPhase,
        nodes: &[BoundaryNode],
        reinit: R,
    ) -> Result<NodalContributions, EngineError>
    where
        R: Fn(&mut ThreadData, BoundaryNode) + Sync,
    {
        let n_threads = self.subproblem.n_threads();
        let slots: Vec<_> = self
            .subproblem
            .threads_mut()
            .iter_mut()
            .zip(self.nodal_bcs.iter_mut())
            .collect();

        let per_thread = run_per_thread(slots, |thread, (data, bcs)| {
            let mut out = NodalContributions::new();
            for bn in nodes.iter().skip(thread.0).step_by(n_threads) {
                reinit(data, *bn);
                let ctx = NodeContext::new(data, bn.node);
                for bc in bcs.iter() {
                    if bc.binding().boundary() != bn.boundary || !bc.should_apply(&ctx) {
                        continue;
                    }
                    evaluate_bc(bc.as_ref(), phase, &ctx, &mut out).map_err(
                        |source| EngineError::Bc {
                            object: bc.name().to_string(),
                            source,
                        },
                    )?;
                }
            }
            Ok(out)
        })?;

        let mut merged = NodalContributions::new();
        for mut out in per_thread {
            merged.append(&mut out);
        }
        Ok(merged)
    }

    /// Integrate every side postprocessor over `sides` and return each
    /// one's final value by name.
    ///
    /// Side `i` is processed by thread `i % n_threads`; `reinit`
    /// positions the thread's data (variable values and face quadrature)
    /// on it. Per-thread accumulators are joined before the final value
    /// is taken.
    pub fn compute_side_postprocessors<R>(
        &mut self,
        sides: &[BoundarySide],
        reinit: R,
    ) -> Result<IndexMap<String, Real>, EngineError>
    where
        R: Fn(&mut ThreadData, BoundarySide) + Sync,
    {
        let n_threads = self.subproblem.n_threads();
        let slots: Vec<_> = self
            .subproblem
            .threads_mut()
            .iter_mut()
            .zip(self.side_postprocessors.iter_mut())
            .collect();

        let per_thread = run_per_thread(slots, |thread, (data, pps)| {
            let mut accs = vec![SideAccumulator::new(); pps.len()];
            for bs in sides.iter().skip(thread.0).step_by(n_threads) {
                reinit(data, *bs);
                for (pp, acc) in pps.iter().zip(accs.iter_mut()) {
                    if !pp.side().applies_to(bs.boundary) {
                        continue;
                    }
                    pp.execute(data, acc)
                        .map_err(|source| EngineError::Postprocessor {
                            object: pp.name().to_string(),
                            source,
                        })?;
                }
            }
            Ok(accs)
        })?;

        let mut joined: Vec<SideAccumulator> = Vec::new();
        for accs in per_thread {
            if joined.is_empty() {
                joined = accs;
                continue;
            }
            for (total, acc) in joined.iter_mut().zip(&accs) {
                total.join(acc);
            }
        }

        let mut values = IndexMap::new();
        for (pp, acc) in self.side_postprocessors(ThreadId(0)).iter().zip(&joined) {
            let value = pp.value(acc).map_err(|source| EngineError::Postprocessor {
                object: pp.name().to_string(),
                source,
            })?;
            values.insert(pp.name().to_string(), value);
        }
        Ok(values)
    }
}

fn evaluate_bc(
    bc: &dyn NodalBc,
    phase: NodalPhase,
    ctx: &NodeContext<'_>,
    out: &mut NodalContributions,
) -> Result<(), BcError> {
    match phase {
        NodalPhase::Residual => bc.compute_residual(ctx, out),
        NodalPhase::Jacobian => {
            bc.compute_jacobian(ctx, out)?;
            let own = bc.binding().variable().id();
            for jvar in bc.coupled_variables().iter().filter(|&j| j != own) {
                bc.compute_off_diag_jacobian(ctx, jvar, out)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_bc::DirichletBc;
    use tessera_core::{InputParameters, VariableDef, VariableId};
    use tessera_vars::TimeLevel;

    fn config(threads: usize) -> ProblemConfig {
        ProblemConfig {
            variables: vec![VariableDef::scalar("u"), VariableDef::scalar("v")],
            boundaries: vec!["left".into(), "right".into()],
            thread_count: Some(threads),
            seed: 7,
        }
    }

    fn dirichlet(
        params: &InputParameters,
    ) -> impl Fn(&Subproblem, &BoundaryTable, ThreadId, u64) -> Result<Box<dyn NodalBc>, BcError> + '_
    {
        move |sp, boundaries, thread, _| {
            let bc = DirichletBc::from_params("fix_u", params, boundaries, sp, thread)?;
            Ok(Box::new(bc) as Box<dyn NodalBc>)
        }
    }

    #[test]
    fn new_allocates_threads_and_boundaries() {
        let problem = Problem::new(config(3)).unwrap();
        assert_eq!(problem.n_threads(), 3);
        assert_eq!(problem.subproblem().n_variables(), 2);
        assert_eq!(problem.boundaries().id("right"), Some(BoundaryId(1)));
        assert_eq!(problem.seed(), 7);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = ProblemConfig {
            variables: Vec::new(),
            ..config(1)
        };
        assert_eq!(Problem::new(cfg).err(), Some(ConfigError::NoVariables));
    }

    #[test]
    fn bc_is_instantiated_per_thread() {
        let mut problem = Problem::new(config(2)).unwrap();
        let params = InputParameters::new()
            .with("variable", "u")
            .with("boundary", "left");
        problem.add_nodal_bc(dirichlet(&params)).unwrap();
        for t in 0..2 {
            let bcs = problem.nodal_bcs(ThreadId(t));
            assert_eq!(bcs.len(), 1);
            assert_eq!(bcs[0].binding().thread(), ThreadId(t));
        }
        assert!(problem.nodal_bcs(ThreadId(5)).is_empty());
    }

    #[test]
    fn failed_construction_adds_nothing() {
        let mut problem = Problem::new(config(2)).unwrap();
        let params = InputParameters::new()
            .with("variable", "u")
            .with("boundary", "top");
        let err = problem.add_nodal_bc(dirichlet(&params)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::BcConstruction(BcError::UnknownBoundary { .. })
        ));
        assert_eq!(
            err.to_string(),
            "building boundary condition: 'fix_u' names unknown boundary 'top'"
        );
        assert!(problem.nodal_bcs(ThreadId(0)).is_empty());
    }

    #[test]
    fn eigen_flag_reaches_every_instance() {
        let mut problem = Problem::new(config(2)).unwrap();
        let params = InputParameters::new()
            .with("variable", "u")
            .with("boundary", "left");
        problem.add_nodal_bc(dirichlet(&params)).unwrap();
        problem.set_bcs_on_eigen(true);
        for t in 0..2 {
            assert!(problem.nodal_bcs(ThreadId(t))[0].is_eigen());
        }
    }

    #[test]
    fn advance_timestep_shifts_every_thread() {
        let mut problem = Problem::new(config(2)).unwrap();
        for data in problem.subproblem_mut().threads_mut() {
            data.variable_mut::<Real>(VariableId(0))
                .unwrap()
                .set_dof_values(TimeLevel::Current, vec![4.0]);
        }
        problem.advance_timestep();
        for data in problem.subproblem().threads() {
            let u = data.variable::<Real>(VariableId(0)).unwrap();
            assert_eq!(u.dof_values(TimeLevel::Old), &[4.0]);
            assert!(u.dof_values(TimeLevel::Older).is_empty());
        }
    }

    #[test]
    fn empty_node_list_contributes_nothing() {
        let mut problem = Problem::new(config(2)).unwrap();
        let params = InputParameters::new()
            .with("variable", "u")
            .with("boundary", "left");
        problem.add_nodal_bc(dirichlet(&params)).unwrap();
        let out = problem
            .compute_nodal_bcs(NodalPhase::Residual, &[], |_, _| {})
            .unwrap();
        assert!(out.is_empty());
    }
}
