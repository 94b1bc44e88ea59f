//! The [`NodalBc`] trait and the state shared by nodal boundary conditions.
//!
//! A nodal BC is evaluated once per boundary node. It reads the variable's
//! nodal value through its [`BoundaryBinding`] and writes residual and
//! Jacobian entries into a [`NodalContributions`] buffer; the caller
//! assembles those into the global system.

use tessera_core::{
    BoundaryTable, FieldArity, InputParameters, NodeId, Real, RealVectorValue, ThreadId, VariableId,
    VariableSet,
};
use tessera_vars::{Subproblem, ThreadData};

use crate::boundary::BoundaryBinding;
use crate::capabilities::{CoupledVariables, SaveIn, SaveInChannel, SaveInRecord};
use crate::error::BcError;

/// Parameter listing variables a BC couples to.
pub const COUPLED_PARAM: &str = "coupled_variables";

/// Read-only data for evaluating a BC at one node.
#[derive(Clone, Copy, Debug)]
pub struct NodeContext<'a> {
    data: &'a ThreadData,
    node: NodeId,
}

impl<'a> NodeContext<'a> {
    /// Context for `node`, reading variables from `data`.
    pub fn new(data: &'a ThreadData, node: NodeId) -> Self {
        Self { data, node }
    }

    /// The thread's variables and assembly data.
    pub fn data(&self) -> &'a ThreadData {
        self.data
    }

    /// Node being processed.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Thread the data belongs to.
    pub fn thread(&self) -> ThreadId {
        self.data.thread()
    }
}

/// Residual, Jacobian and save-in output of nodal BC evaluation.
///
/// Entries are appended in evaluation order; duplicates are summed by
/// the caller during assembly.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodalContributions {
    residual: Vec<(usize, Real)>,
    jacobian: Vec<(usize, usize, Real)>,
    save_in: Vec<SaveInRecord>,
}

impl NodalContributions {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a residual entry at global dof `dof`.
    pub fn add_residual(&mut self, dof: usize, value: Real) {
        self.residual.push((dof, value));
    }

    /// Append a Jacobian entry at `(row, col)`.
    pub fn add_jacobian(&mut self, row: usize, col: usize, value: Real) {
        self.jacobian.push((row, col, value));
    }

    /// Append save-in copies.
    pub fn add_save_in(&mut self, records: impl IntoIterator<Item = SaveInRecord>) {
        self.save_in.extend(records);
    }

    /// Residual entries `(dof, value)`.
    pub fn residual(&self) -> &[(usize, Real)] {
        &self.residual
    }

    /// Jacobian triplets `(row, col, value)`.
    pub fn jacobian(&self) -> &[(usize, usize, Real)] {
        &self.jacobian
    }

    /// Save-in copies.
    pub fn save_in(&self) -> &[SaveInRecord] {
        &self.save_in
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.residual.is_empty() && self.jacobian.is_empty() && self.save_in.is_empty()
    }

    /// Move every entry of `other` into `self`.
    pub fn append(&mut self, other: &mut Self) {
        self.residual.append(&mut other.residual);
        self.jacobian.append(&mut other.jacobian);
        self.save_in.append(&mut other.save_in);
    }

    /// Drop all entries, keeping the allocations.
    pub fn clear(&mut self) {
        self.residual.clear();
        self.jacobian.clear();
        self.save_in.clear();
    }
}

/// A boundary condition applied at the nodes of one boundary.
///
/// # Contract
///
/// - Evaluation takes `&self`; per-node data comes from the
///   [`NodeContext`], so one instance per thread can be evaluated
///   without synchronization.
/// - When [`is_eigen`](Self::is_eigen) is set, the BC contributes zero to
///   the residual and Jacobian (it applies to the right-hand side of an
///   eigenvalue problem).
///
/// # Object safety
///
/// The engine stores BCs as `Vec<Box<dyn NodalBc>>`.
pub trait NodalBc: Send {
    /// Object name for error reporting.
    fn name(&self) -> &str;

    /// Boundary, thread and variable this BC is attached to.
    fn binding(&self) -> &BoundaryBinding;

    /// Whether the BC applies at the current node. Defaults to always.
    fn should_apply(&self, _ctx: &NodeContext<'_>) -> bool {
        true
    }

    /// Residual at the node.
    fn compute_residual(
        &self,
        ctx: &NodeContext<'_>,
        out: &mut NodalContributions,
    ) -> Result<(), BcError>;

    /// Diagonal Jacobian entry at the node.
    fn compute_jacobian(
        &self,
        ctx: &NodeContext<'_>,
        out: &mut NodalContributions,
    ) -> Result<(), BcError>;

    /// Variables whose off-diagonal entries the BC may produce. The
    /// engine requests [`compute_off_diag_jacobian`](Self::compute_off_diag_jacobian)
    /// only for these.
    fn coupled_variables(&self) -> &VariableSet;

    /// Jacobian entry coupling the BC's variable to `jvar`.
    fn compute_off_diag_jacobian(
        &self,
        ctx: &NodeContext<'_>,
        jvar: VariableId,
        out: &mut NodalContributions,
    ) -> Result<(), BcError>;

    /// Mark the BC as applying to the eigen right-hand side.
    fn set_bc_on_eigen(&mut self, is_eigen: bool);

    /// Whether the BC applies to the eigen right-hand side.
    fn is_eigen(&self) -> bool;
}

/// State every nodal BC composes: its binding, save-in targets, coupled
/// variables and the eigen flag.
///
/// Concrete BCs compute point values and hand them to the `emit_*`
/// methods, which route them to the right dofs and save-in variables.
#[derive(Clone, Debug)]
pub struct NodalBcCore {
    binding: BoundaryBinding,
    save_in: SaveIn,
    coupled: CoupledVariables,
    is_eigen: bool,
}

impl NodalBcCore {
    /// Resolve the binding, save-in variables and [`COUPLED_PARAM`] of
    /// `object` on `thread`.
    pub fn from_params(
        object: &str,
        params: &InputParameters,
        boundaries: &BoundaryTable,
        subproblem: &Subproblem,
        thread: ThreadId,
    ) -> Result<Self, BcError> {
        let binding = BoundaryBinding::resolve(object, params, boundaries, subproblem, thread)?;
        let save_in = SaveIn::resolve(object, params, subproblem, thread)?;
        let coupled = CoupledVariables::resolve(params, &[COUPLED_PARAM], subproblem, thread)?;
        Ok(Self {
            binding,
            save_in,
            coupled,
            is_eigen: false,
        })
    }

    /// The boundary binding.
    pub fn binding(&self) -> &BoundaryBinding {
        &self.binding
    }

    /// Save-in targets.
    pub fn save_in(&self) -> &SaveIn {
        &self.save_in
    }

    /// Coupled variables.
    pub fn coupled(&self) -> &CoupledVariables {
        &self.coupled
    }

    /// Eigen flag.
    pub fn is_eigen(&self) -> bool {
        self.is_eigen
    }

    /// Set the eigen flag.
    pub fn set_eigen(&mut self, is_eigen: bool) {
        self.is_eigen = is_eigen;
    }

    /// The variable's value at the node.
    pub fn u(&self, ctx: &NodeContext<'_>) -> Result<Real, BcError> {
        let view = self.binding.variable().attach(ctx.data())?;
        view.value()?
            .first()
            .copied()
            .ok_or_else(|| self.no_dof(ctx))
    }

    /// The variable's global dof at the node.
    pub fn dof(&self, ctx: &NodeContext<'_>) -> Result<usize, BcError> {
        let view = self.binding.variable().attach(ctx.data())?;
        view.variable()
            .dof_indices()
            .first()
            .copied()
            .ok_or_else(|| self.no_dof(ctx))
    }

    /// Write residual `r` at the variable's dof, mirrored to `save_in`.
    pub fn emit_residual(
        &self,
        ctx: &NodeContext<'_>,
        r: Real,
        out: &mut NodalContributions,
    ) -> Result<(), BcError> {
        let r = if self.is_eigen { 0.0 } else { r };
        out.add_residual(self.dof(ctx)?, r);
        if self.save_in.has_save_in() {
            out.add_save_in(self.save_in.records(
                ctx.data(),
                ctx.node(),
                SaveInChannel::Residual,
                r,
            )?);
        }
        Ok(())
    }

    /// Write diagonal entry `d`, mirrored to `diag_save_in`.
    pub fn emit_diagonal(
        &self,
        ctx: &NodeContext<'_>,
        d: Real,
        out: &mut NodalContributions,
    ) -> Result<(), BcError> {
        let d = if self.is_eigen { 0.0 } else { d };
        let dof = self.dof(ctx)?;
        out.add_jacobian(dof, dof, d);
        if self.save_in.has_diag_save_in() {
            out.add_save_in(self.save_in.records(
                ctx.data(),
                ctx.node(),
                SaveInChannel::Diagonal,
                d,
            )?);
        }
        Ok(())
    }

    /// Write the entry coupling the variable's dof to `jvar`'s first dof
    /// at the node. Zero values are skipped.
    pub fn emit_off_diagonal(
        &self,
        ctx: &NodeContext<'_>,
        jvar: VariableId,
        value: Real,
        out: &mut NodalContributions,
    ) -> Result<(), BcError> {
        if self.is_eigen || value == 0.0 {
            return Ok(());
        }
        let row = self.dof(ctx)?;
        let col = jvar_dof(ctx, jvar).ok_or_else(|| BcError::NoDofAtNode {
            variable: jvar.to_string(),
            node: ctx.node(),
        })?;
        out.add_jacobian(row, col, value);
        Ok(())
    }

    fn no_dof(&self, ctx: &NodeContext<'_>) -> BcError {
        BcError::NoDofAtNode {
            variable: self.binding.variable().name().to_string(),
            node: ctx.node(),
        }
    }
}

fn jvar_dof(ctx: &NodeContext<'_>, jvar: VariableId) -> Option<usize> {
    let data = ctx.data();
    let (_, handle) = data.variables().handle_by_id(jvar)?;
    let indices = match handle.arity {
        FieldArity::Scalar => data.variable::<Real>(jvar)?.dof_indices(),
        FieldArity::Vector => data.variable::<RealVectorValue>(jvar)?.dof_indices(),
    };
    indices.first().copied()
}
