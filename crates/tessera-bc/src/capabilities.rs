//! Orthogonal capabilities a boundary condition can compose.
//!
//! Each capability owns its configuration and is resolved once at
//! construction. A BC holds only the ones it needs.

use indexmap::IndexMap;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use smallvec::SmallVec;
use tessera_core::{
    InputParameters, NodeId, Real, ThreadId, VarKindFilter, VariableError, VariableId, VariableSet,
};
use tessera_vars::{Subproblem, ThreadData, VariableBinding, VariableHandle};

use crate::error::BcError;

/// Deterministic per-node random numbers.
///
/// The generator is reseeded from `seed XOR node` for every node, so a
/// node sees the same sequence regardless of thread count or visiting
/// order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RandomStream {
    seed: u64,
}

impl RandomStream {
    /// A stream with the given base seed.
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Combine the problem seed with the object's optional `seed`
    /// parameter (default 0).
    pub fn from_params(params: &InputParameters, problem_seed: u64) -> Result<Self, BcError> {
        let local = if params.is_param_valid("seed") {
            params.get_int("seed")? as u64
        } else {
            0
        };
        Ok(Self::new(problem_seed ^ local))
    }

    /// Base seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// A generator positioned at the start of `node`'s sequence.
    pub fn rng_for(&self, node: NodeId) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed ^ node.0)
    }

    /// First uniform sample in `[0, 1)` of `node`'s sequence.
    pub fn real_for(&self, node: NodeId) -> Real {
        self.rng_for(node).random::<f64>()
    }

    /// First integer sample of `node`'s sequence.
    pub fn long_for(&self, node: NodeId) -> u32 {
        self.rng_for(node).random::<u32>()
    }
}

/// Variables coupled in through named parameters.
///
/// Each parameter may list several variables (components). All of them
/// are recorded in [`dependencies`](Self::dependencies).
#[derive(Clone, Debug, Default)]
pub struct CoupledVariables {
    coupled: IndexMap<String, SmallVec<[(String, VariableHandle); 2]>>,
    dependencies: VariableSet,
}

impl CoupledVariables {
    /// Resolve every name under each of `keys` on `thread`. Keys that
    /// are absent from `params` are skipped; callers check
    /// [`is_coupled`](Self::is_coupled) for optional couplings.
    ///
    /// # Errors
    ///
    /// [`VariableError::UnknownVariable`] (or `UnknownThread`) for the
    /// first name that does not resolve.
    pub fn resolve(
        params: &InputParameters,
        keys: &[&str],
        subproblem: &Subproblem,
        thread: ThreadId,
    ) -> Result<Self, VariableError> {
        let data = subproblem.thread(thread)?;
        let mut out = Self::default();
        for key in keys {
            let names = params.names(key);
            if names.is_empty() {
                continue;
            }
            let mut components = SmallVec::new();
            for name in names {
                let handle = data.variables().handle(name).ok_or_else(|| {
                    VariableError::UnknownVariable {
                        name: name.to_string(),
                        thread,
                    }
                })?;
                out.dependencies.insert(handle.id);
                components.push((name.to_string(), handle));
            }
            out.coupled.insert(key.to_string(), components);
        }
        Ok(out)
    }

    /// Whether `key` named at least one variable.
    pub fn is_coupled(&self, key: &str) -> bool {
        self.coupled.contains_key(key)
    }

    /// Number of variables coupled through `key`.
    pub fn components(&self, key: &str) -> usize {
        self.coupled.get(key).map_or(0, |c| c.len())
    }

    /// Handle of component `comp` of `key`.
    pub fn handle(&self, key: &str, comp: usize) -> Option<VariableHandle> {
        self.coupled.get(key)?.get(comp).map(|(_, h)| *h)
    }

    /// Name of component `comp` of `key`.
    pub fn name(&self, key: &str, comp: usize) -> Option<&str> {
        self.coupled
            .get(key)?
            .get(comp)
            .map(|(name, _)| name.as_str())
    }

    /// Every variable this object depends on.
    pub fn dependencies(&self) -> &VariableSet {
        &self.dependencies
    }
}

/// Which contribution a save-in variable receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveInChannel {
    /// Residual contributions (`save_in`).
    Residual,
    /// Diagonal Jacobian contributions (`diag_save_in`).
    Diagonal,
}

/// A copy of one contribution destined for an auxiliary variable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SaveInRecord {
    /// Residual or diagonal Jacobian.
    pub channel: SaveInChannel,
    /// The receiving auxiliary variable.
    pub variable: VariableId,
    /// Its dof at the current node.
    pub dof: usize,
    /// Contributed value.
    pub value: Real,
}

/// Auxiliary variables that mirror a BC's contributions.
#[derive(Clone, Debug, Default)]
pub struct SaveIn {
    save_in: Vec<VariableBinding<Real>>,
    diag_save_in: Vec<VariableBinding<Real>>,
}

impl SaveIn {
    /// Bind every name under `save_in` and `diag_save_in` as a nodal
    /// auxiliary scalar.
    pub fn resolve(
        object: &str,
        params: &InputParameters,
        subproblem: &Subproblem,
        thread: ThreadId,
    ) -> Result<Self, VariableError> {
        Ok(Self {
            save_in: Self::bind_all(object, params, "save_in", subproblem, thread)?,
            diag_save_in: Self::bind_all(object, params, "diag_save_in", subproblem, thread)?,
        })
    }

    fn bind_all(
        object: &str,
        params: &InputParameters,
        key: &str,
        subproblem: &Subproblem,
        thread: ThreadId,
    ) -> Result<Vec<VariableBinding<Real>>, VariableError> {
        params
            .names(key)
            .into_iter()
            .map(|name| {
                VariableBinding::<Real>::builder(object, params)
                    .param(key)
                    .name(name)
                    .nodal(true)
                    .kind(VarKindFilter::Auxiliary)
                    .resolve(subproblem, thread)
            })
            .collect()
    }

    /// Whether any residual save-in variable is configured.
    pub fn has_save_in(&self) -> bool {
        !self.save_in.is_empty()
    }

    /// Whether any diagonal save-in variable is configured.
    pub fn has_diag_save_in(&self) -> bool {
        !self.diag_save_in.is_empty()
    }

    /// Names of the residual save-in variables.
    pub fn save_in_names(&self) -> impl Iterator<Item = &str> {
        self.save_in.iter().map(VariableBinding::name)
    }

    /// Names of the diagonal save-in variables.
    pub fn diag_save_in_names(&self) -> impl Iterator<Item = &str> {
        self.diag_save_in.iter().map(VariableBinding::name)
    }

    /// Records copying `value` into every variable of `channel`, at each
    /// variable's dof on the current node.
    pub fn records(
        &self,
        data: &ThreadData,
        node: NodeId,
        channel: SaveInChannel,
        value: Real,
    ) -> Result<Vec<SaveInRecord>, BcError> {
        let targets = match channel {
            SaveInChannel::Residual => &self.save_in,
            SaveInChannel::Diagonal => &self.diag_save_in,
        };
        targets
            .iter()
            .map(|binding| {
                let view = binding.attach(data)?;
                let dof = view.variable().dof_indices().first().copied().ok_or_else(|| {
                    BcError::NoDofAtNode {
                        variable: binding.name().to_string(),
                        node,
                    }
                })?;
                Ok(SaveInRecord {
                    channel,
                    variable: binding.id(),
                    dof,
                    value,
                })
            })
            .collect()
    }
}
