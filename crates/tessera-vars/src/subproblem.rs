//! The variable registry shared by all consumers of a problem.

use tessera_core::{FieldArity, ThreadId, VarKindFilter, VariableDef, VariableError, VariableId};
use tracing::debug;

use crate::store::{ThreadData, VariableHandle};

/// Registry of variables and per-thread computation contexts.
///
/// Every variable exists once per thread, with the same [`VariableId`]
/// everywhere. Threads are addressed by [`ThreadId`] and each owns a
/// disjoint [`ThreadData`].
#[derive(Clone, Debug)]
pub struct Subproblem {
    threads: Vec<ThreadData>,
}

impl Subproblem {
    /// Create a registry with `n_threads` thread contexts (at least one).
    pub fn new(n_threads: usize) -> Self {
        let threads = (0..n_threads.max(1))
            .map(|t| ThreadData::new(ThreadId(t)))
            .collect();
        Self { threads }
    }

    /// Number of thread contexts.
    pub fn n_threads(&self) -> usize {
        self.threads.len()
    }

    /// Number of registered variables.
    pub fn n_variables(&self) -> usize {
        self.threads[0].variables().len()
    }

    /// Whether a variable called `name` is registered.
    pub fn has_variable(&self, name: &str) -> bool {
        self.threads[0].variables().handle(name).is_some()
    }

    /// Register a variable on every thread.
    pub fn add_variable(&mut self, def: VariableDef) -> Result<VariableId, VariableError> {
        if self.has_variable(&def.name) {
            return Err(VariableError::DuplicateVariable { name: def.name });
        }
        let mut id = VariableId(0);
        for data in &mut self.threads {
            id = data.add_variable(def.clone()).id;
        }
        debug!(
            name = %def.name,
            id = id.0,
            arity = %def.arity,
            kind = %def.kind,
            "registered variable"
        );
        Ok(id)
    }

    /// Resolve a variable name on `thread`, checking kind and arity.
    pub fn resolve(
        &self,
        thread: ThreadId,
        name: &str,
        kind: VarKindFilter,
        arity: FieldArity,
    ) -> Result<VariableHandle, VariableError> {
        let handle = self
            .thread(thread)?
            .variables()
            .handle(name)
            .ok_or_else(|| VariableError::UnknownVariable {
                name: name.to_string(),
                thread,
            })?;
        if !kind.accepts(handle.kind) {
            return Err(VariableError::KindMismatch {
                name: name.to_string(),
                expected: kind,
                actual: handle.kind,
            });
        }
        if handle.arity != arity {
            return Err(VariableError::ArityMismatch {
                name: name.to_string(),
                expected: arity,
                actual: handle.arity,
            });
        }
        Ok(handle)
    }

    /// Data of one thread.
    pub fn thread(&self, thread: ThreadId) -> Result<&ThreadData, VariableError> {
        let n_threads = self.threads.len();
        self.threads
            .get(thread.0)
            .ok_or(VariableError::UnknownThread { thread, n_threads })
    }

    /// Mutable data of one thread.
    pub fn thread_mut(&mut self, thread: ThreadId) -> Result<&mut ThreadData, VariableError> {
        let n_threads = self.threads.len();
        self.threads
            .get_mut(thread.0)
            .ok_or(VariableError::UnknownThread { thread, n_threads })
    }

    /// All thread contexts, in thread order.
    pub fn threads(&self) -> &[ThreadData] {
        &self.threads
    }

    /// All thread contexts, mutably. Each element can be handed to a
    /// different worker.
    pub fn threads_mut(&mut self) -> &mut [ThreadData] {
        &mut self.threads
    }

    /// Copy every variable's time levels one step back on every thread.
    pub fn shift_time_levels(&mut self) {
        self.threads
            .iter_mut()
            .for_each(ThreadData::shift_time_levels);
    }
}
