//! Per-thread variable storage.
//!
//! [`VariableStore`] keeps scalar and vector variables in separate typed
//! vectors behind a single name index. [`VariableArity`] selects the
//! right vector for a value type, which is how a name lookup becomes a
//! type-checked reference without any dynamic casting.

use indexmap::IndexMap;
use tessera_core::{
    FieldArity, FieldValue, Real, RealVectorValue, Representation, ThreadId, VarKind,
    VariableDef, VariableId,
};

use crate::assembly::AssemblyContext;
use crate::variable::{FieldVariable, ShapeSecond};

mod sealed {
    use super::*;

    pub trait Sealed: FieldValue {
        fn variables(store: &VariableStore) -> &[FieldVariable<Self>];
        fn variables_mut(store: &mut VariableStore) -> &mut Vec<FieldVariable<Self>>;
        fn shape_seconds(
            assembly: &AssemblyContext,
        ) -> &IndexMap<VariableId, ShapeSecond<Self::Second>>;
        fn shape_seconds_mut(
            assembly: &mut AssemblyContext,
        ) -> &mut IndexMap<VariableId, ShapeSecond<Self::Second>>;
    }

    impl Sealed for Real {
        fn variables(store: &VariableStore) -> &[FieldVariable<Self>] {
            &store.scalars
        }

        fn variables_mut(store: &mut VariableStore) -> &mut Vec<FieldVariable<Self>> {
            &mut store.scalars
        }

        fn shape_seconds(
            assembly: &AssemblyContext,
        ) -> &IndexMap<VariableId, ShapeSecond<Self::Second>> {
            &assembly.scalar_phi
        }

        fn shape_seconds_mut(
            assembly: &mut AssemblyContext,
        ) -> &mut IndexMap<VariableId, ShapeSecond<Self::Second>> {
            &mut assembly.scalar_phi
        }
    }

    impl Sealed for RealVectorValue {
        fn variables(store: &VariableStore) -> &[FieldVariable<Self>] {
            &store.vectors
        }

        fn variables_mut(store: &mut VariableStore) -> &mut Vec<FieldVariable<Self>> {
            &mut store.vectors
        }

        fn shape_seconds(
            assembly: &AssemblyContext,
        ) -> &IndexMap<VariableId, ShapeSecond<Self::Second>> {
            &assembly.vector_phi
        }

        fn shape_seconds_mut(
            assembly: &mut AssemblyContext,
        ) -> &mut IndexMap<VariableId, ShapeSecond<Self::Second>> {
            &mut assembly.vector_phi
        }
    }
}

/// Value types a [`FieldVariable`] can be stored as.
///
/// Sealed: implemented for [`Real`] and [`RealVectorValue`] only.
pub trait VariableArity: sealed::Sealed {}

impl VariableArity for Real {}
impl VariableArity for RealVectorValue {}

/// Result of resolving a variable name: enough to find the variable
/// again on any thread without repeating the lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VariableHandle {
    /// Registry ID, identical across threads.
    pub id: VariableId,
    /// Scalar or vector valued.
    pub arity: FieldArity,
    /// Nonlinear or auxiliary.
    pub kind: VarKind,
    /// Discretization family.
    pub representation: Representation,
    slot: usize,
}

/// One thread's copy of every registered variable.
#[derive(Clone, Debug, Default)]
pub struct VariableStore {
    handles: IndexMap<String, VariableHandle>,
    scalars: Vec<FieldVariable<Real>>,
    vectors: Vec<FieldVariable<RealVectorValue>>,
}

impl VariableStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered variables.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether no variables are registered.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Look up a variable by name.
    pub fn handle(&self, name: &str) -> Option<VariableHandle> {
        self.handles.get(name).copied()
    }

    /// Look up a variable by ID.
    pub fn handle_by_id(&self, id: VariableId) -> Option<(&str, VariableHandle)> {
        self.handles
            .get_index(id.0 as usize)
            .map(|(name, handle)| (name.as_str(), *handle))
    }

    /// Variable names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handles.keys().map(String::as_str)
    }

    /// Typed access by ID. `None` if the ID is unknown or has another arity.
    pub fn get<T: VariableArity>(&self, id: VariableId) -> Option<&FieldVariable<T>> {
        let (_, handle) = self.handle_by_id(id)?;
        if handle.arity != T::ARITY {
            return None;
        }
        T::variables(self).get(handle.slot)
    }

    /// Typed mutable access by ID.
    pub fn get_mut<T: VariableArity>(&mut self, id: VariableId) -> Option<&mut FieldVariable<T>> {
        let (_, handle) = self.handle_by_id(id)?;
        if handle.arity != T::ARITY {
            return None;
        }
        T::variables_mut(self).get_mut(handle.slot)
    }

    /// Register a variable. The caller guarantees the name is new.
    pub(crate) fn push(&mut self, def: VariableDef) -> VariableHandle {
        let id = VariableId(self.handles.len() as u32);
        let slot = match def.arity {
            FieldArity::Scalar => self.scalars.len(),
            FieldArity::Vector => self.vectors.len(),
        };
        let handle = VariableHandle {
            id,
            arity: def.arity,
            kind: def.kind,
            representation: def.representation,
            slot,
        };
        self.handles.insert(def.name.clone(), handle);
        match def.arity {
            FieldArity::Scalar => self.scalars.push(FieldVariable::new(id, def)),
            FieldArity::Vector => self.vectors.push(FieldVariable::new(id, def)),
        }
        handle
    }

    /// Copy every variable's time levels one step back.
    pub fn shift_time_levels(&mut self) {
        self.scalars
            .iter_mut()
            .for_each(FieldVariable::shift_time_levels);
        self.vectors
            .iter_mut()
            .for_each(FieldVariable::shift_time_levels);
    }
}

/// Everything one worker thread computes with.
///
/// Each thread owns its own `ThreadData`; no two threads ever share one
/// mutably.
#[derive(Clone, Debug)]
pub struct ThreadData {
    thread: ThreadId,
    variables: VariableStore,
    assembly: AssemblyContext,
}

impl ThreadData {
    pub(crate) fn new(thread: ThreadId) -> Self {
        Self {
            thread,
            variables: VariableStore::new(),
            assembly: AssemblyContext::new(thread),
        }
    }

    /// The thread index this data belongs to.
    pub fn thread(&self) -> ThreadId {
        self.thread
    }

    /// This thread's variables.
    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    /// This thread's assembly context.
    pub fn assembly(&self) -> &AssemblyContext {
        &self.assembly
    }

    /// Mutable assembly context, for the framework to fill between solves.
    pub fn assembly_mut(&mut self) -> &mut AssemblyContext {
        &mut self.assembly
    }

    /// Typed variable access by ID.
    pub fn variable<T: VariableArity>(&self, id: VariableId) -> Option<&FieldVariable<T>> {
        self.variables.get(id)
    }

    /// Typed mutable variable access, for the framework to reinit data.
    pub fn variable_mut<T: VariableArity>(
        &mut self,
        id: VariableId,
    ) -> Option<&mut FieldVariable<T>> {
        self.variables.get_mut(id)
    }

    pub(crate) fn add_variable(&mut self, def: VariableDef) -> VariableHandle {
        let handle = self.variables.push(def);
        match handle.arity {
            FieldArity::Scalar => self.assembly.register::<Real>(handle.id),
            FieldArity::Vector => self.assembly.register::<RealVectorValue>(handle.id),
        }
        handle
    }

    /// Copy every variable's time levels one step back.
    pub fn shift_time_levels(&mut self) {
        self.variables.shift_time_levels();
    }
}
