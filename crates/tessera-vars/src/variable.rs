//! Time-leveled storage for a single field variable.
//!
//! A [`FieldVariable`] holds the data the framework computes for the
//! entity (node or element) the variable is currently reinitialized on:
//! dof values and their time derivatives, plus the interpolated solution,
//! gradient and second derivative at each quadrature point. The data is
//! written by the framework between solves; consumers only read it.

use tessera_core::{DofIndices, FieldValue, Real, VariableDef, VariableId};

/// Which solution state a quantity belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeLevel {
    /// The solution being computed.
    Current,
    /// The previous converged solution.
    Old,
    /// The solution before `Old`.
    Older,
}

impl TimeLevel {
    fn index(self) -> usize {
        match self {
            Self::Current => 0,
            Self::Old => 1,
            Self::Older => 2,
        }
    }
}

/// One quantity stored at the three solution time levels.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeLevels<V> {
    levels: [Vec<V>; 3],
}

impl<V: Clone> TimeLevels<V> {
    /// Empty storage at every level.
    pub fn new() -> Self {
        Self {
            levels: [Vec::new(), Vec::new(), Vec::new()],
        }
    }

    /// Values at `level`.
    pub fn get(&self, level: TimeLevel) -> &[V] {
        &self.levels[level.index()]
    }

    /// Replace the values at `level`.
    pub fn set(&mut self, level: TimeLevel, values: Vec<V>) {
        self.levels[level.index()] = values;
    }

    /// Copy current into old and old into older.
    pub fn shift(&mut self) {
        let [current, old, older] = &mut self.levels;
        older.clone_from(old);
        old.clone_from(current);
    }
}

impl<V: Clone> Default for TimeLevels<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Second derivatives of shape (or test) functions, indexed
/// `[function][qp]`, on the element interior and on the current side.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeSecond<S> {
    /// Interior quadrature points.
    pub volume: Vec<Vec<S>>,
    /// Side quadrature points.
    pub face: Vec<Vec<S>>,
}

impl<S> ShapeSecond<S> {
    /// No shape functions evaluated yet.
    pub fn empty() -> Self {
        Self {
            volume: Vec::new(),
            face: Vec::new(),
        }
    }
}

impl<S> Default for ShapeSecond<S> {
    fn default() -> Self {
        Self::empty()
    }
}

/// One physical unknown on one thread.
///
/// Dofs are always scalars: a vector variable's dofs are its individual
/// components, which is why nodal value access is only structurally
/// valid for scalar variables.
#[derive(Clone, Debug)]
pub struct FieldVariable<T: FieldValue> {
    id: VariableId,
    def: VariableDef,
    dof_indices: DofIndices,
    dof_values: TimeLevels<Real>,
    dof_dot: Vec<Real>,
    dof_du_dot_du: Vec<Real>,
    sln: TimeLevels<T>,
    grad_sln: TimeLevels<T::Gradient>,
    second_sln: TimeLevels<T::Second>,
    u_dot: Vec<T>,
    du_dot_du: Vec<Real>,
    second_test: ShapeSecond<T::Second>,
}

impl<T: FieldValue> FieldVariable<T> {
    /// Create an empty variable. Storage is filled by the framework.
    pub fn new(id: VariableId, def: VariableDef) -> Self {
        Self {
            id,
            def,
            dof_indices: DofIndices::new(),
            dof_values: TimeLevels::new(),
            dof_dot: Vec::new(),
            dof_du_dot_du: Vec::new(),
            sln: TimeLevels::new(),
            grad_sln: TimeLevels::new(),
            second_sln: TimeLevels::new(),
            u_dot: Vec::new(),
            du_dot_du: Vec::new(),
            second_test: ShapeSecond::empty(),
        }
    }

    /// Registry ID.
    pub fn id(&self) -> VariableId {
        self.id
    }

    /// Variable name.
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Full definition.
    pub fn def(&self) -> &VariableDef {
        &self.def
    }

    /// Global dof indices of the current entity.
    pub fn dof_indices(&self) -> &[usize] {
        &self.dof_indices
    }

    /// Dof values at `level`.
    pub fn dof_values(&self, level: TimeLevel) -> &[Real] {
        self.dof_values.get(level)
    }

    /// Time derivative of the dof values.
    pub fn dof_values_dot(&self) -> &[Real] {
        &self.dof_dot
    }

    /// Sensitivity of the dof time derivative to the current dof values.
    pub fn dof_values_du_dot_du(&self) -> &[Real] {
        &self.dof_du_dot_du
    }

    /// Solution at quadrature points at `level`.
    pub fn sln(&self, level: TimeLevel) -> &[T] {
        self.sln.get(level)
    }

    /// Solution gradient at quadrature points at `level`.
    pub fn grad_sln(&self, level: TimeLevel) -> &[T::Gradient] {
        self.grad_sln.get(level)
    }

    /// Solution second derivative at quadrature points at `level`.
    pub fn second_sln(&self, level: TimeLevel) -> &[T::Second] {
        self.second_sln.get(level)
    }

    /// Solution time derivative at quadrature points.
    pub fn u_dot(&self) -> &[T] {
        &self.u_dot
    }

    /// Sensitivity of the quadrature-point time derivative.
    pub fn du_dot_du(&self) -> &[Real] {
        &self.du_dot_du
    }

    /// Second derivatives of this variable's test functions.
    pub fn second_test(&self) -> &ShapeSecond<T::Second> {
        &self.second_test
    }

    /// Set the global dof indices of the current entity.
    pub fn set_dof_indices(&mut self, indices: impl IntoIterator<Item = usize>) {
        self.dof_indices = indices.into_iter().collect();
    }

    /// Set the dof values at `level`.
    pub fn set_dof_values(&mut self, level: TimeLevel, values: Vec<Real>) {
        self.dof_values.set(level, values);
    }

    /// Set the dof time derivative and its sensitivity.
    pub fn set_dof_dot(&mut self, dot: Vec<Real>, du_dot_du: Vec<Real>) {
        self.dof_dot = dot;
        self.dof_du_dot_du = du_dot_du;
    }

    /// Set the quadrature-point solution at `level`.
    pub fn set_sln(&mut self, level: TimeLevel, values: Vec<T>) {
        self.sln.set(level, values);
    }

    /// Set the quadrature-point gradient at `level`.
    pub fn set_grad_sln(&mut self, level: TimeLevel, values: Vec<T::Gradient>) {
        self.grad_sln.set(level, values);
    }

    /// Set the quadrature-point second derivative at `level`.
    pub fn set_second_sln(&mut self, level: TimeLevel, values: Vec<T::Second>) {
        self.second_sln.set(level, values);
    }

    /// Set the quadrature-point time derivative and its sensitivity.
    pub fn set_u_dot(&mut self, dot: Vec<T>, du_dot_du: Vec<Real>) {
        self.u_dot = dot;
        self.du_dot_du = du_dot_du;
    }

    /// Set the test-function second derivatives.
    pub fn set_second_test(&mut self, second: ShapeSecond<T::Second>) {
        self.second_test = second;
    }

    /// Copy every time-leveled quantity one level back.
    ///
    /// Called at a timestep boundary, after the current solution has
    /// converged.
    pub fn shift_time_levels(&mut self) {
        self.dof_values.shift();
        self.sln.shift();
        self.grad_sln.shift();
        self.second_sln.shift();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::RealVectorValue;

    #[test]
    fn shift_moves_levels_back() {
        let mut var = FieldVariable::<Real>::new(VariableId(0), VariableDef::scalar("u"));
        var.set_dof_values(TimeLevel::Current, vec![3.0]);
        var.set_dof_values(TimeLevel::Old, vec![2.0]);
        var.set_dof_values(TimeLevel::Older, vec![1.0]);
        var.set_sln(TimeLevel::Current, vec![30.0, 31.0]);

        var.shift_time_levels();

        assert_eq!(var.dof_values(TimeLevel::Current), &[3.0]);
        assert_eq!(var.dof_values(TimeLevel::Old), &[3.0]);
        assert_eq!(var.dof_values(TimeLevel::Older), &[2.0]);
        assert_eq!(var.sln(TimeLevel::Old), &[30.0, 31.0]);
        assert!(var.sln(TimeLevel::Older).is_empty());
    }

    #[test]
    fn vector_variable_stores_tensor_gradients() {
        let mut var =
            FieldVariable::<RealVectorValue>::new(VariableId(1), VariableDef::vector("velocity"));
        let grad = tessera_core::RealTensorValue::identity();
        var.set_grad_sln(TimeLevel::Current, vec![grad]);
        assert_eq!(var.grad_sln(TimeLevel::Current), &[grad]);
        assert_eq!(var.name(), "velocity");
    }

    #[test]
    fn dof_indices_round_trip() {
        let mut var = FieldVariable::<Real>::new(VariableId(0), VariableDef::scalar("u"));
        var.set_dof_indices([4, 9]);
        assert_eq!(var.dof_indices(), &[4, 9]);
    }
}
