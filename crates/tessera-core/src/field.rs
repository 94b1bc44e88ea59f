//! Variable definitions, arity tags, and the [`VariableSet`] bitset.

use std::fmt;

use smallvec::SmallVec;

use crate::id::VariableId;
use crate::value::{Real, RealTensorValue, RealVectorValue, VectorSecond};

/// Number of components a field variable carries per point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldArity {
    /// One value per point (temperature, pressure).
    Scalar,
    /// One spatial vector per point (velocity, displacement).
    Vector,
}

impl fmt::Display for FieldArity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => write!(f, "scalar"),
            Self::Vector => write!(f, "vector"),
        }
    }
}

/// Which system a variable belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VarKind {
    /// Solved for by the nonlinear system.
    Nonlinear,
    /// Computed explicitly from other quantities.
    Auxiliary,
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nonlinear => write!(f, "nonlinear"),
            Self::Auxiliary => write!(f, "auxiliary"),
        }
    }
}

/// Kind constraint applied when resolving a variable by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VarKindFilter {
    /// Only nonlinear variables match.
    Nonlinear,
    /// Only auxiliary variables match.
    Auxiliary,
    /// Any variable matches.
    Any,
}

impl VarKindFilter {
    /// Whether a variable of `kind` satisfies this filter.
    pub fn accepts(self, kind: VarKind) -> bool {
        match self {
            Self::Nonlinear => kind == VarKind::Nonlinear,
            Self::Auxiliary => kind == VarKind::Auxiliary,
            Self::Any => true,
        }
    }
}

impl fmt::Display for VarKindFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nonlinear => write!(f, "nonlinear"),
            Self::Auxiliary => write!(f, "auxiliary"),
            Self::Any => write!(f, "any"),
        }
    }
}

/// Where a quantity is evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Representation {
    /// Stored once per mesh node as a degree of freedom.
    Nodal,
    /// Interpolated at quadrature points within an element.
    Interpolated,
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nodal => write!(f, "nodal"),
            Self::Interpolated => write!(f, "interpolated"),
        }
    }
}

/// Definition of a variable registered with a subproblem.
///
/// `representation` describes the variable's discretization (a nodal
/// Lagrange family versus an elemental constant-monomial family); it is
/// independent of how a consumer chooses to view the variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableDef {
    /// Unique variable name.
    pub name: String,
    /// Scalar or vector valued.
    pub arity: FieldArity,
    /// Nonlinear or auxiliary system.
    pub kind: VarKind,
    /// Discretization family.
    pub representation: Representation,
}

impl VariableDef {
    /// A nodal nonlinear scalar variable.
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arity: FieldArity::Scalar,
            kind: VarKind::Nonlinear,
            representation: Representation::Nodal,
        }
    }

    /// A nodal nonlinear vector variable.
    pub fn vector(name: impl Into<String>) -> Self {
        Self {
            arity: FieldArity::Vector,
            ..Self::scalar(name)
        }
    }

    /// Move this variable into the auxiliary system.
    pub fn auxiliary(mut self) -> Self {
        self.kind = VarKind::Auxiliary;
        self
    }

    /// Use an elemental (interpolated) discretization.
    pub fn interpolated(mut self) -> Self {
        self.representation = Representation::Interpolated;
        self
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("variable name must not be empty".to_string());
        }
        if self.name.chars().any(char::is_whitespace) {
            return Err(format!(
                "variable name '{}' must not contain whitespace",
                self.name
            ));
        }
        Ok(())
    }
}

/// Arity tag implemented by the point-value types a variable can hold.
///
/// Generic code is written once over `T: FieldValue` and branches on
/// [`FieldValue::ARITY`] where scalar and vector fields behave
/// differently.
pub trait FieldValue: Copy + fmt::Debug + Default + PartialEq + Send + Sync + 'static {
    /// The arity this type represents.
    const ARITY: FieldArity;

    /// Spatial gradient of one point value.
    type Gradient: Copy + fmt::Debug + Default + PartialEq + Send + Sync + 'static;

    /// Spatial second derivative of one point value.
    type Second: Copy + fmt::Debug + Default + PartialEq + Send + Sync + 'static;

    /// View scalar degree-of-freedom values as point values of this type.
    ///
    /// Returns `None` when a single dof is not structurally a point value,
    /// which is the case for vector fields.
    fn from_dofs(dofs: &[Real]) -> Option<&[Self]>;
}

impl FieldValue for Real {
    const ARITY: FieldArity = FieldArity::Scalar;
    type Gradient = RealVectorValue;
    type Second = RealTensorValue;

    fn from_dofs(dofs: &[Real]) -> Option<&[Self]> {
        Some(dofs)
    }
}

impl FieldValue for RealVectorValue {
    const ARITY: FieldArity = FieldArity::Vector;
    type Gradient = RealTensorValue;
    type Second = VectorSecond;

    fn from_dofs(_dofs: &[Real]) -> Option<&[Self]> {
        None
    }
}

/// Variables an object couples to, as a bitset over [`VariableId`].
///
/// The first 64 IDs fit inline. The engine walks the set to decide
/// which off-diagonal Jacobian blocks to request from a BC.
#[derive(Clone, Debug, Default)]
pub struct VariableSet {
    words: SmallVec<[u64; 1]>,
}

impl VariableSet {
    /// Add `var` to the set.
    pub fn insert(&mut self, var: VariableId) {
        let (word, mask) = Self::locate(var);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= mask;
    }

    /// Whether `var` is in the set.
    pub fn contains(&self, var: VariableId) -> bool {
        let (word, mask) = Self::locate(var);
        self.words.get(word).is_some_and(|w| w & mask != 0)
    }

    /// Members in ascending ID order.
    pub fn iter(&self) -> VariableSetIter<'_> {
        VariableSetIter {
            words: &self.words,
            index: 0,
            pending: self.words.first().copied().unwrap_or(0),
        }
    }

    fn locate(var: VariableId) -> (usize, u64) {
        let i = var.0 as usize;
        (i / 64, 1u64 << (i % 64))
    }
}

/// Ascending iterator over a [`VariableSet`].
pub struct VariableSetIter<'a> {
    words: &'a [u64],
    index: usize,
    pending: u64,
}

impl Iterator for VariableSetIter<'_> {
    type Item = VariableId;

    fn next(&mut self) -> Option<VariableId> {
        while self.pending == 0 {
            self.index += 1;
            self.pending = *self.words.get(self.index)?;
        }
        let bit = self.pending.trailing_zeros() as usize;
        // Clear the lowest set bit.
        self.pending &= self.pending - 1;
        Some(VariableId((self.index * 64 + bit) as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn kind_filter_accepts() {
        assert!(VarKindFilter::Any.accepts(VarKind::Auxiliary));
        assert!(VarKindFilter::Nonlinear.accepts(VarKind::Nonlinear));
        assert!(!VarKindFilter::Nonlinear.accepts(VarKind::Auxiliary));
        assert!(!VarKindFilter::Auxiliary.accepts(VarKind::Nonlinear));
    }

    #[test]
    fn def_builders_compose() {
        let def = VariableDef::vector("velocity").auxiliary().interpolated();
        assert_eq!(def.arity, FieldArity::Vector);
        assert_eq!(def.kind, VarKind::Auxiliary);
        assert_eq!(def.representation, Representation::Interpolated);
        assert!(def.validate().is_ok());
    }

    #[test]
    fn def_rejects_blank_and_spaced_names() {
        assert!(VariableDef::scalar("").validate().is_err());
        assert!(VariableDef::scalar("   ").validate().is_err());
        assert!(VariableDef::scalar("heat flux").validate().is_err());
    }

    #[test]
    fn scalar_dofs_reinterpret_vector_dofs_do_not() {
        let dofs = [1.0, 2.0];
        assert_eq!(<Real as FieldValue>::from_dofs(&dofs), Some(&dofs[..]));
        assert!(<RealVectorValue as FieldValue>::from_dofs(&dofs).is_none());
    }

    #[test]
    fn empty_set_yields_nothing() {
        let set = VariableSet::default();
        assert!(!set.contains(VariableId(0)));
        assert_eq!(set.iter().next(), None);
    }

    #[test]
    fn members_span_words() {
        let mut set = VariableSet::default();
        for id in [130, 3, 64, 3, 63] {
            set.insert(VariableId(id));
        }
        let ids: Vec<u32> = set.iter().map(|v| v.0).collect();
        assert_eq!(ids, vec![3, 63, 64, 130]);
        assert!(!set.contains(VariableId(65)));
        assert!(!set.contains(VariableId(1000)));
    }

    proptest! {
        #[test]
        fn iter_matches_sorted_unique_inserts(ids in prop::collection::vec(0u32..200, 0..32)) {
            let mut set = VariableSet::default();
            for &id in &ids {
                set.insert(VariableId(id));
            }
            let mut expected = ids.clone();
            expected.sort_unstable();
            expected.dedup();
            let got: Vec<u32> = set.iter().map(|v| v.0).collect();
            prop_assert_eq!(got, expected);
            for id in ids {
                prop_assert!(set.contains(VariableId(id)));
            }
        }
    }
}
