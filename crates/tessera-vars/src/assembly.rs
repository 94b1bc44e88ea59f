//! Per-thread assembly context.
//!
//! Holds the shape-function second derivatives for each variable and the
//! quadrature data of the side currently being integrated. The framework
//! refills it as it moves between elements; consumers read it through
//! [`VariableView`](crate::VariableView) and side postprocessors.

use indexmap::IndexMap;
use tessera_core::{Real, RealTensorValue, RealVectorValue, ThreadId, VariableId, VectorSecond};

use crate::store::VariableArity;
use crate::variable::ShapeSecond;

/// Quadrature data on the current element side.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceQuadrature {
    /// Physical quadrature point locations.
    pub q_points: Vec<RealVectorValue>,
    /// Jacobian determinant times quadrature weight per point.
    pub jxw: Vec<Real>,
    /// Coordinate-system factor per point (1 for Cartesian, 2πr for RZ).
    pub coord: Vec<Real>,
    /// Outward unit normals per point.
    pub normals: Vec<RealVectorValue>,
    /// Measure of the current side.
    pub side_volume: Real,
}

impl FaceQuadrature {
    /// Number of quadrature points on the side.
    pub fn n_qp(&self) -> usize {
        self.jxw.len()
    }

    /// Whether the per-point arrays agree in length.
    pub fn is_consistent(&self) -> bool {
        let n = self.jxw.len();
        self.coord.len() == n && self.normals.len() == n && self.q_points.len() == n
    }
}

/// One thread's assembly state.
#[derive(Clone, Debug)]
pub struct AssemblyContext {
    thread: ThreadId,
    pub(crate) scalar_phi: IndexMap<VariableId, ShapeSecond<RealTensorValue>>,
    pub(crate) vector_phi: IndexMap<VariableId, ShapeSecond<VectorSecond>>,
    face: FaceQuadrature,
}

impl AssemblyContext {
    /// An empty context for `thread`.
    pub fn new(thread: ThreadId) -> Self {
        Self {
            thread,
            scalar_phi: IndexMap::new(),
            vector_phi: IndexMap::new(),
            face: FaceQuadrature::default(),
        }
    }

    /// Thread this context belongs to.
    pub fn thread(&self) -> ThreadId {
        self.thread
    }

    /// Shape-function second derivatives for `var` at interior points.
    ///
    /// `None` if `var` is unknown or of another arity.
    pub fn second_phi<T: VariableArity>(&self, var: VariableId) -> Option<&[Vec<T::Second>]> {
        T::shape_seconds(self).get(&var).map(|s| s.volume.as_slice())
    }

    /// Shape-function second derivatives for `var` at side points.
    pub fn second_phi_face<T: VariableArity>(
        &self,
        var: VariableId,
    ) -> Option<&[Vec<T::Second>]> {
        T::shape_seconds(self).get(&var).map(|s| s.face.as_slice())
    }

    /// Replace the shape-function second derivatives for `var`.
    pub fn set_second_phi<T: VariableArity>(
        &mut self,
        var: VariableId,
        second: ShapeSecond<T::Second>,
    ) {
        T::shape_seconds_mut(self).insert(var, second);
    }

    /// Current side quadrature.
    pub fn face(&self) -> &FaceQuadrature {
        &self.face
    }

    /// Replace the current side quadrature.
    pub fn set_face(&mut self, face: FaceQuadrature) {
        self.face = face;
    }

    pub(crate) fn register<T: VariableArity>(&mut self, var: VariableId) {
        T::shape_seconds_mut(self)
            .entry(var)
            .or_insert_with(ShapeSecond::empty);
    }
}
