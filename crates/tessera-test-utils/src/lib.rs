//! Test fixtures and mock objects for Tessera development.
//!
//! [`standard_subproblem`] registers the variables most tests use;
//! [`set_nodal`] and [`set_side`] position one thread's data on a node or
//! on an element side the way the framework's reinit does. Mock boundary
//! conditions live in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use tessera_core::{Real, RealVectorValue, VariableDef, VariableId, MESH_DIM};
use tessera_vars::{FaceQuadrature, Subproblem, ThreadData, TimeLevel};

pub const TEMPERATURE: VariableId = VariableId(0);
pub const VELOCITY: VariableId = VariableId(1);
pub const PRESSURE: VariableId = VariableId(2);
pub const RESIDUAL_SAVE: VariableId = VariableId(3);
pub const DIAG_SAVE: VariableId = VariableId(4);

/// The variables every test problem starts from, in ID order.
pub fn standard_variables() -> Vec<VariableDef> {
    vec![
        VariableDef::scalar("temperature"),
        VariableDef::vector("velocity"),
        VariableDef::scalar("pressure"),
        VariableDef::scalar("residual_save").auxiliary(),
        VariableDef::scalar("diag_save").auxiliary(),
    ]
}

/// Boundary names of a unit square.
pub fn square_boundaries() -> Vec<String> {
    ["left", "right", "bottom", "top"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// A subproblem with [`standard_variables`] on `n_threads` threads.
pub fn standard_subproblem(n_threads: usize) -> Subproblem {
    let mut sp = Subproblem::new(n_threads);
    for def in standard_variables() {
        sp.add_variable(def).expect("standard variables are unique");
    }
    sp
}

/// Position a scalar variable on a node: one dof at `dof` with `value`.
pub fn set_nodal(data: &mut ThreadData, var: VariableId, dof: usize, value: Real) {
    let v = data
        .variable_mut::<Real>(var)
        .expect("scalar variable registered");
    v.set_dof_indices([dof]);
    v.set_dof_values(TimeLevel::Current, vec![value]);
}

/// Position a vector variable on a node: one dof per component starting
/// at `first_dof`.
pub fn set_nodal_vector(data: &mut ThreadData, var: VariableId, first_dof: usize) {
    let v = data
        .variable_mut::<RealVectorValue>(var)
        .expect("vector variable registered");
    v.set_dof_indices(first_dof..first_dof + MESH_DIM);
}

/// A flat face with `n_qp` points, equal weights summing to `area`, and
/// a constant outward `normal`.
pub fn flat_face(n_qp: usize, area: Real, normal: RealVectorValue) -> FaceQuadrature {
    let w = area / n_qp.max(1) as Real;
    FaceQuadrature {
        q_points: (0..n_qp)
            .map(|qp| RealVectorValue::new(qp as Real, 0.0, 0.0))
            .collect(),
        jxw: vec![w; n_qp],
        coord: vec![1.0; n_qp],
        normals: vec![normal; n_qp],
        side_volume: area,
    }
}

/// Position a scalar variable on a side: face quadrature plus values and
/// gradients at its points.
pub fn set_side(
    data: &mut ThreadData,
    var: VariableId,
    face: FaceQuadrature,
    u: Vec<Real>,
    grad_u: Vec<RealVectorValue>,
) {
    data.assembly_mut().set_face(face);
    let v = data
        .variable_mut::<Real>(var)
        .expect("scalar variable registered");
    v.set_sln(TimeLevel::Current, u);
    v.set_grad_sln(TimeLevel::Current, grad_u);
}

/// Relative-or-absolute float comparison for assembled values.
pub fn approx_eq(a: Real, b: Real) -> bool {
    (a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_ids_match_declaration_order() {
        let sp = standard_subproblem(2);
        let data = &sp.threads()[1];
        assert_eq!(data.variables().handle("temperature").map(|h| h.id), Some(TEMPERATURE));
        assert_eq!(data.variables().handle("velocity").map(|h| h.id), Some(VELOCITY));
        assert_eq!(data.variables().handle("diag_save").map(|h| h.id), Some(DIAG_SAVE));
    }

    #[test]
    fn flat_face_is_consistent() {
        let face = flat_face(4, 2.0, RealVectorValue::new(1.0, 0.0, 0.0));
        assert!(face.is_consistent());
        assert!(approx_eq(face.jxw.iter().sum(), 2.0));
    }
}
