//! Benchmark profiles for the Tessera finite-element framework.
//!
//! - [`boundary_profile`]: a problem with Dirichlet BCs on the four sides
//!   of a square and the node list they apply to
//! - [`reinit_node`]: positions a thread's data on a node

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use tessera_bc::{DirichletBc, NodalBc};
use tessera_core::{BoundaryId, InputParameters, NodeId, Real, VariableDef, VariableId};
use tessera_engine::{BoundaryNode, Problem, ProblemConfig};
use tessera_vars::{ThreadData, TimeLevel};

/// Boundary names of the benchmark square.
pub const SIDES: [&str; 4] = ["left", "right", "bottom", "top"];

/// Build a problem with one Dirichlet BC per side of a square and
/// `nodes_per_side` nodes on each side.
pub fn boundary_profile(threads: usize, nodes_per_side: u64) -> (Problem, Vec<BoundaryNode>) {
    let config = ProblemConfig {
        variables: vec![VariableDef::scalar("u"), VariableDef::scalar("v")],
        boundaries: SIDES.iter().map(|s| s.to_string()).collect(),
        thread_count: Some(threads),
        seed: 42,
    };
    let mut problem = Problem::new(config).unwrap();
    for (i, side) in SIDES.iter().enumerate() {
        let params = InputParameters::new()
            .with("variable", "u")
            .with("boundary", *side)
            .with("value", i as Real);
        problem
            .add_nodal_bc(|sp, boundaries, thread, _| {
                let bc = DirichletBc::from_params(side, &params, boundaries, sp, thread)?;
                Ok(Box::new(bc) as Box<dyn NodalBc>)
            })
            .unwrap();
    }

    let nodes = (0..SIDES.len() as u16)
        .flat_map(|b| {
            (0..nodes_per_side).map(move |n| BoundaryNode {
                boundary: BoundaryId(b),
                node: NodeId(u64::from(b) * nodes_per_side + n),
            })
        })
        .collect();
    (problem, nodes)
}

/// Give `u` one dof per node, valued by the node index.
pub fn reinit_node(data: &mut ThreadData, bn: BoundaryNode) {
    if let Some(u) = data.variable_mut::<Real>(VariableId(0)) {
        u.set_dof_indices([bn.node.0 as usize]);
        u.set_dof_values(TimeLevel::Current, vec![bn.node.0 as Real]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_engine::NodalPhase;

    #[test]
    fn boundary_profile_assembles_every_node() {
        let (mut problem, nodes) = boundary_profile(2, 10);
        assert_eq!(nodes.len(), 40);
        let out = problem
            .compute_nodal_bcs(NodalPhase::Residual, &nodes, reinit_node)
            .unwrap();
        assert_eq!(out.residual().len(), 40);
    }
}
