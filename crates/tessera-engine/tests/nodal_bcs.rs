//! Integration test: nodal boundary conditions evaluated across threads.
//!
//! Nodes are spread round-robin over the worker threads. Every test
//! checks the assembled entries against a serial reference, so the
//! partition must not change what is assembled, only where.

use std::collections::BTreeMap;

use proptest::prelude::*;
use tessera_bc::{BcError, DirichletBc, NodalBc, NoisyDirichletBc, SaveInChannel};
use tessera_core::{BoundaryId, InputParameters, NodeId, Real};
use tessera_engine::{BoundaryNode, EngineError, NodalPhase, Problem, ProblemConfig};
use tessera_test_utils::fixtures::{ConstantBc, FailingBc};
use tessera_test_utils::{
    set_nodal, square_boundaries, standard_variables, DIAG_SAVE, PRESSURE, RESIDUAL_SAVE,
    TEMPERATURE,
};
use tessera_vars::ThreadData;

const LEFT: BoundaryId = BoundaryId(0);
const RIGHT: BoundaryId = BoundaryId(1);

// ── Helpers ──────────────────────────────────────────────────────────

fn problem(threads: usize) -> Problem {
    Problem::new(ProblemConfig {
        variables: standard_variables(),
        boundaries: square_boundaries(),
        thread_count: Some(threads),
        seed: 11,
    })
    .unwrap()
}

/// Temperature dof `n` holds `300 + n`; pressure and the save-in
/// variables get their own dof ranges.
fn reinit(data: &mut ThreadData, bn: BoundaryNode) {
    let n = bn.node.0 as usize;
    set_nodal(data, TEMPERATURE, n, 300.0 + n as Real);
    set_nodal(data, PRESSURE, 1000 + n, 0.0);
    set_nodal(data, RESIDUAL_SAVE, 2000 + n, 0.0);
    set_nodal(data, DIAG_SAVE, 3000 + n, 0.0);
}

fn nodes(boundary: BoundaryId, ids: impl IntoIterator<Item = u64>) -> Vec<BoundaryNode> {
    ids.into_iter()
        .map(|n| BoundaryNode {
            boundary,
            node: NodeId(n),
        })
        .collect()
}

fn add_dirichlet(problem: &mut Problem, params: InputParameters) {
    problem
        .add_nodal_bc(|sp, boundaries, thread, _| {
            let bc = DirichletBc::from_params("fix_temperature", &params, boundaries, sp, thread)?;
            Ok(Box::new(bc) as Box<dyn NodalBc>)
        })
        .unwrap();
}

fn dirichlet_params(boundary: &str, value: Real) -> InputParameters {
    InputParameters::new()
        .with("variable", "temperature")
        .with("boundary", boundary)
        .with("value", value)
}

fn residual_map(problem: &mut Problem, nodes: &[BoundaryNode]) -> BTreeMap<usize, Real> {
    let out = problem
        .compute_nodal_bcs(NodalPhase::Residual, nodes, reinit)
        .unwrap();
    out.residual().iter().copied().collect()
}

// ── Residual ─────────────────────────────────────────────────────────

#[test]
fn dirichlet_residual_is_u_minus_value() {
    let mut problem = problem(3);
    add_dirichlet(&mut problem, dirichlet_params("left", 310.5));
    let residual = residual_map(&mut problem, &nodes(LEFT, 0..7));

    assert_eq!(residual.len(), 7);
    for (dof, r) in residual {
        assert_eq!(r, 300.0 + dof as Real - 310.5);
    }
}

#[test]
fn thread_count_does_not_change_residual() {
    let boundary_nodes = nodes(LEFT, 0..13);
    let mut serial = problem(1);
    add_dirichlet(&mut serial, dirichlet_params("left", 2.0));
    let expected = residual_map(&mut serial, &boundary_nodes);

    for threads in [2, 4, 8] {
        let mut parallel = problem(threads);
        add_dirichlet(&mut parallel, dirichlet_params("left", 2.0));
        assert_eq!(residual_map(&mut parallel, &boundary_nodes), expected);
    }
}

#[test]
fn bcs_only_touch_their_own_boundary() {
    let mut problem = problem(2);
    add_dirichlet(&mut problem, dirichlet_params("left", 0.0));
    let mut all = nodes(LEFT, 0..3);
    all.extend(nodes(RIGHT, 10..14));
    let residual = residual_map(&mut problem, &all);
    assert_eq!(residual.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
}

#[test]
fn noisy_dirichlet_is_reproducible_across_thread_counts() {
    let params = InputParameters::new()
        .with("variable", "temperature")
        .with("boundary", "right")
        .with("value", 1.0)
        .with("amplitude", 0.25)
        .with("seed", 3i64);
    let add = |problem: &mut Problem| {
        problem
            .add_nodal_bc(|sp, boundaries, thread, seed| {
                let bc =
                    NoisyDirichletBc::from_params("noisy", &params, boundaries, sp, thread, seed)?;
                Ok(Box::new(bc) as Box<dyn NodalBc>)
            })
            .unwrap();
    };
    let boundary_nodes = nodes(RIGHT, 0..9);

    let mut a = problem(1);
    add(&mut a);
    let mut b = problem(3);
    add(&mut b);
    let ra = residual_map(&mut a, &boundary_nodes);
    let rb = residual_map(&mut b, &boundary_nodes);
    assert_eq!(ra, rb);
    for (dof, r) in ra {
        let target = 300.0 + dof as Real - r;
        assert!((0.75..=1.25).contains(&target), "target {target}");
    }
}

// ── Jacobian ─────────────────────────────────────────────────────────

#[test]
fn jacobian_has_diagonal_and_coupling_entries() {
    let mut problem = problem(2);
    let params = InputParameters::new()
        .with("variable", "temperature")
        .with("boundary", "left")
        .with("coupled_variables", "pressure");
    problem
        .add_nodal_bc(|sp, boundaries, thread, _| {
            let bc = ConstantBc::new("coupled", &params, boundaries, sp, thread)?
                .with_diagonal(2.0)
                .with_coupling(-0.5);
            Ok(Box::new(bc) as Box<dyn NodalBc>)
        })
        .unwrap();

    let out = problem
        .compute_nodal_bcs(NodalPhase::Jacobian, &nodes(LEFT, 0..4), reinit)
        .unwrap();
    let entries: BTreeMap<(usize, usize), Real> =
        out.jacobian().iter().map(|&(r, c, v)| ((r, c), v)).collect();

    assert_eq!(entries.len(), 8);
    for n in 0..4 {
        assert_eq!(entries[&(n, n)], 2.0);
        assert_eq!(entries[&(n, 1000 + n)], -0.5);
    }
    assert!(out.residual().is_empty());
}

#[test]
fn off_diagonal_entries_follow_declared_coupling() {
    let mut problem = problem(3);
    let params = InputParameters::new()
        .with("variable", "temperature")
        .with("boundary", "left");
    problem
        .add_nodal_bc(|sp, boundaries, thread, _| {
            let bc = ConstantBc::new("uncoupled", &params, boundaries, sp, thread)?
                .with_coupling(4.0);
            Ok(Box::new(bc) as Box<dyn NodalBc>)
        })
        .unwrap();

    let out = problem
        .compute_nodal_bcs(NodalPhase::Jacobian, &nodes(LEFT, 0..5), reinit)
        .unwrap();
    let mut entries: Vec<_> = out.jacobian().to_vec();
    entries.sort_by_key(|&(r, c, _)| (r, c));
    let expected: Vec<_> = (0..5).map(|n| (n, n, 1.0)).collect();
    assert_eq!(entries, expected);
}

#[test]
fn eigen_bcs_contribute_zeros_and_no_coupling() {
    let mut problem = problem(2);
    let params = InputParameters::new()
        .with("variable", "temperature")
        .with("boundary", "left")
        .with("value", 5.0)
        .with("coupled_variables", "pressure");
    problem
        .add_nodal_bc(|sp, boundaries, thread, _| {
            let bc = ConstantBc::new("coupled", &params, boundaries, sp, thread)?
                .with_value(5.0)
                .with_coupling(3.0);
            Ok(Box::new(bc) as Box<dyn NodalBc>)
        })
        .unwrap();
    problem.set_bcs_on_eigen(true);

    let boundary_nodes = nodes(LEFT, 0..3);
    let residual = problem
        .compute_nodal_bcs(NodalPhase::Residual, &boundary_nodes, reinit)
        .unwrap();
    assert_eq!(residual.residual().len(), 3);
    assert!(residual.residual().iter().all(|&(_, r)| r == 0.0));

    let jacobian = problem
        .compute_nodal_bcs(NodalPhase::Jacobian, &boundary_nodes, reinit)
        .unwrap();
    assert_eq!(jacobian.jacobian().len(), 3);
    assert!(jacobian.jacobian().iter().all(|&(r, c, v)| r == c && v == 0.0));
}

// ── Save-in ──────────────────────────────────────────────────────────

#[test]
fn save_in_mirrors_residual_and_diagonal() {
    let mut problem = problem(2);
    let params = dirichlet_params("left", 300.0)
        .with("save_in", "residual_save")
        .with("diag_save_in", "diag_save");
    add_dirichlet(&mut problem, params);
    let boundary_nodes = nodes(LEFT, 0..4);

    let out = problem
        .compute_nodal_bcs(NodalPhase::Residual, &boundary_nodes, reinit)
        .unwrap();
    assert_eq!(out.save_in().len(), 4);
    for rec in out.save_in() {
        assert_eq!(rec.channel, SaveInChannel::Residual);
        assert_eq!(rec.variable, RESIDUAL_SAVE);
        assert_eq!(rec.value, (rec.dof - 2000) as Real);
    }

    let out = problem
        .compute_nodal_bcs(NodalPhase::Jacobian, &boundary_nodes, reinit)
        .unwrap();
    assert_eq!(out.save_in().len(), 4);
    assert!(out
        .save_in()
        .iter()
        .all(|rec| rec.channel == SaveInChannel::Diagonal && rec.value == 1.0));
}

// ── Failures ─────────────────────────────────────────────────────────

#[test]
fn failing_bc_names_the_object() {
    let mut problem = problem(3);
    let params = InputParameters::new()
        .with("variable", "temperature")
        .with("boundary", "left");
    problem
        .add_nodal_bc(|sp, boundaries, thread, _| {
            let bc = FailingBc::new("broken", &params, boundaries, sp, thread, NodeId(4))?;
            Ok(Box::new(bc) as Box<dyn NodalBc>)
        })
        .unwrap();

    let err = problem
        .compute_nodal_bcs(NodalPhase::Residual, &nodes(LEFT, 0..6), reinit)
        .unwrap_err();
    match err {
        EngineError::Bc { object, source } => {
            assert_eq!(object, "broken");
            assert!(matches!(source, BcError::NoDofAtNode { node: NodeId(4), .. }));
        }
        other => panic!("expected Bc error, got {other:?}"),
    }
}

#[test]
fn missing_dof_is_reported() {
    let mut problem = problem(2);
    add_dirichlet(&mut problem, dirichlet_params("left", 0.0));
    let err = problem
        .compute_nodal_bcs(NodalPhase::Residual, &nodes(LEFT, 0..2), |_, _| {})
        .unwrap_err();
    assert!(matches!(err, EngineError::Bc { .. }));
}

proptest! {
    #[test]
    fn residual_is_partition_independent(
        ids in prop::collection::btree_set(0u64..500, 0..40),
        threads in 1usize..6,
        value in -50.0f64..50.0,
    ) {
        let boundary_nodes = nodes(LEFT, ids.iter().copied());
        let mut serial = problem(1);
        add_dirichlet(&mut serial, dirichlet_params("left", value));
        let mut parallel = problem(threads);
        add_dirichlet(&mut parallel, dirichlet_params("left", value));
        prop_assert_eq!(
            residual_map(&mut serial, &boundary_nodes),
            residual_map(&mut parallel, &boundary_nodes)
        );
    }
}
