//! Integration test: BCs composed from capabilities, evaluated directly
//! against one thread's data.

use tessera_bc::{
    BcError, BoundaryTable, NodalBc, NodalContributions, NodeContext, NoisyDirichletBc,
    SaveInChannel,
};
use tessera_core::{InputParameters, NodeId, ThreadId, VariableError, VariableId};
use tessera_test_utils::fixtures::ConstantBc;
use tessera_test_utils::{
    set_nodal, set_nodal_vector, square_boundaries, standard_subproblem, DIAG_SAVE, PRESSURE,
    RESIDUAL_SAVE, TEMPERATURE, VELOCITY,
};
use tessera_vars::Subproblem;

fn setup() -> (Subproblem, BoundaryTable) {
    let mut sp = standard_subproblem(1);
    let data = sp.thread_mut(ThreadId(0)).unwrap();
    set_nodal(data, TEMPERATURE, 4, 12.0);
    set_nodal(data, PRESSURE, 40, 0.0);
    set_nodal(data, RESIDUAL_SAVE, 400, 0.0);
    set_nodal(data, DIAG_SAVE, 401, 0.0);
    set_nodal_vector(data, VELOCITY, 20);
    (sp, square_boundaries().into_iter().collect())
}

#[test]
fn coupling_to_a_vector_uses_its_first_component_dof() {
    let (sp, table) = setup();
    let params = InputParameters::new()
        .with("variable", "temperature")
        .with("boundary", "bottom")
        .with("coupled_variables", &["velocity", "pressure"][..]);
    let bc = ConstantBc::new("coupled", &params, &table, &sp, ThreadId(0))
        .unwrap()
        .with_coupling(0.25);

    let ctx = NodeContext::new(&sp.threads()[0], NodeId(4));
    let mut out = NodalContributions::new();
    for jvar in [VELOCITY, PRESSURE, RESIDUAL_SAVE] {
        bc.compute_off_diag_jacobian(&ctx, jvar, &mut out).unwrap();
    }
    assert_eq!(out.jacobian(), &[(4, 20, 0.25), (4, 40, 0.25)]);
}

#[test]
fn several_save_in_targets_each_receive_a_record() {
    let (sp, table) = setup();
    let params = InputParameters::new()
        .with("variable", "temperature")
        .with("boundary", "left")
        .with("save_in", &["residual_save", "diag_save"][..]);
    let bc = ConstantBc::new("mirror", &params, &table, &sp, ThreadId(0))
        .unwrap()
        .with_value(2.0);

    let ctx = NodeContext::new(&sp.threads()[0], NodeId(4));
    let mut out = NodalContributions::new();
    bc.compute_residual(&ctx, &mut out).unwrap();
    assert_eq!(out.residual(), &[(4, 10.0)]);
    let targets: Vec<(VariableId, usize)> =
        out.save_in().iter().map(|r| (r.variable, r.dof)).collect();
    assert_eq!(targets, vec![(RESIDUAL_SAVE, 400), (DIAG_SAVE, 401)]);
    assert!(out
        .save_in()
        .iter()
        .all(|r| r.channel == SaveInChannel::Residual && r.value == 10.0));
}

#[test]
fn save_in_into_a_nonlinear_variable_is_rejected() {
    let (sp, table) = setup();
    let params = InputParameters::new()
        .with("variable", "temperature")
        .with("boundary", "left")
        .with("save_in", "pressure");
    let err = ConstantBc::new("mirror", &params, &table, &sp, ThreadId(0))
        .err()
        .unwrap();
    assert!(matches!(
        err,
        BcError::Variable(VariableError::KindMismatch { .. })
    ));
}

#[test]
fn noise_depends_on_node_and_seed_only() {
    let (sp, table) = setup();
    let params = InputParameters::new()
        .with("variable", "temperature")
        .with("boundary", "top")
        .with("amplitude", 1.0);
    let a = NoisyDirichletBc::from_params("noisy", &params, &table, &sp, ThreadId(0), 5).unwrap();
    let b = NoisyDirichletBc::from_params("noisy", &params, &table, &sp, ThreadId(0), 5).unwrap();
    let c = NoisyDirichletBc::from_params("noisy", &params, &table, &sp, ThreadId(0), 6).unwrap();

    let data = &sp.threads()[0];
    let at = |bc: &NoisyDirichletBc, node| bc.target(&NodeContext::new(data, NodeId(node)));
    assert_eq!(at(&a, 4), at(&b, 4));
    assert_ne!(at(&a, 4), at(&a, 5));
    assert_ne!(at(&a, 4), at(&c, 4));
    for node in 0..50 {
        assert!((-1.0..1.0).contains(&at(&a, node)));
    }
}
