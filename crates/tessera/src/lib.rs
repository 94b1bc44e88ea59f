//! Tessera: variable resolution, boundary conditions and postprocessing
//! for finite-element multiphysics.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Tessera sub-crates. For most users, adding `tessera` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use tessera::prelude::*;
//!
//! let config = ProblemConfig {
//!     variables: vec![VariableDef::scalar("temperature")],
//!     boundaries: vec!["left".into()],
//!     thread_count: Some(2),
//!     seed: 42,
//! };
//! let mut problem = Problem::new(config).unwrap();
//!
//! // Pin temperature to 310.5 on the left boundary.
//! let params = InputParameters::new()
//!     .with("variable", "temperature")
//!     .with("boundary", "left")
//!     .with("value", 310.5);
//! problem
//!     .add_nodal_bc(|sp, boundaries, thread, _seed| {
//!         let bc = DirichletBc::from_params("fix_left", &params, boundaries, sp, thread)?;
//!         Ok(Box::new(bc) as Box<dyn NodalBc>)
//!     })
//!     .unwrap();
//!
//! let nodes: Vec<BoundaryNode> = (0..4)
//!     .map(|n| BoundaryNode { boundary: BoundaryId(0), node: NodeId(n) })
//!     .collect();
//! let out = problem
//!     .compute_nodal_bcs(NodalPhase::Residual, &nodes, |data, bn| {
//!         let t = data.variable_mut::<Real>(VariableId(0)).unwrap();
//!         t.set_dof_indices([bn.node.0 as usize]);
//!         t.set_dof_values(TimeLevel::Current, vec![310.5]);
//!     })
//!     .unwrap();
//! assert_eq!(out.residual().len(), 4);
//! assert!(out.residual().iter().all(|&(_, r)| r == 0.0));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tessera-core` | IDs, values, variable definitions, parameters, errors |
//! | [`vars`] | `tessera-vars` | Field variables, per-thread stores, bindings and views |
//! | [`bc`] | `tessera-bc` | Capability-composed nodal boundary conditions |
//! | [`postprocessors`] | `tessera-postprocessors` | Side-integral postprocessors |
//! | [`actions`] | `tessera-actions` | Material property output planning |
//! | [`engine`] | `tessera-engine` | Problem setup and per-thread evaluation |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, IDs and errors (`tessera-core`).
pub use tessera_core as types;

/// Field variables and typed views (`tessera-vars`).
///
/// A [`vars::VariableBinding`] is resolved once per object and thread;
/// attaching it to a [`vars::ThreadData`] yields a [`vars::VariableView`]
/// for the current computation phase.
pub use tessera_vars as vars;

/// Nodal boundary conditions (`tessera-bc`).
///
/// Implement [`bc::NodalBc`] on a struct that composes
/// [`bc::NodalBcCore`]; see [`bc::DirichletBc`] for the reference case.
pub use tessera_bc as bc;

/// Side postprocessors (`tessera-postprocessors`).
pub use tessera_postprocessors as postprocessors;

/// Setup-time planners (`tessera-actions`).
pub use tessera_actions as actions;

/// Problem setup and evaluation (`tessera-engine`).
pub use tessera_engine as engine;

/// Common imports for typical Tessera usage.
///
/// ```rust
/// use tessera::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use tessera_core::{
        BoundaryId, BoundaryTable, FieldArity, InputParameters, NodeId, Real, RealTensorValue,
        RealVectorValue, ThreadId, VarKind, VarKindFilter, VariableDef, VariableId,
    };

    // Errors
    pub use tessera_bc::BcError;
    pub use tessera_core::{ParamError, VariableError, VariableErrorKind};
    pub use tessera_engine::{ConfigError, EngineError};
    pub use tessera_postprocessors::PostprocessorError;

    // Variables
    pub use tessera_vars::{Subproblem, ThreadData, TimeLevel, VariableBinding, VariableView};

    // Boundary conditions
    pub use tessera_bc::{DirichletBc, NodalBc, NodalContributions, NodeContext, NoisyDirichletBc};

    // Postprocessors
    pub use tessera_postprocessors::{
        SideAverageValue, SideFluxIntegral, SideIntegralVariable, SidePostprocessor,
    };

    // Actions
    pub use tessera_actions::{plan_material_output, MaterialDecl, OutputDecl, PropertyType};

    // Engine
    pub use tessera_engine::{BoundaryNode, BoundarySide, NodalPhase, Problem, ProblemConfig};
}
