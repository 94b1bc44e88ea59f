//! Nodal boundary conditions for Tessera.
//!
//! A boundary condition is assembled from small capabilities instead of
//! a base-class stack: every BC owns a [`BoundaryBinding`] (object name,
//! boundary, thread, nodal variable) and composes [`RandomStream`],
//! [`CoupledVariables`] and [`SaveIn`] as needed, usually through
//! [`NodalBcCore`]. Evaluation goes through the object-safe [`NodalBc`]
//! trait.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod capabilities;
pub mod dirichlet;
pub mod error;
pub mod nodal;

pub use boundary::BoundaryBinding;
pub use capabilities::{CoupledVariables, RandomStream, SaveIn, SaveInChannel, SaveInRecord};
pub use dirichlet::{DirichletBc, NoisyDirichletBc};
pub use error::BcError;
pub use nodal::{NodalBc, NodalBcCore, NodalContributions, NodeContext, COUPLED_PARAM};
pub use tessera_core::BoundaryTable;
