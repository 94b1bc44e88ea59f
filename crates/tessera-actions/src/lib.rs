//! Setup-time planners for Tessera.
//!
//! Currently one: automatic output of material properties as auxiliary
//! variables. Property types map to expanders through a typed
//! [`ExpanderRegistry`] instead of string-keyed object factories.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod material_output;
pub mod registry;

pub use material_output::{
    plan_material_output, plan_material_output_with, AuxComputation, ExecuteOn, MaterialDecl,
    MaterialOutputPlan, OutputDecl, Restriction, NO_OUTPUT,
};
pub use registry::{AuxKind, Expander, Expansion, ExpanderRegistry, PropertyType};
