//! Core types and traits for the Tessera finite-element framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Tessera workspace:
//! strongly-typed IDs, field value types and arity tags, the
//! [`VariableSet`] bitset, input parameters, and error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod error;
pub mod field;
pub mod id;
pub mod params;
pub mod value;

pub use boundary::BoundaryTable;
pub use error::{ParamError, VariableError, VariableErrorKind};
pub use field::{
    FieldArity, FieldValue, Representation, VarKind, VarKindFilter, VariableDef, VariableSet,
    VariableSetIter,
};
pub use id::{BoundaryId, DofIndices, NodeId, SubdomainId, ThreadId, VariableId};
pub use params::{InputParameters, ParamValue};
pub use value::{Real, RealTensorValue, RealVectorValue, VectorSecond, MESH_DIM};
