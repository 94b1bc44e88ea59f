//! Field variables, per-thread variable stores, and typed variable views.
//!
//! A [`Subproblem`] owns one [`ThreadData`] per worker thread: the
//! thread's copy of every [`FieldVariable`] plus its [`AssemblyContext`].
//! Consumers resolve a [`VariableBinding`] once during setup and attach
//! it to their thread's data to obtain a [`VariableView`], whose
//! accessors dispatch between nodal dof storage and quadrature-point
//! storage.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod assembly;
pub mod binding;
pub mod store;
pub mod subproblem;
pub mod variable;
pub mod view;

pub use assembly::{AssemblyContext, FaceQuadrature};
pub use binding::{resolve_variable_name, BindingBuilder, VariableBinding};
pub use store::{ThreadData, VariableArity, VariableHandle, VariableStore};
pub use subproblem::Subproblem;
pub use variable::{FieldVariable, ShapeSecond, TimeLevel, TimeLevels};
pub use view::VariableView;
