//! Side-integral postprocessors for Tessera.
//!
//! Postprocessors bind their variable in interpolated mode and read
//! values and gradients at the face quadrature points held by the
//! thread's assembly context.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod integrals;
pub mod side;

pub use error::PostprocessorError;
pub use integrals::{SideAverageValue, SideFluxIntegral, SideIntegralVariable};
pub use side::{SideAccumulator, SideBinding, SideContext, SidePostprocessor};
