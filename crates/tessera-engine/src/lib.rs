//! Problem setup and per-thread evaluation for Tessera.
//!
//! [`ProblemConfig`] declares variables, boundaries and the thread count;
//! [`Problem`] validates it, allocates one computation context per
//! thread, instantiates boundary conditions and postprocessors on every
//! thread, and evaluates them in parallel over disjoint thread data.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod problem;
pub mod threaded;

pub use config::{ConfigError, ProblemConfig, MAX_THREADS};
pub use error::EngineError;
pub use problem::{BoundaryNode, BoundarySide, NodalPhase, Problem};
pub use threaded::run_per_thread;
