//! ketama - weight-aware consistent hashing for sharding cache traffic
//!
//! The core is the continuum: an immutable, sorted ring of hash points
//! mapping keys onto weighted servers, built so that adding or removing a
//! server only remaps the keys it owned. Around it sit a reconfigurable
//! context with snapshot reads that never block on a writer, diagnostics,
//! and a small length-prefixed TCP driver for embedding the mapper in an
//! external runtime.
//!
//! Modules depend leaf-first and communicate through minimal interfaces:
//! hashing feeds the continuum, the continuum feeds the context, and the
//! protocol/server pair only ever sees the context.

pub mod config;
pub mod context;
pub mod continuum;
pub mod diagnostics;
pub mod error;
pub mod hashing;
pub mod protocol;
pub mod server;

/// Re-export commonly used types
pub use config::ServerSpec;
pub use context::ContinuumContext;
pub use continuum::{Continuum, ContinuumPoint};
pub use error::{ErrorKind, KetamaError};
