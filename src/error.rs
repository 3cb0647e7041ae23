//! Error types for the continuum library
//!
//! Every fallible operation returns a typed error rather than a sentinel
//! value. The most recent error is additionally recorded in the
//! `ContinuumContext` sticky error slot for callers that poll.

/// Coarse error classification, exposed for callers that branch on
/// the failure category rather than the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or empty server configuration
    Config,

    /// Malformed reconfiguration token
    Parse,

    /// Empty or uninitialized continuum
    Lookup,
}

/// Errors produced by continuum construction, reconfiguration and lookup.
///
/// All variants are local, recoverable conditions; none is fatal to the
/// process. `Clone` and `PartialEq` let the error be stored in the
/// context's sticky slot and asserted on in tests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KetamaError {
    /// Bad or empty initial server set, or a non-positive weight
    #[error("config error: {0}")]
    Config(String),

    /// Malformed entry in a reconfiguration string
    #[error("parse error: {0}")]
    Parse(String),

    /// Lookup against an empty or uninitialized continuum
    #[error("lookup error: {0}")]
    Lookup(String),
}

impl KetamaError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            KetamaError::Config(_) => ErrorKind::Config,
            KetamaError::Parse(_) => ErrorKind::Parse,
            KetamaError::Lookup(_) => ErrorKind::Lookup,
        }
    }

    /// The human-readable message, without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            KetamaError::Config(m) | KetamaError::Parse(m) | KetamaError::Lookup(m) => m,
        }
    }
}
