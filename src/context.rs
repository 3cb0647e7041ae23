//! Session-scoped continuum holder
//!
//! A `ContinuumContext` owns the current ring snapshot, the sticky last
//! error, and nothing else. Lookups clone an `Arc` to the snapshot and
//! proceed without further coordination; reconfiguration builds a new
//! continuum off to the side and swaps it in wholesale, so in-flight
//! readers keep whatever snapshot they already hold.

use crate::config::{self, ServerSpec};
use crate::continuum::Continuum;
use crate::error::KetamaError;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

/// Long-lived holder of the current continuum and last-error slot.
///
/// Created once at startup, replaced never; the snapshot inside it is
/// replaced wholesale on every successful [`reconcile`](Self::reconcile).
/// Reads never block on a concurrent reconfiguration beyond the brief
/// pointer-read lock. Concurrent `reconcile` calls must be serialized by
/// the caller; the lock only guarantees the swap itself is atomic.
pub struct ContinuumContext {
    /// Current ring snapshot, absent until the first successful build
    current: RwLock<Option<Arc<Continuum>>>,

    /// Most recent error from any failing operation; sticky until
    /// explicitly cleared
    last_error: RwLock<Option<KetamaError>>,
}

impl ContinuumContext {
    /// Create an empty, uninitialized context.
    pub fn new() -> Self {
        ContinuumContext {
            current: RwLock::new(None),
            last_error: RwLock::new(None),
        }
    }

    /// Build the first continuum from a server set.
    ///
    /// On failure the context holds no continuum and records the error;
    /// lookups then fail with a "not initialized" error until a later
    /// `reconcile` succeeds.
    pub fn initialize(servers: Vec<ServerSpec>) -> Self {
        let ctx = Self::new();

        match Continuum::build(servers) {
            Ok(continuum) => {
                info!(
                    servers = continuum.server_count(),
                    points = continuum.point_count(),
                    "continuum initialized"
                );
                *ctx.current.write() = Some(Arc::new(continuum));
            }
            Err(e) => {
                warn!("continuum initialization failed: {}", e);
                ctx.record_error(e);
            }
        }

        ctx
    }

    /// Replace the server set from a `address:weight,...` node list.
    ///
    /// All-or-nothing: the new continuum is parsed and built completely
    /// before the swap, and any failure leaves the previously installed
    /// snapshot untouched and lookupable.
    pub fn reconcile(&self, spec: &str) -> Result<(), KetamaError> {
        let servers = config::parse_node_list(spec).map_err(|e| {
            self.record_error(e.clone());
            e
        })?;

        let continuum = Continuum::build(servers).map_err(|e| {
            self.record_error(e.clone());
            e
        })?;

        info!(
            servers = continuum.server_count(),
            points = continuum.point_count(),
            "continuum reconfigured"
        );

        *self.current.write() = Some(Arc::new(continuum));
        Ok(())
    }

    /// The most recently installed snapshot, if any.
    ///
    /// The returned `Arc` stays valid across later reconfigurations.
    pub fn current(&self) -> Option<Arc<Continuum>> {
        self.current.read().clone()
    }

    /// Whether a continuum has been installed.
    pub fn is_initialized(&self) -> bool {
        self.current.read().is_some()
    }

    /// Resolve a key against the current snapshot.
    ///
    /// Failures (uninitialized context, empty ring) are recorded in the
    /// sticky error slot as well as returned.
    pub fn lookup(&self, key: &[u8]) -> Result<ServerSpec, KetamaError> {
        let snapshot = self.current().ok_or_else(|| {
            let e = KetamaError::Lookup("not initialized".to_string());
            self.record_error(e.clone());
            e
        })?;

        snapshot.lookup(key).map(Clone::clone).map_err(|e| {
            self.record_error(e.clone());
            e
        })
    }

    /// The most recently recorded error, regardless of which operation
    /// produced it. Does not clear the slot.
    pub fn last_error(&self) -> Option<KetamaError> {
        self.last_error.read().clone()
    }

    /// Explicitly clear the error slot.
    pub fn clear_error(&self) {
        *self.last_error.write() = None;
    }

    /// Replace the error slot atomically.
    fn record_error(&self, error: KetamaError) {
        *self.last_error.write() = Some(error);
    }
}

impl Default for ContinuumContext {
    fn default() -> Self {
        Self::new()
    }
}
