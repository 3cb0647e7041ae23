//! Continuum introspection
//!
//! Human-readable summaries and a structural self-check over a built
//! continuum. Output formats are for logging and operators, not wire
//! contracts.

use crate::continuum::Continuum;
use serde_json::json;
use std::fmt::Write;

/// Summarize a continuum as a JSON document.
///
/// Mirrors libketama's `ketama_info`: server count, point
/// count and the per-server `{server, weight, points}` list.
pub fn info(continuum: &Continuum) -> String {
    let server_list: Vec<_> = continuum
        .servers()
        .iter()
        .enumerate()
        .map(|(i, s)| {
            json!({
                "server": s.address,
                "weight": s.weight,
                "points": continuum.points_for(i),
            })
        })
        .collect();

    json!({
        "ketama_info": {
            "num_servers": continuum.server_count(),
            "num_points": continuum.point_count(),
            "server_list": server_list,
        }
    })
    .to_string()
}

/// Render every point on the ring, one `address (hash)` line per point.
///
/// libketama's `ketama_print_continuum`; only sensible for debugging
/// small pools, a 10-server ring is already 1600 lines.
pub fn format_points(continuum: &Continuum) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "numpoints in continuum: {}", continuum.point_count());

    for point in continuum.points() {
        let server = &continuum.servers()[point.server_index];
        let _ = writeln!(out, "{} ({})", server.address, point.hash);
    }

    out
}

/// Result of a [`smoke`] self-check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokeReport {
    /// True when no violation was found
    pub passed: bool,

    /// Description of each violated invariant
    pub violations: Vec<String>,
}

/// Number of sample lookups `smoke` performs.
const SMOKE_SAMPLES: usize = 100;

/// Run a structural self-check over a continuum.
///
/// Verifies the ascending-sort invariant, that every point references a
/// valid server, and that a bounded number of sample lookups resolve.
/// Never fatal to the caller: violations are reported, not panicked on.
pub fn smoke(continuum: &Continuum) -> SmokeReport {
    let mut violations = Vec::new();

    if continuum.point_count() == 0 {
        violations.push("continuum has no points".to_string());
    }

    for (i, pair) in continuum.points().windows(2).enumerate() {
        if pair[0].hash > pair[1].hash {
            violations.push(format!(
                "points out of order at index {}: {} > {}",
                i, pair[0].hash, pair[1].hash
            ));
        }
    }

    for (i, point) in continuum.points().iter().enumerate() {
        if point.server_index >= continuum.server_count() {
            violations.push(format!(
                "point {} references server index {} of {}",
                i,
                point.server_index,
                continuum.server_count()
            ));
        }
    }

    for i in 0..SMOKE_SAMPLES {
        let key = format!("smoke-{}", i);
        if let Err(e) = continuum.lookup(key.as_bytes()) {
            violations.push(format!("sample lookup '{}' failed: {}", key, e));
            break;
        }
    }

    SmokeReport {
        passed: violations.is_empty(),
        violations,
    }
}
