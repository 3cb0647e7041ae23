//! Server set configuration
//!
//! Parses the two textual server-list forms the library accepts: the
//! `ketama.servers`-style file (one `address weight` record per line) used
//! at startup, and the comma-separated `address:weight` node list used for
//! runtime reconfiguration.

use crate::error::KetamaError;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// One backend server and its relative weight.
///
/// The address is an opaque identifier (typically `host:port`); the weight
/// is unitless and only meaningful relative to the other servers in the
/// same set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerSpec {
    /// Opaque server identifier, e.g. "10.0.1.1:11211"
    pub address: String,

    /// Relative weight, strictly positive
    pub weight: u32,
}

impl ServerSpec {
    /// Create a server spec.
    pub fn new(address: impl Into<String>, weight: u32) -> Self {
        ServerSpec {
            address: address.into(),
            weight,
        }
    }
}

/// Load a server list from a `ketama.servers`-style file.
///
/// One record per line, whitespace-separated `address weight`. Blank lines
/// and lines starting with `#` are skipped. Any malformed record fails the
/// whole load with a `ConfigError`.
pub fn load_server_file(path: impl AsRef<Path>) -> Result<Vec<ServerSpec>, KetamaError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .map_err(|e| KetamaError::Config(format!("cannot read {}: {}", path.display(), e)))?;

    parse_server_lines(&contents)
}

/// Parse `address weight` records, one per line.
pub fn parse_server_lines(contents: &str) -> Result<Vec<ServerSpec>, KetamaError> {
    let mut servers = Vec::new();

    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let address = fields
            .next()
            .ok_or_else(|| KetamaError::Config(format!("line {}: missing address", lineno + 1)))?;
        let weight = fields
            .next()
            .ok_or_else(|| KetamaError::Config(format!("line {}: missing weight", lineno + 1)))?;

        let weight = parse_weight(weight).ok_or_else(|| {
            KetamaError::Config(format!("line {}: non-positive weight '{}'", lineno + 1, weight))
        })?;

        servers.push(ServerSpec::new(address, weight));
    }

    if servers.is_empty() {
        return Err(KetamaError::Config("empty server set".to_string()));
    }

    Ok(servers)
}

/// Parse a reconfiguration node list: comma-separated `address:weight`.
///
/// The weight is everything after the last colon, so addresses that
/// contain a port (`host:port:weight`) parse as expected. A malformed
/// token fails the whole list with a `ParseError`; nothing is partially
/// applied.
pub fn parse_node_list(spec: &str) -> Result<Vec<ServerSpec>, KetamaError> {
    let mut servers = Vec::new();

    for token in spec.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        let (address, weight) = token
            .rsplit_once(':')
            .ok_or_else(|| KetamaError::Parse(format!("malformed entry '{}'", token)))?;

        if address.is_empty() {
            return Err(KetamaError::Parse(format!("malformed entry '{}'", token)));
        }

        let weight = parse_weight(weight)
            .ok_or_else(|| KetamaError::Parse(format!("malformed entry '{}'", token)))?;

        servers.push(ServerSpec::new(address, weight));
    }

    Ok(servers)
}

/// Parse a strictly positive integer weight.
fn parse_weight(s: &str) -> Option<u32> {
    match s.parse::<u32>() {
        Ok(w) if w > 0 => Some(w),
        _ => None,
    }
}
