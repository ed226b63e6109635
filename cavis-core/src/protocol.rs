//! Wire protocol message types.
//!
//! One JSON object per line, discriminated by a `type` field. The sum
//! types below are exhaustive over the known shapes; anything else is
//! reported and discarded by [`parse_server`] — never silently ignored,
//! never fatal to the connection.

use serde::{Deserialize, Serialize};

use crate::error::CavisError;

// ── ServerMessage ────────────────────────────────────────────────

/// Messages flowing source → client.
///
/// A run is the bracket `Setup → Data* → Finish`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Begin a new run with an `n × n` grid. The client must reset its
    /// frame store before accepting any subsequent `data`.
    Setup { n: u32 },
    /// One frame: `n` rows of `n` cell values, each a 1-based palette
    /// index.
    Data { value: Vec<Vec<u32>> },
    /// Run complete; full-range playback becomes available.
    Finish,
}

/// Parse one wire line into a [`ServerMessage`].
///
/// Unknown tags and malformed payloads come back as
/// [`CavisError::MalformedMessage`]; the caller logs and drops the
/// line while the link stays open.
pub fn parse_server(line: &str) -> Result<ServerMessage, CavisError> {
    serde_json::from_str(line).map_err(|e| CavisError::MalformedMessage(e.to_string()))
}

// ── ClientMessage ────────────────────────────────────────────────

/// Commands flowing client → source. At-most-once, best-effort: a
/// command sent while the link is down is dropped with a warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Request a run with grid size `n` and transition weights `p`,
    /// `q` (the operator surface keeps `p + q <= 1`).
    Start { n: u32, p: f64, q: f64 },
    /// Request that the source halt the current run.
    Stop,
}
