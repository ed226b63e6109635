//! Domain-specific error types for the CAVIS client.
//!
//! All fallible operations return `Result<T, CavisError>`.
//! No panics on invalid input — every error is typed and recoverable,
//! and every fault is handled at the boundary that detects it.

use thiserror::Error;

/// The canonical error type for the CAVIS client.
#[derive(Debug, Error)]
pub enum CavisError {
    // ── Transport faults ─────────────────────────────────────────
    /// The TCP/IO layer reported an error.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// `send` was called while the link is not open. The command is
    /// dropped, never queued.
    #[error("link is not open (state: {state}); command dropped")]
    SendNotReady { state: String },

    /// An internal mpsc/watch channel was closed unexpectedly.
    #[error("channel closed")]
    ChannelClosed,

    // ── Protocol faults ──────────────────────────────────────────
    /// A message carried a `type` tag the client does not understand,
    /// or its payload did not match the tag's shape.
    #[error("unrecognized or malformed message: {0}")]
    MalformedMessage(String),

    /// A wire line exceeded the codec limit.
    #[error("line too long: {size} bytes (max {max})")]
    LineTooLong { size: usize, max: usize },

    /// The link state machine was asked to make an illegal transition.
    #[error("invalid link transition: {0}")]
    InvalidTransition(&'static str),

    // ── Data faults ──────────────────────────────────────────────
    /// A `data` message arrived before any `setup`.
    #[error("frame received with no active run (missing setup)")]
    NoActiveRun,

    /// A grid dimension did not match the run's `n`.
    #[error("grid dimension mismatch: expected {expected}x{expected}, row {row} has {actual} cells")]
    GridDimension {
        expected: usize,
        row: usize,
        actual: usize,
    },

    /// The grid had the wrong number of rows.
    #[error("grid row count mismatch: expected {expected}, got {actual}")]
    GridRowCount { expected: usize, actual: usize },

    /// A cell value does not index the palette. Values are 1-based;
    /// 0 and anything past the palette length are rejected, never
    /// wrapped or substituted.
    #[error("cell value {value} at ({row},{col}) outside palette 1..={palette_len}")]
    CellValue {
        value: u32,
        row: usize,
        col: usize,
        palette_len: usize,
    },

    /// `show_frame` was called with an index outside the cache.
    #[error("frame index {index} out of range (have {count} frames)")]
    FrameIndex { index: usize, count: usize },

    /// A snapshot's dimensions do not match the surface it is being
    /// restored onto.
    #[error("snapshot is {snap_w}x{snap_h} but surface is {surf_w}x{surf_h}")]
    SurfaceMismatch {
        snap_w: u32,
        snap_h: u32,
        surf_w: u32,
        surf_h: u32,
    },

    /// A run was configured with a zero grid dimension.
    #[error("grid dimension must be positive")]
    ZeroDimension,
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for CavisError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        CavisError::ChannelClosed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let e = CavisError::CellValue {
            value: 9,
            row: 1,
            col: 2,
            palette_len: 3,
        };
        assert!(e.to_string().contains('9'));
        assert!(e.to_string().contains("1..=3"));

        let e = CavisError::FrameIndex { index: 5, count: 3 };
        assert!(e.to_string().contains('5'));
        assert!(e.to_string().contains('3'));
    }

    #[test]
    fn from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let e: CavisError = io_err.into();
        assert!(matches!(e, CavisError::Transport(_)));
    }
}
