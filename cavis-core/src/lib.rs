//! # cavis-core
//!
//! Core library for the CAVIS simulation viewer — a client that
//! attaches to a remote simulation process, receives discrete 2-D grid
//! snapshots, and serves both live display and indexed replay.
//!
//! This crate contains:
//! - **Protocol types**: `ServerMessage` / `ClientMessage`, tagged JSON
//!   shapes with report-and-discard handling of unknown tags
//! - **Codec**: `WireCodec` for line-delimited framing via `tokio_util`
//! - **Channel**: self-healing duplex link with a `LinkState` machine,
//!   fixed-delay reconnection, and connection-generation tagging
//! - **Frame model**: `Palette`, `CellGrid`, `Surface`, `FrameImage`
//! - **Store**: `FrameStore` — append-only cache of rendered frames
//!   with O(1) replay
//! - **Error**: `CavisError` — typed, `thiserror`-based error hierarchy

pub mod channel;
pub mod codec;
pub mod error;
pub mod grid;
pub mod palette;
pub mod protocol;
pub mod store;
pub mod surface;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use channel::{Channel, ChannelConfig, ChannelHandle, CloseReason, LinkState, RECONNECT_DELAY};
pub use codec::{MAX_LINE_BYTES, WireCodec};
pub use error::CavisError;
pub use grid::CellGrid;
pub use palette::{Palette, Rgba};
pub use protocol::{ClientMessage, ServerMessage, parse_server};
pub use store::FrameStore;
pub use surface::{FrameImage, Surface};
