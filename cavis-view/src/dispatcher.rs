//! Routes inbound messages to the frame store.
//!
//! The `setup → data* → finish` bracket maps to the store's
//! reset/append/seal lifecycle. Data faults (bad grid, wrong run
//! state) cost one frame each and are reported; they never touch the
//! cache or take the client down.

use cavis_core::error::CavisError;
use cavis_core::protocol::ServerMessage;
use cavis_core::store::FrameStore;
use tracing::{info, warn};

/// What a dispatched message did, for the display loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    /// A new run began; the surface was cleared.
    RunStarted { n: usize },
    /// A frame was rendered and cached; `count` is the new total.
    FrameAppended { count: usize },
    /// The run sealed; full-range playback is available.
    RunFinished { count: usize },
    /// The message was faulty and skipped.
    Skipped,
}

/// Thin router from channel messages to the frame store.
pub struct Dispatcher {
    store: FrameStore,
}

impl Dispatcher {
    pub fn new(store: FrameStore) -> Self {
        Self { store }
    }

    /// Apply one inbound message.
    pub fn dispatch(&mut self, msg: ServerMessage) -> Update {
        match msg {
            ServerMessage::Setup { n } => match self.store.reset(n as usize) {
                Ok(()) => {
                    info!(n, "run setup");
                    Update::RunStarted { n: n as usize }
                }
                Err(e) => {
                    warn!(error = %e, "setup rejected");
                    Update::Skipped
                }
            },
            ServerMessage::Data { value } => match self.store.append_frame(&value) {
                Ok(count) => Update::FrameAppended { count },
                Err(e) => {
                    warn!(error = %e, "frame skipped");
                    Update::Skipped
                }
            },
            ServerMessage::Finish => {
                self.store.finish();
                let count = self.store.frame_count();
                info!(frames = count, "run finished");
                Update::RunFinished { count }
            }
        }
    }

    /// Replay a cached frame onto the surface.
    pub fn show_frame(&mut self, index: usize) -> Result<(), CavisError> {
        self.store.show_frame(index)
    }

    pub fn store(&self) -> &FrameStore {
        &self.store
    }
}
