//! Self-healing duplex link to the simulation source.
//!
//! One logical [`Channel`] spans any number of physical TCP
//! connections. A supervisor task owns the current connection and
//! cycles `Connecting → Open → Closed → Connecting` forever — there is
//! no retry cap and no backoff, just a fixed delay, because the peer
//! is a local, low-churn process. Each physical connection gets a
//! monotonically increasing generation tag; an event read under a
//! superseded generation is dropped instead of delivered, so reconnect
//! races cannot leak stale data to the handler.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use crate::codec::WireCodec;
use crate::error::CavisError;
use crate::protocol::{self, ClientMessage, ServerMessage};

/// Delay between a close and the next connection attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(1);

// ── CloseReason ──────────────────────────────────────────────────

/// Why the link left the `Open` state (or never reached it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The connection attempt itself failed.
    Refused,
    /// The peer shut the connection down cleanly.
    PeerClosed,
    /// A read or write faulted; the client closed the connection
    /// itself rather than waiting for the peer.
    Transport,
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Refused => write!(f, "refused"),
            Self::PeerClosed => write!(f, "peer closed"),
            Self::Transport => write!(f, "transport fault"),
        }
    }
}

// ── LinkState ────────────────────────────────────────────────────

/// The link lifecycle.
///
/// ```text
///  Connecting ──► Open ──► Closed ──► Connecting ──► …
///       │                    ▲
///       └────────────────────┘  (connect failure)
/// ```
///
/// An infinite cycle with no terminal state: the client never gives up.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LinkState {
    /// A connection attempt is in flight. Initial state.
    #[default]
    Connecting,

    /// The connection is established; `send` works.
    Open {
        /// When the link entered `Open`.
        since: Instant,
    },

    /// No live connection; a reconnect is scheduled.
    Closed { reason: CloseReason },
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connecting => write!(f, "Connecting"),
            Self::Open { .. } => write!(f, "Open"),
            Self::Closed { reason } => write!(f, "Closed ({reason})"),
        }
    }
}

impl LinkState {
    /// Returns `true` when the link is ready for outbound commands.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    /// How long the link has been open, `None` for any other state.
    pub fn open_duration(&self) -> Option<Duration> {
        match self {
            Self::Open { since } => Some(since.elapsed()),
            _ => None,
        }
    }

    // ── Transitions ──────────────────────────────────────────────

    /// `Closed → Connecting`, after the reconnect delay elapses.
    pub fn begin_connect(&mut self) -> Result<(), CavisError> {
        match self {
            Self::Closed { .. } => {
                *self = Self::Connecting;
                Ok(())
            }
            _ => Err(CavisError::InvalidTransition(
                "cannot reconnect: link is not Closed",
            )),
        }
    }

    /// `Connecting → Open`, on transport establishment.
    pub fn mark_open(&mut self) -> Result<(), CavisError> {
        match self {
            Self::Connecting => {
                *self = Self::Open {
                    since: Instant::now(),
                };
                Ok(())
            }
            _ => Err(CavisError::InvalidTransition(
                "cannot open: link is not Connecting",
            )),
        }
    }

    /// `Connecting | Open → Closed`. Connect failures and transport
    /// faults collapse into the same path.
    pub fn mark_closed(&mut self, reason: CloseReason) -> Result<(), CavisError> {
        match self {
            Self::Connecting | Self::Open { .. } => {
                *self = Self::Closed { reason };
                Ok(())
            }
            _ => Err(CavisError::InvalidTransition("link is already Closed")),
        }
    }
}

// ── ChannelConfig ────────────────────────────────────────────────

/// Settings for one logical channel.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Remote source address, fixed for the process lifetime.
    pub address: String,
    /// Delay between close and reconnect.
    pub reconnect_delay: Duration,
}

impl ChannelConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            reconnect_delay: RECONNECT_DELAY,
        }
    }
}

// ── Channel ──────────────────────────────────────────────────────

/// The persistent, self-reconnecting link to the simulation source.
pub struct Channel;

impl Channel {
    /// Start the supervisor task.
    ///
    /// Returns the command handle and the inbound message stream. The
    /// receiver is the single registered consumer; messages arrive in
    /// transport order, each exactly once. Dropping the receiver shuts
    /// the supervisor down.
    pub fn spawn(config: ChannelConfig) -> (ChannelHandle, mpsc::Receiver<ServerMessage>) {
        let (msg_tx, msg_rx) = mpsc::channel(256);
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (state_tx, state_rx) = watch::channel(LinkState::Connecting);
        let generation = Arc::new(AtomicU64::new(0));

        tokio::spawn(run_link(
            config,
            msg_tx,
            cmd_rx,
            state_tx,
            Arc::clone(&generation),
        ));

        (
            ChannelHandle {
                cmd_tx,
                state_rx,
                generation,
            },
            msg_rx,
        )
    }
}

/// Cloneable handle for outbound commands and state inspection.
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    cmd_tx: mpsc::Sender<ClientMessage>,
    state_rx: watch::Receiver<LinkState>,
    generation: Arc<AtomicU64>,
}

impl ChannelHandle {
    /// Transmit a command if and only if the link is currently open.
    ///
    /// Anything else returns [`CavisError::SendNotReady`] and the
    /// command is dropped — at-most-once, no queueing, no retry.
    pub fn send(&self, msg: ClientMessage) -> Result<(), CavisError> {
        let state = self.state_rx.borrow().clone();
        if !state.is_open() {
            return Err(CavisError::SendNotReady {
                state: state.to_string(),
            });
        }
        self.cmd_tx
            .try_send(msg)
            .map_err(|_| CavisError::ChannelClosed)
    }

    /// Snapshot of the current link state.
    pub fn state(&self) -> LinkState {
        self.state_rx.borrow().clone()
    }

    /// Watch the link state (for status displays).
    pub fn state_watch(&self) -> watch::Receiver<LinkState> {
        self.state_rx.clone()
    }

    /// The current connection generation (0 before the first open).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

// ── Supervisor ───────────────────────────────────────────────────

async fn run_link(
    config: ChannelConfig,
    msg_tx: mpsc::Sender<ServerMessage>,
    mut cmd_rx: mpsc::Receiver<ClientMessage>,
    state_tx: watch::Sender<LinkState>,
    generation: Arc<AtomicU64>,
) {
    let mut state = LinkState::default();
    loop {
        if !matches!(state, LinkState::Connecting) {
            if state.begin_connect().is_ok() {
                let _ = state_tx.send(state.clone());
            }
        }

        match TcpStream::connect(&config.address).await {
            Ok(stream) => {
                let conn_gen = generation.fetch_add(1, Ordering::SeqCst) + 1;

                // Commands queued against a dead link are not replayed.
                while cmd_rx.try_recv().is_ok() {}

                if state.mark_open().is_ok() {
                    let _ = state_tx.send(state.clone());
                }
                info!(address = %config.address, generation = conn_gen, "link established");

                match serve(stream, conn_gen, &generation, &msg_tx, &mut cmd_rx).await {
                    Some(reason) => {
                        if state.mark_closed(reason).is_ok() {
                            let _ = state_tx.send(state.clone());
                        }
                        info!(
                            %reason,
                            delay_ms = config.reconnect_delay.as_millis() as u64,
                            "link closed; reconnect scheduled"
                        );
                    }
                    // Consumer dropped its receiver: shut down.
                    None => return,
                }
            }
            Err(e) => {
                warn!(address = %config.address, error = %e, "connect failed");
                if state.mark_closed(CloseReason::Refused).is_ok() {
                    let _ = state_tx.send(state.clone());
                }
            }
        }

        tokio::time::sleep(config.reconnect_delay).await;
    }
}

/// Drive one physical connection until it dies.
///
/// Returns `Some(reason)` to reconnect, `None` when the message
/// consumer has gone away and the supervisor should exit.
async fn serve(
    stream: TcpStream,
    conn_gen: u64,
    generation: &AtomicU64,
    msg_tx: &mpsc::Sender<ServerMessage>,
    cmd_rx: &mut mpsc::Receiver<ClientMessage>,
) -> Option<CloseReason> {
    let (mut sink, mut lines) = Framed::new(stream, WireCodec::new()).split();

    loop {
        tokio::select! {
            inbound = lines.next() => match inbound {
                Some(Ok(line)) => {
                    if generation.load(Ordering::SeqCst) != conn_gen {
                        debug!(generation = conn_gen, "dropping event from superseded connection");
                        return Some(CloseReason::Transport);
                    }
                    match protocol::parse_server(&line) {
                        Ok(msg) => {
                            if msg_tx.send(msg).await.is_err() {
                                return None;
                            }
                        }
                        // One bad line costs one message, not the link.
                        Err(e) => warn!(error = %e, "discarding inbound line"),
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "read fault; closing link");
                    return Some(CloseReason::Transport);
                }
                None => {
                    info!("peer closed the link");
                    return Some(CloseReason::PeerClosed);
                }
            },
            cmd = cmd_rx.recv() => match cmd {
                Some(msg) => {
                    if let Err(e) = sink.send(msg).await {
                        warn!(error = %e, "write fault; closing link");
                        return Some(CloseReason::Transport);
                    }
                }
                None => return None,
            },
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
