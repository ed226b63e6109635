//! CAVIS viewer — entry point.
//!
//! ```text
//! cavis-view                    Connect with defaults
//! cavis-view --config <path>    Use custom config TOML
//! cavis-view --address <addr>   Override the source address
//! cavis-view --gen-config       Dump default config and exit
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cavis_core::{Channel, ChannelConfig, ClientMessage, FrameStore, Palette};

use cavis_view::config::ViewConfig;
use cavis_view::console::{self, OperatorCommand};
use cavis_view::controls::{RunParams, WeightField, rule_from_name};
use cavis_view::dispatcher::{Dispatcher, Update};
use cavis_view::display::TerminalDisplay;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "cavis-view", about = "CAVIS simulation viewer")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "cavis-view.toml")]
    config: PathBuf,

    /// Source address (overrides config). Example: 127.0.0.1:8080
    #[arg(short, long)]
    address: Option<String>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        let text = toml::to_string_pretty(&ViewConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    let mut config = ViewConfig::load(&cli.config);
    if let Some(addr) = cli.address {
        config.network.address = addr;
    }

    // Init tracing.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("cavis-view v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Frame store, display, channel ────────────────────────

    let store = FrameStore::new(config.surface.width, config.surface.height, Palette::default());
    let mut dispatcher = Dispatcher::new(store);
    let display = TerminalDisplay::from_terminal();

    let (handle, mut inbox) = Channel::spawn(ChannelConfig {
        address: config.network.address.clone(),
        reconnect_delay: Duration::from_millis(config.network.reconnect_delay_ms),
    });

    // ── 2. Operator console ─────────────────────────────────────

    let mut ops = console::spawn_stdin_console();
    let rule = rule_from_name(&config.run.weight_rule);
    let mut params = RunParams {
        n: config.run.n,
        p: config.run.p,
        q: config.run.q,
    };
    println!("{}", console::USAGE);

    // ── 3. Event loop ───────────────────────────────────────────

    let mut out = std::io::stdout();
    loop {
        tokio::select! {
            msg = inbox.recv() => {
                let Some(msg) = msg else { break };
                match dispatcher.dispatch(msg) {
                    Update::RunStarted { n } => {
                        println!("run started (n = {n})");
                    }
                    Update::FrameAppended { count } => {
                        display.render(&dispatcher.store().surface().snapshot(), &mut out)?;
                        println!("generation {count}");
                    }
                    Update::RunFinished { count } => {
                        println!(
                            "run finished: {count} frames cached; `show 0..={}` to replay",
                            count.saturating_sub(1),
                        );
                    }
                    Update::Skipped => {}
                }
            }
            cmd = ops.recv() => {
                let Some(cmd) = cmd else { break };
                match cmd {
                    OperatorCommand::Start { n, p, q } => {
                        if let Some(n) = n {
                            params.n = n;
                        }
                        if let Some(p) = p {
                            params.p = p;
                            rule.adjust(&mut params, WeightField::P);
                        }
                        if let Some(q) = q {
                            params.q = q;
                            rule.adjust(&mut params, WeightField::Q);
                        }
                        let msg = ClientMessage::Start {
                            n: params.n,
                            p: params.p,
                            q: params.q,
                        };
                        match handle.send(msg) {
                            Ok(()) => info!(n = params.n, p = params.p, q = params.q, "start requested"),
                            Err(e) => warn!(error = %e, "start not sent"),
                        }
                    }
                    OperatorCommand::Stop => {
                        if let Err(e) = handle.send(ClientMessage::Stop) {
                            warn!(error = %e, "stop not sent");
                        }
                    }
                    OperatorCommand::Show(index) => {
                        if !dispatcher.store().is_sealed() {
                            println!("playback opens once the run finishes");
                        } else {
                            match dispatcher.show_frame(index) {
                                Ok(()) => {
                                    display.render(&dispatcher.store().surface().snapshot(), &mut out)?;
                                    println!("frame {index} / {}", dispatcher.store().frame_count());
                                }
                                Err(e) => warn!(error = %e, "cannot show frame"),
                            }
                        }
                    }
                    OperatorCommand::Status => {
                        let sealed = if dispatcher.store().is_sealed() { " (sealed)" } else { "" };
                        println!(
                            "link: {} | connection generation: {} | frames: {}{sealed}",
                            handle.state(),
                            handle.generation(),
                            dispatcher.store().frame_count(),
                        );
                    }
                    OperatorCommand::Quit => break,
                }
            }
        }
    }

    // ── 4. Shutdown ─────────────────────────────────────────────

    info!("shutting down");
    Ok(())
}
