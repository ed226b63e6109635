//! Operator console — line commands on stdin.
//!
//! A dedicated task reads stdin and feeds parsed commands into an
//! mpsc; the main loop selects over these and the inbound message
//! stream. Parse failures print usage and are not forwarded.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Commands the operator can issue.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorCommand {
    /// Request a run; omitted fields fall back to configured defaults.
    Start {
        n: Option<u32>,
        p: Option<f64>,
        q: Option<f64>,
    },
    /// Halt the current run.
    Stop,
    /// Replay cached frame `index` (0-based).
    Show(usize),
    /// Print link state and frame count.
    Status,
    /// Exit the viewer.
    Quit,
}

pub const USAGE: &str = "commands: start [n] [p] [q] | stop | show <frame> | status | quit";

/// Parse one console line.
pub fn parse_command(line: &str) -> Result<OperatorCommand, String> {
    let mut words = line.split_whitespace();
    let verb = words.next().ok_or(USAGE)?;

    match verb {
        "start" => {
            let n = words
                .next()
                .map(|w| w.parse().map_err(|_| format!("bad grid size: {w}")))
                .transpose()?;
            let p = words
                .next()
                .map(|w| w.parse().map_err(|_| format!("bad weight p: {w}")))
                .transpose()?;
            let q = words
                .next()
                .map(|w| w.parse().map_err(|_| format!("bad weight q: {w}")))
                .transpose()?;
            Ok(OperatorCommand::Start { n, p, q })
        }
        "stop" => Ok(OperatorCommand::Stop),
        "show" => {
            let idx = words.next().ok_or("show needs a frame index")?;
            let idx = idx.parse().map_err(|_| format!("bad frame index: {idx}"))?;
            Ok(OperatorCommand::Show(idx))
        }
        "status" => Ok(OperatorCommand::Status),
        "quit" | "exit" => Ok(OperatorCommand::Quit),
        other => Err(format!("unknown command: {other}\n{USAGE}")),
    }
}

/// Spawn the stdin reader task.
pub fn spawn_stdin_console() -> mpsc::Receiver<OperatorCommand> {
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match parse_command(line) {
                Ok(cmd) => {
                    let quit = cmd == OperatorCommand::Quit;
                    if tx.send(cmd).await.is_err() || quit {
                        break;
                    }
                }
                Err(msg) => eprintln!("{msg}"),
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_start_full() {
        assert_eq!(
            parse_command("start 32 0.6 0.4").unwrap(),
            OperatorCommand::Start {
                n: Some(32),
                p: Some(0.6),
                q: Some(0.4),
            }
        );
    }

    #[test]
    fn parse_start_defaults() {
        assert_eq!(
            parse_command("start").unwrap(),
            OperatorCommand::Start {
                n: None,
                p: None,
                q: None,
            }
        );
    }

    #[test]
    fn parse_show() {
        assert_eq!(parse_command("show 7").unwrap(), OperatorCommand::Show(7));
        assert!(parse_command("show").is_err());
        assert!(parse_command("show seven").is_err());
    }

    #[test]
    fn parse_simple_verbs() {
        assert_eq!(parse_command("stop").unwrap(), OperatorCommand::Stop);
        assert_eq!(parse_command("status").unwrap(), OperatorCommand::Status);
        assert_eq!(parse_command("quit").unwrap(), OperatorCommand::Quit);
        assert_eq!(parse_command("exit").unwrap(), OperatorCommand::Quit);
    }

    #[test]
    fn unknown_verb_reports_usage() {
        let err = parse_command("launch").unwrap_err();
        assert!(err.contains("unknown command"));
        assert!(err.contains("start"));
    }

    #[test]
    fn bad_number_is_reported() {
        assert!(parse_command("start big").is_err());
        assert!(parse_command("start 32 fast").is_err());
    }
}
