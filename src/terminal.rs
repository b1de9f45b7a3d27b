//! Terminal front end
//!
//! Starts the session immediately, echoes status changes, notices and the
//! simulated activity stream. Enter toggles, `q` or Ctrl-C quits.

use log::{debug, info, warn};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use crate::commands::session::{toggle_keep_awake, KeepAwakeState};
use crate::session::{SessionEvent, Severity};

/// Render one event for a terminal
pub fn render_event(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::StatusChanged { status, .. } => Some(format!("\nStatus: {}\n", status)),
        SessionEvent::Notice(notice) => {
            let marker = match notice.severity {
                Severity::Destructive => "!",
                Severity::Default => "*",
            };
            Some(format!(
                "\n[{}] {}: {}\n",
                marker, notice.title, notice.description
            ))
        }
        SessionEvent::Activity { character, .. } => Some(character.to_string()),
        SessionEvent::Scrolled { .. } => None,
    }
}

/// Run the interactive loop until the user quits, then tear the session down
pub async fn run(state: KeepAwakeState) -> anyhow::Result<()> {
    let mut events = state.0.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    state.0.start().await;
    println!("Status: {}", state.0.status());
    println!("Press Enter to toggle, q to quit.");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().eq_ignore_ascii_case("q") => break,
                Ok(Some(_)) => {
                    if let Err(e) = toggle_keep_awake(&state).await {
                        warn!("Toggle failed: {}", e);
                    }
                }
                Ok(None) => {
                    debug!("stdin closed, waiting for Ctrl-C");
                    stdin_open = false;
                }
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    stdin_open = false;
                }
            },
            event = events.recv() => match event {
                Ok(event) => {
                    if let Some(text) = render_event(&event) {
                        print!("{}", text);
                        let _ = std::io::stdout().flush();
                    }
                }
                Err(RecvError::Lagged(skipped)) => debug!("Skipped {} events", skipped),
                Err(RecvError::Closed) => break,
            },
        }
    }

    state.0.shutdown().await;
    println!("Status: {}", state.0.status());
    Ok(())
}
