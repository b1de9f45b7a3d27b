// PseudoSAP - keep your screen awake, no admin rights required.
//
// A native screen lock is used when the platform grants one; otherwise
// periodic simulated activity keeps the display from idling.

// Declare modules
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fallback;
pub mod platform;
pub mod session;
pub mod terminal;
pub mod web_server;

use std::sync::Arc;

use crate::cli::CommonArgs;
use crate::commands::session::KeepAwakeState;
use crate::platform::NativeCapability;
use crate::session::SessionController;

pub use error::{ConfigError, WakeError, WakeResult};

/// Build the session state for the given arguments
pub fn build_state(args: &CommonArgs) -> anyhow::Result<KeepAwakeState> {
    let config = args.load_config()?;
    let capability = Arc::new(NativeCapability::from_config(&config));
    Ok(KeepAwakeState::new(SessionController::new(&config, capability)))
}

/// Terminal entry point
pub async fn run(args: CommonArgs) -> anyhow::Result<()> {
    args.init_logging();
    let state = build_state(&args)?;
    terminal::run(state).await
}
