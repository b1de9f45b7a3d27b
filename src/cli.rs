//! Command line arguments shared by the front ends

use clap::Parser;
use std::path::PathBuf;

use crate::config::KeepAwakeConfig;
use crate::error::ConfigError;

/// Options common to every front end
#[derive(Parser, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Never request a native screen lock; always simulate activity
    #[arg(long)]
    pub fallback_only: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Load the config file and apply command line overrides
    pub fn load_config(&self) -> Result<KeepAwakeConfig, ConfigError> {
        let mut config = KeepAwakeConfig::load(self.config.as_deref())?;
        if self.fallback_only {
            config.native = false;
        }
        Ok(config)
    }

    /// Initialise env_logger; `--verbose` forces debug output for this crate
    pub fn init_logging(&self) {
        let default_filter = if self.verbose { "pseudosap_lib=debug,info" } else { "info" };
        let _ = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(default_filter),
        )
        .try_init();
    }
}
