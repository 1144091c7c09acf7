//! Command line surface of the `tabulon` binary.

use clap::Parser;
use std::path::PathBuf;
use tabulon_server::{ServerError, Settings};

#[derive(Parser, Debug)]
#[command(author, version, about = "Serves CSV tables to a remote query engine", long_about = None)]
pub struct Args {
    /// Settings file (TOML). Falls back to TABULON_CONFIG_PATH.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory holding one sub-directory of CSV files per schema.
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Settings from the file and environment, with command line flags on top.
    pub fn load_settings(&self) -> Result<Settings, ServerError> {
        let settings = Settings::new(self.config.as_deref())?;
        let settings = self.apply_overrides(settings);
        settings.validate()?;
        Ok(settings)
    }

    pub fn apply_overrides(&self, mut settings: Settings) -> Settings {
        if let Some(host) = &self.host {
            settings.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(dir) = &self.data_dir {
            settings.data_dir = dir.clone();
        }
        settings
    }
}
