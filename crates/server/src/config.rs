use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tabulon_engine::{PagePolicy, SplitPolicy};

use crate::error::ServerError;

/// Environment variable naming the settings file when `--config` is not given.
pub const CONFIG_PATH_ENV: &str = "TABULON_CONFIG_PATH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PagePolicyKind {
    #[default]
    Halve,
    Whole,
    Bounded,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Rows per split when a request names no policy. Unset means one split per table.
    #[serde(default)]
    pub default_split_size: Option<usize>,
    #[serde(default)]
    pub page_policy: PagePolicyKind,
    #[serde(default = "default_page_max_rows")]
    pub page_max_rows: usize,
    #[serde(default = "default_snapshot_cache")]
    pub snapshot_cache: bool,
    /// Schema serving the function tables; empty disables it.
    #[serde(default = "default_virtual_schema")]
    pub virtual_schema: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_page_max_rows() -> usize {
    1000
}

fn default_snapshot_cache() -> bool {
    true
}

fn default_virtual_schema() -> String {
    "virtual".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            default_split_size: None,
            page_policy: PagePolicyKind::default(),
            page_max_rows: default_page_max_rows(),
            snapshot_cache: default_snapshot_cache(),
            virtual_schema: default_virtual_schema(),
        }
    }
}

impl Settings {
    /// Loads settings from an optional TOML file overlaid with `TABULON__*` variables.
    pub fn new(config_path: Option<&Path>) -> Result<Self, ServerError> {
        let config_path = config_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut builder = config::Config::builder();
        if let Some(path) = &config_path {
            builder = builder.add_source(config::File::from(path.as_path()).required(true));
        }
        let s = builder
            .add_source(
                config::Environment::with_prefix("TABULON")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let settings: Settings = s.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ServerError> {
        if self.default_split_size == Some(0) {
            return Err(ServerError::InvalidSetting("default_split_size must be positive".to_string()));
        }
        if self.page_policy == PagePolicyKind::Bounded && self.page_max_rows == 0 {
            return Err(ServerError::InvalidSetting("page_max_rows must be positive".to_string()));
        }
        Ok(())
    }

    pub fn server_address(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn page_policy(&self) -> PagePolicy {
        match self.page_policy {
            PagePolicyKind::Halve => PagePolicy::Halve,
            PagePolicyKind::Whole => PagePolicy::Whole,
            PagePolicyKind::Bounded => PagePolicy::Bounded { max_rows: self.page_max_rows },
        }
    }

    pub fn default_split_policy(&self) -> SplitPolicy {
        match self.default_split_size {
            Some(size) => SplitPolicy::FixedSize(size),
            None => SplitPolicy::Single,
        }
    }

    pub fn virtual_schema(&self) -> Option<&str> {
        Some(self.virtual_schema.as_str()).filter(|name| !name.is_empty())
    }
}
