use std::net::AddrParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to load configuration")]
    Config(#[from] config::ConfigError),

    #[error("Invalid server address in configuration")]
    AddrParse(#[from] AddrParseError),

    #[error("Server I/O error")]
    Io(#[from] std::io::Error),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}
