use thiserror::Error;

/// Unified error type for Tabulon crates.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed token '{token}': {reason}")]
    MalformedToken { token: String, reason: String },
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid split policy: {0}")]
    InvalidSplitPolicy(String),
    #[error("Missing parameter: {0}")]
    MissingParameter(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Invalid column block: {0}")]
    InvalidBlock(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn malformed_token(token: &str, reason: impl Into<String>) -> Self {
        Error::MalformedToken { token: token.to_string(), reason: reason.into() }
    }

    pub fn table_not_found(schema: &str, table: &str) -> Self {
        Error::NotFound(format!("table {}.{}", schema, table))
    }

    pub fn schema_not_found(schema: &str) -> Self {
        Error::NotFound(format!("schema {}", schema))
    }

    /// Error code for the wire protocol.
    pub fn code(&self) -> &'static str {
        match self {
            Error::MalformedToken { .. } => "MALFORMED_TOKEN",
            Error::UnknownColumn(_) => "UNKNOWN_COLUMN",
            Error::NotFound(_) => "NOT_FOUND",
            Error::InvalidSplitPolicy(_) => "INVALID_SPLIT_POLICY",
            Error::MissingParameter(_) => "MISSING_PARAMETER",
            Error::InvalidParameter(_) => "INVALID_PARAMETER",
            Error::InvalidBlock(_) => "INVALID_BLOCK",
            _ => "INTERNAL_ERROR",
        }
    }

    /// True when the request itself was at fault and retrying it unchanged is pointless.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedToken { .. }
                | Error::UnknownColumn(_)
                | Error::InvalidSplitPolicy(_)
                | Error::MissingParameter(_)
                | Error::InvalidParameter(_)
                | Error::InvalidBlock(_)
        )
    }
}
