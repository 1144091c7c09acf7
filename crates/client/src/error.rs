use arrow::error::ArrowError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Service(#[from] tabulon_common::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("Page has {blocks} column blocks, expected {expected}")]
    ColumnMismatch { blocks: usize, expected: usize },

    #[error("Split {split} returned continuation token {token} twice")]
    Stalled { split: String, token: String },
}

pub type Result<T> = std::result::Result<T, ClientError>;
