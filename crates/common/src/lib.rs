//! Common crate
//!
//! Shared types, wire models, and error handling for Tabulon.
//!
//! # Example
//! ```rust
//! use tabulon_common::Error;
//! let err = Error::UnknownColumn("price".to_string());
//! assert_eq!(err.code(), "UNKNOWN_COLUMN");
//! ```

pub mod catalog;
pub mod error;
pub mod wire;

pub use catalog::{ColumnMetadata, SchemaTableName, TableData, TableMetadata};
pub use error::{Error, Result};
