//! Client side of the Tabulon page protocol.
//!
//! A [`SplitReader`] plans a table into splits, pages through each split by
//! following continuation tokens, and decodes every page into an Arrow
//! [`RecordBatch`](arrow::record_batch::RecordBatch) of `Utf8` columns. The
//! transport is behind [`PageService`].

pub mod batch;
pub mod error;
pub mod reader;

pub use batch::{page_to_record_batch, varchar_schema};
pub use error::{ClientError, Result};
pub use reader::{PageService, SplitReader};
