//! Engine crate
//!
//! The split and page protocol of the Tabulon connector: row range tokens,
//! split planning, pagination, projection and the `varchar` column encoding.
//!
//! # Example
//! ```rust
//! use tabulon_engine::{plan, SplitPolicy};
//!
//! let splits = plan(5, SplitPolicy::FixedCount(2)).unwrap();
//! let tokens: Vec<String> = splits.iter().map(|s| s.to_token()).collect();
//! assert_eq!(tokens, vec!["0-3", "3-5"]);
//! ```

pub mod block;
pub mod cursor;
pub mod page;
pub mod projection;
pub mod range;
pub mod split;

pub use cursor::{advance, PagePolicy, PageStep};
pub use page::read_page;
pub use projection::project;
pub use range::RowRange;
pub use split::{max_splits, plan, plan_capped, SplitPolicy};
