//! Request and response bodies exchanged with the query engine.
//!
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Body of a split planning request. Every field is optional; an empty body
/// selects the server's default policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_count: Option<usize>,
    /// Upper bound on the number of splits; splits grow to stay under it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_split_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_size: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Splits {
    pub splits: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    /// Inputs for function-backed tables.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub parameters: HashMap<String, String>,
}

/// One column of a page, variable-length character encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarcharData {
    pub nulls: Vec<bool>,
    pub sizes: Vec<usize>,
    /// Base64 of the concatenated UTF-8 values.
    pub bytes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub varchar_data: VarcharData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub column_blocks: Vec<Block>,
    pub row_count: usize,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}
