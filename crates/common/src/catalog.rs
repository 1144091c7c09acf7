use serde::{Deserialize, Serialize};
use std::fmt;

/// The only column type the connector serves.
pub const VARCHAR: &str = "varchar";

/// Identifies a table within a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaTableName {
    pub schema: String,
    pub table: String,
}

impl SchemaTableName {
    pub fn new(schema: &str, table: &str) -> Self {
        Self { schema: schema.to_string(), table: table.to_string() }
    }
}

impl fmt::Display for SchemaTableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub comment: Option<String>,
    pub hidden: bool,
}

impl ColumnMetadata {
    pub fn varchar(name: &str) -> Self {
        Self { name: name.to_string(), data_type: VARCHAR.to_string(), comment: None, hidden: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    pub schema_table_name: SchemaTableName,
    pub columns: Vec<ColumnMetadata>,
    pub comment: Option<String>,
}

impl TableMetadata {
    /// Metadata for a table whose columns are all `varchar`.
    pub fn from_column_names(name: SchemaTableName, column_names: &[String]) -> Self {
        Self {
            schema_table_name: name,
            columns: column_names.iter().map(|c| ColumnMetadata::varchar(c)).collect(),
            comment: None,
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// A loaded table: column names and rows of strings, both in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableData {
    pub column_names: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    pub fn new(column_names: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { column_names, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
