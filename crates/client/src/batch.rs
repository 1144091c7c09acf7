//! Page to Arrow conversion.

use crate::error::{ClientError, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use std::sync::Arc;
use tabulon_common::wire::PageResult;
use tabulon_common::Error;
use tabulon_engine::block;

/// Arrow schema for `varchar` columns: nullable `Utf8` fields in the given order.
pub fn varchar_schema(column_names: &[String]) -> SchemaRef {
    let fields: Vec<Field> = column_names
        .iter()
        .map(|name| Field::new(name, DataType::Utf8, true))
        .collect();
    Arc::new(Schema::new(fields))
}

/// Decodes every column block of `page` into a `RecordBatch`.
///
/// `column_names` names the blocks positionally, so it must be the projection
/// the page was requested with. A page without blocks still carries its row count.
pub fn page_to_record_batch(page: &PageResult, column_names: &[String]) -> Result<RecordBatch> {
    if page.column_blocks.len() != column_names.len() {
        return Err(ClientError::ColumnMismatch {
            blocks: page.column_blocks.len(),
            expected: column_names.len(),
        });
    }

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(column_names.len());
    for (name, column_block) in column_names.iter().zip(&page.column_blocks) {
        let values = block::decode(column_block)?;
        if values.len() != page.row_count {
            return Err(Error::InvalidBlock(format!(
                "column {} has {} values for {} rows",
                name,
                values.len(),
                page.row_count
            ))
            .into());
        }
        columns.push(Arc::new(StringArray::from(values)));
    }

    let options = RecordBatchOptions::new().with_row_count(Some(page.row_count));
    Ok(RecordBatch::try_new_with_options(varchar_schema(column_names), columns, &options)?)
}
