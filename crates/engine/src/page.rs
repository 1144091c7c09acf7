//! Page assembly: cursor, then projection, then column encoding.

use crate::block;
use crate::cursor::{self, PagePolicy, PageStep};
use crate::projection;
use crate::range::RowRange;
use tabulon_common::wire::{Block, PageResult};
use tabulon_common::{Error, Result, TableData};
use tracing::debug;

/// Encodes `rows` as one block per projected column.
pub fn encode_rows(column_names: &[String], rows: &[Vec<String>], desired_columns: Option<&[String]>) -> Result<Vec<Block>> {
    let projection = projection::project(column_names, desired_columns)?;
    Ok(projection::columns_of(rows, &projection)
        .iter()
        .map(|values| block::encode(values.as_slice()))
        .collect())
}

/// Parses a split token and checks it against the table size.
pub fn resolve_split(token: &str, row_count: usize) -> Result<RowRange> {
    let split = RowRange::parse_token(token)?;
    if split.end > row_count {
        return Err(Error::malformed_token(
            token,
            format!("split extends past the table's {} rows", row_count),
        ));
    }
    Ok(split)
}

/// Builds the page a `getPage` call returns for one split of `table`.
pub fn read_page(
    table: &TableData,
    split_token: &str,
    continuation_token: Option<&str>,
    desired_columns: Option<&[String]>,
    policy: PagePolicy,
) -> Result<PageResult> {
    let split = resolve_split(split_token, table.row_count())?;
    let step = cursor::advance(split, continuation_token, policy)?;
    debug!(split = split_token, rows = %step.rows, has_more = !step.is_last(), "page assembled");
    let PageStep { rows, next_token } = step;
    let selected = &table.rows[rows.start..rows.end];
    let column_blocks = encode_rows(&table.column_names, selected, desired_columns)?;
    Ok(PageResult { column_blocks, row_count: rows.len(), next_token })
}
