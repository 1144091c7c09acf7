//! Column selection and ordering for a page.

use tabulon_common::{Error, Result};

/// Indices of the output columns, in output order.
///
/// `None` keeps every column in source order. Otherwise each desired name must
/// match a column name exactly; the output follows the desired order.
pub fn project(column_names: &[String], desired_columns: Option<&[String]>) -> Result<Vec<usize>> {
    let Some(desired) = desired_columns else {
        return Ok((0..column_names.len()).collect());
    };
    desired
        .iter()
        .map(|name| {
            column_names
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| Error::UnknownColumn(name.clone()))
        })
        .collect()
}

/// Transposes the selected columns of `rows` into column-major order.
pub fn columns_of<'a>(rows: &'a [Vec<String>], projection: &[usize]) -> Vec<Vec<&'a str>> {
    projection
        .iter()
        .map(|&index| {
            rows.iter()
                .map(|row| row.get(index).map(String::as_str).unwrap_or(""))
                .collect()
        })
        .collect()
}
