//! Row partitioning: a flat ordered view sliced into fixed-capacity rows.

use crate::grid::GridError;
use crate::models::RowModel;

/// Splits `item_count` consecutive view positions into rows of `columns`
/// items each; the last row holds the remainder.
///
/// Row membership is recoverable from the flat position alone:
/// `row = i / columns`, `col = i % columns`. Stateless; callers re-run it
/// whenever the view or the column count changes.
pub fn partition_rows(item_count: usize, columns: usize) -> Result<Vec<RowModel>, GridError> {
    if columns == 0 {
        return Err(GridError::InvalidColumns);
    }

    let rows = (0..row_count(item_count, columns)?)
        .map(|row_index| {
            let start = row_index * columns;
            RowModel::new(row_index, start, (start + columns).min(item_count))
        })
        .collect();
    Ok(rows)
}

/// Number of rows the partition produces, without building it.
pub fn row_count(item_count: usize, columns: usize) -> Result<usize, GridError> {
    if columns == 0 {
        return Err(GridError::InvalidColumns);
    }
    Ok(item_count.div_ceil(columns))
}

/// A single row of the partition, without building the rest.
///
/// Lets the grid materialize only windowed rows, keeping per-scroll work
/// proportional to the window rather than the collection.
pub fn row_span(row_index: usize, item_count: usize, columns: usize) -> Result<RowModel, GridError> {
    if columns == 0 {
        return Err(GridError::InvalidColumns);
    }
    let start = (row_index * columns).min(item_count);
    let end = (start + columns).min(item_count);
    Ok(RowModel::new(row_index, start, end))
}
