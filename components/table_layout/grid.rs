/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The logical grid of a table.
//!
//! The grid is never stored as a dense matrix. Every row keeps a bitset of the columns that
//! cells from earlier rows reach into, and every cell records the column it originates in.
//! Together with the column count this is enough to answer which cell owns any slot.

use log::debug;
use serde::Serialize;
use smallvec::SmallVec;

use crate::boxes::{TableCell, TableChild, TableRow, rows, rows_mut};
use crate::geom::TableSlotCoordinates;

const BITS_PER_WORD: usize = u64::BITS as usize;

/// A growable set of column indices.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FilledColumns {
    words: SmallVec<[u64; 2]>,
}

impl FilledColumns {
    pub fn insert(&mut self, column: usize) {
        let word = column / BITS_PER_WORD;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1 << (column % BITS_PER_WORD);
    }

    pub fn contains(&self, column: usize) -> bool {
        self.words
            .get(column / BITS_PER_WORD)
            .is_some_and(|word| word & (1 << (column % BITS_PER_WORD)) != 0)
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// The highest column in the set.
    pub fn last(&self) -> Option<usize> {
        self.words
            .iter()
            .enumerate()
            .rev()
            .find(|(_, word)| **word != 0)
            .map(|(index, word)| {
                index * BITS_PER_WORD + (BITS_PER_WORD - 1 - word.leading_zeros() as usize)
            })
    }
}

/// The shape of the grid, derived from the rows of a table.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct TableGrid {
    pub column_count: usize,
    pub row_count: usize,
    pub has_multi_row_cells: bool,
    pub has_multi_column_cells: bool,
}

impl TableGrid {
    /// Rebuild the grid from the children of a table, annotating every row with its filled
    /// columns and every cell with its origin column and clamped row span.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "TableGrid::rebuild", skip_all, level = "trace")
    )]
    pub fn rebuild(children: &mut [TableChild]) -> Self {
        let mut row_count = 0;
        for (view_index, child) in children.iter_mut().enumerate() {
            if let TableChild::Row(row) = child {
                row.row_index = row_count;
                row.view_index = view_index;
                row.filled_columns.clear();
                row_count += 1;
            }
        }

        let mut filled = vec![FilledColumns::default(); row_count];
        let mut grid = TableGrid {
            row_count,
            ..Default::default()
        };

        for (row_index, row) in rows_mut(children).enumerate() {
            let mut column = 0;
            for cell in row.cells.iter_mut() {
                while filled[row_index].contains(column) {
                    column += 1;
                }
                cell.grid_column = column;

                let column_span = cell.column_span();
                let remaining_rows = row_count - row_index;
                if cell.style.row_span > remaining_rows {
                    debug!(
                        "Cell rowspan {} reaches past the last row; clamping to {}.",
                        cell.style.row_span, remaining_rows
                    );
                }
                let row_span = cell.style.row_span.min(remaining_rows);
                cell.grid_row_span = row_span;

                grid.has_multi_row_cells |= row_span > 1;
                grid.has_multi_column_cells |= column_span > 1;

                if column_span > 1 || row_span > 1 {
                    for (offset, row_filled) in
                        filled[row_index..row_index + row_span].iter_mut().enumerate()
                    {
                        for covered in column..column + column_span {
                            if offset != 0 || covered != column {
                                row_filled.insert(covered);
                            }
                        }
                    }
                }
                column += column_span;
            }
            grid.column_count = grid.column_count.max(column);
        }

        for (row, row_filled) in rows_mut(children).zip(filled) {
            if let Some(last) = row_filled.last() {
                grid.column_count = grid.column_count.max(last + 1);
            }
            row.filled_columns = row_filled;
        }

        debug!(
            "Rebuilt table grid: {} rows x {} columns.",
            grid.row_count, grid.column_count
        );
        grid
    }

    /// A grid without rows or without columns lays out to nothing.
    pub fn is_degenerate(&self) -> bool {
        self.row_count == 0 || self.column_count == 0
    }
}

/// Find the cell covering the given slot, returning the row it originates in together with the
/// cell. Empty slots return `None`.
pub(crate) fn resolve_origin<'a>(
    children: &'a [TableChild],
    coords: TableSlotCoordinates,
) -> Option<(usize, &'a TableCell)> {
    let rows: Vec<&TableRow> = rows(children).take(coords.y + 1).collect();
    if rows.len() <= coords.y {
        return None;
    }
    rows.iter().enumerate().rev().find_map(|(row_index, row)| {
        row.cells
            .iter()
            .find(|cell| cell.covers_column(coords.x) && row_index + cell.grid_row_span > coords.y)
            .map(|cell| (row_index, cell))
    })
}
