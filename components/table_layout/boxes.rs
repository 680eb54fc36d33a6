/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The box tree of a table: its rows, their cells and the optional caption. The table owns
//! its rows and every row owns its cells; nothing refers back up the tree except through
//! lookups on the [`crate::Table`].

use serde::Serialize;

use crate::context::OpaqueNode;
use crate::geom::PerAxis;
use crate::grid::FilledColumns;
use crate::requirements::SizeRequirement;
use crate::style::{CaptionSide, CellStyle, LengthPercentage};

/// A direct child of the table.
#[derive(Clone, Debug, Serialize)]
pub enum TableChild {
    Row(TableRow),
    Caption(TableCaption),
    /// Anything else the document puts inside the table. It takes no part in the grid and is
    /// given an empty allocation.
    Other(OpaqueNode),
}

impl TableChild {
    pub fn node(&self) -> OpaqueNode {
        match self {
            TableChild::Row(row) => row.node,
            TableChild::Caption(caption) => caption.node,
            TableChild::Other(node) => *node,
        }
    }

    pub fn as_row(&self) -> Option<&TableRow> {
        match self {
            TableChild::Row(row) => Some(row),
            _ => None,
        }
    }

    pub fn as_row_mut(&mut self) -> Option<&mut TableRow> {
        match self {
            TableChild::Row(row) => Some(row),
            _ => None,
        }
    }
}

/// A row of the table.
#[derive(Clone, Debug, Serialize)]
pub struct TableRow {
    pub node: OpaqueNode,
    /// An explicit height request. Only absolute lengths are honoured.
    pub height: Option<LengthPercentage>,
    pub cells: Vec<TableCell>,
    /// The columns of this row consumed by cells that originate in earlier rows.
    #[serde(skip_serializing)]
    pub(crate) filled_columns: FilledColumns,
    /// Position among the rows of the table.
    pub(crate) row_index: usize,
    /// Position among all children of the table.
    pub(crate) view_index: usize,
}

impl TableRow {
    pub fn new(node: OpaqueNode, cells: Vec<TableCell>) -> Self {
        Self {
            node,
            height: None,
            cells,
            filled_columns: FilledColumns::default(),
            row_index: 0,
            view_index: 0,
        }
    }

    pub fn row_index(&self) -> usize {
        self.row_index
    }

    pub fn view_index(&self) -> usize {
        self.view_index
    }

    pub fn is_column_filled(&self, column: usize) -> bool {
        self.filled_columns.contains(column)
    }
}

/// A table cell.
#[derive(Clone, Debug, Serialize)]
pub struct TableCell {
    pub node: OpaqueNode,
    pub style: CellStyle,
    /// The column this cell originates in, assigned when the grid is built.
    pub(crate) grid_column: usize,
    /// The row span after clamping to the rows that exist, assigned when the grid is built.
    pub(crate) grid_row_span: usize,
    /// The requirements of this cell along each axis, as of the last requirement pass.
    pub(crate) measures: PerAxis<SizeRequirement>,
}

impl TableCell {
    pub fn new(node: OpaqueNode, style: CellStyle) -> Self {
        Self {
            node,
            style: CellStyle {
                column_span: style.column_span.max(1),
                row_span: style.row_span.max(1),
                ..style
            },
            grid_column: 0,
            grid_row_span: style.row_span.max(1),
            measures: PerAxis::default(),
        }
    }

    /// Replace the style, keeping the grid annotations until the grid is rebuilt.
    pub(crate) fn set_style(&mut self, style: CellStyle) {
        self.style = CellStyle {
            column_span: style.column_span.max(1),
            row_span: style.row_span.max(1),
            ..style
        };
    }

    pub fn column_span(&self) -> usize {
        self.style.column_span
    }

    pub fn grid_column(&self) -> usize {
        self.grid_column
    }

    pub fn grid_row_span(&self) -> usize {
        self.grid_row_span
    }

    pub fn measures(&self) -> &PerAxis<SizeRequirement> {
        &self.measures
    }

    pub(crate) fn covers_column(&self, column: usize) -> bool {
        column >= self.grid_column && column < self.grid_column + self.column_span()
    }
}

/// The caption of a table. It lives outside of the grid.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct TableCaption {
    pub node: OpaqueNode,
    pub side: CaptionSide,
}

/// Iterate over the rows among the children of a table.
pub(crate) fn rows(children: &[TableChild]) -> impl Iterator<Item = &TableRow> {
    children.iter().filter_map(TableChild::as_row)
}

pub(crate) fn rows_mut(children: &mut [TableChild]) -> impl Iterator<Item = &mut TableRow> {
    children.iter_mut().filter_map(TableChild::as_row_mut)
}
