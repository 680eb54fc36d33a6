/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

#![allow(dead_code)]

use std::collections::HashMap;

use app_units::{Au, MAX_AU};
use table_layout::{
    Axis, CellStyle, IntrinsicSizes, OpaqueNode, Table, TableCell, TableChild, TableLayoutOptions,
    TableRow, TableStyle,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn px(value: i32) -> Au {
    Au::from_px(value)
}

/// Intrinsic sizes looked up per node and axis, with a fallback for everything else.
#[derive(Default)]
pub struct SizeTable {
    sizes: HashMap<(OpaqueNode, Axis), (Au, Au, Au)>,
    fallback: (Au, Au, Au),
}

impl SizeTable {
    pub fn with_fallback(minimum: Au, preferred: Au) -> Self {
        Self {
            sizes: HashMap::new(),
            fallback: (minimum, preferred, MAX_AU),
        }
    }

    pub fn set(&mut self, node: usize, axis: Axis, minimum: Au, preferred: Au) -> &mut Self {
        self.sizes
            .insert((OpaqueNode(node), axis), (minimum, preferred, MAX_AU));
        self
    }

    fn lookup(&self, node: OpaqueNode, axis: Axis) -> (Au, Au, Au) {
        self.sizes.get(&(node, axis)).copied().unwrap_or(self.fallback)
    }
}

impl IntrinsicSizes for SizeTable {
    fn minimum_span(&self, node: OpaqueNode, axis: Axis) -> Au {
        self.lookup(node, axis).0
    }

    fn preferred_span(&self, node: OpaqueNode, axis: Axis) -> Au {
        self.lookup(node, axis).1
    }

    fn maximum_span(&self, node: OpaqueNode, axis: Axis) -> Au {
        self.lookup(node, axis).2
    }
}

/// A cell with the given node number and spans.
pub fn cell(node: usize, column_span: usize, row_span: usize) -> TableCell {
    TableCell::new(OpaqueNode(node), CellStyle::with_spans(column_span, row_span))
}

pub fn row(node: usize, cells: Vec<TableCell>) -> TableChild {
    TableChild::Row(TableRow::new(OpaqueNode(node), cells))
}

pub fn table(children: Vec<TableChild>) -> Table {
    Table::new(
        OpaqueNode(1),
        TableStyle::default(),
        children,
        TableLayoutOptions::default(),
    )
}

pub fn sum(values: &[Au]) -> Au {
    values.iter().fold(Au(0), |sum, value| sum + *value)
}
