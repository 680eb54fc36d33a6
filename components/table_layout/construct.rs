/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Construction of the table box tree from the document.

use app_units::Au;
use log::{debug, warn};

use crate::boxes::{TableCaption, TableCell, TableChild, TableRow};
use crate::context::OpaqueNode;
use crate::options::TableLayoutOptions;
use crate::style::{CaptionSide, CellStyle, LengthPercentage, Percentage, TableStyle};
use crate::table::Table;

/// What kind of table part a document node is.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ElementTag {
    Table,
    /// A group of rows, such as a table body. Its rows belong to the enclosing table.
    RowGroup,
    Row,
    Cell,
    Caption,
    Other,
}

/// The attributes table layout reads from the document.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AttributeKey {
    ColumnSpan,
    RowSpan,
    Width,
    Height,
    VerticalAlign,
    CaptionSide,
    Border,
    CellSpacing,
}

/// An already-parsed attribute value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AttributeValue {
    Integer(i32),
    Length(Au),
    Percentage(Percentage),
    /// A position between `0.` and `1.`, used for alignment.
    Fraction(f32),
    CaptionSide(CaptionSide),
}

impl AttributeValue {
    fn to_length_percentage(self) -> Option<LengthPercentage> {
        match self {
            AttributeValue::Length(length) => Some(LengthPercentage::Length(length)),
            AttributeValue::Percentage(percentage) => {
                Some(LengthPercentage::Percentage(percentage))
            },
            _ => None,
        }
    }

    fn to_length(self) -> Option<Au> {
        match self {
            AttributeValue::Length(length) => Some(length),
            _ => None,
        }
    }
}

/// The document a table lives in, as seen by table layout.
pub trait TableDocument: Sync {
    /// The element children of `node`, in document order.
    fn children(&self, node: OpaqueNode) -> Vec<(OpaqueNode, ElementTag)>;

    fn attribute(&self, node: OpaqueNode, key: AttributeKey) -> Option<AttributeValue>;

    /// The parent of `node`. Used to find out whether a change deep inside a cell concerns a
    /// table.
    fn parent(&self, _node: OpaqueNode) -> Option<OpaqueNode> {
        None
    }
}

/// A change reported by the document.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StructuralChange {
    /// Children of the node were inserted, removed or replaced.
    ChildrenChanged(OpaqueNode),
    /// Attributes of the node changed.
    AttributesChanged(OpaqueNode),
    /// The content of the node was laid out again and may have a different size.
    ContentReflowed(OpaqueNode),
}

impl StructuralChange {
    pub fn node(&self) -> OpaqueNode {
        match *self {
            StructuralChange::ChildrenChanged(node) |
            StructuralChange::AttributesChanged(node) |
            StructuralChange::ContentReflowed(node) => node,
        }
    }
}

/// The children of a table read from the document, with the row groups they came through.
pub(crate) struct TableContents {
    pub children: Vec<TableChild>,
    pub row_groups: Vec<OpaqueNode>,
}

/// Builds [`Table`]s out of a [`TableDocument`].
pub struct TableBuilder<'dom> {
    document: &'dom dyn TableDocument,
    options: &'dom TableLayoutOptions,
}

impl<'dom> TableBuilder<'dom> {
    pub fn new(document: &'dom dyn TableDocument, options: &'dom TableLayoutOptions) -> Self {
        Self { document, options }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "TableBuilder::construct", skip_all, level = "trace")
    )]
    pub fn construct(&self, table: OpaqueNode) -> Table {
        let TableContents {
            children,
            row_groups,
        } = self.contents(table);
        let mut table = Table::new(table, self.table_style(table), children, self.options.clone());
        table.set_row_groups(row_groups);
        table
    }

    pub(crate) fn contents(&self, table: OpaqueNode) -> TableContents {
        let mut contents = TableContents {
            children: Vec::new(),
            row_groups: Vec::new(),
        };
        let mut have_caption = false;
        for (node, tag) in self.document.children(table) {
            match tag {
                ElementTag::Row => contents.children.push(TableChild::Row(self.row(node))),
                ElementTag::RowGroup => {
                    contents.row_groups.push(node);
                    for (child, child_tag) in self.document.children(node) {
                        if child_tag == ElementTag::Row {
                            contents.children.push(TableChild::Row(self.row(child)));
                        } else {
                            contents.children.push(TableChild::Other(child));
                        }
                    }
                },
                ElementTag::Caption if !have_caption => {
                    have_caption = true;
                    contents.children.push(TableChild::Caption(self.caption(node)));
                },
                ElementTag::Caption => {
                    warn!("Table {:?} has more than one caption; ignoring {:?}.", table, node);
                    contents.children.push(TableChild::Other(node));
                },
                ElementTag::Cell => {
                    debug!("Cell {:?} is not inside a row; it takes no part in the grid.", node);
                    contents.children.push(TableChild::Other(node));
                },
                ElementTag::Table | ElementTag::Other => {
                    contents.children.push(TableChild::Other(node))
                },
            }
        }
        contents
    }

    pub(crate) fn row(&self, node: OpaqueNode) -> TableRow {
        let cells = self
            .document
            .children(node)
            .into_iter()
            .filter_map(|(child, tag)| match tag {
                ElementTag::Cell => Some(TableCell::new(child, self.cell_style(child))),
                _ => {
                    debug!("Ignoring non-cell {:?} inside row {:?}.", child, node);
                    None
                },
            })
            .collect();
        let mut row = TableRow::new(node, cells);
        row.height = self.row_height(node);
        row
    }

    pub(crate) fn row_height(&self, node: OpaqueNode) -> Option<LengthPercentage> {
        self.document
            .attribute(node, AttributeKey::Height)
            .and_then(AttributeValue::to_length)
            .map(LengthPercentage::Length)
    }

    pub(crate) fn caption(&self, node: OpaqueNode) -> TableCaption {
        let side = match self.document.attribute(node, AttributeKey::CaptionSide) {
            Some(AttributeValue::CaptionSide(side)) => side,
            _ => CaptionSide::default(),
        };
        TableCaption { node, side }
    }

    pub(crate) fn cell_style(&self, node: OpaqueNode) -> CellStyle {
        let vertical_align = match self.document.attribute(node, AttributeKey::VerticalAlign) {
            Some(AttributeValue::Fraction(fraction)) => Some(fraction.clamp(0., 1.)),
            _ => None,
        };
        CellStyle {
            column_span: self.span(node, AttributeKey::ColumnSpan),
            row_span: self.span(node, AttributeKey::RowSpan),
            width: self
                .document
                .attribute(node, AttributeKey::Width)
                .and_then(AttributeValue::to_length_percentage),
            // Percentage heights have nothing to resolve against.
            height: self
                .document
                .attribute(node, AttributeKey::Height)
                .and_then(AttributeValue::to_length)
                .map(LengthPercentage::Length),
            vertical_align,
        }
    }

    fn span(&self, node: OpaqueNode, key: AttributeKey) -> usize {
        match self.document.attribute(node, key) {
            None => 1,
            Some(AttributeValue::Integer(span)) if span >= 1 => span as usize,
            Some(value) => {
                debug!("Malformed {:?} {:?} on {:?}; using 1.", key, value, node);
                1
            },
        }
    }

    pub(crate) fn table_style(&self, node: OpaqueNode) -> TableStyle {
        TableStyle {
            border_width: self
                .document
                .attribute(node, AttributeKey::Border)
                .and_then(AttributeValue::to_length),
            cell_spacing: self
                .document
                .attribute(node, AttributeKey::CellSpacing)
                .and_then(AttributeValue::to_length),
            width: self
                .document
                .attribute(node, AttributeKey::Width)
                .and_then(AttributeValue::to_length_percentage),
        }
    }
}
