/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Already-resolved attribute values that table layout consumes. Parsing and cascading
//! happen elsewhere; these types only carry the results.

use app_units::Au;
use serde::Serialize;

/// A percentage stored as a fraction, so `Percentage(0.5)` is 50%.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize)]
pub struct Percentage(pub f32);

impl Percentage {
    pub fn is_zero(&self) -> bool {
        self.0 == 0.
    }

    pub fn clamp_to_non_negative(self) -> Self {
        Percentage(self.0.max(0.))
    }
}

/// A length request on a cell, row or table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum LengthPercentage {
    Length(Au),
    Percentage(Percentage),
}

impl LengthPercentage {
    pub fn to_length(&self) -> Option<Au> {
        match *self {
            LengthPercentage::Length(length) => Some(length),
            LengthPercentage::Percentage(_) => None,
        }
    }

    pub fn to_percentage(&self) -> Option<Percentage> {
        match *self {
            LengthPercentage::Length(_) => None,
            LengthPercentage::Percentage(percentage) => Some(percentage),
        }
    }
}

/// Which side of the grid a caption is placed on.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub enum CaptionSide {
    #[default]
    Top,
    Bottom,
}

/// The attributes of a table cell that matter to layout.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CellStyle {
    /// Number of columns the cell covers, at least one.
    pub column_span: usize,
    /// Number of rows the cell covers, at least one.
    pub row_span: usize,
    pub width: Option<LengthPercentage>,
    pub height: Option<LengthPercentage>,
    /// Where the content sits inside the cell along the block axis, `0.` being the top and
    /// `1.` the bottom.
    pub vertical_align: Option<f32>,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            column_span: 1,
            row_span: 1,
            width: None,
            height: None,
            vertical_align: None,
        }
    }
}

impl CellStyle {
    pub fn with_spans(column_span: usize, row_span: usize) -> Self {
        Self {
            column_span: column_span.max(1),
            row_span: row_span.max(1),
            ..Default::default()
        }
    }

    /// The cell has a percentage width request.
    pub fn has_percentage_width(&self) -> bool {
        self.width
            .is_some_and(|width| width.to_percentage().is_some_and(|p| !p.is_zero()))
    }
}

/// The attributes of the table element itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TableStyle {
    /// Width of the border drawn around the grid, taken once on each side of both axes.
    pub border_width: Option<Au>,
    /// Space between adjacent cells and between the outer cells and the border.
    pub cell_spacing: Option<Au>,
    /// An explicit width request for the whole table.
    pub width: Option<LengthPercentage>,
}
