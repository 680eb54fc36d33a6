/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Extra block size handed to rows so that cells spanning several of them fit.

use app_units::Au;
use log::trace;

use crate::geom::{saturating_sub, saturating_sum};

/// A cell whose row span is larger than one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowSpanningCell {
    pub first_row: usize,
    pub row_span: usize,
    /// The preferred block size of the cell's content.
    pub preferred: Au,
}

/// Compute how much every row has to grow beyond `base_preferred` so that each spanning cell
/// fits into the rows it covers, with `between_spacing` separating adjacent rows.
///
/// The shortfall of a cell is split evenly over its rows and the remainder of the division goes
/// to its first row. Each cell is measured against the base sizes alone, and the adjustments of
/// different cells are combined by taking the larger one per row.
pub fn multi_row_adjustments(
    base_preferred: &[Au],
    cells: &[RowSpanningCell],
    between_spacing: Au,
) -> Vec<Au> {
    let row_count = base_preferred.len();
    let mut adjustments = vec![Au(0); row_count];

    for cell in cells {
        if cell.first_row >= row_count {
            continue;
        }
        let row_span = cell.row_span.clamp(1, row_count - cell.first_row);
        let rows = cell.first_row..cell.first_row + row_span;

        let covered_spacing = between_spacing * (row_span as i32 - 1);
        let needed = saturating_sub(cell.preferred, covered_spacing);
        let available = saturating_sum(base_preferred[rows.clone()].iter().copied());
        if needed <= available {
            continue;
        }

        let deficit = needed - available;
        let per_row = deficit / row_span as i32;
        let first = per_row + (deficit - per_row * row_span as i32);
        trace!(
            "Rows {:?} are {:?} short for a spanning cell; adding {:?} to each ({:?} to the first)",
            rows, deficit, per_row, first
        );

        adjustments[cell.first_row].max_assign(first);
        for adjustment in &mut adjustments[cell.first_row + 1..rows.end] {
            adjustment.max_assign(per_row);
        }
    }
    adjustments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(value: i32) -> Au {
        Au::from_px(value)
    }

    #[test]
    fn even_shortfall_is_split_evenly() {
        let cells = [RowSpanningCell {
            first_row: 0,
            row_span: 3,
            preferred: px(90),
        }];
        let adjustments = multi_row_adjustments(&[px(20), px(20), px(20)], &cells, Au(0));
        assert_eq!(adjustments, vec![px(10), px(10), px(10)]);
    }

    #[test]
    fn remainder_goes_to_the_first_row() {
        let cells = [RowSpanningCell {
            first_row: 0,
            row_span: 3,
            preferred: Au(100),
        }];
        let adjustments = multi_row_adjustments(&[Au(0), Au(0), Au(0)], &cells, Au(0));
        assert_eq!(adjustments, vec![Au(34), Au(33), Au(33)]);
    }

    #[test]
    fn fitting_cell_needs_nothing() {
        let cells = [RowSpanningCell {
            first_row: 1,
            row_span: 2,
            preferred: px(30),
        }];
        let adjustments = multi_row_adjustments(&[px(5), px(20), px(20)], &cells, Au(0));
        assert_eq!(adjustments, vec![Au(0); 3]);
    }

    #[test]
    fn spacing_between_rows_counts_toward_the_cell() {
        let cells = [RowSpanningCell {
            first_row: 0,
            row_span: 2,
            preferred: px(44),
        }];
        let adjustments = multi_row_adjustments(&[px(10), px(10)], &cells, px(4));
        assert_eq!(adjustments, vec![px(10), px(10)]);
    }

    #[test]
    fn overlapping_cells_combine_by_maximum() {
        let cells = [
            RowSpanningCell {
                first_row: 0,
                row_span: 2,
                preferred: px(40),
            },
            RowSpanningCell {
                first_row: 1,
                row_span: 2,
                preferred: px(60),
            },
        ];
        let adjustments = multi_row_adjustments(&[px(10), px(10), px(10)], &cells, Au(0));
        assert_eq!(adjustments, vec![px(10), px(20), px(20)]);
    }

    #[test]
    fn spans_past_the_last_row_are_clamped() {
        let cells = [
            RowSpanningCell {
                first_row: 1,
                row_span: 10,
                preferred: px(30),
            },
            RowSpanningCell {
                first_row: 5,
                row_span: 2,
                preferred: px(30),
            },
        ];
        let adjustments = multi_row_adjustments(&[px(10), px(10)], &cells, Au(0));
        assert_eq!(adjustments, vec![Au(0), px(20)]);
    }
}
