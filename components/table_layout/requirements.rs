/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Per-column and per-row size requirements.
//!
//! Columns are measured in two passes. The first looks only at cells that occupy a single
//! column. The second walks the cells that span several columns and, when the columns they
//! cover cannot hold them, enlarges those columns by tiling the cell's size across them.
//! Rows are rigid: every row is exactly as tall as its tallest single-row cell, plus whatever
//! row-spanning cells need on top of that.

use app_units::{Au, MAX_AU};
use log::trace;
use serde::Serialize;

use crate::boxes::{TableChild, rows, rows_mut};
use crate::context::IntrinsicSizes;
use crate::geom::{Axis, saturating_sub, saturating_sum};
use crate::grid::TableGrid;
use crate::rowspan::{RowSpanningCell, multi_row_adjustments};
use crate::style::{LengthPercentage, Percentage};
use crate::tiling::{TilingSpacing, tile};

/// What a slot, a cell or a whole table needs along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SizeRequirement {
    pub minimum: Au,
    pub preferred: Au,
    /// `MAX_AU` when unbounded.
    pub maximum: Au,
    /// Where content sits inside the slot, `0.` being the start and `1.` the end.
    pub alignment: Option<f32>,
    /// Relative share of surplus space this slot takes when tiled. Zero means the slot only
    /// grows once no other slot can.
    pub weight: u32,
}

impl Default for SizeRequirement {
    fn default() -> Self {
        Self::zero()
    }
}

impl SizeRequirement {
    pub fn zero() -> Self {
        Self::rigid(Au(0))
    }

    /// A requirement with the given values, normalized so that
    /// `minimum <= preferred <= maximum`.
    pub fn new(minimum: Au, preferred: Au, maximum: Au) -> Self {
        let minimum = minimum.max(Au(0));
        let preferred = preferred.max(minimum);
        Self {
            minimum,
            preferred,
            maximum: maximum.max(preferred),
            alignment: None,
            weight: 1,
        }
    }

    pub fn rigid(size: Au) -> Self {
        Self::new(size, size, size)
    }

    pub fn with_weight(self, weight: u32) -> Self {
        Self { weight, ..self }
    }

    pub fn with_alignment(self, alignment: Option<f32>) -> Self {
        Self {
            alignment: alignment.map(|alignment| alignment.clamp(0., 1.)),
            ..self
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.maximum == MAX_AU
    }

    /// Grow this requirement so that it also satisfies `other`.
    pub fn max_assign(&mut self, other: &SizeRequirement) {
        self.minimum.max_assign(other.minimum);
        self.preferred.max_assign(other.preferred);
        self.maximum.max_assign(other.maximum);
        self.normalize();
    }

    fn normalize(&mut self) {
        self.preferred.max_assign(self.minimum);
        self.maximum.max_assign(self.preferred);
    }
}

/// Measure every cell of the table along `axis` and store the result on the cell.
pub(crate) fn measure_cells(children: &mut [TableChild], axis: Axis, sizes: &dyn IntrinsicSizes) {
    for row in rows_mut(children) {
        for cell in row.cells.iter_mut() {
            let minimum = sizes.minimum_span(cell.node, axis);
            let request = match axis {
                Axis::Inline => cell.style.width,
                Axis::Block => cell.style.height,
            };
            let mut measure = match request.as_ref().and_then(LengthPercentage::to_length) {
                Some(length) => SizeRequirement::rigid(length.max(minimum)),
                None => SizeRequirement::new(
                    minimum,
                    sizes.preferred_span(cell.node, axis),
                    sizes.maximum_span(cell.node, axis),
                ),
            };
            if axis == Axis::Block {
                measure = measure.with_alignment(cell.style.vertical_align);
            }
            *cell.measures.get_mut(axis) = measure;
        }
    }
}

/// A cell that covers several columns, as seen by the second column pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpanningContribution {
    pub first: usize,
    pub count: usize,
    pub requirement: SizeRequirement,
}

/// The column requirements before percentages are resolved against a target span.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ColumnRequirements {
    pub requirements: Vec<SizeRequirement>,
    /// The largest percentage of the table width any cell asks of each column.
    pub percentages: Vec<Percentage>,
}

impl ColumnRequirements {
    /// The requirements with percentage requests resolved against `target_span`, the span the
    /// columns are tiled into. A percentage replaces the preferred size but never goes below
    /// the minimum.
    pub fn resolve(&self, target_span: Au) -> Vec<SizeRequirement> {
        self.requirements
            .iter()
            .zip(self.percentages.iter())
            .map(|(requirement, percentage)| {
                if percentage.is_zero() {
                    return *requirement;
                }
                let mut resolved = *requirement;
                resolved.preferred = target_span.scale_by(percentage.0).max(requirement.minimum);
                resolved.normalize();
                resolved
            })
            .collect()
    }

    pub fn has_percentages(&self) -> bool {
        self.percentages.iter().any(|percentage| !percentage.is_zero())
    }
}

/// Compute the requirements of every column from the inline measures of the cells.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(name = "compute_column_requirements", skip_all, level = "trace")
)]
pub fn compute_column_requirements(
    children: &[TableChild],
    grid: &TableGrid,
    spacing: &TilingSpacing,
    percentage_widths: bool,
) -> ColumnRequirements {
    let column_count = grid.column_count;
    let mut requirements = vec![SizeRequirement::zero(); column_count];
    let mut has_single_span_cell = vec![false; column_count];
    let mut percentages = vec![Percentage::default(); column_count];
    let mut spanning = Vec::new();

    for cell in rows(children).flat_map(|row| row.cells.iter()) {
        let first = cell.grid_column;
        let count = cell.column_span();
        if first + count > column_count {
            continue;
        }
        let measure = cell.measures.inline;

        let fixed = cell.style.width.is_some_and(|width| width.to_length().is_some());
        let percentage = cell
            .style
            .width
            .and_then(|width| width.to_percentage())
            .filter(|percentage| percentage_widths && !percentage.is_zero())
            .map(|percentage| Percentage(percentage.clamp_to_non_negative().0 / count as f32));

        for column in first..first + count {
            if fixed || percentage.is_some() {
                requirements[column].weight = 0;
            }
            if let Some(percentage) = percentage {
                if percentage > percentages[column] {
                    percentages[column] = percentage;
                }
            }
        }

        if count == 1 {
            let column = &mut requirements[first];
            column.minimum.max_assign(measure.minimum);
            column.preferred.max_assign(measure.preferred);
            column.maximum.max_assign(measure.maximum);
            has_single_span_cell[first] = true;
        } else {
            spanning.push(SpanningContribution {
                first,
                count,
                requirement: measure,
            });
        }
    }

    for (column, has_single_span_cell) in requirements.iter_mut().zip(has_single_span_cell) {
        if !has_single_span_cell {
            column.maximum = MAX_AU;
        }
        column.normalize();
    }

    if grid.has_multi_column_cells {
        enlarge_for_spanning_cells(&mut requirements, &spanning, spacing);
    }

    trace!("Column requirements: {:?}", requirements);
    ColumnRequirements {
        requirements,
        percentages,
    }
}

/// The second column pass. Every spanning cell whose minimum or preferred size does not fit
/// the columns it covers is tiled across them, and each column is raised to its share.
pub fn enlarge_for_spanning_cells(
    columns: &mut [SizeRequirement],
    spanning: &[SpanningContribution],
    spacing: &TilingSpacing,
) {
    for contribution in spanning {
        let range = contribution.first..contribution.first + contribution.count;
        let Some(covered) = columns.get(range.clone()) else {
            continue;
        };
        let spanned_spacing = spacing.spanned(contribution.count);

        let needed_minimum = saturating_sub(contribution.requirement.minimum, spanned_spacing);
        if needed_minimum > saturating_sum(covered.iter().map(|column| column.minimum)) {
            let shares = distribute_across(covered, needed_minimum);
            for (column, share) in columns[range.clone()].iter_mut().zip(shares) {
                column.minimum.max_assign(share);
                column.normalize();
            }
        }

        let covered = &columns[range.clone()];
        let needed_preferred = saturating_sub(contribution.requirement.preferred, spanned_spacing);
        if needed_preferred > saturating_sum(covered.iter().map(|column| column.preferred)) {
            let shares = distribute_across(covered, needed_preferred);
            for (column, share) in columns[range].iter_mut().zip(shares) {
                column.preferred.max_assign(share);
                column.normalize();
            }
        }
    }
}

/// Tile `span` across `columns`, weighting each column by its current preferred size.
fn distribute_across(columns: &[SizeRequirement], span: Au) -> Vec<Au> {
    let weighted: Vec<SizeRequirement> = columns
        .iter()
        .map(|column| column.with_weight(column.preferred.0.max(0) as u32))
        .collect();
    tile(&weighted, &TilingSpacing::default(), span).spans
}

/// Compute the requirements of every row from the block measures of the cells.
///
/// Rows are rigid. Cells that span several rows are accounted for through
/// [`multi_row_adjustments`] before anything is tiled.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(name = "compute_row_requirements", skip_all, level = "trace")
)]
pub fn compute_row_requirements(
    children: &[TableChild],
    grid: &TableGrid,
    spacing: &TilingSpacing,
) -> Vec<SizeRequirement> {
    let mut base = vec![Au(0); grid.row_count];
    let mut spanning = Vec::new();

    for (row_index, row) in rows(children).enumerate() {
        if let Some(height) = row.height.as_ref().and_then(LengthPercentage::to_length) {
            base[row_index].max_assign(height);
        }
        for cell in row.cells.iter() {
            let preferred = cell.measures.block.preferred;
            if cell.grid_row_span <= 1 {
                base[row_index].max_assign(preferred);
            } else {
                spanning.push(RowSpanningCell {
                    first_row: row_index,
                    row_span: cell.grid_row_span,
                    preferred,
                });
            }
        }
    }

    let adjustments = if grid.has_multi_row_cells {
        multi_row_adjustments(&base, &spanning, spacing.between())
    } else {
        vec![Au(0); base.len()]
    };

    let requirements: Vec<SizeRequirement> = base
        .iter()
        .zip(adjustments)
        .map(|(base, adjustment)| SizeRequirement::rigid(*base + adjustment))
        .collect();
    trace!("Row requirements: {:?}", requirements);
    requirements
}

#[cfg(test)]
mod tests {
    use quickcheck::{Arbitrary, Gen, TestResult, quickcheck};

    use super::*;
    use crate::boxes::{TableCell, TableRow};
    use crate::context::OpaqueNode;
    use crate::style::CellStyle;

    fn px(value: i32) -> Au {
        Au::from_px(value)
    }

    fn cell(
        columns: usize,
        rows: usize,
        inline: SizeRequirement,
        block: SizeRequirement,
    ) -> TableCell {
        let mut cell = TableCell::new(OpaqueNode(0), CellStyle::with_spans(columns, rows));
        cell.measures.inline = inline;
        cell.measures.block = block;
        cell
    }

    /// A cell that only matters along the inline axis.
    fn inline_cell(columns: usize, inline: SizeRequirement) -> TableCell {
        cell(columns, 1, inline, SizeRequirement::zero())
    }

    /// A cell that only matters along the block axis.
    fn block_cell(rows: usize, block: SizeRequirement) -> TableCell {
        cell(1, rows, SizeRequirement::zero(), block)
    }

    fn table(rows: Vec<Vec<TableCell>>) -> (Vec<TableChild>, TableGrid) {
        let mut children: Vec<TableChild> = rows
            .into_iter()
            .enumerate()
            .map(|(index, cells)| TableChild::Row(TableRow::new(OpaqueNode(index), cells)))
            .collect();
        let grid = TableGrid::rebuild(&mut children);
        (children, grid)
    }

    fn columns_of(children: &[TableChild], grid: &TableGrid) -> ColumnRequirements {
        compute_column_requirements(children, grid, &TilingSpacing::default(), true)
    }

    fn rows_of(children: &[TableChild], grid: &TableGrid) -> Vec<SizeRequirement> {
        compute_row_requirements(children, grid, &TilingSpacing::default())
    }

    #[test]
    fn normalization_orders_the_triple() {
        let requirement = SizeRequirement::new(px(20), px(10), px(5));
        assert_eq!(requirement.minimum, px(20));
        assert_eq!(requirement.preferred, px(20));
        assert_eq!(requirement.maximum, px(20));
        assert!(!requirement.is_unbounded());
        assert!(SizeRequirement::new(Au(0), Au(0), MAX_AU).is_unbounded());
    }

    #[test]
    fn single_span_cells_take_the_column_maximum() {
        let (children, grid) = table(vec![
            vec![
                inline_cell(1, SizeRequirement::new(px(10), px(20), px(30))),
                inline_cell(1, SizeRequirement::new(px(5), px(5), px(5))),
            ],
            vec![inline_cell(1, SizeRequirement::new(px(15), px(15), px(15)))],
        ]);
        let columns = columns_of(&children, &grid);
        let first = columns.requirements[0];
        assert_eq!((first.minimum, first.preferred, first.maximum), (px(15), px(20), px(30)));
        assert_eq!(columns.requirements[1].maximum, px(5));
    }

    #[test]
    fn column_without_single_span_cell_is_unbounded() {
        let (children, grid) = table(vec![vec![inline_cell(
            2,
            SizeRequirement::new(px(10), px(10), px(10)),
        )]]);
        let columns = columns_of(&children, &grid);
        assert!(columns.requirements.iter().all(SizeRequirement::is_unbounded));
        assert_eq!(columns.requirements[0].minimum, px(5));
        assert_eq!(columns.requirements[1].minimum, px(5));
    }

    #[test]
    fn spanning_cell_raises_both_columns_evenly() {
        let ten = SizeRequirement::new(px(10), px(10), MAX_AU);
        let (children, grid) = table(vec![
            vec![inline_cell(1, ten), inline_cell(1, ten)],
            vec![inline_cell(2, SizeRequirement::rigid(px(50)))],
        ]);
        let columns = columns_of(&children, &grid);
        assert_eq!(columns.requirements[0].minimum, px(25));
        assert_eq!(columns.requirements[1].minimum, px(25));
        assert_eq!(columns.requirements[0].preferred, px(25));
    }

    #[test]
    fn spanning_cell_shares_follow_preferred_sizes() {
        let mut columns = vec![
            SizeRequirement::new(px(10), px(30), MAX_AU),
            SizeRequirement::new(px(10), px(10), MAX_AU),
        ];
        let contribution = SpanningContribution {
            first: 0,
            count: 2,
            requirement: SizeRequirement::new(px(20), px(80), MAX_AU),
        };
        enlarge_for_spanning_cells(&mut columns, &[contribution], &TilingSpacing::default());
        // Minimum already fits; the preferred surplus of 40 goes 3:1.
        assert_eq!(columns[0].minimum, px(10));
        assert_eq!(columns[0].preferred, px(60));
        assert_eq!(columns[1].preferred, px(20));
    }

    #[test]
    fn spanning_cell_subtracts_covered_spacing() {
        let mut columns = vec![SizeRequirement::zero(), SizeRequirement::zero()];
        let contribution = SpanningContribution {
            first: 0,
            count: 2,
            requirement: SizeRequirement::rigid(px(12)),
        };
        let spacing = TilingSpacing::uniform(px(2), Au(0));
        enlarge_for_spanning_cells(&mut columns, &[contribution], &spacing);
        assert_eq!(columns[0].minimum + columns[1].minimum, px(10));
    }

    #[test]
    fn fixed_and_percentage_columns_do_not_take_surplus() {
        let flexible = SizeRequirement::new(px(10), px(10), MAX_AU);
        let mut fixed = inline_cell(1, SizeRequirement::rigid(px(40)));
        fixed.style.width = Some(LengthPercentage::Length(px(40)));
        let mut percent = inline_cell(1, flexible);
        percent.style.width = Some(LengthPercentage::Percentage(Percentage(0.5)));
        let auto = inline_cell(1, flexible);
        let (children, grid) = table(vec![vec![fixed, percent, auto]]);

        let columns = columns_of(&children, &grid);
        let weights: Vec<u32> = columns
            .requirements
            .iter()
            .map(|column| column.weight)
            .collect();
        assert_eq!(weights, vec![0, 0, 1]);
        assert_eq!(columns.percentages[1], Percentage(0.5));

        let resolved = columns.resolve(px(200));
        assert_eq!(resolved[1].preferred, px(100));
        assert_eq!(resolved[0], columns.requirements[0]);

        let ignored =
            compute_column_requirements(&children, &grid, &TilingSpacing::default(), false);
        assert!(!ignored.has_percentages());
        assert_eq!(ignored.requirements[1].weight, 1);
    }

    #[test]
    fn percentage_never_resolves_below_minimum() {
        let columns = ColumnRequirements {
            requirements: vec![SizeRequirement::new(px(50), px(50), MAX_AU)],
            percentages: vec![Percentage(0.1)],
        };
        assert_eq!(columns.resolve(px(100))[0].preferred, px(50));
    }

    #[test]
    fn percentage_of_spanning_cell_is_split() {
        let mut wide = inline_cell(2, SizeRequirement::zero());
        wide.style.width = Some(LengthPercentage::Percentage(Percentage(0.5)));
        let (children, grid) = table(vec![vec![wide]]);
        let columns = columns_of(&children, &grid);
        assert_eq!(columns.percentages, vec![Percentage(0.25), Percentage(0.25)]);
    }

    #[test]
    fn rows_are_rigid_and_take_tallest_cell() {
        let (children, grid) = table(vec![
            vec![
                block_cell(1, SizeRequirement::new(px(5), px(20), MAX_AU)),
                block_cell(1, SizeRequirement::new(px(5), px(30), MAX_AU)),
            ],
            vec![],
        ]);
        let rows = rows_of(&children, &grid);
        assert_eq!(rows, vec![SizeRequirement::rigid(px(30)), SizeRequirement::zero()]);
    }

    #[test]
    fn explicit_row_height_is_a_floor() {
        let (mut children, grid) = table(vec![vec![block_cell(1, SizeRequirement::rigid(px(10)))]]);
        if let Some(row) = children[0].as_row_mut() {
            row.height = Some(LengthPercentage::Length(px(25)));
        }
        let rows = rows_of(&children, &grid);
        assert_eq!(rows[0].preferred, px(25));
    }

    #[test]
    fn row_spanning_cell_enlarges_rows_before_tiling() {
        let twenty = SizeRequirement::rigid(px(20));
        let (children, grid) = table(vec![
            vec![block_cell(3, SizeRequirement::rigid(px(90))), block_cell(1, twenty)],
            vec![block_cell(1, twenty)],
            vec![block_cell(1, twenty)],
        ]);
        let rows = rows_of(&children, &grid);
        assert!(rows.iter().all(|row| *row == SizeRequirement::rigid(px(30))));
    }

    #[test]
    fn row_spanning_cell_counts_spacing_between_its_rows() {
        let (children, grid) = table(vec![
            vec![block_cell(2, SizeRequirement::rigid(px(44)))],
            vec![block_cell(1, SizeRequirement::rigid(px(10)))],
        ]);
        let spacing = TilingSpacing::uniform(px(4), px(1));
        let rows = compute_row_requirements(&children, &grid, &spacing);
        // 44 less one spacing of 4 leaves 40; the rows start at 0 and 10.
        assert_eq!(rows[0].preferred, px(15));
        assert_eq!(rows[1].preferred, px(25));
    }

    #[derive(Clone, Debug)]
    struct SpanningCase {
        columns: Vec<SizeRequirement>,
        spanning: Vec<SpanningContribution>,
    }

    impl Arbitrary for SpanningCase {
        fn arbitrary(g: &mut Gen) -> Self {
            let column_count = usize::arbitrary(g) % 6 + 2;
            let columns = (0..column_count)
                .map(|_| {
                    let minimum = Au(i32::from(u16::arbitrary(g)));
                    let preferred = minimum + Au(i32::from(u16::arbitrary(g)));
                    SizeRequirement::new(minimum, preferred, MAX_AU)
                })
                .collect();
            let spanning = (0..usize::arbitrary(g) % 4)
                .map(|_| {
                    let first = usize::arbitrary(g) % (column_count - 1);
                    let count = usize::arbitrary(g) % (column_count - first - 1) + 2;
                    let minimum = Au(i32::from(u16::arbitrary(g)) * 4);
                    let preferred = minimum + Au(i32::from(u16::arbitrary(g)) * 4);
                    SpanningContribution {
                        first,
                        count,
                        requirement: SizeRequirement::new(minimum, preferred, MAX_AU),
                    }
                })
                .collect();
            SpanningCase { columns, spanning }
        }
    }

    #[test]
    fn spanning_cells_only_enlarge_columns() {
        fn property(case: SpanningCase) -> TestResult {
            let before = case.columns.clone();
            let mut after = case.columns;
            let spacing = TilingSpacing::uniform(Au(60), Au(0));
            enlarge_for_spanning_cells(&mut after, &case.spanning, &spacing);
            let enlarged_only = before.iter().zip(after.iter()).all(|(before, after)| {
                after.minimum >= before.minimum &&
                    after.preferred >= before.preferred &&
                    after.maximum >= before.maximum &&
                    after.minimum <= after.preferred &&
                    after.preferred <= after.maximum
            });
            TestResult::from_bool(enlarged_only)
        }
        quickcheck(property as fn(SpanningCase) -> TestResult);
    }

    #[test]
    fn spanning_cells_fit_after_enlargement() {
        fn property(case: SpanningCase) -> TestResult {
            let mut columns = case.columns;
            enlarge_for_spanning_cells(&mut columns, &case.spanning, &TilingSpacing::default());
            // Later cells only raise columns, so every cell still fits at the end.
            let fits = case.spanning.iter().all(|contribution| {
                let covered = &columns[contribution.first..contribution.first + contribution.count];
                saturating_sum(covered.iter().map(|column| column.minimum)) >=
                    contribution.requirement.minimum &&
                    saturating_sum(covered.iter().map(|column| column.preferred)) >=
                        contribution.requirement.preferred
            });
            TestResult::from_bool(fits)
        }
        quickcheck(property as fn(SpanningCase) -> TestResult);
    }
}
