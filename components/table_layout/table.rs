/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The [`Table`] owns its box tree together with everything computed from it and drives the
//! layout passes.
//!
//! Every public operation first applies the damage recorded since the previous one and then
//! brings the axes it needs up to date. A target span passed to [`Table::layout`] is the span
//! of the grid area: the box of the table less its insets, where the insets include the caption.
//! All offsets handed out are relative to the start of that area.

use app_units::Au;
use log::{debug, warn};
use serde::Serialize;

use crate::boxes::{TableCaption, TableCell, TableChild, TableRow, rows};
use crate::caption::{CaptionPlacement, caption_inset, place_caption};
use crate::construct::{StructuralChange, TableBuilder, TableDocument};
use crate::context::{LayoutContext, OpaqueNode};
use crate::error::{LayoutError, Result};
use crate::geom::{Allocation, Axis, PerAxis, Sides, TableSlotCoordinates, saturating_add};
use crate::grid::{TableGrid, resolve_origin};
use crate::invalidation::{GridInvalidationCache, LayoutState, TableDamage};
use crate::options::TableLayoutOptions;
use crate::requirements::{
    ColumnRequirements, SizeRequirement, compute_column_requirements, compute_row_requirements,
    measure_cells,
};
use crate::style::{CellStyle, TableStyle};
use crate::tiling::{TiledLayout, TilingSpacing, tile, tiled_requirements};

/// The cell content is centered along the block axis unless it asks otherwise.
const DEFAULT_VERTICAL_ALIGN: f32 = 0.5;

/// A table: a grid of rows and cells plus an optional caption.
#[derive(Debug)]
pub struct Table {
    node: OpaqueNode,
    style: TableStyle,
    children: Vec<TableChild>,
    /// Row groups whose rows were flattened into `children`.
    row_groups: Vec<OpaqueNode>,
    options: TableLayoutOptions,

    grid: TableGrid,
    columns: ColumnRequirements,
    rows: Vec<SizeRequirement>,
    column_layout: TiledLayout,
    row_layout: TiledLayout,
    caption: Option<CaptionPlacement>,
    /// The insets of the table box without the caption, as of the last pass.
    box_insets: Sides<Au>,

    cache: GridInvalidationCache,
}

/// A dump of everything the last layout passes computed.
#[derive(Clone, Debug, Serialize)]
pub struct TableLayoutSnapshot {
    pub generation: u64,
    pub grid: TableGrid,
    pub states: PerAxis<LayoutState>,
    pub targets: PerAxis<Option<Au>>,
    pub columns: ColumnRequirements,
    pub rows: Vec<SizeRequirement>,
    pub column_layout: TiledLayout,
    pub row_layout: TiledLayout,
    pub caption: Option<CaptionPlacement>,
}

/// The part of a table a document node corresponds to.
#[derive(Clone, Copy, Debug, PartialEq)]
enum TablePart {
    Table,
    RowGroup,
    Row { view_index: usize },
    Cell { view_index: usize, cell_index: usize },
    Caption { view_index: usize },
    Other,
}

impl Table {
    pub fn new(
        node: OpaqueNode,
        style: TableStyle,
        children: Vec<TableChild>,
        options: TableLayoutOptions,
    ) -> Self {
        Self {
            node,
            style,
            children,
            row_groups: Vec::new(),
            grid: TableGrid::default(),
            columns: ColumnRequirements::default(),
            rows: Vec::new(),
            column_layout: TiledLayout::default(),
            row_layout: TiledLayout::default(),
            caption: None,
            box_insets: Sides::zero(),
            cache: GridInvalidationCache::new(options.nonincremental_layout),
            options,
        }
    }

    pub fn node(&self) -> OpaqueNode {
        self.node
    }

    pub fn style(&self) -> &TableStyle {
        &self.style
    }

    pub fn children(&self) -> &[TableChild] {
        &self.children
    }

    pub fn options(&self) -> &TableLayoutOptions {
        &self.options
    }

    /// The grid as of the last time it was built.
    pub fn grid(&self) -> &TableGrid {
        &self.grid
    }

    pub fn state(&self, axis: Axis) -> LayoutState {
        self.cache.state(axis)
    }

    /// Bumped on every structural change of the table.
    pub fn generation(&self) -> u64 {
        self.cache.generation()
    }

    pub fn pending_damage(&self) -> TableDamage {
        self.cache.pending_damage()
    }

    pub(crate) fn set_row_groups(&mut self, row_groups: Vec<OpaqueNode>) {
        self.row_groups = row_groups;
    }

    fn spacing(&self) -> TilingSpacing {
        TilingSpacing::uniform(
            self.style
                .cell_spacing
                .unwrap_or_else(|| self.options.default_cell_spacing()),
            self.style
                .border_width
                .unwrap_or_else(|| self.options.default_border_width()),
        )
    }

    /// The caption that is placed. Any further caption is ignored.
    fn honoured_caption(&self) -> Option<&TableCaption> {
        self.children.iter().find_map(|child| match child {
            TableChild::Caption(caption) => Some(caption),
            _ => None,
        })
    }

    /// Record damage for the next pass to act on.
    pub fn note_damage(&mut self, damage: TableDamage) {
        self.cache.note_damage(damage);
    }

    /// The content of some cell was laid out again.
    pub fn content_reflowed(&mut self) {
        self.note_damage(TableDamage::content_reflow());
    }

    pub fn set_style(&mut self, style: TableStyle) {
        if style != self.style {
            self.style = style;
            self.note_damage(TableDamage::RECOMPUTE_COLUMNS | TableDamage::RECOMPUTE_ROWS);
        }
    }

    pub fn insert_child(&mut self, index: usize, child: TableChild) {
        let index = index.min(self.children.len());
        self.children.insert(index, child);
        self.note_damage(TableDamage::REBUILD_GRID);
    }

    pub fn remove_child(&mut self, index: usize) -> Option<TableChild> {
        if index >= self.children.len() {
            return None;
        }
        self.note_damage(TableDamage::REBUILD_GRID);
        Some(self.children.remove(index))
    }

    pub fn push_row(&mut self, row: TableRow) {
        self.insert_child(self.children.len(), TableChild::Row(row));
    }

    /// Remove the row at `row_index` among the rows of the table.
    pub fn remove_row(&mut self, row_index: usize) -> Option<TableRow> {
        let view_index = self.view_index_of_row(row_index)?;
        match self.remove_child(view_index) {
            Some(TableChild::Row(row)) => Some(row),
            _ => None,
        }
    }

    pub fn insert_cell(&mut self, row_index: usize, cell_index: usize, cell: TableCell) -> bool {
        let Some(row) = self.row_mut(row_index) else {
            return false;
        };
        let cell_index = cell_index.min(row.cells.len());
        row.cells.insert(cell_index, cell);
        self.note_damage(TableDamage::REBUILD_GRID);
        true
    }

    pub fn remove_cell(&mut self, row_index: usize, cell_index: usize) -> Option<TableCell> {
        let row = self.row_mut(row_index)?;
        if cell_index >= row.cells.len() {
            return None;
        }
        let cell = row.cells.remove(cell_index);
        self.note_damage(TableDamage::REBUILD_GRID);
        Some(cell)
    }

    /// Change the style of a cell, recording only the damage the change calls for.
    pub fn set_cell_style(
        &mut self,
        row_index: usize,
        cell_index: usize,
        style: CellStyle,
    ) -> bool {
        let Some(cell) = self
            .row_mut(row_index)
            .and_then(|row| row.cells.get_mut(cell_index))
        else {
            return false;
        };
        let damage = cell_style_damage(&cell.style, &style);
        cell.set_style(style);
        self.note_damage(damage);
        true
    }

    fn view_index_of_row(&self, row_index: usize) -> Option<usize> {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, child)| matches!(child, TableChild::Row(_)))
            .nth(row_index)
            .map(|(view_index, _)| view_index)
    }

    fn row_mut(&mut self, row_index: usize) -> Option<&mut TableRow> {
        self.children
            .iter_mut()
            .filter_map(TableChild::as_row_mut)
            .nth(row_index)
    }

    /// The index among the rows of the table of the row holding the cell of `node`.
    pub fn row_index_of_cell(&self, node: OpaqueNode) -> Option<usize> {
        rows(&self.children).position(|row| row.cells.iter().any(|cell| cell.node == node))
    }

    /// The row and the node of the cell covering `coords`, as of the last time the grid was
    /// built.
    pub fn origin_of(&self, coords: TableSlotCoordinates) -> Option<(usize, OpaqueNode)> {
        resolve_origin(&self.children, coords).map(|(row, cell)| (row, cell.node))
    }

    fn part_of(&self, node: OpaqueNode) -> Option<TablePart> {
        if node == self.node {
            return Some(TablePart::Table);
        }
        if self.row_groups.contains(&node) {
            return Some(TablePart::RowGroup);
        }
        self.children
            .iter()
            .enumerate()
            .find_map(|(view_index, child)| match child {
                TableChild::Row(row) if row.node == node => Some(TablePart::Row { view_index }),
                TableChild::Row(row) => row
                    .cells
                    .iter()
                    .position(|cell| cell.node == node)
                    .map(|cell_index| TablePart::Cell {
                        view_index,
                        cell_index,
                    }),
                TableChild::Caption(caption) if caption.node == node => {
                    Some(TablePart::Caption { view_index })
                },
                TableChild::Other(other) if *other == node => Some(TablePart::Other),
                _ => None,
            })
    }

    /// Find the nearest part of this table that is `node` or one of its ancestors. The flag is
    /// true when the part is `node` itself.
    fn locate(&self, document: &dyn TableDocument, node: OpaqueNode) -> Option<(TablePart, bool)> {
        let mut current = node;
        loop {
            if let Some(part) = self.part_of(current) {
                return Some((part, current == node));
            }
            current = document.parent(current)?;
        }
    }

    /// React to a change in the document. Returns false when the change does not concern this
    /// table.
    pub fn structural_change_notification(
        &mut self,
        document: &dyn TableDocument,
        change: StructuralChange,
    ) -> bool {
        let Some((part, direct)) = self.locate(document, change.node()) else {
            return false;
        };
        let options = self.options.clone();
        let builder = TableBuilder::new(document, &options);

        let damage = match (change, part, direct) {
            (
                StructuralChange::ChildrenChanged(_),
                TablePart::Table | TablePart::RowGroup,
                true,
            ) => {
                let contents = builder.contents(self.node);
                self.children = contents.children;
                self.row_groups = contents.row_groups;
                TableDamage::REBUILD_GRID
            },
            (StructuralChange::ChildrenChanged(node), TablePart::Row { view_index }, true) => {
                self.children[view_index] = TableChild::Row(builder.row(node));
                TableDamage::REBUILD_GRID
            },
            (StructuralChange::AttributesChanged(node), TablePart::Table, true) => {
                self.style = builder.table_style(node);
                TableDamage::RECOMPUTE_COLUMNS | TableDamage::RECOMPUTE_ROWS
            },
            (StructuralChange::AttributesChanged(node), TablePart::Row { view_index }, true) => {
                if let TableChild::Row(row) = &mut self.children[view_index] {
                    row.height = builder.row_height(node);
                }
                TableDamage::RECOMPUTE_ROWS
            },
            (
                StructuralChange::AttributesChanged(node),
                TablePart::Cell {
                    view_index,
                    cell_index,
                },
                true,
            ) => {
                let style = builder.cell_style(node);
                match &mut self.children[view_index] {
                    TableChild::Row(row) => {
                        let cell = &mut row.cells[cell_index];
                        let damage = cell_style_damage(&cell.style, &style);
                        cell.set_style(style);
                        damage
                    },
                    _ => TableDamage::empty(),
                }
            },
            (
                StructuralChange::AttributesChanged(node),
                TablePart::Caption { view_index },
                true,
            ) => {
                self.children[view_index] = TableChild::Caption(builder.caption(node));
                TableDamage::RETILE_COLUMNS | TableDamage::RETILE_ROWS
            },
            (StructuralChange::ContentReflowed(_), TablePart::Caption { .. }, _) => {
                TableDamage::RETILE_COLUMNS | TableDamage::RETILE_ROWS
            },
            (StructuralChange::ContentReflowed(_), TablePart::Other, _) => TableDamage::empty(),
            (StructuralChange::ContentReflowed(_), _, _) => TableDamage::content_reflow(),
            // Anything else that changes inside a cell or the caption changes its content.
            (_, TablePart::Cell { .. } | TablePart::Caption { .. }, _) => {
                TableDamage::RECOMPUTE_COLUMNS | TableDamage::RECOMPUTE_ROWS
            },
            _ => TableDamage::empty(),
        };

        debug!("{:?} on table {:?}: {}", change, self.node, damage);
        self.note_damage(damage);
        true
    }

    /// Run `pass` until it completes without the document changing underneath it.
    fn run_pass<T>(
        &mut self,
        context: &LayoutContext,
        mut pass: impl FnMut(&mut Self, &LayoutContext) -> T,
    ) -> Result<T> {
        let attempts = self.options.layout_attempts();
        for attempt in 1..=attempts {
            match self.attempt_pass(context, &mut pass) {
                Ok(result) => return Ok(result),
                Err(error) => {
                    warn!("{} (attempt {} of {})", error, attempt, attempts);
                    self.cache.discard();
                },
            }
        }
        Err(LayoutError::RetriesExhausted(attempts))
    }

    fn attempt_pass<T>(
        &mut self,
        context: &LayoutContext,
        pass: &mut impl FnMut(&mut Self, &LayoutContext) -> T,
    ) -> Result<T> {
        self.cache.consume_damage();
        let expected = context.document_generation();
        self.box_insets = context.style.box_insets(self.node);
        let result = pass(self, context);
        let found = context.document_generation();
        if found != expected {
            return Err(LayoutError::StaleGrid { expected, found });
        }
        Ok(result)
    }

    fn ensure_grid(&mut self) {
        if self.cache.state(Axis::Inline) != LayoutState::Invalid &&
            self.cache.state(Axis::Block) != LayoutState::Invalid
        {
            return;
        }
        self.grid = TableGrid::rebuild(&mut self.children);
        let captions = self
            .children
            .iter()
            .filter(|child| matches!(child, TableChild::Caption(_)))
            .count();
        if captions > 1 {
            warn!(
                "Table {:?} has {} captions; only the first one is placed.",
                self.node, captions
            );
        }
        // Both axes are derived from the grid, so neither survives a rebuild.
        self.cache.advance(Axis::Inline, LayoutState::GridBuilt);
        self.cache.advance(Axis::Block, LayoutState::GridBuilt);
    }

    fn ensure_requirements(&mut self, context: &LayoutContext, axis: Axis) {
        self.ensure_grid();
        if !self.cache.needs(axis, LayoutState::RequirementsComputed) {
            return;
        }
        measure_cells(&mut self.children, axis, context.sizes);
        let spacing = self.spacing();
        match axis {
            Axis::Inline => {
                self.columns = compute_column_requirements(
                    &self.children,
                    &self.grid,
                    &spacing,
                    self.options.percentage_widths,
                )
            },
            Axis::Block => {
                self.rows = compute_row_requirements(&self.children, &self.grid, &spacing)
            },
        }
        self.cache.advance(axis, LayoutState::RequirementsComputed);
    }

    fn ensure_tiled(&mut self, context: &LayoutContext, axis: Axis) {
        self.ensure_requirements(context, axis);
        if !self.cache.needs(axis, LayoutState::Tiled) {
            return;
        }
        if self.grid.is_degenerate() {
            match axis {
                Axis::Inline => self.column_layout = TiledLayout::default(),
                Axis::Block => self.row_layout = TiledLayout::default(),
            }
            self.cache.advance(axis, LayoutState::Tiled);
            self.update_caption(context);
            return;
        }
        let target = match self.cache.last_target(axis) {
            Some(target) => target,
            None => {
                let target = self.grid_requirement(axis).preferred;
                self.cache.set_target(axis, target);
                target
            },
        };

        let spacing = self.spacing();
        let layout = match axis {
            Axis::Inline => tile(&self.columns.resolve(target), &spacing, target),
            Axis::Block => tile(&self.rows, &spacing, target),
        };
        if layout.overflow > Au(0) {
            debug!(
                "Table {:?} overflows its {:?} target {:?} by {:?}",
                self.node, axis, target, layout.overflow
            );
        }
        match axis {
            Axis::Inline => self.column_layout = layout,
            Axis::Block => self.row_layout = layout,
        }
        self.cache.advance(axis, LayoutState::Tiled);
        self.update_caption(context);
    }

    fn ensure_laid_out(&mut self, context: &LayoutContext) {
        self.ensure_tiled(context, Axis::Inline);
        self.ensure_tiled(context, Axis::Block);
    }

    fn update_caption(&mut self, context: &LayoutContext) {
        self.caption = self.honoured_caption().map(|caption| {
            place_caption(
                caption,
                context.sizes.preferred_span(caption.node, Axis::Block),
                context.sizes.maximum_span(caption.node, Axis::Inline),
                &self.box_insets,
                PerAxis {
                    inline: self.cache.last_target(Axis::Inline).unwrap_or(Au(0)),
                    block: self.cache.last_target(Axis::Block).unwrap_or(Au(0)),
                },
            )
        });
    }

    /// The tiled requirement of the grid alone, spacing and borders included.
    fn grid_requirement(&self, axis: Axis) -> SizeRequirement {
        let spacing = self.spacing();
        match axis {
            Axis::Inline => tiled_requirements(&self.columns.requirements, &spacing),
            Axis::Block => tiled_requirements(&self.rows, &spacing),
        }
    }

    /// What the table box needs along `axis`, insets and caption included. The maximum is the
    /// preferred size, and a fixed table width pins all three values.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "Table::required_span", skip_all, level = "trace")
    )]
    pub fn required_span(
        &mut self,
        context: &LayoutContext,
        axis: Axis,
    ) -> Result<SizeRequirement> {
        self.run_pass(context, |table, context| {
            table.ensure_requirements(context, axis);
            if table.grid.is_degenerate() {
                return SizeRequirement::zero();
            }

            let caption_inset = table
                .honoured_caption()
                .map(|caption| {
                    caption_inset(
                        caption.side,
                        context.sizes.preferred_span(caption.node, Axis::Block),
                    )
                })
                .unwrap_or_default();
            let insets = table.box_insets.sum_for_axis(axis) + caption_inset.sum_for_axis(axis);
            let grid = table.grid_requirement(axis);
            let minimum = saturating_add(grid.minimum, insets);
            let preferred = saturating_add(grid.preferred, insets);

            let fixed_width = match axis {
                Axis::Inline => table.style.width.and_then(|width| width.to_length()),
                Axis::Block => None,
            };
            match fixed_width {
                Some(width) => SizeRequirement::rigid(width.max(minimum)),
                None => SizeRequirement::new(minimum, preferred, preferred),
            }
        })
    }

    /// Lay out `axis` into `target_span`, the span of the grid area.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "Table::layout", skip_all, level = "trace")
    )]
    pub fn layout(&mut self, context: &LayoutContext, axis: Axis, target_span: Au) -> Result<()> {
        self.cache.set_target(axis, target_span);
        self.run_pass(context, |table, context| table.ensure_tiled(context, axis))
    }

    /// The allocation of the child at `index` among all children of the table. Rows span the
    /// whole grid area inline; children that are neither rows nor the caption get an empty
    /// allocation.
    pub fn child_allocation(
        &mut self,
        context: &LayoutContext,
        index: usize,
    ) -> Result<Option<PerAxis<Allocation>>> {
        self.run_pass(context, |table, context| {
            table.ensure_laid_out(context);
            let table = &*table;
            table
                .children
                .get(index)
                .map(|child| table.allocation_of_child(child))
        })
    }

    fn allocation_of_child(&self, child: &TableChild) -> PerAxis<Allocation> {
        match child {
            TableChild::Row(row) => PerAxis {
                inline: Allocation::new(
                    Au(0),
                    self.cache.last_target(Axis::Inline).unwrap_or(Au(0)),
                ),
                block: self
                    .row_layout
                    .span_of(row.row_index(), 1)
                    .map(|(offset, span)| Allocation::new(offset, span))
                    .unwrap_or_default(),
            },
            TableChild::Caption(caption)
                if self.honoured_caption().map(|honoured| honoured.node) == Some(caption.node) =>
            {
                self.caption
                    .map(|placement| placement.allocation)
                    .unwrap_or_default()
            },
            _ => PerAxis::default(),
        }
    }

    /// The allocation of the cell covering `coords`. Every slot covered by a spanning cell
    /// yields the allocation of the whole cell. A stale table is laid out again with its last
    /// target spans first.
    pub fn cell_allocation(
        &mut self,
        context: &LayoutContext,
        coords: TableSlotCoordinates,
    ) -> Result<Option<PerAxis<Allocation>>> {
        self.run_pass(context, |table, context| {
            table.ensure_laid_out(context);
            table.allocation_of_slot(coords)
        })
    }

    fn allocation_of_slot(&self, coords: TableSlotCoordinates) -> Option<PerAxis<Allocation>> {
        let (row_index, cell) = resolve_origin(&self.children, coords)?;
        let (inline_offset, inline_span) = self
            .column_layout
            .span_of(cell.grid_column(), cell.column_span())?;
        let (block_offset, block_span) =
            self.row_layout.span_of(row_index, cell.grid_row_span())?;
        Some(PerAxis {
            inline: Allocation::new(inline_offset, inline_span),
            block: Allocation::new(block_offset, block_span),
        })
    }

    /// Where the content of the cell covering `coords` goes inside the cell: as wide as the
    /// cell, and as tall as the content prefers, aligned by the cell's vertical alignment.
    pub fn cell_content_allocation(
        &mut self,
        context: &LayoutContext,
        coords: TableSlotCoordinates,
    ) -> Result<Option<PerAxis<Allocation>>> {
        self.run_pass(context, |table, context| -> Option<PerAxis<Allocation>> {
            table.ensure_laid_out(context);
            let mut allocation = table.allocation_of_slot(coords)?;
            let (_, cell) = resolve_origin(&table.children, coords)?;
            let content = context
                .sizes
                .preferred_span(cell.node, Axis::Block)
                .min(allocation.block.span)
                .max(Au(0));
            let alignment = cell
                .measures()
                .block
                .alignment
                .unwrap_or(DEFAULT_VERTICAL_ALIGN);
            allocation.block = Allocation::new(
                allocation.block.offset + (allocation.block.span - content).scale_by(alignment),
                content,
            );
            Some(allocation)
        })
    }

    /// The insets of the table box as of the last pass, caption included.
    pub fn insets(&self) -> Sides<Au> {
        let mut insets = self.box_insets;
        if let Some(caption) = &self.caption {
            insets.top += caption.inset_delta.top;
            insets.bottom += caption.inset_delta.bottom;
        }
        insets
    }

    pub fn snapshot(&self) -> TableLayoutSnapshot {
        TableLayoutSnapshot {
            generation: self.cache.generation(),
            grid: self.grid,
            states: PerAxis {
                inline: self.cache.state(Axis::Inline),
                block: self.cache.state(Axis::Block),
            },
            targets: PerAxis {
                inline: self.cache.last_target(Axis::Inline),
                block: self.cache.last_target(Axis::Block),
            },
            columns: self.columns.clone(),
            rows: self.rows.clone(),
            column_layout: self.column_layout.clone(),
            row_layout: self.row_layout.clone(),
            caption: self.caption,
        }
    }
}

/// The damage caused by replacing the style `old` of a cell with `new`.
fn cell_style_damage(old: &CellStyle, new: &CellStyle) -> TableDamage {
    let mut damage = TableDamage::empty();
    if old.column_span != new.column_span || old.row_span != new.row_span {
        damage |= TableDamage::REBUILD_GRID;
    }
    if old.width != new.width {
        damage |= TableDamage::RECOMPUTE_COLUMNS;
    }
    if old.height != new.height || old.vertical_align != new.vertical_align {
        damage |= TableDamage::RECOMPUTE_ROWS;
    }
    damage
}
