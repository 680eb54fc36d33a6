/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

#![deny(unsafe_code)]

//! Grid based table layout.
//!
//! A [`Table`] holds rows of cells that may span several rows and columns. Given the intrinsic
//! sizes of the cell contents it works out what every column and every row requires, tiles a
//! target span over them, and answers where each row, cell and the caption end up. Work is
//! only redone for what changed since the last layout, as tracked by [`TableDamage`].

mod boxes;
mod caption;
mod construct;
mod context;
mod error;
mod geom;
mod grid;
mod invalidation;
mod options;
pub mod parallel;
mod requirements;
mod rowspan;
mod style;
mod table;
mod tiling;

pub use boxes::{TableCaption, TableCell, TableChild, TableRow};
pub use caption::{CaptionPlacement, caption_inset, place_caption};
pub use construct::{
    AttributeKey, AttributeValue, ElementTag, StructuralChange, TableBuilder, TableDocument,
};
pub use context::{IntrinsicSizes, LayoutContext, NoInsets, OpaqueNode, StyleResolver};
pub use error::{LayoutError, Result};
pub use geom::{Allocation, Axis, PerAxis, Sides, TableSlotCoordinates};
pub use grid::{FilledColumns, TableGrid};
pub use invalidation::{GridInvalidationCache, LayoutState, TableDamage};
pub use options::TableLayoutOptions;
pub use requirements::{
    ColumnRequirements, SizeRequirement, SpanningContribution, compute_column_requirements,
    compute_row_requirements, enlarge_for_spanning_cells,
};
pub use rowspan::{RowSpanningCell, multi_row_adjustments};
pub use style::{CaptionSide, CellStyle, LengthPercentage, Percentage, TableStyle};
pub use table::{Table, TableLayoutSnapshot};
pub use tiling::{TiledLayout, TilingSpacing, tile, tiled_requirements};
