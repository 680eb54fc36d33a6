/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Laying out many independent tables at once.

use app_units::Au;
use rayon::iter::{IntoParallelRefMutIterator, ParallelIterator};

use crate::context::LayoutContext;
use crate::error::Result;
use crate::geom::{Axis, PerAxis};
use crate::table::Table;

/// Lay out both axes of every table, in parallel. `targets` gives the grid area of each table.
/// Tables only read the shared context, so they never wait on each other.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(name = "layout_tables", skip_all, level = "trace")
)]
pub fn layout_tables(
    tables: &mut [Table],
    context: &LayoutContext,
    targets: impl Fn(&Table) -> PerAxis<Au> + Sync,
) -> Vec<Result<()>> {
    tables
        .par_iter_mut()
        .map(|table| {
            let target = targets(table);
            table.layout(context, Axis::Inline, target.inline)?;
            table.layout(context, Axis::Block, target.block)
        })
        .collect()
}
