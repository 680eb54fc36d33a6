/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Tracking what a table has to recompute.
//!
//! Each axis moves through `Invalid -> GridBuilt -> RequirementsComputed -> Tiled`. Changes to
//! the table are recorded as [`TableDamage`] and only applied to the per-axis states when the
//! next public operation starts, so that a burst of changes costs a single recomputation.

use std::fmt;

use app_units::Au;
use bitflags::bitflags;
use log::debug;
use serde::Serialize;

use crate::geom::{Axis, PerAxis};

/// How far the layout of one axis has progressed.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub enum LayoutState {
    #[default]
    Invalid,
    GridBuilt,
    RequirementsComputed,
    Tiled,
}

bitflags! {
    /// Work that a change to the table makes necessary.
    #[derive(Clone, Copy, Default, Debug, Eq, PartialEq)]
    pub struct TableDamage: u8 {
        /// Rows or cells were added or removed, or a span changed.
        const REBUILD_GRID = 0b00001;
        /// The inline measures of some cell changed.
        const RECOMPUTE_COLUMNS = 0b00010;
        /// The block measures of some cell changed.
        const RECOMPUTE_ROWS = 0b00100;
        /// Columns have to be tiled again.
        const RETILE_COLUMNS = 0b01000;
        /// Rows have to be tiled again.
        const RETILE_ROWS = 0b10000;
    }
}

impl TableDamage {
    /// The damage a reflow of cell content causes. Only rows depend on it.
    pub fn content_reflow() -> Self {
        TableDamage::RECOMPUTE_ROWS
    }

    pub fn recompute(axis: Axis) -> Self {
        match axis {
            Axis::Inline => TableDamage::RECOMPUTE_COLUMNS,
            Axis::Block => TableDamage::RECOMPUTE_ROWS,
        }
    }

    pub fn retile(axis: Axis) -> Self {
        match axis {
            Axis::Inline => TableDamage::RETILE_COLUMNS,
            Axis::Block => TableDamage::RETILE_ROWS,
        }
    }

    /// The state `axis` falls back to under this damage, if it has to fall back at all.
    fn state_for_axis(&self, axis: Axis) -> Option<LayoutState> {
        if self.contains(TableDamage::REBUILD_GRID) {
            Some(LayoutState::Invalid)
        } else if self.intersects(TableDamage::recompute(axis)) {
            Some(LayoutState::GridBuilt)
        } else if self.intersects(TableDamage::retile(axis)) {
            Some(LayoutState::RequirementsComputed)
        } else {
            None
        }
    }
}

impl fmt::Display for TableDamage {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        let mut first_elem = true;

        let to_iter = [
            (TableDamage::REBUILD_GRID, "Rebuild grid"),
            (TableDamage::RECOMPUTE_COLUMNS, "Recompute columns"),
            (TableDamage::RECOMPUTE_ROWS, "Recompute rows"),
            (TableDamage::RETILE_COLUMNS, "Retile columns"),
            (TableDamage::RETILE_ROWS, "Retile rows"),
        ];

        for &(damage, damage_str) in &to_iter {
            if self.contains(damage) {
                if !first_elem {
                    write!(f, " | ")?;
                }
                write!(f, "{}", damage_str)?;
                first_elem = false;
            }
        }

        if first_elem {
            write!(f, "NoDamage")?;
        }

        Ok(())
    }
}

/// The per-table cache of layout validity.
#[derive(Clone, Debug, Default)]
pub struct GridInvalidationCache {
    /// Bumped on every structural change of the table.
    generation: u64,
    states: PerAxis<LayoutState>,
    pending: TableDamage,
    /// The target spans of the last layout of each axis.
    last_targets: PerAxis<Option<Au>>,
    nonincremental: bool,
}

impl GridInvalidationCache {
    pub fn new(nonincremental: bool) -> Self {
        Self {
            nonincremental,
            ..Default::default()
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The state of `axis`, counting damage that was recorded but not consumed yet.
    pub fn state(&self, axis: Axis) -> LayoutState {
        let state = *self.states.get(axis);
        match self.pending.state_for_axis(axis) {
            Some(fallback) => state.min(fallback),
            None => state,
        }
    }

    pub fn pending_damage(&self) -> TableDamage {
        self.pending
    }

    pub fn last_target(&self, axis: Axis) -> Option<Au> {
        *self.last_targets.get(axis)
    }

    /// Record damage to be applied by the next [`Self::consume_damage`]. Structural damage
    /// bumps the generation right away.
    pub fn note_damage(&mut self, damage: TableDamage) {
        if damage.contains(TableDamage::REBUILD_GRID) {
            self.generation += 1;
        }
        self.pending |= damage;
    }

    /// Apply all recorded damage to the per-axis states and return it.
    pub fn consume_damage(&mut self) -> TableDamage {
        let mut damage = std::mem::take(&mut self.pending);
        if self.nonincremental && self.states.inline.max(self.states.block) > LayoutState::Invalid
        {
            damage |= TableDamage::REBUILD_GRID;
        }
        if damage.is_empty() {
            return damage;
        }
        debug!("Applying table damage: {}", damage);
        for axis in [Axis::Inline, Axis::Block] {
            if let Some(state) = damage.state_for_axis(axis) {
                let current = self.states.get_mut(axis);
                *current = (*current).min(state);
            }
        }
        damage
    }

    /// Whether `axis` still has to reach `state`.
    pub fn needs(&self, axis: Axis, state: LayoutState) -> bool {
        self.state(axis) < state
    }

    pub fn advance(&mut self, axis: Axis, state: LayoutState) {
        *self.states.get_mut(axis) = state;
    }

    /// Record a new target span for `axis`, sending it back to be tiled again when the span
    /// differs from the last one.
    pub fn set_target(&mut self, axis: Axis, target: Au) {
        if self.last_target(axis) != Some(target) {
            *self.last_targets.get_mut(axis) = Some(target);
            let current = self.states.get_mut(axis);
            *current = (*current).min(LayoutState::RequirementsComputed);
        }
    }

    /// Drop everything after a pass raced with a change of the document.
    pub fn discard(&mut self) {
        self.states = PerAxis::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiled() -> GridInvalidationCache {
        let mut cache = GridInvalidationCache::new(false);
        cache.set_target(Axis::Inline, Au(100));
        cache.set_target(Axis::Block, Au(100));
        cache.advance(Axis::Inline, LayoutState::Tiled);
        cache.advance(Axis::Block, LayoutState::Tiled);
        cache
    }

    #[test]
    fn display_lists_every_flag() {
        assert_eq!(TableDamage::empty().to_string(), "NoDamage");
        assert_eq!(
            (TableDamage::REBUILD_GRID | TableDamage::RETILE_ROWS).to_string(),
            "Rebuild grid | Retile rows"
        );
    }

    #[test]
    fn structural_damage_invalidates_both_axes() {
        let mut cache = tiled();
        cache.note_damage(TableDamage::REBUILD_GRID);
        assert_eq!(cache.generation(), 1);
        assert_eq!(cache.state(Axis::Inline), LayoutState::Invalid);
        assert_eq!(cache.pending_damage(), TableDamage::REBUILD_GRID);
        cache.consume_damage();
        assert_eq!(cache.state(Axis::Inline), LayoutState::Invalid);
        assert_eq!(cache.state(Axis::Block), LayoutState::Invalid);
        assert!(cache.pending_damage().is_empty());
    }

    #[test]
    fn content_reflow_only_touches_rows() {
        let mut cache = tiled();
        cache.note_damage(TableDamage::content_reflow());
        cache.consume_damage();
        assert_eq!(cache.state(Axis::Inline), LayoutState::Tiled);
        assert_eq!(cache.state(Axis::Block), LayoutState::GridBuilt);
        assert_eq!(cache.generation(), 0);
    }

    #[test]
    fn new_target_only_retiles() {
        let mut cache = tiled();
        cache.set_target(Axis::Inline, Au(100));
        assert_eq!(cache.state(Axis::Inline), LayoutState::Tiled);
        cache.set_target(Axis::Inline, Au(120));
        assert_eq!(cache.state(Axis::Inline), LayoutState::RequirementsComputed);
        assert_eq!(cache.last_target(Axis::Inline), Some(Au(120)));
        assert!(cache.needs(Axis::Inline, LayoutState::Tiled));
        assert!(!cache.needs(Axis::Inline, LayoutState::GridBuilt));
    }

    #[test]
    fn damage_never_raises_a_state() {
        let mut cache = GridInvalidationCache::new(false);
        cache.note_damage(TableDamage::RETILE_COLUMNS);
        cache.consume_damage();
        assert_eq!(cache.state(Axis::Inline), LayoutState::Invalid);
    }

    #[test]
    fn nonincremental_rebuilds_every_time() {
        let mut cache = GridInvalidationCache::new(true);
        cache.advance(Axis::Block, LayoutState::Tiled);
        let damage = cache.consume_damage();
        assert!(damage.contains(TableDamage::REBUILD_GRID));
        assert_eq!(cache.state(Axis::Block), LayoutState::Invalid);
    }

    #[test]
    fn discard_resets_both_axes() {
        let mut cache = tiled();
        cache.discard();
        assert_eq!(cache.state(Axis::Inline), LayoutState::Invalid);
        assert_eq!(cache.last_target(Axis::Block), Some(Au(100)));
    }
}
