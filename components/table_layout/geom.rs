/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Small geometry vocabulary shared by the table layout passes.

use app_units::{Au, MAX_AU};
use euclid::{Point2D, UnknownUnit};
use serde::Serialize;

/// The coordinates of a slot in the table grid, `x` being the column and `y` the row.
pub type TableSlotCoordinates = Point2D<usize, UnknownUnit>;

/// One of the two axes a table is laid out along. Columns are distributed along the inline
/// axis and rows along the block axis.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum Axis {
    Inline,
    Block,
}

/// A value stored once per axis.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct PerAxis<T> {
    pub inline: T,
    pub block: T,
}

impl<T> PerAxis<T> {
    pub fn get(&self, axis: Axis) -> &T {
        match axis {
            Axis::Inline => &self.inline,
            Axis::Block => &self.block,
        }
    }

    pub fn get_mut(&mut self, axis: Axis) -> &mut T {
        match axis {
            Axis::Inline => &mut self.inline,
            Axis::Block => &mut self.block,
        }
    }
}

/// The position and size given to something along one axis.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Allocation {
    pub offset: Au,
    pub span: Au,
}

impl Allocation {
    pub fn new(offset: Au, span: Au) -> Self {
        Self { offset, span }
    }
}

/// Box-model insets of the table, as handed out by the style resolver.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Sides<T> {
    pub top: T,
    pub right: T,
    pub bottom: T,
    pub left: T,
}

impl Sides<Au> {
    pub fn zero() -> Self {
        Self::default()
    }

    /// The sum of both insets that lie on the given axis.
    pub fn sum_for_axis(&self, axis: Axis) -> Au {
        match axis {
            Axis::Inline => self.left + self.right,
            Axis::Block => self.top + self.bottom,
        }
    }

    /// The inset at the start of the given axis.
    pub fn start_for_axis(&self, axis: Axis) -> Au {
        match axis {
            Axis::Inline => self.left,
            Axis::Block => self.top,
        }
    }
}

/// Addition that treats `MAX_AU` as infinity and never wraps.
pub(crate) fn saturating_add(a: Au, b: Au) -> Au {
    if a == MAX_AU || b == MAX_AU {
        return MAX_AU;
    }
    Au(a.0.saturating_add(b.0).min(MAX_AU.0))
}

/// Subtraction clamped at zero. An infinite minuend stays infinite.
pub(crate) fn saturating_sub(a: Au, b: Au) -> Au {
    if a == MAX_AU {
        return MAX_AU;
    }
    Au(a.0.saturating_sub(b.0).max(0))
}

pub(crate) fn saturating_sum(values: impl Iterator<Item = Au>) -> Au {
    values.fold(Au(0), saturating_add)
}
