/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The capabilities table layout borrows from the rest of the engine.

use app_units::{Au, MAX_AU};
use serde::Serialize;

use crate::geom::{Axis, Sides};

/// An opaque handle to a node of the document that owns the table.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct OpaqueNode(pub usize);

/// Intrinsic size queries answered by the content layout of each cell, row or caption.
///
/// Implementations are read while the caller holds a shared lock on the document, so they
/// must not mutate it.
pub trait IntrinsicSizes: Sync {
    fn minimum_span(&self, node: OpaqueNode, axis: Axis) -> Au;

    fn preferred_span(&self, node: OpaqueNode, axis: Axis) -> Au;

    fn maximum_span(&self, _node: OpaqueNode, _axis: Axis) -> Au {
        MAX_AU
    }

    /// A counter that the document bumps on every structural mutation. Layout reads it at the
    /// start and the end of a pass to detect that it raced with a mutation.
    fn generation(&self) -> u64 {
        0
    }
}

/// Read-only access to resolved box-model values.
pub trait StyleResolver: Sync {
    /// The padding and border insets of the table box, not including any caption.
    fn box_insets(&self, _table: OpaqueNode) -> Sides<Au> {
        Sides::zero()
    }
}

/// A [`StyleResolver`] for tables without padding or borders.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInsets;

impl StyleResolver for NoInsets {}

/// Everything a layout pass needs from outside the table.
#[derive(Clone, Copy)]
pub struct LayoutContext<'a> {
    pub sizes: &'a dyn IntrinsicSizes,
    pub style: &'a dyn StyleResolver,
}

impl<'a> LayoutContext<'a> {
    pub fn new(sizes: &'a dyn IntrinsicSizes, style: &'a dyn StyleResolver) -> Self {
        Self { sizes, style }
    }

    pub(crate) fn document_generation(&self) -> u64 {
        self.sizes.generation()
    }
}
