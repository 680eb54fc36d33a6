/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Placement of the table caption.
//!
//! The caption does not take part in the grid. Instead it enlarges the inset of the table box
//! on the side it sits on, and is positioned inside that extra inset. Offsets are relative to
//! the start of the grid area, so a caption on top has a negative block offset.

use app_units::Au;
use serde::Serialize;

use crate::boxes::TableCaption;
use crate::geom::{Allocation, Axis, PerAxis, Sides};
use crate::style::CaptionSide;

/// Where the caption goes and how much it adds to the table insets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct CaptionPlacement {
    pub allocation: PerAxis<Allocation>,
    /// What the caption adds to the insets of the table box.
    pub inset_delta: Sides<Au>,
}

/// The extra inset a caption with the given preferred block size needs.
pub fn caption_inset(side: CaptionSide, preferred_block_size: Au) -> Sides<Au> {
    let mut delta = Sides::zero();
    match side {
        CaptionSide::Top => delta.top = preferred_block_size,
        CaptionSide::Bottom => delta.bottom = preferred_block_size,
    }
    delta
}

/// Place `caption` around a grid that was tiled into `grid_target`.
///
/// `box_insets` are the insets of the table box without the caption. The caption sits at the
/// very top of the box when it is on top, or right below the bottom box inset otherwise. Along
/// the inline axis it is as wide as the grid area, but no wider than its content allows.
pub fn place_caption(
    caption: &TableCaption,
    preferred_block_size: Au,
    maximum_inline_size: Au,
    box_insets: &Sides<Au>,
    grid_target: PerAxis<Au>,
) -> CaptionPlacement {
    let inset_delta = caption_inset(caption.side, preferred_block_size);
    let block_offset = match caption.side {
        CaptionSide::Top => -(box_insets.start_for_axis(Axis::Block) + inset_delta.top),
        CaptionSide::Bottom => grid_target.block + box_insets.bottom,
    };
    CaptionPlacement {
        allocation: PerAxis {
            inline: Allocation::new(Au(0), grid_target.inline.min(maximum_inline_size)),
            block: Allocation::new(block_offset, preferred_block_size),
        },
        inset_delta,
    }
}

#[cfg(test)]
mod tests {
    use app_units::MAX_AU;

    use super::*;
    use crate::context::OpaqueNode;

    fn px(value: i32) -> Au {
        Au::from_px(value)
    }

    fn insets() -> Sides<Au> {
        Sides {
            top: px(2),
            right: px(3),
            bottom: px(4),
            left: px(5),
        }
    }

    fn target() -> PerAxis<Au> {
        PerAxis {
            inline: px(200),
            block: px(100),
        }
    }

    #[test]
    fn top_caption_sits_above_the_box_inset() {
        let caption = TableCaption {
            node: OpaqueNode(1),
            side: CaptionSide::Top,
        };
        let placement = place_caption(&caption, px(30), MAX_AU, &insets(), target());
        assert_eq!(placement.inset_delta.top, px(30));
        assert_eq!(placement.inset_delta.bottom, Au(0));
        assert_eq!(placement.allocation.block, Allocation::new(px(-32), px(30)));
        assert_eq!(placement.allocation.inline, Allocation::new(Au(0), px(200)));
    }

    #[test]
    fn bottom_caption_sits_below_the_box_inset() {
        let caption = TableCaption {
            node: OpaqueNode(1),
            side: CaptionSide::Bottom,
        };
        let placement = place_caption(&caption, px(30), px(150), &insets(), target());
        assert_eq!(placement.inset_delta.bottom, px(30));
        assert_eq!(placement.allocation.block, Allocation::new(px(104), px(30)));
        assert_eq!(placement.allocation.inline.span, px(150));
    }
}
