/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Distribution of a target span over a run of adjacent slots (the columns across a table or
//! the rows down it), given what every slot requires.

use app_units::{Au, MAX_AU};
use log::trace;
use serde::Serialize;

use crate::geom::{saturating_add, saturating_sub, saturating_sum};
use crate::requirements::SizeRequirement;

/// The spacing and border rules around a run of slots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TilingSpacing {
    /// Space before every slot.
    pub leading: Au,
    /// Space after every slot. Between two slots the larger of the two spacings is used.
    pub trailing: Au,
    /// Border taken once at each end of the run.
    pub border: Au,
}

impl TilingSpacing {
    pub fn uniform(spacing: Au, border: Au) -> Self {
        Self {
            leading: spacing,
            trailing: spacing,
            border,
        }
    }

    /// The space between two adjacent slots.
    pub(crate) fn between(&self) -> Au {
        self.leading.max(self.trailing)
    }

    /// All the space of a run of `count` slots that does not belong to any slot.
    pub fn total(&self, count: usize) -> Au {
        if count == 0 {
            return self.border * 2;
        }
        self.border * 2 + self.leading + self.trailing + self.between() * (count as i32 - 1)
    }

    /// The spacing covered by something that spans `count` adjacent slots.
    pub fn spanned(&self, count: usize) -> Au {
        self.between() * (count.saturating_sub(1) as i32)
    }
}

/// The result of tiling: where every slot starts and how large it is.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct TiledLayout {
    pub offsets: Vec<Au>,
    pub spans: Vec<Au>,
    /// How far the slots reach past the target span, when their minimum sizes do not fit.
    pub overflow: Au,
}

impl TiledLayout {
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// The offset of the first slot of `range` and the distance to the end of its last slot.
    pub fn span_of(&self, first: usize, count: usize) -> Option<(Au, Au)> {
        let last = first + count.max(1) - 1;
        let start = *self.offsets.get(first)?;
        let end = *self.offsets.get(last)? + *self.spans.get(last)?;
        Some((start, end - start))
    }
}

/// The aggregate requirement of a tiled run of slots, including spacing and borders.
pub fn tiled_requirements(
    requirements: &[SizeRequirement],
    spacing: &TilingSpacing,
) -> SizeRequirement {
    let extra = spacing.total(requirements.len());
    let minimum = saturating_sum(requirements.iter().map(|r| r.minimum));
    let preferred = saturating_sum(requirements.iter().map(|r| r.preferred));
    let maximum = saturating_sum(requirements.iter().map(|r| r.maximum));
    SizeRequirement::new(
        saturating_add(minimum, extra),
        saturating_add(preferred, extra),
        saturating_add(maximum, extra),
    )
}

/// Lay out `requirements.len()` slots inside `target_span`.
///
/// Slots never receive less than their minimum. Between the minimum and preferred sums slots
/// give up space in proportion to how far they can shrink. Above the preferred sum the surplus
/// goes out by adjustment weight, respecting finite maxima while any uncapped slot remains.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(name = "tile_slots", skip_all, level = "trace")
)]
pub fn tile(
    requirements: &[SizeRequirement],
    spacing: &TilingSpacing,
    target_span: Au,
) -> TiledLayout {
    let count = requirements.len();
    if count == 0 {
        return TiledLayout::default();
    }

    let available = saturating_sub(target_span, spacing.total(count));
    let minimum_sum = saturating_sum(requirements.iter().map(|r| r.minimum));
    let preferred_sum = saturating_sum(requirements.iter().map(|r| r.preferred));

    let spans = if available <= minimum_sum {
        requirements.iter().map(|r| r.minimum).collect()
    } else if available <= preferred_sum {
        shrink_toward_minimum(requirements, preferred_sum - available)
    } else {
        grow_past_preferred(requirements, available - preferred_sum)
    };

    let mut offsets = Vec::with_capacity(count);
    let mut offset = spacing.border + spacing.leading;
    for (index, span) in spans.iter().enumerate() {
        if index > 0 {
            offset = saturating_add(offset, spacing.between());
        }
        offsets.push(offset);
        offset = saturating_add(offset, *span);
    }
    let used = saturating_add(offset, spacing.trailing + spacing.border);
    let overflow = saturating_sub(used, target_span);

    trace!(
        "Tiled {} slots into {:?} (min {:?}, pref {:?}, overflow {:?})",
        count, target_span, minimum_sum, preferred_sum, overflow
    );
    TiledLayout {
        offsets,
        spans,
        overflow,
    }
}

fn shrink_toward_minimum(requirements: &[SizeRequirement], deficit: Au) -> Vec<Au> {
    let give: Vec<i64> = requirements
        .iter()
        .map(|r| (r.preferred - r.minimum).0 as i64)
        .collect();
    let total_give: i64 = give.iter().sum();
    let deficit = deficit.0 as i64;

    let mut taken: Vec<i64> = give
        .iter()
        .map(|slot_give| {
            if total_give == 0 {
                0
            } else {
                slot_give * deficit / total_give
            }
        })
        .collect();

    // Flooring leaves a few app units unassigned. The slots keep enough give between them to
    // absorb the rest, so hand it out one unit at a time from the start.
    let mut leftover = deficit - taken.iter().sum::<i64>();
    while leftover > 0 {
        let mut progressed = false;
        for (index, slot_give) in give.iter().enumerate() {
            if leftover == 0 {
                break;
            }
            if taken[index] < *slot_give {
                taken[index] += 1;
                leftover -= 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }

    requirements
        .iter()
        .zip(taken)
        .map(|(requirement, taken)| requirement.preferred - Au(taken as i32))
        .collect()
}

fn grow_past_preferred(requirements: &[SizeRequirement], surplus: Au) -> Vec<Au> {
    let mut spans: Vec<Au> = requirements.iter().map(|r| r.preferred).collect();
    let mut remaining = surplus.0 as i64;
    let mut uncapped: Vec<usize> = (0..requirements.len())
        .filter(|index| requirements[*index].maximum > spans[*index])
        .collect();

    // Every round either hands out all of the remaining surplus or caps at least one more
    // slot, so this ends after at most `requirements.len()` rounds.
    while remaining > 0 {
        if uncapped.is_empty() {
            let everyone: Vec<usize> = (0..requirements.len()).collect();
            let shares = proportional_shares(remaining, &everyone, requirements);
            for (index, share) in everyone.iter().zip(shares) {
                spans[*index] = Au(spans[*index].0.saturating_add(share as i32));
            }
            break;
        }

        let shares = proportional_shares(remaining, &uncapped, requirements);
        let overflowing: Vec<usize> = uncapped
            .iter()
            .zip(shares.iter())
            .filter(|(index, share)| {
                let room = room_to_maximum(requirements[**index].maximum, spans[**index]);
                **share >= room
            })
            .map(|(index, _)| *index)
            .collect();

        if overflowing.is_empty() {
            for (index, share) in uncapped.iter().zip(shares) {
                spans[*index] += Au(share as i32);
            }
            break;
        }

        for index in overflowing {
            let room = room_to_maximum(requirements[index].maximum, spans[index]);
            spans[index] = requirements[index].maximum;
            remaining -= room;
            uncapped.retain(|candidate| *candidate != index);
        }
    }
    spans
}

fn room_to_maximum(maximum: Au, span: Au) -> i64 {
    if maximum == MAX_AU {
        return i64::MAX;
    }
    (maximum.0 as i64 - span.0 as i64).max(0)
}

/// Split `amount` app units over `indices` by adjustment weight, equally when every weight is
/// zero. The shares always add up to `amount`; the floored remainder goes to the earliest
/// slots.
fn proportional_shares(
    amount: i64,
    indices: &[usize],
    requirements: &[SizeRequirement],
) -> Vec<i64> {
    let weight_sum: i64 = indices
        .iter()
        .map(|index| requirements[*index].weight as i64)
        .sum();
    let weight = |index: usize| {
        if weight_sum == 0 {
            1
        } else {
            requirements[index].weight as i64
        }
    };
    let total = if weight_sum == 0 {
        indices.len() as i64
    } else {
        weight_sum
    };

    let mut shares: Vec<i64> = indices
        .iter()
        .map(|index| amount * weight(*index) / total)
        .collect();
    let mut leftover = amount - shares.iter().sum::<i64>();
    for (position, index) in indices.iter().enumerate() {
        if leftover == 0 {
            break;
        }
        if weight(*index) > 0 {
            shares[position] += 1;
            leftover -= 1;
        }
    }
    shares
}
