use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schedule::ScheduleGroup;

/// Base of the multi-day group's reserved id range.
pub const MULTI_DAY_BASE: u32 = 1000;
/// Base of the single-day group's reserved id range.
pub const SINGLE_DAY_BASE: u32 = 2000;
/// Ids reserved per day slot; entry lists may not grow past this.
pub const ENTRY_SLOTS_PER_DAY: u32 = 10;
/// Day slots reserved for the multi-day group (one per possible weekday).
pub const MULTI_DAY_SLOTS: u32 = 7;
/// Day slots reserved for the single-day group.
pub const SINGLE_DAY_SLOTS: u32 = 1;

/// Stable identity of one timer registration. The same (group, day offset,
/// entry index) always yields the same id, across restarts, so rearm and
/// cancellation address the right registration.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct TriggerId(pub u32);

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TriggerIdError {
    #[error("day offset {offset} exceeds the {slots} day slots reserved for {group:?}")]
    DayOffsetOutOfRange {
        group: ScheduleGroup,
        offset: u32,
        slots: u32,
    },
    #[error("entry index {0} exceeds the {ENTRY_SLOTS_PER_DAY} entry slots reserved per day")]
    EntryIndexOutOfRange(u32),
}

fn base(group: ScheduleGroup) -> u32 {
    match group {
        ScheduleGroup::MultiDay => MULTI_DAY_BASE,
        ScheduleGroup::SingleDay => SINGLE_DAY_BASE,
    }
}

pub fn day_slots(group: ScheduleGroup) -> u32 {
    match group {
        ScheduleGroup::MultiDay => MULTI_DAY_SLOTS,
        ScheduleGroup::SingleDay => SINGLE_DAY_SLOTS,
    }
}

/// Deterministic id for the entry at `entry_index` on the `day_offset`-th
/// weekday of `group`. Out-of-range inputs are rejected rather than allowed
/// to collide with a neighbouring slot.
pub fn allocate_id(
    group: ScheduleGroup,
    day_offset: u32,
    entry_index: u32,
) -> Result<TriggerId, TriggerIdError> {
    let slots = day_slots(group);
    if day_offset >= slots {
        return Err(TriggerIdError::DayOffsetOutOfRange {
            group,
            offset: day_offset,
            slots,
        });
    }
    if entry_index >= ENTRY_SLOTS_PER_DAY {
        return Err(TriggerIdError::EntryIndexOutOfRange(entry_index));
    }
    Ok(TriggerId(
        base(group) + day_offset * ENTRY_SLOTS_PER_DAY + entry_index,
    ))
}

/// Every id in `group`'s reserved range, populated or not. Bulk cancellation
/// walks this so registrations left behind by earlier schedule edits are
/// cleared too.
pub fn reserved_ids(group: ScheduleGroup) -> impl Iterator<Item = TriggerId> {
    let start = base(group);
    let end = start + day_slots(group) * ENTRY_SLOTS_PER_DAY;
    (start..end).map(TriggerId)
}
