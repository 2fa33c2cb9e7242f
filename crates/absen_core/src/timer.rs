use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::trigger::TriggerId;

/// Everything the fire handler needs to alert and rearm, carried in the
/// registration itself. Holding the entry's own weekday and wall-clock time
/// here means rearming never has to look the entry up in persisted state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FirePayload {
    pub trigger_id: TriggerId,
    pub label: String,
    pub weekday: Weekday,
    pub hour: u32,
    pub minute: u32,
}

impl FirePayload {
    pub fn time_of_day(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("exact scheduling denied by the platform")]
pub struct ExactSchedulingDenied;

/// One-shot, wake-capable timer registrations keyed by trigger id.
///
/// At most one registration exists per id; scheduling an id again supersedes
/// the previous registration, and firing consumes it. `cancel` on an
/// unregistered id is a no-op.
pub trait TimerFacility: Send + Sync {
    /// Exact registration; may be refused when the platform privilege is
    /// missing, in which case callers fall back to `schedule_inexact`.
    fn schedule_exact(
        &self,
        id: TriggerId,
        fire_at: DateTime<Utc>,
        payload: FirePayload,
    ) -> Result<(), ExactSchedulingDenied>;

    /// Best-effort registration for the same timestamp; may fire late.
    fn schedule_inexact(&self, id: TriggerId, fire_at: DateTime<Utc>, payload: FirePayload);

    fn cancel(&self, id: TriggerId);

    fn can_schedule_exact(&self) -> bool;
}
