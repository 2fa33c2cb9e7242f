use std::sync::Arc;

use anyhow::{anyhow, ensure, Context, Result};
use chrono::{DateTime, FixedOffset, Utc, Weekday};

use crate::alerts::AlertSink;
use crate::occurrence::next_occurrence;
use crate::schedule::{
    default_multi_day_entries, default_single_day_entries, ScheduleEntry, ScheduleGroup,
    ScheduleSet, WeekPlan,
};
use crate::store::{ScheduleStore, KEY_ENABLED, KEY_MULTI_DAY, KEY_SINGLE_DAY};
use crate::timer::{ExactSchedulingDenied, FirePayload, TimerFacility};
use crate::trigger::{allocate_id, reserved_ids, TriggerId, ENTRY_SLOTS_PER_DAY};

const WIB_OFFSET_SECS: i32 = 7 * 3600;

/// Western Indonesia Time, the fixed zone every occurrence is computed in.
pub fn wib() -> FixedOffset {
    FixedOffset::east_opt(WIB_OFFSET_SECS).expect("WIB is a valid offset")
}

/// Orchestrates the weekly reminder lifecycle: derives trigger ids and next
/// occurrences from the persisted schedule lists, registers one-shot timers
/// through the injected facility, and rearms each trigger when it fires.
pub struct ReminderService {
    store: Arc<dyn ScheduleStore>,
    timers: Arc<dyn TimerFacility>,
    alerts: Arc<dyn AlertSink>,
    week_plan: WeekPlan,
    timezone: FixedOffset,
}

pub struct ReminderServiceBuilder {
    store: Option<Arc<dyn ScheduleStore>>,
    timers: Option<Arc<dyn TimerFacility>>,
    alerts: Option<Arc<dyn AlertSink>>,
    week_plan: WeekPlan,
    timezone: FixedOffset,
}

impl ReminderServiceBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            timers: None,
            alerts: None,
            week_plan: WeekPlan::default(),
            timezone: wib(),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ScheduleStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_timers(mut self, timers: Arc<dyn TimerFacility>) -> Self {
        self.timers = Some(timers);
        self
    }

    pub fn with_alert_sink(mut self, alerts: Arc<dyn AlertSink>) -> Self {
        self.alerts = Some(alerts);
        self
    }

    pub fn with_week_plan(mut self, week_plan: WeekPlan) -> Self {
        self.week_plan = week_plan;
        self
    }

    pub fn with_timezone(mut self, timezone: FixedOffset) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn build(self) -> Result<ReminderService> {
        Ok(ReminderService {
            store: self
                .store
                .ok_or_else(|| anyhow!("a schedule store is required"))?,
            timers: self
                .timers
                .ok_or_else(|| anyhow!("a timer facility is required"))?,
            alerts: self
                .alerts
                .ok_or_else(|| anyhow!("an alert sink is required"))?,
            week_plan: self.week_plan,
            timezone: self.timezone,
        })
    }
}

impl Default for ReminderServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReminderService {
    pub fn builder() -> ReminderServiceBuilder {
        ReminderServiceBuilder::new()
    }

    pub fn week_plan(&self) -> &WeekPlan {
        &self.week_plan
    }

    pub fn timezone(&self) -> FixedOffset {
        self.timezone
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.timezone)
    }

    /// Capability passthrough so callers can warn the user; arming itself
    /// never blocks on it.
    pub fn can_schedule_exact(&self) -> bool {
        self.timers.can_schedule_exact()
    }

    pub fn is_enabled(&self) -> bool {
        match self.store.get_bool(KEY_ENABLED) {
            Ok(enabled) => enabled,
            Err(err) => {
                tracing::warn!(%err, "failed to read enabled flag, assuming disabled");
                false
            }
        }
    }

    /// Flag update and bulk (dis)arming as a single operation.
    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        if enabled {
            self.arm_all()
        } else {
            self.disarm_all()
        }
    }

    pub fn arm_all(&self) -> Result<()> {
        self.arm_all_at(self.now())
    }

    /// Register a one-shot trigger for every (day, entry) pair of both
    /// groups, clearing the full reserved id space first so a rearm never
    /// leaves duplicate or stale registrations behind. Persists the enabled
    /// flag once every trigger is registered.
    pub fn arm_all_at(&self, now: DateTime<FixedOffset>) -> Result<()> {
        if !self.timers.can_schedule_exact() {
            tracing::warn!("exact scheduling unavailable, reminders may fire late");
        }
        self.cancel_reserved();

        let set = self.schedules();
        let mut armed = 0usize;
        for (day_offset, weekday) in self.week_plan.multi_days().iter().enumerate() {
            for (entry_index, entry) in set.multi_day.iter().enumerate() {
                self.arm_entry(
                    ScheduleGroup::MultiDay,
                    day_offset as u32,
                    entry_index as u32,
                    *weekday,
                    entry,
                    now,
                )?;
                armed += 1;
            }
        }
        for (entry_index, entry) in set.single_day.iter().enumerate() {
            self.arm_entry(
                ScheduleGroup::SingleDay,
                0,
                entry_index as u32,
                self.week_plan.single_day(),
                entry,
                now,
            )?;
            armed += 1;
        }

        self.store
            .set_bool(KEY_ENABLED, true)
            .context("persisting enabled flag")?;
        tracing::info!(armed, "armed weekly reminder triggers");
        Ok(())
    }

    /// Cancel every id in both reserved ranges and persist the flag as
    /// disabled. Idempotent; unknown ids cancel as no-ops.
    pub fn disarm_all(&self) -> Result<()> {
        self.cancel_reserved();
        self.store
            .set_bool(KEY_ENABLED, false)
            .context("persisting enabled flag")?;
        tracing::info!("disarmed all reminder triggers");
        Ok(())
    }

    /// Current schedule lists, falling back to the built-in defaults when
    /// nothing is persisted yet or the persisted state is unreadable.
    pub fn schedules(&self) -> ScheduleSet {
        ScheduleSet {
            multi_day: self
                .load_entries(KEY_MULTI_DAY)
                .unwrap_or_else(default_multi_day_entries),
            single_day: self
                .load_entries(KEY_SINGLE_DAY)
                .unwrap_or_else(default_single_day_entries),
        }
    }

    /// Persist a replacement schedule set wholesale. Entry lists longer than
    /// the reserved id span per day are rejected up front.
    pub fn save_schedules(&self, set: &ScheduleSet) -> Result<()> {
        ensure!(
            set.multi_day.len() <= ENTRY_SLOTS_PER_DAY as usize,
            "multi-day list has {} entries, more than the {ENTRY_SLOTS_PER_DAY} reserved per day",
            set.multi_day.len(),
        );
        ensure!(
            set.single_day.len() <= ENTRY_SLOTS_PER_DAY as usize,
            "single-day list has {} entries, more than the {ENTRY_SLOTS_PER_DAY} reserved per day",
            set.single_day.len(),
        );

        let multi = serde_json::to_string(&set.multi_day).context("serializing multi-day list")?;
        let single =
            serde_json::to_string(&set.single_day).context("serializing single-day list")?;
        self.store
            .set(KEY_MULTI_DAY, &multi)
            .context("persisting multi-day list")?;
        self.store
            .set(KEY_SINGLE_DAY, &single)
            .context("persisting single-day list")?;
        Ok(())
    }

    pub fn handle_fire(&self, payload: &FirePayload) {
        self.handle_fire_at(payload, self.now());
    }

    /// Reaction to a fired trigger: deliver the alert, then re-register the
    /// same id for the next weekly occurrence. The payload carries the
    /// entry's own weekday and wall-clock time, so no persisted state is
    /// consulted. Since the firing happened at or near the scheduled time,
    /// the next occurrence strictly after `now` lands one week out.
    pub fn handle_fire_at(&self, payload: &FirePayload, now: DateTime<FixedOffset>) {
        self.alerts.deliver(&payload.label, payload.trigger_id);

        let Some(time_of_day) = payload.time_of_day() else {
            tracing::warn!(
                id = %payload.trigger_id,
                hour = payload.hour,
                minute = payload.minute,
                "fired payload carries an invalid time of day, trigger lapses"
            );
            return;
        };
        let fire_at = next_occurrence(payload.weekday, time_of_day, &now);
        tracing::debug!(id = %payload.trigger_id, %fire_at, "rearming trigger");
        self.register(payload.trigger_id, fire_at.with_timezone(&Utc), payload.clone());
    }

    fn arm_entry(
        &self,
        group: ScheduleGroup,
        day_offset: u32,
        entry_index: u32,
        weekday: Weekday,
        entry: &ScheduleEntry,
        now: DateTime<FixedOffset>,
    ) -> Result<()> {
        let id = allocate_id(group, day_offset, entry_index)?;
        let fire_at = next_occurrence(weekday, entry.time_of_day(), &now);
        let payload = FirePayload {
            trigger_id: id,
            label: entry.message().to_string(),
            weekday,
            hour: entry.hour(),
            minute: entry.minute(),
        };
        self.register(id, fire_at.with_timezone(&Utc), payload);
        Ok(())
    }

    fn register(&self, id: TriggerId, fire_at: DateTime<Utc>, payload: FirePayload) {
        match self.timers.schedule_exact(id, fire_at, payload.clone()) {
            Ok(()) => {
                tracing::debug!(%id, %fire_at, label = payload.label.as_str(), "registered trigger");
            }
            Err(ExactSchedulingDenied) => {
                tracing::warn!(%id, %fire_at, "exact scheduling denied, registering inexact trigger");
                self.timers.schedule_inexact(id, fire_at, payload);
            }
        }
    }

    fn cancel_reserved(&self) {
        for group in [ScheduleGroup::MultiDay, ScheduleGroup::SingleDay] {
            for id in reserved_ids(group) {
                self.timers.cancel(id);
            }
        }
    }

    fn load_entries(&self, key: &str) -> Option<Vec<ScheduleEntry>> {
        let raw = match self.store.get(key) {
            Ok(value) => value?,
            Err(err) => {
                tracing::warn!(key, %err, "schedule store read failed, using built-in defaults");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => Some(entries),
            Err(err) => {
                tracing::warn!(key, %err, "persisted schedule list is unreadable, using built-in defaults");
                None
            }
        }
    }
}
