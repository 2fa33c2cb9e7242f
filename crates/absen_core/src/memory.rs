//! In-memory reference adapters, used by the test suites and the host
//! harness. Platform deployments substitute their own implementations.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};

use crate::alerts::AlertSink;
use crate::store::{ScheduleStore, StoreError};
use crate::timer::{ExactSchedulingDenied, FirePayload, TimerFacility};
use crate::trigger::TriggerId;

#[derive(Default)]
pub struct MemoryStore {
    strings: RwLock<HashMap<String, String>>,
    flags: RwLock<HashMap<String, bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScheduleStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.strings.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.strings
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_bool(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.flags.read().get(key).copied().unwrap_or(false))
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<(), StoreError> {
        self.flags.write().insert(key.to_string(), value);
        Ok(())
    }
}

/// One live timer registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub fire_at: DateTime<Utc>,
    pub payload: FirePayload,
    pub exact: bool,
}

/// Timer facility keeping registrations in a map, one slot per trigger id.
pub struct MemoryTimer {
    registrations: Mutex<BTreeMap<TriggerId, Registration>>,
    exact_allowed: AtomicBool,
}

impl MemoryTimer {
    pub fn new() -> Self {
        Self {
            registrations: Mutex::new(BTreeMap::new()),
            exact_allowed: AtomicBool::new(true),
        }
    }

    /// Simulate the platform revoking the exact-scheduling privilege.
    pub fn deny_exact(&self) {
        self.exact_allowed.store(false, Ordering::SeqCst);
    }

    pub fn registrations(&self) -> BTreeMap<TriggerId, Registration> {
        self.registrations.lock().clone()
    }

    /// Consume a registration the way a one-shot firing would, handing the
    /// caller what was registered.
    pub fn fire(&self, id: TriggerId) -> Option<Registration> {
        self.registrations.lock().remove(&id)
    }
}

impl Default for MemoryTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerFacility for MemoryTimer {
    fn schedule_exact(
        &self,
        id: TriggerId,
        fire_at: DateTime<Utc>,
        payload: FirePayload,
    ) -> Result<(), ExactSchedulingDenied> {
        if !self.exact_allowed.load(Ordering::SeqCst) {
            return Err(ExactSchedulingDenied);
        }
        self.registrations.lock().insert(
            id,
            Registration {
                fire_at,
                payload,
                exact: true,
            },
        );
        Ok(())
    }

    fn schedule_inexact(&self, id: TriggerId, fire_at: DateTime<Utc>, payload: FirePayload) {
        self.registrations.lock().insert(
            id,
            Registration {
                fire_at,
                payload,
                exact: false,
            },
        );
    }

    fn cancel(&self, id: TriggerId) {
        self.registrations.lock().remove(&id);
    }

    fn can_schedule_exact(&self) -> bool {
        self.exact_allowed.load(Ordering::SeqCst)
    }
}

/// Alert sink that records deliveries for inspection.
#[derive(Default)]
pub struct RecordingAlertSink {
    delivered: Mutex<Vec<(String, TriggerId)>>,
}

impl RecordingAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<(String, TriggerId)> {
        self.delivered.lock().clone()
    }
}

impl AlertSink for RecordingAlertSink {
    fn deliver(&self, label: &str, trigger_id: TriggerId) {
        self.delivered.lock().push((label.to_string(), trigger_id));
    }
}
