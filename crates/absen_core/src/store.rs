use thiserror::Error;

/// Persisted key for the enabled flag.
pub const KEY_ENABLED: &str = "notification_enabled";
/// Persisted key for the multi-day entry list (JSON array).
pub const KEY_MULTI_DAY: &str = "weekday_schedules";
/// Persisted key for the single-day entry list (JSON array).
pub const KEY_SINGLE_DAY: &str = "friday_schedules";

#[derive(Debug, Error)]
#[error("schedule store unavailable: {0}")]
pub struct StoreError(pub String);

/// Durable key/value persistence of the schedule lists and enabled flag.
/// Platform adapters (shared preferences, a settings file) implement this;
/// reads and writes must each be atomic since the scheduling engine and the
/// fire handler may run in different execution contexts.
pub trait ScheduleStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn get_bool(&self, key: &str) -> Result<bool, StoreError>;
    fn set_bool(&self, key: &str, value: bool) -> Result<(), StoreError>;
}
