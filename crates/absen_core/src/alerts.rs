use crate::trigger::TriggerId;

/// Platform-specific alert adapters will implement this trait. Delivery is
/// opaque to the core: device wake, sound, vibration and lock-screen
/// behaviour all live behind it.
pub trait AlertSink: Send + Sync {
    fn deliver(&self, label: &str, trigger_id: TriggerId);
}
