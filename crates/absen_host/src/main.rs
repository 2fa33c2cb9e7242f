use std::sync::Arc;

use absen_core::memory::{MemoryStore, MemoryTimer, RecordingAlertSink};
use absen_core::ReminderService;
use anyhow::Result;

fn main() {
    tracing_subscriber::fmt::init();
    if let Err(err) = run() {
        eprintln!("Failed to start absen host: {err}");
    }
}

/// Arms the built-in weekly schedule against the in-memory facilities and
/// logs what got registered. Platform deployments swap the adapters for real
/// store/timer/alert implementations.
fn run() -> Result<()> {
    let timers = Arc::new(MemoryTimer::new());
    let service = ReminderService::builder()
        .with_store(Arc::new(MemoryStore::new()))
        .with_timers(timers.clone())
        .with_alert_sink(Arc::new(RecordingAlertSink::new()))
        .build()?;

    if !service.can_schedule_exact() {
        tracing::warn!("exact scheduling unavailable, reminders may fire late");
    }
    service.set_enabled(true)?;

    let timezone = service.timezone();
    for (id, registration) in timers.registrations() {
        tracing::info!(
            %id,
            label = registration.payload.label.as_str(),
            fire_at = %registration.fire_at.with_timezone(&timezone),
            exact = registration.exact,
            "armed trigger"
        );
    }
    Ok(())
}
