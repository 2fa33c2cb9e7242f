use std::sync::Arc;

use absen_core::memory::{MemoryStore, MemoryTimer, RecordingAlertSink};
use absen_core::schedule::{ScheduleEntry, ScheduleSet, WeekPlan};
use absen_core::trigger::TriggerId;
use absen_core::ReminderService;
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Weekday};

fn wib_datetime(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(7 * 3600)
        .expect("valid offset")
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .expect("unambiguous local time")
}

#[test]
fn weekly_reminder_lifecycle_round_trip() {
    let store = Arc::new(MemoryStore::new());
    let timers = Arc::new(MemoryTimer::new());
    let alerts = Arc::new(RecordingAlertSink::new());
    let service = ReminderService::builder()
        .with_store(store)
        .with_timers(timers.clone())
        .with_alert_sink(alerts.clone())
        .with_week_plan(
            WeekPlan::new(vec![Weekday::Mon, Weekday::Wed], Weekday::Fri).expect("valid plan"),
        )
        .build()
        .expect("build service");

    let set = ScheduleSet {
        multi_day: vec![
            ScheduleEntry::new("09:00", "Standup").expect("valid entry"),
            ScheduleEntry::new("17:30", "Wrap up").expect("valid entry"),
        ],
        single_day: vec![ScheduleEntry::new("16:00", "Weekly review").expect("valid entry")],
    };
    service.save_schedules(&set).expect("save schedules");
    assert_eq!(service.schedules(), set);

    // Sunday evening: everything lands in the coming week.
    let sunday = wib_datetime(2025, 11, 2, 20, 0);
    service.arm_all_at(sunday).expect("arm");
    assert!(service.is_enabled());

    let registrations = timers.registrations();
    assert_eq!(registrations.len(), 2 * 2 + 1);
    for registration in registrations.values() {
        assert!(registration.fire_at > sunday.with_timezone(&chrono::Utc));
        assert!(registration.exact);
    }

    // Monday 09:00 fires; the handler alerts and rearms the same id a week
    // out.
    let monday_standup = timers.fire(TriggerId(1000)).expect("standup registration");
    service.handle_fire_at(&monday_standup.payload, wib_datetime(2025, 11, 3, 9, 0));
    assert_eq!(
        alerts.delivered(),
        vec![("Standup".to_string(), TriggerId(1000))]
    );
    let rearmed = timers.registrations()[&TriggerId(1000)].clone();
    assert_eq!(rearmed.fire_at - monday_standup.fire_at, Duration::days(7));
    assert_eq!(rearmed.payload, monday_standup.payload);

    // Drop the evening entry, then rebuild the registrations from scratch.
    let trimmed = ScheduleSet {
        multi_day: vec![ScheduleEntry::new("09:00", "Standup").expect("valid entry")],
        single_day: set.single_day.clone(),
    };
    service.save_schedules(&trimmed).expect("save trimmed");
    service.disarm_all().expect("disarm");
    service.arm_all_at(sunday).expect("rearm");

    let registrations = timers.registrations();
    assert_eq!(registrations.len(), 2 + 1);
    // The Wrap up slots (entry index 1 on both multi-day offsets) are gone.
    assert!(!registrations.contains_key(&TriggerId(1001)));
    assert!(!registrations.contains_key(&TriggerId(1011)));

    service.set_enabled(false).expect("disable");
    assert!(!service.is_enabled());
    assert!(timers.registrations().is_empty());
}
