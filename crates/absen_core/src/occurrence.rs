use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Weekday};

/// Next instant strictly after `now` that falls on `weekday` at
/// `time_of_day` in `now`'s timezone.
///
/// The candidate date is found in naive local time and converted once, so
/// the wall-clock target survives offset changes; a local time skipped by a
/// transition rolls forward a week to the next realizable occurrence.
pub fn next_occurrence<Tz: TimeZone>(
    weekday: Weekday,
    time_of_day: NaiveTime,
    now: &DateTime<Tz>,
) -> DateTime<Tz> {
    let today = now.date_naive();
    let days_ahead = i64::from(weekday.num_days_from_monday())
        - i64::from(today.weekday().num_days_from_monday());
    let mut date = today + Duration::days(days_ahead.rem_euclid(7));

    loop {
        if let Some(candidate) = now
            .timezone()
            .from_local_datetime(&date.and_time(time_of_day))
            .earliest()
        {
            if candidate > *now {
                return candidate;
            }
        }
        date = date + Duration::days(7);
    }
}
