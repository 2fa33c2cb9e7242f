use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::trigger::MULTI_DAY_SLOTS;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("time of day must look like HH:MM, got {0:?}")]
    Malformed(String),
    #[error("hour {0} is out of range (0-23)")]
    HourOutOfRange(u32),
    #[error("minute {0} is out of range (0-59)")]
    MinuteOutOfRange(u32),
    #[error("stored hour/minute {hour}:{minute:02} disagree with time field {time:?}")]
    Inconsistent { time: String, hour: u32, minute: u32 },
}

/// One weekly reminder: a canonical "HH:MM" wall-clock time and a message.
///
/// `hour` and `minute` are always derived from `time`; entries that would
/// break that invariant are rejected at construction and at deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawScheduleEntry")]
pub struct ScheduleEntry {
    time: String,
    message: String,
    hour: u32,
    minute: u32,
}

/// Wire shape of a persisted entry: `{time, message, hour, minute}`.
#[derive(Debug, Deserialize)]
struct RawScheduleEntry {
    time: String,
    message: String,
    hour: u32,
    minute: u32,
}

impl TryFrom<RawScheduleEntry> for ScheduleEntry {
    type Error = TimeParseError;

    fn try_from(raw: RawScheduleEntry) -> Result<Self, Self::Error> {
        let entry = ScheduleEntry::new(&raw.time, raw.message)?;
        if entry.hour != raw.hour || entry.minute != raw.minute {
            return Err(TimeParseError::Inconsistent {
                time: raw.time,
                hour: raw.hour,
                minute: raw.minute,
            });
        }
        Ok(entry)
    }
}

impl ScheduleEntry {
    pub fn new(time: &str, message: impl Into<String>) -> Result<Self, TimeParseError> {
        let (hour, minute) = parse_time_of_day(time)?;
        Ok(Self {
            time: time.to_string(),
            message: message.into(),
            hour,
            minute,
        })
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn time_of_day(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).expect("validated at construction")
    }
}

fn parse_time_of_day(input: &str) -> Result<(u32, u32), TimeParseError> {
    let malformed = || TimeParseError::Malformed(input.to_string());
    let (hour_part, minute_part) = input.split_once(':').ok_or_else(malformed)?;
    let hour: u32 = hour_part.trim().parse().map_err(|_| malformed())?;
    let minute: u32 = minute_part.trim().parse().map_err(|_| malformed())?;
    if hour > 23 {
        return Err(TimeParseError::HourOutOfRange(hour));
    }
    if minute > 59 {
        return Err(TimeParseError::MinuteOutOfRange(minute));
    }
    Ok((hour, minute))
}

/// Which weekly bucket an entry belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ScheduleGroup {
    MultiDay,
    SingleDay,
}

/// The two ordered entry lists. Replaced wholesale on edit; entry order
/// determines trigger identity, so reordering changes which id fires which
/// entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleSet {
    pub multi_day: Vec<ScheduleEntry>,
    pub single_day: Vec<ScheduleEntry>,
}

impl Default for ScheduleSet {
    fn default() -> Self {
        Self {
            multi_day: default_multi_day_entries(),
            single_day: default_single_day_entries(),
        }
    }
}

fn builtin(time: &str, message: &str) -> ScheduleEntry {
    ScheduleEntry::new(time, message).expect("built-in schedule times are well formed")
}

pub fn default_multi_day_entries() -> Vec<ScheduleEntry> {
    vec![
        builtin("07:25", "Waktunya Absen Pagi"),
        builtin("13:00", "Waktunya Absen Siang"),
        builtin("16:15", "Waktunya Absen Sore"),
    ]
}

pub fn default_single_day_entries() -> Vec<ScheduleEntry> {
    vec![
        builtin("07:10", "Waktunya Absen Pagi"),
        builtin("11:45", "Waktunya Absen Sore"),
    ]
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WeekPlanError {
    #[error("multi-day group needs at least one weekday")]
    EmptyMultiDayGroup,
    #[error("multi-day group lists {0} weekdays, more than the {MULTI_DAY_SLOTS} reserved day slots")]
    TooManyDays(usize),
    #[error("weekday {0} appears more than once in the multi-day group")]
    DuplicateDay(Weekday),
}

/// Maps the two groups onto concrete weekdays. The multi-day group spans an
/// ordered list of weekdays; the single-day group covers exactly one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeekPlan {
    multi_days: Vec<Weekday>,
    single_day: Weekday,
}

impl WeekPlan {
    pub fn new(multi_days: Vec<Weekday>, single_day: Weekday) -> Result<Self, WeekPlanError> {
        if multi_days.is_empty() {
            return Err(WeekPlanError::EmptyMultiDayGroup);
        }
        if multi_days.len() > MULTI_DAY_SLOTS as usize {
            return Err(WeekPlanError::TooManyDays(multi_days.len()));
        }
        for (idx, day) in multi_days.iter().enumerate() {
            if multi_days[..idx].contains(day) {
                return Err(WeekPlanError::DuplicateDay(*day));
            }
        }
        Ok(Self {
            multi_days,
            single_day,
        })
    }

    pub fn multi_days(&self) -> &[Weekday] {
        &self.multi_days
    }

    pub fn single_day(&self) -> Weekday {
        self.single_day
    }
}

impl Default for WeekPlan {
    fn default() -> Self {
        Self {
            multi_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
            ],
            single_day: Weekday::Fri,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_times() {
        let entry = ScheduleEntry::new("07:25", "Waktunya Absen Pagi").expect("valid entry");
        assert_eq!(entry.hour(), 7);
        assert_eq!(entry.minute(), 25);
        assert_eq!(entry.time(), "07:25");
        assert_eq!(
            entry.time_of_day(),
            NaiveTime::from_hms_opt(7, 25, 0).unwrap()
        );
    }

    #[test]
    fn rejects_malformed_and_out_of_range_times() {
        assert_eq!(
            ScheduleEntry::new("0725", "x").unwrap_err(),
            TimeParseError::Malformed("0725".to_string())
        );
        assert_eq!(
            ScheduleEntry::new("ab:cd", "x").unwrap_err(),
            TimeParseError::Malformed("ab:cd".to_string())
        );
        assert_eq!(
            ScheduleEntry::new("24:00", "x").unwrap_err(),
            TimeParseError::HourOutOfRange(24)
        );
        assert_eq!(
            ScheduleEntry::new("07:60", "x").unwrap_err(),
            TimeParseError::MinuteOutOfRange(60)
        );
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let entry = ScheduleEntry::new("13:00", "Waktunya Absen Siang").expect("valid entry");
        let json = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(json["time"], "13:00");
        assert_eq!(json["message"], "Waktunya Absen Siang");
        assert_eq!(json["hour"], 13);
        assert_eq!(json["minute"], 0);
    }

    #[test]
    fn deserialization_rejects_inconsistent_fields() {
        let json = r#"{"time":"07:25","message":"x","hour":8,"minute":25}"#;
        let err = serde_json::from_str::<ScheduleEntry>(json).unwrap_err();
        assert!(err.to_string().contains("disagree"));
    }

    #[test]
    fn deserialization_rejects_out_of_range_hour() {
        let json = r#"{"time":"25:00","message":"x","hour":25,"minute":0}"#;
        assert!(serde_json::from_str::<ScheduleEntry>(json).is_err());
    }

    #[test]
    fn default_set_matches_builtin_schedule() {
        let set = ScheduleSet::default();
        let times: Vec<&str> = set.multi_day.iter().map(|e| e.time()).collect();
        assert_eq!(times, vec!["07:25", "13:00", "16:15"]);
        let times: Vec<&str> = set.single_day.iter().map(|e| e.time()).collect();
        assert_eq!(times, vec!["07:10", "11:45"]);
    }

    #[test]
    fn week_plan_defaults_to_mon_thu_and_fri() {
        let plan = WeekPlan::default();
        assert_eq!(
            plan.multi_days(),
            &[Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu]
        );
        assert_eq!(plan.single_day(), Weekday::Fri);
    }

    #[test]
    fn week_plan_rejects_duplicates_and_empty_groups() {
        assert_eq!(
            WeekPlan::new(vec![], Weekday::Fri).unwrap_err(),
            WeekPlanError::EmptyMultiDayGroup
        );
        assert_eq!(
            WeekPlan::new(vec![Weekday::Mon, Weekday::Mon], Weekday::Fri).unwrap_err(),
            WeekPlanError::DuplicateDay(Weekday::Mon)
        );
    }
}
