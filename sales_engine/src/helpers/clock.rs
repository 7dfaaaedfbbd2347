use chrono::{Days, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeDelta, Timelike, Utc};
use log::*;

/// Payment timestamps arrive from the feed this many hours ahead of local wall-clock time.
pub const SOURCE_UTC_OFFSET_HOURS: i64 = 3;

/// From this local hour onwards the feed already reports sales against the next calendar day.
pub const DAY_ROLLOVER_HOUR: u32 = 21;

/// Converts a feed timestamp to local wall-clock time.
pub fn to_local_time(source: NaiveDateTime) -> NaiveDateTime {
    source - TimeDelta::hours(SOURCE_UTC_OFFSET_HOURS)
}

/// The calendar day to request from the feed at local time `now`: the current day until 21:00, the next one after.
pub fn adjusted_day(now: NaiveDateTime) -> NaiveDate {
    let today = now.date();
    if now.hour() < DAY_ROLLOVER_HOUR {
        today
    } else {
        today.checked_add_days(Days::new(1)).unwrap_or(today)
    }
}

/// The local wall clock. Can be frozen at a fixed instant for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct LocalClock {
    offset: FixedOffset,
    frozen: Option<NaiveDateTime>,
}

impl Default for LocalClock {
    fn default() -> Self {
        Self::with_offset_hours(-(SOURCE_UTC_OFFSET_HOURS as i32))
    }
}

impl LocalClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset, frozen: None }
    }

    /// Falls back to UTC for offsets outside ±23 hours.
    pub fn with_offset_hours(hours: i32) -> Self {
        let offset = FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| {
            warn!("🕰️ {hours}h is not a valid UTC offset. Using UTC.");
            Utc.fix()
        });
        Self::new(offset)
    }

    pub fn frozen_at(time: NaiveDateTime) -> Self {
        Self { frozen: Some(time), ..Self::default() }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.frozen.unwrap_or_else(|| Utc::now().with_timezone(&self.offset).naive_local())
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }

    pub fn adjusted_day(&self) -> NaiveDate {
        adjusted_day(self.now())
    }
}
