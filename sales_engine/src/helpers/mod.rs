mod clock;

pub use clock::{adjusted_day, to_local_time, LocalClock, DAY_ROLLOVER_HOUR, SOURCE_UTC_OFFSET_HOURS};
