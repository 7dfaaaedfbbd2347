use chrono::NaiveDate;
use sales_common::{DateRange, DateRangeError};
use serde::{Deserialize, Serialize};

/// Query string of `POST /api/sync`. `data` is `DD/MM/YYYY` or `DD/MM/YYYY/DD/MM/YYYY`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncParams {
    pub data: Option<String>,
}

/// Query string for the range-based routes. Both ends are `YYYY-MM-DD` and inclusive. A missing `end` means a single
/// day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RangeParams {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl RangeParams {
    /// The requested range, or `today` when no `start` is given.
    pub fn to_range(&self, today: NaiveDate) -> Result<DateRange, DateRangeError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => DateRange::new(start, end),
            (Some(start), None) => Ok(DateRange::single(start)),
            (None, Some(end)) => Ok(DateRange::single(end)),
            (None, None) => Ok(DateRange::single(today)),
        }
    }
}
