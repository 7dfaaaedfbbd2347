mod date_range;
pub mod helpers;
mod secret;

pub use date_range::{parse_iso_day, DateRange, DateRangeError};
pub use secret::Secret;
