use std::time::Duration;

/// Exponential backoff before retry number `attempt` (1-based): `min * 2^(attempt - 1)`, capped at `max`.
pub fn backoff_delay(attempt: u32, min: Duration, max: Duration) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    min.saturating_mul(factor).min(max).max(min.min(max))
}
