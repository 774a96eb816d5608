use chrono::{DateTime, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Seconds since the Unix epoch, as carried in token claims.
pub fn unix_seconds(dt: DateTime<Utc>) -> usize {
    dt.timestamp().max(0) as usize
}
