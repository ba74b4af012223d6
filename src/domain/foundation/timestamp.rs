//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Returns the current time, or one microsecond past `previous` when the
    /// clock has not advanced beyond it.
    ///
    /// Storage round-trips keep microsecond precision, so the step is chosen
    /// to survive a save/load cycle.
    pub fn strictly_after(previous: &Timestamp) -> Self {
        let now = Self::now().trunc_micros().0;
        let floor = previous.0 + Duration::microseconds(1);
        Self(if now >= floor { now } else { floor })
    }

    /// Truncates to microsecond precision, matching what the primary store
    /// keeps.
    pub fn trunc_micros(&self) -> Self {
        let micros = self.0.timestamp_micros();
        Self(DateTime::from_timestamp_micros(micros).unwrap_or(self.0))
    }

}

#[cfg(test)]
impl Timestamp {
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    pub fn from_unix_secs(secs: i64) -> Self {
        Self(DateTime::from_timestamp(secs, 0).unwrap_or_default())
    }

    pub fn as_unix_secs(&self) -> i64 {
        self.0.timestamp()
    }

    pub fn plus_secs(&self, secs: i64) -> Self {
        Self(self.0 + Duration::seconds(secs))
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn strictly_after_moves_past_future_timestamp() {
        let future = Timestamp::now().plus_secs(60);
        let next = Timestamp::strictly_after(&future);
        assert!(next.is_after(&future));
    }

    #[test]
    fn strictly_after_uses_clock_when_ahead() {
        let past = Timestamp::from_unix_secs(1_000);
        let next = Timestamp::strictly_after(&past);
        assert!(next.is_after(&past));
        assert!(next.as_unix_secs() > 1_000_000);
    }

    #[test]
    fn trunc_micros_drops_nanoseconds() {
        let dt = DateTime::parse_from_rfc3339("2024-01-15T10:30:00.123456789Z")
            .unwrap()
            .with_timezone(&Utc);
        let ts = Timestamp::from_datetime(dt).trunc_micros();
        assert_eq!(ts.as_datetime().timestamp_subsec_nanos(), 123_456_000);
    }

    #[test]
    fn timestamp_deserializes_from_json() {
        let json = "\"2024-01-15T10:30:00Z\"";
        let ts: Timestamp = serde_json::from_str(json).unwrap();

        assert_eq!(ts.as_datetime().year(), 2024);
    }

    #[test]
    fn timestamp_plus_secs_adds_correctly() {
        let ts1 = Timestamp::from_unix_secs(1000);
        let ts2 = ts1.plus_secs(60);
        assert_eq!(ts2.as_unix_secs(), 1060);
    }
}
