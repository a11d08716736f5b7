//! Artifact timestamps.

use std::fmt;

use chrono::{DateTime, FixedOffset, Local, TimeZone};

/// Format of the timestamp embedded in artifact names.
///
/// Fixed width, so for a given UTC offset the lexicographic order of
/// formatted timestamps is their chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%z";

/// Point in time a dump round was taken at.
///
/// Compares by instant, whatever the offset it was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    /// The current local time.
    pub fn now() -> Self {
        Self(Local::now().fixed_offset())
    }

    /// Parse a timestamp formatted with [`TIMESTAMP_FORMAT`].
    pub fn parse(value: &str) -> Option<Self> {
        DateTime::parse_from_str(value, TIMESTAMP_FORMAT)
            .ok()
            .map(Self)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(value: DateTime<Tz>) -> Self {
        Self(value.fixed_offset())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(offset_secs: i32, y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Timestamp {
        FixedOffset::east_opt(offset_secs)
            .and_then(|tz| tz.with_ymd_and_hms(y, mo, d, h, mi, s).single())
            .map(Timestamp::from)
            .expect("valid test date")
    }

    #[test]
    fn format() {
        assert_eq!(at(0, 2024, 3, 9, 4, 5, 6).to_string(), "20240309T040506+0000");
        assert_eq!(
            at(2 * 3600, 2024, 12, 31, 23, 59, 59).to_string(),
            "20241231T235959+0200"
        );
        assert_eq!(
            at(-(5 * 3600 + 30 * 60), 2024, 1, 1, 0, 0, 0).to_string(),
            "20240101T000000-0530"
        );
    }

    #[test]
    fn parse_round_trips_format() {
        let ts = at(3600, 2023, 7, 14, 12, 0, 1);
        assert_eq!(Timestamp::parse(&ts.to_string()), Some(ts));
    }

    #[test]
    fn parse_rejects_other_shapes() {
        assert_eq!(Timestamp::parse("20240309T040506"), None);
        assert_eq!(Timestamp::parse("20240309T040506+0000-schema"), None);
        assert_eq!(Timestamp::parse("latest"), None);
    }

    #[test]
    fn name_order_is_time_order() {
        let earlier = at(0, 2024, 1, 9, 23, 0, 0);
        let later = at(0, 2024, 1, 10, 1, 0, 0);
        assert!(earlier < later);
        assert!(earlier.to_string() < later.to_string());
    }

    #[test]
    fn order_follows_instant_across_offsets() {
        // 00:30Z, stamped before a fall-back from +0200 to +0100.
        let before = at(2 * 3600, 2024, 10, 27, 2, 30, 0);
        // 01:15Z, stamped after it.
        let after = at(3600, 2024, 10, 27, 2, 15, 0);
        assert!(before < after);
        assert!(before.to_string() > after.to_string());
    }
}
