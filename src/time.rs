//! Seconds-since-midnight time representation.
//!
//! GTFS service days are not bounded by 24:00:00 — a trip departing at
//! "25:05:00" runs at 1:05 AM the *next* calendar day but belongs to the
//! service day it was scheduled against. Hours are therefore parsed without
//! clamping.

use std::fmt;

/// A point in time expressed as seconds since the start of a service day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(u32);

impl Time {
    pub const fn from_seconds(seconds: u32) -> Self {
        Self(seconds)
    }

    pub const fn as_seconds(&self) -> u32 {
        self.0
    }

    /// Parses a GTFS `H:MM:SS` timestamp. `H` may exceed 23.
    pub fn parse_hms(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let mut parts = raw.split(':');
        let hours: u32 = parts.next()?.parse().ok()?;
        let minutes: u32 = parts.next()?.parse().ok()?;
        let seconds: u32 = parts.next()?.parse().ok()?;
        if parts.next().is_some() || minutes >= 60 || seconds >= 60 {
            return None;
        }
        Some(Self(hours * 3600 + minutes * 60 + seconds))
    }

    pub fn to_hms_string(&self) -> String {
        let hours = self.0 / 3600;
        let minutes = (self.0 % 3600) / 60;
        let seconds = self.0 % 60;
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hms_string())
    }
}

impl std::ops::Add<u32> for Time {
    type Output = Time;

    fn add(self, rhs: u32) -> Time {
        Time(self.0 + rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ordinary_time() {
        assert_eq!(Time::parse_hms("08:15:30"), Some(Time(8 * 3600 + 15 * 60 + 30)));
    }

    #[test]
    fn parses_post_midnight_hours_without_clamping() {
        assert_eq!(Time::parse_hms("25:05:00"), Some(Time(25 * 3600 + 5 * 60)));
    }

    #[test]
    fn rejects_out_of_range_minutes_or_seconds() {
        assert_eq!(Time::parse_hms("08:60:00"), None);
        assert_eq!(Time::parse_hms("08:00:60"), None);
    }

    #[test]
    fn rejects_malformed_strings() {
        assert_eq!(Time::parse_hms(""), None);
        assert_eq!(Time::parse_hms("08:15"), None);
        assert_eq!(Time::parse_hms("not-a-time"), None);
    }

    #[test]
    fn round_trips_through_display() {
        let t = Time::parse_hms("25:05:00").unwrap();
        assert_eq!(t.to_hms_string(), "25:05:00");
    }

    #[test]
    fn add_seconds_advances_time() {
        let t = Time::from_seconds(60) + 30;
        assert_eq!(t.as_seconds(), 90);
    }
}
