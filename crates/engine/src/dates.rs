//! Display formatting of stored dates.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::validate::DATE_FORMAT;

/// Turns a raw stored date into a display string.
///
/// `descriptive` asks for a relative phrase ("3 days ago") instead of the
/// literal date.
pub trait DateFormatter {
    fn format_date(&self, raw: &str, descriptive: bool) -> String;
}

/// Formats dates in the user's time zone.
///
/// Stored dates are UTC.
#[derive(Clone, Debug)]
pub struct UserClock {
    timezone: Tz,
    pattern: String,
}

impl UserClock {
    pub const DEFAULT_PATTERN: &'static str = "%d %b %Y %H:%M";

    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            pattern: Self::DEFAULT_PATTERN.to_string(),
        }
    }

    /// Use a custom `strftime` pattern for literal dates.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Format `raw` as seen at `now`. Unparseable input is returned unchanged.
    pub fn format_at(&self, raw: &str, descriptive: bool, now: DateTime<Utc>) -> String {
        let Ok(naive) = NaiveDateTime::parse_from_str(raw, DATE_FORMAT) else {
            return raw.to_string();
        };
        let at = Utc.from_utc_datetime(&naive);

        if descriptive && let Some(phrase) = self.describe(at, now) {
            return phrase;
        }
        at.with_timezone(&self.timezone)
            .format(&self.pattern)
            .to_string()
    }

    fn describe(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> Option<String> {
        let elapsed = now.signed_duration_since(at);
        if elapsed.num_seconds() < 0 {
            return None;
        }

        let minutes = elapsed.num_minutes();
        let hours = elapsed.num_hours();
        let local_at = at.with_timezone(&self.timezone).date_naive();
        let local_now = now.with_timezone(&self.timezone).date_naive();
        let days = local_now.signed_duration_since(local_at).num_days();

        let phrase = match (minutes, hours, days) {
            (0, _, _) => "just now".to_string(),
            (1, _, _) => "1 minute ago".to_string(),
            (m, 0, _) => format!("{m} minutes ago"),
            (_, h, 0) => format!("{h} hour{} ago", if h == 1 { "" } else { "s" }),
            (_, _, 1) => "yesterday".to_string(),
            (_, _, d) if d < 7 => format!("{d} days ago"),
            _ => return None,
        };
        Some(phrase)
    }
}

impl Default for UserClock {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl DateFormatter for UserClock {
    fn format_date(&self, raw: &str, descriptive: bool) -> String {
        self.format_at(raw, descriptive, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2014, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn literal_dates_use_the_user_zone() {
        let clock = UserClock::new(chrono_tz::Europe::London);
        assert_eq!(
            clock.format_at("2014-07-01 08:15:00", false, now()),
            "01 Jul 2014 09:15"
        );
        let clock = UserClock::new(Tz::UTC).with_pattern("%Y/%m/%d");
        assert_eq!(clock.format_at("2014-07-01 08:15:00", false, now()), "2014/07/01");
    }

    #[test]
    fn descriptive_dates_are_relative() {
        let clock = UserClock::default();
        assert_eq!(clock.format_at("2014-03-10 11:59:30", true, now()), "just now");
        assert_eq!(clock.format_at("2014-03-10 11:59:00", true, now()), "1 minute ago");
        assert_eq!(clock.format_at("2014-03-10 11:35:00", true, now()), "25 minutes ago");
        assert_eq!(clock.format_at("2014-03-10 11:00:00", true, now()), "1 hour ago");
        assert_eq!(clock.format_at("2014-03-10 02:00:00", true, now()), "10 hours ago");
        assert_eq!(clock.format_at("2014-03-09 02:00:00", true, now()), "yesterday");
        assert_eq!(clock.format_at("2014-03-07 12:00:00", true, now()), "3 days ago");
    }

    #[test]
    fn old_or_future_dates_fall_back_to_literal() {
        let clock = UserClock::default();
        assert_eq!(
            clock.format_at("2014-01-01 00:00:00", true, now()),
            "01 Jan 2014 00:00"
        );
        assert_eq!(
            clock.format_at("2014-03-11 00:00:00", true, now()),
            "11 Mar 2014 00:00"
        );
    }

    #[test]
    fn unparseable_dates_are_returned_as_is() {
        let clock = UserClock::default();
        assert_eq!(clock.format_at("yesterday-ish", true, now()), "yesterday-ish");
    }
}
