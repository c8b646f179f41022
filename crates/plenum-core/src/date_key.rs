//! Calendar-date keys for grouping floor sessions and recordings.
//!
//! Both corpora are bucketed by the calendar date of the sitting. The date is
//! carried in file names as a hyphenated token and, for floor-session
//! documents, optionally in the root element's `sitzung-datum` attribute.
//!
//! # Accepted forms
//!
//! - File name token: `DD-MM-YYYY` or `DD-MM-YY` anywhere in the name
//!   (`01-02-2025_Plenarsitzung.csv`, `sitzung_01-02-25.xml`)
//! - Session attribute: `DD.MM.YYYY`
//! - Two-digit years are read as 20YY
//!
//! Keys always render as `DD-MM-YYYY`, so `01-02-25` and `01-02-2025` land in
//! the same bucket.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

static DATE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\D)(\d{2})-(\d{2})-(\d{4}|\d{2})(?:\D|$)").expect("static regex")
});

/// A calendar date used to bucket sessions and recordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Build from day, month and a two- or four-digit year.
    pub fn from_parts(day: u32, month: u32, year: i32) -> Option<Self> {
        let year = if year < 100 { 2000 + year } else { year };
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parse the `DD.MM.YYYY` form used by the `sitzung-datum` attribute.
    pub fn from_session_attr(s: &str) -> Option<Self> {
        let mut parts = s.trim().split('.');
        let day = parts.next()?.parse().ok()?;
        let month = parts.next()?.parse().ok()?;
        let year = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Self::from_parts(day, month, year)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}-{:02}-{:04}",
            self.0.day(),
            self.0.month(),
            self.0.year()
        )
    }
}

impl FromStr for DateKey {
    type Err = InvalidDateKey;

    /// Parse a bare `DD-MM-YYYY` / `DD-MM-YY` key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        date_key_from_name(s)
            .filter(|_| s.len() <= "DD-MM-YYYY".len())
            .ok_or_else(|| InvalidDateKey(s.to_string()))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("not a DD-MM-YYYY date key: {0:?}")]
pub struct InvalidDateKey(pub String);

/// Extract the first valid date token from a file name.
///
/// Returns `None` when the name carries no token or the token is not a real
/// calendar date (`31-02-2025`).
pub fn date_key_from_name(name: &str) -> Option<DateKey> {
    DATE_TOKEN.captures_iter(name).find_map(|caps| {
        let day = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let year = caps[3].parse().ok()?;
        DateKey::from_parts(day, month, year)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(d: u32, m: u32, y: i32) -> DateKey {
        DateKey::from_parts(d, m, y).unwrap()
    }

    #[test]
    fn four_digit_year_in_recording_name() {
        assert_eq!(
            date_key_from_name("01-02-2025_Bundestag Live Plenarsitzung"),
            Some(key(1, 2, 2025))
        );
    }

    #[test]
    fn two_digit_year_reads_as_2000s() {
        assert_eq!(date_key_from_name("sitzung_01-02-25.xml"), Some(key(1, 2, 2025)));
    }

    #[test]
    fn short_and_long_year_share_a_bucket() {
        assert_eq!(
            date_key_from_name("01-02-25").map(|k| k.to_string()),
            date_key_from_name("01-02-2025").map(|k| k.to_string())
        );
    }

    #[test]
    fn display_is_zero_padded() {
        assert_eq!(key(3, 9, 2025).to_string(), "03-09-2025");
    }

    #[test]
    fn invalid_calendar_date_is_rejected() {
        assert_eq!(date_key_from_name("31-02-2025_video"), None);
        assert_eq!(date_key_from_name("01-13-2025_video"), None);
    }

    #[test]
    fn names_without_token() {
        assert_eq!(date_key_from_name("21_23_cut.xml"), None);
        assert_eq!(date_key_from_name(""), None);
    }

    #[test]
    fn longer_digit_runs_are_not_a_token() {
        assert_eq!(date_key_from_name("101-02-2025"), None);
        assert_eq!(date_key_from_name("01-02-202"), None);
    }

    #[test]
    fn later_valid_token_is_found() {
        assert_eq!(
            date_key_from_name("99-99-9999 then 05-06-2024"),
            Some(key(5, 6, 2024))
        );
    }

    #[test]
    fn session_attribute_form() {
        assert_eq!(DateKey::from_session_attr("23.09.2025"), Some(key(23, 9, 2025)));
        assert_eq!(DateKey::from_session_attr(" 1.2.2025 "), Some(key(1, 2, 2025)));
        assert_eq!(DateKey::from_session_attr("2025-09-23"), None);
        assert_eq!(DateKey::from_session_attr("23.09.2025.1"), None);
    }

    #[test]
    fn from_str_roundtrip() {
        let k: DateKey = "01-02-2025".parse().unwrap();
        assert_eq!(k.to_string().parse::<DateKey>().unwrap(), k);
        assert!("01-02-2025_video".parse::<DateKey>().is_err());
    }

    #[test]
    fn keys_order_chronologically() {
        let mut keys = vec![key(1, 3, 2025), key(28, 2, 2025), key(31, 12, 2024)];
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(rendered, ["31-12-2024", "28-02-2025", "01-03-2025"]);
    }
}
