// src/worker/tags.rs

//! Backup tag set: operator tags plus a generated timestamp tag.

use chrono::{DateTime, Local, TimeZone};

/// `YYYYMMDDHHMMSS`, always 14 digits.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

pub fn timestamp_tag<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// Operator tags in their original order, followed by exactly one timestamp
/// tag for `now`.
pub fn backup_tags<Tz>(operator_tags: &[String], now: &DateTime<Tz>) -> Vec<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut tags = Vec::with_capacity(operator_tags.len() + 1);
    tags.extend(operator_tags.iter().cloned());
    tags.push(timestamp_tag(now));
    tags
}

/// [`backup_tags`] against the local clock.
pub fn backup_tags_now(operator_tags: &[String]) -> Vec<String> {
    backup_tags(operator_tags, &Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn timestamp_is_zero_padded() {
        let at = NaiveDate::from_ymd_opt(2026, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
            .and_utc();
        assert_eq!(timestamp_tag(&at), "20260102030405");
    }

    #[test]
    fn operator_tags_come_first() {
        let at = Utc::now();
        let tags = backup_tags(&["nightly".to_string(), "db".to_string()], &at);
        assert_eq!(tags.len(), 3);
        assert_eq!(&tags[..2], ["nightly", "db"]);
        assert_eq!(tags[2], timestamp_tag(&at));
    }

    #[test]
    fn no_operator_tags_still_gets_timestamp() {
        let tags = backup_tags_now(&[]);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].len(), 14);
        assert!(tags[0].chars().all(|c| c.is_ascii_digit()));
    }
}
