//! Deterministic ordering of media across albums
//!
//! Items are ordered by, in this precedence:
//! 1. calendar date (UTC, `YYYY-MM-DD`) of `created_at`
//! 2. exact `created_at` instant
//! 3. integer prefix of `filename` before its first `.` (non-numeric last)
//! 4. that prefix compared as text
//! 5. id, only for items that carry a file name
//! 6. position in the input
//!
//! List responses carry no `filename`, so for them the name and id keys
//! collapse and the input position decides. The sort is stable, and each
//! album's slice arrives in the server's own order, so ties never reorder
//! items within an album. Titles are never ranked.
//!
//! Unparseable timestamps degrade to an empty date and a zero instant.

use crate::models::MediaItem;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::cmp::Ordering;

/// Precomputed sort key for one media item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSortKey {
    date: String,
    timestamp: i64,
    number: Option<i64>,
    base: String,
    /// `None` without a file name
    id: Option<i64>,
}

impl MediaSortKey {
    pub fn of(item: &MediaItem) -> Self {
        let instant = item.created_at.as_deref().and_then(parse_instant);
        let name = item.filename.as_deref().unwrap_or("");
        Self {
            date: instant
                .map(|dt| dt.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            timestamp: instant.map(|dt| dt.timestamp_millis()).unwrap_or(0),
            number: numeric_prefix(name),
            base: base_name(name).to_string(),
            id: item.filename.as_ref().map(|_| item.id),
        }
    }
}

impl Ord for MediaSortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date
            .cmp(&other.date)
            .then(self.timestamp.cmp(&other.timestamp))
            .then_with(|| compare_numbers(self.number, other.number))
            .then_with(|| self.base.cmp(&other.base))
            .then(self.id.cmp(&other.id))
    }
}

impl PartialOrd for MediaSortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare two items in merge order
///
/// `Equal` means the items keep their relative input order.
pub fn compare_media(a: &MediaItem, b: &MediaItem) -> Ordering {
    MediaSortKey::of(a).cmp(&MediaSortKey::of(b))
}

/// Stable sort of items in place in merge order
pub fn sort_media(items: &mut [MediaItem]) {
    items.sort_by_cached_key(MediaSortKey::of);
}

fn compare_numbers(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Parse a server timestamp; naive values are taken as UTC
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Part of a file name before its first `.`
pub fn base_name(name: &str) -> &str {
    name.split('.').next().unwrap_or("")
}

/// Leading integer of the base name, e.g. `12` for `12b.jpg`
///
/// Leading whitespace and a sign are accepted; anything without leading
/// digits yields `None`.
pub fn numeric_prefix(name: &str) -> Option<i64> {
    let base = base_name(name).trim_start();
    let (negative, digits) = match base.as_bytes().first() {
        Some(b'-') => (true, &base[1..]),
        Some(b'+') => (false, &base[1..]),
        _ => (false, base),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for byte in digits.bytes() {
        if !byte.is_ascii_digit() {
            break;
        }
        seen = true;
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(byte - b'0'));
    }

    if !seen {
        return None;
    }
    Some(if negative { -value } else { value })
}
