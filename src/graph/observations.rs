//! Observation parsing helpers.
//!
//! Observations are free text, but by convention many are `"Key: value"`
//! pairs. All report builders go through these helpers rather than parsing
//! inline, so the split-on-first-colon and date-handling rules stay in one
//! place.

use chrono::NaiveDate;

use crate::graph::types::Entity;

/// Extract the value of a `"Key: value"` observation.
///
/// Matches on the text before the first colon, case-sensitively, and
/// returns the trimmed remainder. Returns `None` when no observation
/// carries the key. The first matching observation wins.
pub fn observation_value<'a>(entity: &'a Entity, key: &str) -> Option<&'a str> {
    entity.observations.iter().find_map(|obs| {
        let (k, v) = obs.split_once(':')?;
        if k.trim() == key {
            Some(v.trim())
        } else {
            None
        }
    })
}

/// Parse a calendar date from observation text.
///
/// Accepts `YYYY-MM-DD` and full RFC 3339 timestamps. Anything else is
/// treated as absent, which sorts the entity after all dated ones.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    chrono::DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.date_naive())
}

/// The entity's `Date:` observation as a parsed date.
pub fn date_of(entity: &Entity) -> Option<NaiveDate> {
    observation_value(entity, "Date").and_then(parse_date)
}

/// The entity's `DueDate:` observation as a parsed date.
pub fn due_date_of(entity: &Entity) -> Option<NaiveDate> {
    observation_value(entity, "DueDate").and_then(parse_date)
}

/// The entity's `StartDate:` observation as a parsed date.
pub fn start_date_of(entity: &Entity) -> Option<NaiveDate> {
    observation_value(entity, "StartDate").and_then(parse_date)
}

/// The entity's `EndDate:` observation as a parsed date.
pub fn end_date_of(entity: &Entity) -> Option<NaiveDate> {
    observation_value(entity, "EndDate").and_then(parse_date)
}

/// Compare two optional dates so that dated values sort ascending and
/// missing or malformed dates sort last.
pub fn cmp_dates_none_last(a: Option<NaiveDate>, b: Option<NaiveDate>) -> std::cmp::Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
}
