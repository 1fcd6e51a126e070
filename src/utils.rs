use std::{collections::HashSet, fmt::Display, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Deserializer, de};
use serde_json::Value;

use crate::types::{TrackIdentity, TrackKey};

/// Deserializes a number that Last.fm may send either as a JSON number or as
/// a string (`"duration": "240000"`). Null and empty strings become the
/// type's default.
pub fn de_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
    T::Err: Display,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(T::default()),
        Value::Number(n) => n.to_string().parse::<T>().map_err(de::Error::custom),
        Value::String(s) if s.trim().is_empty() => Ok(T::default()),
        Value::String(s) => s.trim().parse::<T>().map_err(de::Error::custom),
        other => Err(de::Error::custom(format!("expected a number, got {other}"))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Deserializes a list that collapses to a bare object when it holds a
/// single element.
pub fn de_one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}

/// Keeps the first occurrence of every `(name, artist)` pair.
pub fn remove_duplicate_tracks(tracks: &mut Vec<TrackIdentity>) {
    let mut seen: HashSet<TrackKey> = HashSet::new();
    tracks.retain(|track| seen.insert(track.key()));
}

/// Joins names as an English list: `a`, `a and b`, `a, b, and c`.
pub fn join_strings(strings: &[String]) -> String {
    match strings {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}

pub fn basic_pluralize(word: &str, count: u64) -> String {
    if count != 1 {
        format!("{word}s")
    } else {
        word.to_string()
    }
}

/// Formats an integer with comma thousands separators (`12345` -> `12,345`).
pub fn format_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn strip_quotes(value: &str) -> String {
    value.replace('"', "")
}

/// The Sunday on or before `date`.
pub fn last_sunday(date: NaiveDate) -> NaiveDate {
    let days_since_sunday = date.weekday().num_days_from_sunday();
    date - Duration::days(i64::from(days_since_sunday))
}

/// First day of the month `offset` months away from the month of `date`.
pub fn first_of_month(date: NaiveDate, offset: i32) -> Option<NaiveDate> {
    let months = date.year() * 12 + date.month0() as i32 + offset;
    NaiveDate::from_ymd_opt(months.div_euclid(12), months.rem_euclid(12) as u32 + 1, 1)
}
