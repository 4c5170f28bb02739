// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{Error, Result};
use crate::record::RelativeSeries;

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDateTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

/// Wall clock format used by the benchmark request lines.
pub const STRICT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

static TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})[ T](\d{2}:\d{2}:\d{2}(?:\.\d+)?)\s*(\S*)$").unwrap()
});

static OFFSET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([+-])(\d{2}):?(\d{2})?$").unwrap());

/// A parsed timestamp that may or may not carry zone information.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Timestamp {
    Naive(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
}

/// Parse `YYYY-MM-DD HH:MM:SS.ffffff` exactly. The fraction may carry up to
/// nanosecond precision.
pub fn parse_strict(field: &'static str, value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, STRICT_FORMAT).map_err(|e| Error::parse(field, value, e))
}

/// Parse a timestamp in any of the shapes the benchmark logs use:
///
/// * `2025-04-19 16:19:56` or `2025-04-19T16:19:56.250`
/// * followed optionally by `Z`, `UTC`, `GMT`, a numeric offset such as
///   `+03:00`, `+0300` or `-05`, or an IANA zone name such as `Europe/Kyiv`
///
/// Zone abbreviations (`CET`, `EEST`, `EST`) are ambiguous and leave the
/// result naive.
pub fn parse_timestamp(field: &'static str, value: &str) -> Result<Timestamp> {
    let value = value.trim();
    let captures = TIMESTAMP
        .captures(value)
        .ok_or_else(|| Error::parse(field, value, "unrecognised timestamp layout"))?;

    let naive = parse_strict(field, &format!("{} {}", &captures[1], &captures[2]))?;

    let zone = &captures[3];
    if zone.is_empty() {
        return Ok(Timestamp::Naive(naive));
    }

    if ["Z", "UTC", "GMT"].iter().any(|z| z.eq_ignore_ascii_case(zone)) {
        return Ok(Timestamp::Zoned(
            Utc.from_utc_datetime(&naive).with_timezone(&utc_offset()),
        ));
    }

    if let Some(offset) = parse_offset(zone) {
        return match offset.from_local_datetime(&naive) {
            LocalResult::Single(t) => Ok(Timestamp::Zoned(t)),
            _ => Err(Error::parse(field, value, "offset out of range")),
        };
    }

    let region = if zone.contains('/') {
        zone.parse::<Tz>().ok()
    } else {
        None
    };
    if let Some(tz) = region {
        let local = localize_naive(&naive, &tz);
        let fixed = local.offset().fix();
        return Ok(Timestamp::Zoned(local.with_timezone(&fixed)));
    }

    if zone.chars().all(|c| c.is_ascii_alphabetic()) {
        debug!("unknown zone abbreviation {:?}, treating {} as naive", zone, value);
        return Ok(Timestamp::Naive(naive));
    }

    Err(Error::parse(field, value, "unrecognised zone"))
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

fn parse_offset(zone: &str) -> Option<FixedOffset> {
    let captures = OFFSET.captures(zone)?;
    let hours: i32 = captures[2].parse().ok()?;
    let minutes: i32 = captures
        .get(3)
        .map(|m| m.as_str().parse().ok())
        .unwrap_or(Some(0))?;
    let seconds = hours * 3600 + minutes * 60;
    if &captures[1] == "-" {
        FixedOffset::west_opt(seconds)
    } else {
        FixedOffset::east_opt(seconds)
    }
}

/// Resolve a zone name such as `Europe/Kyiv`.
pub fn parse_zone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| Error::Config(format!("unknown timezone {:?}: {}", name, e)))
}

/// Attach `zone` to a naive wall clock reading.
///
/// A reading that occurs twice (DST fall-back) resolves to the later,
/// standard-time instant. A reading that never occurs (DST spring-forward)
/// is interpreted with the offset in effect before the transition.
pub fn localize_naive<Z: TimeZone>(naive: &NaiveDateTime, zone: &Z) -> DateTime<Z> {
    match zone.from_local_datetime(naive) {
        LocalResult::Single(t) => t,
        LocalResult::Ambiguous(_, later) => later,
        LocalResult::None => {
            let before = *naive - Duration::days(1);
            let offset = zone.offset_from_utc_datetime(&before).fix();
            let utc = *naive - Duration::seconds(offset.local_minus_utc() as i64);
            zone.from_utc_datetime(&utc)
        }
    }
}

/// Bring a timestamp into `zone`. Naive timestamps are taken to already be
/// wall clock readings in `zone`; zone-aware timestamps are converted.
pub fn localize_to_zone<Z: TimeZone>(timestamp: &Timestamp, zone: &Z) -> DateTime<Z> {
    match timestamp {
        Timestamp::Naive(naive) => localize_naive(naive, zone),
        Timestamp::Zoned(zoned) => zoned.with_timezone(zone),
    }
}

/// Points on a timeline that can be measured against each other.
pub trait Elapsed: Clone {
    fn since(&self, base: &Self) -> Duration;
}

impl Elapsed for NaiveDateTime {
    fn since(&self, base: &Self) -> Duration {
        self.signed_duration_since(*base)
    }
}

impl<Z: TimeZone> Elapsed for DateTime<Z> {
    fn since(&self, base: &Self) -> Duration {
        self.clone().signed_duration_since(base.clone())
    }
}

/// Fractional seconds with microsecond resolution.
pub fn total_seconds(duration: Duration) -> f64 {
    match duration.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => duration.num_milliseconds() as f64 / 1_000.0,
    }
}

/// Offsets from the first timestamp. Out-of-order input produces negative
/// offsets rather than an error.
pub fn to_relative_seconds<T: Elapsed>(times: &[T]) -> Result<RelativeSeries<T>> {
    let base = times
        .first()
        .cloned()
        .ok_or_else(|| Error::empty("timestamp sequence"))?;
    let offsets = times.iter().map(|t| total_seconds(t.since(&base))).collect();
    Ok(RelativeSeries { base, offsets })
}
