// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Pattern based extraction of benchmark events from raw log text.
//!
//! Each extractor is an independent pass over the whole text. The three event
//! kinds are unrelated and may or may not appear in the same file. Records are
//! returned in the order they appear, and a malformed timestamp or number
//! inside a matched line fails the whole pass.

use crate::error::{Error, Result};
use crate::record::{DelayChangeRecord, IntervalRecord, LatencyRecord};
use crate::time::{localize_to_zone, parse_strict, parse_timestamp};

use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

/// Node whose injected delay is tracked unless configured otherwise.
pub const DEFAULT_DELAY_TARGET: &str = "node_three";

static LATENCY: Lazy<Regex> = Lazy::new(|| Regex::new(LATENCY_PATTERN).unwrap());
static INTERVAL: Lazy<Regex> = Lazy::new(|| Regex::new(INTERVAL_PATTERN).unwrap());

const LATENCY_PATTERN: &str = r"Req:\s+(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d+)N\s+\|\s+Res:.*?\|\s+(\d+)ms\s+\|(?:\s+)?(✅|❌)?";
const DELAY_PATTERN: &str =
    r"(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}(?:\.\d+)?)\s+[–—-]?\s+🔧 Applying delay: (\d+)ms to ";
const INTERVAL_PATTERN: &str = r"\[(.*?)\] Interval update for Node: (\d+)\s+→\s+(\d+)";

const FAILURE_GLYPH: &str = "❌";

fn delay_pattern(target: &str) -> Result<Regex> {
    let pattern = format!("{}{}", DELAY_PATTERN, regex::escape(target));
    Regex::new(&pattern)
        .map_err(|e| Error::Config(format!("bad delay target {:?}: {}", target, e)))
}

fn parse_number(field: &'static str, value: &str) -> Result<u64> {
    value.parse().map_err(|e| Error::parse(field, value, e))
}

/// Request/response latency lines, e.g.
///
/// `Req: 2024-01-01 00:00:00.000000N | Res: 2024-01-01 00:00:00.015000N | 15ms | ✅`
pub fn extract_latency_events(text: &str) -> Result<Vec<LatencyRecord>> {
    LATENCY
        .captures_iter(text)
        .map(|c| {
            Ok(LatencyRecord {
                timestamp: parse_strict("request time", &c[1])?,
                latency_ms: parse_number("latency", &c[2])?,
                is_error: c.get(3).map(|g| g.as_str() == FAILURE_GLYPH).unwrap_or(false),
            })
        })
        .collect()
}

/// Delay announcements for `target`, e.g.
///
/// `2024-01-01 00:00:05.5 - 🔧 Applying delay: 120ms to node_three`
///
/// The separator may be `-`, `–`, `—` or absent, and the fractional seconds
/// are optional.
pub fn extract_delay_events(text: &str, target: &str) -> Result<Vec<DelayChangeRecord>> {
    let re = delay_pattern(target)?;
    re.captures_iter(text)
        .map(|c| {
            Ok(DelayChangeRecord {
                timestamp: parse_strict("delay time", &c[1])?,
                delay_ms: parse_number("delay", &c[2])?,
            })
        })
        .collect()
}

/// Interval updates written by the adaptive nodes, e.g.
///
/// `[2025-04-19 16:19:56 EEST] Interval update for Node: 50 → 830`
///
/// `node_name` labels the log source; it is not part of the line. Timestamps
/// are brought into `zone`.
pub fn extract_interval_events(
    text: &str,
    node_name: &str,
    zone: &Tz,
) -> Result<Vec<IntervalRecord>> {
    INTERVAL
        .captures_iter(text)
        .map(|c| {
            let timestamp = parse_timestamp("interval time", &c[1])?;
            Ok(IntervalRecord {
                timestamp: localize_to_zone(&timestamp, zone),
                node_id: parse_number("node id", &c[2])?,
                node_name: node_name.to_string(),
                interval_ms: parse_number("interval", &c[3])?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime, Timelike};

    fn at(h: u32, m: u32, s: u32, micro: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_micro_opt(h, m, s, micro)
            .unwrap()
    }

    #[test]
    fn single_latency_line() {
        let text = "Req: 2024-01-01 00:00:00.000000N | Res: 2024-01-01 00:00:00.015000N | 15ms | ✅\n";
        let records = extract_latency_events(text).unwrap();
        assert_eq!(
            records,
            vec![LatencyRecord {
                timestamp: at(0, 0, 0, 0),
                latency_ms: 15,
                is_error: false,
            }]
        );
    }

    #[test]
    fn latency_lines_in_file_order_with_glyphs() {
        let text = "\
boot: cluster ready
Req: 2024-01-01 00:00:01.000000N | Res: 2024-01-01 00:00:01.020000N | 20ms | ✅
Req: 2024-01-01 00:00:02.500000N | Res: timeout | 1500ms | ❌
noise Req: garbage | 3ms |
Req: 2024-01-01 00:00:00.100000N | Res: 2024-01-01 00:00:00.142000N | 42ms |
";
        let records = extract_latency_events(text).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].latency_ms, 20);
        assert!(!records[0].is_error);
        assert_eq!(records[1].latency_ms, 1500);
        assert!(records[1].is_error);
        assert_eq!(records[1].timestamp, at(0, 0, 2, 500_000));
        // not re-sorted even though it is earlier
        assert_eq!(records[2].timestamp, at(0, 0, 0, 100_000));
        assert!(!records[2].is_error);
    }

    #[test]
    fn latency_with_bad_date_is_fatal() {
        let text = "Req: 2024-02-31 00:00:00.000000N | Res: x | 5ms | ✅";
        match extract_latency_events(text) {
            Err(Error::Parse { field, .. }) => assert_eq!(field, "request time"),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn latency_overflow_is_fatal() {
        let text = "Req: 2024-01-01 00:00:00.000000N | Res: x | 99999999999999999999999ms | ✅";
        assert!(matches!(
            extract_latency_events(text),
            Err(Error::Parse { field: "latency", .. })
        ));
    }

    #[test]
    fn no_latency_lines() {
        assert!(extract_latency_events("nothing to see").unwrap().is_empty());
    }

    #[test]
    fn delay_separators_and_fractions() {
        let text = "\
2024-01-01 00:00:00 - 🔧 Applying delay: 20ms to node_three
2024-01-01 00:00:10.5 – 🔧 Applying delay: 78ms to node_three
2024-01-01 00:00:20.250000 — 🔧 Applying delay: 136ms to node_three
2024-01-01 00:00:30  🔧 Applying delay: 195ms to node_three
2024-01-01 00:00:40 - 🔧 Applying delay: 999ms to node_one
";
        let records = extract_delay_events(text, DEFAULT_DELAY_TARGET).unwrap();
        let delays: Vec<u64> = records.iter().map(|r| r.delay_ms).collect();
        assert_eq!(delays, vec![20, 78, 136, 195]);
        assert_eq!(records[0].timestamp, at(0, 0, 0, 0));
        assert_eq!(records[1].timestamp, at(0, 0, 10, 500_000));
        assert_eq!(records[2].timestamp, at(0, 0, 20, 250_000));
        assert_eq!(records[3].timestamp, at(0, 0, 30, 0));
    }

    #[test]
    fn delay_target_is_literal() {
        let text = "2024-01-01 00:00:00 - 🔧 Applying delay: 20ms to node.3\n\
                    2024-01-01 00:00:01 - 🔧 Applying delay: 30ms to node_3\n";
        let records = extract_delay_events(text, "node.3").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].delay_ms, 20);
    }

    #[test]
    fn interval_updates_are_localized() {
        let zone: Tz = "Europe/Kyiv".parse().unwrap();
        let text = "\
📝 Writing log to /logs/node_50.log
[2025-04-19 16:19:56 EEST] Interval update for Node: 50 → 830
[2025-04-19 13:20:06 UTC] Interval update for Node: 50 → 845
";
        let records = extract_interval_events(text, "node_one", &zone).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].node_id, 50);
        assert_eq!(records[0].node_name, "node_one");
        assert_eq!(records[0].interval_ms, 830);
        assert_eq!(records[0].timestamp.hour(), 16);
        assert_eq!(records[1].interval_ms, 845);
        assert_eq!(records[1].timestamp.hour(), 16);
        assert_eq!(records[1].timestamp.minute(), 20);
    }

    #[test]
    fn interval_with_unparseable_timestamp_is_fatal() {
        let zone: Tz = "Europe/Kyiv".parse().unwrap();
        let text = "[sometime] Interval update for Node: 50 → 830";
        assert!(matches!(
            extract_interval_events(text, "node_one", &zone),
            Err(Error::Parse { .. })
        ));
    }
}
