// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::config_file::Schedule;
use crate::error::{Error, Result};

const BAR: char = '█';
const RULE_WIDTH: usize = 60;

/// Render the delay schedule as a fixed width text bar chart.
///
/// Bars are scaled so the largest delay spans `max_bar_length` characters,
/// and every bar length is rounded down.
pub fn render_delay_schedule(schedule: &Schedule) -> Result<String> {
    let times = schedule.times();
    let delays = schedule.delays();

    if times.len() != delays.len() {
        return Err(Error::Config(format!(
            "schedule has {} times but {} delays",
            times.len(),
            delays.len()
        )));
    }

    let max = delays
        .iter()
        .copied()
        .max()
        .ok_or_else(|| Error::empty("delay schedule"))?;
    if max == 0 {
        return Err(Error::empty("delay schedule (all delays are zero)"));
    }
    let unit = max as f64 / schedule.max_bar_length() as f64;

    let mut out = format!(
        "📈 Network Delay Degradation and Recovery ({})\n\n",
        schedule.node()
    );
    out.push_str(&format!("{:>9} | {:>11} | Visual\n", "Time (s)", "Delay (ms)"));
    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');

    for (t, d) in times.iter().zip(delays) {
        let bar: String = std::iter::repeat(BAR)
            .take((*d as f64 / unit) as usize)
            .collect();
        out.push_str(&format!("{:>9} | {:>11} | {}\n", t, d, bar));
    }

    Ok(out)
}
