// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! PNG rendering of an [`Analysis`].
//!
//! One panel per benchmark run, stacked vertically and sharing both the time
//! axis and the latency range, followed by a panel of interval updates when
//! any node log produced records.

use crate::analysis::{Analysis, IntervalPoint, RunSeries};
use crate::error::{Error, Result};

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;

use std::ops::Range;

macro_rules! hexcolour {
    ($colour:literal) => {
        RGBColor(
            (($colour & 0xFF0000) >> 16) as u8,
            (($colour & 0x00FF00) >> 8) as u8,
            ($colour & 0x0000FF) as u8,
        )
    };
}

const COLOURS: &[RGBColor] = &[
    hexcolour!(0x1F77B4),
    hexcolour!(0xFF7F0E),
    hexcolour!(0x2CA02C),
    hexcolour!(0xD62728),
    hexcolour!(0x9467BD),
    hexcolour!(0x8C564B),
    hexcolour!(0xE377C2),
    hexcolour!(0x7F7F7F),
    hexcolour!(0xBCBD22),
    hexcolour!(0x17BECF),
];

const LATENCY_LINE: RGBColor = hexcolour!(0x808080);
const OK_POINT: RGBColor = hexcolour!(0x008000);
const ERROR_POINT: RGBColor = hexcolour!(0xFF0000);

struct PanelStyle {
    title: &'static str,
    mean: RGBColor,
    delay: RGBColor,
}

const BASIC_PANEL: PanelStyle = PanelStyle {
    title: "Basic Raft latency",
    mean: hexcolour!(0x0000FF),
    delay: hexcolour!(0x008000),
};

const ADAPTIVE_PANEL: PanelStyle = PanelStyle {
    title: "Adaptive Raft latency",
    mean: hexcolour!(0xFFA500),
    delay: hexcolour!(0xFF0000),
};

/// Render `analysis` to a PNG at `path`.
pub fn render(
    analysis: &Analysis,
    path: &str,
    size: (u32, u32),
    delay_target: &str,
    jitter_ms: u64,
) -> Result<()> {
    draw(analysis, path, size, delay_target, jitter_ms)
        .map_err(|e| Error::Render(format!("{}: {}", path, e)))?;
    info!("Plot saved as '{}'", path);
    Ok(())
}

fn draw(
    analysis: &Analysis,
    path: &str,
    size: (u32, u32),
    delay_target: &str,
    jitter_ms: u64,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let with_intervals = !analysis.intervals.is_empty();
    let panels = root.split_evenly((if with_intervals { 3 } else { 2 }, 1));

    let x_range = time_range(analysis);
    let y_range = padded(analysis.latency_range.0, analysis.latency_range.1);

    draw_run(
        &panels[0],
        &analysis.basic,
        &BASIC_PANEL,
        x_range.clone(),
        y_range.clone(),
        delay_target,
        jitter_ms,
    )?;
    draw_run(
        &panels[1],
        &analysis.adaptive,
        &ADAPTIVE_PANEL,
        x_range.clone(),
        y_range,
        delay_target,
        jitter_ms,
    )?;

    if with_intervals {
        draw_intervals(&panels[2], analysis, x_range)?;
    }

    root.present()?;
    Ok(())
}

fn draw_run<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    run: &RunSeries,
    style: &PanelStyle,
    x_range: Range<f64>,
    y_range: Range<f64>,
    delay_target: &str,
    jitter_ms: u64,
) -> std::result::Result<(), Box<dyn std::error::Error>>
where
    DB::ErrorType: 'static,
{
    let steps = step_post(&run.delay_steps());
    let jitter = jitter_ms as f64;
    let delay_range = {
        let lo = steps.iter().map(|(_, d)| d - jitter).fold(0.0, f64::min);
        let hi = steps.iter().map(|(_, d)| d + jitter).fold(0.0, f64::max);
        padded(lo, hi)
    };

    let mut chart = ChartBuilder::on(area)
        .caption(style.title, ("sans-serif", 24))
        .margin(15)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Right, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x_range.clone(), y_range)?
        .set_secondary_coord(x_range.clone(), delay_range);

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Latency (ms)")
        .draw()?;

    let points: Vec<(f64, f64)> = run
        .seconds
        .offsets
        .iter()
        .copied()
        .zip(run.latency_values())
        .collect();

    chart
        .draw_series(LineSeries::new(
            points.iter().copied(),
            LATENCY_LINE.mix(0.5).stroke_width(1),
        ))?
        .label("Latency")
        .legend(|(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], LATENCY_LINE.stroke_width(1))
        });

    chart.draw_series(run.latencies.iter().zip(points.iter()).map(|(record, point)| {
        let colour = if record.is_error { ERROR_POINT } else { OK_POINT };
        Circle::new(*point, 2, colour.filled())
    }))?;

    let mean = run.summary.mean_ms;
    let mean_colour = style.mean;
    chart
        .draw_series(DashedLineSeries::new(
            vec![(x_range.start, mean), (x_range.end, mean)],
            10,
            6,
            mean_colour.stroke_width(2),
        ))?
        .label(format!("Mean ({:.1} ms)", mean))
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], mean_colour.stroke_width(2))
        });

    if !steps.is_empty() {
        let delay_colour = style.delay;

        chart
            .configure_secondary_axes()
            .y_desc(format!("Delay on {} (ms)", delay_target))
            .draw()?;

        let mut band: Vec<(f64, f64)> = steps.iter().map(|(t, d)| (*t, d + jitter)).collect();
        band.extend(steps.iter().rev().map(|(t, d)| (*t, d - jitter)));
        chart
            .draw_secondary_series(std::iter::once(Polygon::new(
                band,
                delay_colour.mix(0.2).filled(),
            )))?
            .label(format!("Jitter (±{} ms)", jitter_ms))
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 20, y + 5)], delay_colour.mix(0.2).filled())
            });

        chart
            .draw_secondary_series(LineSeries::new(steps, delay_colour.stroke_width(2)))?
            .label("Injected delay")
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], delay_colour.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8).filled())
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}

fn draw_intervals<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    analysis: &Analysis,
    x_range: Range<f64>,
) -> std::result::Result<(), Box<dyn std::error::Error>>
where
    DB::ErrorType: 'static,
{
    let max = analysis
        .intervals
        .iter()
        .map(|p| p.interval_ms as f64)
        .fold(0.0, f64::max);

    let mut chart = ChartBuilder::on(area)
        .caption("Interval per node (adaptive time axis)", ("sans-serif", 24))
        .margin(15)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Right, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x_range, padded(0.0, max))?;

    chart
        .configure_mesh()
        .x_desc("Time (s since the adaptive run started)")
        .y_desc("Interval (ms)")
        .draw()?;

    for (i, name) in analysis.node_names().into_iter().enumerate() {
        let colour = COLOURS[i % COLOURS.len()];
        let points: Vec<(f64, f64)> = analysis
            .intervals
            .iter()
            .filter(|p| p.node_name == name)
            .map(|p: &IntervalPoint| (p.relative_seconds, p.interval_ms as f64))
            .collect();

        chart
            .draw_series(LineSeries::new(points.iter().copied(), colour.stroke_width(2)))?
            .label(name)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], colour.stroke_width(2))
            });
        chart.draw_series(
            points
                .iter()
                .map(|point| Circle::new(*point, 3, colour.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8).filled())
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}

/// Expand delay changes into the corner points of a step line that holds
/// each value until the next change.
fn step_post(steps: &[(f64, u64)]) -> Vec<(f64, f64)> {
    let mut points = Vec::with_capacity(steps.len() * 2);
    for (i, (t, d)) in steps.iter().enumerate() {
        if i > 0 {
            points.push((*t, steps[i - 1].1 as f64));
        }
        points.push((*t, *d as f64));
    }
    points
}

/// x axis shared by every panel.
fn time_range(analysis: &Analysis) -> Range<f64> {
    let offsets = analysis
        .basic
        .seconds
        .offsets
        .iter()
        .chain(analysis.adaptive.seconds.offsets.iter())
        .chain(analysis.basic.delay_seconds.iter())
        .chain(analysis.adaptive.delay_seconds.iter())
        .copied()
        .chain(analysis.intervals.iter().map(|p| p.relative_seconds));
    let (lo, hi) = offsets.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    lo..hi.max(lo + 1.0)
}

// plotters needs a non-empty range
fn padded(lo: f64, hi: f64) -> Range<f64> {
    if hi > lo {
        let pad = 0.05 * (hi - lo);
        lo - pad..hi + pad
    } else {
        lo - 1.0..hi + 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Sources;
    use crate::config::Config;

    const BASIC: &str = "\
2024-01-01 10:00:00 - 🔧 Applying delay: 20ms to node_three
Req: 2024-01-01 10:00:00.000000N | Res: 2024-01-01 10:00:00.030000N | 30ms | ✅
2024-01-01 10:00:01 - 🔧 Applying delay: 78ms to node_three
Req: 2024-01-01 10:00:01.000000N | Res: timeout | 900ms | ❌
Req: 2024-01-01 10:00:02.000000N | Res: 2024-01-01 10:00:02.045000N | 45ms | ✅
";

    const ADAPTIVE: &str = "\
2024-01-01 11:00:00.5 - 🔧 Applying delay: 20ms to node_three
Req: 2024-01-01 11:00:00.000000N | Res: 2024-01-01 11:00:00.010000N | 10ms | ✅
Req: 2024-01-01 11:00:00.500000N | Res: 2024-01-01 11:00:00.540000N | 40ms | ✅
Req: 2024-01-01 11:00:01.000000N | Res: 2024-01-01 11:00:01.020000N | 20ms | ✅
";

    const NODE: &str = "\
[2024-01-01 11:00:01 EET] Interval update for Node: 50 → 830
[2024-01-01 11:00:02 EET] Interval update for Node: 50 → 845
";

    fn render_to_tempdir(sources: Sources) {
        let analysis = Analysis::from_sources(&sources, &Config::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        let path = path.to_str().unwrap();
        render(&analysis, path, (800, 700), "node_three", 40).unwrap();
        assert!(std::fs::metadata(path).unwrap().len() > 0);
    }

    #[test]
    fn render_with_intervals() {
        render_to_tempdir(Sources {
            basic: BASIC.to_string(),
            adaptive: ADAPTIVE.to_string(),
            nodes: vec![
                ("node_one".to_string(), NODE.to_string()),
                ("node_three".to_string(), NODE.replace("50", "52")),
            ],
        });
    }

    #[test]
    fn render_without_intervals() {
        render_to_tempdir(Sources {
            basic: BASIC.to_string(),
            adaptive: ADAPTIVE.to_string(),
            nodes: Vec::new(),
        });
    }

    #[test]
    fn render_without_delays() {
        let strip = |text: &str| {
            text.lines()
                .filter(|line| !line.contains("Applying delay"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        render_to_tempdir(Sources {
            basic: strip(BASIC),
            adaptive: strip(ADAPTIVE),
            nodes: vec![("node_one".to_string(), NODE.to_string())],
        });
    }

    #[test]
    fn render_into_missing_directory_fails() {
        let analysis = Analysis::from_sources(
            &Sources {
                basic: BASIC.to_string(),
                adaptive: ADAPTIVE.to_string(),
                nodes: Vec::new(),
            },
            &Config::default(),
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("chart.png");
        assert!(matches!(
            render(&analysis, path.to_str().unwrap(), (800, 700), "node_three", 40),
            Err(Error::Render(_))
        ));
    }

    #[test]
    fn step_line_holds_until_next_change() {
        assert_eq!(
            step_post(&[(0.0, 20), (10.0, 78), (20.0, 40)]),
            vec![
                (0.0, 20.0),
                (10.0, 20.0),
                (10.0, 78.0),
                (20.0, 78.0),
                (20.0, 40.0)
            ]
        );
        assert!(step_post(&[]).is_empty());
    }

    #[test]
    fn degenerate_ranges_are_widened() {
        assert_eq!(padded(5.0, 5.0), 4.0..6.0);
        let range = padded(0.0, 100.0);
        assert!((range.start + 5.0).abs() < 1e-9);
        assert!((range.end - 105.0).abs() < 1e-9);
    }
}
