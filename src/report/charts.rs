//! Box plot and histogram pages for the statistics PDF.

use super::pdf::{Align, Page, Rgb};
use crate::analysis::{CohortStatistics, ExerciseStatistics};

const PAGE_WIDTH: f64 = 576.0;
const PAGE_HEIGHT: f64 = 432.0;

const TITLE_SIZE: f64 = 14.0;
const LABEL_SIZE: f64 = 10.0;
const TICK_SIZE: f64 = 8.0;

const BOX_COLOR: Rgb = Rgb(0.0, 0.0, 0.0);
const MEDIAN_COLOR: Rgb = Rgb(1.0, 0.5, 0.05);
const MEAN_MARKER_COLOR: Rgb = Rgb(0.17, 0.63, 0.17);
const MEAN_LINE_COLOR: Rgb = Rgb(1.0, 0.0, 0.0);
const BAR_FILL: Rgb = Rgb(0.5, 0.85, 0.5);
const BAR_EDGE: Rgb = Rgb(0.0, 0.45, 0.0);

/// Linear mapping from data values to page coordinates.
#[derive(Debug, Clone, Copy)]
struct Scale {
    min: f64,
    max: f64,
    from: f64,
    to: f64,
}

impl Scale {
    fn new((min, max): (f64, f64), from: f64, to: f64) -> Self {
        Self { min, max, from, to }
    }

    fn map(&self, value: f64) -> f64 {
        self.from + (value - self.min) / (self.max - self.min) * (self.to - self.from)
    }
}

/// Plot area inside the page margins.
#[derive(Debug, Clone, Copy)]
struct Frame {
    left: f64,
    right: f64,
    bottom: f64,
    top: f64,
}

impl Frame {
    fn standard() -> Self {
        Self {
            left: 64.0,
            right: PAGE_WIDTH - 24.0,
            bottom: 52.0,
            top: PAGE_HEIGHT - 40.0,
        }
    }
}

/// Roughly `target` evenly spaced round tick values covering `[min, max]`.
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    let span = max - min;
    if !(span > 0.0) || target == 0 {
        return vec![min];
    }

    let raw = span / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = match raw / magnitude {
        n if n < 1.5 => 1.0,
        n if n < 3.0 => 2.0,
        n if n < 7.0 => 5.0,
        _ => 10.0,
    } * magnitude;

    // Ticks are counted in whole steps so huge magnitudes can't stall the loop
    let first = (min / step).ceil();
    let last = (max / step + 1e-9).floor();
    if !(last >= first) {
        return vec![min];
    }
    let count = (last - first) as usize;
    (0..=count).map(|k| (first + k as f64) * step).collect()
}

/// Tick label without trailing zeros.
pub fn format_tick(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0 + 0.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{}", rounded)
    }
}

/// Widen `[lo, hi]` by `fraction` of its span on both sides.
fn with_margin(lo: f64, hi: f64, fraction: f64) -> (f64, f64) {
    let pad = if hi > lo { (hi - lo) * fraction } else { 0.5 };
    (lo - pad, hi + pad)
}

fn draw_frame(page: &mut Page, frame: &Frame, title: &str, x_label: &str, y_label: &str) {
    page.stroke_color(Rgb::BLACK);
    page.line_width(0.8);
    page.dash(None);
    page.stroke_rect(
        frame.left,
        frame.bottom,
        frame.right - frame.left,
        frame.top - frame.bottom,
    );

    page.fill_color(Rgb::BLACK);
    page.text(
        (frame.left + frame.right) / 2.0,
        frame.top + 14.0,
        TITLE_SIZE,
        Align::Center,
        title,
    );
    page.text(
        (frame.left + frame.right) / 2.0,
        frame.bottom - 36.0,
        LABEL_SIZE,
        Align::Center,
        x_label,
    );
    page.vertical_text(
        frame.left - 40.0,
        (frame.bottom + frame.top) / 2.0,
        LABEL_SIZE,
        y_label,
    );
}

/// Dashed grid lines and labels for the x axis.
fn draw_x_ticks(page: &mut Page, frame: &Frame, scale: &Scale, ticks: &[f64]) {
    for &tick in ticks {
        let x = scale.map(tick);
        page.stroke_color(Rgb::GRID);
        page.line_width(0.5);
        page.dash(Some((2.0, 2.0)));
        page.line(x, frame.bottom, x, frame.top);

        page.stroke_color(Rgb::BLACK);
        page.dash(None);
        page.line(x, frame.bottom, x, frame.bottom - 4.0);
        page.fill_color(Rgb::BLACK);
        page.text(
            x,
            frame.bottom - 14.0,
            TICK_SIZE,
            Align::Center,
            &format_tick(tick),
        );
    }
}

/// Dashed grid lines and labels for the y axis.
fn draw_y_ticks(page: &mut Page, frame: &Frame, scale: &Scale, ticks: &[f64]) {
    for &tick in ticks {
        let y = scale.map(tick);
        page.stroke_color(Rgb::GRID);
        page.line_width(0.5);
        page.dash(Some((2.0, 2.0)));
        page.line(frame.left, y, frame.right, y);

        page.stroke_color(Rgb::BLACK);
        page.dash(None);
        page.line(frame.left - 4.0, y, frame.left, y);
        page.fill_color(Rgb::BLACK);
        page.text(
            frame.left - 6.0,
            y - TICK_SIZE / 3.0,
            TICK_SIZE,
            Align::Right,
            &format_tick(tick),
        );
    }
}

/// Overview page: one horizontal box plot per exercise plus the mean line.
pub fn overview_page(stats: &CohortStatistics) -> Page {
    let mut page = Page::new(PAGE_WIDTH, PAGE_HEIGHT);
    let frame = Frame::standard();
    let count = stats.exercises.len();

    let (lo, hi) = stats.value_range().unwrap_or((0.0, 1.0));
    let x = Scale::new(with_margin(lo, hi, 0.1), frame.left, frame.right);
    let y = Scale::new(
        with_margin(0.5, count as f64 + 0.5, 0.1),
        frame.bottom,
        frame.top,
    );

    let (x_min, x_max) = (x.min, x.max);
    draw_x_ticks(&mut page, &frame, &x, &nice_ticks(x_min, x_max, 6));
    let rows: Vec<f64> = (1..=count).map(|i| i as f64).collect();
    draw_y_ticks(&mut page, &frame, &y, &rows);

    let half_height = (y.map(1.0) - y.map(0.0)) * 0.22;
    for exercise in &stats.exercises {
        draw_box(&mut page, &x, y.map(exercise.exercise as f64), half_height, exercise);
    }

    let means: Vec<(f64, f64)> = stats
        .exercises
        .iter()
        .map(|e| (x.map(e.mean), y.map(e.exercise as f64)))
        .collect();
    page.stroke_color(MEAN_LINE_COLOR);
    page.line_width(1.2);
    page.polyline(&means);

    draw_frame(
        &mut page,
        &frame,
        "Point distribution",
        "#Points",
        "Assignment #",
    );
    page
}

fn draw_box(page: &mut Page, x: &Scale, center: f64, half_height: f64, stats: &ExerciseStatistics) {
    let summary = &stats.summary;
    let (q1, q3) = (x.map(summary.q1), x.map(summary.q3));
    let (low, high) = (x.map(summary.whisker_low), x.map(summary.whisker_high));
    let cap = half_height / 2.0;

    page.stroke_color(BOX_COLOR);
    page.line_width(1.0);
    page.dash(None);
    page.stroke_rect(q1, center - half_height, q3 - q1, 2.0 * half_height);

    page.line(low, center, q1, center);
    page.line(q3, center, high, center);
    page.line(low, center - cap, low, center + cap);
    page.line(high, center - cap, high, center + cap);

    for &outlier in &summary.outliers {
        page.circle(x.map(outlier), center, 3.0);
    }

    page.stroke_color(MEDIAN_COLOR);
    page.line_width(1.5);
    let median = x.map(summary.median);
    page.line(median, center - half_height, median, center + half_height);

    let mean = x.map(stats.mean);
    page.fill_color(MEAN_MARKER_COLOR);
    page.polygon(&[
        (mean, center + 4.0),
        (mean - 4.0, center - 3.0),
        (mean + 4.0, center - 3.0),
    ]);
}

/// Histogram page for one exercise.
pub fn histogram_page(stats: &ExerciseStatistics) -> Page {
    let mut page = Page::new(PAGE_WIDTH, PAGE_HEIGHT);
    let frame = Frame::standard();
    let histogram = &stats.histogram;

    let first = histogram.edges.first().copied().unwrap_or(0.0);
    let last = histogram.edges.last().copied().unwrap_or(1.0);
    let x = Scale::new(with_margin(first, last, 0.05), frame.left, frame.right);
    let y_max = (histogram.max_count().max(1) as f64) * 1.05;
    let y = Scale::new((0.0, y_max), frame.bottom, frame.top);

    let (x_min, x_max) = (x.min, x.max);
    draw_x_ticks(&mut page, &frame, &x, &nice_ticks(x_min, x_max, 6));
    let counts: Vec<f64> = nice_ticks(0.0, y_max, 5)
        .into_iter()
        .filter(|t| t.fract() == 0.0)
        .collect();
    draw_y_ticks(&mut page, &frame, &y, &counts);

    page.stroke_color(BAR_EDGE);
    page.fill_color(BAR_FILL);
    page.line_width(0.6);
    page.dash(None);
    for (bin, &count) in histogram.counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let left = x.map(histogram.edges[bin]);
        let right = x.map(histogram.edges[bin + 1]);
        let top = y.map(count as f64);
        page.fill_rect(left, frame.bottom, right - left, top - frame.bottom);
    }

    let title = format!("Point distribution of exercise no: {}", stats.exercise);
    draw_frame(&mut page, &frame, &title, "#Points", "#Students");
    page
}
