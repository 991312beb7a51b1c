//! Chart rendering
//!
//! RTT lines go on the left axis, throughput (Mbps) on a right-hand
//! secondary axis, bandwidth-transition markers are dashed vertical lines and
//! summary statistics are drawn as text blocks stacked up from the lower-left
//! corner of the plotting area. Output goes through the bitmap backend, or
//! the SVG backend when the file name ends in `.svg`.

use crate::error::{AnalysisError, Result};
use crate::markers::{Marker, BLUE, GREEN, RED};
use crate::output::is_svg;
use crate::rtt::RttSeries;
use crate::stats::ThroughputStats;
use crate::throughput::ThroughputSeries;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_svg::SVGBackend;
use std::error::Error;
use std::ops::Range;
use std::path::Path;
use tracing::debug;

/// 12x6 in at 150 dpi
pub const SINGLE_SIZE: (u32, u32) = (1800, 900);
/// 14x8 in at 150 dpi
pub const OVERLAY_SIZE: (u32, u32) = (2100, 1200);

/// Per-series colors and dash patterns for the overlay chart.
pub const OVERLAY_STYLES: [(RGBColor, LineDash); 3] = [
    (BLUE, LineDash::Solid),
    (RED, LineDash::Dashed),
    (GREEN, LineDash::DashDot),
];

pub const MAX_OVERLAY_SERIES: usize = OVERLAY_STYLES.len();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineDash {
    Solid,
    Dashed,
    DashDot,
}

#[derive(Clone, Copy, Debug)]
pub struct LineStyle {
    pub color: RGBColor,
    pub dash: LineDash,
    pub width: u32,
    pub opacity: f64,
}

impl LineStyle {
    pub fn solid(color: RGBColor) -> Self {
        Self {
            color,
            dash: LineDash::Solid,
            width: 2,
            opacity: 1.0,
        }
    }

    pub fn dash(mut self, dash: LineDash) -> Self {
        self.dash = dash;
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    fn shape(&self) -> ShapeStyle {
        self.color.mix(self.opacity).stroke_width(self.width)
    }
}

pub struct ThroughputTrace<'a> {
    pub series: &'a ThroughputSeries,
    pub label: String,
    pub style: LineStyle,
}

pub struct RttTrace<'a> {
    pub series: &'a RttSeries,
    pub label: String,
    pub style: LineStyle,
    pub throughput: Option<ThroughputTrace<'a>>,
}

/// Boxed multi-line annotation.
#[derive(Clone, Debug)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub fill: RGBAColor,
}

impl TextBlock {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            fill: WHITE.mix(0.7),
        }
    }

    pub fn tinted(mut self, color: RGBColor) -> Self {
        self.fill = color.mix(0.1);
        self
    }
}

pub struct Chart<'a> {
    title: String,
    size: (u32, u32),
    traces: Vec<RttTrace<'a>>,
    markers: &'a [Marker],
    blocks: Vec<TextBlock>,
    colored_axes: bool,
}

struct FontSizes {
    title: u32,
    axis: u32,
    label: u32,
    text: u32,
}

impl FontSizes {
    fn for_height(h: u32) -> Self {
        let unit = (h as f64 / 900.0).max(0.5);
        let px = |base: f64| (base * unit).round() as u32;
        Self {
            title: px(30.0),
            axis: px(24.0),
            label: px(18.0),
            text: px(18.0),
        }
    }
}

/// Range covering `values` with 5% headroom on both sides.
fn padded_range<I: IntoIterator<Item = f64>>(values: I) -> Range<f64> {
    let (lo, hi) = values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    if hi - lo < f64::EPSILON {
        return (lo - 1.0)..(hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad)..(hi + pad)
}

impl<'a> Chart<'a> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            size: SINGLE_SIZE,
            traces: Vec::new(),
            markers: &[],
            blocks: Vec::new(),
            colored_axes: false,
        }
    }

    pub fn size(mut self, size: (u32, u32)) -> Self {
        self.size = size;
        self
    }

    pub fn markers(mut self, markers: &'a [Marker]) -> Self {
        self.markers = markers;
        self
    }

    pub fn trace(mut self, trace: RttTrace<'a>) -> Self {
        self.traces.push(trace);
        self
    }

    /// Blocks stack upward in insertion order.
    pub fn block(mut self, block: TextBlock) -> Self {
        self.blocks.push(block);
        self
    }

    /// Color each axis description after its first series.
    pub fn colored_axes(mut self) -> Self {
        self.colored_axes = true;
        self
    }

    fn throughput_traces(&self) -> impl Iterator<Item = &ThroughputTrace<'a>> {
        self.traces.iter().filter_map(|t| t.throughput.as_ref())
    }

    fn x_range(&self) -> Range<f64> {
        let rtt = self.traces.iter().flat_map(|t| t.series.samples.iter().map(|s| s.time_s));
        let tp = self.throughput_traces().flat_map(|t| t.series.points.iter().map(|p| p.end_s));
        let markers = self.markers.iter().map(|m| m.time_s);
        padded_range(rtt.chain(tp).chain(markers))
    }

    fn rtt_range(&self) -> Range<f64> {
        padded_range(self.traces.iter().flat_map(|t| t.series.samples.iter().map(|s| s.rtt_ms)))
    }

    fn throughput_range(&self) -> Range<f64> {
        let max = self
            .throughput_traces()
            .filter_map(|t| t.series.max_mbps())
            .fold(0.0, f64::max);
        if max > 0.0 {
            0.0..max * 1.1
        } else {
            0.0..1.0
        }
    }

    /// Render to `path`; the extension picks the backend.
    pub fn render(&self, path: &Path) -> Result<()> {
        if self.traces.iter().all(|t| t.series.is_empty()) {
            let source = self.traces.first().map(|t| t.series.source.clone()).unwrap_or_default();
            return Err(AnalysisError::NoSamples(source));
        }

        let result = if is_svg(path) {
            let root = SVGBackend::new(path, self.size).into_drawing_area();
            self.draw(&root).and_then(|_| root.present().map_err(Into::into))
        } else {
            let root = BitMapBackend::new(path, self.size).into_drawing_area();
            self.draw(&root).and_then(|_| root.present().map_err(Into::into))
        };
        result.map_err(|e| AnalysisError::Render(format!("{}: {}", path.display(), e)))?;

        debug!("Rendered {} traces to {}", self.traces.len(), path.display());
        Ok(())
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> std::result::Result<(), Box<dyn Error>>
    where
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;
        let (_, height) = root.dim_in_pixel();
        let fonts = FontSizes::for_height(height);
        let has_throughput = self.throughput_traces().any(|t| !t.series.is_empty());

        let x_range = self.x_range();
        let y_range = self.rtt_range();
        let x_area = fonts.label * 4;
        let y_area = fonts.label * 6;
        let margin = 20;

        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, ("sans-serif", fonts.title))
            .margin(margin)
            .x_label_area_size(x_area)
            .y_label_area_size(y_area)
            .right_y_label_area_size(if has_throughput { y_area } else { 0 })
            .build_cartesian_2d(x_range.clone(), y_range.clone())?
            .set_secondary_coord(x_range, self.throughput_range());

        let rtt_desc_color = match self.traces.first() {
            Some(t) if self.colored_axes => t.style.color,
            _ => BLACK,
        };
        chart
            .configure_mesh()
            .x_desc("Time (seconds)")
            .y_desc("Round Trip Time (ms)")
            .label_style(("sans-serif", fonts.label))
            .axis_desc_style(("sans-serif", fonts.axis).into_font().color(&rtt_desc_color))
            .bold_line_style(BLACK.mix(0.15).stroke_width(1))
            .light_line_style(WHITE.stroke_width(0))
            .draw()?;

        if has_throughput {
            let tp_desc_color = match self.throughput_traces().next() {
                Some(t) if self.colored_axes => t.style.color,
                _ => BLACK,
            };
            chart
                .configure_secondary_axes()
                .y_desc("Throughput (Mbps)")
                .label_style(("sans-serif", fonts.label))
                .axis_desc_style(("sans-serif", fonts.axis).into_font().color(&tp_desc_color))
                .draw()?;
        }

        for trace in &self.traces {
            if trace.series.is_empty() {
                continue;
            }
            let shape = trace.style.shape();
            let points: Vec<(f64, f64)> = trace.series.points().collect();
            let anno = match trace.style.dash {
                LineDash::Solid => chart.draw_series(LineSeries::new(points, shape))?,
                LineDash::Dashed => chart.draw_series(DashedLineSeries::new(points, 12, 8, shape))?,
                LineDash::DashDot => chart.draw_series(DashedLineSeries::new(points, 4, 6, shape))?,
            };
            anno.label(trace.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], shape));
        }

        for marker in self.markers {
            let shape = marker.color.mix(0.7).stroke_width(2);
            let line = vec![(marker.time_s, y_range.start), (marker.time_s, y_range.end)];
            chart
                .draw_series(DashedLineSeries::new(line, 10, 8, shape))?
                .label(marker.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], shape));
        }

        for tp in self.throughput_traces().filter(|t| !t.series.is_empty()) {
            let shape = tp.style.shape();
            chart
                .draw_secondary_series(LineSeries::new(tp.series.iter().collect::<Vec<_>>(), shape))?
                .label(tp.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], shape));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font(("sans-serif", fonts.text))
            .background_style(WHITE.mix(0.7).filled())
            .border_style(BLACK.mix(0.5).stroke_width(1))
            .draw()?;

        let left = (margin + y_area) as i32 + 10;
        let mut bottom = height as i32 - (margin + x_area) as i32 - 10;
        for block in &self.blocks {
            bottom = draw_text_block(root, block, left, bottom, fonts.text)? - 10;
        }

        Ok(())
    }
}

/// Draws `block` with its lower-left corner at `(left, bottom)` and returns its top edge.
fn draw_text_block<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    block: &TextBlock,
    left: i32,
    bottom: i32,
    font_px: u32,
) -> std::result::Result<i32, Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let pad = (font_px / 2) as i32;
    let line_height = (font_px as f64 * 1.3).round() as i32;
    let widest = block.lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = (widest as f64 * font_px as f64 * 0.6).round() as i32 + 2 * pad;
    let top = bottom - line_height * block.lines.len() as i32 - 2 * pad;

    root.draw(&Rectangle::new([(left, top), (left + width, bottom)], block.fill.filled()))?;
    root.draw(&Rectangle::new(
        [(left, top), (left + width, bottom)],
        BLACK.mix(0.3).stroke_width(1),
    ))?;
    for (i, line) in block.lines.iter().enumerate() {
        root.draw(&Text::new(
            line.clone(),
            (left + pad, top + pad + i as i32 * line_height),
            ("sans-serif", font_px).into_font(),
        ))?;
    }
    Ok(top)
}

/// Single-series chart: blue RTT line, green throughput on the right axis.
pub fn single_series_chart<'a>(
    title: impl Into<String>,
    rtt: &'a RttSeries,
    throughput: Option<&'a ThroughputSeries>,
    markers: &'a [Marker],
    stats: ThroughputStats,
) -> Chart<'a> {
    let mut chart = Chart::new(title).colored_axes().markers(markers);

    if let Some(summary) = rtt.summary() {
        chart = chart.block(TextBlock::new(summary.rtt_lines()));
    }
    if let Some(tp) = throughput {
        if let Some(summary) = tp.summary() {
            chart = chart.block(TextBlock::new(summary.throughput_lines(stats, tp.total_transfer_mbit())));
        }
    }

    chart.trace(RttTrace {
        series: rtt,
        label: "RTT (ms)".to_string(),
        style: LineStyle::solid(BLUE),
        throughput: throughput.map(|series| ThroughputTrace {
            series,
            label: "Throughput (Mbps)".to_string(),
            style: LineStyle::solid(GREEN),
        }),
    })
}

/// One capture of an overlay chart.
#[derive(Clone, Debug)]
pub struct OverlaySeries {
    /// Index into [`OVERLAY_STYLES`], the capture's position among the inputs
    pub slot: usize,
    pub rtt: RttSeries,
    pub throughput: Option<ThroughputSeries>,
}

impl OverlaySeries {
    pub fn new(slot: usize, rtt: RttSeries, throughput: Option<ThroughputSeries>) -> Self {
        Self { slot, rtt, throughput }
    }
}

/// Overlay of up to [`MAX_OVERLAY_SERIES`] captures, one stats block per capture.
/// Each capture keeps the style of its slot, so skipped inputs leave gaps in
/// the color sequence.
pub fn overlay_chart<'a>(series: &'a [OverlaySeries], markers: &'a [Marker]) -> Result<Chart<'a>> {
    let got = series
        .iter()
        .map(|s| s.slot + 1)
        .max()
        .unwrap_or(0)
        .max(series.len());
    if got > MAX_OVERLAY_SERIES {
        return Err(AnalysisError::TooManySeries {
            max: MAX_OVERLAY_SERIES,
            got,
        });
    }

    let mut chart = Chart::new("TCP RTT Comparison").size(OVERLAY_SIZE).markers(markers);
    for OverlaySeries { slot, rtt, throughput } in series {
        let (color, dash) = OVERLAY_STYLES[*slot];
        if let Some(summary) = rtt.summary() {
            let mut lines = vec![format!("{} Stats:", rtt.label)];
            lines.extend(summary.rtt_lines());
            chart = chart.block(TextBlock::new(lines).tinted(color));
        }

        chart = chart.trace(RttTrace {
            series: rtt,
            label: format!("RTT - {}", rtt.label),
            style: LineStyle::solid(color).dash(dash).opacity(0.7),
            throughput: throughput.as_ref().map(|tp| ThroughputTrace {
                series: tp,
                label: format!("Throughput - {}", rtt.label),
                style: LineStyle::solid(color).opacity(0.4),
            }),
        });
    }
    Ok(chart)
}
