//! Chart generation for search experiment results.
//!
//! Charts are composed as SVG documents (axes, ticks, grid, bars, lines and
//! legend are laid out here) and exported either as SVG or rasterised to PNG
//! with resvg.

use crate::error::PlotError;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Series colours, in drawing order
pub const PALETTE: [&str; 4] = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728"];

/// Width of a lone bar, as a fraction of the category slot
const BAR_WIDTH: f64 = 0.8;
/// Target number of ticks per axis
const MAX_TICKS: usize = 6;
const TICK_LENGTH: f64 = 5.0;

/// Title and axis captions of a chart
#[derive(Debug, Clone, Copy)]
pub struct ChartLabels<'a> {
    pub title: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
}

/// Captions of a chart with a secondary y axis on the right
#[derive(Debug, Clone, Copy)]
pub struct DualAxisLabels<'a> {
    pub title: &'a str,
    pub x_label: &'a str,
    pub left_label: &'a str,
    pub right_label: &'a str,
}

/// One bar per category
#[derive(Debug, Clone, Copy)]
pub struct BarSeries<'a> {
    pub label: &'a str,
    pub values: &'a [f64],
}

/// Points of a line, `xs` and `ys` of equal length
#[derive(Debug, Clone, Copy)]
pub struct LineSeries<'a> {
    pub label: &'a str,
    pub xs: &'a [f64],
    pub ys: &'a [f64],
}

impl LineSeries<'_> {
    fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }
}

/// Linear mapping from data values to canvas coordinates
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        LinearScale { domain, range }
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if (d1 - d0).abs() < f64::EPSILON {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }
}

/// Finite min/max of a series
fn extent(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Axis domain for a line: the data extent padded by 5% on each side.
pub fn line_domain(values: &[f64]) -> (f64, f64) {
    let (lo, hi) = extent(values).unwrap_or((0.0, 1.0));
    let span = hi - lo;
    let pad = if span > 0.0 {
        span * 0.05
    } else {
        lo.abs().max(1.0) * 0.05
    };
    (lo - pad, hi + pad)
}

/// Axis domain for bars: always includes zero, padded away from it.
pub fn bar_domain(values: &[f64]) -> (f64, f64) {
    let (lo, hi) = extent(values).unwrap_or((0.0, 1.0));
    let lo = lo.min(0.0);
    let mut hi = hi.max(0.0);
    if hi - lo < f64::EPSILON {
        hi = 1.0;
    }
    let pad = (hi - lo) * 0.05;
    (
        if lo < 0.0 { lo - pad } else { lo },
        if hi > 0.0 { hi + pad } else { hi },
    )
}

/// Round a raw tick step up to 1, 2, 2.5 or 5 times a power of ten.
pub fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let base = 10f64.powf(raw.log10().floor());
    let fraction = raw / base;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 2.5 {
        2.5
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * base
}

/// Tick positions inside `[lo, hi]`, together with their step.
pub fn nice_ticks(lo: f64, hi: f64, max_ticks: usize) -> (Vec<f64>, f64) {
    if !(hi > lo) {
        return (vec![lo], 1.0);
    }
    let step = nice_step((hi - lo) / max_ticks.max(1) as f64);
    let first = (lo / step).ceil() * step;

    let mut ticks = Vec::new();
    let mut k = 0;
    loop {
        let value = first + k as f64 * step;
        if value > hi + step * 1e-9 {
            break;
        }
        // snap -0.0000001 style rounding noise to zero
        ticks.push(if value.abs() < step * 1e-9 { 0.0 } else { value });
        k += 1;
    }
    (ticks, step)
}

/// Format a tick label with as many decimals as its step needs.
pub fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 && step.fract() == 0.0 {
        0
    } else {
        let exponent = step.log10().floor();
        let mantissa = step / 10f64.powf(exponent);
        let extra = if (mantissa - 2.5).abs() < 1e-9 { 1.0 } else { 0.0 };
        (-exponent + extra).max(0.0) as usize
    };
    format!("{:.*}", decimals, value)
}

pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Region of the canvas inside the axes
#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl PlotArea {
    fn right(&self) -> f64 {
        self.left + self.width
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
enum Swatch {
    Bar,
    Line,
}

struct LegendEntry<'a> {
    label: &'a str,
    color: &'a str,
    swatch: Swatch,
}

/// SVG document under construction
struct SvgCanvas {
    svg: String,
}

impl SvgCanvas {
    fn new(width: f64, height: f64, font_size: f64) -> Self {
        let svg = format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
<style>
    .axis {{ stroke: #000000; stroke-width: 1; }}
    .grid {{ stroke: #b0b0b0; stroke-width: 0.8; stroke-dasharray: 4,4; opacity: 0.5; }}
    .label {{ font-family: 'DejaVu Sans', Arial, sans-serif; font-size: {f}px; fill: #000000; }}
    .title {{ font-family: 'DejaVu Sans', Arial, sans-serif; font-size: {t}px; fill: #000000; }}
    .legend {{ fill: #ffffff; stroke: #cccccc; stroke-width: 1; opacity: 0.9; }}
</style>
<rect width="100%" height="100%" fill="#ffffff"/>
"##,
            w = width,
            h = height,
            f = font_size,
            t = font_size + 2.0,
        );
        SvgCanvas { svg }
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, class: &str) {
        self.svg.push_str(&format!(
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" class="{}"/>
"#,
            x1, y1, x2, y2, class
        ));
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, class: &str, fill: &str) {
        self.svg.push_str(&format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" class="{}" fill="{}"/>
"#,
            x, y, width, height, class, fill
        ));
    }

    fn text(&mut self, x: f64, y: f64, anchor: &str, class: &str, content: &str) {
        self.svg.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" text-anchor="{}" class="{}">{}</text>
"#,
            x,
            y,
            anchor,
            class,
            escape_xml(content)
        ));
    }

    /// Text rotated by `angle` degrees around its anchor point
    fn rotated_text(&mut self, x: f64, y: f64, angle: f64, content: &str) {
        self.svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" class="label"
      transform="rotate({angle} {x:.2} {y:.2})">{}</text>
"#,
            escape_xml(content),
            x = x,
            y = y,
            angle = angle
        ));
    }

    fn polyline(&mut self, points: &[(f64, f64)], color: &str, width: f64) {
        let coords: Vec<String> = points
            .iter()
            .map(|(x, y)| format!("{:.2},{:.2}", x, y))
            .collect();
        self.svg.push_str(&format!(
            r#"<polyline points="{}" class="series" fill="none"
          stroke="{}" stroke-width="{}" stroke-linejoin="round"/>
"#,
            coords.join(" "),
            color,
            width
        ));
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, color: &str) {
        self.svg.push_str(&format!(
            r#"<circle cx="{:.2}" cy="{:.2}" r="{}" class="marker" fill="{}"/>
"#,
            cx, cy, r, color
        ));
    }

    fn finish(mut self) -> String {
        self.svg.push_str("</svg>");
        self.svg
    }
}

/// SVG chart generator
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    /// Canvas width (100 units per inch)
    pub width: f64,
    /// Canvas height
    pub height: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    /// Base font size for tick and axis labels
    pub font_size: f64,
    /// Raster scale applied when exporting PNG
    pub scale: f32,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        ChartRenderer {
            width: 800.0,
            height: 500.0,
            margin_left: 80.0,
            margin_right: 30.0,
            margin_top: 50.0,
            margin_bottom: 60.0,
            font_size: 12.0,
            scale: 2.0,
        }
    }
}

impl ChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer for a canvas of the given size
    pub fn with_size(width: f64, height: f64) -> Self {
        ChartRenderer {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    fn plot_area(&self) -> PlotArea {
        PlotArea {
            left: self.margin_left,
            top: self.margin_top,
            width: (self.width - self.margin_left - self.margin_right).max(1.0),
            height: (self.height - self.margin_top - self.margin_bottom).max(1.0),
        }
    }

    /// Bar chart with one bar per category, in the given order.
    pub fn bar_chart_svg(
        &self,
        labels: &ChartLabels,
        categories: &[String],
        values: &[f64],
    ) -> String {
        let area = self.plot_area();
        let mut canvas = SvgCanvas::new(self.width, self.height, self.font_size);

        let y = LinearScale::new(bar_domain(values), (area.bottom(), area.top));
        self.draw_y_axis(&mut canvas, &area, &y, Side::Left, false);

        let band = area.width / categories.len().max(1) as f64;
        let bar_px = BAR_WIDTH * band;
        let zero = y.map(0.0);
        for (i, &value) in values.iter().enumerate() {
            let center = area.left + band * (i as f64 + 0.5);
            let top = y.map(value);
            canvas.rect(
                center - bar_px / 2.0,
                top.min(zero),
                bar_px,
                (top - zero).abs(),
                "bar",
                PALETTE[0],
            );
        }

        self.draw_categories(&mut canvas, &area, categories);
        self.draw_frame(&mut canvas, &area);
        self.draw_captions(&mut canvas, &area, labels.title, labels.x_label, labels.y_label, None);

        canvas.finish()
    }

    /// Grouped bar chart: for each category, one bar per group placed at
    /// `(g - (k - 1) / 2) * bar_width` slots from the category centre.
    pub fn grouped_bar_chart_svg(
        &self,
        labels: &ChartLabels,
        categories: &[String],
        groups: &[BarSeries],
        bar_width: f64,
    ) -> String {
        let area = self.plot_area();
        let mut canvas = SvgCanvas::new(self.width, self.height, self.font_size);

        let all_values: Vec<f64> = groups.iter().flat_map(|g| g.values.iter().copied()).collect();
        let y = LinearScale::new(bar_domain(&all_values), (area.bottom(), area.top));
        self.draw_y_axis(&mut canvas, &area, &y, Side::Left, false);

        let band = area.width / categories.len().max(1) as f64;
        let bar_px = bar_width * band;
        let zero = y.map(0.0);
        let middle = (groups.len() as f64 - 1.0) / 2.0;

        for (g, group) in groups.iter().enumerate() {
            let color = PALETTE[g % PALETTE.len()];
            let offset = (g as f64 - middle) * bar_width * band;
            for (i, &value) in group.values.iter().enumerate() {
                let center = area.left + band * (i as f64 + 0.5) + offset;
                let top = y.map(value);
                canvas.rect(
                    center - bar_px / 2.0,
                    top.min(zero),
                    bar_px,
                    (top - zero).abs(),
                    "bar",
                    color,
                );
            }
        }

        self.draw_categories(&mut canvas, &area, categories);
        self.draw_frame(&mut canvas, &area);

        let entries: Vec<LegendEntry> = groups
            .iter()
            .enumerate()
            .map(|(g, group)| LegendEntry {
                label: group.label,
                color: PALETTE[g % PALETTE.len()],
                swatch: Swatch::Bar,
            })
            .collect();
        self.draw_legend(&mut canvas, &area, &entries);
        self.draw_captions(&mut canvas, &area, labels.title, labels.x_label, labels.y_label, None);

        canvas.finish()
    }

    /// Single line over a numeric x axis with a dashed grid.
    pub fn line_chart_svg(
        &self,
        labels: &ChartLabels,
        series: &LineSeries,
        markers: bool,
    ) -> String {
        let area = self.plot_area();
        let mut canvas = SvgCanvas::new(self.width, self.height, self.font_size);

        let x = LinearScale::new(line_domain(series.xs), (area.left, area.right()));
        let y = LinearScale::new(line_domain(series.ys), (area.bottom(), area.top));
        self.draw_x_axis(&mut canvas, &area, &x, true);
        self.draw_y_axis(&mut canvas, &area, &y, Side::Left, true);

        self.draw_line(&mut canvas, series, &x, &y, PALETTE[0], markers);

        self.draw_frame(&mut canvas, &area);
        self.draw_captions(&mut canvas, &area, labels.title, labels.x_label, labels.y_label, None);

        canvas.finish()
    }

    /// Two lines sharing the x axis, `left` scaled on the left y axis and
    /// `right` on the right one, with a single legend for both.
    pub fn dual_axis_chart_svg(
        &self,
        labels: &DualAxisLabels,
        left: &LineSeries,
        right: &LineSeries,
    ) -> String {
        let area = self.plot_area();
        let mut canvas = SvgCanvas::new(self.width, self.height, self.font_size);

        let xs: Vec<f64> = left.xs.iter().chain(right.xs.iter()).copied().collect();
        let x = LinearScale::new(line_domain(&xs), (area.left, area.right()));
        let y_left = LinearScale::new(line_domain(left.ys), (area.bottom(), area.top));
        let y_right = LinearScale::new(line_domain(right.ys), (area.bottom(), area.top));

        self.draw_x_axis(&mut canvas, &area, &x, true);
        self.draw_y_axis(&mut canvas, &area, &y_left, Side::Left, true);
        self.draw_y_axis(&mut canvas, &area, &y_right, Side::Right, false);

        self.draw_line(&mut canvas, left, &x, &y_left, PALETTE[0], false);
        self.draw_line(&mut canvas, right, &x, &y_right, PALETTE[1], false);

        self.draw_frame(&mut canvas, &area);
        self.draw_legend(
            &mut canvas,
            &area,
            &[
                LegendEntry {
                    label: left.label,
                    color: PALETTE[0],
                    swatch: Swatch::Line,
                },
                LegendEntry {
                    label: right.label,
                    color: PALETTE[1],
                    swatch: Swatch::Line,
                },
            ],
        );
        self.draw_captions(
            &mut canvas,
            &area,
            labels.title,
            labels.x_label,
            labels.left_label,
            Some(labels.right_label),
        );

        canvas.finish()
    }

    fn draw_line(
        &self,
        canvas: &mut SvgCanvas,
        series: &LineSeries,
        x: &LinearScale,
        y: &LinearScale,
        color: &str,
        markers: bool,
    ) {
        let points: Vec<(f64, f64)> = series
            .points()
            .filter(|(px, py)| px.is_finite() && py.is_finite())
            .map(|(px, py)| (x.map(px), y.map(py)))
            .collect();

        if points.len() > 1 {
            canvas.polyline(&points, color, 2.0);
        }
        if markers || points.len() == 1 {
            for &(cx, cy) in &points {
                canvas.circle(cx, cy, 3.5, color);
            }
        }
    }

    fn draw_frame(&self, canvas: &mut SvgCanvas, area: &PlotArea) {
        canvas.line(area.left, area.top, area.right(), area.top, "axis");
        canvas.line(area.left, area.bottom(), area.right(), area.bottom(), "axis");
        canvas.line(area.left, area.top, area.left, area.bottom(), "axis");
        canvas.line(area.right(), area.top, area.right(), area.bottom(), "axis");
    }

    fn draw_y_axis(
        &self,
        canvas: &mut SvgCanvas,
        area: &PlotArea,
        scale: &LinearScale,
        side: Side,
        grid: bool,
    ) {
        let (ticks, step) = nice_ticks(scale.domain.0, scale.domain.1, MAX_TICKS);
        for tick in ticks {
            let ty = scale.map(tick);
            if grid {
                canvas.line(area.left, ty, area.right(), ty, "grid");
            }
            let label = format_tick(tick, step);
            match side {
                Side::Left => {
                    canvas.line(area.left - TICK_LENGTH, ty, area.left, ty, "axis");
                    canvas.text(area.left - TICK_LENGTH - 3.0, ty + 4.0, "end", "label", &label);
                }
                Side::Right => {
                    canvas.line(area.right(), ty, area.right() + TICK_LENGTH, ty, "axis");
                    let tx = area.right() + TICK_LENGTH + 3.0;
                    canvas.text(tx, ty + 4.0, "start", "label", &label);
                }
            }
        }
    }

    fn draw_x_axis(
        &self,
        canvas: &mut SvgCanvas,
        area: &PlotArea,
        scale: &LinearScale,
        grid: bool,
    ) {
        let (ticks, step) = nice_ticks(scale.domain.0, scale.domain.1, MAX_TICKS);
        for tick in ticks {
            let tx = scale.map(tick);
            if grid {
                canvas.line(tx, area.top, tx, area.bottom(), "grid");
            }
            canvas.line(tx, area.bottom(), tx, area.bottom() + TICK_LENGTH, "axis");
            canvas.text(
                tx,
                area.bottom() + TICK_LENGTH + self.font_size + 2.0,
                "middle",
                "label",
                &format_tick(tick, step),
            );
        }
    }

    fn draw_categories(&self, canvas: &mut SvgCanvas, area: &PlotArea, categories: &[String]) {
        let band = area.width / categories.len().max(1) as f64;
        for (i, category) in categories.iter().enumerate() {
            let center = area.left + band * (i as f64 + 0.5);
            canvas.line(center, area.bottom(), center, area.bottom() + TICK_LENGTH, "axis");
            canvas.text(
                center,
                area.bottom() + TICK_LENGTH + self.font_size + 2.0,
                "middle",
                "label",
                category,
            );
        }
    }

    fn draw_captions(
        &self,
        canvas: &mut SvgCanvas,
        area: &PlotArea,
        title: &str,
        x_label: &str,
        y_label: &str,
        right_label: Option<&str>,
    ) {
        canvas.text(area.left + area.width / 2.0, area.top - 15.0, "middle", "title", title);
        canvas.text(
            area.left + area.width / 2.0,
            area.bottom() + TICK_LENGTH + 2.0 * self.font_size + 14.0,
            "middle",
            "label",
            x_label,
        );
        canvas.rotated_text(
            area.left - self.margin_left + self.font_size + 4.0,
            area.top + area.height / 2.0,
            -90.0,
            y_label,
        );
        if let Some(label) = right_label {
            canvas.rotated_text(
                area.right() + self.margin_right - self.font_size - 4.0,
                area.top + area.height / 2.0,
                90.0,
                label,
            );
        }
    }

    /// Legend box in the upper-right corner of the plot area
    fn draw_legend(&self, canvas: &mut SvgCanvas, area: &PlotArea, entries: &[LegendEntry]) {
        if entries.is_empty() {
            return;
        }
        let row = self.font_size + 8.0;
        let longest = entries.iter().map(|e| e.label.chars().count()).max().unwrap_or(0);
        let box_width = 40.0 + longest as f64 * self.font_size * 0.6;
        let box_height = row * entries.len() as f64 + 8.0;
        let x0 = area.right() - box_width - 10.0;
        let y0 = area.top + 10.0;

        canvas.rect(x0, y0, box_width, box_height, "legend", "#ffffff");
        for (i, entry) in entries.iter().enumerate() {
            let cy = y0 + 4.0 + row * (i as f64 + 0.5);
            match entry.swatch {
                Swatch::Bar => canvas.rect(x0 + 8.0, cy - 5.0, 18.0, 10.0, "swatch", entry.color),
                Swatch::Line => canvas.svg.push_str(&format!(
                    r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" class="swatch"
      stroke="{}" stroke-width="2"/>
"#,
                    x0 + 8.0,
                    cy,
                    x0 + 26.0,
                    cy,
                    entry.color
                )),
            }
            canvas.text(x0 + 32.0, cy + 4.0, "start", "label", entry.label);
        }
    }

    /// Save SVG to file
    pub fn save_svg<P: AsRef<Path>>(&self, svg: &str, path: P) -> Result<(), PlotError> {
        let path = path.as_ref();
        let mut file = File::create(path).map_err(|e| PlotError::io(path, e))?;
        file.write_all(svg.as_bytes()).map_err(|e| PlotError::io(path, e))?;
        Ok(())
    }

    /// Rasterise SVG to a PNG file at `self.scale` pixels per canvas unit.
    pub fn save_png<P: AsRef<Path>>(&self, svg: &str, path: P) -> Result<(), PlotError> {
        let path = path.as_ref();
        let render_error = |reason: String| PlotError::Render {
            path: path.to_path_buf(),
            reason,
        };

        let mut opt = usvg::Options::default();
        opt.fontdb_mut().load_system_fonts();
        let tree = usvg::Tree::from_str(svg, &opt)
            .map_err(|e| render_error(format!("usvg parse error: {}", e)))?;

        let size = tree.size();
        let width = (size.width() * self.scale).ceil() as u32;
        let height = (size.height() * self.scale).ceil() as u32;
        let mut pixmap = Pixmap::new(width.max(1), height.max(1))
            .ok_or_else(|| render_error("Failed to create pixmap".to_string()))?;

        resvg::render(
            &tree,
            Transform::from_scale(self.scale, self.scale),
            &mut pixmap.as_mut(),
        );
        pixmap
            .save_png(path)
            .map_err(|e| render_error(format!("save_png failed: {}", e)))?;

        log::debug!("Rasterised {}x{} chart to {}", width, height, path.display());
        Ok(())
    }
}
