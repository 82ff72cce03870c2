//! Raster chart rendering.
//!
//! Charts are drawn with plotters into an in-memory RGB buffer, encoded as
//! PNG and returned base64-encoded for embedding in JSON responses.

use std::f64::consts::{FRAC_PI_2, TAU};
use std::io::Cursor;
use std::path::Path;
use std::sync::Once;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{register_font, FontStyle};

use crate::error::{AppError, AppResult};

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type DrawResult = Result<(), Box<dyn std::error::Error>>;

const FONT: &str = "sans-serif";

/// Latin face shipped with the crate. It has no CJK glyphs; configure a CJK
/// font file to get readable Chinese labels.
static BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static BUNDLED_FONT_INIT: Once = Once::new();

pub const SALES_COLOR: RGBColor = RGBColor(0x2E, 0x86, 0xAB);
pub const PERFORMANCE_COLOR: RGBColor = RGBColor(0xA2, 0x3B, 0x72);
pub const CHAMPION_COLOR: RGBColor = RGBColor(0x4E, 0xCD, 0xC4);
pub const DEALER_COLOR: RGBColor = RGBColor(0x45, 0xB7, 0xD1);
pub const PRODUCT_COLOR: RGBColor = RGBColor(0xFF, 0x6B, 0x6B);
pub const TREND_COLOR: RGBColor = RGBColor(0x6A, 0x05, 0x72);

/// Pixel size of a chart image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

impl ChartSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// One line panel: labelled points along a categorical x axis.
pub struct LinePanel<'a> {
    pub title: &'a str,
    pub x_desc: &'a str,
    pub y_desc: &'a str,
    pub points: &'a [(String, f64)],
    pub color: RGBColor,
}

/// A bar with its axis label and the text drawn above it.
#[derive(Debug, Clone)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub annotation: String,
}

pub struct BarChart<'a> {
    pub title: &'a str,
    pub x_desc: &'a str,
    pub y_desc: &'a str,
    pub bars: &'a [Bar],
    pub color: RGBColor,
}

pub fn line_chart(size: ChartSize, panel: &LinePanel<'_>) -> AppResult<String> {
    render_png(size, |root| draw_line_panel(root, panel))
}

/// Two line panels stacked vertically in one image.
pub fn stacked_line_chart(
    size: ChartSize,
    upper: &LinePanel<'_>,
    lower: &LinePanel<'_>,
) -> AppResult<String> {
    render_png(size, |root| {
        let (top, bottom) = root.split_vertically((size.height / 2) as i32);
        draw_line_panel(&top, upper)?;
        draw_line_panel(&bottom, lower)
    })
}

pub fn bar_chart(size: ChartSize, chart: &BarChart<'_>) -> AppResult<String> {
    render_png(size, |root| draw_bars(root, chart))
}

/// A pie slice. `percentage` is the label text; the slice angle follows the
/// positive part of `value`.
#[derive(Debug, Clone)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    pub percentage: f64,
}

pub fn pie_chart(size: ChartSize, title: &str, slices: &[Slice]) -> AppResult<String> {
    render_png(size, |root| draw_pie(root, title, slices))
}

fn ensure_bundled_font() {
    BUNDLED_FONT_INIT.call_once(|| {
        if register_font(FONT, FontStyle::Normal, BUNDLED_FONT).is_err() {
            tracing::error!("Bundled chart font could not be parsed");
        }
    });
}

/// Draw chart text with the font file at `path` instead of the bundled face.
///
/// The file stays loaded for the rest of the process.
pub fn register_chart_font(path: &Path) -> AppResult<()> {
    ensure_bundled_font();

    let bytes: &'static [u8] = Box::leak(std::fs::read(path)?.into_boxed_slice());
    register_font(FONT, FontStyle::Normal, bytes)
        .map_err(|_| AppError::Chart(format!("Unsupported font file: {}", path.display())))?;

    tracing::info!(font = %path.display(), "Registered chart font");
    Ok(())
}

fn render_png(size: ChartSize, draw: impl FnOnce(&Area<'_>) -> DrawResult) -> AppResult<String> {
    ensure_bundled_font();

    let mut buffer = vec![0u8; (size.width * size.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (size.width, size.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;
        draw(&root).map_err(chart_error)?;
        root.present().map_err(chart_error)?;
    }
    encode_png(size, buffer)
}

fn encode_png(size: ChartSize, buffer: Vec<u8>) -> AppResult<String> {
    let image = image::RgbImage::from_raw(size.width, size.height, buffer)
        .ok_or_else(|| AppError::Chart("pixel buffer does not match chart size".into()))?;

    let mut png = Vec::new();
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(chart_error)?;

    Ok(STANDARD.encode(&png))
}

fn chart_error(e: impl std::fmt::Display) -> AppError {
    AppError::Chart(e.to_string())
}

/// Axis range covering zero and every value with some headroom for labels.
fn value_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let max = if max > 0.0 { max * 1.15 } else { 1.0 };
    let min = if min < 0.0 { min * 1.15 } else { 0.0 };
    (min, max)
}

fn segment_label(value: &SegmentValue<i32>, labels: &[&str]) -> String {
    match value {
        SegmentValue::CenterOf(i) => labels
            .get(*i as usize)
            .map(|l| l.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn annotation_style() -> TextStyle<'static> {
    TextStyle::from((FONT, 13).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom))
}

fn draw_line_panel(area: &Area<'_>, panel: &LinePanel<'_>) -> DrawResult {
    let n = panel.points.len() as i32;
    let labels: Vec<&str> = panel.points.iter().map(|(l, _)| l.as_str()).collect();
    let (y_min, y_max) = value_bounds(panel.points.iter().map(|(_, v)| *v));

    let mut chart = ChartBuilder::on(area)
        .caption(panel.title, (FONT, 24))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((0..n).into_segmented(), y_min..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(panel.points.len().max(1))
        .x_label_formatter(&|x| segment_label(x, &labels))
        .x_desc(panel.x_desc)
        .y_desc(panel.y_desc)
        .draw()?;

    let at = |i: usize| SegmentValue::CenterOf(i as i32);

    chart.draw_series(LineSeries::new(
        panel.points.iter().enumerate().map(|(i, (_, v))| (at(i), *v)),
        panel.color.stroke_width(2),
    ))?;
    chart.draw_series(
        panel
            .points
            .iter()
            .enumerate()
            .map(|(i, (_, v))| Circle::new((at(i), *v), 4, panel.color.filled())),
    )?;
    chart.draw_series(panel.points.iter().enumerate().map(|(i, (_, v))| {
        Text::new(format!("{:.1}", v), (at(i), *v), annotation_style())
    }))?;

    Ok(())
}

fn draw_bars(area: &Area<'_>, def: &BarChart<'_>) -> DrawResult {
    let n = def.bars.len() as i32;
    let labels: Vec<&str> = def.bars.iter().map(|b| b.label.as_str()).collect();
    let (y_min, y_max) = value_bounds(def.bars.iter().map(|b| b.value));

    let mut chart = ChartBuilder::on(area)
        .caption(def.title, (FONT, 26))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d((0..n).into_segmented(), y_min..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(def.bars.len().max(1))
        .x_label_formatter(&|x| segment_label(x, &labels))
        .x_desc(def.x_desc)
        .y_desc(def.y_desc)
        .draw()?;

    chart.draw_series(def.bars.iter().enumerate().map(|(i, bar)| {
        let i = i as i32;
        let mut rect = Rectangle::new(
            [
                (SegmentValue::Exact(i), 0.0),
                (SegmentValue::Exact(i + 1), bar.value),
            ],
            def.color.mix(0.7).filled(),
        );
        rect.set_margin(0, 0, 6, 6);
        rect
    }))?;
    chart.draw_series(def.bars.iter().enumerate().map(|(i, bar)| {
        Text::new(
            bar.annotation.clone(),
            (SegmentValue::CenterOf(i as i32), bar.value),
            annotation_style(),
        )
    }))?;

    Ok(())
}

fn polar(center: (i32, i32), radius: f64, angle: f64) -> (i32, i32) {
    (
        center.0 + (radius * angle.cos()).round() as i32,
        center.1 + (radius * angle.sin()).round() as i32,
    )
}

fn draw_pie(root: &Area<'_>, title: &str, slices: &[Slice]) -> DrawResult {
    let area = root.titled(title, (FONT, 24))?;
    let (width, height) = area.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = f64::from(width.min(height)) * 0.35;

    let total: f64 = slices.iter().map(|s| s.value.max(0.0)).sum();
    if total <= 0.0 {
        return Ok(());
    }

    let centered = TextStyle::from((FONT, 16).into_font()).pos(Pos::new(HPos::Center, VPos::Center));

    // First slice starts at twelve o'clock
    let mut start = -FRAC_PI_2;
    for (i, slice) in slices.iter().enumerate() {
        let sweep = slice.value.max(0.0) / total * TAU;
        if sweep <= 0.0 {
            continue;
        }

        let steps = ((sweep / TAU * 180.0).ceil() as usize).max(2);
        let mut outline = Vec::with_capacity(steps + 2);
        outline.push(center);
        for step in 0..=steps {
            let angle = start + sweep * step as f64 / steps as f64;
            outline.push(polar(center, radius, angle));
        }
        area.draw(&Polygon::new(outline, Palette99::pick(i).filled()))?;

        let mid = start + sweep / 2.0;
        area.draw(&Text::new(
            format!("{:.1}%", slice.percentage),
            polar(center, radius * 0.65, mid),
            centered.clone(),
        ))?;
        area.draw(&Text::new(
            slice.label.clone(),
            polar(center, radius * 1.18, mid),
            centered.clone(),
        ))?;

        start += sweep;
    }

    Ok(())
}
