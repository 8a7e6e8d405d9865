//! Plotters-backed surface: every redraw rasterizes the whole render list into an SVG
//! string or an RGB pixel buffer.
//!
//! The `ab_glyph` text path does not discover OS fonts, so captions, tick labels, legend
//! and colorbar labels are only drawn once a font has been registered through
//! [`PlottersSurface::with_font`]. Without one the plot is framed by a plain border.

use anyhow::{Result, anyhow};
use log::debug;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use super::Surface;
use super::adapter::{
    Chart, draw_colorbar, draw_heatmap, draw_markers, draw_polyline, format_tick, rgba_color,
};
use crate::autoscale::{data_bounds, derive_ranges};
use crate::heatmap::HeatmapData;
use crate::models::{AxisRange, Layout, LayoutPatch, Series, SeriesData};
use crate::types::{DrawMode, FrameFormat};

const MARGIN: u32 = 16;
const Y_LABEL_AREA: u32 = 60;
const X_LABEL_AREA: u32 = 40;
const CAPTION_AREA: u32 = 30;
/// Share of the width kept for the plot when a colorbar is shown.
const PLOT_WIDTH_PERCENT: u32 = 88;

pub struct PlottersSurface {
    format: FrameFormat,
    size: (u32, u32),
    text: bool,
    svg: String,
    pixels: Vec<u8>,
    last: Option<(Vec<Series>, Layout)>,
}

impl PlottersSurface {
    pub fn new(format: FrameFormat, size: (u32, u32)) -> Self {
        Self {
            format,
            size: (size.0.max(1), size.1.max(1)),
            text: false,
            svg: String::new(),
            pixels: Vec::new(),
            last: None,
        }
    }

    pub fn svg(width: u32, height: u32) -> Self {
        Self::new(FrameFormat::Svg, (width, height))
    }

    pub fn bitmap(width: u32, height: u32) -> Self {
        Self::new(FrameFormat::Bitmap, (width, height))
    }

    /// Register `font` as the sans-serif face and enable text.
    pub fn with_font(mut self, font: &'static [u8]) -> Result<Self> {
        plotters::style::register_font("sans-serif", plotters::style::FontStyle::Normal, font)
            .map_err(|_| anyhow!("font rejected"))?;
        self.text = true;
        Ok(self)
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Last SVG document, empty before the first redraw or for bitmap surfaces.
    pub fn svg_document(&self) -> &str {
        &self.svg
    }

    /// Last frame as packed RGB rows, empty before the first redraw or for SVG surfaces.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn has_colorbar(series: &[Series]) -> bool {
        series.iter().any(|s| colorbar_source(s).is_some())
    }

    fn render(&mut self, series: &[Series], layout: &Layout) -> Result<()> {
        let (w, h) = self.size;
        match self.format {
            FrameFormat::Svg => {
                let mut svg = String::new();
                {
                    let root = SVGBackend::with_string(&mut svg, (w, h)).into_drawing_area();
                    draw_frame(root, series, layout, self.text)?;
                }
                self.svg = svg;
            }
            FrameFormat::Bitmap => {
                let mut buf = vec![0u8; w as usize * h as usize * 3];
                {
                    let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
                    draw_frame(root, series, layout, self.text)?;
                }
                self.pixels = buf;
            }
        }
        debug!("rendered {} series into a {w}x{h} frame", series.len());
        Ok(())
    }
}

impl Surface for PlottersSurface {
    fn full_redraw(&mut self, series: &[Series], layout: &Layout) -> Result<()> {
        self.render(series, layout)?;
        self.last = Some((series.to_vec(), layout.clone()));
        Ok(())
    }

    fn relayout(&mut self, patch: &LayoutPatch) -> Result<()> {
        // Nothing is shown yet; the next full redraw brings the layout along.
        let Some((series, layout)) = self.last.take() else {
            return Ok(());
        };
        let mut next = layout.clone();
        next.apply(patch);
        match self.render(&series, &next) {
            Ok(()) => {
                self.last = Some((series, next));
                Ok(())
            }
            Err(e) => {
                self.last = Some((series, layout));
                Err(e)
            }
        }
    }

    fn purge(&mut self) {
        self.svg.clear();
        self.pixels.clear();
        self.last = None;
    }

    fn plot_area_px(&self) -> Option<(u32, u32)> {
        let (mut w, mut h) = self.size;
        if self
            .last
            .as_ref()
            .is_some_and(|(series, _)| Self::has_colorbar(series))
        {
            w = w * PLOT_WIDTH_PERCENT / 100;
        }
        w = w.saturating_sub(2 * MARGIN);
        h = h.saturating_sub(2 * MARGIN);
        if self.text {
            w = w.saturating_sub(Y_LABEL_AREA);
            h = h.saturating_sub(X_LABEL_AREA + CAPTION_AREA);
        }
        Some((w, h))
    }
}

fn colorbar_source(series: &Series) -> Option<&HeatmapData> {
    match &series.data {
        SeriesData::Heatmap(h) if h.show_scale && !h.is_placeholder() => Some(h),
        _ => None,
    }
}

/// Axis ranges shown for a frame: explicit layout ranges win, otherwise the data extent
/// (aspect-fitted when the layout locks it), otherwise the unit square.
fn frame_ranges(series: &[Series], layout: &Layout, area_px: (u32, u32)) -> (AxisRange, AxisRange) {
    let derived = data_bounds(series).map(|b| {
        let aspect = (layout.lock_aspect && area_px.1 > 0)
            .then(|| layout.scale_ratio * area_px.0 as f64 / area_px.1 as f64);
        derive_ranges(b, aspect)
    });
    let unit = AxisRange::new(0.0, 1.0);
    let x = layout
        .x_range
        .or(derived.map(|d| d.0))
        .unwrap_or(unit);
    let y = layout
        .y_range
        .or(derived.map(|d| d.1))
        .unwrap_or(unit);
    (x, y)
}

fn draw_frame<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    series: &[Series],
    layout: &Layout,
    text: bool,
) -> Result<()> {
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let colorbar = series.iter().find_map(colorbar_source);
    let (plot_area, bar_area) = if colorbar.is_some() {
        let (p, b) = root.split_horizontally((PLOT_WIDTH_PERCENT).percent_width());
        (p, Some(b))
    } else {
        (root, None)
    };

    let (pw, ph) = plot_area.dim_in_pixel();
    let (x_range, y_range) = frame_ranges(series, layout, (pw, ph));

    let mut builder = ChartBuilder::on(&plot_area);
    builder.margin(MARGIN);
    if text {
        if let Some(title) = layout.title.as_deref().filter(|t| !t.trim().is_empty()) {
            builder.caption(title, (FontFamily::SansSerif, 20));
        }
        builder
            .set_label_area_size(LabelAreaPosition::Left, Y_LABEL_AREA)
            .set_label_area_size(LabelAreaPosition::Bottom, X_LABEL_AREA);
    }
    let mut chart = builder
        .build_cartesian_2d(x_range.min..x_range.max, y_range.min..y_range.max)
        .map_err(|e| anyhow!("{:?}", e))?;

    if text {
        let tick = |v: &f64| format_tick(*v);
        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc(layout.x_title.as_str())
            .y_desc(layout.y_title.as_str())
            .x_label_formatter(&tick)
            .y_label_formatter(&tick)
            .label_style((FontFamily::SansSerif, 12))
            .axis_desc_style((FontFamily::SansSerif, 14))
            .draw()
            .map_err(|e| anyhow!("{:?}", e))?;
    }

    let mut labelled = false;
    for s in series {
        match &s.data {
            SeriesData::Heatmap(h) => {
                if !h.is_placeholder() {
                    draw_heatmap(&mut chart, h, s.style.opacity)?;
                }
            }
            SeriesData::Line { .. } => {
                let points = s.points();
                if matches!(s.style.mode, DrawMode::Lines | DrawMode::LinesMarkers) {
                    draw_polyline(&mut chart, &points, &s.style)?;
                }
                if matches!(s.style.mode, DrawMode::Markers | DrawMode::LinesMarkers) {
                    draw_markers(&mut chart, &points, &s.style)?;
                }
                if text && layout.show_legend && s.style.show_legend {
                    legend_entry(&mut chart, s)?;
                    labelled = true;
                }
            }
        }
    }

    if labelled {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .border_style(BLACK)
            .background_style(WHITE.mix(0.85))
            .label_font((FontFamily::SansSerif, 12))
            .draw()
            .map_err(|e| anyhow!("{:?}", e))?;
    }

    if !text {
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(x_range.min, y_range.min), (x_range.max, y_range.max)],
                BLACK.stroke_width(1),
            )))
            .map_err(|e| anyhow!("{:?}", e))?;
    }

    if let (Some(bar), Some(h)) = (bar_area.as_ref(), colorbar) {
        draw_colorbar(bar, h, text)?;
    }

    plot_area.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Empty series carrying only the legend swatch of `s`.
fn legend_entry<DB: DrawingBackend>(chart: &mut Chart<'_, DB>, s: &Series) -> Result<()> {
    let color = rgba_color(s.style.color);
    chart
        .draw_series(std::iter::empty::<PathElement<(f64, f64)>>())
        .map_err(|e| anyhow!("{:?}", e))?
        .label(s.name.clone())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], color.stroke_width(2)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::SeriesStyle;

    fn line(x: Vec<f64>, y: Vec<f64>) -> Series {
        Series::line("l", x, y, SeriesStyle::field()).unwrap()
    }

    #[test]
    fn explicit_ranges_win_over_data() {
        let layout = Layout {
            x_range: Some(AxisRange::new(6.0, 16.0)),
            ..Layout::default()
        };
        let (x, y) = frame_ranges(&[line(vec![0.0, 1.0], vec![2.0, 3.0])], &layout, (400, 400));
        assert_eq!(x, AxisRange::new(6.0, 16.0));
        assert_eq!(y, AxisRange::new(2.0, 3.0));
    }

    #[test]
    fn empty_scene_uses_unit_square() {
        let (x, y) = frame_ranges(&[], &Layout::default(), (400, 400));
        assert_eq!(x, AxisRange::new(0.0, 1.0));
        assert_eq!(y, AxisRange::new(0.0, 1.0));
    }

    #[test]
    fn plot_area_shrinks_by_margins() {
        let s = PlottersSurface::svg(200, 100);
        assert_eq!(s.plot_area_px(), Some((200 - 32, 100 - 32)));
    }
}
