//! Mapping of [`SeriesStyle`] onto the plotters crate, plus the series drawing helpers the
//! plotters surface uses.
//!
//! Usage (inside a chart drawing function):
//! ```ignore
//!     use crate::surface::adapter::{draw_markers, draw_polyline};
//!
//!     draw_polyline(&mut chart, &series.points(), &series.style)?;
//!     draw_markers(&mut chart, &series.points(), &series.style)?;
//! ```

use anyhow::{Result, anyhow};
use plotters::coord::Shift;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;

use crate::heatmap::HeatmapData;
use crate::style::{MarkerShape, Rgba, SeriesStyle};

pub type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

pub fn rgba_color(c: Rgba) -> RGBAColor {
    RGBAColor(c.r, c.g, c.b, c.a)
}

fn px(v: f64) -> u32 {
    v.round().max(1.0) as u32
}

/// Stroke for the polyline of a series.
pub fn line_style(style: &SeriesStyle) -> ShapeStyle {
    rgba_color(style.color).stroke_width(px(style.line_width))
}

/// Marker body.
pub fn fill_style(style: &SeriesStyle) -> ShapeStyle {
    rgba_color(style.marker_color).filled()
}

/// Marker outline; a zero edge width disables it.
pub fn edge_style(style: &SeriesStyle) -> Option<ShapeStyle> {
    (style.marker_edge_width > 0.0)
        .then(|| rgba_color(style.marker_edge_color).stroke_width(px(style.marker_edge_width)))
}

/// Maximal runs of finite points; NaN coordinates split a line.
pub fn finite_runs(points: &[(f64, f64)]) -> Vec<Vec<(f64, f64)>> {
    points
        .split(|(x, y)| !x.is_finite() || !y.is_finite())
        .filter(|run| !run.is_empty())
        .map(<[_]>::to_vec)
        .collect()
}

/// Draw the line of a series, honoring its dash pattern. Plotters dashes are uniform, so
/// dash-dot is drawn with its long dash.
pub fn draw_polyline<DB: DrawingBackend>(
    chart: &mut Chart<'_, DB>,
    points: &[(f64, f64)],
    style: &SeriesStyle,
) -> Result<()> {
    let stroke = line_style(style);
    for run in finite_runs(points) {
        match style.dash.pattern() {
            [] => chart
                .draw_series(LineSeries::new(run, stroke))
                .map(|_| ())
                .map_err(|e| anyhow!("{:?}", e))?,
            [size, spacing, ..] => chart
                .draw_series(DashedLineSeries::new(run, *size, *spacing, stroke))
                .map(|_| ())
                .map_err(|e| anyhow!("{:?}", e))?,
            [size] => chart
                .draw_series(DashedLineSeries::new(run, *size, *size, stroke))
                .map(|_| ())
                .map_err(|e| anyhow!("{:?}", e))?,
        }
    }
    Ok(())
}

fn star_vertices(s: i32) -> Vec<(i32, i32)> {
    (0..10)
        .map(|k| {
            let r = if k % 2 == 0 { s as f64 } else { s as f64 * 0.45 };
            let angle = std::f64::consts::PI * (k as f64) / 5.0 - std::f64::consts::FRAC_PI_2;
            ((r * angle.cos()).round() as i32, (r * angle.sin()).round() as i32)
        })
        .collect()
}

fn closed(mut vertices: Vec<(i32, i32)>) -> Vec<(i32, i32)> {
    if let Some(first) = vertices.first().copied() {
        vertices.push(first);
    }
    vertices
}

fn polygons<DB: DrawingBackend>(
    chart: &mut Chart<'_, DB>,
    pts: &[(f64, f64)],
    vertices: Vec<(i32, i32)>,
    fill: ShapeStyle,
    edge: ShapeStyle,
) -> Result<()> {
    let outline = closed(vertices.clone());
    chart
        .draw_series(pts.iter().map(|&c| {
            EmptyElement::at(c)
                + Polygon::new(vertices.clone(), fill)
                + PathElement::new(outline.clone(), edge)
        }))
        .map(|_| ())
        .map_err(|e| anyhow!("{:?}", e))
}

/// Draw one marker per finite point. Marker size is a diameter, as in the styling
/// vocabulary.
pub fn draw_markers<DB: DrawingBackend>(
    chart: &mut Chart<'_, DB>,
    points: &[(f64, f64)],
    style: &SeriesStyle,
) -> Result<()> {
    let Some(shape) = style.marker else {
        return Ok(());
    };
    let s = ((style.marker_size / 2.0).round() as i32).max(1);
    let fill = fill_style(style);
    let edge = edge_style(style).unwrap_or(fill);
    let stroke = rgba_color(style.marker_color).stroke_width(2);
    let pts: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();

    match shape {
        MarkerShape::Circle => chart
            .draw_series(pts.iter().map(|&c| {
                EmptyElement::at(c) + Circle::new((0, 0), s, fill) + Circle::new((0, 0), s, edge)
            }))
            .map(|_| ())
            .map_err(|e| anyhow!("{:?}", e)),
        MarkerShape::Point => chart
            .draw_series(
                pts.iter()
                    .map(|&c| EmptyElement::at(c) + Circle::new((0, 0), (s / 2).max(1), fill)),
            )
            .map(|_| ())
            .map_err(|e| anyhow!("{:?}", e)),
        MarkerShape::Square => chart
            .draw_series(pts.iter().map(|&c| {
                EmptyElement::at(c)
                    + Rectangle::new([(-s, -s), (s, s)], fill)
                    + Rectangle::new([(-s, -s), (s, s)], edge)
            }))
            .map(|_| ())
            .map_err(|e| anyhow!("{:?}", e)),
        MarkerShape::TriangleUp => polygons(chart, &pts, vec![(0, -s), (-s, s), (s, s)], fill, edge),
        MarkerShape::TriangleDown => polygons(chart, &pts, vec![(0, s), (-s, -s), (s, -s)], fill, edge),
        MarkerShape::TriangleLeft => polygons(chart, &pts, vec![(-s, 0), (s, -s), (s, s)], fill, edge),
        MarkerShape::TriangleRight => polygons(chart, &pts, vec![(s, 0), (-s, -s), (-s, s)], fill, edge),
        MarkerShape::Diamond => {
            polygons(chart, &pts, vec![(0, -s), (-s, 0), (0, s), (s, 0)], fill, edge)
        }
        MarkerShape::Star => polygons(chart, &pts, star_vertices(s), fill, edge),
        MarkerShape::Cross => chart
            .draw_series(pts.iter().map(|&c| {
                EmptyElement::at(c)
                    + PathElement::new(vec![(-s, 0), (s, 0)], stroke)
                    + PathElement::new(vec![(0, -s), (0, s)], stroke)
            }))
            .map(|_| ())
            .map_err(|e| anyhow!("{:?}", e)),
        MarkerShape::X => chart
            .draw_series(pts.iter().map(|&c| {
                EmptyElement::at(c)
                    + PathElement::new(vec![(-s, -s), (s, s)], stroke)
                    + PathElement::new(vec![(-s, s), (s, -s)], stroke)
            }))
            .map(|_| ())
            .map_err(|e| anyhow!("{:?}", e)),
    }
}

/// Paint every finite cell of a field as a filled rectangle.
pub fn draw_heatmap<DB: DrawingBackend>(
    chart: &mut Chart<'_, DB>,
    heatmap: &HeatmapData,
    opacity: f64,
) -> Result<()> {
    let xe = heatmap.x_edges();
    let ye = heatmap.y_edges();
    let domain = (heatmap.zmin, heatmap.zmax);
    let cells = heatmap.z.iter().enumerate().flat_map(|(r, row)| {
        row.iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(move |(c, v)| (r, c, *v))
    });
    chart
        .draw_series(cells.map(|(r, c, v)| {
            let color = heatmap.colorscale.color_of(v, domain).composite(opacity);
            Rectangle::new(
                [(xe[c], ye[r]), (xe[c + 1], ye[r + 1])],
                rgba_color(color).filled(),
            )
        }))
        .map(|_| ())
        .map_err(|e| anyhow!("{:?}", e))
}

/// Vertical color bar spanning the middle 70% of `area`, low values at the bottom.
pub fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    heatmap: &HeatmapData,
    with_labels: bool,
) -> Result<()> {
    const BANDS: i32 = 64;
    let (w, h) = area.dim_in_pixel();
    let (w, h) = (w as i32, h as i32);
    let x0 = w / 5;
    let x1 = x0 + (w / 5).max(6);
    let top = h * 15 / 100;
    let bottom = h * 85 / 100;
    let span = (bottom - top).max(1);

    for i in 0..BANDS {
        let y_lo = bottom - span * i / BANDS;
        let y_hi = bottom - span * (i + 1) / BANDS;
        let color = heatmap
            .colorscale
            .sample((i as f64 + 0.5) / BANDS as f64);
        area.draw(&Rectangle::new(
            [(x0, y_hi), (x1, y_lo)],
            rgba_color(color).filled(),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }
    area.draw(&Rectangle::new([(x0, top), (x1, bottom)], BLACK.stroke_width(1)))
        .map_err(|e| anyhow!("{:?}", e))?;

    if with_labels {
        let font = (FontFamily::SansSerif, 12);
        for (value, y) in [(heatmap.zmax, top), (heatmap.zmin, bottom)] {
            area.draw(&Text::new(format_tick(value), (x1 + 4, y - 6), font))
                .map_err(|e| anyhow!("{:?}", e))?;
        }
        if !heatmap.colorbar_title.is_empty() {
            area.draw(&Text::new(
                heatmap.colorbar_title.clone(),
                (x0, (top - 24).max(0)),
                font,
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
        }
    }
    Ok(())
}

/// Tick text with precision chosen by magnitude.
pub fn format_tick(v: f64) -> String {
    let a = v.abs();
    let prec = if a >= 100.0 {
        0
    } else if a >= 10.0 {
        1
    } else {
        2
    };
    format!("{:.*}", prec, v)
}
