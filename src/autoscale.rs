//! Axis autoscaling: union bounding boxes and aspect-preserving display ranges.

use crate::models::{AxisRange, Series};
use crate::types::{DEFAULT_PLOT_AREA_PX, MIN_RANGE};

/// Bounding box of plotted data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: AxisRange,
    pub y: AxisRange,
}

impl Bounds {
    pub fn new(x: AxisRange, y: AxisRange) -> Self {
        Self { x, y }
    }

    pub fn union(self, other: Bounds) -> Bounds {
        Bounds::new(self.x.union(other.x), self.y.union(other.y))
    }
}

/// Union of the finite extents of `series`; `None` when nothing finite is plotted.
pub fn data_bounds(series: &[Series]) -> Option<Bounds> {
    series
        .iter()
        .filter_map(Series::extent)
        .map(|(x, y)| Bounds::new(x, y))
        .reduce(Bounds::union)
}

/// Width/height ratio of a plot area, falling back to the default area when the surface
/// has not been measured (or reports a degenerate size).
pub fn surface_aspect(plot_area_px: Option<(u32, u32)>) -> f64 {
    let (w, h) = plot_area_px
        .filter(|(w, h)| *w > 0 && *h > 0)
        .unwrap_or(DEFAULT_PLOT_AREA_PX);
    w as f64 / h as f64
}

/// Display ranges for `bounds`.
///
/// With `aspect = Some(a)` (data-width / data-height that maps to equal pixel scale),
/// the narrower axis is widened around its center until `x_span / y_span == a`, so all
/// data stays visible and both axes share one visual scale. With `None` the bounds are
/// returned as they are. Degenerate spans are widened to a small positive minimum, so the
/// result is always finite.
pub fn derive_ranges(bounds: Bounds, aspect: Option<f64>) -> (AxisRange, AxisRange) {
    let (x_center, y_center) = (bounds.x.center(), bounds.y.center());
    let mut x_span = nonzero_span(bounds.x);
    let mut y_span = nonzero_span(bounds.y);

    if let Some(aspect) = aspect {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };
        if x_span / y_span > aspect {
            y_span = x_span / aspect;
        } else {
            x_span = y_span * aspect;
        }
    }

    (
        AxisRange::new(x_center - x_span / 2.0, x_center + x_span / 2.0),
        AxisRange::new(y_center - y_span / 2.0, y_center + y_span / 2.0),
    )
}

/// Derive aspect-locked ranges over every series in `series`.
///
/// `scale_ratio` is the pixel length of one y unit relative to one x unit (1.0 for equal
/// scale). Returns `None` when there is no finite data.
pub fn autoscale(
    series: &[Series],
    plot_area_px: Option<(u32, u32)>,
    scale_ratio: f64,
) -> Option<(AxisRange, AxisRange)> {
    let bounds = data_bounds(series)?;
    let ratio = if scale_ratio.is_finite() && scale_ratio > 0.0 {
        scale_ratio
    } else {
        1.0
    };
    Some(derive_ranges(bounds, Some(ratio * surface_aspect(plot_area_px))))
}

fn nonzero_span(range: AxisRange) -> f64 {
    let span = range.span();
    if span.is_finite() && span > 0.0 {
        span
    } else {
        MIN_RANGE * range.center().abs().max(1.0)
    }
}
