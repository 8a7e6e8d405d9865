//! Base-layer field data: grid validation, value-domain transforms, color domains and the
//! color scales used to paint heatmaps.

use crate::error::{PlotError, Result};
use crate::style::Rgba;
use crate::types::DEFAULT_LOG_FLOOR;

/// Transform applied to field values before they are stored.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ValueTransform {
    #[default]
    Identity,
    /// `log10(max(v, floor))`; non-finite inputs map to `log10(floor)`.
    Log10 { floor: f64 },
}

impl ValueTransform {
    pub fn log10() -> Self {
        ValueTransform::Log10 {
            floor: DEFAULT_LOG_FLOOR,
        }
    }

    pub fn apply(&self, v: f64) -> f64 {
        match *self {
            ValueTransform::Identity => v,
            ValueTransform::Log10 { floor } => {
                let floor = if floor.is_finite() && floor > 0.0 {
                    floor
                } else {
                    DEFAULT_LOG_FLOOR
                };
                let clamped = if v.is_finite() { v.max(floor) } else { floor };
                clamped.log10()
            }
        }
    }

    pub fn apply_grid(&self, grid: &mut [Vec<f64>]) {
        if *self == ValueTransform::Identity {
            return;
        }
        for v in grid.iter_mut().flat_map(|row| row.iter_mut()) {
            *v = self.apply(*v);
        }
    }
}

/// Value range mapped onto the color scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ColorDomain {
    /// Follow the finite min/max of each frame.
    #[default]
    Auto,
    /// Pinned bounds, so fluctuating peaks do not make the colors flicker.
    Fixed { min: f64, max: f64 },
}

impl ColorDomain {
    /// Build from optional bounds; a domain is fixed only when both bounds are present.
    pub fn from_bounds(min: Option<f64>, max: Option<f64>) -> Option<ColorDomain> {
        match (min, max) {
            (Some(min), Some(max)) if min.is_finite() && max.is_finite() => {
                Some(ColorDomain::Fixed { min, max })
            }
            _ => None,
        }
    }

    /// Concrete `(min, max)` for `grid`, always finite and with `min < max`.
    pub fn resolve(&self, grid: &[Vec<f64>]) -> (f64, f64) {
        let (min, max) = match *self {
            ColorDomain::Fixed { min, max } => (min.min(max), min.max(max)),
            ColorDomain::Auto => grid
                .iter()
                .flatten()
                .copied()
                .filter(|v| v.is_finite())
                .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                    None => Some((v, v)),
                    Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                })
                .unwrap_or((0.0, 1.0)),
        };
        if max > min {
            (min, max)
        } else {
            (min - 0.5, max + 0.5)
        }
    }
}

/// Color scales available to heatmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScale {
    #[default]
    Viridis,
    /// Paul Tol's diverging "nightfall" scheme.
    Nightfall,
}

const VIRIDIS: [(f64, (u8, u8, u8)); 10] = [
    (0.0, (68, 1, 84)),
    (0.111, (72, 40, 120)),
    (0.222, (62, 73, 137)),
    (0.333, (49, 104, 142)),
    (0.444, (38, 130, 142)),
    (0.556, (31, 158, 137)),
    (0.667, (53, 183, 121)),
    (0.778, (110, 206, 88)),
    (0.889, (181, 222, 43)),
    (1.0, (253, 231, 37)),
];

const NIGHTFALL: [(f64, (u8, u8, u8)); 16] = [
    (0.0, (0x12, 0x5A, 0x56)),
    (0.066, (0x00, 0x76, 0x7B)),
    (0.133, (0x23, 0x8F, 0x9D)),
    (0.2, (0x42, 0xA7, 0xC6)),
    (0.266, (0x60, 0xBC, 0xE9)),
    (0.333, (0x9D, 0xCC, 0xEF)),
    (0.4, (0xC6, 0xDB, 0xED)),
    (0.466, (0xDE, 0xE6, 0xE7)),
    (0.533, (0xEC, 0xEA, 0xDA)),
    (0.6, (0xF0, 0xE6, 0xB2)),
    (0.666, (0xF9, 0xD5, 0x76)),
    (0.733, (0xFF, 0xB9, 0x54)),
    (0.8, (0xFD, 0x9A, 0x44)),
    (0.866, (0xF5, 0x76, 0x34)),
    (0.933, (0xE9, 0x4C, 0x1F)),
    (1.0, (0xA0, 0x18, 0x13)),
];

impl ColorScale {
    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<ColorScale> {
        match name.trim().to_ascii_lowercase().as_str() {
            "viridis" => Some(ColorScale::Viridis),
            "nightfall" => Some(ColorScale::Nightfall),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorScale::Viridis => "Viridis",
            ColorScale::Nightfall => "Nightfall",
        }
    }

    pub fn stops(&self) -> &'static [(f64, (u8, u8, u8))] {
        match self {
            ColorScale::Viridis => &VIRIDIS,
            ColorScale::Nightfall => &NIGHTFALL,
        }
    }

    /// Color at fraction `t` in `[0, 1]` (clamped), linearly interpolated between stops.
    pub fn sample(&self, t: f64) -> Rgba {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let upper = stops
            .iter()
            .position(|(pos, _)| *pos >= t)
            .unwrap_or(stops.len() - 1);
        if upper == 0 {
            let (r, g, b) = stops[0].1;
            return Rgba::rgb(r, g, b);
        }
        let (p0, c0) = stops[upper - 1];
        let (p1, c1) = stops[upper];
        let f = if p1 > p0 { (t - p0) / (p1 - p0) } else { 0.0 };
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
        Rgba::rgb(lerp(c0.0, c1.0), lerp(c0.1, c1.1), lerp(c0.2, c1.2))
    }

    /// Color of `value` inside the domain `(min, max)`.
    pub fn color_of(&self, value: f64, (min, max): (f64, f64)) -> Rgba {
        self.sample((value - min) / (max - min))
    }
}

/// A 2D scalar field on a rectilinear grid. `z[row][col]` sits at `(x[col], y[row])`;
/// coordinate vectors may also hold the `n + 1` cell edges.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapData {
    pub z: Vec<Vec<f64>>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub zmin: f64,
    pub zmax: f64,
    pub colorscale: ColorScale,
    pub colorbar_title: String,
    pub show_scale: bool,
    placeholder: bool,
}

impl HeatmapData {
    /// Validate grid shape against the coordinate vectors. The color domain starts out
    /// as the data's own range.
    pub fn new(z: Vec<Vec<f64>>, x: Vec<f64>, y: Vec<f64>) -> Result<HeatmapData> {
        let rows = z.len();
        let cols = z.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(PlotError::MissingData("empty Z grid".into()));
        }
        if z.iter().any(|row| row.len() != cols) {
            return Err(PlotError::malformed("Z", "rows have different lengths"));
        }
        if x.len() != cols && x.len() != cols + 1 {
            return Err(PlotError::malformed(
                "X",
                format!("{} coordinates for {cols} columns", x.len()),
            ));
        }
        if y.len() != rows && y.len() != rows + 1 {
            return Err(PlotError::malformed(
                "Y",
                format!("{} coordinates for {rows} rows", y.len()),
            ));
        }
        let (zmin, zmax) = ColorDomain::Auto.resolve(&z);
        Ok(HeatmapData {
            z,
            x,
            y,
            zmin,
            zmax,
            colorscale: ColorScale::default(),
            colorbar_title: "Intensity".to_string(),
            show_scale: true,
            placeholder: false,
        })
    }

    /// The 2×2 zero field shown before the first real frame.
    pub fn empty() -> HeatmapData {
        HeatmapData {
            z: vec![vec![0.0, 0.0], vec![0.0, 0.0]],
            x: vec![0.0, 1.0],
            y: vec![0.0, 1.0],
            zmin: 0.0,
            zmax: 1.0,
            colorscale: ColorScale::default(),
            colorbar_title: String::new(),
            show_scale: true,
            placeholder: true,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn with_domain(mut self, domain: ColorDomain) -> Self {
        (self.zmin, self.zmax) = domain.resolve(&self.z);
        self
    }

    pub fn with_colorscale(mut self, scale: ColorScale) -> Self {
        self.colorscale = scale;
        self
    }

    pub fn with_colorbar_title(mut self, title: impl Into<String>) -> Self {
        self.colorbar_title = title.into();
        self
    }

    pub fn rows(&self) -> usize {
        self.z.len()
    }

    pub fn cols(&self) -> usize {
        self.z.first().map_or(0, Vec::len)
    }

    /// Cell boundaries along x (`cols + 1` values).
    pub fn x_edges(&self) -> Vec<f64> {
        cell_edges(&self.x, self.cols())
    }

    /// Cell boundaries along y (`rows + 1` values).
    pub fn y_edges(&self) -> Vec<f64> {
        cell_edges(&self.y, self.rows())
    }
}

/// Edges from either `n + 1` edges (returned as is) or `n` centers (midpoints, with the
/// outer cells mirrored).
fn cell_edges(coords: &[f64], n: usize) -> Vec<f64> {
    if coords.len() == n + 1 {
        return coords.to_vec();
    }
    match coords {
        [] => Vec::new(),
        [c] => vec![c - 0.5, c + 0.5],
        _ => {
            let mut edges = Vec::with_capacity(coords.len() + 1);
            edges.push(coords[0] - (coords[1] - coords[0]) / 2.0);
            edges.extend(coords.windows(2).map(|w| (w[0] + w[1]) / 2.0));
            let k = coords.len();
            edges.push(coords[k - 1] + (coords[k - 1] - coords[k - 2]) / 2.0);
            edges
        }
    }
}
