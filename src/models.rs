use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PlotError, Result};
use crate::heatmap::HeatmapData;
use crate::style::SeriesStyle;

/// Closed numeric interval shown on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn center(&self) -> f64 {
        (self.max + self.min) / 2.0
    }

    pub fn union(self, other: AxisRange) -> AxisRange {
        AxisRange::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Smallest range containing every finite value, `None` when there is none.
    pub fn of_values(values: &[f64]) -> Option<AxisRange> {
        values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<AxisRange>, v| match acc {
                None => Some(AxisRange::new(v, v)),
                Some(r) => Some(AxisRange::new(r.min.min(v), r.max.max(v))),
            })
    }
}

/// Kind of a render primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Line,
    Heatmap,
}

/// Coordinate payload of a series.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesData {
    /// Paired coordinates; NaN entries break the line.
    Line { x: Vec<f64>, y: Vec<f64> },
    Heatmap(HeatmapData),
}

/// One named element of the render list.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub data: SeriesData,
    pub style: SeriesStyle,
}

impl Series {
    /// Build a line series, rejecting empty or mismatched coordinate vectors.
    pub fn line(
        name: impl Into<String>,
        x: Vec<f64>,
        y: Vec<f64>,
        style: SeriesStyle,
    ) -> Result<Series> {
        let name = name.into();
        if x.is_empty() || y.is_empty() {
            return Err(PlotError::MissingData(format!("empty x or y for `{name}`")));
        }
        if x.len() != y.len() {
            return Err(PlotError::malformed(
                &name,
                format!("x has {} values, y has {}", x.len(), y.len()),
            ));
        }
        Ok(Series {
            name,
            data: SeriesData::Line { x, y },
            style,
        })
    }

    pub fn heatmap(name: impl Into<String>, data: HeatmapData, style: SeriesStyle) -> Series {
        Series {
            name: name.into(),
            data: SeriesData::Heatmap(data),
            style,
        }
    }

    pub fn kind(&self) -> SeriesKind {
        match self.data {
            SeriesData::Line { .. } => SeriesKind::Line,
            SeriesData::Heatmap(_) => SeriesKind::Heatmap,
        }
    }

    /// Line points as `(x, y)` pairs; empty for heatmaps.
    pub fn points(&self) -> Vec<(f64, f64)> {
        match &self.data {
            SeriesData::Line { x, y } => x.iter().copied().zip(y.iter().copied()).collect(),
            SeriesData::Heatmap(_) => Vec::new(),
        }
    }

    /// Finite coordinate extent of the series, `None` if it has no finite point.
    pub fn extent(&self) -> Option<(AxisRange, AxisRange)> {
        match &self.data {
            SeriesData::Line { x, y } => {
                let finite: (Vec<f64>, Vec<f64>) = x
                    .iter()
                    .zip(y.iter())
                    .filter(|(a, b)| a.is_finite() && b.is_finite())
                    .map(|(a, b)| (*a, *b))
                    .unzip();
                Some((AxisRange::of_values(&finite.0)?, AxisRange::of_values(&finite.1)?))
            }
            SeriesData::Heatmap(h) if h.is_placeholder() => None,
            SeriesData::Heatmap(h) => {
                Some((AxisRange::of_values(&h.x)?, AxisRange::of_values(&h.y)?))
            }
        }
    }
}

/// Axis, title and sizing state of one plot surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: Option<String>,
    pub x_title: String,
    pub y_title: String,
    pub x_range: Option<AxisRange>,
    pub y_range: Option<AxisRange>,
    /// Pixels per y unit divided by pixels per x unit when the aspect is locked.
    pub scale_ratio: f64,
    pub lock_aspect: bool,
    pub width: u32,
    pub height: u32,
    pub show_legend: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            title: None,
            x_title: "x".to_string(),
            y_title: "y".to_string(),
            x_range: None,
            y_range: None,
            scale_ratio: 1.0,
            lock_aspect: false,
            width: crate::types::DEFAULT_CHART_SIZE_PX.0,
            height: crate::types::DEFAULT_CHART_SIZE_PX.1,
            show_legend: false,
        }
    }
}

impl Layout {
    /// Merge the set fields of `patch` into this layout.
    pub fn apply(&mut self, patch: &LayoutPatch) {
        if let Some(title) = &patch.title {
            self.title = Some(title.clone());
        }
        if let Some(t) = &patch.x_title {
            self.x_title = t.clone();
        }
        if let Some(t) = &patch.y_title {
            self.y_title = t.clone();
        }
        if patch.x_range.is_some() {
            self.x_range = patch.x_range;
        }
        if patch.y_range.is_some() {
            self.y_range = patch.y_range;
        }
        if let Some(r) = patch.scale_ratio.filter(|r| r.is_finite() && *r > 0.0) {
            self.scale_ratio = r;
        }
        if let Some(lock) = patch.lock_aspect {
            self.lock_aspect = lock;
        }
        if let Some(w) = patch.width.filter(|w| *w > 0) {
            self.width = w;
        }
        if let Some(h) = patch.height.filter(|h| *h > 0) {
            self.height = h;
        }
        if let Some(show) = patch.show_legend {
            self.show_legend = show;
        }
    }
}

/// Partial layout change; unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutPatch {
    pub title: Option<String>,
    pub x_title: Option<String>,
    pub y_title: Option<String>,
    pub x_range: Option<AxisRange>,
    pub y_range: Option<AxisRange>,
    pub scale_ratio: Option<f64>,
    pub lock_aspect: Option<bool>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub show_legend: Option<bool>,
}

impl LayoutPatch {
    pub fn ranges(x: AxisRange, y: AxisRange) -> Self {
        Self {
            x_range: Some(x),
            y_range: Some(y),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == LayoutPatch::default()
    }
}

/// Construction-time metadata of a plotter, usually the `meta` object handed over with
/// the plot container.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlotMeta {
    pub title: Option<String>,
    #[serde(alias = "xlabel")]
    pub x_label: Option<String>,
    #[serde(alias = "ylabel")]
    pub y_label: Option<String>,
    pub colorscale: Option<String>,
    pub cbar_label: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub scale_ratio: Option<f64>,
    pub zmin: Option<f64>,
    pub zmax: Option<f64>,
    pub log_scale: bool,
}

impl PlotMeta {
    /// Lenient read: a malformed meta object is logged and replaced by defaults.
    pub fn from_value(value: &Value) -> PlotMeta {
        if value.is_null() {
            return PlotMeta::default();
        }
        serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            log::warn!("ignoring malformed plot meta: {e}");
            PlotMeta::default()
        })
    }
}
