use crate::error::Result;
use crate::models::{Layout, PlotMeta};
use crate::payload::Payload;
use crate::style::StyleOptions;
use crate::surface::Surface;
use crate::types::DEFAULT_CHART_SIZE_PX;

use super::{Plot, PlotCore, Renderer};

/// Series name used when a payload is rendered without a `name` field.
const DEFAULT_SERIES: &str = "data";

/// Line-chart plotter: named overlays only, no base layer.
pub struct LinePlotter<S: Surface> {
    core: PlotCore<S>,
}

impl<S: Surface> LinePlotter<S> {
    /// Plotter for the surface found under `id`; `None` means the lookup failed.
    pub fn new(id: impl Into<String>, surface: Option<S>, meta: &PlotMeta) -> Self {
        Self {
            core: PlotCore::new(id, surface, layout_from_meta(meta)),
        }
    }

    pub fn with_surface(id: impl Into<String>, surface: S) -> Self {
        Self::new(id, Some(surface), &PlotMeta::default())
    }
}

fn layout_from_meta(meta: &PlotMeta) -> Layout {
    let defaults = Layout::default();
    Layout {
        title: meta.title.clone(),
        x_title: meta.x_label.clone().unwrap_or(defaults.x_title),
        y_title: meta.y_label.clone().unwrap_or(defaults.y_title),
        scale_ratio: meta
            .scale_ratio
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(defaults.scale_ratio),
        width: meta.width.unwrap_or(DEFAULT_CHART_SIZE_PX.0),
        height: meta.height.unwrap_or(DEFAULT_CHART_SIZE_PX.1),
        ..defaults
    }
}

impl<S: Surface> Plot for LinePlotter<S> {
    type Surface = S;

    fn core(&self) -> &PlotCore<S> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut PlotCore<S> {
        &mut self.core
    }
}

/// Plots the payload's `x`/`y` as one series, named by the payload's `name` field.
impl<S: Surface> Renderer for LinePlotter<S> {
    fn render(&mut self, payload: &Payload) -> Result<()> {
        if !self.core.is_attached() {
            return Ok(());
        }
        let picked = payload
            .require("x")
            .and_then(|x| payload.require("y").map(|y| (x, y)));
        let (x, y) = self.core.report("render", picked)?;
        let name = payload.str("name").unwrap_or(DEFAULT_SERIES).to_string();
        let opts = payload
            .get("style")
            .map(StyleOptions::from_value)
            .unwrap_or_default();
        self.add_or_update_line(Some(&name), x, y, &opts)
    }
}
