//! Plotters: one registry, one layout, one color cycle and one surface each.
//!
//! [`PlotCore`] holds the state and the synchronization steps shared by every plotter;
//! the [`Plot`] trait exposes them as the public operations, and [`Renderer`] is the seam
//! for per-experiment renderers that pick their series out of a payload.

pub mod colormap;
pub mod line;

pub use colormap::{ColorMapConfig, ColorMapPlotter};
pub use line::LinePlotter;

use log::{debug, error, warn};
use serde_json::Value;

use crate::autoscale;
use crate::error::{PlotError, Result};
use crate::models::{AxisRange, Layout, LayoutPatch, Series};
use crate::payload::{Payload, numeric_array};
use crate::registry::SeriesRegistry;
use crate::style::{ColorCycle, StyleOptions, translate};
use crate::surface::Surface;
use crate::types::BASE_LAYER_NAME;

/// Per-experiment view of a payload.
pub trait Renderer {
    /// Pick the series of one frame out of `payload` and synchronize them.
    fn render(&mut self, payload: &Payload) -> Result<()>;
}

/// Coordinates and style of one line, as handed to [`Plot::sync_lines`].
#[derive(Debug, Clone, Default)]
pub struct LineSpec {
    pub x: Value,
    pub y: Value,
    pub opts: StyleOptions,
}

impl LineSpec {
    pub fn new(x: impl Into<Value>, y: impl Into<Value>, opts: StyleOptions) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            opts,
        }
    }
}

/// State shared by every plotter.
#[derive(Debug)]
pub struct PlotCore<S> {
    id: String,
    surface: Option<S>,
    pub(crate) registry: SeriesRegistry,
    pub(crate) layout: Layout,
    colors: ColorCycle,
}

impl<S: Surface> PlotCore<S> {
    /// A `None` surface is an initialization failure: it is logged here, once, and every
    /// later operation is a no-op.
    pub fn new(id: impl Into<String>, surface: Option<S>, layout: Layout) -> Self {
        let id = id.into();
        if surface.is_none() {
            error!("{}", PlotError::Initialization(id.clone()));
        }
        Self {
            id,
            surface,
            registry: SeriesRegistry::new(),
            layout,
            colors: ColorCycle::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_attached(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// Log a failed operation at the plotter boundary and hand the error back.
    pub(crate) fn report<T>(&self, op: &str, result: Result<T>) -> Result<T> {
        match &result {
            Err(e @ PlotError::Surface(_)) => error!("[{}] {op}: {e}", self.id),
            Err(e) => warn!("[{}] {op} skipped: {e}", self.id),
            Ok(_) => {}
        }
        result
    }

    /// Push the full render list and layout to the surface.
    pub(crate) fn redraw(&mut self) -> Result<()> {
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };
        surface
            .full_redraw(self.registry.series(), &self.layout)
            .map_err(PlotError::Surface)
    }

    /// Merge `patch` into the layout and forward it to the surface.
    pub(crate) fn relayout(&mut self, patch: &LayoutPatch) -> Result<()> {
        self.layout.apply(patch);
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };
        surface.relayout(patch).map_err(PlotError::Surface)
    }

    /// Validate and style one line. The color comes from the options, else from the
    /// series being replaced, else from the color cycle, which only advances once the
    /// line is accepted.
    pub(crate) fn build_line(
        &mut self,
        name: &str,
        x: &Value,
        y: &Value,
        opts: &StyleOptions,
    ) -> Result<Series> {
        if name == BASE_LAYER_NAME && self.registry.has_base_layer() {
            return Err(PlotError::malformed(name, "name is taken by the base layer"));
        }
        let x = numeric_array(name, x)?;
        let y = numeric_array(name, y)?;
        let (base, from_cycle) = match (opts.parsed_color(), self.registry.get(name)) {
            (Some(c), _) => (c, false),
            (None, Some(existing)) => (existing.style.color.opaque(), false),
            (None, None) => (self.colors.peek(), true),
        };
        let series = Series::line(name, x, y, translate(opts, base))?;
        if from_cycle {
            self.colors.next_color();
        }
        Ok(series)
    }

    pub(crate) fn upsert_line(
        &mut self,
        name: Option<&str>,
        x: &Value,
        y: &Value,
        opts: &StyleOptions,
    ) -> Result<()> {
        let name = name.map_or_else(|| self.registry.next_auto_name(), str::to_string);
        let series = self.build_line(&name, x, y, opts)?;
        let outcome = self.registry.upsert(series);
        debug!("[{}] `{name}` {outcome:?}", self.id);
        self.redraw()
    }

    pub(crate) fn sync_lines<F>(&mut self, prefix: &str, n_max: usize, mut frame: F) -> Result<()>
    where
        F: FnMut(usize) -> Option<LineSpec>,
    {
        let mut built: Vec<Option<Result<Series>>> = (0..n_max)
            .map(|i| {
                frame(i).map(|spec| {
                    let slot = crate::registry::bounded_name(prefix, i);
                    self.build_line(&slot, &spec.x, &spec.y, &spec.opts)
                })
            })
            .collect();
        let synced = self
            .registry
            .sync_bounded(prefix, n_max, |i, _| built.get_mut(i).and_then(Option::take));
        let drawn = self.redraw();
        synced.and(drawn)
    }

    pub(crate) fn set_ax_limits(&mut self, x: AxisRange, y: AxisRange) -> Result<()> {
        if [x.min, x.max, y.min, y.max].iter().any(|v| !v.is_finite()) {
            return Err(PlotError::malformed(
                "axis limits",
                format!("non-finite limits x={x:?} y={y:?}"),
            ));
        }
        self.relayout(&LayoutPatch::ranges(x, y))
    }

    pub(crate) fn set_aspect_ratio(&mut self) -> Result<()> {
        let plot_area = self.surface.as_ref().and_then(Surface::plot_area_px);
        let Some((x, y)) =
            autoscale::autoscale(self.registry.series(), plot_area, self.layout.scale_ratio)
        else {
            debug!("[{}] no finite data, ranges left unchanged", self.id);
            return Ok(());
        };
        self.relayout(&LayoutPatch {
            lock_aspect: Some(true),
            ..LayoutPatch::ranges(x, y)
        })
    }

    /// Tear the surface down and forget every series and color assignment.
    pub(crate) fn clear(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.purge();
        }
        self.registry.reset();
        self.colors.reset();
    }
}

/// Public operations of a plotter. Every operation on a plotter whose surface failed to
/// initialize returns `Ok(())` without doing anything.
pub trait Plot {
    type Surface: Surface;

    fn core(&self) -> &PlotCore<Self::Surface>;

    fn core_mut(&mut self) -> &mut PlotCore<Self::Surface>;

    /// Called before overlays are touched; the colormap plotter uses it to put its
    /// placeholder base layer back after a [`Plot::clear`].
    fn prepare_overlay(&mut self) -> Result<()> {
        Ok(())
    }

    /// Insert the line `name`, or replace it in place. Without a name the first free
    /// `line_<n>` is used.
    fn add_or_update_line(
        &mut self,
        name: Option<&str>,
        x: &Value,
        y: &Value,
        opts: &StyleOptions,
    ) -> Result<()> {
        if !self.core().is_attached() {
            return Ok(());
        }
        let result = self
            .prepare_overlay()
            .and_then(|()| self.core_mut().upsert_line(name, x, y, opts));
        self.core().report("add_or_update_line", result)
    }

    /// Same as [`Plot::add_or_update_line`] for plain vectors.
    fn add_or_update_xy(
        &mut self,
        name: &str,
        x: &[f64],
        y: &[f64],
        opts: &StyleOptions,
    ) -> Result<()> {
        self.add_or_update_line(Some(name), &Value::from(x), &Value::from(y), opts)
    }

    /// Remove `name` if present; absent names are a no-op.
    fn remove_line(&mut self, name: &str) -> Result<()> {
        if !self.core().is_attached() {
            return Ok(());
        }
        let core = self.core_mut();
        let result = match core.registry.remove(name) {
            Some(_) => core.redraw(),
            None => Ok(()),
        };
        self.core().report("remove_line", result)
    }

    /// Bounded-set synchronization over `"{prefix}_0" .. "{prefix}_{n_max - 1}"`: slots
    /// for which `frame` yields a [`LineSpec`] are upserted, the others removed.
    fn sync_lines<F>(&mut self, prefix: &str, n_max: usize, frame: F) -> Result<()>
    where
        F: FnMut(usize) -> Option<LineSpec>,
        Self: Sized,
    {
        if !self.core().is_attached() {
            return Ok(());
        }
        let result = self
            .prepare_overlay()
            .and_then(|()| self.core_mut().sync_lines(prefix, n_max, frame));
        self.core().report("sync_lines", result)
    }

    /// Drop every overlay; a base layer stays.
    fn clear_lines(&mut self) -> Result<()> {
        if !self.core().is_attached() {
            return Ok(());
        }
        let core = self.core_mut();
        core.registry.clear_overlays();
        let result = core.redraw();
        self.core().report("clear_lines", result)
    }

    /// Fix the displayed ranges.
    fn set_ax_limits(&mut self, x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Result<()> {
        if !self.core().is_attached() {
            return Ok(());
        }
        let result = self
            .core_mut()
            .set_ax_limits(AxisRange::new(x_min, x_max), AxisRange::new(y_min, y_max));
        self.core().report("set_ax_limits", result)
    }

    /// Fit the ranges to all registered data with one visual scale on both axes.
    fn set_aspect_ratio(&mut self) -> Result<()> {
        if !self.core().is_attached() {
            return Ok(());
        }
        let result = self.core_mut().set_aspect_ratio();
        self.core().report("set_aspect_ratio", result)
    }

    fn update_layout(&mut self, patch: &LayoutPatch) -> Result<()> {
        if !self.core().is_attached() || patch.is_empty() {
            return Ok(());
        }
        let result = self.core_mut().relayout(patch);
        self.core().report("update_layout", result)
    }

    /// Purge the surface and forget all series.
    fn clear(&mut self) {
        if self.core().is_attached() {
            self.core_mut().clear();
        }
    }

    fn registry(&self) -> &SeriesRegistry {
        &self.core().registry
    }

    fn layout(&self) -> &Layout {
        &self.core().layout
    }

    fn surface(&self) -> Option<&Self::Surface> {
        self.core().surface()
    }
}
