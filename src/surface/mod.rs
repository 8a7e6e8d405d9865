//! Rendering sinks.
//!
//! A [`Surface`] receives the whole render list and layout on every redraw (replace-all
//! semantics) and partial layout changes through [`Surface::relayout`]. Implementations:
//!
//! - [`MemorySurface`]: keeps every call for inspection; useful headless and in tests.
//! - [`JsonSurface`]: keeps a Plotly-shaped JSON scene for a browser bridge.
//! - [`PlottersSurface`]: rasterizes frames to SVG or RGB pixels with `plotters`.

pub mod adapter;
pub mod canvas;
pub mod json;
pub mod memory;

pub use canvas::PlottersSurface;
pub use json::JsonSurface;
pub use memory::{Frame, MemorySurface};

use anyhow::Result;

use crate::models::{Layout, LayoutPatch, Series};

pub trait Surface {
    /// Replace everything on the surface with `series` drawn under `layout`.
    fn full_redraw(&mut self, series: &[Series], layout: &Layout) -> Result<()>;

    /// Merge a partial layout change without touching the primitives.
    fn relayout(&mut self, patch: &LayoutPatch) -> Result<()>;

    /// Tear the surface down; the next redraw starts from scratch.
    fn purge(&mut self);

    /// Pixel size of the plotting area, if the surface has been measured.
    fn plot_area_px(&self) -> Option<(u32, u32)> {
        None
    }
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn full_redraw(&mut self, series: &[Series], layout: &Layout) -> Result<()> {
        (**self).full_redraw(series, layout)
    }

    fn relayout(&mut self, patch: &LayoutPatch) -> Result<()> {
        (**self).relayout(patch)
    }

    fn purge(&mut self) {
        (**self).purge()
    }

    fn plot_area_px(&self) -> Option<(u32, u32)> {
        (**self).plot_area_px()
    }
}
