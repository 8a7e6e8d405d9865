//! simplot
//!
//! Incremental render-state synchronization for live 2D simulation plots. A plotter keeps
//! a named, ordered collection of series (line overlays on an optional heatmap base layer)
//! consistent with a rendering surface across repeated partial updates.
//!
//! ### Features
//! - Named series: insert, update in place, remove with position compaction
//! - Bounded-set sync for "up to N indexed lines per frame" callers
//! - Small matplotlib-like styling vocabulary (`color`, `ls`, `marker`, `alpha`, ...)
//! - Aspect-preserving autoscale and explicit axis limits
//! - Heatmap base layer with log transform, fixed or automatic color domain
//! - Surfaces: in-memory recorder, Plotly-shaped JSON scene, SVG/RGB frames via `plotters`
//!
//! ### Example
//! ```no_run
//! use serde_json::json;
//! use simplot::{LinePlotter, MemorySurface, Plot, StyleOptions};
//!
//! let mut plot = LinePlotter::with_surface("traj", MemorySurface::new());
//! plot.add_or_update_line(
//!     Some("orbit"),
//!     &json!([0.0, 1.0, 2.0]),
//!     &json!([0.0, 1.0, 0.0]),
//!     &StyleOptions::new().color("#117733").linestyle("--"),
//! )?;
//! plot.set_aspect_ratio()?;
//! plot.remove_line("orbit")?;
//! # Ok::<(), simplot::PlotError>(())
//! ```

pub mod autoscale;
pub mod encode;
pub mod error;
pub mod heatmap;
pub mod models;
pub mod payload;
pub mod plotter;
pub mod registry;
pub mod renderers;
pub mod style;
pub mod surface;
pub mod types;

pub use error::{PlotError, Result};
pub use heatmap::{ColorDomain, ColorScale, HeatmapData, ValueTransform};
pub use models::{AxisRange, Layout, LayoutPatch, PlotMeta, Series, SeriesData, SeriesKind};
pub use payload::Payload;
pub use plotter::{ColorMapConfig, ColorMapPlotter, LinePlotter, LineSpec, Plot, Renderer};
pub use registry::{SeriesRegistry, Upsert};
pub use renderers::{
    ElectronSpectrumRenderer, FieldLineRenderer, PhotonSpectrumRenderer, TrajectoryRenderer,
};
pub use style::{Rgba, SeriesStyle, StyleOptions};
pub use surface::{JsonSurface, MemorySurface, PlottersSurface, Surface};
pub use types::{DrawMode, FrameFormat};
