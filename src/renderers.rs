//! Per-experiment renderers. Each one owns a plotter and knows which payload fields make
//! up its series.

use serde_json::{Value, json};

use crate::error::Result;
use crate::heatmap::{ColorDomain, ColorScale};
use crate::models::PlotMeta;
use crate::payload::Payload;
use crate::plotter::{ColorMapConfig, ColorMapPlotter, LinePlotter, LineSpec, Plot, Renderer};
use crate::style::{StyleOptions, palette_color};
use crate::surface::Surface;

/// Highest number of indexed level lines the spectrum renderers show.
pub const MAX_LEVELS: usize = 8;

fn palette_hex(idx: usize) -> String {
    palette_color(idx).to_hex()
}

/// Required payload field; a missing one is logged by the plotter.
fn field<'a, P: Plot>(plotter: &P, payload: &'a Payload, key: &str) -> Result<&'a Value> {
    plotter.core().report("render", payload.require(key))
}

fn solid(color_idx: usize, alpha: f64) -> StyleOptions {
    StyleOptions::new()
        .color(palette_hex(color_idx))
        .linestyle("-")
        .marker("")
        .alpha(alpha)
}

/// Particle trajectory: `x`/`y` and `x`/`y2`, fitted with a shared scale on both axes.
pub struct TrajectoryRenderer<S: Surface> {
    plotter: LinePlotter<S>,
}

impl<S: Surface> TrajectoryRenderer<S> {
    pub fn new(id: impl Into<String>, surface: Option<S>, meta: &PlotMeta) -> Self {
        Self {
            plotter: LinePlotter::new(id, surface, meta),
        }
    }

    pub fn plotter(&self) -> &LinePlotter<S> {
        &self.plotter
    }
}

impl<S: Surface> Renderer for TrajectoryRenderer<S> {
    fn render(&mut self, payload: &Payload) -> Result<()> {
        if !self.plotter.core().is_attached() {
            return Ok(());
        }
        let x = field(&self.plotter, payload, "x")?;
        let y = field(&self.plotter, payload, "y")?;
        let y2 = field(&self.plotter, payload, "y2")?;
        let normal = StyleOptions::new()
            .color(palette_hex(0))
            .linestyle("-")
            .marker("v")
            .alpha(0.3);
        self.plotter
            .add_or_update_line(Some("normal"), x, y, &normal)?;
        let small = StyleOptions::new()
            .color(palette_hex(1))
            .linestyle("--")
            .marker(".")
            .alpha(0.3);
        self.plotter
            .add_or_update_line(Some("small"), x, y2, &small)?;
        self.plotter.set_aspect_ratio()
    }
}

/// Electron spectrum `xel`/`yel` plus one vertical marker line per visible level in
/// `Eelvis`.
pub struct ElectronSpectrumRenderer<S: Surface> {
    plotter: LinePlotter<S>,
}

impl<S: Surface> ElectronSpectrumRenderer<S> {
    pub const X_LIMITS: (f64, f64) = (6.0, 16.0);
    pub const Y_LIMITS: (f64, f64) = (-9.0, 1.0);

    pub fn new(id: impl Into<String>, surface: Option<S>, meta: &PlotMeta) -> Self {
        Self {
            plotter: LinePlotter::new(id, surface, meta),
        }
    }

    pub fn plotter(&self) -> &LinePlotter<S> {
        &self.plotter
    }
}

impl<S: Surface> Renderer for ElectronSpectrumRenderer<S> {
    fn render(&mut self, payload: &Payload) -> Result<()> {
        if !self.plotter.core().is_attached() {
            return Ok(());
        }
        let x = field(&self.plotter, payload, "xel")?;
        let y = field(&self.plotter, payload, "yel")?;
        self.plotter
            .add_or_update_line(Some("electrons"), x, y, &solid(10, 1.0))?;

        let levels: Vec<Value> = payload
            .get("Eelvis")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let (y_min, y_max) = Self::Y_LIMITS;
        self.plotter.sync_lines("electrons", MAX_LEVELS, |i| {
            levels.get(i).map(|e| {
                LineSpec::new(json!([e, e]), json!([y_min, y_max]), solid(i, 0.6))
            })
        })?;

        let (x_min, x_max) = Self::X_LIMITS;
        self.plotter.set_ax_limits(x_min, x_max, y_min, y_max)
    }
}

/// Photon spectrum `xphot`/`yphot` plus the per-level spectra `Ephvis_<i>`, one for each
/// visible electron level.
pub struct PhotonSpectrumRenderer<S: Surface> {
    plotter: LinePlotter<S>,
}

impl<S: Surface> PhotonSpectrumRenderer<S> {
    pub const X_LIMITS: (f64, f64) = (-9.0, 11.0);
    pub const Y_LIMITS: (f64, f64) = (-9.0, 1.0);

    pub fn new(id: impl Into<String>, surface: Option<S>, meta: &PlotMeta) -> Self {
        Self {
            plotter: LinePlotter::new(id, surface, meta),
        }
    }

    pub fn plotter(&self) -> &LinePlotter<S> {
        &self.plotter
    }
}

impl<S: Surface> Renderer for PhotonSpectrumRenderer<S> {
    fn render(&mut self, payload: &Payload) -> Result<()> {
        if !self.plotter.core().is_attached() {
            return Ok(());
        }
        let x = field(&self.plotter, payload, "xphot")?;
        let y = field(&self.plotter, payload, "yphot")?;
        self.plotter
            .add_or_update_line(Some("photons"), x, y, &solid(10, 1.0))?;

        let visible = payload.array_len("Eelvis");
        self.plotter.sync_lines("photons", MAX_LEVELS, |i| {
            if i >= visible {
                return None;
            }
            let y = payload
                .get(&format!("Ephvis_{i}"))
                .cloned()
                .unwrap_or(Value::Null);
            Some(LineSpec::new(x.clone(), y, solid(i, 0.6)))
        })?;

        let (x_min, x_max) = Self::X_LIMITS;
        let (y_min, y_max) = Self::Y_LIMITS;
        self.plotter.set_ax_limits(x_min, x_max, y_min, y_max)
    }
}

/// Field magnitude of a moving charge on a log scale, with the charge's trajectory and
/// current position drawn over it.
pub struct FieldLineRenderer<S: Surface> {
    plotter: ColorMapPlotter<S>,
}

impl<S: Surface> FieldLineRenderer<S> {
    /// Color domain of the log10 field magnitude, pinned so the colors stay comparable
    /// from frame to frame.
    pub const DOMAIN: ColorDomain = ColorDomain::Fixed {
        min: -26.0,
        max: -22.0,
    };

    /// Nightfall colors over log10 values; `meta` may still pin its own `zmin`/`zmax`.
    pub fn new(id: impl Into<String>, surface: Option<S>, meta: &PlotMeta) -> Self {
        let meta = PlotMeta {
            colorscale: Some(ColorScale::Nightfall.name().to_string()),
            log_scale: true,
            ..meta.clone()
        };
        let mut config = ColorMapConfig::from_meta(&meta);
        if meta.zmin.is_none() || meta.zmax.is_none() {
            config.domain = Self::DOMAIN;
        }
        Self {
            plotter: ColorMapPlotter::new(id, surface, &meta).with_config(config),
        }
    }

    pub fn plotter(&self) -> &ColorMapPlotter<S> {
        &self.plotter
    }
}

impl<S: Surface> Renderer for FieldLineRenderer<S> {
    fn render(&mut self, payload: &Payload) -> Result<()> {
        self.plotter.plot_2d_array(payload)?;

        if let (Some(x), Some(y)) = (payload.get("x_traj"), payload.get("y_traj")) {
            let opts = StyleOptions::new().color("grey").linewidth(3.0);
            self.plotter
                .add_or_update_line(Some("charge trajectory"), x, y, &opts)?;
        }
        if let (Some(x), Some(y)) = (payload.get("x_charge"), payload.get("y_charge")) {
            let opts = StyleOptions::new()
                .color("#cec3c3f1")
                .marker(".")
                .markersize(6.0);
            self.plotter
                .add_or_update_line(Some("charge position"), x, y, &opts)?;
        }
        Ok(())
    }
}
