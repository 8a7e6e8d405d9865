use log::{debug, warn};

use crate::error::Result;
use crate::heatmap::{ColorDomain, ColorScale, HeatmapData, ValueTransform};
use crate::models::{Layout, LayoutPatch, PlotMeta, Series};
use crate::payload::{Axis, Payload, axis_coords, numeric_grid};
use crate::style::SeriesStyle;
use crate::surface::Surface;
use crate::types::{BASE_LAYER_NAME, DEFAULT_COLORMAP_SIZE_PX};

use super::{Plot, PlotCore, Renderer};

const DEFAULT_TITLE: &str = "2D Color Plot";
const DEFAULT_CBAR_LABEL: &str = "Intensity";

/// How field values become colors.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMapConfig {
    pub transform: ValueTransform,
    /// Used when a frame brings no `zmin`/`zmax` of its own.
    pub domain: ColorDomain,
    pub colorscale: ColorScale,
    pub colorbar_title: String,
}

impl Default for ColorMapConfig {
    fn default() -> Self {
        Self {
            transform: ValueTransform::Identity,
            domain: ColorDomain::Auto,
            colorscale: ColorScale::Viridis,
            colorbar_title: DEFAULT_CBAR_LABEL.to_string(),
        }
    }
}

impl ColorMapConfig {
    pub fn from_meta(meta: &PlotMeta) -> Self {
        let defaults = Self::default();
        Self {
            transform: if meta.log_scale {
                ValueTransform::log10()
            } else {
                ValueTransform::Identity
            },
            domain: ColorDomain::from_bounds(meta.zmin, meta.zmax).unwrap_or(defaults.domain),
            colorscale: meta
                .colorscale
                .as_deref()
                .map_or(defaults.colorscale, scale_or_default),
            colorbar_title: meta.cbar_label.clone().unwrap_or(defaults.colorbar_title),
        }
    }
}

fn scale_or_default(name: &str) -> ColorScale {
    ColorScale::from_name(name).unwrap_or_else(|| {
        warn!("unknown colorscale {name:?}, using Viridis");
        ColorScale::Viridis
    })
}

/// Heatmap plotter: a field at render position 0 with line overlays on top.
pub struct ColorMapPlotter<S: Surface> {
    core: PlotCore<S>,
    config: ColorMapConfig,
    initialized: bool,
}

impl<S: Surface> ColorMapPlotter<S> {
    /// Plotter for the surface found under `id`; `None` means the lookup failed. An
    /// attached plotter starts out showing the empty placeholder field.
    pub fn new(id: impl Into<String>, surface: Option<S>, meta: &PlotMeta) -> Self {
        let mut plotter = Self {
            core: PlotCore::new(id, surface, layout_from_meta(meta)),
            config: ColorMapConfig::from_meta(meta),
            initialized: false,
        };
        if plotter.core.is_attached() {
            // A failing first draw is already logged; the next frame redraws.
            let _ = plotter.init_empty();
        }
        plotter
    }

    pub fn with_surface(id: impl Into<String>, surface: S) -> Self {
        Self::new(id, Some(surface), &PlotMeta::default())
    }

    pub fn with_config(mut self, config: ColorMapConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ColorMapConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ColorMapConfig {
        &mut self.config
    }

    /// Put the placeholder field at position 0 so overlays can be drawn before the
    /// first real frame.
    pub fn init_empty(&mut self) -> Result<()> {
        if !self.core.is_attached() {
            return Ok(());
        }
        let placeholder = HeatmapData::empty().with_colorscale(self.config.colorscale);
        self.core.registry.set_base(Series::heatmap(
            BASE_LAYER_NAME,
            placeholder,
            SeriesStyle::field(),
        ));
        self.initialized = true;
        let result = self.core.redraw();
        self.core.report("init_empty", result)
    }

    /// Replace the base layer only; overlays keep their positions.
    pub fn upsert_base(&mut self, data: HeatmapData, style: SeriesStyle) -> Result<()> {
        if !self.core.is_attached() {
            return Ok(());
        }
        self.core
            .registry
            .set_base(Series::heatmap(BASE_LAYER_NAME, data, style));
        self.initialized = true;
        let result = self.core.redraw();
        self.core.report("upsert_base", result)
    }

    /// Show the field of one frame: `Z` on the `X`/`Y` grid (upper or lower case keys,
    /// 1D vectors or meshgrids). Optional `zmin`/`zmax`, `colorscale`, `cbar_label`,
    /// `title`, `x_label` and `y_label` apply to this frame.
    pub fn plot_2d_array(&mut self, payload: &Payload) -> Result<()> {
        if !self.core.is_attached() {
            return Ok(());
        }
        let built = self.build_field(payload);
        let data = self.core.report("plot_2d_array", built)?;

        let patch = LayoutPatch {
            title: payload.str("title").map(str::to_string),
            x_title: payload
                .get_any(&["x_label", "xlabel"])
                .and_then(|v| v.as_str())
                .map(str::to_string),
            y_title: payload
                .get_any(&["y_label", "ylabel"])
                .and_then(|v| v.as_str())
                .map(str::to_string),
            ..LayoutPatch::default()
        };
        self.core.layout.apply(&patch);
        debug!(
            "[{}] field {}x{} in [{}, {}]",
            self.core.id(),
            data.rows(),
            data.cols(),
            data.zmin,
            data.zmax
        );
        self.upsert_base(data, SeriesStyle::field())
    }

    fn build_field(&self, payload: &Payload) -> Result<HeatmapData> {
        let mut z = numeric_grid("Z", payload.require_any(&["Z", "z"])?)?;
        let x = axis_coords("X", payload.require_any(&["X", "x"])?, Axis::X)?;
        let y = axis_coords("Y", payload.require_any(&["Y", "y"])?, Axis::Y)?;
        self.config.transform.apply_grid(&mut z);

        let domain = ColorDomain::from_bounds(payload.f64("zmin"), payload.f64("zmax"))
            .unwrap_or(self.config.domain);
        let colorscale = payload
            .str("colorscale")
            .map_or(self.config.colorscale, scale_or_default);
        let title = payload
            .str("cbar_label")
            .unwrap_or(self.config.colorbar_title.as_str())
            .to_string();

        Ok(HeatmapData::new(z, x, y)?
            .with_domain(domain)
            .with_colorscale(colorscale)
            .with_colorbar_title(title))
    }
}

fn layout_from_meta(meta: &PlotMeta) -> Layout {
    Layout {
        title: Some(meta.title.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string())),
        x_title: meta.x_label.clone().unwrap_or_else(|| "X".to_string()),
        y_title: meta.y_label.clone().unwrap_or_else(|| "Y".to_string()),
        x_range: None,
        y_range: None,
        scale_ratio: meta
            .scale_ratio
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(1.0),
        lock_aspect: true,
        width: meta.width.unwrap_or(DEFAULT_COLORMAP_SIZE_PX.0),
        height: meta.height.unwrap_or(DEFAULT_COLORMAP_SIZE_PX.1),
        show_legend: false,
    }
}

impl<S: Surface> Plot for ColorMapPlotter<S> {
    type Surface = S;

    fn core(&self) -> &PlotCore<S> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut PlotCore<S> {
        &mut self.core
    }

    fn prepare_overlay(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        self.init_empty()
    }

    fn clear(&mut self) {
        if self.core.is_attached() {
            self.core.clear();
            self.initialized = false;
        }
    }
}

impl<S: Surface> Renderer for ColorMapPlotter<S> {
    fn render(&mut self, payload: &Payload) -> Result<()> {
        self.plot_2d_array(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;
    use serde_json::json;

    #[test]
    fn fresh_plotter_shows_placeholder() {
        let p = ColorMapPlotter::with_surface("cmap", MemorySurface::new());
        let frame = p.surface().unwrap().last_frame().unwrap();
        assert_eq!(frame.names(), vec![BASE_LAYER_NAME]);
        assert_eq!(p.layout().title.as_deref(), Some(DEFAULT_TITLE));
        assert!(p.layout().lock_aspect);
    }

    #[test]
    fn meta_configures_the_field() {
        let meta = PlotMeta::from_value(&json!({
            "colorscale": "nightfall",
            "zmin": -26.0,
            "zmax": -22.0,
            "log_scale": true,
            "cbar_label": "log10 |E|"
        }));
        let cfg = ColorMapConfig::from_meta(&meta);
        assert_eq!(cfg.colorscale, ColorScale::Nightfall);
        assert_eq!(cfg.domain, ColorDomain::Fixed { min: -26.0, max: -22.0 });
        assert_eq!(cfg.transform, ValueTransform::log10());
        assert_eq!(cfg.colorbar_title, "log10 |E|");
        assert_eq!(
            ColorMapConfig::from_meta(&PlotMeta::from_value(&json!({"colorscale": "jet"})))
                .colorscale,
            ColorScale::Viridis
        );
    }

    #[test]
    fn frame_overrides_take_precedence() {
        let mut p = ColorMapPlotter::with_surface("cmap", MemorySurface::new());
        let payload = Payload::from_value(json!({
            "X": [0.0, 1.0, 2.0],
            "Y": [0.0, 1.0],
            "Z": [[1, 2, 3], [4, 5, 6]],
            "zmin": 0.0,
            "zmax": 10.0,
            "cbar_label": "density",
            "title": "step 4"
        }))
        .unwrap();
        p.plot_2d_array(&payload).unwrap();
        let base = p.registry().base().unwrap();
        let crate::models::SeriesData::Heatmap(h) = &base.data else {
            panic!("base layer is not a heatmap");
        };
        assert_eq!((h.zmin, h.zmax), (0.0, 10.0));
        assert_eq!(h.colorbar_title, "density");
        assert!(!h.is_placeholder());
        assert_eq!(p.layout().title.as_deref(), Some("step 4"));
    }
}
