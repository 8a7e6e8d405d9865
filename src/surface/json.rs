use anyhow::{Result, anyhow};
use serde_json::Value;

use super::Surface;
use crate::encode;
use crate::models::{Layout, LayoutPatch, Series};

/// Keeps the current scene as Plotly-shaped JSON (`{"data": [...], "layout": {...}}`),
/// ready to be passed to `Plotly.react` on the browser side.
#[derive(Debug, Clone, Default)]
pub struct JsonSurface {
    scene: Option<Value>,
    layout: Layout,
    plot_area: Option<(u32, u32)>,
}

impl JsonSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the measured plot area reported by the browser.
    pub fn set_plot_area(&mut self, width: u32, height: u32) {
        self.plot_area = Some((width, height));
    }

    /// Current scene, `None` before the first redraw or after a purge.
    pub fn scene(&self) -> Option<&Value> {
        self.scene.as_ref()
    }

    pub fn to_json_string(&self) -> Result<String> {
        let scene = self.scene.as_ref().ok_or_else(|| anyhow!("surface is empty"))?;
        Ok(serde_json::to_string(scene)?)
    }
}

impl Surface for JsonSurface {
    fn full_redraw(&mut self, series: &[Series], layout: &Layout) -> Result<()> {
        self.layout = layout.clone();
        self.scene = Some(encode::scene(series, layout));
        Ok(())
    }

    /// Before the first redraw only the stored layout changes.
    fn relayout(&mut self, patch: &LayoutPatch) -> Result<()> {
        self.layout.apply(patch);
        if let Some(scene) = self.scene.as_mut() {
            scene["layout"] = encode::layout(&self.layout);
        }
        Ok(())
    }

    fn purge(&mut self) {
        self.scene = None;
    }

    fn plot_area_px(&self) -> Option<(u32, u32)> {
        self.plot_area
    }
}
