use anyhow::{Result, bail};

use super::Surface;
use crate::models::{Layout, LayoutPatch, Series};

/// One accepted full redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub series: Vec<Series>,
    pub layout: Layout,
}

impl Frame {
    pub fn names(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Surface that records every call instead of drawing.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    frames: Vec<Frame>,
    relayouts: Vec<LayoutPatch>,
    purges: usize,
    live: bool,
    plot_area: Option<(u32, u32)>,
    fail_redraws: bool,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a measured plot area to the autoscaler.
    pub fn with_plot_area(mut self, width: u32, height: u32) -> Self {
        self.plot_area = Some((width, height));
        self
    }

    /// Make every following redraw fail, as a broken rendering engine would.
    pub fn set_failing(&mut self, failing: bool) {
        self.fail_redraws = failing;
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn redraw_count(&self) -> usize {
        self.frames.len()
    }

    pub fn relayouts(&self) -> &[LayoutPatch] {
        &self.relayouts
    }

    pub fn purge_count(&self) -> usize {
        self.purges
    }

    /// Whether the surface currently shows something (a redraw since the last purge).
    pub fn is_live(&self) -> bool {
        self.live
    }
}

impl Surface for MemorySurface {
    fn full_redraw(&mut self, series: &[Series], layout: &Layout) -> Result<()> {
        if self.fail_redraws {
            bail!("redraw rejected");
        }
        self.frames.push(Frame {
            series: series.to_vec(),
            layout: layout.clone(),
        });
        self.live = true;
        Ok(())
    }

    fn relayout(&mut self, patch: &LayoutPatch) -> Result<()> {
        if self.fail_redraws {
            bail!("relayout rejected");
        }
        self.relayouts.push(patch.clone());
        Ok(())
    }

    fn purge(&mut self) {
        self.purges += 1;
        self.live = false;
    }

    fn plot_area_px(&self) -> Option<(u32, u32)> {
        self.plot_area
    }
}
