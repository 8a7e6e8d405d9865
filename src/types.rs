//! Shared constants and small public enums.

/// Plot-area size assumed by the autoscaler when the surface has not been measured yet.
pub const DEFAULT_PLOT_AREA_PX: (u32, u32) = (400, 400);

/// Smallest axis span the autoscaler will produce (relative to the axis center magnitude).
pub const MIN_RANGE: f64 = 1e-9;

/// Default surface size for colormap plots (matches the browser container defaults).
pub const DEFAULT_COLORMAP_SIZE_PX: (u32, u32) = (600, 500);

/// Default surface size for line charts.
pub const DEFAULT_CHART_SIZE_PX: (u32, u32) = (640, 480);

/// Floor applied before taking a logarithm of field values.
pub const DEFAULT_LOG_FLOOR: f64 = 1e-36;

/// Prefix of auto-generated overlay names (`line_0`, `line_1`, ...).
pub const AUTO_NAME_PREFIX: &str = "line";

/// Name under which the base heatmap layer is stored.
pub const BASE_LAYER_NAME: &str = "heatmap";

/// Which draw primitives a line series uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawMode {
    /// Connected polyline only.
    Lines,
    /// Markers only.
    Markers,
    /// Polyline with markers at every point.
    LinesMarkers,
}

/// Output encoding of the plotters-backed surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// SVG document kept as a `String`.
    Svg,
    /// Packed RGB8 pixel buffer.
    Bitmap,
}
