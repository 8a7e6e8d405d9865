//! Style translation: a small matplotlib-like option vocabulary mapped onto a normalized
//! [`SeriesStyle`] that every surface encoder understands.
//!
//! The translator never fails. Unknown tokens fall back to documented defaults:
//!
//! | option       | aliases        | default                      |
//! |--------------|----------------|------------------------------|
//! | `color`      | `c`            | next color of the plotter's [`ColorCycle`] |
//! | `linestyle`  | `ls`           | solid                        |
//! | `linewidth`  | `lw`, `width`  | 2                            |
//! | `marker`     | `markerstyle`  | none (unknown token: circle) |
//! | `markersize` | `ms`           | 6                            |
//! | `markercolor`| `mfc`          | line color                   |
//! | `markeredgecolor` | `mec`     | `#000000`                    |
//! | `markeredgewidth` | `mew`     | 1                            |
//! | `alpha`      |                | 1.0, clamped to `[0, 1]`     |
//! | `showlegend` |                | `true`                       |
//!
//! When both a color and `alpha` are given, alpha is composited into the color itself so
//! legend swatches and point fills stay visually consistent.

use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::types::DrawMode;

pub const DEFAULT_LINE_WIDTH: f64 = 2.0;
pub const DEFAULT_MARKER_SIZE: f64 = 6.0;
pub const DEFAULT_EDGE_WIDTH: f64 = 1.0;

/// RGBA color; channels are 8-bit, alpha is a fraction in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self {
            r,
            g,
            b,
            a: clamp01(a),
        }
    }

    /// Create an opaque RGB color.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub const BLACK: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        a: 1.0,
    };

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`, `rgba(r, g, b, a)` or a
    /// small set of named colors.
    pub fn parse(s: &str) -> Option<Rgba> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = s.to_ascii_lowercase();
        if let Some(inner) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_functional(inner);
        }
        named_color(&lower)
    }

    /// Multiply `alpha` into the color's own alpha channel.
    pub fn composite(self, alpha: f64) -> Rgba {
        Rgba::new(self.r, self.g, self.b, self.a * clamp01(alpha))
    }

    /// Same color with full opacity.
    pub fn opaque(self) -> Rgba {
        Rgba::rgb(self.r, self.g, self.b)
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// CSS encoding: hex when opaque, `rgba(r, g, b, a)` otherwise.
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            self.to_hex()
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, round3(self.a))
        }
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => {
            let mut ch = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            Some(Rgba::rgb(ch.next()??, ch.next()??, ch.next()??))
        }
        6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba::new(
            byte(0)?,
            byte(2)?,
            byte(4)?,
            byte(6)? as f64 / 255.0,
        )),
        _ => None,
    }
}

fn parse_functional(inner: &str) -> Option<Rgba> {
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    let channel = |s: &str| s.parse::<f64>().ok().map(|v| v.round().clamp(0.0, 255.0) as u8);
    match parts.as_slice() {
        [r, g, b] => Some(Rgba::rgb(channel(r)?, channel(g)?, channel(b)?)),
        [r, g, b, a] => Some(Rgba::new(
            channel(r)?,
            channel(g)?,
            channel(b)?,
            a.parse::<f64>().ok()?,
        )),
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Rgba> {
    let (r, g, b) = match name {
        "k" | "black" => (0, 0, 0),
        "w" | "white" => (255, 255, 255),
        "r" | "red" => (255, 0, 0),
        "g" | "green" => (0, 128, 0),
        "b" | "blue" => (0, 0, 255),
        "c" | "cyan" => (0, 255, 255),
        "m" | "magenta" => (255, 0, 255),
        "y" | "yellow" => (255, 255, 0),
        "grey" | "gray" => (128, 128, 128),
        "lightgrey" | "lightgray" => (211, 211, 211),
        "darkgrey" | "darkgray" => (169, 169, 169),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "brown" => (165, 42, 42),
        "pink" => (255, 192, 203),
        _ => return None,
    };
    Some(Rgba::rgb(r, g, b))
}

/// Line dash pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineDash {
    Solid,
    Dash,
    DashDot,
    Dot,
}

impl LineDash {
    /// Unknown tokens map to `Solid`.
    pub fn from_token(token: &str) -> LineDash {
        match token.trim() {
            "--" | "dashed" | "dash" => LineDash::Dash,
            "-." | "dashdot" => LineDash::DashDot,
            ":" | "dotted" | "dot" => LineDash::Dot,
            _ => LineDash::Solid,
        }
    }

    /// On/off segment lengths in pixels; empty for a solid stroke.
    pub fn pattern(&self) -> &'static [u32] {
        match self {
            LineDash::Solid => &[],
            LineDash::Dash => &[6, 4],
            LineDash::DashDot => &[6, 4, 2, 4],
            LineDash::Dot => &[2, 4],
        }
    }
}

/// Marker shape for data points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Point,
    Square,
    TriangleUp,
    TriangleDown,
    TriangleLeft,
    TriangleRight,
    Diamond,
    Cross,
    X,
    Star,
}

impl MarkerShape {
    /// `None` for the "no marker" tokens; unknown tokens become `Circle`.
    pub fn from_token(token: &str) -> Option<MarkerShape> {
        let shape = match token.trim() {
            "" | "none" | "None" => return None,
            "o" => MarkerShape::Circle,
            "." => MarkerShape::Point,
            "s" => MarkerShape::Square,
            "^" => MarkerShape::TriangleUp,
            "v" => MarkerShape::TriangleDown,
            "<" => MarkerShape::TriangleLeft,
            ">" => MarkerShape::TriangleRight,
            "d" | "D" => MarkerShape::Diamond,
            "+" => MarkerShape::Cross,
            "x" => MarkerShape::X,
            "*" => MarkerShape::Star,
            other => {
                debug!("unknown marker token {other:?}, using circle");
                MarkerShape::Circle
            }
        };
        Some(shape)
    }
}

/// Caller-facing style options. Every field is optional; see the module table for defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StyleOptions {
    #[serde(alias = "c")]
    pub color: Option<String>,
    #[serde(alias = "ls")]
    pub linestyle: Option<String>,
    #[serde(alias = "lw", alias = "width")]
    pub linewidth: Option<f64>,
    #[serde(alias = "markerstyle")]
    pub marker: Option<String>,
    #[serde(alias = "ms")]
    pub markersize: Option<f64>,
    #[serde(alias = "mfc")]
    pub markercolor: Option<String>,
    #[serde(alias = "mec")]
    pub markeredgecolor: Option<String>,
    #[serde(alias = "mew")]
    pub markeredgewidth: Option<f64>,
    pub alpha: Option<f64>,
    pub showlegend: Option<bool>,
}

impl StyleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read options from a JSON object. Keys of the wrong type, duplicated aliases and
    /// unknown keys are ignored rather than rejected.
    pub fn from_value(value: &Value) -> StyleOptions {
        match serde_json::from_value(value.clone()) {
            Ok(opts) => opts,
            Err(e) => {
                debug!("style options not strictly typed ({e}), reading leniently");
                Self::lenient(value)
            }
        }
    }

    fn lenient(value: &Value) -> StyleOptions {
        let Some(map) = value.as_object() else {
            return StyleOptions::default();
        };
        let pick = |keys: &[&str]| keys.iter().find_map(|k| map.get(*k));
        let string = |keys: &[&str]| pick(keys).and_then(Value::as_str).map(str::to_string);
        let number = |keys: &[&str]| pick(keys).and_then(Value::as_f64);
        StyleOptions {
            color: string(&["color", "c"]),
            linestyle: string(&["linestyle", "ls"]),
            linewidth: number(&["linewidth", "lw", "width"]),
            marker: string(&["marker", "markerstyle"]),
            markersize: number(&["markersize", "ms"]),
            markercolor: string(&["markercolor", "mfc"]),
            markeredgecolor: string(&["markeredgecolor", "mec"]),
            markeredgewidth: number(&["markeredgewidth", "mew"]),
            alpha: number(&["alpha"]),
            showlegend: pick(&["showlegend"]).and_then(Value::as_bool),
        }
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn linestyle(mut self, token: impl Into<String>) -> Self {
        self.linestyle = Some(token.into());
        self
    }

    pub fn linewidth(mut self, width: f64) -> Self {
        self.linewidth = Some(width);
        self
    }

    pub fn marker(mut self, token: impl Into<String>) -> Self {
        self.marker = Some(token.into());
        self
    }

    pub fn markersize(mut self, size: f64) -> Self {
        self.markersize = Some(size);
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    pub fn showlegend(mut self, show: bool) -> Self {
        self.showlegend = Some(show);
        self
    }

    /// The explicit color override, if present and parseable.
    pub fn parsed_color(&self) -> Option<Rgba> {
        let raw = self.color.as_deref()?;
        let parsed = Rgba::parse(raw);
        if parsed.is_none() {
            debug!("unparseable color {raw:?}, falling back to the color cycle");
        }
        parsed
    }
}

/// Normalized, renderer-independent style of one series.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesStyle {
    /// Stroke color with alpha already composited in.
    pub color: Rgba,
    pub line_width: f64,
    pub dash: LineDash,
    pub marker: Option<MarkerShape>,
    pub marker_size: f64,
    pub marker_color: Rgba,
    pub marker_edge_color: Rgba,
    pub marker_edge_width: f64,
    pub opacity: f64,
    pub show_legend: bool,
    pub mode: DrawMode,
}

impl SeriesStyle {
    /// Style used for the base heatmap layer, which only consults opacity and legend flags.
    pub fn field() -> Self {
        translate(&StyleOptions::default(), Rgba::BLACK)
    }
}

/// Translate caller options into a [`SeriesStyle`], using `base_color` when no (valid)
/// color override is given.
pub fn translate(opts: &StyleOptions, base_color: Rgba) -> SeriesStyle {
    let opacity = clamp01(opts.alpha.filter(|a| a.is_finite()).unwrap_or(1.0));
    let color = opts.parsed_color().unwrap_or(base_color).composite(opacity);

    let marker = opts.marker.as_deref().and_then(MarkerShape::from_token);
    let mode = match (marker, opts.linestyle.is_some()) {
        (None, _) => DrawMode::Lines,
        (Some(_), true) => DrawMode::LinesMarkers,
        (Some(_), false) => DrawMode::Markers,
    };

    let marker_color = opts
        .markercolor
        .as_deref()
        .and_then(Rgba::parse)
        .map(|c| c.composite(opacity))
        .unwrap_or(color);

    SeriesStyle {
        color,
        line_width: positive_or(opts.linewidth, DEFAULT_LINE_WIDTH),
        dash: opts
            .linestyle
            .as_deref()
            .map(LineDash::from_token)
            .unwrap_or(LineDash::Solid),
        marker,
        marker_size: positive_or(opts.markersize, DEFAULT_MARKER_SIZE),
        marker_color,
        marker_edge_color: opts
            .markeredgecolor
            .as_deref()
            .and_then(Rgba::parse)
            .unwrap_or(Rgba::BLACK),
        marker_edge_width: opts
            .markeredgewidth
            .filter(|w| w.is_finite() && *w >= 0.0)
            .unwrap_or(DEFAULT_EDGE_WIDTH),
        opacity,
        show_legend: opts.showlegend.unwrap_or(true),
        mode,
    }
}

/// Paul Tol's "muted" qualitative palette.
const MUTED: [(u8, u8, u8); 11] = [
    (204, 102, 119), // rose     (#CC6677)
    (51, 34, 136),   // indigo   (#332288)
    (221, 204, 119), // sand     (#DDCC77)
    (17, 119, 51),   // green    (#117733)
    (136, 204, 238), // cyan     (#88CCEE)
    (136, 34, 85),   // wine     (#882255)
    (68, 170, 153),  // teal     (#44AA99)
    (153, 153, 51),  // olive    (#999933)
    (170, 68, 153),  // purple   (#AA4499)
    (221, 221, 221), // pale grey(#DDDDDD)
    (0, 0, 0),       // black    (#000000)
];

/// Palette color by index, wrapping around.
#[inline]
pub fn palette_color(idx: usize) -> Rgba {
    let (r, g, b) = MUTED[idx % MUTED.len()];
    Rgba::rgb(r, g, b)
}

/// Per-plotter color cycling state.
#[derive(Debug, Clone, Default)]
pub struct ColorCycle {
    next: usize,
}

impl ColorCycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Color the next call to [`ColorCycle::next_color`] will hand out.
    pub fn peek(&self) -> Rgba {
        palette_color(self.next)
    }

    pub fn next_color(&mut self) -> Rgba {
        let color = palette_color(self.next);
        self.next += 1;
        color
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }
}

fn positive_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(default)
}

fn clamp01(x: f64) -> f64 {
    if x.is_nan() { 1.0 } else { x.clamp(0.0, 1.0) }
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}
