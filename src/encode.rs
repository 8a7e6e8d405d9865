//! Plotly-shaped JSON encoding of series and layouts, for handing a scene to a browser
//! rendering engine. Non-finite numbers become `null`, which Plotly draws as gaps.

use serde_json::{Value, json};

use crate::heatmap::HeatmapData;
use crate::models::{AxisRange, Layout, LayoutPatch, Series, SeriesData};
use crate::style::{LineDash, MarkerShape, SeriesStyle};
use crate::types::DrawMode;

pub fn dash_name(dash: LineDash) -> &'static str {
    match dash {
        LineDash::Solid => "solid",
        LineDash::Dash => "dash",
        LineDash::DashDot => "dashdot",
        LineDash::Dot => "dot",
    }
}

pub fn marker_symbol(marker: MarkerShape) -> &'static str {
    match marker {
        MarkerShape::Circle | MarkerShape::Point => "circle",
        MarkerShape::Square => "square",
        MarkerShape::TriangleUp => "triangle-up",
        MarkerShape::TriangleDown => "triangle-down",
        MarkerShape::TriangleLeft => "triangle-left",
        MarkerShape::TriangleRight => "triangle-right",
        MarkerShape::Diamond => "diamond",
        MarkerShape::Cross => "cross",
        MarkerShape::X => "x",
        MarkerShape::Star => "star",
    }
}

fn mode_name(mode: DrawMode) -> &'static str {
    match mode {
        DrawMode::Lines => "lines",
        DrawMode::Markers => "markers",
        DrawMode::LinesMarkers => "lines+markers",
    }
}

/// One trace object.
pub fn trace(series: &Series) -> Value {
    match &series.data {
        SeriesData::Line { x, y } => line_trace(&series.name, x, y, &series.style),
        SeriesData::Heatmap(h) => heatmap_trace(&series.name, h, &series.style),
    }
}

fn line_trace(name: &str, x: &[f64], y: &[f64], style: &SeriesStyle) -> Value {
    let marker_size = match style.marker {
        Some(MarkerShape::Point) => style.marker_size / 2.0,
        _ => style.marker_size,
    };
    json!({
        "type": "scatter",
        "name": name,
        "x": x,
        "y": y,
        "mode": mode_name(style.mode),
        "line": {
            "color": style.color.to_css(),
            "width": style.line_width,
            "dash": dash_name(style.dash),
        },
        "marker": {
            "symbol": marker_symbol(style.marker.unwrap_or(MarkerShape::Circle)),
            "size": marker_size,
            "color": style.marker_color.to_css(),
            "opacity": style.opacity,
            "line": {
                "width": style.marker_edge_width,
                "color": style.marker_edge_color.to_css(),
            },
        },
        "showlegend": style.show_legend,
        "hoverinfo": "none",
    })
}

fn heatmap_trace(name: &str, h: &HeatmapData, style: &SeriesStyle) -> Value {
    let colorscale: Vec<Value> = h
        .colorscale
        .stops()
        .iter()
        .map(|(pos, (r, g, b))| json!([pos, format!("#{r:02X}{g:02X}{b:02X}")]))
        .collect();
    json!({
        "type": "heatmap",
        "name": name,
        "x": h.x,
        "y": h.y,
        "z": h.z,
        "zmin": h.zmin,
        "zmax": h.zmax,
        "colorscale": colorscale,
        "opacity": style.opacity,
        "showscale": h.show_scale,
        "colorbar": {
            "title": { "text": h.colorbar_title, "side": "right", "font": { "size": 14 } },
            "thickness": 20,
            "len": 0.7,
        },
    })
}

/// Plotly's `scaleratio` is pixels per x unit over pixels per y unit, the inverse of
/// [`Layout::scale_ratio`].
fn plotly_scale_ratio(y_per_x: f64) -> f64 {
    if y_per_x.is_finite() && y_per_x > 0.0 {
        1.0 / y_per_x
    } else {
        1.0
    }
}

fn range(r: Option<AxisRange>) -> Value {
    r.map_or(Value::Null, |r| json!([r.min, r.max]))
}

/// Full layout object.
pub fn layout(layout: &Layout) -> Value {
    let mut xaxis = json!({
        "title": { "text": layout.x_title },
        "zeroline": false,
    });
    if layout.lock_aspect {
        xaxis["scaleanchor"] = json!("y");
        xaxis["scaleratio"] = json!(plotly_scale_ratio(layout.scale_ratio));
    }
    if let Some(r) = layout.x_range {
        xaxis["range"] = range(Some(r));
    }
    let mut yaxis = json!({
        "title": { "text": layout.y_title },
        "zeroline": false,
    });
    if let Some(r) = layout.y_range {
        yaxis["range"] = range(Some(r));
    }
    json!({
        "title": { "text": layout.title.clone().unwrap_or_default() },
        "xaxis": xaxis,
        "yaxis": yaxis,
        "width": layout.width,
        "height": layout.height,
        "showlegend": layout.show_legend,
        "margin": { "l": 50, "r": 50, "t": 50, "b": 50 },
    })
}

/// Relayout update in Plotly's dotted-key form; only set fields appear.
pub fn layout_patch(patch: &LayoutPatch) -> Value {
    let mut out = serde_json::Map::new();
    if let Some(t) = &patch.title {
        out.insert("title.text".into(), json!(t));
    }
    if let Some(t) = &patch.x_title {
        out.insert("xaxis.title.text".into(), json!(t));
    }
    if let Some(t) = &patch.y_title {
        out.insert("yaxis.title.text".into(), json!(t));
    }
    if patch.x_range.is_some() {
        out.insert("xaxis.range".into(), range(patch.x_range));
    }
    if patch.y_range.is_some() {
        out.insert("yaxis.range".into(), range(patch.y_range));
    }
    if let Some(r) = patch.scale_ratio {
        out.insert("xaxis.scaleratio".into(), json!(plotly_scale_ratio(r)));
    }
    if let Some(lock) = patch.lock_aspect {
        out.insert(
            "xaxis.scaleanchor".into(),
            if lock { json!("y") } else { Value::Null },
        );
    }
    if let Some(w) = patch.width {
        out.insert("width".into(), json!(w));
    }
    if let Some(h) = patch.height {
        out.insert("height".into(), json!(h));
    }
    if let Some(show) = patch.show_legend {
        out.insert("showlegend".into(), json!(show));
    }
    Value::Object(out)
}

/// `{"data": [...], "layout": {...}}`
pub fn scene(series: &[Series], l: &Layout) -> Value {
    json!({
        "data": series.iter().map(trace).collect::<Vec<_>>(),
        "layout": layout(l),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Rgba, StyleOptions, translate};

    #[test]
    fn line_trace_carries_composited_color() {
        let style = translate(
            &StyleOptions::new().color("#117733").alpha(0.3).marker("v").linestyle("-"),
            Rgba::BLACK,
        );
        let s = Series::line("normal", vec![0.0, 1.0], vec![f64::NAN, 2.0], style).unwrap();
        let t = trace(&s);
        assert_eq!(t["mode"], "lines+markers");
        assert_eq!(t["line"]["color"], "rgba(17, 119, 51, 0.3)");
        assert_eq!(t["marker"]["symbol"], "triangle-down");
        assert!(t["y"][0].is_null());
    }

    #[test]
    fn heatmap_trace_has_fixed_domain() {
        let h = HeatmapData::new(vec![vec![1.0, 2.0]], vec![0.0, 1.0], vec![0.0])
            .unwrap()
            .with_domain(crate::heatmap::ColorDomain::Fixed {
                min: -26.0,
                max: -22.0,
            });
        let t = trace(&Series::heatmap("heatmap", h, SeriesStyle::field()));
        assert_eq!(t["type"], "heatmap");
        assert_eq!(t["zmin"], -26.0);
        assert_eq!(t["zmax"], -22.0);
        assert_eq!(t["colorscale"][0][1], "#440154");
    }

    #[test]
    fn scale_ratio_is_inverted_for_plotly() {
        let l = Layout {
            scale_ratio: 2.0,
            lock_aspect: true,
            ..Layout::default()
        };
        assert_eq!(layout(&l)["xaxis"]["scaleratio"], 0.5);
        let p = layout_patch(&LayoutPatch {
            scale_ratio: Some(4.0),
            ..LayoutPatch::default()
        });
        assert_eq!(p["xaxis.scaleratio"], 0.25);
    }

    #[test]
    fn patch_only_lists_set_keys() {
        let p = layout_patch(&LayoutPatch::ranges(
            AxisRange::new(6.0, 16.0),
            AxisRange::new(-9.0, 1.0),
        ));
        let obj = p.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(p["xaxis.range"], json!([6.0, 16.0]));
    }
}
