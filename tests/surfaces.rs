use serde_json::json;
use simplot::plotter::{ColorMapPlotter, LinePlotter, LineSpec, Plot, Renderer};
use simplot::renderers::FieldLineRenderer;
use simplot::surface::Surface;
use simplot::{
    JsonSurface, LayoutPatch, MemorySurface, Payload, PlotError, PlotMeta, PlottersSurface,
    StyleOptions,
};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn all_markers(p: &mut impl Plot) {
    let markers = ["o", ".", "s", "^", "v", "<", ">", "d", "+", "x", "*", "?"];
    for (i, m) in markers.iter().enumerate() {
        let y = i as f64;
        p.add_or_update_xy(
            &format!("m{i}"),
            &[0.0, 1.0, 2.0],
            &[y, y + 0.5, y],
            &StyleOptions::new().marker(*m).linestyle(":"),
        )
        .unwrap();
    }
}

#[test]
fn svg_frames_hold_a_document() {
    init_logs();
    let mut p = LinePlotter::with_surface("svg", PlottersSurface::svg(320, 240));
    all_markers(&mut p);
    p.add_or_update_xy(
        "dashed",
        &[0.0, 1.0, f64::NAN, 2.0, 3.0],
        &[0.0, 2.0, 1.0, 0.0, 1.0],
        &StyleOptions::new().linestyle("--").alpha(0.5),
    )
    .unwrap();
    p.set_aspect_ratio().unwrap();

    let svg = p.surface().unwrap().svg_document();
    assert!(svg.contains("<svg"));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert!(p.surface().unwrap().pixels().is_empty());
}

#[test]
fn bitmap_frames_paint_the_field() {
    init_logs();
    let mut p = ColorMapPlotter::with_surface("bmp", PlottersSurface::bitmap(160, 120));
    let payload = Payload::from_value(json!({
        "X": [0.0, 1.0, 2.0, 3.0],
        "Y": [0.0, 1.0, 2.0],
        "Z": [[0, 1, 2, 3], [1, 2, 3, 4], [2, 3, 4, null]]
    }))
    .unwrap();
    p.plot_2d_array(&payload).unwrap();
    p.add_or_update_xy("path", &[0.0, 3.0], &[0.0, 2.0], &StyleOptions::new().color("w"))
        .unwrap();

    let pixels = p.surface().unwrap().pixels();
    assert_eq!(pixels.len(), 160 * 120 * 3);
    assert!(pixels.chunks(3).any(|px| px != [255, 255, 255]));

    // Plot area excludes the colorbar strip and margins once a field is shown.
    let (w, h) = p.surface().unwrap().plot_area_px().unwrap();
    assert!(w < 160 * 88 / 100 && h < 120);
}

#[test]
fn plotters_relayout_rerenders_and_purge_clears() {
    init_logs();
    let mut p = LinePlotter::with_surface("svg", PlottersSurface::svg(200, 150));
    // Before anything is drawn a relayout only updates the stored layout.
    p.set_ax_limits(0.0, 1.0, 0.0, 1.0).unwrap();
    assert!(p.surface().unwrap().svg_document().is_empty());

    p.add_or_update_xy("a", &[0.0, 1.0], &[0.0, 1.0], &StyleOptions::new())
        .unwrap();
    let first = p.surface().unwrap().svg_document().to_string();
    p.set_ax_limits(-5.0, 5.0, -5.0, 5.0).unwrap();
    assert_ne!(p.surface().unwrap().svg_document(), first);

    p.clear();
    assert!(p.surface().unwrap().svg_document().is_empty());
    assert!(p.registry().is_empty());
}

#[test]
fn field_renderer_draws_on_plotters() {
    init_logs();
    let mut r = FieldLineRenderer::new(
        "field",
        Some(PlottersSurface::svg(300, 250)),
        &PlotMeta::default(),
    );
    r.render(
        &Payload::from_value(json!({
            "X": [0.0, 1.0],
            "Y": [0.0, 1.0],
            "Z": [[1e-24, 1e-23], [1e-25, 1e-22]],
            "x_traj": [0.0, 1.0],
            "y_traj": [0.0, 1.0],
            "x_charge": [1.0],
            "y_charge": [1.0]
        }))
        .unwrap(),
    )
    .unwrap();
    assert!(r.plotter().surface().unwrap().svg_document().contains("<svg"));
}

#[test]
fn json_surface_mirrors_the_render_list() {
    init_logs();
    let mut p = ColorMapPlotter::with_surface("json", JsonSurface::new());
    p.add_or_update_xy(
        "orbit",
        &[0.0, 1.0],
        &[1.0, 0.0],
        &StyleOptions::new().color("#88CCEE").alpha(0.5),
    )
    .unwrap();
    p.update_layout(&LayoutPatch {
        title: Some("frame 1".into()),
        ..LayoutPatch::default()
    })
    .unwrap();

    let scene = p.surface().unwrap().scene().unwrap();
    assert_eq!(scene["data"][0]["type"], "heatmap");
    assert_eq!(scene["data"][1]["name"], "orbit");
    assert_eq!(scene["data"][1]["line"]["color"], "rgba(136, 204, 238, 0.5)");
    assert_eq!(scene["layout"]["title"]["text"], "frame 1");
    assert_eq!(scene["layout"]["xaxis"]["scaleanchor"], "y");

    let text = p.surface().unwrap().to_json_string().unwrap();
    let back: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(&back, scene);
}

#[test]
fn json_scale_ratio_agrees_with_derived_ranges() {
    init_logs();
    let meta = PlotMeta::from_value(&json!({"scale_ratio": 2.0}));
    let mut p = LinePlotter::new("json", Some(JsonSurface::new()), &meta);
    p.core_mut().surface_mut().unwrap().set_plot_area(400, 400);
    p.add_or_update_xy("sq", &[0.0, 10.0], &[0.0, 10.0], &StyleOptions::new())
        .unwrap();
    p.set_aspect_ratio().unwrap();

    let (x, y) = (p.layout().x_range.unwrap(), p.layout().y_range.unwrap());
    let px_per_x = 400.0 / x.span();
    let px_per_y = 400.0 / y.span();
    assert!((px_per_y / px_per_x - 2.0).abs() < 1e-9);

    let scene = p.surface().unwrap().scene().unwrap();
    let encoded = scene["layout"]["xaxis"]["scaleratio"].as_f64().unwrap();
    assert!((encoded - px_per_x / px_per_y).abs() < 1e-9);
}

#[test]
fn unreadable_fonts_are_rejected() {
    assert!(PlottersSurface::svg(10, 10).with_font(b"not a font").is_err());
}

#[test]
fn surface_failures_are_reported_but_state_moves_on() {
    init_logs();
    let mut p = LinePlotter::with_surface("flaky", MemorySurface::new());
    p.add_or_update_xy("a", &[0.0, 1.0], &[0.0, 1.0], &StyleOptions::new())
        .unwrap();

    p.core_mut().surface_mut().unwrap().set_failing(true);
    let err = p
        .add_or_update_xy("b", &[0.0, 1.0], &[1.0, 0.0], &StyleOptions::new())
        .unwrap_err();
    assert!(matches!(err, PlotError::Surface(_)));
    assert!(p.registry().contains("b"));
    assert_eq!(p.surface().unwrap().redraw_count(), 1);

    p.core_mut().surface_mut().unwrap().set_failing(false);
    p.add_or_update_xy("c", &[0.0, 1.0], &[0.5, 0.5], &StyleOptions::new())
        .unwrap();
    let frame = p.surface().unwrap().last_frame().unwrap();
    assert_eq!(frame.names(), vec!["a", "b", "c"]);
}

#[test]
fn detached_plotters_ignore_every_call() {
    init_logs();
    let mut p: LinePlotter<MemorySurface> = LinePlotter::new("missing", None, &PlotMeta::default());
    assert!(!p.core().is_attached());
    p.add_or_update_line(Some("c"), &json!("not-an-array"), &json!([1]), &StyleOptions::new())
        .unwrap();
    p.add_or_update_xy("a", &[0.0], &[0.0], &StyleOptions::new())
        .unwrap();
    p.sync_lines("s", 3, |_| Some(LineSpec::default())).unwrap();
    p.set_ax_limits(f64::NAN, 0.0, 0.0, 1.0).unwrap();
    p.set_aspect_ratio().unwrap();
    p.remove_line("a").unwrap();
    p.clear_lines().unwrap();
    p.render(&Payload::new()).unwrap();
    p.clear();
    assert!(p.registry().is_empty());
    assert!(p.surface().is_none());

    let mut c: ColorMapPlotter<JsonSurface> =
        ColorMapPlotter::new("missing", None, &PlotMeta::default());
    assert!(c.registry().is_empty());
    c.plot_2d_array(&Payload::new()).unwrap();
    c.init_empty().unwrap();
    assert!(c.registry().is_empty());
}

#[test]
fn boxed_surfaces_are_interchangeable() {
    init_logs();
    let surfaces: Vec<Box<dyn Surface>> = vec![
        Box::new(MemorySurface::new()),
        Box::new(JsonSurface::new()),
        Box::new(PlottersSurface::svg(100, 100)),
    ];
    for surface in surfaces {
        let mut p = LinePlotter::with_surface("boxed", surface);
        p.add_or_update_xy("a", &[0.0, 1.0], &[0.0, 1.0], &StyleOptions::new())
            .unwrap();
        p.set_aspect_ratio().unwrap();
        assert_eq!(p.registry().names(), vec!["a"]);
    }
}
