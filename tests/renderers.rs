use serde_json::json;
use simplot::plotter::{Plot, Renderer};
use simplot::renderers::{
    ElectronSpectrumRenderer, FieldLineRenderer, PhotonSpectrumRenderer, TrajectoryRenderer,
};
use simplot::style::{LineDash, MarkerShape};
use simplot::{
    AxisRange, ColorScale, DrawMode, MemorySurface, Payload, PlotError, PlotMeta, Rgba,
    SeriesData,
};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn payload(v: serde_json::Value) -> Payload {
    Payload::from_value(v).unwrap()
}

#[test]
fn trajectory_draws_two_styled_lines_and_locks_aspect() {
    init_logs();
    let mut r = TrajectoryRenderer::new("traj", Some(MemorySurface::new()), &PlotMeta::default());
    r.render(&payload(json!({
        "x": [0.0, 1.0, 2.0, 3.0],
        "y": [0.0, 1.0, 0.0, -1.0],
        "y2": [0.0, 0.5, 0.0, -0.5]
    })))
    .unwrap();

    let p = r.plotter();
    assert_eq!(p.registry().names(), vec!["normal", "small"]);
    let normal = &p.registry().get("normal").unwrap().style;
    assert_eq!(normal.mode, DrawMode::LinesMarkers);
    assert_eq!(normal.marker, Some(MarkerShape::TriangleDown));
    assert!((normal.color.a - 0.3).abs() < 1e-12);
    let small = &p.registry().get("small").unwrap().style;
    assert_eq!(small.dash, LineDash::Dash);
    assert_eq!(small.marker, Some(MarkerShape::Point));

    assert!(p.layout().lock_aspect);
    let x = p.layout().x_range.unwrap();
    let y = p.layout().y_range.unwrap();
    assert!((x.span() / y.span() - 1.0).abs() < 1e-9);
}

#[test]
fn trajectory_without_y2_is_skipped() {
    init_logs();
    let mut r = TrajectoryRenderer::new("traj", Some(MemorySurface::new()), &PlotMeta::default());
    let err = r
        .render(&payload(json!({"x": [0.0, 1.0], "y": [0.0, 1.0]})))
        .unwrap_err();
    assert!(matches!(err, PlotError::MissingData(_)));
    assert!(r.plotter().registry().is_empty());
}

#[test]
fn electron_levels_follow_the_visible_set() {
    init_logs();
    let mut r =
        ElectronSpectrumRenderer::new("el", Some(MemorySurface::new()), &PlotMeta::default());
    let frame = |levels: serde_json::Value| {
        payload(json!({
            "xel": [6.0, 8.0, 10.0, 12.0],
            "yel": [-8.0, -2.0, -4.0, -7.0],
            "Eelvis": levels
        }))
    };

    r.render(&frame(json!([7.0, 9.5, 12.0]))).unwrap();
    let p = r.plotter();
    assert_eq!(
        p.registry().names(),
        vec!["electrons", "electrons_0", "electrons_1", "electrons_2"]
    );
    assert_eq!(p.layout().x_range, Some(AxisRange::new(6.0, 16.0)));
    assert_eq!(p.layout().y_range, Some(AxisRange::new(-9.0, 1.0)));
    let level = p.registry().get("electrons_1").unwrap();
    assert_eq!(level.points(), vec![(9.5, -9.0), (9.5, 1.0)]);
    assert!((level.style.color.a - 0.6).abs() < 1e-12);
    assert_eq!(p.registry().get("electrons").unwrap().style.color, Rgba::BLACK);

    r.render(&frame(json!([8.0]))).unwrap();
    let p = r.plotter();
    assert_eq!(p.registry().names(), vec!["electrons", "electrons_0"]);
    assert_eq!(
        p.registry().get("electrons_0").unwrap().points(),
        vec![(8.0, -9.0), (8.0, 1.0)]
    );

    r.render(&frame(json!([]))).unwrap();
    assert_eq!(r.plotter().registry().names(), vec!["electrons"]);
}

#[test]
fn photon_levels_are_counted_by_the_electron_levels() {
    init_logs();
    let mut r = PhotonSpectrumRenderer::new("ph", Some(MemorySurface::new()), &PlotMeta::default());
    r.render(&payload(json!({
        "xphot": [-9.0, 0.0, 11.0],
        "yphot": [-3.0, -1.0, -5.0],
        "Eelvis": [7.0, 8.0],
        "Ephvis_0": [-4.0, -2.0, -6.0],
        "Ephvis_1": [-5.0, -3.0, -7.0],
        "Ephvis_2": [-6.0, -4.0, -8.0]
    })))
    .unwrap();
    let p = r.plotter();
    assert_eq!(p.registry().names(), vec!["photons", "photons_0", "photons_1"]);
    assert_eq!(p.layout().x_range, Some(AxisRange::new(-9.0, 11.0)));

    r.render(&payload(json!({
            "xphot": [-9.0, 0.0, 11.0],
            "yphot": [-3.0, -1.0, -5.0],
            "Eelvis": [7.0],
            "Ephvis_0": [-1.0, -1.0, -1.0],
            "Ephvis_1": [-1.0, -1.0, -1.0]
        })))
        .unwrap();
    assert_eq!(r.plotter().registry().names(), vec!["photons", "photons_0"]);

    // A level without its spectrum fails, the others are still synchronized.
    let err = r
        .render(&payload(json!({
            "xphot": [-9.0, 0.0, 11.0],
            "yphot": [-3.0, -1.0, -5.0],
            "Eelvis": [7.0, 8.0],
            "Ephvis_0": [-2.0, -2.0, -2.0]
        })))
        .unwrap_err();
    assert!(matches!(err, PlotError::MalformedSeries { .. }));
    let p = r.plotter();
    assert_eq!(p.registry().names(), vec!["photons", "photons_0"]);
    assert_eq!(
        p.registry().get("photons_0").unwrap().points()[0],
        (-9.0, -2.0)
    );
}

#[test]
fn field_lines_use_log_nightfall_with_pinned_domain() {
    init_logs();
    let mut r = FieldLineRenderer::new("field", Some(MemorySurface::new()), &PlotMeta::default());
    r.render(&payload(json!({
        "X": [0.0, 1.0],
        "Y": [0.0, 1.0],
        "Z": [[1e-24, 1e-23], [0.0, 1e-22]],
        "x_traj": [0.0, 0.5, 1.0],
        "y_traj": [0.0, 0.2, 0.4],
        "x_charge": [1.0],
        "y_charge": [0.4]
    })))
    .unwrap();

    let p = r.plotter();
    let SeriesData::Heatmap(h) = &p.registry().series()[0].data else {
        panic!("position 0 is not the field");
    };
    assert_eq!(h.colorscale, ColorScale::Nightfall);
    assert_eq!((h.zmin, h.zmax), (-26.0, -22.0));
    assert!((h.z[0][0] + 24.0).abs() < 1e-9);
    assert!((h.z[1][0] + 36.0).abs() < 1e-9);

    assert_eq!(
        p.registry().names(),
        vec!["charge trajectory", "charge position"]
    );
    let traj = &p.registry().get("charge trajectory").unwrap().style;
    assert_eq!(traj.color, Rgba::rgb(128, 128, 128));
    assert_eq!(traj.line_width, 3.0);
    let charge = &p.registry().get("charge position").unwrap().style;
    assert_eq!(charge.mode, DrawMode::Markers);
    assert_eq!(charge.marker, Some(MarkerShape::Point));
    assert_eq!(charge.marker_size, 6.0);
}

#[test]
fn field_lines_accept_a_domain_from_meta() {
    init_logs();
    let meta = PlotMeta::from_value(&json!({"zmin": -30.0, "zmax": -20.0}));
    let mut r = FieldLineRenderer::new("field", Some(MemorySurface::new()), &meta);
    r.render(&payload(json!({"X": [0.0], "Y": [0.0], "Z": [[1e-25]]})))
        .unwrap();
    let SeriesData::Heatmap(h) = &r.plotter().registry().series()[0].data else {
        panic!("position 0 is not the field");
    };
    assert_eq!((h.zmin, h.zmax), (-30.0, -20.0));
    assert!(r.plotter().registry().names().is_empty());
}
