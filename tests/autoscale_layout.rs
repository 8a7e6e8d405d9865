use simplot::plotter::{LinePlotter, Plot};
use simplot::{AxisRange, LayoutPatch, MemorySurface, PlotError, StyleOptions};

fn approx(r: Option<AxisRange>, min: f64, max: f64) -> bool {
    r.is_some_and(|r| (r.min - min).abs() < 1e-9 && (r.max - max).abs() < 1e-9)
}

fn plotter(surface: MemorySurface) -> LinePlotter<MemorySurface> {
    let _ = env_logger::builder().is_test(true).try_init();
    LinePlotter::with_surface("chart", surface)
}

#[test]
fn aspect_fit_expands_the_narrow_axis() {
    let mut p = plotter(MemorySurface::new().with_plot_area(400, 400));
    p.add_or_update_xy("wide", &[0.0, 10.0], &[0.0, 2.0], &StyleOptions::new())
        .unwrap();
    p.set_aspect_ratio().unwrap();

    assert!(approx(p.layout().x_range, 0.0, 10.0));
    assert!(approx(p.layout().y_range, -4.0, 6.0));
    assert!(p.layout().lock_aspect);

    let patch = p.surface().unwrap().relayouts().last().cloned().unwrap();
    assert_eq!(patch.lock_aspect, Some(true));
    assert!(approx(patch.y_range, -4.0, 6.0));
}

#[test]
fn aspect_fit_uses_measured_surface_and_is_idempotent() {
    let mut p = plotter(MemorySurface::new().with_plot_area(800, 400));
    p.add_or_update_xy("a", &[0.0, 1.0], &[0.0, 1.0], &StyleOptions::new())
        .unwrap();
    p.add_or_update_xy("b", &[-1.0, 3.0], &[0.5, 0.5], &StyleOptions::new())
        .unwrap();
    p.set_aspect_ratio().unwrap();
    let first = p.layout().clone();
    p.set_aspect_ratio().unwrap();
    assert_eq!(p.layout(), &first);

    // Union x:[-1,3], y:[0,1] on a 2:1 area: x span 4 already matches, y widens to 2.
    assert!(approx(first.x_range, -1.0, 3.0));
    assert!(approx(first.y_range, -0.5, 1.5));
}

#[test]
fn nan_gaps_do_not_poison_the_ranges() {
    let mut p = plotter(MemorySurface::new());
    p.add_or_update_xy(
        "gappy",
        &[0.0, f64::NAN, 2.0],
        &[1.0, 5.0, 1.0],
        &StyleOptions::new(),
    )
    .unwrap();
    p.set_aspect_ratio().unwrap();
    let (x, y) = (p.layout().x_range.unwrap(), p.layout().y_range.unwrap());
    for v in [x.min, x.max, y.min, y.max] {
        assert!(v.is_finite());
    }
    assert!(approx(Some(x), 0.0, 2.0));
}

#[test]
fn no_data_leaves_ranges_alone() {
    let mut p = plotter(MemorySurface::new());
    p.set_aspect_ratio().unwrap();
    assert_eq!(p.layout().x_range, None);
    assert!(p.surface().unwrap().relayouts().is_empty());
}

#[test]
fn explicit_limits_are_stored_verbatim() {
    let mut p = plotter(MemorySurface::new());
    p.set_ax_limits(6.0, 16.0, -9.0, 1.0).unwrap();
    assert_eq!(p.layout().x_range, Some(AxisRange::new(6.0, 16.0)));
    assert_eq!(p.layout().y_range, Some(AxisRange::new(-9.0, 1.0)));
    assert_eq!(
        p.surface().unwrap().relayouts(),
        &[LayoutPatch::ranges(
            AxisRange::new(6.0, 16.0),
            AxisRange::new(-9.0, 1.0)
        )]
    );

    let err = p.set_ax_limits(f64::NAN, 1.0, 0.0, 1.0).unwrap_err();
    assert!(matches!(err, PlotError::MalformedSeries { .. }));
    assert_eq!(p.layout().x_range, Some(AxisRange::new(6.0, 16.0)));
}

#[test]
fn update_layout_merges_titles() {
    let mut p = plotter(MemorySurface::new());
    p.update_layout(&LayoutPatch {
        title: Some("Trajectory".into()),
        y_title: Some("z [m]".into()),
        ..LayoutPatch::default()
    })
    .unwrap();
    assert_eq!(p.layout().title.as_deref(), Some("Trajectory"));
    assert_eq!(p.layout().x_title, "x");
    assert_eq!(p.layout().y_title, "z [m]");
}
