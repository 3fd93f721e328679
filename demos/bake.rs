//! Bakes a U-shaped room and prints the confiner at a few window sizes.
//!
//! Usage:
//! ```text
//! cargo run --example bake                         # default sizes
//! cargo run --example bake -- 0.5 2 4.5            # custom half heights
//! RUST_LOG=confiner2d=trace cargo run --example bake
//! ```

use confiner2d::math::polygon_2d::signed_area_2d;
use confiner2d::math::Point2;
use confiner2d::{half_frustum_height, BakeConfig, ConfinerError, ConfinerRuntime, ErosionOven, Lens};

fn u_shape() -> Vec<Point2> {
    vec![
        Point2::new(0.0, 0.0),
        Point2::new(30.0, 0.0),
        Point2::new(30.0, 10.0),
        Point2::new(20.0, 10.0),
        Point2::new(20.0, 2.0),
        Point2::new(10.0, 2.0),
        Point2::new(10.0, 10.0),
        Point2::new(0.0, 10.0),
    ]
}

fn main() -> Result<(), ConfinerError> {
    // Default: WARN for everything, DEBUG for confiner2d.
    // Override with RUST_LOG env var (e.g. RUST_LOG=confiner2d=trace).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("confiner2d=debug".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let sizes: Vec<f64> = std::env::args().skip(1).filter_map(|a| a.parse().ok()).collect();
    let sizes = if sizes.is_empty() { vec![0.5, 1.5, 3.0, 4.5] } else { sizes };

    let contours = vec![u_shape()];
    let aspect_ratio = 16.0 / 9.0;
    let mut runtime = ConfinerRuntime::new(BakeConfig::default());
    runtime.prepare(&contours, aspect_ratio, 0.0)?;

    let camera = Point2::new(15.0, 8.0);
    for size in sizes {
        let h = half_frustum_height(Lens::Orthographic { size });
        let query = runtime.query_boundary(h)?;
        let paths = query.path.paths();
        let area: f64 = paths.iter().map(|p| signed_area_2d(p)).sum();
        let displacement = runtime.confine_point(&query.path, &camera)?;
        println!(
            "h = {:5.2}  loops = {}  area = {:8.3}  topology changed = {:5}  camera -> ({:.2}, {:.2})",
            query.path.frustum_height(),
            paths.len(),
            area,
            query.topology_changed,
            camera.x + displacement.x,
            camera.y + displacement.y,
        );
    }

    let states = ErosionOven::default().bake(&contours, aspect_ratio, 0.0)?;
    println!("erosion oven: {} states", states.len());
    for state in &states {
        println!("  h = {:6.3}  polygons = {}", state.frustum_height, state.polygons.len());
    }
    Ok(())
}
