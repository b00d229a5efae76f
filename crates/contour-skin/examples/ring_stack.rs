//! Example: Reconstructing Tubes from Traced Ring Stacks
//!
//! Builds a few profile groups of hand-traced-looking rings, one of them with
//! a missing link, skins them all in parallel and prints what came out.
//!
//! Run with: `cargo run --example ring_stack`
//! More detail: `RUST_LOG=contour_skin=debug cargo run --example ring_stack`

use std::f64::consts::TAU;

use contour_skin::{ReconstructionReport, TracedContour, link_chain, make_meshes};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// A wobbly ring of `n` points, traced from a random-looking start point.
fn traced_ring(id: u64, n: usize, radius: f64, z: f64) -> TracedContour {
    let start = (id as usize * 7) % n;
    let points: Vec<(f64, f64)> = (0..n)
        .map(|k| {
            let t = TAU * ((k + start) % n) as f64 / n as f64;
            let r = radius * (1.0 + 0.04 * (3.0 * t + z).sin());
            (r * t.cos(), r * t.sin())
        })
        .collect();
    TracedContour::from_xy(id, &points, z)
}

/// A vessel-like stack whose radius swells and narrows along Z.
fn vessel(first_id: u64, layers: usize) -> Vec<TracedContour> {
    let mut stack: Vec<TracedContour> = (0..layers)
        .map(|k| {
            let z = k as f64;
            let radius = 6.0 + 2.0 * (z / layers as f64 * std::f64::consts::PI).sin();
            // tracing density varies from layer to layer
            let n = 30 + (k * 13) % 25;
            traced_ring(first_id + k as u64, n, radius, z)
        })
        .collect();
    link_chain(&mut stack);
    stack
}

fn main() -> miette::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();

    let mut groups = vec![vessel(0, 8), vessel(100, 5), vessel(200, 12)];
    // lose the links of one contour in the second group
    groups[1][2].links = None;

    let outcomes = make_meshes(&groups);

    println!("Profile groups");
    println!("==============");
    for outcome in &outcomes {
        match (outcome.mesh(), outcome.error()) {
            (Some(mesh), _) => {
                let (min, max) = mesh.bounds().unwrap_or_default();
                println!(
                    "  group {}: {} contours, {} vertices, {} faces, z {:.1}..{:.1}",
                    outcome.group,
                    mesh.perimeter_count(),
                    mesh.vertex_count(),
                    mesh.face_count(),
                    min.z,
                    max.z
                );
            }
            (None, Some(err)) => {
                println!("  group {}: failed [{}] {}", outcome.group, err.code().as_str(), err);
            }
            (None, None) => {}
        }
    }

    let report = ReconstructionReport::from_outcomes(&outcomes);
    println!();
    println!("{report}");

    // Surface the first failure as a diagnostic.
    if let Some(Err(err)) = outcomes.into_iter().map(|o| o.result).find(Result::is_err) {
        eprintln!("{:?}", miette::Report::new(err));
    }

    Ok(())
}
