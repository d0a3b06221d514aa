//! Drop a bull-nose cutter on a single triangle over a sample grid.
//!
//! Run with `RUST_LOG=debug` to see the batch summary.

use std::time::Instant;

use anyhow::Result;
use env_logger::Env;
use log::info;
use ocam::{BatchDropCutter, ClPointGrid, Cutter, DropCutterSettings, Point3, Surface, Triangle};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let tri = Triangle::new(
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 0.3),
    );
    let cutter = Cutter::bull_nose(0.5234, 0.1)?;
    let grid = ClPointGrid::new(-0.5, 0.01, 1.5, -0.5, 0.05, 1.5, -0.8)?;
    info!("{:?}, {} x {} = {} samples", cutter, grid.nx(), grid.ny(), grid.len());

    let start = Instant::now();
    let bdc = BatchDropCutter::new(
        cutter,
        Surface::from_triangles([tri]),
        DropCutterSettings::default(),
    )?;
    let points = bdc.run_grid(&grid);
    info!("dropped {} cl-points in {:?}", points.len(), start.elapsed());

    let mut counts = std::collections::BTreeMap::new();
    for p in &points {
        let key = p.cc.map_or("none".to_string(), |cc| format!("{:?}", cc.kind));
        *counts.entry(key).or_insert(0usize) += 1;
    }
    for (kind, n) in &counts {
        println!("{kind:>16}: {n}");
    }

    let top = points
        .iter()
        .map(|p| p.z())
        .fold(f64::NEG_INFINITY, f64::max);
    println!("highest cl-point: {top:.4}");
    Ok(())
}
