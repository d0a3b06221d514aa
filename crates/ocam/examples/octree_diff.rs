//! Build two octrees, condense them and subtract one from the other.
//!
//! Prints the node list of the result, one line per node, for an external
//! viewer to pick up.

use anyhow::Result;
use env_logger::Env;
use log::info;
use ocam::{CubeVolume, NodeColor, Octree, Point3, SphereVolume};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let max_depth = std::env::args()
        .nth(1)
        .map(|s| s.parse::<u32>())
        .transpose()?
        .unwrap_or(6);

    let mut stock = Octree::new(max_depth)?;
    stock.build(&CubeVolume::new(Point3::origin(), 10.0))?;
    let built = stock.size();
    stock.condense();
    info!("cube: {} nodes, {} after condense", built, stock.size());

    let mut cut = Octree::new(max_depth)?;
    cut.build(&SphereVolume::default())?;
    let built = cut.size();
    cut.condense();
    info!("sphere: {} nodes, {} after condense", built, cut.size());

    let result = stock.diff(&cut)?;
    info!(
        "difference: {} nodes, volume {:.3} of {:.3}",
        result.size(),
        result.inside_volume(),
        stock.inside_volume()
    );

    for node in result.leaves() {
        if node.color == NodeColor::Black {
            println!(
                "{:.4} {:.4} {:.4} {:.4}",
                node.center.x, node.center.y, node.center.z, node.scale
            );
        }
    }
    Ok(())
}
