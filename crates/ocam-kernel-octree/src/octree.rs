//! Octree representation of a volume.

use log::debug;
use ocam_kernel_math::Point3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::volume::{CubeClass, OctVolume};
use crate::{OctreeError, Result};

/// Deepest subdivision an octree accepts.
pub const MAX_DEPTH: u32 = 16;

/// Levels below the root whose siblings are built in parallel.
const PARALLEL_LEVELS: u32 = 3;

/// Classification of an octree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeColor {
    /// Leaf entirely outside the volume.
    White,
    /// Internal node with mixed descendants.
    Grey,
    /// Leaf entirely inside the volume.
    Black,
}

/// An octree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OctreeNode {
    /// Uniform cube, entirely inside or entirely outside.
    Leaf {
        /// True if inside (black), false if outside (white).
        inside: bool,
    },
    /// Branch node with 8 children.
    Branch {
        /// Children in Morton order: (-x-y-z), (+x-y-z), (-x+y-z), (+x+y-z),
        /// (-x-y+z), (+x-y+z), (-x+y+z), (+x+y+z)
        children: Box<[OctreeNode; 8]>,
    },
}

impl OctreeNode {
    /// Create a leaf node.
    pub fn solid(inside: bool) -> Self {
        OctreeNode::Leaf { inside }
    }

    /// The node color.
    pub fn color(&self) -> NodeColor {
        match self {
            OctreeNode::Leaf { inside: true } => NodeColor::Black,
            OctreeNode::Leaf { inside: false } => NodeColor::White,
            OctreeNode::Branch { .. } => NodeColor::Grey,
        }
    }

    /// Child `i` of a branch, or the node itself for a leaf.
    pub(crate) fn child_or_self(&self, i: usize) -> &OctreeNode {
        match self {
            OctreeNode::Branch { children } => &children[i],
            OctreeNode::Leaf { .. } => self,
        }
    }

    fn count(&self) -> usize {
        match self {
            OctreeNode::Leaf { .. } => 1,
            OctreeNode::Branch { children } => 1 + children.iter().map(Self::count).sum::<usize>(),
        }
    }

    fn height(&self) -> u32 {
        match self {
            OctreeNode::Leaf { .. } => 0,
            OctreeNode::Branch { children } => {
                1 + children.iter().map(Self::height).max().unwrap_or(0)
            }
        }
    }
}

/// Wrap eight children in a branch, or collapse them into a leaf when they
/// are leaves of one color.
pub(crate) fn collapse_or_branch(children: [OctreeNode; 8]) -> OctreeNode {
    match can_collapse(&children) {
        Some(inside) => OctreeNode::solid(inside),
        None => OctreeNode::Branch {
            children: Box::new(children),
        },
    }
}

fn can_collapse(children: &[OctreeNode; 8]) -> Option<bool> {
    let first = match &children[0] {
        OctreeNode::Leaf { inside } => *inside,
        _ => return None,
    };

    for child in &children[1..] {
        match child {
            OctreeNode::Leaf { inside } if *inside == first => continue,
            _ => return None,
        }
    }

    Some(first)
}

/// Center of child `index` of the cube at `center` with half-width `half`.
pub(crate) fn child_center(center: &Point3, half: f64, index: usize) -> Point3 {
    let q = half / 2.0;
    Point3::new(
        center.x + if index & 1 == 0 { -q } else { q },
        center.y + if index & 2 == 0 { -q } else { q },
        center.z + if index & 4 == 0 { -q } else { q },
    )
}

/// Read-only view of a node for viewers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    /// Center of the node cube.
    pub center: Point3,
    /// Half-width of the node cube.
    pub scale: f64,
    /// Node color.
    pub color: NodeColor,
    /// Depth below the root (root = 0).
    pub depth: u32,
}

/// Root cube and depth limit of an octree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OctreeSettings {
    /// Center of the root cube.
    pub center: [f64; 3],
    /// Half-width of the root cube.
    pub scale: f64,
    /// Maximum subdivision depth.
    pub max_depth: u32,
}

impl Default for OctreeSettings {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0, 0.0],
            scale: 10.0,
            max_depth: 6,
        }
    }
}

impl OctreeSettings {
    fn validate(&self) -> Result<()> {
        if !self.center.iter().all(|c| c.is_finite()) {
            return Err(OctreeError::InvalidArgument(format!(
                "root center must be finite, got {:?}",
                self.center
            )));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(OctreeError::InvalidArgument(format!(
                "root scale must be positive, got {}",
                self.scale
            )));
        }
        check_depth(self.max_depth)
    }
}

fn check_depth(max_depth: u32) -> Result<()> {
    if max_depth > MAX_DEPTH {
        Err(OctreeError::InvalidArgument(format!(
            "max depth {max_depth} exceeds the limit of {MAX_DEPTH}"
        )))
    } else {
        Ok(())
    }
}

/// A volume represented as an octree over a fixed root cube.
///
/// The tree is unbuilt until [`build`](Octree::build) is called; unbuilt
/// trees report zero nodes and contain no points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Octree {
    root: Option<OctreeNode>,
    center: Point3,
    scale: f64,
    max_depth: u32,
}

impl Octree {
    /// Create an unbuilt tree over the default root cube.
    pub fn new(max_depth: u32) -> Result<Self> {
        Self::with_settings(&OctreeSettings {
            max_depth,
            ..OctreeSettings::default()
        })
    }

    /// Create an unbuilt tree over the root cube given by `settings`.
    pub fn with_settings(settings: &OctreeSettings) -> Result<Self> {
        settings.validate()?;
        let [x, y, z] = settings.center;
        Ok(Self {
            root: None,
            center: Point3::new(x, y, z),
            scale: settings.scale,
            max_depth: settings.max_depth,
        })
    }

    /// Reset to an unbuilt tree with a new depth limit. The root cube is
    /// kept.
    pub fn init(&mut self, max_depth: u32) -> Result<()> {
        check_depth(max_depth)?;
        self.root = None;
        self.max_depth = max_depth;
        Ok(())
    }

    /// The settings that reproduce this tree's geometry.
    pub fn settings(&self) -> OctreeSettings {
        OctreeSettings {
            center: [self.center.x, self.center.y, self.center.z],
            scale: self.scale,
            max_depth: self.max_depth,
        }
    }

    /// Center of the root cube.
    pub fn center(&self) -> Point3 {
        self.center
    }

    /// Half-width of the root cube.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Maximum subdivision depth.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// The root node, if built.
    pub fn root(&self) -> Option<&OctreeNode> {
        self.root.as_ref()
    }

    /// True once the tree has been built or produced by a combination.
    pub fn is_built(&self) -> bool {
        self.root.is_some()
    }

    pub(crate) fn from_parts(geometry: &Octree, root: OctreeNode) -> Self {
        Self {
            root: Some(root),
            center: geometry.center,
            scale: geometry.scale,
            max_depth: geometry.max_depth,
        }
    }

    /// Build the tree against `volume`, replacing any previous content.
    pub fn build(&mut self, volume: &dyn OctVolume) -> Result<()> {
        volume.validate()?;
        let root = build_node(volume, self.center, self.scale, 0, self.max_depth);
        self.root = Some(root);
        debug!(
            "octree build: {} nodes, depth {}/{}",
            self.size(),
            self.depth(),
            self.max_depth
        );
        Ok(())
    }

    /// Merge every branch whose children are leaves of one color.
    pub fn condense(&mut self) {
        let Some(root) = self.root.as_mut() else {
            return;
        };
        let before = root.count();
        condense_node(root);
        debug!("octree condense: {} -> {} nodes", before, root.count());
    }

    /// Total number of nodes, internal and leaf. Zero when unbuilt.
    pub fn size(&self) -> usize {
        self.root.as_ref().map_or(0, OctreeNode::count)
    }

    /// Depth of the deepest leaf. Zero when unbuilt.
    pub fn depth(&self) -> u32 {
        self.root.as_ref().map_or(0, OctreeNode::height)
    }

    /// All nodes in pre-order, children in Morton order.
    pub fn get_nodes(&self) -> Vec<NodeInfo> {
        let mut out = Vec::with_capacity(self.size());
        if let Some(root) = &self.root {
            collect_nodes(root, self.center, self.scale, 0, &mut out);
        }
        out
    }

    /// Leaf nodes in pre-order.
    pub fn leaves(&self) -> Vec<NodeInfo> {
        self.get_nodes()
            .into_iter()
            .filter(|n| n.color != NodeColor::Grey)
            .collect()
    }

    /// Check if `p` lies in a black leaf. Points outside the root cube are
    /// outside.
    pub fn is_inside(&self, p: &Point3) -> bool {
        let Some(mut node) = self.root.as_ref() else {
            return false;
        };
        if (p - self.center).iter().any(|c| c.abs() > self.scale) {
            return false;
        }

        let mut center = self.center;
        let mut half = self.scale;
        loop {
            match node {
                OctreeNode::Leaf { inside } => return *inside,
                OctreeNode::Branch { children } => {
                    let idx = (if p.x >= center.x { 1 } else { 0 })
                        | (if p.y >= center.y { 2 } else { 0 })
                        | (if p.z >= center.z { 4 } else { 0 });
                    center = child_center(&center, half, idx);
                    half /= 2.0;
                    node = &children[idx];
                }
            }
        }
    }

    /// Total volume of the black leaves.
    pub fn inside_volume(&self) -> f64 {
        self.leaves()
            .iter()
            .filter(|n| n.color == NodeColor::Black)
            .map(|n| (2.0 * n.scale).powi(3))
            .sum()
    }

    /// True if no black leaf exists.
    pub fn is_empty(&self) -> bool {
        self.root.as_ref().map_or(true, |r| !has_black(r))
    }
}

fn build_node(
    volume: &dyn OctVolume,
    center: Point3,
    half: f64,
    depth: u32,
    max_depth: u32,
) -> OctreeNode {
    match volume.classify_cube(&center, half) {
        CubeClass::Inside => OctreeNode::solid(true),
        CubeClass::Outside => OctreeNode::solid(false),
        CubeClass::Mixed if depth >= max_depth => OctreeNode::solid(volume.is_inside(&center)),
        CubeClass::Mixed => {
            let mut children: [OctreeNode; 8] = std::array::from_fn(|_| OctreeNode::solid(false));
            let fill = |(i, child): (usize, &mut OctreeNode)| {
                *child = build_node(
                    volume,
                    child_center(&center, half, i),
                    half / 2.0,
                    depth + 1,
                    max_depth,
                );
            };
            if depth < PARALLEL_LEVELS {
                children.par_iter_mut().enumerate().for_each(fill);
            } else {
                children.iter_mut().enumerate().for_each(fill);
            }
            OctreeNode::Branch {
                children: Box::new(children),
            }
        }
    }
}

fn condense_node(node: &mut OctreeNode) {
    if let OctreeNode::Branch { children } = node {
        for child in children.iter_mut() {
            condense_node(child);
        }
        if let Some(inside) = can_collapse(children) {
            *node = OctreeNode::solid(inside);
        }
    }
}

fn collect_nodes(
    node: &OctreeNode,
    center: Point3,
    half: f64,
    depth: u32,
    out: &mut Vec<NodeInfo>,
) {
    out.push(NodeInfo {
        center,
        scale: half,
        color: node.color(),
        depth,
    });
    if let OctreeNode::Branch { children } = node {
        for (i, child) in children.iter().enumerate() {
            collect_nodes(child, child_center(&center, half, i), half / 2.0, depth + 1, out);
        }
    }
}

fn has_black(node: &OctreeNode) -> bool {
    match node {
        OctreeNode::Leaf { inside } => *inside,
        OctreeNode::Branch { children } => children.iter().any(has_black),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CubeVolume, SphereVolume};
    use approx::assert_relative_eq;

    fn sphere_tree(depth: u32) -> Octree {
        let mut t = Octree::new(depth).unwrap();
        t.build(&SphereVolume::new(Point3::new(4.0, 2.0, 3.0), 3.0)).unwrap();
        t
    }

    #[test]
    fn test_unbuilt_tree_is_empty() {
        let t = Octree::new(3).unwrap();
        assert!(!t.is_built());
        assert_eq!(t.size(), 0);
        assert!(t.get_nodes().is_empty());
        assert!(t.is_empty());
        assert!(!t.is_inside(&Point3::origin()));
    }

    #[test]
    fn test_depth_limit() {
        assert!(matches!(
            Octree::new(MAX_DEPTH + 1),
            Err(OctreeError::InvalidArgument(_))
        ));
        let mut t = Octree::new(2).unwrap();
        assert!(t.init(MAX_DEPTH + 1).is_err());
        assert!(t.init(0).is_ok());
    }

    #[test]
    fn test_bad_root_cube() {
        let settings = OctreeSettings {
            scale: 0.0,
            ..OctreeSettings::default()
        };
        assert!(Octree::with_settings(&settings).is_err());
    }

    #[test]
    fn test_depth_zero_classifies_root_center() {
        let mut t = Octree::new(0).unwrap();
        t.build(&SphereVolume::new(Point3::origin(), 3.0)).unwrap();
        assert_eq!(t.size(), 1);
        assert_eq!(t.get_nodes()[0].color, NodeColor::Black);

        t.build(&SphereVolume::new(Point3::new(5.0, 5.0, 5.0), 3.0)).unwrap();
        assert_eq!(t.get_nodes()[0].color, NodeColor::White);
    }

    #[test]
    fn test_build_respects_max_depth() {
        let t = sphere_tree(3);
        assert_eq!(t.depth(), 3);
        assert!(t.get_nodes().iter().all(|n| n.depth <= 3));
        assert!(t.is_inside(&Point3::new(4.0, 2.0, 3.0)));
        assert!(!t.is_inside(&Point3::new(-8.0, -8.0, -8.0)));
    }

    #[test]
    fn test_get_nodes_preorder() {
        let t = sphere_tree(2);
        let nodes = t.get_nodes();
        assert_eq!(nodes.len(), t.size());
        assert_eq!(nodes[0].depth, 0);
        assert_relative_eq!(nodes[0].scale, 10.0);
        assert_eq!(nodes[0].color, NodeColor::Grey);
        // first child of the root follows the root
        assert_eq!(nodes[1].depth, 1);
        assert_eq!(nodes[1].center, Point3::new(-5.0, -5.0, -5.0));
        // grey nodes are never leaves
        let leaves = t.leaves();
        assert!(leaves.iter().all(|n| n.color != NodeColor::Grey));
    }

    #[test]
    fn test_condense_never_grows() {
        let mut t = sphere_tree(4);
        let before = t.size();
        t.condense();
        assert!(t.size() <= before);

        let again = t.size();
        t.condense();
        assert_eq!(t.size(), again);
    }

    #[test]
    fn test_condense_merges_uniform_leaves() {
        let mut t = Octree::new(1).unwrap();
        t.root = Some(OctreeNode::Branch {
            children: Box::new(std::array::from_fn(|_| OctreeNode::solid(true))),
        });
        assert_eq!(t.size(), 9);
        t.condense();
        assert_eq!(t.size(), 1);
        assert_eq!(t.root(), Some(&OctreeNode::solid(true)));
    }

    #[test]
    fn test_cube_aligned_with_grid_is_exact() {
        // cube occupying exactly the (+x+y+z) octant of the root
        let mut t = Octree::new(3).unwrap();
        t.build(&CubeVolume::new(Point3::new(5.0, 5.0, 5.0), 10.0)).unwrap();
        assert_eq!(t.size(), 9);
        assert_relative_eq!(t.inside_volume(), 1000.0);
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = sphere_tree(5);
        let b = sphere_tree(5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_build_rejects_invalid_volume() {
        let mut t = Octree::new(3).unwrap();
        let err = t.build(&SphereVolume::new(Point3::origin(), -2.0));
        assert!(matches!(err, Err(OctreeError::InvalidArgument(_))));
        assert!(!t.is_built());
    }

    #[test]
    fn test_settings_serialization() {
        let settings = OctreeSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let parsed: OctreeSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);
    }
}
