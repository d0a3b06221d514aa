//! Boolean combination of octrees.

use log::debug;

use crate::octree::collapse_or_branch;
use crate::{OctVolume, Octree, OctreeError, OctreeNode, Result};

/// A boolean operation between two octrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    /// Inside either tree.
    Union,
    /// Inside the first tree and not the second.
    Difference,
    /// Inside both trees.
    Intersection,
}

impl BooleanOp {
    /// Combine two inside flags.
    pub fn apply(self, a: bool, b: bool) -> bool {
        match self {
            BooleanOp::Union => a || b,
            BooleanOp::Difference => a && !b,
            BooleanOp::Intersection => a && b,
        }
    }
}

impl Octree {
    /// Region inside `self` or `other`.
    ///
    /// The result is condensed, so `a.union(&a)` equals `a` after
    /// [`Octree::condense`], not necessarily `a` as built.
    pub fn union(&self, other: &Octree) -> Result<Octree> {
        self.combine(other, BooleanOp::Union)
    }

    /// Region inside `self` but not `other`.
    pub fn diff(&self, other: &Octree) -> Result<Octree> {
        self.combine(other, BooleanOp::Difference)
    }

    /// Region inside both `self` and `other`.
    pub fn intersection(&self, other: &Octree) -> Result<Octree> {
        self.combine(other, BooleanOp::Intersection)
    }

    /// Combine two trees with the same root cube and depth.
    ///
    /// Returns a new condensed tree; neither input is modified. An unbuilt
    /// input counts as an empty region, and two unbuilt inputs give an
    /// unbuilt result.
    pub fn combine(&self, other: &Octree, op: BooleanOp) -> Result<Octree> {
        self.check_compatible(other)?;

        let empty = OctreeNode::solid(false);
        let result = match (self.root(), other.root()) {
            (None, None) => Octree::with_settings(&self.settings())?,
            (a, b) => Octree::from_parts(
                self,
                combine_nodes(a.unwrap_or(&empty), b.unwrap_or(&empty), op),
            ),
        };

        debug!(
            "octree {:?}: {} + {} -> {} nodes",
            op,
            self.size(),
            other.size(),
            result.size()
        );
        Ok(result)
    }

    /// Remove `volume` from this tree in place.
    ///
    /// The volume is built at this tree's resolution and subtracted.
    pub fn diff_volume(&mut self, volume: &dyn OctVolume) -> Result<()> {
        let mut cut = Octree::with_settings(&self.settings())?;
        cut.build(volume)?;
        *self = self.diff(&cut)?;
        Ok(())
    }

    fn check_compatible(&self, other: &Octree) -> Result<()> {
        if self.center() != other.center()
            || self.scale() != other.scale()
            || self.max_depth() != other.max_depth()
        {
            return Err(OctreeError::InvalidArgument(format!(
                "octree geometry mismatch: ({:?}, {}, depth {}) vs ({:?}, {}, depth {})",
                self.center(),
                self.scale(),
                self.max_depth(),
                other.center(),
                other.scale(),
                other.max_depth()
            )));
        }
        Ok(())
    }
}

fn combine_nodes(a: &OctreeNode, b: &OctreeNode, op: BooleanOp) -> OctreeNode {
    // A leaf operand that decides the result regardless of the other side
    if let OctreeNode::Leaf { inside } = a {
        if op.apply(*inside, true) == op.apply(*inside, false) {
            return OctreeNode::solid(op.apply(*inside, false));
        }
    }
    if let OctreeNode::Leaf { inside } = b {
        if op.apply(true, *inside) == op.apply(false, *inside) {
            return OctreeNode::solid(op.apply(false, *inside));
        }
    }

    match (a, b) {
        (OctreeNode::Leaf { inside: x }, OctreeNode::Leaf { inside: y }) => {
            OctreeNode::solid(op.apply(*x, *y))
        }
        _ => collapse_or_branch(std::array::from_fn(|i| {
            combine_nodes(a.child_or_self(i), b.child_or_self(i), op)
        })),
    }
}
