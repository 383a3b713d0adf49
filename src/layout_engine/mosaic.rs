//! The per-workspace split tree.
//!
//! Every operation here is pure: it borrows a tree and returns a new one, so
//! callers can keep the previous state around untouched. A tree serializes to
//! plain JSON: a leaf is the window id string, a branch is an object with
//! `direction`, `first`, `second` and `splitPercentage`.
//!
//! Inspection (`nodes`, `leaves`, `leaf_count`, `contains`, `depth`) walks with
//! an explicit stack. Insertion, removal, `Clone`, `Drop` and serde still
//! recurse once per level, so trees tens of thousands of levels deep can
//! exhaust a thread's stack.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use super::graph::Direction;
use super::insertion::{InsertionMode, LayoutConfig, is_valid_split_percentage};
use crate::model::WindowId;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MosaicNode {
    Leaf(WindowId),
    Branch(Box<MosaicBranch>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MosaicBranch {
    pub direction: Direction,
    pub first: MosaicNode,
    pub second: MosaicNode,
    pub split_percentage: f64,
}

impl<'de> Deserialize<'de> for MosaicNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NodeVisitor;

        impl<'de> Visitor<'de> for NodeVisitor {
            type Value = MosaicNode;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a window id string or a split object")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<MosaicNode, E> {
                Ok(MosaicNode::leaf(v))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<MosaicNode, E> {
                Ok(MosaicNode::Leaf(WindowId::new(v)))
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<MosaicNode, A::Error> {
                let branch = MosaicBranch::deserialize(de::value::MapAccessDeserializer::new(map))?;
                Ok(MosaicNode::Branch(Box::new(branch)))
            }
        }

        deserializer.deserialize_any(NodeVisitor)
    }
}

/// Explicit-stack pre-order iterator returned by [`MosaicNode::nodes`].
pub struct Nodes<'a> {
    stack: Vec<&'a MosaicNode>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a MosaicNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let MosaicNode::Branch(branch) = node {
            self.stack.push(&branch.second);
            self.stack.push(&branch.first);
        }
        Some(node)
    }
}

/// Which child of a branch a path step descends into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    First,
    Second,
}

impl MosaicBranch {
    pub fn child(&self, side: Side) -> &MosaicNode {
        match side {
            Side::First => &self.first,
            Side::Second => &self.second,
        }
    }

    pub fn child_mut(&mut self, side: Side) -> &mut MosaicNode {
        match side {
            Side::First => &mut self.first,
            Side::Second => &mut self.second,
        }
    }
}

impl MosaicNode {
    pub fn leaf(id: impl Into<WindowId>) -> Self { MosaicNode::Leaf(id.into()) }

    pub fn branch(
        direction: Direction,
        first: MosaicNode,
        second: MosaicNode,
        split_percentage: f64,
    ) -> Self {
        MosaicNode::Branch(Box::new(MosaicBranch {
            direction,
            first,
            second,
            split_percentage,
        }))
    }

    pub fn as_leaf(&self) -> Option<&WindowId> {
        match self {
            MosaicNode::Leaf(id) => Some(id),
            MosaicNode::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&MosaicBranch> {
        match self {
            MosaicNode::Leaf(_) => None,
            MosaicNode::Branch(branch) => Some(branch),
        }
    }

    fn is_leaf_of(&self, id: &WindowId) -> bool { self.as_leaf() == Some(id) }

    /// Pre-order walk over every node, `first` before `second`.
    pub fn nodes(&self) -> Nodes<'_> { Nodes { stack: vec![self] } }

    /// Leaf ids in first-before-second order.
    pub fn leaves(&self) -> Vec<&WindowId> { self.nodes().filter_map(MosaicNode::as_leaf).collect() }

    pub fn leaf_count(&self) -> usize { self.nodes().filter(|node| node.as_leaf().is_some()).count() }

    pub fn contains(&self, id: &WindowId) -> bool { self.nodes().any(|node| node.is_leaf_of(id)) }

    /// Number of branches on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0)];
        while let Some((node, depth)) = stack.pop() {
            match node {
                MosaicNode::Leaf(_) => deepest = deepest.max(depth),
                MosaicNode::Branch(branch) => {
                    stack.push((&branch.second, depth + 1));
                    stack.push((&branch.first, depth + 1));
                }
            }
        }
        deepest
    }

    /// First branch split outside the open interval (0, 100), if any.
    pub fn invalid_split(&self) -> Option<f64> {
        self.nodes()
            .filter_map(MosaicNode::as_branch)
            .map(|branch| branch.split_percentage)
            .find(|&split| !is_valid_split_percentage(split))
    }

    #[cfg(test)]
    pub(crate) fn node_at(&self, path: &[Side]) -> Option<&MosaicNode> {
        let mut node = self;
        for &side in path {
            match node {
                MosaicNode::Branch(branch) => node = branch.child(side),
                MosaicNode::Leaf(_) => return None,
            }
        }
        Some(node)
    }

    pub fn node_at_mut(&mut self, path: &[Side]) -> Option<&mut MosaicNode> {
        let mut node = self;
        for &side in path {
            match node {
                MosaicNode::Branch(branch) => node = branch.child_mut(side),
                MosaicNode::Leaf(_) => return None,
            }
        }
        Some(node)
    }

    pub fn draw_tree(&self) -> String { self.to_string() }

    fn ascii_tree(&self) -> ascii_tree::Tree {
        match self {
            MosaicNode::Leaf(id) => ascii_tree::Tree::Leaf(vec![id.to_string()]),
            MosaicNode::Branch(branch) => ascii_tree::Tree::Node(
                format!("{} {:.0}%", branch.direction, branch.split_percentage),
                vec![branch.first.ascii_tree(), branch.second.ascii_tree()],
            ),
        }
    }
}

impl fmt::Display for MosaicNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ascii_tree::write_tree(f, &self.ascii_tree())
    }
}

/// Result of [`find_shallowest_leaf`].
#[derive(Clone, Debug, PartialEq)]
pub struct ShallowestLeaf {
    pub leaf_id: WindowId,
    /// Direction of the branch directly holding the leaf, `None` for a bare
    /// leaf root.
    pub parent_direction: Option<Direction>,
    /// Steps from the root down to the leaf.
    pub path: Vec<Side>,
}

impl ShallowestLeaf {
    pub fn depth(&self) -> usize { self.path.len() }
}

/// Finds the leaf closest to the root. Among leaves at the same depth the one
/// reached by exploring `first` before `second` at every level wins.
pub fn find_shallowest_leaf(tree: &MosaicNode) -> ShallowestLeaf {
    let mut found = shallowest(tree, None);
    found.path.reverse();
    found
}

// Builds the path leaf-to-root; the caller reverses it once.
fn shallowest(node: &MosaicNode, parent_direction: Option<Direction>) -> ShallowestLeaf {
    match node {
        MosaicNode::Leaf(id) => ShallowestLeaf {
            leaf_id: id.clone(),
            parent_direction,
            path: Vec::new(),
        },
        MosaicNode::Branch(branch) => {
            let first = shallowest(&branch.first, Some(branch.direction));
            let second = shallowest(&branch.second, Some(branch.direction));
            // Ties go to `first`.
            let (side, mut best) = if second.depth() < first.depth() {
                (Side::Second, second)
            } else {
                (Side::First, first)
            };
            best.path.push(side);
            best
        }
    }
}

/// Places `new_leaf` into `tree` according to `config`.
///
/// `row` and `column` wrap the whole existing tree under a new root. `smart`
/// splits the shallowest leaf in place, turning it into a branch whose
/// direction is the opposite of its former parent's; a bare leaf root is split
/// as a row.
pub fn insert_leaf(
    tree: Option<&MosaicNode>,
    new_leaf: WindowId,
    config: &LayoutConfig,
) -> MosaicNode {
    let Some(tree) = tree else {
        return MosaicNode::Leaf(new_leaf);
    };
    match config.insertion_mode {
        InsertionMode::Row => wrap(tree.clone(), new_leaf, Direction::Row, config),
        InsertionMode::Column => wrap(tree.clone(), new_leaf, Direction::Column, config),
        InsertionMode::Smart => match tree {
            MosaicNode::Leaf(_) => wrap(tree.clone(), new_leaf, Direction::Row, config),
            MosaicNode::Branch(_) => split_shallowest(tree, new_leaf, config),
        },
    }
}

fn wrap(
    existing: MosaicNode,
    new_leaf: WindowId,
    direction: Direction,
    config: &LayoutConfig,
) -> MosaicNode {
    let (first, second) =
        config.insertion_position.arrange(existing, MosaicNode::Leaf(new_leaf));
    MosaicNode::branch(direction, first, second, config.split_percentage)
}

fn split_shallowest(tree: &MosaicNode, new_leaf: WindowId, config: &LayoutConfig) -> MosaicNode {
    let target = find_shallowest_leaf(tree);
    let direction = target.parent_direction.map_or(Direction::Row, Direction::opposite);

    let mut out = tree.clone();
    if let Some(slot) = out.node_at_mut(&target.path) {
        *slot = wrap(MosaicNode::Leaf(target.leaf_id), new_leaf, direction, config);
    }
    out
}

/// Removes `leaf` from `tree`, collapsing its parent branch into the sibling.
///
/// Returns `None` when `tree` is exactly that leaf. A leaf that is not in the
/// tree leaves it unchanged.
pub fn remove_leaf(tree: &MosaicNode, leaf: &WindowId) -> Option<MosaicNode> {
    if tree.is_leaf_of(leaf) {
        return None;
    }
    Some(collapse(tree, leaf).unwrap_or_else(|| tree.clone()))
}

// `None` means `leaf` was not found under `node`.
fn collapse(node: &MosaicNode, leaf: &WindowId) -> Option<MosaicNode> {
    let MosaicNode::Branch(branch) = node else {
        return None;
    };
    if branch.first.is_leaf_of(leaf) {
        return Some(branch.second.clone());
    }
    if branch.second.is_leaf_of(leaf) {
        return Some(branch.first.clone());
    }
    if let Some(first) = collapse(&branch.first, leaf) {
        return Some(MosaicNode::branch(
            branch.direction,
            first,
            branch.second.clone(),
            branch.split_percentage,
        ));
    }
    collapse(&branch.second, leaf).map(|second| {
        MosaicNode::branch(
            branch.direction,
            branch.first.clone(),
            second,
            branch.split_percentage,
        )
    })
}
