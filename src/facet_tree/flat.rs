//! Flattening nested levels into indented rows.

use super::levels::DistributionLevel;
use serde::{Deserialize, Serialize};

/// A single row of the flattened level tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetFlatNode {
    /// Display name.
    pub name: String,
    /// Depth, 0 for top-level rows.
    pub level: usize,
    /// Whether the row has sub-rows.
    pub expandable: bool,
    /// Number of distributions below the row.
    pub count: usize,
    /// Ids of the distributions below the row.
    pub distribution_ids: Vec<String>,
    /// Name of the parent row.
    pub parent_name: Option<String>,
    /// Whether the row is the synthetic remainder level.
    pub remainder: bool,
}

impl FacetFlatNode {
    /// Identity of the row that survives a rebuild of the tree.
    pub fn key(&self) -> NodeKey {
        NodeKey {
            name: self.name.clone(),
            parent_name: self.parent_name.clone(),
            remainder: self.remainder,
        }
    }
}

/// Row identity by name and parent name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeKey {
    /// Row name.
    pub name: String,
    /// Parent row name.
    #[serde(default)]
    pub parent_name: Option<String>,
    /// Set for the remainder level, which may share its name with a real
    /// category.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub remainder: bool,
}

/// Flatten levels into pre-order rows.
pub fn flatten(levels: &[DistributionLevel]) -> Vec<FacetFlatNode> {
    let mut nodes = Vec::new();
    for level in levels {
        add_recursive(&mut nodes, level, 0, None);
    }
    nodes
}

fn add_recursive(
    nodes: &mut Vec<FacetFlatNode>,
    level: &DistributionLevel,
    depth: usize,
    parent_name: Option<&str>,
) {
    nodes.push(FacetFlatNode {
        name: level.name.clone(),
        level: depth,
        expandable: level.is_expandable(),
        count: level.count,
        distribution_ids: level.distribution_ids.clone(),
        parent_name: parent_name.map(str::to_string),
        remainder: level.is_remainder(),
    });

    for child in &level.children {
        add_recursive(nodes, child, depth + 1, Some(&level.name));
    }
}
