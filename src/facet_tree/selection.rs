//! Tri-state checklist over flattened rows.
//!
//! Rows are in pre-order, so the descendants of a row are the contiguous run
//! of following rows with a greater depth.

use super::flat::{FacetFlatNode, NodeKey};
use indexmap::IndexSet;
use std::collections::BTreeSet;
use std::ops::Range;

/// Check state of a row as drawn by a checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    /// Not selected, no selected descendants.
    Unchecked,
    /// Some but not all descendants selected.
    Indeterminate,
    /// Selected.
    Checked,
}

/// Selection state of a flattened level tree.
#[derive(Debug, Clone, Default)]
pub struct ChecklistSelection {
    nodes: Vec<FacetFlatNode>,
    selected: Vec<bool>,
}

impl ChecklistSelection {
    /// Create an empty selection over `nodes`.
    pub fn new(nodes: Vec<FacetFlatNode>) -> Self {
        let selected = vec![false; nodes.len()];
        Self { nodes, selected }
    }

    /// Rows in pre-order.
    pub fn nodes(&self) -> &[FacetFlatNode] {
        &self.nodes
    }

    /// Whether a row is selected.
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.get(index).copied().unwrap_or(false)
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        !self.selected.iter().any(|s| *s)
    }

    /// Indices of the descendants of a row.
    pub fn descendants(&self, index: usize) -> Range<usize> {
        let Some(node) = self.nodes.get(index) else {
            return index..index;
        };
        let end = self.nodes[index + 1..]
            .iter()
            .position(|n| n.level <= node.level)
            .map_or(self.nodes.len(), |offset| index + 1 + offset);
        index + 1..end
    }

    /// Index of the parent row.
    pub fn parent(&self, index: usize) -> Option<usize> {
        let level = self.nodes.get(index)?.level;
        if level == 0 {
            return None;
        }
        self.nodes[..index].iter().rposition(|n| n.level < level)
    }

    /// Whether every leaf below the row is selected. A row without
    /// descendants reports its own state.
    pub fn descendants_all_selected(&self, index: usize) -> bool {
        let range = self.descendants(index);
        if range.is_empty() {
            return self.is_selected(index);
        }
        range
            .filter(|&i| !self.nodes[i].expandable)
            .all(|i| self.selected[i])
    }

    /// Whether some, but not all, descendants are selected.
    pub fn descendants_partially_selected(&self, index: usize) -> bool {
        let mut range = self.descendants(index);
        range.any(|i| self.selected[i]) && !self.descendants_all_selected(index)
    }

    /// Checkbox state of a row.
    pub fn check_state(&self, index: usize) -> CheckState {
        if self.is_selected(index) {
            CheckState::Checked
        } else if self.descendants_partially_selected(index) {
            CheckState::Indeterminate
        } else {
            CheckState::Unchecked
        }
    }

    /// Flip a row, apply the new state to its descendants and re-evaluate
    /// its ancestors.
    pub fn toggle(&mut self, index: usize) {
        if index >= self.nodes.len() {
            return;
        }
        let state = !self.selected[index];
        self.selected[index] = state;
        for i in self.descendants(index) {
            self.selected[i] = state;
        }
        self.check_all_parents(index);
    }

    fn check_all_parents(&mut self, index: usize) {
        let mut current = self.parent(index);
        while let Some(parent) = current {
            self.selected[parent] = self.descendants_all_selected(parent);
            current = self.parent(parent);
        }
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.selected.iter_mut().for_each(|s| *s = false);
    }

    /// Keys of the selected rows.
    pub fn selected_keys(&self) -> BTreeSet<NodeKey> {
        self.nodes
            .iter()
            .zip(&self.selected)
            .filter(|(_, selected)| **selected)
            .map(|(node, _)| node.key())
            .collect()
    }

    /// Select the rows whose key is in `keys`, deselecting the rest, then
    /// make expandable rows agree with their leaves.
    pub fn restore(&mut self, keys: &BTreeSet<NodeKey>) {
        for (node, selected) in self.nodes.iter().zip(self.selected.iter_mut()) {
            *selected = keys.contains(&node.key());
        }
        // Reverse pre-order visits children before their parents.
        for index in (0..self.nodes.len()).rev() {
            if self.nodes[index].expandable {
                self.selected[index] = self.descendants_all_selected(index);
            }
        }
    }

    /// Ids of the distributions below selected rows, without repeats.
    pub fn selected_distribution_ids(&self) -> IndexSet<String> {
        self.nodes
            .iter()
            .zip(&self.selected)
            .filter(|(_, selected)| **selected)
            .flat_map(|(node, _)| node.distribution_ids.iter().cloned())
            .collect()
    }
}
