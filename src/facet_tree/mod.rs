//! Facet dropdown - category filtering of the active domain.
//!
//! This module turns the facet model of a search into the nested levels of
//! the active domain, flattens them into rows and keeps a tri-state
//! checklist over them. Selections are remembered per domain so switching
//! domains, or running a new search, restores them.

mod flat;
mod levels;
mod selection;

pub use flat::{flatten, FacetFlatNode, NodeKey};
pub use levels::{DistributionLevel, REMAINDER_NAME};
pub use selection::{CheckState, ChecklistSelection};

use crate::data::{DistributionSummary, FacetModel};
use indexmap::IndexSet;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Saved selections, keyed by domain id.
pub type SavedSelections = BTreeMap<String, BTreeSet<NodeKey>>;

/// Dropdown state - combines levels, checklist, expansion and cursor.
#[derive(Debug, Default)]
pub struct FacetDropdownState {
    /// Active domain id.
    domain: Option<String>,
    /// Levels of the active domain.
    levels: Vec<DistributionLevel>,
    /// Checklist over the flattened levels.
    checklist: ChecklistSelection,
    /// Selections of every domain seen so far.
    saved: SavedSelections,
    /// Expanded rows.
    expanded: HashSet<NodeKey>,
    /// Cursor position (index into visible rows).
    cursor: usize,
}

impl FacetDropdownState {
    /// Create an empty dropdown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dropdown seeded with previously saved selections.
    pub fn with_saved(saved: SavedSelections) -> Self {
        Self {
            saved,
            ..Self::default()
        }
    }

    /// Active domain id.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Levels of the active domain.
    pub fn levels(&self) -> &[DistributionLevel] {
        &self.levels
    }

    /// The checklist.
    pub fn checklist(&self) -> &ChecklistSelection {
        &self.checklist
    }

    /// Selections of every domain, including the active one.
    pub fn saved_selections(&self) -> &SavedSelections {
        &self.saved
    }

    /// Rebuild the rows for `domain` from a new facet model.
    ///
    /// The active domain's selection is saved first; the selection saved for
    /// `domain` is then restored by row key.
    pub fn rebuild(&mut self, model: &FacetModel<DistributionSummary>, domain: &str) {
        self.save_current();

        self.levels = DistributionLevel::from_model(model, domain);
        self.checklist = ChecklistSelection::new(flatten(&self.levels));
        if let Some(keys) = self.saved.get(domain) {
            self.checklist.restore(keys);
        }
        self.domain = Some(domain.to_string());

        let visible = self.visible_rows().len();
        if self.cursor >= visible {
            self.cursor = visible.saturating_sub(1);
        }
        tracing::debug!(
            "Facet dropdown for {} has {} rows",
            domain,
            self.checklist.nodes().len()
        );
    }

    /// Merge the checklist into the saved selection of the active domain.
    ///
    /// Keys of rows missing from the current tree (hidden by a narrower
    /// search) are kept; keys of present rows follow the checklist.
    fn save_current(&mut self) {
        let Some(domain) = &self.domain else {
            return;
        };
        let present: HashSet<NodeKey> = self.checklist.nodes().iter().map(|n| n.key()).collect();
        let mut keys: BTreeSet<NodeKey> = self
            .saved
            .get(domain)
            .map(|saved| saved.iter().filter(|k| !present.contains(*k)).cloned().collect())
            .unwrap_or_default();
        keys.extend(self.checklist.selected_keys());

        if keys.is_empty() {
            self.saved.remove(domain);
        } else {
            self.saved.insert(domain.clone(), keys);
        }
    }

    /// Toggle the row at the cursor.
    pub fn toggle_current(&mut self) {
        if let Some(index) = self.current_index() {
            self.toggle(index);
        }
    }

    /// Toggle a row by index into all rows.
    pub fn toggle(&mut self, index: usize) {
        self.checklist.toggle(index);
        self.save_current();
    }

    /// Deselect everything in the active domain, including rows the
    /// current search hides.
    pub fn clear(&mut self) {
        self.checklist.clear();
        if let Some(domain) = &self.domain {
            self.saved.remove(domain);
        }
    }

    /// Ids of the distributions the selection lets through, or `None` when
    /// nothing is selected and no filtering applies.
    ///
    /// A saved selection whose rows are all hidden by the current search
    /// lets nothing through.
    pub fn selected_distribution_ids(&self) -> Option<IndexSet<String>> {
        let has_saved = self
            .domain
            .as_ref()
            .is_some_and(|d| self.saved.contains_key(d));
        if self.checklist.is_empty() && !has_saved {
            None
        } else {
            Some(self.checklist.selected_distribution_ids())
        }
    }

    /// Indices of rows whose ancestors are all expanded.
    pub fn visible_rows(&self) -> Vec<usize> {
        let nodes = self.checklist.nodes();
        let mut visible = Vec::new();
        let mut index = 0;
        while index < nodes.len() {
            visible.push(index);
            let node = &nodes[index];
            if node.expandable && !self.expanded.contains(&node.key()) {
                index = self.checklist.descendants(index).end;
            } else {
                index += 1;
            }
        }
        visible
    }

    /// Whether a row is expanded.
    pub fn is_expanded(&self, index: usize) -> bool {
        self.checklist
            .nodes()
            .get(index)
            .is_some_and(|n| self.expanded.contains(&n.key()))
    }

    /// Index into all rows of the row at the cursor.
    pub fn current_index(&self) -> Option<usize> {
        self.visible_rows().get(self.cursor).copied()
    }

    /// The row at the cursor.
    pub fn current_node(&self) -> Option<&FacetFlatNode> {
        self.current_index()
            .and_then(|i| self.checklist.nodes().get(i))
    }

    /// Get the current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor up one position.
    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move the cursor down one position.
    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.visible_rows().len() {
            self.cursor += 1;
        }
    }

    /// Expand the row at the cursor.
    pub fn expand_current(&mut self) {
        if let Some(node) = self.current_node() {
            if node.expandable {
                let key = node.key();
                self.expanded.insert(key);
            }
        }
    }

    /// Collapse the row at the cursor.
    pub fn collapse_current(&mut self) {
        if let Some(node) = self.current_node() {
            let key = node.key();
            self.expanded.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{build_facet_model, DomainInfo};
    use pretty_assertions::assert_eq;

    fn summary(id: &str, domain: &str, categories: &[&str]) -> DistributionSummary {
        DistributionSummary {
            id: id.to_string(),
            name: id.to_uppercase(),
            domain: domain.to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            description: None,
        }
    }

    fn domains() -> Vec<DomainInfo> {
        vec![
            DomainInfo {
                id: "gnss".into(),
                name: "GNSS Data and Products".into(),
            },
            DomainInfo {
                id: "seismo".into(),
                name: "Seismology".into(),
            },
        ]
    }

    fn full_model() -> FacetModel<DistributionSummary> {
        build_facet_model(
            &domains(),
            &[
                summary("a", "gnss", &["Products", "Velocities"]),
                summary("b", "gnss", &["Products", "Time Series"]),
                summary("c", "gnss", &["Stations"]),
                summary("d", "seismo", &["Waveforms"]),
                summary("e", "seismo", &["Events"]),
            ],
        )
    }

    #[test]
    fn selection_survives_domain_switch() {
        let model = full_model();
        let mut dropdown = FacetDropdownState::new();
        dropdown.rebuild(&model, "gnss");
        assert!(dropdown.selected_distribution_ids().is_none());

        // Stations is the second visible row while Products is collapsed.
        dropdown.cursor_down();
        dropdown.toggle_current();
        assert_eq!(
            dropdown.selected_distribution_ids().unwrap().into_iter().collect::<Vec<_>>(),
            vec!["c"]
        );

        dropdown.rebuild(&model, "seismo");
        assert!(dropdown.selected_distribution_ids().is_none());

        dropdown.rebuild(&model, "gnss");
        assert_eq!(
            dropdown.selected_distribution_ids().unwrap().into_iter().collect::<Vec<_>>(),
            vec!["c"]
        );
    }

    #[test]
    fn selection_survives_new_search() {
        let mut dropdown = FacetDropdownState::new();
        dropdown.rebuild(&full_model(), "gnss");
        dropdown.toggle(0);

        let narrowed = build_facet_model(
            &domains(),
            &[summary("a", "gnss", &["Products", "Velocities"])],
        );
        dropdown.rebuild(&narrowed, "gnss");

        assert!(dropdown.checklist().is_selected(0));
        assert_eq!(
            dropdown.selected_distribution_ids().unwrap().into_iter().collect::<Vec<_>>(),
            vec!["a"]
        );
        assert!(dropdown.saved_selections().contains_key("gnss"));
    }

    #[test]
    fn hidden_selection_survives_narrow_then_wide_search() {
        let mut dropdown = FacetDropdownState::new();
        dropdown.rebuild(&full_model(), "gnss");
        dropdown.cursor_down();
        dropdown.toggle_current();
        assert_eq!(
            dropdown.selected_distribution_ids().unwrap().into_iter().collect::<Vec<_>>(),
            vec!["c"]
        );

        // Stations is not part of the narrowed result.
        let narrowed = build_facet_model(
            &domains(),
            &[summary("a", "gnss", &["Products", "Velocities"])],
        );
        dropdown.rebuild(&narrowed, "gnss");
        assert_eq!(dropdown.selected_distribution_ids(), Some(IndexSet::new()));

        dropdown.rebuild(&full_model(), "gnss");
        assert_eq!(
            dropdown.selected_distribution_ids().unwrap().into_iter().collect::<Vec<_>>(),
            vec!["c"]
        );
        assert_eq!(dropdown.saved_selections()["gnss"].len(), 1);
    }

    #[test]
    fn toggling_visible_rows_keeps_hidden_keys() {
        let mut dropdown = FacetDropdownState::new();
        dropdown.rebuild(&full_model(), "gnss");
        dropdown.toggle(3);

        let narrowed = build_facet_model(
            &domains(),
            &[summary("a", "gnss", &["Products", "Velocities"])],
        );
        dropdown.rebuild(&narrowed, "gnss");
        dropdown.toggle(0);
        assert_eq!(
            dropdown.selected_distribution_ids().unwrap().into_iter().collect::<Vec<_>>(),
            vec!["a"]
        );

        dropdown.rebuild(&full_model(), "gnss");
        let mut ids: Vec<String> = dropdown.selected_distribution_ids().unwrap().into_iter().collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn real_other_category_is_not_the_remainder() {
        let model = build_facet_model(
            &domains(),
            &[summary("a", "gnss", &["Other"]), summary("b", "gnss", &[])],
        );
        let mut dropdown = FacetDropdownState::new();
        dropdown.rebuild(&model, "gnss");
        let names: Vec<&str> = dropdown.checklist().nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Other", "Other"]);

        dropdown.toggle(0);
        dropdown.rebuild(&model, "seismo");
        dropdown.rebuild(&model, "gnss");

        assert!(dropdown.checklist().is_selected(0));
        assert!(!dropdown.checklist().is_selected(1));
        assert_eq!(
            dropdown.selected_distribution_ids().unwrap().into_iter().collect::<Vec<_>>(),
            vec!["a"]
        );
    }

    #[test]
    fn expansion_controls_visible_rows() {
        let mut dropdown = FacetDropdownState::new();
        dropdown.rebuild(&full_model(), "gnss");
        assert_eq!(dropdown.visible_rows(), vec![0, 3]);

        dropdown.expand_current();
        assert!(dropdown.is_expanded(0));
        assert_eq!(dropdown.visible_rows(), vec![0, 1, 2, 3]);

        dropdown.collapse_current();
        assert_eq!(dropdown.visible_rows(), vec![0, 3]);
    }

    #[test]
    fn clearing_forgets_saved_domain() {
        let mut dropdown = FacetDropdownState::with_saved(SavedSelections::new());
        dropdown.rebuild(&full_model(), "seismo");
        dropdown.toggle(0);
        assert!(dropdown.saved_selections().contains_key("seismo"));

        dropdown.clear();
        assert!(dropdown.saved_selections().is_empty());
    }
}
