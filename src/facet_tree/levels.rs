//! Nested category levels of one domain, with per-level counts.

use crate::data::{DistributionSummary, Facet, FacetModel, PATH_SEPARATOR};

/// Name of the synthetic level holding items without a sub-category.
pub const REMAINDER_NAME: &str = "Other";

// Slugs never start with `_`, so no category facet can end in this segment.
const REMAINDER_SEGMENT: &str = "_other";

/// One category level of the active domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionLevel {
    /// Facet path, or a synthetic path for the remainder level.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Number of distributions in the subtree.
    pub count: usize,
    /// Ids of the distributions in the subtree, in pre-order.
    pub distribution_ids: Vec<String>,
    /// Sub-levels.
    pub children: Vec<DistributionLevel>,
}

impl DistributionLevel {
    /// Build the levels below the root of `domain`.
    ///
    /// Items attached to the domain root itself are gathered in a trailing
    /// remainder level. An unknown domain has no levels.
    pub fn from_model(model: &FacetModel<DistributionSummary>, domain: &str) -> Vec<Self> {
        let Some(root) = model.root(domain) else {
            return Vec::new();
        };

        let mut levels: Vec<Self> = root.children().into_iter().map(Self::from_facet).collect();
        if !root.data().is_empty() {
            levels.push(Self::remainder(root));
        }
        levels
    }

    fn from_facet(facet: &Facet<DistributionSummary>) -> Self {
        let mut children: Vec<Self> = facet
            .children()
            .into_iter()
            .map(Self::from_facet)
            .collect();

        let count = facet.count();
        let children_count: usize = children.iter().map(|c| c.count).sum();
        if !children.is_empty() && count > children_count {
            children.push(Self::remainder(facet));
        }

        Self {
            id: facet.path().to_string(),
            name: facet.name().to_string(),
            count,
            distribution_ids: facet.flat_data().iter().map(|s| s.id.clone()).collect(),
            children,
        }
    }

    fn remainder(facet: &Facet<DistributionSummary>) -> Self {
        Self {
            id: format!("{}{}{}", facet.path(), PATH_SEPARATOR, REMAINDER_SEGMENT),
            name: REMAINDER_NAME.to_string(),
            count: facet.data().len(),
            distribution_ids: facet.data().iter().map(|s| s.id.clone()).collect(),
            children: Vec::new(),
        }
    }

    /// Whether the level has sub-levels.
    pub fn is_expandable(&self) -> bool {
        !self.children.is_empty()
    }

    /// Whether this is the synthetic level for items without a sub-category.
    pub fn is_remainder(&self) -> bool {
        self.id
            .rsplit(PATH_SEPARATOR)
            .next()
            .is_some_and(|segment| segment == REMAINDER_SEGMENT)
    }
}
