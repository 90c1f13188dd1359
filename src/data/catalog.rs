//! Discover catalog reader and facet-model construction.

use super::distribution::{DistributionDetails, DistributionSummary, DomainInfo};
use super::facet::{Facet, FacetModel};
use crate::error::{PortalError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A parsed discover response: domains and the distributions below them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Top-level categories in display order.
    #[serde(default)]
    pub domains: Vec<DomainInfo>,
    /// Every distribution with its details.
    #[serde(default)]
    pub distributions: Vec<DistributionDetails>,
}

impl Catalog {
    /// Look up a distribution.
    pub fn distribution(&self, id: &str) -> Option<&DistributionDetails> {
        self.distributions.iter().find(|d| d.id == id)
    }

    /// Look up a domain.
    pub fn domain(&self, id: &str) -> Option<&DomainInfo> {
        self.domains.iter().find(|d| d.id == id)
    }

    /// Summaries of every distribution.
    pub fn summaries(&self) -> Vec<DistributionSummary> {
        self.distributions.iter().map(DistributionDetails::summary).collect()
    }
}

/// Catalog file reader.
#[derive(Debug)]
pub struct CatalogReader;

impl CatalogReader {
    /// Read a catalog JSON file.
    pub fn read_file(path: &Path) -> Result<Catalog> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PortalError::catalog_read(path.to_path_buf(), e))?;
        let catalog = Self::read_str(&text)?;
        tracing::info!(
            "Read catalog {} with {} distributions",
            path.display(),
            catalog.distributions.len()
        );
        Ok(catalog)
    }

    /// Parse a catalog from JSON text.
    pub fn read_str(text: &str) -> Result<Catalog> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Turn a display name into a facet identifier.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// Group summaries into a facet tree: domain → category → sub-category.
///
/// Every domain in `domains` gets a root, in order, even without results.
/// Summaries of an unknown domain get a root named after the domain id.
/// Domains and summaries that cannot form a valid facet path are logged and
/// left out; the rest of the tree is still built.
pub fn build_facet_model(
    domains: &[DomainInfo],
    summaries: &[DistributionSummary],
) -> FacetModel<DistributionSummary> {
    let mut roots: IndexMap<String, Facet<DistributionSummary>> = IndexMap::new();

    for domain in domains {
        match Facet::make(None, domain.id.clone(), domain.name.clone(), Vec::new()) {
            Ok(root) => {
                roots.insert(domain.id.clone(), root);
            },
            Err(e) => tracing::warn!("Skipping domain {:?}: {}", domain.id, e),
        }
    }

    for summary in summaries {
        if let Err(e) = insert_summary(&mut roots, summary) {
            tracing::warn!("Skipping distribution {}: {}", summary.id, e);
        }
    }

    tracing::debug!("Built facet model with {} roots", roots.len());
    FacetModel::new(roots)
}

fn insert_summary(
    roots: &mut IndexMap<String, Facet<DistributionSummary>>,
    summary: &DistributionSummary,
) -> Result<()> {
    // Checked up front so a bad category leaves no empty facets behind.
    if let Some(category) = summary.categories.iter().find(|c| slugify(c).is_empty()) {
        return Err(PortalError::invalid_identifier(category.as_str()));
    }

    if !roots.contains_key(&summary.domain) {
        let root = Facet::make(None, summary.domain.clone(), summary.domain.clone(), Vec::new())?;
        roots.insert(summary.domain.clone(), root);
    }
    let Some(mut node) = roots.get_mut(&summary.domain) else {
        return Ok(());
    };

    for category in &summary.categories {
        node = ensure_child(node, category)?;
    }
    node.push_data(summary.clone());
    Ok(())
}

fn ensure_child<'a, T>(parent: &'a mut Facet<T>, name: &str) -> Result<&'a mut Facet<T>> {
    let id = slugify(name);
    if parent.child(&id).is_none() {
        let child = Facet::make(Some(&*parent), id.clone(), name, Vec::new())?;
        parent.add_child(child);
    }
    parent
        .child_mut(&id)
        .ok_or_else(|| PortalError::invalid_identifier(id))
}
