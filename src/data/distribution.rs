//! Distribution summaries and details as returned by the discover API.

use super::extent::{BoundingBox, TemporalRange};
use super::parameters::{ParameterDefinition, ParameterDefinitions};
use serde::{Deserialize, Serialize};

/// A top-level category of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainInfo {
    /// Identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// The search-result view of a distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionSummary {
    /// Distribution id.
    pub id: String,
    /// Title.
    pub name: String,
    /// Domain id.
    pub domain: String,
    /// Category path below the domain.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Short description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Everything the portal knows about one distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionDetails {
    /// Distribution id.
    pub id: String,
    /// Title.
    pub name: String,
    /// Long description.
    #[serde(default)]
    pub description: Option<String>,
    /// Domain id.
    pub domain: String,
    /// Category path below the domain.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Data provider.
    #[serde(default)]
    pub provider: Option<String>,
    /// Base URL of the service.
    pub endpoint: String,
    /// Parameter definitions.
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
    /// Spatial coverage.
    #[serde(default)]
    pub spatial: Option<BoundingBox>,
    /// Temporal coverage.
    #[serde(default)]
    pub temporal: Option<TemporalRange>,
}

impl DistributionDetails {
    /// The summary of this distribution.
    pub fn summary(&self) -> DistributionSummary {
        DistributionSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            domain: self.domain.clone(),
            categories: self.categories.clone(),
            description: self.description.clone(),
        }
    }

    /// Parameter definitions with the filter rules.
    pub fn definitions(&self) -> ParameterDefinitions {
        ParameterDefinitions::new(self.parameters.clone())
    }

    /// Whether the distribution has parameters bound to the spatial filter.
    pub fn is_spatial(&self) -> bool {
        self.definitions().has_spatial()
    }

    /// Whether the distribution has parameters bound to the temporal filter.
    pub fn is_temporal(&self) -> bool {
        self.definitions().has_temporal()
    }

    /// Whether the text matches name, description, provider or categories.
    pub fn matches_search(&self, query: &str) -> bool {
        let query_lower = query.to_lowercase();

        if self.name.to_lowercase().contains(&query_lower) {
            return true;
        }

        if self
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&query_lower))
        {
            return true;
        }

        if self
            .provider
            .as_deref()
            .is_some_and(|p| p.to_lowercase().contains(&query_lower))
        {
            return true;
        }

        self.categories
            .iter()
            .any(|c| c.to_lowercase().contains(&query_lower))
    }
}
