//! Discover API seam.
//!
//! The portal core talks to the backend only through [`DiscoverApi`].
//! [`CatalogApi`] answers from an already-parsed catalog, which is what the
//! terminal front-end and the tests use.

use crate::data::{
    Catalog, DistributionDetails, DistributionSummary, DomainInfo, ParameterDefinition,
    ParameterValues,
};
use crate::error::{PortalError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

/// A free-text search over the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Text to match; empty matches everything.
    pub text: String,
}

impl SearchQuery {
    /// Create a query for `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Backend operations consumed by the core.
#[async_trait]
pub trait DiscoverApi: Send + Sync {
    /// Top-level categories.
    async fn domains(&self) -> Result<Vec<DomainInfo>>;

    /// Distributions matching a query.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<DistributionSummary>>;

    /// Full details of one distribution.
    async fn details(&self, id: &str) -> Result<DistributionDetails>;

    /// The execution URL for a distribution with the given parameter values.
    async fn originator_url(
        &self,
        id: &str,
        definitions: &[ParameterDefinition],
        values: &ParameterValues,
    ) -> Result<String>;
}

/// [`DiscoverApi`] backed by an in-memory catalog.
#[derive(Debug, Clone)]
pub struct CatalogApi {
    catalog: Catalog,
}

impl CatalogApi {
    /// Serve the given catalog.
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// The underlying catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

#[async_trait]
impl DiscoverApi for CatalogApi {
    async fn domains(&self) -> Result<Vec<DomainInfo>> {
        Ok(self.catalog.domains.clone())
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<DistributionSummary>> {
        let text = query.text.trim();
        let results: Vec<DistributionSummary> = self
            .catalog
            .distributions
            .iter()
            .filter(|d| text.is_empty() || d.matches_search(text))
            .map(DistributionDetails::summary)
            .collect();
        tracing::debug!("Search {:?} matched {} distributions", text, results.len());
        Ok(results)
    }

    async fn details(&self, id: &str) -> Result<DistributionDetails> {
        self.catalog
            .distribution(id)
            .cloned()
            .ok_or_else(|| PortalError::distribution_not_found(id))
    }

    async fn originator_url(
        &self,
        id: &str,
        definitions: &[ParameterDefinition],
        values: &ParameterValues,
    ) -> Result<String> {
        let details = self
            .catalog
            .distribution(id)
            .ok_or_else(|| PortalError::distribution_not_found(id))?;
        build_originator_url(&details.endpoint, definitions, values)
    }
}

/// Append the non-empty values of `definitions` to `endpoint` as query pairs.
///
/// Pairs follow definition order; values without a definition are skipped.
pub fn build_originator_url(
    endpoint: &str,
    definitions: &[ParameterDefinition],
    values: &ParameterValues,
) -> Result<String> {
    let mut url = Url::parse(endpoint)?;
    let pairs: Vec<(&str, &str)> = definitions
        .iter()
        .filter_map(|def| {
            let value = values.get(&def.name)?;
            (!value.is_empty()).then_some((def.name.as_str(), value))
        })
        .collect();

    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ParameterKind, ParameterValue};
    use pretty_assertions::assert_eq;

    fn definitions() -> Vec<ParameterDefinition> {
        vec![
            ParameterDefinition::new("starttime", ParameterKind::Date),
            ParameterDefinition::new("format", ParameterKind::String),
            ParameterDefinition::new("bbox", ParameterKind::String),
        ]
    }

    #[test]
    fn url_keeps_definition_order_and_skips_empty() {
        let values = ParameterValues::new([
            ParameterValue::new("bbox", "0,0,1,1"),
            ParameterValue::new("format", ""),
            ParameterValue::new("starttime", "2020-01-01"),
            ParameterValue::new("unknown", "x"),
        ]);
        let url =
            build_originator_url("https://example.org/fdsnws/event/1/query", &definitions(), &values)
                .unwrap();

        assert_eq!(
            url,
            "https://example.org/fdsnws/event/1/query?starttime=2020-01-01&bbox=0%2C0%2C1%2C1"
        );
    }

    #[test]
    fn url_without_values_is_endpoint() {
        let url = build_originator_url("https://example.org/wfs", &definitions(), &ParameterValues::default())
            .unwrap();
        assert_eq!(url, "https://example.org/wfs");
        assert!(build_originator_url("not a url", &definitions(), &ParameterValues::default()).is_err());
    }

    #[tokio::test]
    async fn catalog_api_search_and_details() {
        let catalog: Catalog = serde_json::from_str(
            r#"{
                "domains": [{"id": "seismo", "name": "Seismology"}],
                "distributions": [
                    {"id": "ev", "name": "Earthquake events", "domain": "seismo", "endpoint": "https://example.org/ev"},
                    {"id": "wf", "name": "Waveforms", "domain": "seismo", "endpoint": "https://example.org/wf", "provider": "ORFEUS"}
                ]
            }"#,
        )
        .unwrap();
        let api = CatalogApi::new(catalog);

        let all = api.search(&SearchQuery::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        let hits = api.search(&SearchQuery::new("orfeus")).await.unwrap();
        assert_eq!(hits.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(), vec!["wf"]);

        assert_eq!(api.details("ev").await.unwrap().name, "Earthquake events");
        assert!(matches!(
            api.details("missing").await,
            Err(PortalError::DistributionNotFound { .. })
        ));
    }
}
