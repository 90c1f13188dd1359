//! Persistable snapshot of a configurable.

use super::{DataConfigurableDataSearch, ReloadCallback, Style};
use crate::api::DiscoverApi;
use crate::data::ParameterValues;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Enough state to rebuild a [`DataConfigurableDataSearch`] later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleConfigurable {
    /// Distribution id.
    pub id: String,
    /// Applied parameter values.
    pub param_values: ParameterValues,
    /// Map style.
    #[serde(default)]
    pub style: Option<Style>,
    /// Favourite flag.
    #[serde(default)]
    pub pinned: bool,
    /// Selection flag.
    #[serde(default)]
    pub selected: bool,
    /// Spatial linking.
    #[serde(default)]
    pub spatial_linked: bool,
    /// Temporal linking.
    #[serde(default)]
    pub temporal_linked: bool,
    /// Spatial coverage display.
    #[serde(default)]
    pub show_spatial_coverage: bool,
    /// Category path.
    #[serde(default)]
    pub levels: Vec<String>,
}

impl DataConfigurableDataSearch {
    /// Snapshot the persistable state.
    pub fn to_simple_object(&self) -> SimpleConfigurable {
        SimpleConfigurable {
            id: self.id().to_string(),
            param_values: self.current_params().clone(),
            style: self.style().cloned(),
            pinned: self.is_pinned(),
            selected: self.is_selected(),
            spatial_linked: self.is_spatial_linked(),
            temporal_linked: self.is_temporal_linked(),
            show_spatial_coverage: self.show_spatial_coverage(),
            levels: self.levels().to_vec(),
        }
    }

    /// Rebuild a configurable from a snapshot.
    ///
    /// The distribution details are fetched again; a failed lookup yields
    /// `None`.
    pub async fn make_from_simple_object(
        api: Arc<dyn DiscoverApi>,
        simple: &SimpleConfigurable,
        reload: ReloadCallback,
    ) -> Option<Self> {
        let details = match api.details(&simple.id).await {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!("Dropping stored configurable {}: {}", simple.id, e);
                return None;
            },
        };

        let mut conf = Self::new(api, Arc::new(details), simple.param_values.clone(), reload);
        conf.set_style(simple.style.clone());
        conf.set_pinned(simple.pinned);
        conf.set_selected(simple.selected);
        conf.set_spatial_linked(simple.spatial_linked);
        conf.set_temporal_linked(simple.temporal_linked);
        conf.set_show_spatial_coverage(simple.show_spatial_coverage);
        if !simple.levels.is_empty() {
            conf.set_levels(simple.levels.clone());
        }
        Some(conf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CatalogApi;
    use crate::data::{Catalog, DistributionDetails, ParameterValue};
    use pretty_assertions::assert_eq;

    fn api() -> Arc<dyn DiscoverApi> {
        let details = DistributionDetails {
            id: "ev".into(),
            name: "Earthquake events".into(),
            description: None,
            domain: "seismo".into(),
            categories: vec!["Events".into()],
            provider: None,
            endpoint: "https://example.org/ev".into(),
            parameters: vec![],
            spatial: None,
            temporal: None,
        };
        Arc::new(CatalogApi::new(Catalog {
            domains: vec![],
            distributions: vec![details],
        }))
    }

    fn noop() -> ReloadCallback {
        Arc::new(|_: DataConfigurableDataSearch| {})
    }

    #[tokio::test]
    async fn simple_object_round_trip() {
        let api = api();
        let details = Arc::new(api.details("ev").await.unwrap());
        let mut conf = DataConfigurableDataSearch::new(
            Arc::clone(&api),
            details,
            ParameterValues::new([ParameterValue::new("minmag", "4")]),
            noop(),
        );
        conf.set_pinned(true);
        conf.set_temporal_linked(true);
        conf.set_style(Some(Style::default()));

        let simple = conf.to_simple_object();
        let json = serde_json::to_string(&simple).unwrap();
        let parsed: SimpleConfigurable = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, simple);

        let rebuilt = DataConfigurableDataSearch::make_from_simple_object(api, &parsed, noop())
            .await
            .unwrap();
        assert_eq!(rebuilt.to_simple_object(), simple);
        assert!(!rebuilt.is_changed());
    }

    #[tokio::test]
    async fn unknown_distribution_yields_none() {
        let simple = SimpleConfigurable {
            id: "gone".into(),
            param_values: ParameterValues::default(),
            style: None,
            pinned: true,
            selected: false,
            spatial_linked: false,
            temporal_linked: false,
            show_spatial_coverage: false,
            levels: vec![],
        };
        assert!(DataConfigurableDataSearch::make_from_simple_object(api(), &simple, noop())
            .await
            .is_none());
    }
}
