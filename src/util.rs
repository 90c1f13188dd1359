//! Text rendering of facets and distributions for printing and copying.

use crate::configurable::DataConfigurableDataSearch;
use crate::data::{DistributionSummary, Facet, FacetModel, TemporalRange};
use crate::error::Result;
use crate::ports::ClipboardPort;

/// Render the facet model as an indented tree with item counts.
pub fn format_facet_tree(model: &FacetModel<DistributionSummary>) -> String {
    let mut text = String::new();
    let roots: Vec<_> = model.roots().collect();
    for (i, root) in roots.iter().enumerate() {
        text.push_str(&format_tree_recursive(root, "", i == roots.len() - 1));
    }
    text
}

/// Copy the facet tree to the clipboard.
pub fn copy_facet_tree(
    clipboard: &dyn ClipboardPort,
    model: &FacetModel<DistributionSummary>,
) -> Result<()> {
    let mut text = String::from("Facet Tree\n");
    text.push_str(&"=".repeat(80));
    text.push_str("\n\n");
    text.push_str(&format_facet_tree(model));

    clipboard.copy(&text)
}

/// Copy a description of a configured distribution to the clipboard.
pub fn copy_distribution_info(
    clipboard: &dyn ClipboardPort,
    conf: &DataConfigurableDataSearch,
) -> Result<()> {
    clipboard.copy(&format_distribution_info(conf))
}

/// Describe a configured distribution with its applied parameters.
pub fn format_distribution_info(conf: &DataConfigurableDataSearch) -> String {
    let details = conf.details();
    let mut text = format!("Distribution: {}\n", details.name);
    text.push_str(&format!("Id: {}\n", details.id));
    text.push_str(&format!("Path: {}\n", conf.levels().join(" > ")));
    text.push_str(&format!("Endpoint: {}\n", details.endpoint));

    if let Some(ref provider) = details.provider {
        text.push_str(&format!("Provider: {}\n", provider));
    }
    if let Some(ref spatial) = details.spatial {
        text.push_str(&format!("Spatial coverage: {}\n", spatial));
    }
    if let Some(ref temporal) = details.temporal {
        text.push_str(&format!("Temporal coverage: {}\n", format_range(temporal)));
    }

    if !conf.current_params().is_empty() {
        text.push_str("\nParameters:\n");
        for value in conf.current_params().iter() {
            text.push_str(&format!("  {}: {}\n", value.name, value.value));
        }
    }

    text
}

/// Format a time window as `start/end` with open ends left empty.
pub fn format_range(range: &TemporalRange) -> String {
    let side = |v: Option<chrono::NaiveDateTime>| {
        v.map(|d| d.format("%Y-%m-%dT%H:%M:%SZ").to_string())
            .unwrap_or_default()
    };
    format!("{}/{}", side(range.start), side(range.end))
}

fn format_tree_recursive(facet: &Facet<DistributionSummary>, prefix: &str, is_last: bool) -> String {
    let mut result = String::new();

    let connector = if is_last { "└── " } else { "├── " };
    result.push_str(&format!(
        "{}{}{} ({})\n",
        prefix,
        connector,
        facet.name(),
        facet.count()
    ));

    let new_prefix = format!("{}{}   ", prefix, if is_last { " " } else { "│" });

    let children = facet.children();
    let leaves = facet.data();
    let total = children.len() + leaves.len();

    for (i, child) in children.iter().enumerate() {
        result.push_str(&format_tree_recursive(child, &new_prefix, i == total - 1));
    }
    for (i, item) in leaves.iter().enumerate() {
        let is_last_item = children.len() + i == total - 1;
        let connector = if is_last_item { "└── " } else { "├── " };
        result.push_str(&format!("{}{}{}\n", new_prefix, connector, item.name));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{build_facet_model, DomainInfo};
    use pretty_assertions::assert_eq;

    fn summary(id: &str, name: &str, categories: &[&str]) -> DistributionSummary {
        DistributionSummary {
            id: id.to_string(),
            name: name.to_string(),
            domain: "gnss".to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            description: None,
        }
    }

    #[test]
    fn tree_lists_facets_then_items() {
        let domains = vec![DomainInfo {
            id: "gnss".into(),
            name: "GNSS".into(),
        }];
        let model = build_facet_model(
            &domains,
            &[
                summary("a", "Velocities", &["Products"]),
                summary("b", "Stations", &[]),
            ],
        );

        let expected = "\
└── GNSS (2)
    ├── Products (1)
    │   └── Velocities
    └── Stations
";
        assert_eq!(format_facet_tree(&model), expected);
    }

    #[test]
    fn open_ranges_format_with_empty_sides() {
        let range = TemporalRange::parse("2020-01-01/").unwrap();
        assert_eq!(format_range(&range), "2020-01-01T00:00:00Z/");
    }
}
