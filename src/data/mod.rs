//! Catalog data and its representation.
//!
//! This module handles reading discover catalogs and representing their
//! distributions as a tree of facets, together with the parameter model used
//! to configure each distribution.

mod catalog;
mod dictionary;
mod distribution;
mod extent;
mod facet;
mod parameters;

pub use catalog::{build_facet_model, slugify, Catalog, CatalogReader};
pub use dictionary::{Dictionary, DictionaryItem};
pub use distribution::{DistributionDetails, DistributionSummary, DomainInfo};
pub use extent::{format_coordinate, parse_datetime, BoundingBox, TemporalRange};
pub use facet::{Facet, FacetModel, PATH_SEPARATOR};
pub use parameters::{
    ParameterDefinition, ParameterDefinitions, ParameterKind, ParameterProperty, ParameterValue,
    ParameterValues,
};
