//! EPOS Portal - a terminal browser for EPOS discover catalogs.
//!
//! The crate groups the distributions of a catalog into a facet tree
//! (domain, category, sub-category), lets the user narrow them with a
//! tri-state checklist per domain, and keeps an editable parameter state for
//! every selected distribution. Global spatial and temporal filters flow into
//! the distributions linked to them.
//!
//! # Features
//!
//! - Facet trees with per-level counts and "Other" remainder levels
//! - Checklist selections remembered per domain and across searches
//! - Staged and applied parameter values with linked map and time filters
//! - Favourites, persisted state and execution URLs copied to the clipboard
//! - Vim-style keyboard shortcuts and Gruvbox color themes
//!
//! # Example
//!
//! ```ignore
//! use epos_portal::data::{build_facet_model, CatalogReader};
//! use std::path::Path;
//!
//! let catalog = CatalogReader::read_file(Path::new("catalog.json"))?;
//! let model = build_facet_model(&catalog.domains, &catalog.summaries());
//! for root in model.roots() {
//!     println!("{} has {} distributions", root.name(), root.count());
//! }
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]

pub mod api;
pub mod app;
pub mod config;
pub mod configurable;
pub mod data;
pub mod error;
pub mod facet_tree;
pub mod lifecycle;
pub mod observable;
pub mod ports;
pub mod results;
pub mod search;
pub mod storage;
pub mod ui;
pub mod util;

pub use error::{PortalError, Result};
