//! Per-distribution editable state.
//!
//! A selected distribution is represented by a [`DataConfigurable`]: a
//! [`LoadingConfigurable`] placeholder while its details are fetched, then a
//! [`DataConfigurableDataSearch`] holding applied and staged parameters,
//! pin/select state and the spatial/temporal linking flags.

mod data_search;
mod simple;

pub use data_search::DataConfigurableDataSearch;
pub use simple::SimpleConfigurable;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Receives the replacement built by an apply.
pub type ReloadCallback = Arc<dyn Fn(DataConfigurableDataSearch) + Send + Sync>;

/// Map style of a distribution's layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// CSS-like colour.
    pub color: String,
    /// Fill opacity in `[0, 1]`.
    pub opacity: f32,
    /// Marker symbol for point layers.
    #[serde(default)]
    pub marker: Option<String>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: "#2a7fff".to_string(),
            opacity: 0.6,
            marker: None,
        }
    }
}

/// Outcome of a linked spatial/temporal update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkedUpdate {
    /// The configurable is not linked; nothing changed.
    Ignored,
    /// The recomputed values were staged only.
    Staged,
    /// The recomputed values were applied and a replacement was built.
    Applied,
}

/// Placeholder standing in for a distribution whose details are loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingConfigurable {
    /// Distribution id.
    pub id: String,
    /// Title, when already known from the search results.
    pub name: Option<String>,
}

impl LoadingConfigurable {
    /// Create a placeholder.
    pub fn new(id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            name,
        }
    }
}

/// A selected distribution, loading or ready.
#[derive(Debug)]
pub enum DataConfigurable {
    /// Details are being fetched.
    Loading(LoadingConfigurable),
    /// Details resolved.
    Ready(Box<DataConfigurableDataSearch>),
}

impl DataConfigurable {
    /// Distribution id.
    pub fn id(&self) -> &str {
        match self {
            Self::Loading(loading) => &loading.id,
            Self::Ready(ready) => ready.id(),
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            Self::Loading(loading) => loading.name.as_deref().unwrap_or(&loading.id),
            Self::Ready(ready) => &ready.details().name,
        }
    }

    /// Whether details are still loading.
    pub fn is_loading(&self) -> bool {
        match self {
            Self::Loading(_) => true,
            Self::Ready(ready) => ready.is_loading(),
        }
    }

    /// Whether the distribution is pinned. Placeholders never are.
    pub fn is_pinned(&self) -> bool {
        match self {
            Self::Loading(_) => false,
            Self::Ready(ready) => ready.is_pinned(),
        }
    }

    /// The ready configurable, if any.
    pub fn as_ready(&self) -> Option<&DataConfigurableDataSearch> {
        match self {
            Self::Loading(_) => None,
            Self::Ready(ready) => Some(&**ready),
        }
    }

    /// The ready configurable, mutably.
    pub fn as_ready_mut(&mut self) -> Option<&mut DataConfigurableDataSearch> {
        match self {
            Self::Loading(_) => None,
            Self::Ready(ready) => Some(&mut **ready),
        }
    }
}

impl From<DataConfigurableDataSearch> for DataConfigurable {
    fn from(ready: DataConfigurableDataSearch) -> Self {
        Self::Ready(Box::new(ready))
    }
}
