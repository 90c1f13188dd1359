//! Results panel - the configurables of the selected distributions.
//!
//! The panel hosts one [`DataConfigurable`] per selected distribution. A
//! selection first shows a loading placeholder and is completed once the
//! details arrive; replacements built by applies come back through the
//! reload channel and are swapped in by id.

use crate::api::DiscoverApi;
use crate::configurable::{
    DataConfigurable, DataConfigurableDataSearch, LinkedUpdate, LoadingConfigurable,
    ReloadCallback, SimpleConfigurable,
};
use crate::data::{BoundingBox, DistributionDetails, TemporalRange};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// A pending details lookup for one selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectRequest {
    /// Distribution id.
    pub id: String,
    token: u64,
}

impl SelectRequest {
    /// Fetch the details for this request. Failures are logged and yield
    /// `None`.
    pub async fn fetch(&self, api: &dyn DiscoverApi) -> Option<DistributionDetails> {
        match api.details(&self.id).await {
            Ok(details) => Some(details),
            Err(e) => {
                tracing::warn!("Failed to load details for {}: {}", self.id, e);
                None
            },
        }
    }
}

/// Outcome of completing a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The configurable is ready.
    Ready,
    /// A newer request or a deselection superseded this one.
    Stale,
    /// The lookup failed; the placeholder was removed.
    Failed,
}

/// The configurables of the selected distributions.
#[derive(Debug)]
pub struct ResultsPanel {
    items: Vec<DataConfigurable>,
    pending: HashMap<String, u64>,
    next_token: u64,
    reload_tx: mpsc::UnboundedSender<DataConfigurableDataSearch>,
    reload_rx: mpsc::UnboundedReceiver<DataConfigurableDataSearch>,
    pin_watchers: Vec<(String, watch::Receiver<Option<u64>>)>,
}

impl ResultsPanel {
    /// Create an empty panel.
    pub fn new() -> Self {
        let (reload_tx, reload_rx) = mpsc::unbounded_channel();
        Self {
            items: Vec::new(),
            pending: HashMap::new(),
            next_token: 0,
            reload_tx,
            reload_rx,
            pin_watchers: Vec::new(),
        }
    }

    /// Callback delivering replacements to this panel.
    pub fn reload_callback(&self) -> ReloadCallback {
        let tx = self.reload_tx.clone();
        Arc::new(move |conf: DataConfigurableDataSearch| {
            if tx.send(conf).is_err() {
                tracing::debug!("Results panel dropped; discarding reload");
            }
        })
    }

    /// Start selecting a distribution.
    ///
    /// A ready configurable is reused and only marked selected (`None`).
    /// Otherwise a loading placeholder is shown and a request is returned;
    /// any earlier request for the same id becomes stale.
    pub fn begin_select(&mut self, id: &str, name: Option<String>) -> Option<SelectRequest> {
        if let Some(ready) = self.ready(id) {
            ready.set_selected(true);
            return None;
        }

        self.next_token += 1;
        let token = self.next_token;
        self.pending.insert(id.to_string(), token);

        if self.position(id).is_none() {
            self.items
                .push(DataConfigurable::Loading(LoadingConfigurable::new(id, name)));
        }
        tracing::debug!("Selecting {} (request {})", id, token);

        Some(SelectRequest {
            id: id.to_string(),
            token,
        })
    }

    /// Finish a selection with the fetched details.
    pub fn complete_select(
        &mut self,
        api: Arc<dyn DiscoverApi>,
        request: &SelectRequest,
        details: Option<DistributionDetails>,
    ) -> SelectOutcome {
        if self.pending.get(&request.id) != Some(&request.token) {
            tracing::debug!("Discarding stale details for {}", request.id);
            return SelectOutcome::Stale;
        }
        self.pending.remove(&request.id);

        let Some(details) = details else {
            if let Some(pos) = self.position(&request.id) {
                self.items.remove(pos);
            }
            return SelectOutcome::Failed;
        };

        let conf =
            DataConfigurableDataSearch::with_defaults(api, Arc::new(details), self.reload_callback());
        conf.set_selected(true);
        self.insert_ready(conf);
        SelectOutcome::Ready
    }

    /// Select a distribution, waiting for its details.
    pub async fn select(&mut self, api: Arc<dyn DiscoverApi>, id: &str) -> SelectOutcome {
        let Some(request) = self.begin_select(id, None) else {
            return SelectOutcome::Ready;
        };
        let details = request.fetch(api.as_ref()).await;
        self.complete_select(api, &request, details)
    }

    fn insert_ready(&mut self, conf: DataConfigurableDataSearch) {
        let id = conf.id().to_string();
        self.pin_watchers.retain(|(watched, _)| *watched != id);
        let mut rx = conf.subscribe_pinned();
        rx.borrow_and_update();
        self.pin_watchers.push((id.clone(), rx));

        match self.position(&id) {
            Some(pos) => self.items[pos] = conf.into(),
            None => self.items.push(conf.into()),
        }
    }

    /// Remove a distribution. An in-flight request for it becomes stale.
    pub fn deselect(&mut self, id: &str) -> Option<DataConfigurable> {
        self.pending.remove(id);
        self.pin_watchers.retain(|(watched, _)| watched != id);
        let pos = self.position(id)?;
        Some(self.items.remove(pos))
    }

    /// Swap in replacements delivered by reload callbacks.
    ///
    /// Replacements for distributions no longer in the panel are dropped.
    /// Returns the number of swaps.
    pub fn process_reloads(&mut self) -> usize {
        let mut swapped = 0;
        while let Ok(conf) = self.reload_rx.try_recv() {
            match self.position(conf.id()) {
                Some(pos) => {
                    tracing::debug!("Reloaded {}", conf.id());
                    self.items[pos] = conf.into();
                    swapped += 1;
                },
                None => tracing::debug!("Dropping reload for removed {}", conf.id()),
            }
        }
        swapped
    }

    /// Mark pin changes since the last call as seen. Returns whether any
    /// distribution was pinned or unpinned.
    pub fn process_pin_changes(&mut self) -> bool {
        let mut changed = false;
        for (id, rx) in &mut self.pin_watchers {
            if !rx.has_changed().unwrap_or(false) {
                continue;
            }
            let pinned = rx.borrow_and_update().is_some();
            tracing::debug!("{} {}", if pinned { "Pinned" } else { "Unpinned" }, id);
            changed = true;
        }
        changed
    }

    /// Pinned distributions, in the order they were pinned.
    pub fn pinned(&self) -> Vec<&DataConfigurableDataSearch> {
        let mut pinned: Vec<(u64, &DataConfigurableDataSearch)> = self
            .items
            .iter()
            .filter_map(DataConfigurable::as_ready)
            .filter_map(|conf| conf.pin_stamp().map(|stamp| (stamp, conf)))
            .collect();
        pinned.sort_by_key(|(stamp, _)| *stamp);
        pinned.into_iter().map(|(_, conf)| conf).collect()
    }

    /// Apply the staged values of one distribution.
    pub fn apply(&mut self, id: &str) -> bool {
        let Some(conf) = self.ready_mut(id) else {
            return false;
        };
        conf.apply();
        self.process_reloads() > 0
    }

    /// Forward a global bounding box to every ready configurable.
    ///
    /// Returns the number of configurables that applied at once.
    pub fn propagate_spatial(&mut self, bbox: &BoundingBox, new_params: bool) -> usize {
        let applied = self
            .items
            .iter_mut()
            .filter_map(DataConfigurable::as_ready_mut)
            .map(|conf| conf.update_linked_spatial_params(bbox, new_params))
            .filter(|outcome| *outcome == LinkedUpdate::Applied)
            .count();
        self.process_reloads();
        applied
    }

    /// Forward a global time window to every ready configurable.
    ///
    /// Returns the number of configurables that applied at once.
    pub fn propagate_temporal(&mut self, range: &TemporalRange, new_params: bool) -> usize {
        let applied = self
            .items
            .iter_mut()
            .filter_map(DataConfigurable::as_ready_mut)
            .map(|conf| conf.update_linked_temporal_params(range, new_params))
            .filter(|outcome| *outcome == LinkedUpdate::Applied)
            .count();
        self.process_reloads();
        applied
    }

    /// Snapshots of the ready configurables.
    pub fn to_simple_objects(&self) -> Vec<SimpleConfigurable> {
        self.items
            .iter()
            .filter_map(DataConfigurable::as_ready)
            .map(DataConfigurableDataSearch::to_simple_object)
            .collect()
    }

    /// Rebuild configurables from snapshots. Returns how many were restored.
    pub async fn restore(&mut self, api: Arc<dyn DiscoverApi>, simple: &[SimpleConfigurable]) -> usize {
        let mut restored = 0;
        for s in simple {
            if self.position(&s.id).is_some() {
                continue;
            }
            let conf = DataConfigurableDataSearch::make_from_simple_object(
                Arc::clone(&api),
                s,
                self.reload_callback(),
            )
            .await;
            if let Some(conf) = conf {
                self.insert_ready(conf);
                restored += 1;
            }
        }
        restored
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|c| c.id() == id)
    }

    /// Look up a configurable.
    pub fn get(&self, id: &str) -> Option<&DataConfigurable> {
        self.items.iter().find(|c| c.id() == id)
    }

    /// Look up a ready configurable.
    pub fn ready(&self, id: &str) -> Option<&DataConfigurableDataSearch> {
        self.get(id).and_then(DataConfigurable::as_ready)
    }

    /// Look up a ready configurable mutably.
    pub fn ready_mut(&mut self, id: &str) -> Option<&mut DataConfigurableDataSearch> {
        self.items
            .iter_mut()
            .find(|c| c.id() == id)
            .and_then(DataConfigurable::as_ready_mut)
    }

    /// Configurables in selection order.
    pub fn iter(&self) -> impl Iterator<Item = &DataConfigurable> {
        self.items.iter()
    }

    /// Number of configurables.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the panel is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for ResultsPanel {
    fn default() -> Self {
        Self::new()
    }
}
