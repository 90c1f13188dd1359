//! Application state and logic.

use crate::api::{DiscoverApi, SearchQuery};
use crate::configurable::{DataConfigurable, DataConfigurableDataSearch, SimpleConfigurable};
use crate::data::{
    build_facet_model, BoundingBox, Dictionary, DictionaryItem, DistributionDetails,
    DistributionSummary, DomainInfo, FacetModel, ParameterDefinition, TemporalRange,
};
use crate::error::Result;
use crate::facet_tree::{FacetDropdownState, SavedSelections};
use crate::lifecycle::{AttachDetach, RouteCache, Subscriptions};
use crate::ports::{
    AnalyticsPort, ClipboardPort, NotificationLevel, NotificationLog, NotificationPort,
    SystemClipboard, TracingAnalytics,
};
use crate::results::{ResultsPanel, SelectOutcome, SelectRequest};
use crate::search::SearchState;
use crate::storage::{
    Store, StoreExt, CONFIGURABLES_KEY, FACET_SELECTION_KEY, SELECTED_DISTRIBUTION_KEY,
};
use crate::util;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Application theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    /// Gruvbox dark theme.
    GruvboxDark,
    /// Gruvbox light theme.
    GruvboxLight,
}

impl Theme {
    /// Get the next theme in the cycle.
    pub fn next(self) -> Self {
        match self {
            Theme::GruvboxDark => Theme::GruvboxLight,
            Theme::GruvboxLight => Theme::GruvboxDark,
        }
    }

    /// Get the theme name.
    pub fn name(self) -> &'static str {
        match self {
            Theme::GruvboxDark => "Gruvbox Dark",
            Theme::GruvboxLight => "Gruvbox Light",
        }
    }
}

/// Pane with keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    /// Facet checklist of the active domain.
    Facets,
    /// Distributions let through by the facets.
    Distributions,
    /// Selected distributions.
    Results,
    /// Parameters of the selected result.
    Parameters,
}

impl Pane {
    /// Get the next pane in the cycle.
    pub fn next(self) -> Self {
        match self {
            Pane::Facets => Pane::Distributions,
            Pane::Distributions => Pane::Results,
            Pane::Results => Pane::Parameters,
            Pane::Parameters => Pane::Facets,
        }
    }
}

/// Which list the results pane shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsView {
    /// Every selected distribution.
    All,
    /// Pinned distributions only.
    Favourites,
}

impl ResultsView {
    /// Route path used to cache the view.
    pub fn route(self) -> &'static str {
        match self {
            ResultsView::All => "/results",
            ResultsView::Favourites => "/favourites",
        }
    }

    /// The other view.
    pub fn toggle(self) -> Self {
        match self {
            ResultsView::All => ResultsView::Favourites,
            ResultsView::Favourites => ResultsView::All,
        }
    }

    /// Title shown above the list.
    pub fn name(self) -> &'static str {
        match self {
            ResultsView::All => "Results",
            ResultsView::Favourites => "Favourites",
        }
    }
}

/// Cursor of a results list, parked while the other list is shown.
#[derive(Debug, Default)]
pub struct ListView {
    /// Cursor position.
    pub cursor: usize,
    attached: bool,
}

impl ListView {
    /// A list shown for the first time.
    pub fn new() -> Self {
        Self {
            cursor: 0,
            attached: true,
        }
    }

    /// Whether the list is on screen.
    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

impl AttachDetach for ListView {
    fn on_attach(&mut self) {
        self.attached = true;
    }

    fn on_detach(&mut self) {
        self.attached = false;
    }
}

/// What a line input edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputTarget {
    /// A staged parameter of the current result.
    Parameter(String),
    /// The global bounding box, `W,S,E,N`.
    BoundingBox,
    /// The global time window, `start/end`.
    TimeRange,
}

/// Single-line text input.
#[derive(Debug, Clone)]
pub struct LineInput {
    /// What is being edited.
    pub target: InputTarget,
    /// Typed text.
    pub buffer: String,
}

/// Platform ports handed to the app.
#[derive(Clone)]
pub struct AppPorts {
    /// Clipboard.
    pub clipboard: Arc<dyn ClipboardPort>,
    /// Notification log shown in the status bar.
    pub notifications: NotificationLog,
    /// Usage events.
    pub analytics: Arc<dyn AnalyticsPort>,
}

impl Default for AppPorts {
    fn default() -> Self {
        Self {
            clipboard: Arc::new(SystemClipboard),
            notifications: NotificationLog::new(),
            analytics: Arc::new(TracingAnalytics),
        }
    }
}

impl fmt::Debug for AppPorts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppPorts")
            .field("notifications", &self.notifications)
            .finish_non_exhaustive()
    }
}

type DetailsMessage = (SelectRequest, Option<DistributionDetails>);

/// Application state.
pub struct App {
    api: Arc<dyn DiscoverApi>,
    store: Box<dyn Store>,
    ports: AppPorts,
    /// Domains by id.
    pub domains: Dictionary,
    /// Active domain id.
    pub active_domain: Option<String>,
    /// Facet model of the last search.
    pub model: FacetModel<DistributionSummary>,
    /// Facet checklist.
    pub facets: FacetDropdownState,
    /// Search state.
    pub search: SearchState,
    /// Selected distributions.
    pub results: ResultsPanel,
    /// Focused pane.
    pub focus: Pane,
    /// Cursor in the distributions pane.
    pub distribution_cursor: usize,
    /// Shown results list.
    pub view: ResultsView,
    /// Cursor of the shown results list.
    pub view_state: ListView,
    views: RouteCache<ListView>,
    /// Cursor in the parameters pane.
    pub param_cursor: usize,
    /// Active line input.
    pub input: Option<LineInput>,
    /// Global bounding box.
    pub global_bbox: Option<BoundingBox>,
    /// Global time window.
    pub global_range: Option<TemporalRange>,
    /// Status message.
    pub status: String,
    /// Current theme.
    pub theme: Theme,
    tasks: Subscriptions,
    details_tx: mpsc::UnboundedSender<DetailsMessage>,
    details_rx: mpsc::UnboundedReceiver<DetailsMessage>,
}

impl App {
    /// Create a new application instance.
    pub fn new(api: Arc<dyn DiscoverApi>, store: Box<dyn Store>, ports: AppPorts) -> Self {
        let saved: SavedSelections = store.get_json(FACET_SELECTION_KEY).unwrap_or_default();
        let (details_tx, details_rx) = mpsc::unbounded_channel();

        Self {
            api,
            store,
            ports,
            domains: Dictionary::default(),
            active_domain: None,
            model: FacetModel::default(),
            facets: FacetDropdownState::with_saved(saved),
            search: SearchState::new(),
            results: ResultsPanel::new(),
            focus: Pane::Facets,
            distribution_cursor: 0,
            view: ResultsView::All,
            view_state: ListView::new(),
            views: RouteCache::new(),
            param_cursor: 0,
            input: None,
            global_bbox: None,
            global_range: None,
            status: "Ready".to_string(),
            theme: Theme::GruvboxDark,
            tasks: Subscriptions::new(),
            details_tx,
            details_rx,
        }
    }

    /// The state store.
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// Load domains, restore stored configurables and run the first search.
    pub async fn load(&mut self, query: SearchQuery) -> Result<()> {
        let domains = self.api.domains().await?;
        let items = domains
            .iter()
            .map(|d| DictionaryItem::new(&d.id, &d.name))
            .collect::<Result<Vec<_>>>()?;
        self.domains = Dictionary::make(items)?;
        self.active_domain = self.domains.ids().next().map(str::to_string);

        let stored: Vec<SimpleConfigurable> =
            self.store.get_json(CONFIGURABLES_KEY).unwrap_or_default();
        let restored = self.results.restore(Arc::clone(&self.api), &stored).await;

        self.search = SearchState::with_query(query);
        self.run_search().await?;

        if let Some(id) = self.store.get_json::<String>(SELECTED_DISTRIBUTION_KEY) {
            if let Some(pos) = self.visible_distributions().iter().position(|s| s.id == id) {
                self.distribution_cursor = pos;
            }
        }

        tracing::info!(
            "Loaded {} domains, restored {} configurables",
            self.domains.len(),
            restored
        );
        self.status = format!("{} domains loaded", self.domains.len());
        Ok(())
    }

    /// Run the submitted search and rebuild the facets.
    pub async fn run_search(&mut self) -> Result<()> {
        let summaries = self.api.search(self.search.query()).await?;
        let infos: Vec<DomainInfo> = self
            .domains
            .items()
            .map(|item| DomainInfo {
                id: item.id.clone(),
                name: item.value.clone(),
            })
            .collect();

        self.model = build_facet_model(&infos, &summaries);
        if let Some(domain) = self.active_domain.clone() {
            self.facets.rebuild(&self.model, &domain);
        }
        self.distribution_cursor = 0;
        self.ports
            .analytics
            .track("search", "submit", &self.search.query().text);
        self.status = format!("{} distributions found", summaries.len());
        Ok(())
    }

    /// Name of the active domain.
    pub fn active_domain_name(&self) -> Option<&str> {
        self.active_domain
            .as_deref()
            .and_then(|id| self.domains.value_of(id))
    }

    /// Switch to the next (or previous) domain.
    pub fn switch_domain(&mut self, forward: bool) {
        let ids: Vec<String> = self.domains.ids().map(str::to_string).collect();
        if ids.is_empty() {
            return;
        }
        let current = self
            .active_domain
            .as_ref()
            .and_then(|d| ids.iter().position(|id| id == d))
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % ids.len()
        } else {
            (current + ids.len() - 1) % ids.len()
        };

        let domain = ids[next].clone();
        self.facets.rebuild(&self.model, &domain);
        self.active_domain = Some(domain);
        self.distribution_cursor = 0;
        self.persist();
        self.status = format!("Domain: {}", self.active_domain_name().unwrap_or_default());
    }

    /// Distributions of the active domain let through by the facets.
    pub fn visible_distributions(&self) -> Vec<&DistributionSummary> {
        let Some(root) = self.active_domain.as_deref().and_then(|d| self.model.root(d)) else {
            return Vec::new();
        };
        let filter = self.facets.selected_distribution_ids();
        root.flat_data()
            .into_iter()
            .filter(|s| filter.as_ref().map_or(true, |ids| ids.contains(&s.id)))
            .collect()
    }

    /// The distribution at the cursor.
    pub fn current_distribution(&self) -> Option<&DistributionSummary> {
        self.visible_distributions()
            .get(self.distribution_cursor)
            .copied()
    }

    /// Toggle the facet row at the cursor.
    pub fn toggle_facet(&mut self) {
        self.facets.toggle_current();
        self.distribution_cursor = 0;
        self.persist();
    }

    /// Deselect every facet row of the active domain.
    pub fn clear_facets(&mut self) {
        self.facets.clear();
        self.distribution_cursor = 0;
        self.persist();
        self.status = "Facet filter cleared".to_string();
    }

    /// Select the distribution at the cursor. Details load in the
    /// background.
    pub fn select_current_distribution(&mut self) {
        let Some(summary) = self.current_distribution() else {
            self.status = "No distribution selected".to_string();
            return;
        };
        let id = summary.id.clone();
        let name = summary.name.clone();
        self.ports.analytics.track("distribution", "select", &id);

        if let Some(request) = self.results.begin_select(&id, Some(name.clone())) {
            let api = Arc::clone(&self.api);
            let tx = self.details_tx.clone();
            let handle = tokio::spawn(async move {
                let details = request.fetch(api.as_ref()).await;
                if tx.send((request, details)).is_err() {
                    tracing::debug!("App closed before details arrived");
                }
            });
            self.tasks.add_task(&handle);
            self.status = format!("Loading {}...", name);
        } else {
            self.status = format!("{} already selected", name);
        }

        if let Err(e) = self.store.set_json(SELECTED_DISTRIBUTION_KEY, &id) {
            tracing::warn!("Failed to store selection: {}", e);
        }
    }

    /// Absorb finished lookups, reloads, pin changes and notifications.
    ///
    /// Returns whether the results changed.
    pub fn process_events(&mut self) -> bool {
        let mut changed = false;

        while let Ok((request, details)) = self.details_rx.try_recv() {
            match self
                .results
                .complete_select(Arc::clone(&self.api), &request, details)
            {
                SelectOutcome::Ready => {
                    changed = true;
                    let name = self
                        .results
                        .get(&request.id)
                        .map(|c| c.name().to_string())
                        .unwrap_or_default();
                    self.status = format!("{} ready", name);
                },
                SelectOutcome::Failed => {
                    changed = true;
                    self.ports.notifications.notify(
                        NotificationLevel::Warning,
                        &format!("Could not load {}", request.id),
                    );
                },
                SelectOutcome::Stale => {},
            }
        }

        if self.results.process_reloads() > 0 {
            changed = true;
        }
        if self.results.process_pin_changes() {
            changed = true;
        }
        self.tasks.prune();
        self.clamp_result_cursor();

        if changed {
            self.persist();
        }
        if let Some(latest) = self.ports.notifications.drain().pop() {
            self.status = latest.message;
        }
        changed
    }

    /// Rows of the shown results list.
    pub fn result_rows(&self) -> Vec<&DataConfigurable> {
        match self.view {
            ResultsView::All => self.results.iter().collect(),
            ResultsView::Favourites => self
                .results
                .pinned()
                .into_iter()
                .filter_map(|c| self.results.get(c.id()))
                .collect(),
        }
    }

    /// The result at the cursor.
    pub fn current_result(&self) -> Option<&DataConfigurable> {
        self.result_rows().get(self.view_state.cursor).copied()
    }

    fn current_result_id(&self) -> Option<String> {
        self.current_result().map(|c| c.id().to_string())
    }

    /// The ready configurable at the cursor.
    pub fn current_ready(&self) -> Option<&DataConfigurableDataSearch> {
        self.current_result().and_then(DataConfigurable::as_ready)
    }

    fn current_ready_mut(&mut self) -> Option<&mut DataConfigurableDataSearch> {
        let id = self.current_result_id()?;
        self.results.ready_mut(&id)
    }

    /// Parameter definitions of the ready configurable at the cursor.
    pub fn current_definitions(&self) -> &[ParameterDefinition] {
        self.current_ready()
            .map(|c| c.definitions().as_slice())
            .unwrap_or_default()
    }

    fn clamp_result_cursor(&mut self) {
        let len = self.result_rows().len();
        if self.view_state.cursor >= len {
            self.view_state.cursor = len.saturating_sub(1);
        }
        let params = self.current_definitions().len();
        if self.param_cursor >= params {
            self.param_cursor = params.saturating_sub(1);
        }
    }

    /// Switch between all results and favourites, keeping each cursor.
    pub fn switch_view(&mut self) {
        let current = std::mem::take(&mut self.view_state);
        self.views.detach(self.view.route(), current);
        self.view = self.view.toggle();
        self.view_state = self.views.attach_or_else(self.view.route(), ListView::new);
        self.clamp_result_cursor();
        self.status = format!("Showing {}", self.view.name());
    }

    /// Pin or unpin the result at the cursor.
    pub fn toggle_pin_current(&mut self) {
        let Some(conf) = self.current_ready() else {
            self.status = "Nothing to pin".to_string();
            return;
        };
        let pinned = conf.toggle_pinned();
        let name = conf.details().name.clone();
        self.ports.analytics.track(
            "distribution",
            if pinned { "pin" } else { "unpin" },
            conf.id(),
        );
        self.status = if pinned {
            format!("Pinned {}", name)
        } else {
            format!("Unpinned {}", name)
        };
    }

    /// Remove the result at the cursor.
    pub fn deselect_current(&mut self) {
        let Some(id) = self.current_result_id() else {
            return;
        };
        if let Some(removed) = self.results.deselect(&id) {
            self.status = format!("Removed {}", removed.name());
        }
        self.clamp_result_cursor();
        self.persist();
    }

    /// Apply the staged values of the result at the cursor.
    pub fn apply_current(&mut self) {
        let Some(conf) = self.current_ready() else {
            return;
        };
        if !conf.is_changed() {
            self.status = "No changes to apply".to_string();
            return;
        }
        let id = conf.id().to_string();
        let changed = conf.changed_params().join(", ");
        if self.results.apply(&id) {
            self.ports.analytics.track("parameters", "apply", &id);
            self.status = format!("Applied {}", changed);
            self.persist();
        }
    }

    /// Stage the defaults of the result at the cursor.
    pub fn reset_current(&mut self) {
        if let Some(conf) = self.current_ready_mut() {
            conf.reset_new_params();
            self.status = "Defaults staged".to_string();
        }
    }

    /// Flip spatial linking of the result at the cursor.
    pub fn toggle_spatial_link(&mut self) {
        if let Some(conf) = self.current_ready_mut() {
            let linked = !conf.is_spatial_linked();
            conf.set_spatial_linked(linked);
            self.status = format!("Map link {}", if linked { "ON" } else { "OFF" });
        }
    }

    /// Flip temporal linking of the result at the cursor.
    pub fn toggle_temporal_link(&mut self) {
        if let Some(conf) = self.current_ready_mut() {
            let linked = !conf.is_temporal_linked();
            conf.set_temporal_linked(linked);
            self.status = format!("Time link {}", if linked { "ON" } else { "OFF" });
        }
    }

    /// Start editing the parameter at the cursor.
    pub fn start_param_edit(&mut self) {
        let Some(conf) = self.current_ready() else {
            return;
        };
        let Some(def) = conf.definitions().as_slice().get(self.param_cursor) else {
            return;
        };
        let buffer = conf.new_params().get(&def.name).unwrap_or_default().to_string();
        self.input = Some(LineInput {
            target: InputTarget::Parameter(def.name.clone()),
            buffer,
        });
    }

    /// Start editing a global filter.
    pub fn start_filter_input(&mut self, target: InputTarget) {
        let buffer = match target {
            InputTarget::BoundingBox => self.global_bbox.map(|b| b.to_string()),
            InputTarget::TimeRange => self.global_range.map(|r| util::format_range(&r)),
            InputTarget::Parameter(_) => None,
        };
        self.input = Some(LineInput {
            target,
            buffer: buffer.unwrap_or_default(),
        });
    }

    /// Commit the active line input.
    pub fn commit_input(&mut self) {
        let Some(input) = self.input.take() else {
            return;
        };
        let text = input.buffer.trim();

        match input.target {
            InputTarget::Parameter(name) => {
                if let Some(conf) = self.current_ready_mut() {
                    conf.set_new_param(&name, text);
                    self.status = format!("{} staged", name);
                }
            },
            InputTarget::BoundingBox => match text.parse::<BoundingBox>() {
                Ok(bbox) => self.set_global_bbox(bbox),
                Err(e) => self
                    .ports
                    .notifications
                    .notify(NotificationLevel::Warning, &e.to_string()),
            },
            InputTarget::TimeRange => match TemporalRange::parse(text) {
                Ok(range) => self.set_global_range(range),
                Err(e) => self
                    .ports
                    .notifications
                    .notify(NotificationLevel::Warning, &e.to_string()),
            },
        }
    }

    /// Set the global bounding box and push it into linked results.
    pub fn set_global_bbox(&mut self, bbox: BoundingBox) {
        self.global_bbox = Some(bbox);
        let applied = self.results.propagate_spatial(&bbox, false);
        self.status = format!("Bounding box {} ({} applied)", bbox, applied);
    }

    /// Set the global time window and push it into linked results.
    pub fn set_global_range(&mut self, range: TemporalRange) {
        self.global_range = Some(range);
        let applied = self.results.propagate_temporal(&range, false);
        self.status = format!("Time range {} ({} applied)", util::format_range(&range), applied);
    }

    /// Copy the execution URL of the result at the cursor.
    pub async fn copy_current_url(&mut self) {
        let Some(conf) = self.current_ready() else {
            self.status = "No configured distribution".to_string();
            return;
        };
        let copied = conf
            .copy_originator_url(
                false,
                self.ports.clipboard.as_ref(),
                &self.ports.notifications,
            )
            .await;
        if copied {
            self.ports.analytics.track("distribution", "copy-url", conf.id());
        }
        self.process_events();
    }

    /// Copy a description of the result at the cursor.
    pub fn copy_current_info(&mut self) {
        let Some(conf) = self.current_ready() else {
            self.status = "No configured distribution".to_string();
            return;
        };
        let name = conf.details().name.clone();
        self.status = match util::copy_distribution_info(self.ports.clipboard.as_ref(), conf) {
            Ok(()) => format!("Copied {}!", name),
            Err(e) => format!("Copy failed: {}", e),
        };
    }

    /// Copy the facet tree of the last search.
    pub fn copy_facet_tree(&mut self) {
        self.status = match util::copy_facet_tree(self.ports.clipboard.as_ref(), &self.model) {
            Ok(()) => "Tree copied!".to_string(),
            Err(e) => format!("Copy failed: {}", e),
        };
    }

    /// Cycle to the next theme.
    pub fn cycle_theme(&mut self) {
        self.theme = self.theme.next();
        self.status = format!("Theme: {}", self.theme.name());
    }

    /// Move the cursor of the focused pane up.
    pub fn cursor_up(&mut self) {
        match self.focus {
            Pane::Facets => self.facets.cursor_up(),
            Pane::Distributions => {
                self.distribution_cursor = self.distribution_cursor.saturating_sub(1);
            },
            Pane::Results => {
                self.view_state.cursor = self.view_state.cursor.saturating_sub(1);
                self.param_cursor = 0;
            },
            Pane::Parameters => self.param_cursor = self.param_cursor.saturating_sub(1),
        }
    }

    /// Move the cursor of the focused pane down.
    pub fn cursor_down(&mut self) {
        match self.focus {
            Pane::Facets => self.facets.cursor_down(),
            Pane::Distributions => {
                if self.distribution_cursor + 1 < self.visible_distributions().len() {
                    self.distribution_cursor += 1;
                }
            },
            Pane::Results => {
                if self.view_state.cursor + 1 < self.result_rows().len() {
                    self.view_state.cursor += 1;
                    self.param_cursor = 0;
                }
            },
            Pane::Parameters => {
                if self.param_cursor + 1 < self.current_definitions().len() {
                    self.param_cursor += 1;
                }
            },
        }
    }

    /// Focus the next pane.
    pub fn next_pane(&mut self) {
        self.focus = self.focus.next();
    }

    /// Store the selections and configurables.
    pub fn persist(&mut self) {
        let snapshots = self.results.to_simple_objects();
        let outcome = self
            .store
            .set_json(CONFIGURABLES_KEY, &snapshots)
            .and_then(|()| {
                self.store
                    .set_json(FACET_SELECTION_KEY, self.facets.saved_selections())
            });
        if let Err(e) = outcome {
            self.ports.notifications.notify(
                NotificationLevel::Warning,
                &format!("Could not save state: {}", e),
            );
        }
    }

    /// Persist state and cancel background work. Later calls only persist.
    pub fn dispose(&mut self) {
        self.persist();
        self.tasks.dispose();
        tracing::debug!("App disposed");
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("active_domain", &self.active_domain)
            .field("focus", &self.focus)
            .field("view", &self.view)
            .field("results", &self.results.len())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
