//! Parameter and linking state of one selected distribution.

use super::{LinkedUpdate, ReloadCallback, Style};
use crate::api::DiscoverApi;
use crate::data::{
    BoundingBox, DistributionDetails, ParameterDefinitions, ParameterValues, TemporalRange,
};
use crate::observable::Observable;
use crate::ports::{ClipboardPort, NotificationLevel, NotificationPort};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Pin order across every configurable of the process.
static PIN_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_pin_stamp() -> u64 {
    PIN_SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

/// Editable state bound to one selected distribution.
///
/// Parameter changes never mutate an instance in place: applying builds a
/// replacement and hands it to the reload callback, which the hosting
/// collection uses to swap the old instance out.
pub struct DataConfigurableDataSearch {
    id: String,
    details: Arc<DistributionDetails>,
    definitions: ParameterDefinitions,
    current: ParameterValues,
    staged: ParameterValues,
    pinned: Observable<Option<u64>>,
    selected: Observable<bool>,
    spatial_linked: bool,
    temporal_linked: bool,
    show_spatial_coverage: bool,
    style: Option<Style>,
    levels: Vec<String>,
    loading: bool,
    api: Arc<dyn DiscoverApi>,
    reload: ReloadCallback,
}

impl DataConfigurableDataSearch {
    /// Create a configurable whose applied and staged values are `current`.
    ///
    /// Linking starts enabled when the distribution has parameters bound to
    /// the corresponding filter. Levels are the domain followed by the
    /// category path.
    pub fn new(
        api: Arc<dyn DiscoverApi>,
        details: Arc<DistributionDetails>,
        current: ParameterValues,
        reload: ReloadCallback,
    ) -> Self {
        let definitions = details.definitions();
        let levels = std::iter::once(details.domain.clone())
            .chain(details.categories.iter().cloned())
            .collect();

        Self {
            id: details.id.clone(),
            spatial_linked: definitions.has_spatial(),
            temporal_linked: definitions.has_temporal(),
            show_spatial_coverage: details.spatial.is_some(),
            staged: current.clone(),
            current,
            definitions,
            details,
            pinned: Observable::new(None),
            selected: Observable::new(false),
            style: None,
            levels,
            loading: false,
            api,
            reload,
        }
    }

    /// Create a configurable with the distribution's default values.
    pub fn with_defaults(
        api: Arc<dyn DiscoverApi>,
        details: Arc<DistributionDetails>,
        reload: ReloadCallback,
    ) -> Self {
        let current = ParameterValues::defaults(details.definitions().as_slice());
        Self::new(api, details, current, reload)
    }

    /// Distribution id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Distribution details.
    pub fn details(&self) -> &DistributionDetails {
        &self.details
    }

    /// Parameter definitions.
    pub fn definitions(&self) -> &ParameterDefinitions {
        &self.definitions
    }

    /// Applied parameter values.
    pub fn current_params(&self) -> &ParameterValues {
        &self.current
    }

    /// Staged parameter values.
    pub fn new_params(&self) -> &ParameterValues {
        &self.staged
    }

    /// Stage a candidate parameter set without applying it.
    pub fn set_new_params(&mut self, values: ParameterValues) {
        tracing::debug!("Staging {} parameters for {}", values.len(), self.id);
        self.staged = values;
    }

    /// Stage a single parameter edit.
    pub fn set_new_param(&mut self, name: &str, value: impl Into<String>) {
        self.staged.set(name, value);
    }

    /// Stage the distribution's default values.
    pub fn reset_new_params(&mut self) {
        self.staged = ParameterValues::defaults(self.definitions.as_slice());
    }

    /// Whether staged values differ from applied values.
    pub fn is_changed(&self) -> bool {
        self.current != self.staged
    }

    /// Names of the parameters whose staged value differs.
    pub fn changed_params(&self) -> Vec<String> {
        self.current.diff(&self.staged)
    }

    /// Whether an apply is in progress on this instance.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Apply the staged values.
    pub fn apply(&mut self) {
        let staged = self.staged.clone();
        self.do_apply_action(staged, None);
    }

    /// Build a replacement with `new_current` applied and hand it to the
    /// reload callback.
    ///
    /// The replacement stages `new_new` when given, otherwise nothing is
    /// pending. Pin, selection, style, linking, coverage display and levels
    /// carry over.
    pub fn do_apply_action(
        &mut self,
        new_current: ParameterValues,
        new_new: Option<ParameterValues>,
    ) {
        self.loading = true;
        tracing::info!("Applying parameters for {}", self.id);

        let replacement = Self {
            id: self.id.clone(),
            details: Arc::clone(&self.details),
            definitions: self.definitions.clone(),
            staged: new_new.unwrap_or_else(|| new_current.clone()),
            current: new_current,
            pinned: self.pinned.clone(),
            selected: self.selected.clone(),
            spatial_linked: self.spatial_linked,
            temporal_linked: self.temporal_linked,
            show_spatial_coverage: self.show_spatial_coverage,
            style: self.style.clone(),
            levels: self.levels.clone(),
            loading: false,
            api: Arc::clone(&self.api),
            reload: Arc::clone(&self.reload),
        };

        (self.reload)(replacement);
    }

    /// Propagate a global bounding box into a spatially linked configurable.
    ///
    /// With `new_params`, or when the applied bounds differ from `bbox`, the
    /// recomputed values are only staged. Otherwise they are applied at once.
    pub fn update_linked_spatial_params(&mut self, bbox: &BoundingBox, new_params: bool) -> LinkedUpdate {
        if !self.spatial_linked {
            return LinkedUpdate::Ignored;
        }

        let current = self.definitions.apply_bounding_box(&self.current, bbox);
        let staged = self.definitions.apply_bounding_box(&self.staged, bbox);
        let same_bounds = self.definitions.bounding_box(&self.current).as_ref() == Some(bbox);

        if new_params || !same_bounds {
            self.set_new_params(staged);
            LinkedUpdate::Staged
        } else {
            self.do_apply_action(current, Some(staged));
            LinkedUpdate::Applied
        }
    }

    /// Propagate a global time window into a temporally linked configurable.
    ///
    /// Same staging rule as [`Self::update_linked_spatial_params`].
    pub fn update_linked_temporal_params(
        &mut self,
        range: &TemporalRange,
        new_params: bool,
    ) -> LinkedUpdate {
        if !self.temporal_linked {
            return LinkedUpdate::Ignored;
        }

        let current = self.definitions.apply_temporal_range(&self.current, range);
        let staged = self.definitions.apply_temporal_range(&self.staged, range);
        let same_range = self.definitions.temporal_range(&self.current).as_ref() == Some(range);

        if new_params || !same_range {
            self.set_new_params(staged);
            LinkedUpdate::Staged
        } else {
            self.do_apply_action(current, Some(staged));
            LinkedUpdate::Applied
        }
    }

    /// Whether global bounding-box changes propagate here.
    pub fn is_spatial_linked(&self) -> bool {
        self.spatial_linked
    }

    /// Enable or disable spatial linking.
    pub fn set_spatial_linked(&mut self, linked: bool) {
        self.spatial_linked = linked;
    }

    /// Whether global time-window changes propagate here.
    pub fn is_temporal_linked(&self) -> bool {
        self.temporal_linked
    }

    /// Enable or disable temporal linking.
    pub fn set_temporal_linked(&mut self, linked: bool) {
        self.temporal_linked = linked;
    }

    /// Whether the spatial coverage is drawn on the map.
    pub fn show_spatial_coverage(&self) -> bool {
        self.show_spatial_coverage
    }

    /// Show or hide the spatial coverage.
    pub fn set_show_spatial_coverage(&mut self, show: bool) {
        self.show_spatial_coverage = show;
    }

    /// Map style.
    pub fn style(&self) -> Option<&Style> {
        self.style.as_ref()
    }

    /// Set the map style.
    pub fn set_style(&mut self, style: Option<Style>) {
        self.style = style;
    }

    /// Category path for breadcrumbs.
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// Replace the category path.
    pub fn set_levels(&mut self, levels: Vec<String>) {
        self.levels = levels;
    }

    /// Whether the distribution is a favourite.
    pub fn is_pinned(&self) -> bool {
        self.pinned.get().is_some()
    }

    /// Stamp taken when the distribution was pinned. Later pins have larger
    /// stamps.
    pub fn pin_stamp(&self) -> Option<u64> {
        self.pinned.get()
    }

    /// Pin or unpin. Pinning an already pinned distribution keeps its stamp.
    pub fn set_pinned(&self, pinned: bool) {
        if pinned != self.is_pinned() {
            self.pinned.set(pinned.then(next_pin_stamp));
        }
    }

    /// Flip the pin and return the new state.
    pub fn toggle_pinned(&self) -> bool {
        let pinned = !self.is_pinned();
        self.set_pinned(pinned);
        pinned
    }

    /// Receive pin changes as the pin stamp.
    pub fn subscribe_pinned(&self) -> watch::Receiver<Option<u64>> {
        self.pinned.subscribe()
    }

    /// Whether the distribution is selected in the results.
    pub fn is_selected(&self) -> bool {
        self.selected.get()
    }

    /// Select or deselect.
    pub fn set_selected(&self, selected: bool) {
        self.selected.set(selected);
    }

    /// Flip the selection and return the new state.
    pub fn toggle_selected(&self) -> bool {
        self.selected.toggle()
    }

    /// Receive selection changes.
    pub fn subscribe_selected(&self) -> watch::Receiver<bool> {
        self.selected.subscribe()
    }

    /// Resolve the execution URL for the applied or staged values.
    ///
    /// Backend failures are logged and yield `None`.
    pub async fn originator_url(&self, from_new_params: bool) -> Option<String> {
        let values = if from_new_params {
            &self.staged
        } else {
            &self.current
        };
        match self
            .api
            .originator_url(&self.id, self.definitions.as_slice(), values)
            .await
        {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!("Failed to resolve URL for {}: {}", self.id, e);
                None
            },
        }
    }

    /// Copy the execution URL to the clipboard, reporting the outcome.
    pub async fn copy_originator_url(
        &self,
        from_new_params: bool,
        clipboard: &dyn ClipboardPort,
        notifier: &dyn NotificationPort,
    ) -> bool {
        let Some(url) = self.originator_url(from_new_params).await else {
            notifier.notify(
                NotificationLevel::Error,
                &format!("Could not resolve URL for {}", self.details.name),
            );
            return false;
        };

        match clipboard.copy(&url) {
            Ok(()) => {
                notifier.notify(NotificationLevel::Info, "URL copied to clipboard");
                true
            },
            Err(e) => {
                notifier.notify(NotificationLevel::Error, &format!("Copy failed: {}", e));
                false
            },
        }
    }
}

impl fmt::Debug for DataConfigurableDataSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataConfigurableDataSearch")
            .field("id", &self.id)
            .field("current", &self.current)
            .field("staged", &self.staged)
            .field("pinned", &self.is_pinned())
            .field("selected", &self.is_selected())
            .field("spatial_linked", &self.spatial_linked)
            .field("temporal_linked", &self.temporal_linked)
            .field("loading", &self.loading)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CatalogApi;
    use crate::data::{
        Catalog, ParameterDefinition, ParameterKind, ParameterProperty, ParameterValue,
    };
    use crate::error::{PortalError, Result};
    use crate::ports::NotificationLog;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn bbox_details() -> DistributionDetails {
        DistributionDetails {
            id: "gnss-stations".into(),
            name: "GNSS Stations".into(),
            description: None,
            domain: "gnss".into(),
            categories: vec!["Station Information".into()],
            provider: None,
            endpoint: "https://example.org/gnss".into(),
            parameters: vec![
                ParameterDefinition::new("bbox", ParameterKind::String)
                    .with_property(ParameterProperty::BoundingBox),
                ParameterDefinition::new("start", ParameterKind::Date)
                    .with_property(ParameterProperty::StartDate),
                ParameterDefinition::new("end", ParameterKind::Date)
                    .with_property(ParameterProperty::EndDate),
            ],
            spatial: None,
            temporal: None,
        }
    }

    fn api_for(details: &DistributionDetails) -> Arc<dyn DiscoverApi> {
        Arc::new(CatalogApi::new(Catalog {
            domains: vec![],
            distributions: vec![details.clone()],
        }))
    }

    type Reloaded = Arc<Mutex<Vec<DataConfigurableDataSearch>>>;

    fn capture() -> (Reloaded, ReloadCallback) {
        let reloaded: Reloaded = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reloaded);
        let callback: ReloadCallback = Arc::new(move |c: DataConfigurableDataSearch| sink.lock().unwrap().push(c));
        (reloaded, callback)
    }

    fn configurable(bbox: &str) -> (DataConfigurableDataSearch, Reloaded) {
        let details = bbox_details();
        let (reloaded, callback) = capture();
        let current = ParameterValues::new([ParameterValue::new("bbox", bbox)]);
        let conf = DataConfigurableDataSearch::new(api_for(&details), Arc::new(details), current, callback);
        (conf, reloaded)
    }

    #[test]
    fn staged_values_apply_into_replacement() {
        let (mut conf, reloaded) = configurable("0,0,1,1");
        let original = conf.current_params().clone();

        conf.set_new_params(ParameterValues::new([ParameterValue::new("bbox", "1,1,2,2")]));
        assert!(conf.is_changed());
        assert_eq!(conf.changed_params(), vec!["bbox".to_string()]);
        assert_eq!(conf.current_params(), &original);
        assert!(reloaded.lock().unwrap().is_empty());

        conf.apply();
        assert!(conf.is_loading());

        let reloaded = reloaded.lock().unwrap();
        assert_eq!(reloaded.len(), 1);
        let replacement = &reloaded[0];
        assert_eq!(replacement.current_params().get("bbox"), Some("1,1,2,2"));
        assert!(!replacement.is_changed());
        assert!(!replacement.is_loading());
    }

    #[test]
    fn apply_preserves_flags_and_levels() {
        let (mut conf, reloaded) = configurable("0,0,1,1");
        conf.set_pinned(true);
        conf.set_selected(true);
        conf.set_spatial_linked(false);
        conf.set_temporal_linked(true);
        conf.set_show_spatial_coverage(true);
        conf.set_style(Some(Style::default()));
        conf.set_levels(vec!["gnss".into(), "Custom".into()]);

        let new_current = ParameterValues::new([ParameterValue::new("bbox", "5,5,6,6")]);
        let new_new = ParameterValues::new([ParameterValue::new("bbox", "7,7,8,8")]);
        conf.do_apply_action(new_current.clone(), Some(new_new.clone()));

        let reloaded = reloaded.lock().unwrap();
        let replacement = &reloaded[0];
        assert_eq!(replacement.id(), conf.id());
        assert_eq!(replacement.current_params(), &new_current);
        assert_eq!(replacement.new_params(), &new_new);
        assert!(replacement.is_pinned());
        assert!(replacement.is_selected());
        assert!(!replacement.is_spatial_linked());
        assert!(replacement.is_temporal_linked());
        assert!(replacement.show_spatial_coverage());
        assert_eq!(replacement.style(), Some(&Style::default()));
        assert_eq!(replacement.levels(), conf.levels());
    }

    #[test]
    fn new_configurable_links_bound_filters() {
        let (conf, _) = configurable("0,0,1,1");
        assert!(conf.is_spatial_linked());
        assert!(conf.is_temporal_linked());
        assert_eq!(conf.levels(), &["gnss".to_string(), "Station Information".to_string()]);
    }

    #[test]
    fn linked_spatial_update_with_new_params_only_stages() {
        let (mut conf, reloaded) = configurable("0,0,1,1");
        let same = BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap();

        assert_eq!(conf.update_linked_spatial_params(&same, true), LinkedUpdate::Staged);
        assert!(reloaded.lock().unwrap().is_empty());
    }

    #[test]
    fn linked_spatial_update_with_different_bounds_stages() {
        let (mut conf, reloaded) = configurable("0,0,1,1");
        let other = BoundingBox::new(10.0, 10.0, 20.0, 20.0).unwrap();

        assert_eq!(conf.update_linked_spatial_params(&other, false), LinkedUpdate::Staged);
        assert_eq!(conf.new_params().get("bbox"), Some("10,10,20,20"));
        assert_eq!(conf.current_params().get("bbox"), Some("0,0,1,1"));
        assert!(reloaded.lock().unwrap().is_empty());
    }

    #[test]
    fn linked_spatial_update_with_same_bounds_applies() {
        let (mut conf, reloaded) = configurable("0,0,1,1");
        let same = BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap();

        assert_eq!(conf.update_linked_spatial_params(&same, false), LinkedUpdate::Applied);
        let reloaded = reloaded.lock().unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].current_params().get("bbox"), Some("0,0,1,1"));
    }

    #[test]
    fn unlinked_configurable_ignores_filters() {
        let (mut conf, reloaded) = configurable("0,0,1,1");
        conf.set_spatial_linked(false);
        conf.set_temporal_linked(false);
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let range = TemporalRange::parse("2020-01-01/2020-02-01").unwrap();

        assert_eq!(conf.update_linked_spatial_params(&bbox, false), LinkedUpdate::Ignored);
        assert_eq!(conf.update_linked_temporal_params(&range, false), LinkedUpdate::Ignored);
        assert!(!conf.is_changed());
        assert!(reloaded.lock().unwrap().is_empty());
    }

    #[test]
    fn linked_temporal_update_follows_same_rule() {
        let (mut conf, reloaded) = configurable("0,0,1,1");
        let range = TemporalRange::parse("2020-01-01/2020-02-01").unwrap();

        assert_eq!(conf.update_linked_temporal_params(&range, false), LinkedUpdate::Staged);
        assert_eq!(conf.new_params().get("start"), Some("2020-01-01"));

        let staged = conf.new_params().clone();
        conf.do_apply_action(staged, None);
        let mut replacement = reloaded.lock().unwrap().pop().unwrap();

        assert_eq!(
            replacement.update_linked_temporal_params(&range, false),
            LinkedUpdate::Applied
        );
        assert_eq!(reloaded.lock().unwrap().len(), 1);
    }

    #[test]
    fn pin_changes_are_pushed_across_replacements() {
        let (mut conf, reloaded) = configurable("0,0,1,1");
        let mut rx = conf.subscribe_pinned();

        assert!(conf.toggle_pinned());
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        conf.apply();
        let replacement = reloaded.lock().unwrap().pop().unwrap();
        replacement.set_pinned(false);
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow().is_none());
    }

    #[test]
    fn repinning_keeps_the_stamp_and_later_pins_sort_after() {
        let (first, _) = configurable("0,0,1,1");
        let (second, _) = configurable("0,0,1,1");

        second.set_pinned(true);
        first.set_pinned(true);
        let stamp = second.pin_stamp().unwrap();
        second.set_pinned(true);

        assert_eq!(second.pin_stamp(), Some(stamp));
        assert!(first.pin_stamp().unwrap() > stamp);
    }

    #[tokio::test]
    async fn originator_url_for_current_and_staged() {
        let (mut conf, _) = configurable("0,0,1,1");
        conf.set_new_param("bbox", "1,1,2,2");

        assert_eq!(
            conf.originator_url(false).await.as_deref(),
            Some("https://example.org/gnss?bbox=0%2C0%2C1%2C1")
        );
        assert_eq!(
            conf.originator_url(true).await.as_deref(),
            Some("https://example.org/gnss?bbox=1%2C1%2C2%2C2")
        );
    }

    struct FailingClipboard;

    impl ClipboardPort for FailingClipboard {
        fn copy(&self, _text: &str) -> Result<()> {
            Err(PortalError::Storage("no clipboard".into()))
        }
    }

    #[derive(Default)]
    struct RecordingClipboard(Mutex<Option<String>>);

    impl ClipboardPort for RecordingClipboard {
        fn copy(&self, text: &str) -> Result<()> {
            *self.0.lock().unwrap() = Some(text.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn copy_failures_become_notifications() {
        let (conf, _) = configurable("0,0,1,1");
        let log = NotificationLog::new();

        assert!(!conf.copy_originator_url(false, &FailingClipboard, &log).await);
        assert_eq!(log.latest().unwrap().level, NotificationLevel::Error);

        let clipboard = RecordingClipboard::default();
        assert!(conf.copy_originator_url(false, &clipboard, &log).await);
        assert!(clipboard.0.lock().unwrap().as_deref().unwrap().starts_with("https://"));
        assert_eq!(log.latest().unwrap().level, NotificationLevel::Info);
    }
}
