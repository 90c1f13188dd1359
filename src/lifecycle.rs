//! Teardown and view caching.
//!
//! Components register what they must undo in a [`Subscriptions`] list and
//! dispose it once when they go away. Views that survive navigation
//! implement [`AttachDetach`] and are parked in a [`RouteCache`].

use std::collections::HashMap;
use std::fmt;
use tokio::task::{AbortHandle, JoinHandle};

enum Teardown {
    Task(AbortHandle),
    Callback(Box<dyn FnOnce() + Send>),
}

/// Teardown actions run once, in registration order.
#[derive(Default)]
pub struct Subscriptions {
    entries: Vec<Teardown>,
    disposed: bool,
}

impl Subscriptions {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a teardown callback.
    ///
    /// Registering on a disposed list runs the callback at once.
    pub fn add(&mut self, teardown: impl FnOnce() + Send + 'static) {
        if self.disposed {
            teardown();
            return;
        }
        self.entries.push(Teardown::Callback(Box::new(teardown)));
    }

    /// Register a task to abort on teardown.
    pub fn add_task<T>(&mut self, handle: &JoinHandle<T>) {
        if self.disposed {
            handle.abort();
            return;
        }
        self.entries.push(Teardown::Task(handle.abort_handle()));
    }

    /// Forget tasks that already finished.
    pub fn prune(&mut self) {
        self.entries.retain(|entry| match entry {
            Teardown::Task(handle) => !handle.is_finished(),
            Teardown::Callback(_) => true,
        });
    }

    /// Number of pending teardown actions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether [`Self::dispose`] already ran.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Run every teardown action. Later calls do nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        tracing::debug!("Disposing {} subscriptions", self.entries.len());
        for entry in self.entries.drain(..) {
            match entry {
                Teardown::Task(handle) => handle.abort(),
                Teardown::Callback(callback) => callback(),
            }
        }
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Subscriptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriptions")
            .field("pending", &self.entries.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}

/// State that is detached from the screen instead of destroyed.
pub trait AttachDetach {
    /// Called when the state is shown again.
    fn on_attach(&mut self) {}

    /// Called when the state is parked.
    fn on_detach(&mut self) {}
}

/// Detached view states keyed by route path.
#[derive(Debug)]
pub struct RouteCache<S> {
    entries: HashMap<String, S>,
}

impl<S: AttachDetach> RouteCache<S> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Park `state` under `route`, replacing whatever was parked there.
    pub fn detach(&mut self, route: &str, mut state: S) {
        state.on_detach();
        tracing::debug!("Detached view {}", route);
        self.entries.insert(route.to_string(), state);
    }

    /// Take the state parked under `route`, if any.
    pub fn attach(&mut self, route: &str) -> Option<S> {
        let mut state = self.entries.remove(route)?;
        state.on_attach();
        tracing::debug!("Reattached view {}", route);
        Some(state)
    }

    /// Take the parked state or build a fresh one.
    pub fn attach_or_else(&mut self, route: &str, make: impl FnOnce() -> S) -> S {
        self.attach(route).unwrap_or_else(make)
    }

    /// Whether a state is parked under `route`.
    pub fn contains(&self, route: &str) -> bool {
        self.entries.contains_key(route)
    }
}

impl<S: AttachDetach> Default for RouteCache<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    #[test]
    fn dispose_runs_once_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut subs = Subscriptions::new();
        for i in 0..3 {
            let log = Arc::clone(&log);
            subs.add(move || log.lock().unwrap().push(i));
        }
        assert_eq!(subs.len(), 3);

        subs.dispose();
        subs.dispose();
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
        assert!(subs.is_disposed());

        let late = Arc::clone(&log);
        subs.add(move || late.lock().unwrap().push(9));
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 9]);
    }

    #[test]
    fn dropping_disposes() {
        let log = Arc::new(Mutex::new(Vec::new()));
        {
            let mut subs = Subscriptions::new();
            let log = Arc::clone(&log);
            subs.add(move || log.lock().unwrap().push("done"));
        }
        assert_eq!(*log.lock().unwrap(), vec!["done"]);
    }

    #[tokio::test]
    async fn dispose_aborts_tasks() {
        let handle = tokio::spawn(std::future::pending::<()>());
        let mut subs = Subscriptions::new();
        subs.add_task(&handle);

        subs.dispose();
        let err = handle.await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn prune_forgets_finished_tasks() {
        let handle = tokio::spawn(async {});
        let mut subs = Subscriptions::new();
        subs.add_task(&handle);
        handle.await.unwrap();

        subs.prune();
        assert!(subs.is_empty());
    }

    #[derive(Debug, Default)]
    struct View {
        cursor: usize,
        attached: bool,
    }

    impl AttachDetach for View {
        fn on_attach(&mut self) {
            self.attached = true;
        }

        fn on_detach(&mut self) {
            self.attached = false;
        }
    }

    #[test]
    fn route_cache_keeps_state() {
        let mut cache = RouteCache::new();
        cache.detach(
            "/favourites",
            View {
                cursor: 4,
                attached: true,
            },
        );
        assert!(cache.contains("/favourites"));

        let view = cache.attach_or_else("/favourites", View::default);
        assert_eq!(view.cursor, 4);
        assert!(view.attached);
        assert!(!cache.contains("/favourites"));

        let fresh = cache.attach_or_else("/results", View::default);
        assert_eq!(fresh.cursor, 0);
    }
}
