//! Push-based observable values.
//!
//! A thin wrapper over a `tokio::sync::watch` channel: the current value is
//! always readable and every change is broadcast to subscribers.

use std::sync::Arc;
use tokio::sync::watch;

/// A shared value whose changes are pushed to subscribers.
#[derive(Debug, Clone)]
pub struct Observable<T> {
    sender: Arc<watch::Sender<T>>,
}

impl<T: Clone + PartialEq> Observable<T> {
    /// Create an observable holding `value`.
    pub fn new(value: T) -> Self {
        let (sender, _) = watch::channel(value);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Get the current value.
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }

    /// Replace the value, notifying subscribers only when it changed.
    ///
    /// Returns whether the value changed.
    pub fn set(&self, value: T) -> bool {
        self.sender.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        })
    }

    /// Subscribe to changes. The receiver starts with the current value seen.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }
}

impl Observable<bool> {
    /// Flip a boolean observable and return the new value.
    pub fn toggle(&self) -> bool {
        let next = !self.get();
        self.set(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_broadcasts_only_changes() {
        let flag = Observable::new(false);
        let mut rx = flag.subscribe();

        assert!(!flag.set(false));
        assert!(!rx.has_changed().unwrap());

        assert!(flag.set(true));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), true);
    }

    #[test]
    fn toggle_flips_value() {
        let flag = Observable::new(false);
        assert!(flag.toggle());
        assert!(flag.get());
        assert!(!flag.toggle());
    }

    #[tokio::test]
    async fn subscriber_wakes_on_change() {
        let flag = Observable::new(false);
        let mut rx = flag.subscribe();
        let writer = flag.clone();
        tokio::spawn(async move {
            writer.set(true);
        });
        rx.changed().await.unwrap();
        assert!(*rx.borrow());
    }
}
