use tokio::sync::watch;

/// In-flight operation counter backing the store's loading flag.
///
/// The flag is `true` while at least one [`LoadingGuard`] is alive.
pub(crate) struct LoadingTracker {
    in_flight: watch::Sender<usize>,
    flag: watch::Sender<bool>,
}

impl LoadingTracker {
    pub(crate) fn new() -> Self {
        let (in_flight, _) = watch::channel(0);
        let (flag, _) = watch::channel(false);
        Self { in_flight, flag }
    }

    /// Mark one operation in flight until the guard drops.
    pub(crate) fn enter(&self) -> LoadingGuard<'_> {
        // Flag transitions happen under the counter's lock.
        self.in_flight.send_modify(|n| {
            *n += 1;
            if *n == 1 {
                self.flag.send_replace(true);
            }
        });
        LoadingGuard { tracker: self }
    }

    pub(crate) fn is_loading(&self) -> bool {
        *self.flag.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<bool> {
        self.flag.subscribe()
    }

    fn exit(&self) {
        self.in_flight.send_modify(|n| {
            *n = n.saturating_sub(1);
            if *n == 0 {
                self.flag.send_replace(false);
            }
        });
    }
}

/// Clears its share of the loading flag on drop, on every exit path.
pub(crate) struct LoadingGuard<'a> {
    tracker: &'a LoadingTracker,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.tracker.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_tracks_outermost_guard() {
        let tracker = LoadingTracker::new();
        assert!(!tracker.is_loading());

        let outer = tracker.enter();
        let inner = tracker.enter();
        assert!(tracker.is_loading());

        drop(inner);
        assert!(tracker.is_loading());

        drop(outer);
        assert!(!tracker.is_loading());
    }

    #[test]
    fn flag_notifies_only_on_transitions() {
        let tracker = LoadingTracker::new();
        let mut rx = tracker.subscribe();

        let a = tracker.enter();
        assert!(rx.has_changed().unwrap_or(false));
        rx.mark_unchanged();

        let b = tracker.enter();
        assert!(!rx.has_changed().unwrap_or(true));

        drop(a);
        drop(b);
        assert!(rx.has_changed().unwrap_or(false));
        assert!(!*rx.borrow_and_update());
    }
}
