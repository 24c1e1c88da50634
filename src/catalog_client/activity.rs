use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use tokio::sync::watch;

/// Process-wide "a catalog request is outstanding" flag.
///
/// Clones share the same counter. Observers get a [`watch::Receiver`] that
/// flips to `true` when the first request starts and back to `false` once the
/// last one finishes, whatever the outcome.
#[derive(Clone, Debug)]
pub struct NetworkActivity {
    outstanding: Arc<AtomicUsize>,
    busy: Arc<watch::Sender<bool>>,
}

impl Default for NetworkActivity {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkActivity {
    pub fn new() -> Self {
        let (busy, _) = watch::channel(false);
        NetworkActivity {
            outstanding: Arc::new(AtomicUsize::new(0)),
            busy: Arc::new(busy),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.busy.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        *self.busy.borrow()
    }

    /// Mark one request as outstanding until the guard is dropped.
    pub fn begin(&self) -> ActivityGuard {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        self.publish();
        ActivityGuard {
            activity: self.clone(),
        }
    }

    fn publish(&self) {
        // Re-read the counter under the channel lock so the last writer wins.
        self.busy.send_if_modified(|busy| {
            let now = self.outstanding.load(Ordering::SeqCst) > 0;
            let changed = *busy != now;
            *busy = now;
            changed
        });
    }
}

#[must_use = "activity ends as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ActivityGuard {
    activity: NetworkActivity,
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        self.activity.outstanding.fetch_sub(1, Ordering::SeqCst);
        self.activity.publish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_while_any_guard_is_alive() {
        let activity = NetworkActivity::new();
        assert!(!activity.is_busy());

        let first = activity.begin();
        let second = activity.clone().begin();
        assert!(activity.is_busy());

        drop(first);
        assert!(activity.is_busy());
        drop(second);
        assert!(!activity.is_busy());
    }

    #[tokio::test]
    async fn subscribers_see_transitions() {
        let activity = NetworkActivity::new();
        let mut rx = activity.subscribe();

        let guard = activity.begin();
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());

        drop(guard);
        rx.changed().await.unwrap();
        assert!(!*rx.borrow_and_update());
    }
}
