use argus_types::Snapshot;
use tokio::sync::watch;

/// Coalescing pub/sub over `Snapshot`. Backed by a `watch` channel: a
/// subscriber that falls behind observes only the latest value, never a backlog,
/// which doubles as a drop-oldest one-slot mailbox without any extra bookkeeping.
#[derive(Debug, Clone)]
pub struct Publisher {
    tx: watch::Sender<Snapshot>,
}

impl Publisher {
    pub fn new(initial: Snapshot) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// A fresh receiver, seeded with the most recently published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    /// Publishes a new snapshot to all current subscribers. `watch` itself drops
    /// the previous value once every receiver has seen it, so there is nothing to
    /// unsubscribe explicitly: a receiver is simply dropped by its owner.
    pub fn publish(&self, snapshot: Snapshot) {
        let _ = self.tx.send(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn empty_snapshot(last_updated: i64) -> Snapshot {
        Snapshot {
            projects: BTreeMap::new(),
            completed_work: Vec::new(),
            last_updated,
        }
    }

    #[test]
    fn subscriber_sees_latest_snapshot_after_publish() {
        let publisher = Publisher::new(empty_snapshot(0));
        let mut rx = publisher.subscribe();
        assert_eq!(rx.borrow().last_updated, 0);

        publisher.publish(empty_snapshot(100));
        rx.has_changed().unwrap();
        assert_eq!(rx.borrow().last_updated, 100);
    }

    #[test]
    fn late_subscriber_gets_the_current_value_not_history() {
        let publisher = Publisher::new(empty_snapshot(0));
        publisher.publish(empty_snapshot(1));
        publisher.publish(empty_snapshot(2));

        let rx = publisher.subscribe();
        assert_eq!(rx.borrow().last_updated, 2);
    }
}
