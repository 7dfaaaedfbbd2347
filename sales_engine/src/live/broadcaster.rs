use std::sync::Arc;

use log::*;

use crate::{
    live::{ConnectionRegistry, DeliveryReport, PushMessage, SnapshotCache, SnapshotKey},
    report::ReportSnapshot,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastOutcome {
    /// The snapshot equals the last one pushed for this slot. Nothing was sent.
    Unchanged,
    /// The snapshot was stored and pushed to the recipient's connections.
    Pushed(DeliveryReport),
}

impl BroadcastOutcome {
    pub fn was_pushed(&self) -> bool {
        matches!(self, Self::Pushed(_))
    }
}

/// Pushes reports to live connections, but only when they changed.
pub struct Broadcaster {
    cache: SnapshotCache,
    registry: Arc<ConnectionRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { cache: SnapshotCache::new(), registry }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Pushes `snapshot` to every connection of `user_id` if it differs from the last report pushed to that user.
    pub fn maybe_broadcast(&self, user_id: i64, snapshot: ReportSnapshot) -> BroadcastOutcome {
        self.gate(SnapshotKey::User(user_id), user_id, snapshot)
    }

    /// Pushes the house report to the house user's connections if it differs from the last house report. The house
    /// report is gated in its own slot, and skipped when the house user's own report already carries the same data.
    pub fn maybe_broadcast_house(&self, house_user_id: i64, snapshot: ReportSnapshot) -> BroadcastOutcome {
        if self.cache.get(SnapshotKey::User(house_user_id)).is_some_and(|own| *own == snapshot) {
            trace!("📣️ The house report matches the report user #{house_user_id} already has. Nothing to push.");
            return BroadcastOutcome::Unchanged;
        }
        self.gate(SnapshotKey::House, house_user_id, snapshot)
    }

    fn gate(&self, key: SnapshotKey, recipient: i64, snapshot: ReportSnapshot) -> BroadcastOutcome {
        let delivery = self.cache.deliver_if_changed(key, snapshot, |snapshot| {
            self.registry.send_to_user(recipient, &PushMessage::update(snapshot))
        });
        let Some(report) = delivery else {
            trace!("📣️ {key:?} report unchanged. Nothing to push.");
            return BroadcastOutcome::Unchanged;
        };
        debug!(
            "📣️ {key:?} report changed. Pushed to {} connection(s) of user #{recipient}, {} dropped, {} removed",
            report.delivered,
            report.dropped.len(),
            report.removed.len()
        );
        BroadcastOutcome::Pushed(report)
    }
}

#[cfg(test)]
mod test {
    use std::future::pending;

    use chrono::NaiveDate;
    use sales_common::DateRange;

    use super::*;
    use crate::{live::PushKind, report::aggregate};

    fn snapshot(day: u32) -> ReportSnapshot {
        aggregate(&DateRange::single(NaiveDate::from_ymd_opt(2024, 1, day).unwrap()), &[])
    }

    #[tokio::test]
    async fn equal_snapshots_are_pushed_once() {
        let registry = Arc::new(ConnectionRegistry::new(8));
        let mut sub = registry.connect(1, || tokio::spawn(pending::<()>()));
        let broadcaster = Broadcaster::new(Arc::clone(&registry));

        assert!(broadcaster.maybe_broadcast(1, snapshot(5)).was_pushed());
        assert_eq!(broadcaster.maybe_broadcast(1, snapshot(5)), BroadcastOutcome::Unchanged);
        assert!(broadcaster.maybe_broadcast(1, snapshot(6)).was_pushed());

        let first = sub.receiver.try_recv().unwrap();
        assert_eq!(first.kind, PushKind::DailyReport);
        assert_eq!(*first.data, snapshot(5));
        assert_eq!(*sub.receiver.try_recv().unwrap().data, snapshot(6));
        assert!(sub.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn snapshots_are_cached_even_without_listeners() {
        let broadcaster = Broadcaster::new(Arc::new(ConnectionRegistry::default()));
        match broadcaster.maybe_broadcast(9, snapshot(5)) {
            BroadcastOutcome::Pushed(report) => assert_eq!(report.delivered, 0),
            BroadcastOutcome::Unchanged => panic!("first snapshot must be pushed"),
        }
        assert_eq!(broadcaster.cache().get(SnapshotKey::User(9)).as_deref(), Some(&snapshot(5)));
    }

    #[tokio::test]
    async fn house_report_has_its_own_slot() {
        let registry = Arc::new(ConnectionRegistry::new(8));
        let mut owner = registry.connect(1, || tokio::spawn(pending::<()>()));
        let mut other = registry.connect(2, || tokio::spawn(pending::<()>()));
        let broadcaster = Broadcaster::new(Arc::clone(&registry));

        assert!(broadcaster.maybe_broadcast(1, snapshot(5)).was_pushed());
        // The owner already has this exact report
        assert_eq!(broadcaster.maybe_broadcast_house(1, snapshot(5)), BroadcastOutcome::Unchanged);
        assert!(broadcaster.maybe_broadcast_house(1, snapshot(6)).was_pushed());
        assert_eq!(broadcaster.maybe_broadcast_house(1, snapshot(6)), BroadcastOutcome::Unchanged);
        assert_eq!(*owner.receiver.try_recv().unwrap().data, snapshot(5));
        assert_eq!(*owner.receiver.try_recv().unwrap().data, snapshot(6));
        assert!(owner.receiver.try_recv().is_err());
        assert!(other.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn a_report_dropped_by_a_full_queue_is_sent_again() {
        let registry = Arc::new(ConnectionRegistry::new(1));
        let mut sub = registry.connect(1, || tokio::spawn(pending::<()>()));
        let broadcaster = Broadcaster::new(Arc::clone(&registry));

        assert!(broadcaster.maybe_broadcast(1, snapshot(5)).was_pushed());
        match broadcaster.maybe_broadcast(1, snapshot(6)) {
            BroadcastOutcome::Pushed(report) => assert_eq!(report.dropped, vec![sub.id]),
            BroadcastOutcome::Unchanged => panic!("a new snapshot must be pushed"),
        }
        // Still full, so the same report is attempted again rather than gated
        assert!(broadcaster.maybe_broadcast(1, snapshot(6)).was_pushed());
        assert_eq!(*sub.receiver.try_recv().unwrap().data, snapshot(5));

        match broadcaster.maybe_broadcast(1, snapshot(6)) {
            BroadcastOutcome::Pushed(report) => assert_eq!(report.delivered, 1),
            BroadcastOutcome::Unchanged => panic!("the missed snapshot must be delivered"),
        }
        assert_eq!(*sub.receiver.try_recv().unwrap().data, snapshot(6));
        assert_eq!(broadcaster.maybe_broadcast(1, snapshot(6)), BroadcastOutcome::Unchanged);
        assert!(sub.receiver.try_recv().is_err());
    }

    #[test]
    fn wire_format() {
        let message = PushMessage::update(Arc::new(snapshot(5)));
        let json: serde_json::Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "daily_report");
        assert_eq!(json["data"]["periodo"]["inicio"], "2024-01-05");
        assert_eq!(json["data"]["kpis_gerais"]["total_pedidos"], 0);
        let initial = PushMessage::initial(snapshot(5)).to_json().unwrap();
        assert!(initial.starts_with(r#"{"type":"daily_report_initial""#));
    }
}
