// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Commit notifications
//!
//! Subscribers hold a `broadcast::Receiver` and get one event per published
//! generation. Dropping the receiver unsubscribes. A slow subscriber that
//! falls more than `capacity` events behind sees `RecvError::Lagged` and
//! should simply re-fetch the snapshot.

use super::id::SnapshotId;
use super::operations::CatalogChange;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// What a successful commit published
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEvent {
    pub generation: SnapshotId,
    pub committed_at: DateTime<Utc>,
    pub changes: Vec<CatalogChange>,
}

impl CatalogEvent {
    pub fn new(generation: SnapshotId, changes: Vec<CatalogChange>) -> Self {
        Self {
            generation,
            committed_at: Utc::now(),
            changes,
        }
    }
}

/// Bounded broadcast channel of commit events
#[derive(Debug)]
pub struct EventChannel {
    sender: broadcast::Sender<CatalogEvent>,
}

impl EventChannel {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Send an event to every current subscriber
    ///
    /// Having no subscribers is not an error; the event is dropped.
    pub fn publish(&self, event: CatalogEvent) {
        let generation = event.generation;
        match self.sender.send(event) {
            Ok(receivers) => {
                log::debug!(
                    "Published generation {} to {} subscriber(s)",
                    generation,
                    receivers
                );
            }
            Err(_) => {
                log::debug!("No subscribers for generation {}", generation);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::id::NamespaceId;
    use crate::catalog::operations::CatalogObject;

    #[test]
    fn test_subscribers_receive_published_events() {
        let channel = EventChannel::new(4);
        let mut first = channel.subscribe();
        let mut second = channel.subscribe();
        assert_eq!(channel.subscriber_count(), 2);

        let change = CatalogChange::Created(CatalogObject::Namespace(NamespaceId::new(1)));
        channel.publish(CatalogEvent::new(SnapshotId::new(7), vec![change.clone()]));

        let received = first.try_recv().unwrap();
        assert_eq!(received.generation, SnapshotId::new(7));
        assert_eq!(received.changes, vec![change]);
        assert_eq!(second.try_recv().unwrap().generation, SnapshotId::new(7));
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let channel = EventChannel::new(1);
        channel.publish(CatalogEvent::new(SnapshotId::new(1), Vec::new()));

        let mut late = channel.subscribe();
        assert!(late.try_recv().is_err());
    }

    #[test]
    fn test_dropped_receiver_unsubscribes() {
        let channel = EventChannel::new(2);
        let receiver = channel.subscribe();
        drop(receiver);
        assert_eq!(channel.subscriber_count(), 0);
    }
}
