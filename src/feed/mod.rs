//! Per-user change feed.
//!
//! Every write publishes a [`ChangeEvent`]; observers subscribe per user and
//! receive that user's events in publish order. Upserts carry the full document
//! snapshot, so for any one document the latest event is its current state
//! (last write wins). Nothing is promised about ordering across documents
//! written concurrently. A subscriber that falls behind the channel capacity
//! gets a single `resync` event in place of the events it missed and should
//! re-read what it displays.

pub mod handlers;

use serde::Serialize;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, warn};
use uuid::Uuid;

use axum::{routing::get, Router};

use crate::state::AppState;

const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Profile,
    Pantry,
    Meals,
    Water,
    Progress,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Upsert,
    Delete,
    Resync,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Upsert => "upsert",
            ChangeKind::Delete => "delete",
            ChangeKind::Resync => "resync",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChangeEvent {
    pub user_id: Uuid,
    pub kind: ChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<Collection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<serde_json::Value>,
}

impl ChangeEvent {
    pub fn upsert<T: Serialize>(
        user_id: Uuid,
        collection: Collection,
        document_id: Uuid,
        document: &T,
    ) -> Self {
        Self {
            user_id,
            kind: ChangeKind::Upsert,
            collection: Some(collection),
            document_id: Some(document_id),
            document: serde_json::to_value(document).ok(),
        }
    }

    pub fn delete(user_id: Uuid, collection: Collection, document_id: Uuid) -> Self {
        Self {
            user_id,
            kind: ChangeKind::Delete,
            collection: Some(collection),
            document_id: Some(document_id),
            document: None,
        }
    }

    fn resync(user_id: Uuid) -> Self {
        Self {
            user_id,
            kind: ChangeKind::Resync,
            collection: None,
            document_id: None,
            document: None,
        }
    }
}

#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Returns how many subscribers the event reached (0 when nobody listens).
    pub fn publish(&self, event: ChangeEvent) -> usize {
        let user_id = event.user_id;
        let kind = event.kind;
        match self.tx.send(event) {
            Ok(n) => {
                debug!(%user_id, kind = kind.as_str(), receivers = n, "change published");
                n
            }
            Err(_) => 0,
        }
    }

    /// Dropping the returned subscription unsubscribes.
    pub fn subscribe(&self, user_id: Uuid) -> Subscription {
        Subscription {
            user_id,
            rx: self.tx.subscribe(),
        }
    }

    /// Runs `callback` for each of the user's events until the handle is
    /// unsubscribed or dropped. Must be called from within a tokio runtime.
    pub fn observe<F>(&self, user_id: Uuid, mut callback: F) -> ObserverHandle
    where
        F: FnMut(ChangeEvent) + Send + 'static,
    {
        let mut subscription = self.subscribe(user_id);
        let task = tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                callback(event);
            }
        });
        ObserverHandle { task }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

pub struct Subscription {
    user_id: Uuid,
    rx: broadcast::Receiver<ChangeEvent>,
}

impl Subscription {
    /// Next event for this user; `None` once the feed is gone.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.user_id == self.user_id => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(user_id = %self.user_id, skipped, "change feed subscriber lagged");
                    return Some(ChangeEvent::resync(self.user_id));
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

pub struct ObserverHandle {
    task: JoinHandle<()>,
}

impl ObserverHandle {
    pub fn unsubscribe(self) {}
}

impl Drop for ObserverHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/events", get(handlers::stream_events))
}
