//! Synchronous lifecycle signals.
//!
//! The host's write path calls [`Signals::post_save`] after inserting or
//! updating a record and [`Signals::pre_delete`] before deleting one, passing
//! the connection its own transaction runs on. Receivers are awaited in
//! connection order on that same connection, so whatever they write commits
//! or rolls back together with the host's change. The first receiver error
//! aborts dispatch and is returned to the caller.

use std::sync::Arc;

use async_trait::async_trait;
use djumblelog_core::content_type::ContentType;
use djumblelog_core::source::SourceRef;
use djumblelog_db::JournalError;
use serde::Serialize;
use sqlx::SqliteConnection;

// ---------------------------------------------------------------------------
// LifecycleEvent
// ---------------------------------------------------------------------------

/// The two lifecycle points receivers can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    PostSave,
    PreDelete,
}

/// A lifecycle notification for one source record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// The record was written. `created` is false for updates.
    Saved { source: SourceRef, created: bool },
    /// The record is about to be removed.
    Deleting { source: SourceRef },
}

impl LifecycleEvent {
    pub fn kind(&self) -> SignalKind {
        match self {
            Self::Saved { .. } => SignalKind::PostSave,
            Self::Deleting { .. } => SignalKind::PreDelete,
        }
    }

    pub fn source(&self) -> &SourceRef {
        match self {
            Self::Saved { source, .. } | Self::Deleting { source } => source,
        }
    }
}

// ---------------------------------------------------------------------------
// Receiver
// ---------------------------------------------------------------------------

/// Something that reacts to lifecycle events inside the host's transaction.
#[async_trait]
pub trait Receiver: Send + Sync {
    async fn receive(
        &self,
        conn: &mut SqliteConnection,
        event: &LifecycleEvent,
    ) -> Result<(), JournalError>;
}

/// Handle returned by [`Signals::connect`], used to disconnect later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReceiverId(u64);

struct Connection {
    id: ReceiverId,
    kind: SignalKind,
    sender: ContentType,
    receiver: Arc<dyn Receiver>,
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// Registry of receivers keyed by signal kind and sender content type.
#[derive(Default)]
pub struct Signals {
    next_id: u64,
    connections: Vec<Connection>,
}

impl Signals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect `receiver` to `kind` events sent for records of `sender`.
    pub fn connect(
        &mut self,
        kind: SignalKind,
        sender: ContentType,
        receiver: Arc<dyn Receiver>,
    ) -> ReceiverId {
        self.next_id += 1;
        let id = ReceiverId(self.next_id);
        tracing::debug!(?kind, sender = %sender, "Signal receiver connected");
        self.connections.push(Connection {
            id,
            kind,
            sender,
            receiver,
        });
        id
    }

    /// Remove a receiver. Returns whether it was connected.
    pub fn disconnect(&mut self, id: ReceiverId) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c.id != id);
        self.connections.len() != before
    }

    pub fn has_receivers(&self, kind: SignalKind, sender: &ContentType) -> bool {
        self.connections
            .iter()
            .any(|c| c.kind == kind && &c.sender == sender)
    }

    /// Content types with at least one receiver for `kind`, sorted.
    pub fn senders(&self, kind: SignalKind) -> Vec<ContentType> {
        let mut senders: Vec<ContentType> = self
            .connections
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.sender.clone())
            .collect();
        senders.sort();
        senders.dedup();
        senders
    }

    /// Dispatch a post-save event for `source`.
    pub async fn post_save(
        &self,
        conn: &mut SqliteConnection,
        source: &SourceRef,
        created: bool,
    ) -> Result<(), JournalError> {
        let event = LifecycleEvent::Saved {
            source: source.clone(),
            created,
        };
        self.send(conn, &event).await
    }

    /// Dispatch a pre-delete event for `source`.
    pub async fn pre_delete(
        &self,
        conn: &mut SqliteConnection,
        source: &SourceRef,
    ) -> Result<(), JournalError> {
        let event = LifecycleEvent::Deleting {
            source: source.clone(),
        };
        self.send(conn, &event).await
    }

    /// Await every matching receiver in connection order.
    pub async fn send(
        &self,
        conn: &mut SqliteConnection,
        event: &LifecycleEvent,
    ) -> Result<(), JournalError> {
        let kind = event.kind();
        let sender = &event.source().content_type;

        for connection in self
            .connections
            .iter()
            .filter(|c| c.kind == kind && &c.sender == sender)
        {
            connection.receiver.receive(&mut *conn, event).await?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
