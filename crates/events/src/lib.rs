//! Lifecycle signals and the journal listener.
//!
//! - [`Signals`]: synchronous post-save / pre-delete dispatch that runs
//!   receivers on the caller's connection.
//! - [`JournalListener`]: logs an entry when a tracked record is created and
//!   removes a record's entries just before it is deleted.
//! - [`connect_journal`]: wires the listener from the configured
//!   create/delete tracking lists.

pub mod listener;
pub mod signals;

pub use listener::{connect_journal, JournalConnections, JournalListener, TrackingConfig};
pub use signals::{LifecycleEvent, Receiver, ReceiverId, SignalKind, Signals};
