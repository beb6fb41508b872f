//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods.
//! Reads take `&DbPool`; writes accept any SQLite executor so they can run
//! inside the caller's transaction.

pub mod entry_repo;

pub use entry_repo::EntryRepo;
