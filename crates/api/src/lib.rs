//! djumblelog API server library.
//!
//! Exposes configuration, state, error handling, presentation helpers and
//! routes so integration tests, host applications and the binary entrypoint
//! can all reach them.

pub mod config;
pub mod error;
pub mod feeds;
pub mod handlers;
pub mod pagination;
pub mod presenter;
pub mod query;
pub mod response;
pub mod routes;
pub mod snippet;
pub mod state;
pub mod syndication;

pub use snippet::show_djumblelog;
