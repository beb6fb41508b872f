//! Domain core for the djumblelog tumblelog.
//!
//! Content type identifiers, the source-record abstraction and its registry,
//! the template registry, and the render resolver. No I/O beyond reading
//! template files.

pub mod content_type;
pub mod error;
pub mod registry;
pub mod render;
pub mod source;
pub mod template;
pub mod types;
