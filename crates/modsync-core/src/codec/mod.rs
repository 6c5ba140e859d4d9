//! Translators between in-memory containers and the on-disk JSON shapes.
//!
//! - [`keyed`]: object-of-records encoding for keyed caches, tolerant of
//!   double-encoded string values on read
//! - [`ordered`]: plain-array encoding for ordered lists
//! - [`document`]: whole-file rendering with per-backend options

pub mod document;
pub mod keyed;
pub mod ordered;

pub use document::SerializerOptions;
