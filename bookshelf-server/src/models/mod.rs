//! Domain models served by the catalog
//!
//! These are plain read models: optional columns are `Option`, nothing
//! database-specific leaks in here.

pub mod book;

pub use book::{Book, Chapter};
