//! # Dataset Module
//!
//! The HR spreadsheet as seen by the chatbot: a read-only [`table::Table`] snapshot,
//! the [`DataSource`]s that produce it, and the [`DatasetCache`] that refreshes it
//! on a timer.

pub mod cache;
pub mod source;
pub mod table;

pub use cache::DatasetCache;
pub use source::{source_for, DataSource};
