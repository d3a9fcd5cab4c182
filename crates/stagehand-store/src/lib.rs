//! Entity persistence behind the population engine.
//!
//! The engine fabricates [`Entity`] values and hands them to an
//! [`EntityStore`] for id assignment. The in-memory implementation backs
//! tests and dry runs; a CMS-backed store would implement the same trait.

mod entity;
mod error;
mod store;

pub use entity::{Entity, SavedEntity};
pub use error::StoreError;
pub use store::{EntityStore, MemoryStore};
