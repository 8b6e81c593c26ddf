//! Document store abstraction layer
//!
//! Trait-based access to the application's collections, with a MongoDB
//! implementation for real runs and an in-memory one for tests.

pub mod document;
pub mod factory;
pub mod memory;
pub mod query;
pub mod traits;

pub use factory::connect_store;
pub use memory::MemoryStore;
pub use query::{Filter, Update, UpdateOutcome};
pub use traits::DocumentStore;
