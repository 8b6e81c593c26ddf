//! MongoDB integration
//!
//! The back-office application stores its records in MongoDB; this is the
//! production [`crate::adapters::store::DocumentStore`].

pub mod client;
pub mod convert;

pub use client::MongoStore;
