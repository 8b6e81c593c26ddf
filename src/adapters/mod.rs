//! External system integrations for Waypoint.
//!
//! - [`store`] - Document store abstraction (trait-based) and in-memory store
//! - [`mongodb`] - MongoDB implementation of the store
//! - [`mail`] - Outbound mail transport (SMTP)
//! - [`api`] - HTTP client for the back-office REST API
//!
//! # Design Pattern
//!
//! Adapters isolate third-party drivers behind small traits so maintenance
//! operations can be exercised against in-memory implementations.
//!
//! ```rust,no_run
//! use waypoint::adapters::store::{connect_store, Filter};
//! use waypoint::config::DatabaseConfig;
//!
//! # async fn example(config: DatabaseConfig) -> waypoint::domain::Result<()> {
//! let store = connect_store(&config).await?;
//! store.ping().await?;
//! let admins = store.count("users", &Filter::eq("role", "admin")).await?;
//! println!("{admins} admins");
//! store.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod mail;
pub mod mongodb;
pub mod store;
