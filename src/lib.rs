// Waypoint - Travel back-office maintenance toolkit
// Copyright (c) 2025 Waypoint Contributors
// Licensed under the MIT License

//! # Waypoint - travel back-office maintenance toolkit
//!
//! Waypoint bundles the diagnostic and data-repair tasks an operator runs
//! against the back office of a travel agency: inspecting collections,
//! flipping approval flags, patching records, enriching quotes with events,
//! probing the contract write path, checking outbound mail and calling the
//! REST API.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface, one subcommand per task
//! - [`core`] - Maintenance operations and the session lifecycle
//! - [`adapters`] - MongoDB, in-memory store, SMTP and HTTP integrations
//! - [`domain`] - Record views, identifiers and errors
//! - [`config`] - TOML configuration with environment overrides
//! - [`logging`] - Structured logging
//!
//! ## Sessions
//!
//! Every database-backed task follows the same lifecycle: connect, run one
//! operation, print its report, close. The connection is released exactly
//! once whether the operation succeeds or fails.
//!
//! ```rust,no_run
//! use waypoint::config::load_config;
//! use waypoint::core::diagnostics::ping_database;
//! use waypoint::core::session::MaintenanceSession;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("waypoint.toml")?;
//!     let session = MaintenanceSession::open(&config.database).await?;
//!     let report = session
//!         .run(|store| async move { ping_database(store.as_ref()).await })
//!         .await?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```
//!
//! ## Testing against memory
//!
//! Operations only see `&dyn DocumentStore`, so they run unchanged against
//! [`adapters::store::MemoryStore`]:
//!
//! ```rust
//! use waypoint::adapters::store::MemoryStore;
//! use waypoint::core::users::approve_admins;
//! use serde_json::json;
//!
//! # tokio_test_block(async {
//! let store = MemoryStore::default();
//! store.seed("users", vec![json!({"_id": "u1", "role": "admin"})]).await;
//!
//! let report = approve_admins(&store, "users", "admin", false).await.unwrap();
//! assert_eq!(report.outcome.modified, 1);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`], whose error type is
//! [`domain::WaypointError`]. "Not found" outcomes are reports, not errors.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
