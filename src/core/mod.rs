//! Maintenance operations for Waypoint.
//!
//! Each operation reads or repairs one aspect of the back-office data and
//! returns a report that implements `Display`.
//!
//! # Modules
//!
//! - [`session`] - Connect, operate, close lifecycle around a document store
//! - [`env_check`] - Recognised environment variables
//! - [`diagnostics`] - Collection listing with counts
//! - [`packages`] - Package inspection
//! - [`users`] - User listing and approval repairs
//! - [`records`] - Field-level patches by id
//! - [`quotes`] - Quote enrichment with active events
//! - [`contracts`] - Contract save probe
//! - [`mail`] - Mail transport checks and notification resends
//! - [`api_probe`] - REST endpoint probe
//!
//! # Example
//!
//! ```rust,no_run
//! use waypoint::config::load_config;
//! use waypoint::core::session::MaintenanceSession;
//! use waypoint::core::users::approve_admins;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("waypoint.toml")?;
//! let session = MaintenanceSession::open(&config.database).await?;
//! let users = config.database.collections.users.clone();
//! let role = config.targets.admin_role.clone();
//!
//! let report = session
//!     .run(|store| async move { approve_admins(store.as_ref(), &users, &role, false).await })
//!     .await?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod api_probe;
pub mod contracts;
pub mod diagnostics;
pub mod env_check;
pub mod mail;
pub mod packages;
pub mod quotes;
pub mod records;
pub mod session;
pub mod users;
