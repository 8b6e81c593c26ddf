//! Domain models and types for Waypoint.
//!
//! The domain layer provides:
//! - **Record views** ([`User`], [`Package`], [`Quote`], [`Event`]) over the
//!   documents owned by the back-office application
//! - **Identifiers** ([`RecordId`])
//! - **Error types** ([`WaypointError`], [`StoreError`], [`MailError`], [`ApiError`])
//! - **Result type alias** ([`Result`])

pub mod errors;
pub mod ids;
pub mod records;
pub mod result;

pub use errors::{ApiError, MailError, StoreError, WaypointError};
pub use ids::RecordId;
pub use records::{ContractSignature, ContractTemplate, Event, Package, Quote, User};
pub use result::Result;
