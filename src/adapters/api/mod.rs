//! Back-office REST API access

pub mod client;

pub use client::{parse_body, ApiClient, ApiResponse};
