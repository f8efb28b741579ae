//! Shared types for the storefront backend
//!
//! Common types used across the server and its clients: order models,
//! request/response payloads, the API response envelope, and utility types.

pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
