//! Authentication and Authorization Module
//!
//! JWT token validation, auth middleware, and the CurrentUser extractor.
//! Identity itself is owned by the external session provider; this
//! module only trusts its tokens.

mod auth_middleware;
mod extractor;
mod jwt;

pub use auth_middleware::{require_admin, require_auth};
pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
