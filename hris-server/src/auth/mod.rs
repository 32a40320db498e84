//! Request authentication
//!
//! - [`JwtService`] - HS256 token validation
//! - [`CurrentUser`] - per-request user context (`userId`, `companyId`, `role`)

pub mod extractor;
pub mod jwt;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
