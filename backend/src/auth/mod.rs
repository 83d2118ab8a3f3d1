//! Bearer-token authentication
//!
//! Login itself happens outside this service; tokens are minted for an
//! existing user with `lexdesk-backend issue-token <user-id>`.

pub mod jwt;
pub mod middleware;

pub use middleware::AuthUser;
