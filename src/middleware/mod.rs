pub mod auth;
pub mod client;
pub mod rate_limit;
pub mod response;

pub use auth::{authorize, Access, AdminUser, AuthUser, Viewer};
pub use client::ClientInfo;
pub use rate_limit::{rate_limit_middleware, RateLimiter};
pub use response::{ApiResponse, ApiResult};
