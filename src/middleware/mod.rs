pub mod auth;
pub mod rate_limit;
pub mod response;
pub mod tenant;

pub use auth::{authenticate, AuthPrincipal};
pub use rate_limit::{throttle, RateLimiter};
pub use response::{ApiResponse, ApiResult};
pub use tenant::bind_tenant;

/// Paths served without an authentication attempt.
const PUBLIC_PATHS: &[&str] = &[
    "/",
    "/health",
    "/api/v1/auth/login",
    "/api/v1/auth/refresh",
    "/api/v1/auth/forgot-password",
];

const PUBLIC_PREFIXES: &[&str] = &["/docs", "/swagger-ui", "/api-docs"];

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path) || PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// The tenant stage mirrors the public allow-list plus operational routes.
pub fn is_tenant_exempt(path: &str) -> bool {
    is_public_path(path) || path.starts_with("/ops")
}

/// Rate limiting always skips infrastructure, documentation and static
/// asset routes, independent of the global switch.
pub fn is_throttle_exempt(path: &str) -> bool {
    path == "/health"
        || path.starts_with("/assets")
        || PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p))
}
