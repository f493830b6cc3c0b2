pub mod auth;
pub mod rate_limit;

pub use auth::ApiKeyAuth;
pub use rate_limit::RateLimiter;

/// Header carrying the caller's API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Paths served without auth or rate limiting
pub(crate) fn is_public_path(path: &str) -> bool {
    matches!(path, "/" | "/health" | "/metrics")
}
