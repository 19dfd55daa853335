//! Route paths.

pub const GET_API_HEALTH: &str = "/api/health";
pub const POST_AUTH_LOGIN: &str = "/api/auth/login";
pub const GET_AUTH_ME: &str = "/api/auth/me";
pub const POST_WEBHOOKS_SOURCE: &str = "/api/webhooks/{source}";
