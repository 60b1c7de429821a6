// Authentication module
// Manages the login/refresh token lifecycle

mod endpoints;
pub mod expiry;
mod manager;
mod types;

pub use endpoints::{LOGIN_PATH, REFRESH_PATH};
pub use manager::{TokenManager, DEFAULT_DOMAIN};
pub use types::{Credentials, Session};
