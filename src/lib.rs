// Penta Client - Library root

pub mod auth;
pub mod config;
pub mod error;
pub mod http_client;

pub use auth::{Credentials, Session, TokenManager};
pub use error::{Error, Result};
pub use http_client::RequestOptions;
