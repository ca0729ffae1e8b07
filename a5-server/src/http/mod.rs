//! HTTP layer
//!
//! Axum server with:
//! - Blog and entry resources under `/api`
//! - Alert and pagination response headers
//! - JSON error responses

pub mod error;
pub mod extractors;
pub mod headers;
pub mod mirror;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use extractors::CurrentUser;
pub use server::{build_router, run_server, AppState, ServerConfig, ServerError, DEFAULT_USER_HEADER};
