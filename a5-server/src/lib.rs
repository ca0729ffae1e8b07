//! a5-server: blog backend with a mirrored full-text index
//!
//! Blogs and entries live in PostgreSQL (the store of record). Every write
//! is mirrored, after the store write succeeds, into a tantivy index that
//! serves the search endpoints. The two are not written atomically.

pub mod db;
pub mod http;
pub mod models;
pub mod reindex;
pub mod search;

#[cfg(test)]
mod testing;

pub use http::{build_router, run_server, AppState, ServerConfig};
