//! Store of record - connection pool, schema bootstrap and repositories
//!
//! # Design Principles
//!
//! - Connection pool with an explicit limit - no Arc<Mutex<Connection>>
//! - List and eager reads use JOINs plus array aggregation - no N+1 queries
//! - Multi-statement writes (entry + tag links) run in a transaction

pub mod pool;
pub mod repos;
pub mod schema;

pub use pool::{create_pool, create_pool_with_options};
pub use repos::*;
