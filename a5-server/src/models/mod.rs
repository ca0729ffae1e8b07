//! Domain models with validation
//!
//! Request bodies deserialize straight into these types; `validate()` is
//! called by the resource layer before anything is written.

pub mod blog;
pub mod entry;
pub mod pagination;
pub mod validation;

pub use blog::{Blog, UserRef};
pub use entry::{BlogRef, Entry, TagRef};
pub use pagination::{Page, Pageable, PageableParams};
pub use validation::ValidationError;
