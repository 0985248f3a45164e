//! fb-core: stable foundation for fmibridge.
//!
//! Contains:
//! - numeric (Real + tolerance helpers + finiteness checks)
//! - ids (compact component identifiers + process-wide allocator)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{FbError, FbResult};
pub use ids::*;
pub use numeric::*;
