//! fb-builtin: in-process models behind the native component traits.
//!
//! Provides:
//! - `BouncingBall`: two states, one state event, parameters of every kind
//! - `Clock`: time events only
//! - `CatalogLoader`: resolves a path's file stem to one of the above
//!
//! These stand in for compiled model binaries in tests and the CLI.

pub mod bouncing_ball;
pub mod catalog;
pub mod clock;

pub use bouncing_ball::BouncingBall;
pub use catalog::{BuiltinImage, CatalogLoader};
pub use clock::Clock;
