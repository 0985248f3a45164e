//! Component lifecycle adapter for model-exchange style simulation units.
//!
//! Provides:
//! - Native ABI boundary (status codes, raw event record, image/instance traits)
//! - Canonical `EventInfo` record
//! - Process-wide image registry with per-path reference counting
//! - Backend families (shared image vs isolated image)
//! - `ComponentAdapter`: load/initialize/step/event/terminate/unload cycle with
//!   typed value access over classified reference subsets
//! - Declarative component plans (YAML/JSON)

pub mod adapter;
pub mod backend;
pub mod error;
pub mod event;
pub mod lifecycle;
pub mod native;
pub mod plan;
pub mod registry;

pub use adapter::{ComponentAdapter, Connection};
pub use backend::{Backend, IsolatedBackend, SharedImageBackend};
pub use error::{AdapterError, AdapterResult};
pub use event::EventInfo;
pub use lifecycle::LifecycleState;
pub use native::{NativeImage, NativeInstance, NativeKind, NativeLoader, RawEventInfo, Status};
pub use plan::{
    BackendKind, ComponentPlan, PlanError, PlanResult, load_plan_json, load_plan_yaml,
    save_plan_yaml,
};
pub use registry::ImageRegistry;
