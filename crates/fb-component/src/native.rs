//! Native component ABI boundary.
//!
//! These traits describe what the adapter needs from a loaded model binary.
//! Resolving symbols from a shared library, unpacking archives and parsing
//! the XML model description all happen behind [`NativeLoader`]; the adapter
//! only ever sees the resulting image and its instances.

use core::fmt;
use std::path::Path;
use std::sync::Arc;

use fb_description::ModelDescription;
use fb_values::{Boolean, Integer, Kind, Real, Text, ValueRef};

/// Status code returned by every native call, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Ok,
    Warning,
    Discard,
    Error,
    Fatal,
}

impl Status {
    /// Anything worse than a warning is a failure.
    pub fn is_failure(self) -> bool {
        self > Status::Warning
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Ok => "ok",
            Status::Warning => "warning",
            Status::Discard => "discard",
            Status::Error => "error",
            Status::Fatal => "fatal",
        };
        f.write_str(s)
    }
}

/// Event record in the native layout (`fmiEventInfo`).
///
/// Flags are `fmiBoolean` bytes; any non-zero value is true.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawEventInfo {
    pub iteration_converged: u8,
    pub state_value_references_changed: u8,
    pub state_values_changed: u8,
    pub terminate_simulation: u8,
    pub upcoming_time_event: u8,
    pub next_event_time: f64,
}

/// One instantiated model. Freeing the instance is dropping it.
///
/// Instances are not safe for concurrent invocation; callers serialize all
/// calls against one instance.
pub trait NativeInstance: Send {
    fn set_time(&mut self, time: f64) -> Status;

    fn get_real(&self, refs: &[ValueRef], out: &mut [f64]) -> Status;
    fn get_integer(&self, refs: &[ValueRef], out: &mut [i32]) -> Status;
    fn get_boolean(&self, refs: &[ValueRef], out: &mut [bool]) -> Status;
    fn get_string(&self, refs: &[ValueRef], out: &mut [String]) -> Status;

    fn set_real(&mut self, refs: &[ValueRef], values: &[f64]) -> Status;
    fn set_integer(&mut self, refs: &[ValueRef], values: &[i32]) -> Status;
    fn set_boolean(&mut self, refs: &[ValueRef], values: &[bool]) -> Status;
    fn set_string(&mut self, refs: &[ValueRef], values: &[String]) -> Status;

    fn get_continuous_states(&self, out: &mut [f64]) -> Status;
    fn set_continuous_states(&mut self, states: &[f64]) -> Status;
    fn get_derivatives(&mut self, out: &mut [f64]) -> Status;
    fn get_event_indicators(&mut self, out: &mut [f64]) -> Status;

    fn initialize(
        &mut self,
        tolerance_controlled: bool,
        relative_tolerance: f64,
        event_info: &mut RawEventInfo,
    ) -> Status;

    /// `call_event_update` is set when the model requests an event check.
    fn completed_integrator_step(&mut self, call_event_update: &mut bool) -> Status;

    fn event_update(&mut self, intermediate_results: bool, event_info: &mut RawEventInfo)
    -> Status;

    fn terminate(&mut self) -> Status;
}

/// A loaded model binary, shareable across adapters.
pub trait NativeImage: Send + Sync {
    fn model_description(&self) -> &ModelDescription;

    /// Create a fresh instance, `None` if the model refuses.
    fn instantiate(
        &self,
        instance_name: &str,
        guid: &str,
        logging_on: bool,
    ) -> Option<Box<dyn NativeInstance>>;
}

/// Binds a resolved path to a loaded image.
pub trait NativeLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Arc<dyn NativeImage>, String>;
}

/// Per-kind dispatch onto the typed native getters and setters.
pub trait NativeKind: Kind {
    const GET_OP: &'static str;
    const SET_OP: &'static str;

    fn native_get(instance: &dyn NativeInstance, refs: &[ValueRef], out: &mut [Self::Value])
    -> Status;

    fn native_set(
        instance: &mut dyn NativeInstance,
        refs: &[ValueRef],
        values: &[Self::Value],
    ) -> Status;
}

impl NativeKind for Real {
    const GET_OP: &'static str = "get_real";
    const SET_OP: &'static str = "set_real";

    fn native_get(instance: &dyn NativeInstance, refs: &[ValueRef], out: &mut [f64]) -> Status {
        instance.get_real(refs, out)
    }
    fn native_set(instance: &mut dyn NativeInstance, refs: &[ValueRef], values: &[f64]) -> Status {
        instance.set_real(refs, values)
    }
}

impl NativeKind for Integer {
    const GET_OP: &'static str = "get_integer";
    const SET_OP: &'static str = "set_integer";

    fn native_get(instance: &dyn NativeInstance, refs: &[ValueRef], out: &mut [i32]) -> Status {
        instance.get_integer(refs, out)
    }
    fn native_set(instance: &mut dyn NativeInstance, refs: &[ValueRef], values: &[i32]) -> Status {
        instance.set_integer(refs, values)
    }
}

impl NativeKind for Boolean {
    const GET_OP: &'static str = "get_boolean";
    const SET_OP: &'static str = "set_boolean";

    fn native_get(instance: &dyn NativeInstance, refs: &[ValueRef], out: &mut [bool]) -> Status {
        instance.get_boolean(refs, out)
    }
    fn native_set(instance: &mut dyn NativeInstance, refs: &[ValueRef], values: &[bool]) -> Status {
        instance.set_boolean(refs, values)
    }
}

impl NativeKind for Text {
    const GET_OP: &'static str = "get_string";
    const SET_OP: &'static str = "set_string";

    fn native_get(instance: &dyn NativeInstance, refs: &[ValueRef], out: &mut [String]) -> Status {
        instance.get_string(refs, out)
    }
    fn native_set(
        instance: &mut dyn NativeInstance,
        refs: &[ValueRef],
        values: &[String],
    ) -> Status {
        instance.set_string(refs, values)
    }
}
