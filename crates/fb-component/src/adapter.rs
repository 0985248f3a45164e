//! Component lifecycle adapter.
//!
//! Binds the typed value stores and reference classification to one native
//! component instance, enforces lifecycle preconditions and translates native
//! status codes into [`AdapterError`]s.

use core::fmt;
use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fb_core::{ComponentId, next_component_id};
use fb_description::{Classification, ModelDescription, ReferenceSubset};
use fb_values::{Boolean, Integer, Real, ReferenceStore, Text, ValueRef, ValueStore};
use tracing::{debug, trace, warn};

use crate::backend::{self, Backend};
use crate::error::{AdapterError, AdapterResult};
use crate::event::EventInfo;
use crate::lifecycle::LifecycleState;
use crate::native::{NativeImage, NativeInstance, NativeKind, NativeLoader, RawEventInfo, Status};
use crate::plan::{BackendKind, ComponentPlan};
use crate::registry::ImageRegistry;

/// Connection to another component, owned and interpreted by the orchestrator.
pub type Connection = Arc<dyn Any + Send + Sync>;

fn check_status(operation: &'static str, status: Status) -> AdapterResult<()> {
    if status.is_failure() {
        return Err(AdapterError::NativeCall { operation, status });
    }
    if status == Status::Warning {
        warn!(operation, "native call returned a warning");
    }
    Ok(())
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> AdapterResult<()> {
    if expected != actual {
        return Err(AdapterError::BufferLength {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

/// One simulation component behind a uniform, typed interface.
///
/// All calls against one adapter must be serialized by the caller; the
/// adapter is `Send` but deliberately not `Sync`.
pub struct ComponentAdapter {
    id: ComponentId,
    local_id: usize,
    shared_id: usize,
    name: String,
    path: PathBuf,
    resolved_path: Option<PathBuf>,
    working_directory: Option<PathBuf>,
    relative_tolerance: f64,
    tolerance_controlled: bool,
    logging_enabled: bool,
    intermediate_results: bool,
    state: LifecycleState,
    time: f64,
    classification: Classification,
    start_values: ValueStore,
    event_info: EventInfo,
    raw_event_info: RawEventInfo,
    num_states: usize,
    num_event_indicators: usize,
    connections: Vec<Connection>,
    backend: Box<dyn Backend>,
    image: Option<Arc<dyn NativeImage>>,
    instance: Option<Box<dyn NativeInstance>>,
}

impl ComponentAdapter {
    /// Create an unloaded adapter that shares images through the process-wide registry.
    pub fn new(plan: ComponentPlan, loader: Arc<dyn NativeLoader>) -> AdapterResult<Self> {
        Self::with_registry(plan, loader, ImageRegistry::global())
    }

    /// Create an unloaded adapter bound to a specific image registry.
    pub fn with_registry(
        plan: ComponentPlan,
        loader: Arc<dyn NativeLoader>,
        registry: Arc<ImageRegistry>,
    ) -> AdapterResult<Self> {
        plan.validate()?;
        let backend = backend::for_kind(plan.backend, loader, registry);
        Self::from_parts(plan, backend)
    }

    fn from_parts(plan: ComponentPlan, backend: Box<dyn Backend>) -> AdapterResult<Self> {
        Ok(Self {
            id: next_component_id()?,
            local_id: 0,
            shared_id: 0,
            name: plan.name,
            path: plan.path,
            resolved_path: None,
            working_directory: plan.working_directory,
            relative_tolerance: plan.relative_tolerance,
            tolerance_controlled: plan.tolerance_controlled,
            logging_enabled: plan.logging_enabled,
            intermediate_results: plan.intermediate_results,
            state: LifecycleState::Unloaded,
            time: 0.0,
            classification: Classification::default(),
            start_values: ValueStore::default(),
            event_info: EventInfo::default(),
            raw_event_info: RawEventInfo::default(),
            num_states: 0,
            num_event_indicators: 0,
            connections: Vec::new(),
            backend,
            image: None,
            instance: None,
        })
    }

    /// Current settings as a plan, e.g. to construct a sibling adapter.
    pub fn plan(&self) -> ComponentPlan {
        ComponentPlan {
            name: self.name.clone(),
            path: self.path.clone(),
            relative_tolerance: self.relative_tolerance,
            tolerance_controlled: self.tolerance_controlled,
            logging_enabled: self.logging_enabled,
            intermediate_results: self.intermediate_results,
            working_directory: self.working_directory.clone(),
            backend: self.backend.kind(),
        }
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Bind to the native image, classify references and apply start values.
    ///
    /// With `also_init` the component is initialized right away. Binding and
    /// classification failures leave the adapter unloaded; start value and
    /// initialization failures leave it loaded.
    pub fn load(&mut self, also_init: bool) -> AdapterResult<()> {
        if self.state.is_loaded() {
            return Err(AdapterError::InvalidState {
                operation: "load",
                state: self.state,
            });
        }

        let resolved = std::path::absolute(&self.path).map_err(|e| AdapterError::Load {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        debug!(name = %self.name, path = %resolved.display(), "loading component");

        let image = self.backend.acquire(&resolved)?;
        if let Err(err) = self.bind(image, &resolved) {
            self.backend.release(&resolved);
            return Err(err);
        }
        self.resolved_path = Some(resolved);
        self.state = LifecycleState::Loaded;

        self.apply_start_values()?;
        if also_init {
            self.initialize()?;
        }
        Ok(())
    }

    fn bind(&mut self, image: Arc<dyn NativeImage>, resolved: &Path) -> AdapterResult<()> {
        let description = image.model_description();
        let classification = Classification::classify(&description.variables)?;
        let instance = image
            .instantiate(&self.name, &description.guid, self.logging_enabled)
            .ok_or_else(|| AdapterError::Load {
                path: resolved.to_path_buf(),
                reason: format!("instantiation of '{}' failed", description.model_identifier),
            })?;

        self.num_states = description.number_of_continuous_states;
        self.num_event_indicators = description.number_of_event_indicators;
        self.start_values = classification.start_values().clone();
        self.classification = classification;
        self.event_info = EventInfo::default();
        self.raw_event_info = RawEventInfo::default();
        self.instance = Some(instance);
        self.image = Some(image);
        Ok(())
    }

    fn apply_start_values(&mut self) -> AdapterResult<()> {
        let refs = self.classification.subset(ReferenceSubset::Start).clone();
        let values = self.start_values.clone();
        self.set_store(&refs, &values)
    }

    /// Run the native initialization with the tolerance policy.
    pub fn initialize(&mut self) -> AdapterResult<()> {
        const OP: &str = "initialize";
        if self.state != LifecycleState::Loaded {
            return Err(AdapterError::InvalidState {
                operation: OP,
                state: self.state,
            });
        }

        let controlled = self.tolerance_controlled;
        let tolerance = self.relative_tolerance;
        let mut raw = self.raw_event_info;
        let status = self.native_mut(OP)?.initialize(controlled, tolerance, &mut raw);
        self.raw_event_info = raw;
        if status.is_failure() {
            return Err(AdapterError::Initialization { status });
        }
        if status == Status::Warning {
            warn!(name = %self.name, "initialization returned a warning");
        }

        self.event_info.assign(&raw);
        self.state = LifecycleState::Initialized;
        debug!(name = %self.name, "component initialized");
        Ok(())
    }

    /// Tell the component the simulation is over. Values stay readable until unload.
    pub fn terminate(&mut self) -> AdapterResult<()> {
        const OP: &str = "terminate";
        self.require(OP, self.state.is_running())?;
        let status = self.native_mut(OP)?.terminate();
        check_status(OP, status)?;
        self.state = LifecycleState::Terminated;
        Ok(())
    }

    /// Free the instance and release the image. Idempotent.
    pub fn unload(&mut self) {
        if !self.state.is_loaded() {
            return;
        }
        self.instance = None;
        self.image = None;
        if let Some(path) = self.resolved_path.take() {
            self.backend.release(&path);
        }
        self.state = LifecycleState::Unloaded;
        debug!(name = %self.name, "component unloaded");
    }

    /// A fresh, unloaded adapter with a new id and the same settings.
    ///
    /// Fails with `NotSupported` for backends that forbid multiple instances.
    pub fn duplicate(&self) -> AdapterResult<ComponentAdapter> {
        let backend = self.backend.duplicate()?;
        let mut copy = Self::from_parts(self.plan(), backend)?;
        copy.connections = self.connections.clone();
        Ok(copy)
    }

    // ---------------------------------------------------------------------
    // Native access helpers
    // ---------------------------------------------------------------------

    fn require(&self, operation: &'static str, allowed: bool) -> AdapterResult<()> {
        if allowed {
            Ok(())
        } else {
            Err(AdapterError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn native(&self, operation: &'static str) -> AdapterResult<&(dyn NativeInstance + 'static)> {
        match self.instance.as_deref() {
            Some(instance) => Ok(instance),
            None => Err(AdapterError::InvalidState {
                operation,
                state: self.state,
            }),
        }
    }

    fn native_mut(
        &mut self,
        operation: &'static str,
    ) -> AdapterResult<&mut (dyn NativeInstance + 'static)> {
        let state = self.state;
        match self.instance.as_deref_mut() {
            Some(instance) => Ok(instance),
            None => Err(AdapterError::InvalidState { operation, state }),
        }
    }

    // ---------------------------------------------------------------------
    // Typed values
    // ---------------------------------------------------------------------

    /// Read one kind's values for `refs` into `out` (same length).
    pub fn get_values<K: NativeKind>(
        &self,
        refs: &[ValueRef],
        out: &mut [K::Value],
    ) -> AdapterResult<()> {
        check_len(K::GET_OP, refs.len(), out.len())?;
        let instance = self.native(K::GET_OP)?;
        if refs.is_empty() {
            return Ok(());
        }
        check_status(K::GET_OP, K::native_get(instance, refs, out))
    }

    /// Write one kind's values for `refs` (same length).
    pub fn set_values<K: NativeKind>(
        &mut self,
        refs: &[ValueRef],
        values: &[K::Value],
    ) -> AdapterResult<()> {
        check_len(K::SET_OP, refs.len(), values.len())?;
        self.require(K::SET_OP, self.state.accepts_writes())?;
        let instance = self.native_mut(K::SET_OP)?;
        if refs.is_empty() {
            return Ok(());
        }
        check_status(K::SET_OP, K::native_set(instance, refs, values))
    }

    /// Read all four kinds for a reference store into an aligned value store.
    pub fn get_store(&self, refs: &ReferenceStore) -> AdapterResult<ValueStore> {
        let mut out = refs.zeroed_values();
        self.get_values::<Real>(refs.get::<Real>(), out.get_mut::<Real>())?;
        self.get_values::<Integer>(refs.get::<Integer>(), out.get_mut::<Integer>())?;
        self.get_values::<Boolean>(refs.get::<Boolean>(), out.get_mut::<Boolean>())?;
        self.get_values::<Text>(refs.get::<Text>(), out.get_mut::<Text>())?;
        Ok(out)
    }

    /// Write all four kinds of a value store aligned with `refs`.
    pub fn set_store(&mut self, refs: &ReferenceStore, values: &ValueStore) -> AdapterResult<()> {
        values.check_aligned(refs)?;
        self.set_values::<Real>(refs.get::<Real>(), values.get::<Real>())?;
        self.set_values::<Integer>(refs.get::<Integer>(), values.get::<Integer>())?;
        self.set_values::<Boolean>(refs.get::<Boolean>(), values.get::<Boolean>())?;
        self.set_values::<Text>(refs.get::<Text>(), values.get::<Text>())?;
        Ok(())
    }

    /// Current values of a named reference subset.
    pub fn values(&self, subset: ReferenceSubset) -> AdapterResult<ValueStore> {
        self.get_store(self.classification.subset(subset))
    }

    /// Write values aligned with a named reference subset.
    pub fn set_values_for(
        &mut self,
        subset: ReferenceSubset,
        values: &ValueStore,
    ) -> AdapterResult<()> {
        let refs = self.classification.subset(subset).clone();
        self.set_store(&refs, values)
    }

    // ---------------------------------------------------------------------
    // Continuous states, derivatives, event indicators
    // ---------------------------------------------------------------------

    pub fn read_states(&self, out: &mut [f64]) -> AdapterResult<()> {
        const OP: &str = "get_continuous_states";
        check_len(OP, self.num_states, out.len())?;
        let instance = self.native(OP)?;
        if out.is_empty() {
            return Ok(());
        }
        check_status(OP, instance.get_continuous_states(out))
    }

    pub fn get_states(&self) -> AdapterResult<Vec<f64>> {
        let mut states = vec![0.0; self.num_states];
        self.read_states(&mut states)?;
        Ok(states)
    }

    pub fn set_states(&mut self, states: &[f64]) -> AdapterResult<()> {
        const OP: &str = "set_continuous_states";
        check_len(OP, self.num_states, states.len())?;
        self.require(OP, self.state.accepts_writes())?;
        let instance = self.native_mut(OP)?;
        if !states.is_empty() {
            check_status(OP, instance.set_continuous_states(states))?;
        }
        self.state = self.state.after_continuous_call();
        Ok(())
    }

    pub fn read_state_derivatives(&mut self, out: &mut [f64]) -> AdapterResult<()> {
        const OP: &str = "get_derivatives";
        check_len(OP, self.num_states, out.len())?;
        // Evaluates the model, so a terminated instance refuses it.
        self.require(OP, self.state.accepts_writes())?;
        let instance = self.native_mut(OP)?;
        if out.is_empty() {
            return Ok(());
        }
        check_status(OP, instance.get_derivatives(out))
    }

    pub fn get_state_derivatives(&mut self) -> AdapterResult<Vec<f64>> {
        let mut derivatives = vec![0.0; self.num_states];
        self.read_state_derivatives(&mut derivatives)?;
        Ok(derivatives)
    }

    pub fn read_event_indicators(&mut self, out: &mut [f64]) -> AdapterResult<()> {
        const OP: &str = "get_event_indicators";
        check_len(OP, self.num_event_indicators, out.len())?;
        // Evaluates the model, so a terminated instance refuses it.
        self.require(OP, self.state.accepts_writes())?;
        let instance = self.native_mut(OP)?;
        if out.is_empty() {
            return Ok(());
        }
        check_status(OP, instance.get_event_indicators(out))
    }

    pub fn get_event_indicators(&mut self) -> AdapterResult<Vec<f64>> {
        let mut indicators = vec![0.0; self.num_event_indicators];
        self.read_event_indicators(&mut indicators)?;
        Ok(indicators)
    }

    // ---------------------------------------------------------------------
    // Time, steps and events
    // ---------------------------------------------------------------------

    /// Update local time, then forward it to the component.
    pub fn set_time(&mut self, time: f64) -> AdapterResult<()> {
        const OP: &str = "set_time";
        self.require(OP, self.state.accepts_writes())?;
        self.time = time;
        let status = self.native_mut(OP)?.set_time(time);
        check_status(OP, status)?;
        self.state = self.state.after_continuous_call();
        Ok(())
    }

    /// Report a finished integrator step; returns whether the component
    /// asks for an event update.
    pub fn step_completed(&mut self) -> AdapterResult<bool> {
        const OP: &str = "completed_integrator_step";
        self.require(OP, self.state.is_running())?;
        let mut call_event_update = false;
        let status = self.native_mut(OP)?.completed_integrator_step(&mut call_event_update);
        check_status(OP, status)?;
        self.state = self.state.after_continuous_call();
        trace!(name = %self.name, time = self.time, call_event_update, "step completed");
        Ok(call_event_update)
    }

    /// Run the native event iteration and return the refreshed event record.
    ///
    /// A requested termination is only reported, never acted upon.
    pub fn event_update(&mut self) -> AdapterResult<EventInfo> {
        const OP: &str = "event_update";
        self.require(OP, self.state.is_running())?;
        let intermediate = self.intermediate_results;
        let mut raw = self.raw_event_info;
        let status = self.native_mut(OP)?.event_update(intermediate, &mut raw);
        self.raw_event_info = raw;
        check_status(OP, status)?;

        self.event_info.assign(&raw);
        self.state = LifecycleState::EventHandling;
        if self.event_info.terminate_simulation {
            debug!(name = %self.name, time = self.time, "component requested termination");
        }
        trace!(name = %self.name, time = self.time, info = ?self.event_info, "event update");
        Ok(self.event_info)
    }

    // ---------------------------------------------------------------------
    // Model description queries
    // ---------------------------------------------------------------------

    pub fn model_description(&self) -> Option<&ModelDescription> {
        self.image.as_deref().map(|image| image.model_description())
    }

    pub fn default_start(&self) -> AdapterResult<f64> {
        self.model_description()
            .map(ModelDescription::default_start)
            .ok_or(AdapterError::InvalidState {
                operation: "default_start",
                state: self.state,
            })
    }

    pub fn default_stop(&self) -> AdapterResult<f64> {
        self.model_description()
            .map(ModelDescription::default_stop)
            .ok_or(AdapterError::InvalidState {
                operation: "default_stop",
                state: self.state,
            })
    }

    // ---------------------------------------------------------------------
    // Plain accessors
    // ---------------------------------------------------------------------

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn local_id(&self) -> usize {
        self.local_id
    }

    pub fn set_local_id(&mut self, local_id: usize) {
        self.local_id = local_id;
    }

    pub fn shared_id(&self) -> usize {
        self.shared_id
    }

    pub fn set_shared_id(&mut self, shared_id: usize) {
        self.shared_id = shared_id;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path as given in the plan.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute path the image was bound under, while loaded.
    pub fn resolved_path(&self) -> Option<&Path> {
        self.resolved_path.as_deref()
    }

    pub fn working_directory(&self) -> Option<&Path> {
        self.working_directory.as_deref()
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn relative_tolerance(&self) -> f64 {
        self.relative_tolerance
    }

    /// Takes effect at the next initialization.
    pub fn set_relative_tolerance(&mut self, relative_tolerance: f64) {
        self.relative_tolerance = relative_tolerance;
    }

    pub fn is_tolerance_controlled(&self) -> bool {
        self.tolerance_controlled
    }

    pub fn is_logging_enabled(&self) -> bool {
        self.logging_enabled
    }

    /// Takes effect at the next instantiation.
    pub fn set_logging_enabled(&mut self, logging_enabled: bool) {
        self.logging_enabled = logging_enabled;
    }

    pub fn has_intermediate_results(&self) -> bool {
        self.intermediate_results
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn num_event_indicators(&self) -> usize {
        self.num_event_indicators
    }

    pub fn num_inputs(&self) -> usize {
        self.classification.subset(ReferenceSubset::Input).size()
    }

    pub fn num_outputs(&self) -> usize {
        self.classification.subset(ReferenceSubset::Output).size()
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    pub fn reference_subset(&self, subset: ReferenceSubset) -> &ReferenceStore {
        self.classification.subset(subset)
    }

    /// Start values aligned with the START subset.
    pub fn start_values(&self) -> &ValueStore {
        &self.start_values
    }

    /// Event record from the last initialization or event update.
    pub fn event_info(&self) -> &EventInfo {
        &self.event_info
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connections_mut(&mut self) -> &mut Vec<Connection> {
        &mut self.connections
    }

    pub fn set_connections(&mut self, connections: Vec<Connection>) {
        self.connections = connections;
    }
}

impl Drop for ComponentAdapter {
    fn drop(&mut self) {
        self.unload();
    }
}

impl fmt::Debug for ComponentAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentAdapter")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("path", &self.path)
            .field("backend", &self.backend.kind())
            .field("state", &self.state)
            .field("time", &self.time)
            .field("num_states", &self.num_states)
            .field("num_event_indicators", &self.num_event_indicators)
            .finish_non_exhaustive()
    }
}
