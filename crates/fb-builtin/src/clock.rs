//! Periodic clock driven purely by time events.

use fb_component::{NativeInstance, RawEventInfo, Status};
use fb_core::{Tolerances, ensure_positive, nearly_equal};
use fb_description::{
    Causality, DeclaredType, DefaultExperiment, ModelDescription, Variability, VariableDescription,
};
use fb_values::ValueRef;
use tracing::debug;

pub const MODEL_IDENTIFIER: &str = "clock";
pub const GUID: &str = "{5d0f4c3e-91b2-4c71-a0de-2f8a3b6c1d77}";

pub const VR_PERIOD: ValueRef = 0;
pub const VR_LAST_TICK: ValueRef = 1;
pub const VR_TICKS: ValueRef = 0;
/// Stop after this many ticks; zero runs forever.
pub const VR_MAX_TICKS: ValueRef = 1;

pub fn description() -> ModelDescription {
    let variables = vec![
        VariableDescription::new("period", VR_PERIOD, DeclaredType::Real)
            .with_variability(Variability::Parameter)
            .with_start(0.25),
        VariableDescription::new("last_tick", VR_LAST_TICK, DeclaredType::Real)
            .with_causality(Causality::Output)
            .with_variability(Variability::Discrete),
        VariableDescription::new("ticks", VR_TICKS, DeclaredType::Integer)
            .with_causality(Causality::Output)
            .with_variability(Variability::Discrete)
            .with_start(0),
        VariableDescription::new("max_ticks", VR_MAX_TICKS, DeclaredType::Integer)
            .with_variability(Variability::Parameter)
            .with_start(0),
    ];

    ModelDescription {
        model_name: "Clock".into(),
        model_identifier: MODEL_IDENTIFIER.into(),
        guid: GUID.into(),
        number_of_continuous_states: 0,
        number_of_event_indicators: 0,
        default_experiment: Some(DefaultExperiment {
            start_time: 0.0,
            stop_time: 1.0,
            tolerance: None,
        }),
        variables,
    }
}

#[derive(Debug, Clone)]
pub struct Clock {
    name: String,
    logging: bool,
    period: f64,
    last_tick: f64,
    ticks: i32,
    max_ticks: i32,
    next_tick: f64,
    time: f64,
}

impl Clock {
    pub fn new(name: &str, logging: bool) -> Self {
        Self {
            name: name.to_string(),
            logging,
            period: 0.25,
            last_tick: 0.0,
            ticks: 0,
            max_ticks: 0,
            next_tick: 0.0,
            time: 0.0,
        }
    }

    fn tick_due(&self) -> bool {
        self.time > self.next_tick || nearly_equal(self.time, self.next_tick, Tolerances::default())
    }

    fn schedule(&self, event_info: &mut RawEventInfo) {
        let exhausted = self.max_ticks > 0 && self.ticks >= self.max_ticks;
        event_info.iteration_converged = 1;
        event_info.state_value_references_changed = 0;
        event_info.state_values_changed = 0;
        event_info.terminate_simulation = u8::from(exhausted);
        event_info.upcoming_time_event = u8::from(!exhausted);
        event_info.next_event_time = self.next_tick;
    }
}

impl NativeInstance for Clock {
    fn set_time(&mut self, time: f64) -> Status {
        self.time = time;
        Status::Ok
    }

    fn get_real(&self, refs: &[ValueRef], out: &mut [f64]) -> Status {
        for (slot, &vr) in out.iter_mut().zip(refs) {
            *slot = match vr {
                VR_PERIOD => self.period,
                VR_LAST_TICK => self.last_tick,
                _ => return Status::Error,
            };
        }
        Status::Ok
    }

    fn get_integer(&self, refs: &[ValueRef], out: &mut [i32]) -> Status {
        for (slot, &vr) in out.iter_mut().zip(refs) {
            *slot = match vr {
                VR_TICKS => self.ticks,
                VR_MAX_TICKS => self.max_ticks,
                _ => return Status::Error,
            };
        }
        Status::Ok
    }

    fn get_boolean(&self, refs: &[ValueRef], _out: &mut [bool]) -> Status {
        if refs.is_empty() { Status::Ok } else { Status::Error }
    }

    fn get_string(&self, refs: &[ValueRef], _out: &mut [String]) -> Status {
        if refs.is_empty() { Status::Ok } else { Status::Error }
    }

    fn set_real(&mut self, refs: &[ValueRef], values: &[f64]) -> Status {
        for (&vr, &value) in refs.iter().zip(values) {
            match vr {
                VR_PERIOD => self.period = value,
                VR_LAST_TICK => self.last_tick = value,
                _ => return Status::Error,
            }
        }
        Status::Ok
    }

    fn set_integer(&mut self, refs: &[ValueRef], values: &[i32]) -> Status {
        for (&vr, &value) in refs.iter().zip(values) {
            match vr {
                VR_TICKS => self.ticks = value,
                VR_MAX_TICKS => self.max_ticks = value,
                _ => return Status::Error,
            }
        }
        Status::Ok
    }

    fn set_boolean(&mut self, refs: &[ValueRef], _values: &[bool]) -> Status {
        if refs.is_empty() { Status::Ok } else { Status::Error }
    }

    fn set_string(&mut self, refs: &[ValueRef], _values: &[String]) -> Status {
        if refs.is_empty() { Status::Ok } else { Status::Error }
    }

    fn get_continuous_states(&self, out: &mut [f64]) -> Status {
        if out.is_empty() { Status::Ok } else { Status::Error }
    }

    fn set_continuous_states(&mut self, states: &[f64]) -> Status {
        if states.is_empty() { Status::Ok } else { Status::Error }
    }

    fn get_derivatives(&mut self, out: &mut [f64]) -> Status {
        if out.is_empty() { Status::Ok } else { Status::Error }
    }

    fn get_event_indicators(&mut self, out: &mut [f64]) -> Status {
        if out.is_empty() { Status::Ok } else { Status::Error }
    }

    fn initialize(
        &mut self,
        _tolerance_controlled: bool,
        _relative_tolerance: f64,
        event_info: &mut RawEventInfo,
    ) -> Status {
        if ensure_positive(self.period, "period").is_err() {
            return Status::Error;
        }
        self.next_tick = self.time + self.period;
        self.schedule(event_info);
        Status::Ok
    }

    fn completed_integrator_step(&mut self, call_event_update: &mut bool) -> Status {
        *call_event_update = false;
        Status::Ok
    }

    fn event_update(&mut self, _intermediate_results: bool, event_info: &mut RawEventInfo) -> Status {
        if self.tick_due() {
            self.ticks += 1;
            self.last_tick = self.time;
            self.next_tick += self.period;
            if self.logging {
                debug!(instance = %self.name, time = self.time, ticks = self.ticks, "tick");
            }
        }
        self.schedule(event_info);
        Status::Ok
    }

    fn terminate(&mut self) -> Status {
        Status::Ok
    }
}
