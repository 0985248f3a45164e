//! Bouncing ball: two continuous states, one state event.
//!
//! Dynamics: dh/dt = v, dv/dt = -g + a_ext. When the height indicator
//! crosses zero while falling, the velocity is reflected and damped by the
//! restitution `e`. Once the rebound speed drops below `v_min` the ball rests.

use fb_component::{NativeInstance, RawEventInfo, Status};
use fb_description::{
    Causality, DeclaredType, DefaultExperiment, ModelDescription, Variability, VariableDescription,
};
use fb_values::ValueRef;
use tracing::debug;

pub const MODEL_IDENTIFIER: &str = "bouncing_ball";
pub const GUID: &str = "{8c4e810f-3df3-4a00-8276-176fa3c9f000}";

// Real value references.
pub const VR_H: ValueRef = 0;
pub const VR_DER_H: ValueRef = 1;
pub const VR_V: ValueRef = 2;
pub const VR_DER_V: ValueRef = 3;
pub const VR_G: ValueRef = 4;
pub const VR_E: ValueRef = 5;
pub const VR_V_MIN: ValueRef = 6;
pub const VR_A_EXT: ValueRef = 7;
// Integer, boolean and string value references.
pub const VR_BOUNCES: ValueRef = 0;
pub const VR_RESTING: ValueRef = 0;
pub const VR_LABEL: ValueRef = 0;

const NUM_REALS: usize = 8;

pub fn description() -> ModelDescription {
    let variables = vec![
        VariableDescription::new("h", VR_H, DeclaredType::Real)
            .with_causality(Causality::Output)
            .with_start(1.0),
        VariableDescription::new("der(h)", VR_DER_H, DeclaredType::Real),
        VariableDescription::new("v", VR_V, DeclaredType::Real)
            .with_causality(Causality::Output)
            .with_start(0.0),
        VariableDescription::new("der(v)", VR_DER_V, DeclaredType::Real),
        VariableDescription::new("g", VR_G, DeclaredType::Real)
            .with_variability(Variability::Parameter)
            .with_start(9.81),
        VariableDescription::new("e", VR_E, DeclaredType::Real)
            .with_variability(Variability::Parameter)
            .with_start(0.7),
        VariableDescription::new("v_min", VR_V_MIN, DeclaredType::Real)
            .with_variability(Variability::Constant)
            .with_start(0.1),
        VariableDescription::new("a_ext", VR_A_EXT, DeclaredType::Real)
            .with_causality(Causality::Input)
            .with_start(0.0),
        VariableDescription::new("bounces", VR_BOUNCES, DeclaredType::Integer)
            .with_causality(Causality::Output)
            .with_variability(Variability::Discrete)
            .with_start(0),
        VariableDescription::new("resting", VR_RESTING, DeclaredType::Boolean)
            .with_causality(Causality::Output)
            .with_variability(Variability::Discrete)
            .with_start(false),
        VariableDescription::new("label", VR_LABEL, DeclaredType::String)
            .with_variability(Variability::Parameter)
            .with_start("ball"),
    ];

    ModelDescription {
        model_name: "BouncingBall".into(),
        model_identifier: MODEL_IDENTIFIER.into(),
        guid: GUID.into(),
        number_of_continuous_states: 2,
        number_of_event_indicators: 1,
        default_experiment: Some(DefaultExperiment {
            start_time: 0.0,
            stop_time: 3.0,
            tolerance: Some(1e-6),
        }),
        variables,
    }
}

#[derive(Debug, Clone)]
pub struct BouncingBall {
    name: String,
    logging: bool,
    reals: [f64; NUM_REALS],
    bounces: i32,
    resting: bool,
    label: String,
    time: f64,
}

impl BouncingBall {
    pub fn new(name: &str, logging: bool) -> Self {
        let mut reals = [0.0; NUM_REALS];
        reals[VR_H as usize] = 1.0;
        reals[VR_G as usize] = 9.81;
        reals[VR_E as usize] = 0.7;
        reals[VR_V_MIN as usize] = 0.1;
        Self {
            name: name.to_string(),
            logging,
            reals,
            bounces: 0,
            resting: false,
            label: "ball".to_string(),
            time: 0.0,
        }
    }

    fn real(&self, vr: ValueRef) -> f64 {
        self.reals[vr as usize]
    }

    fn update_derivatives(&mut self) {
        let (der_h, der_v) = if self.resting {
            (0.0, 0.0)
        } else {
            (self.real(VR_V), -self.real(VR_G) + self.real(VR_A_EXT))
        };
        self.reals[VR_DER_H as usize] = der_h;
        self.reals[VR_DER_V as usize] = der_v;
    }
}

fn valid_real(vr: ValueRef) -> bool {
    (vr as usize) < NUM_REALS
}

impl NativeInstance for BouncingBall {
    fn set_time(&mut self, time: f64) -> Status {
        self.time = time;
        Status::Ok
    }

    fn get_real(&self, refs: &[ValueRef], out: &mut [f64]) -> Status {
        if !refs.iter().all(|&vr| valid_real(vr)) {
            return Status::Error;
        }
        for (slot, &vr) in out.iter_mut().zip(refs) {
            *slot = self.real(vr);
        }
        Status::Ok
    }

    fn get_integer(&self, refs: &[ValueRef], out: &mut [i32]) -> Status {
        if refs.iter().any(|&vr| vr != VR_BOUNCES) {
            return Status::Error;
        }
        out.fill(self.bounces);
        Status::Ok
    }

    fn get_boolean(&self, refs: &[ValueRef], out: &mut [bool]) -> Status {
        if refs.iter().any(|&vr| vr != VR_RESTING) {
            return Status::Error;
        }
        out.fill(self.resting);
        Status::Ok
    }

    fn get_string(&self, refs: &[ValueRef], out: &mut [String]) -> Status {
        if refs.iter().any(|&vr| vr != VR_LABEL) {
            return Status::Error;
        }
        for slot in out.iter_mut() {
            slot.clone_from(&self.label);
        }
        Status::Ok
    }

    fn set_real(&mut self, refs: &[ValueRef], values: &[f64]) -> Status {
        if !refs.iter().all(|&vr| valid_real(vr)) {
            return Status::Error;
        }
        // v_min is constant: writing back its own value is accepted.
        let changes_constant = refs
            .iter()
            .zip(values)
            .any(|(&vr, &value)| vr == VR_V_MIN && value.to_bits() != self.real(VR_V_MIN).to_bits());
        if changes_constant {
            return Status::Error;
        }
        for (&vr, &value) in refs.iter().zip(values) {
            self.reals[vr as usize] = value;
        }
        Status::Ok
    }

    fn set_integer(&mut self, refs: &[ValueRef], values: &[i32]) -> Status {
        if refs.iter().any(|&vr| vr != VR_BOUNCES) {
            return Status::Error;
        }
        if let Some(&last) = values.last() {
            self.bounces = last;
        }
        Status::Ok
    }

    fn set_boolean(&mut self, refs: &[ValueRef], values: &[bool]) -> Status {
        if refs.iter().any(|&vr| vr != VR_RESTING) {
            return Status::Error;
        }
        if let Some(&last) = values.last() {
            self.resting = last;
        }
        Status::Ok
    }

    fn set_string(&mut self, refs: &[ValueRef], values: &[String]) -> Status {
        if refs.iter().any(|&vr| vr != VR_LABEL) {
            return Status::Error;
        }
        if let Some(last) = values.last() {
            self.label.clone_from(last);
        }
        Status::Ok
    }

    fn get_continuous_states(&self, out: &mut [f64]) -> Status {
        if out.len() != 2 {
            return Status::Error;
        }
        out[0] = self.real(VR_H);
        out[1] = self.real(VR_V);
        Status::Ok
    }

    fn set_continuous_states(&mut self, states: &[f64]) -> Status {
        if states.len() != 2 {
            return Status::Error;
        }
        self.reals[VR_H as usize] = states[0];
        self.reals[VR_V as usize] = states[1];
        Status::Ok
    }

    fn get_derivatives(&mut self, out: &mut [f64]) -> Status {
        if out.len() != 2 {
            return Status::Error;
        }
        self.update_derivatives();
        out[0] = self.real(VR_DER_H);
        out[1] = self.real(VR_DER_V);
        Status::Ok
    }

    fn get_event_indicators(&mut self, out: &mut [f64]) -> Status {
        if out.len() != 1 {
            return Status::Error;
        }
        out[0] = self.real(VR_H);
        Status::Ok
    }

    fn initialize(
        &mut self,
        _tolerance_controlled: bool,
        _relative_tolerance: f64,
        event_info: &mut RawEventInfo,
    ) -> Status {
        let e = self.real(VR_E);
        if self.real(VR_G) <= 0.0 || !(0.0..=1.0).contains(&e) {
            return Status::Error;
        }
        self.update_derivatives();
        event_info.iteration_converged = 1;
        event_info.state_value_references_changed = 0;
        event_info.state_values_changed = 0;
        event_info.terminate_simulation = 0;
        event_info.upcoming_time_event = 0;
        Status::Ok
    }

    fn completed_integrator_step(&mut self, call_event_update: &mut bool) -> Status {
        *call_event_update = false;
        Status::Ok
    }

    fn event_update(&mut self, _intermediate_results: bool, event_info: &mut RawEventInfo) -> Status {
        let h = self.real(VR_H);
        let v = self.real(VR_V);
        event_info.iteration_converged = 1;
        event_info.state_value_references_changed = 0;
        event_info.upcoming_time_event = 0;
        event_info.terminate_simulation = 0;

        if self.resting || h > 0.0 || v >= 0.0 {
            event_info.state_values_changed = 0;
            return Status::Ok;
        }

        let rebound = -self.real(VR_E) * v;
        self.bounces += 1;
        self.reals[VR_H as usize] = 0.0;
        if rebound < self.real(VR_V_MIN) {
            self.reals[VR_V as usize] = 0.0;
            self.resting = true;
        } else {
            self.reals[VR_V as usize] = rebound;
        }
        self.update_derivatives();
        event_info.state_values_changed = 1;

        if self.logging {
            debug!(
                instance = %self.name,
                time = self.time,
                bounces = self.bounces,
                resting = self.resting,
                "bounce"
            );
        }
        Status::Ok
    }

    fn terminate(&mut self) -> Status {
        Status::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn falling_ball() -> BouncingBall {
        let mut ball = BouncingBall::new("ball", false);
        ball.set_continuous_states(&[-0.01, -4.0]);
        ball
    }

    #[test]
    fn derivatives_follow_gravity_and_input() {
        let mut ball = BouncingBall::new("ball", false);
        ball.set_real(&[VR_V, VR_A_EXT], &[2.0, 1.81]);
        let mut der = [0.0; 2];
        assert_eq!(ball.get_derivatives(&mut der), Status::Ok);
        assert_eq!(der[0], 2.0);
        assert!((der[1] - (-8.0)).abs() < 1e-12);
    }

    #[test]
    fn bounce_reflects_velocity() {
        let mut ball = falling_ball();
        let mut info = RawEventInfo::default();
        assert_eq!(ball.event_update(false, &mut info), Status::Ok);
        assert_eq!(info.state_values_changed, 1);

        let mut states = [0.0; 2];
        ball.get_continuous_states(&mut states);
        assert_eq!(states[0], 0.0);
        assert!((states[1] - 2.8).abs() < 1e-12);

        let mut bounces = [0];
        ball.get_integer(&[VR_BOUNCES], &mut bounces);
        assert_eq!(bounces[0], 1);
    }

    #[test]
    fn no_event_above_ground() {
        let mut ball = BouncingBall::new("ball", false);
        let mut info = RawEventInfo::default();
        ball.event_update(false, &mut info);
        assert_eq!(info.state_values_changed, 0);
        assert_eq!(info.iteration_converged, 1);
    }

    #[test]
    fn slow_impact_comes_to_rest() {
        let mut ball = BouncingBall::new("ball", false);
        ball.set_continuous_states(&[-0.001, -0.05]);
        let mut info = RawEventInfo::default();
        ball.event_update(false, &mut info);

        let mut resting = [false];
        ball.get_boolean(&[VR_RESTING], &mut resting);
        assert!(resting[0]);
        let mut der = [1.0; 2];
        ball.get_derivatives(&mut der);
        assert_eq!(der, [0.0, 0.0]);
    }

    #[test]
    fn unknown_references_are_rejected() {
        let mut ball = BouncingBall::new("ball", false);
        let mut out = [0.0];
        assert_eq!(ball.get_real(&[42], &mut out), Status::Error);
        assert_eq!(ball.set_real(&[VR_V_MIN], &[1.0]), Status::Error);
        let mut ints = [0];
        assert_eq!(ball.get_integer(&[3], &mut ints), Status::Error);
    }

    #[test]
    fn constant_accepts_only_its_current_value() {
        let mut ball = BouncingBall::new("ball", false);
        assert_eq!(ball.set_real(&[VR_H, VR_V_MIN], &[2.0, 0.1]), Status::Ok);
        assert_eq!(ball.real(VR_H), 2.0);
        assert_eq!(ball.set_real(&[VR_H, VR_V_MIN], &[3.0, 0.2]), Status::Error);
        assert_eq!(ball.real(VR_H), 2.0);
        assert_eq!(ball.real(VR_V_MIN), 0.1);
    }

    #[test]
    fn bad_parameters_fail_initialization() {
        let mut ball = BouncingBall::new("ball", false);
        ball.set_real(&[VR_E], &[1.5]);
        let mut info = RawEventInfo::default();
        assert_eq!(ball.initialize(false, 1e-6, &mut info), Status::Error);
    }
}
