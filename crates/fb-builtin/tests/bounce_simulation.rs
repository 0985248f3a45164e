//! Bouncing ball driven through the adapter with a fixed-step Euler loop.

use std::sync::Arc;

use fb_builtin::CatalogLoader;
use fb_builtin::bouncing_ball::{VR_BOUNCES, VR_E, VR_RESTING};
use fb_component::{BackendKind, ComponentAdapter, ComponentPlan, ImageRegistry};
use fb_values::{Boolean, Integer, Real};
use proptest::prelude::*;

struct Trace {
    max_height: f64,
    bounces: i32,
    resting: bool,
}

fn simulate(restitution: f64, t_end: f64) -> Trace {
    let plan = ComponentPlan::new("ball", "bounce.fmu").with_backend(BackendKind::Isolated);
    let mut ball = ComponentAdapter::with_registry(
        plan,
        Arc::new(CatalogLoader::new()),
        Arc::new(ImageRegistry::new()),
    )
    .unwrap();
    ball.load(false).unwrap();
    ball.set_values::<Real>(&[VR_E], &[restitution]).unwrap();
    ball.initialize().unwrap();

    let dt = 1e-3;
    let mut t = 0.0;
    let mut max_height = f64::MIN;
    let mut indicator = ball.get_event_indicators().unwrap()[0];
    while t < t_end {
        let x = ball.get_states().unwrap();
        let dx = ball.get_state_derivatives().unwrap();
        t += dt;
        ball.set_time(t).unwrap();
        ball.set_states(&[x[0] + dt * dx[0], x[1] + dt * dx[1]]).unwrap();
        ball.step_completed().unwrap();
        max_height = max_height.max(x[0]);

        let next = ball.get_event_indicators().unwrap()[0];
        if (indicator > 0.0) != (next > 0.0) || next < 0.0 {
            ball.event_update().unwrap();
        }
        indicator = ball.get_event_indicators().unwrap()[0];
    }

    let mut bounces = [0];
    ball.get_values::<Integer>(&[VR_BOUNCES], &mut bounces).unwrap();
    let mut resting = [false];
    ball.get_values::<Boolean>(&[VR_RESTING], &mut resting).unwrap();
    Trace {
        max_height,
        bounces: bounces[0],
        resting: resting[0],
    }
}

#[test]
fn inelastic_ball_comes_to_rest() {
    let trace = simulate(0.3, 3.0);
    assert!(trace.resting);
    assert!(trace.bounces >= 2);
}

#[test]
fn lively_ball_keeps_bouncing() {
    let trace = simulate(0.9, 2.0);
    assert!(!trace.resting);
    assert!(trace.bounces >= 2);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn ball_never_rises_above_drop_height(e in 0.1f64..0.95) {
        let trace = simulate(e, 2.0);
        // explicit Euler gains a little energy per step
        prop_assert!(trace.max_height <= 1.0 + 0.02, "max height {}", trace.max_height);
        prop_assert!(trace.bounces >= 1);
    }
}
