use skyrace_shared::*;

use crate::pilots::nav::extract_nav_state;
use crate::policy::Policy;

/// Scripted pilot: steer straight at the next gate, boost once lined up.
/// No racing line, no anticipation of the gate after this one.
pub struct RacerPolicy {
    dead_zone: f32,
}

impl RacerPolicy {
    pub fn new() -> Self {
        Self { dead_zone: 0.08 }
    }
}

impl Default for RacerPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for RacerPolicy {
    fn name(&self) -> &str {
        "racer"
    }

    fn act(&mut self, obs: &Observation) -> Action {
        let nav = extract_nav_state(obs);

        let pitch_axis = bang_bang(nav.pitch_error, self.dead_zone);
        let yaw_axis = bang_bang(nav.yaw_error, self.dead_zone);

        // Boost only when pointed at the gate and it is not right on the
        // nose; boosting through a tight turn overshoots.
        let boost = nav.aligned(0.25) && nav.distance > 120.0;

        Action::from_axes(pitch_axis, yaw_axis, boost)
    }
}

/// Full deflection outside the dead zone, nothing inside it.
pub(crate) fn bang_bang(error: f32, dead_zone: f32) -> f32 {
    if error > dead_zone {
        1.0
    } else if error < -dead_zone {
        -1.0
    } else {
        0.0
    }
}
