use skyrace_shared::*;

use crate::pilots::nav::extract_nav_state;
use crate::pilots::racer::bang_bang;
use crate::policy::Policy;

/// Conservative pilot: same gate-seeking as the racer but with a wider dead
/// zone and no boost. Useful as a steady mid-field opponent.
pub struct CruiserPolicy {
    dead_zone: f32,
}

impl CruiserPolicy {
    pub fn new() -> Self {
        Self { dead_zone: 0.18 }
    }
}

impl Default for CruiserPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for CruiserPolicy {
    fn name(&self) -> &str {
        "cruiser"
    }

    fn act(&mut self, obs: &Observation) -> Action {
        let nav = extract_nav_state(obs);
        Action::from_axes(
            bang_bang(nav.pitch_error, self.dead_zone),
            bang_bang(nav.yaw_error, self.dead_zone),
            false,
        )
    }
}
