use skyrace_shared::*;

use crate::physics::RaceState;

impl RaceState {
    /// Build the observation vector for one aircraft. Everything is
    /// expressed in the aircraft's local frame so the policy never sees
    /// absolute world coordinates.
    pub fn observe(&self, idx: usize) -> Observation {
        let mut data = [0.0f32; OBS_SIZE];
        let craft = &self.aircraft[idx];
        let inverse = craft.orientation().inverse();

        // VELOCITY (3 floats) [0..3)
        let local_velocity = inverse * craft.velocity;
        data[0] = local_velocity.x;
        data[1] = local_velocity.y;
        data[2] = local_velocity.z;

        // VECTOR TO NEXT GATE (3 floats) [3..6)
        let to_gate = self.vector_to_next_checkpoint(idx);
        data[3] = to_gate.x;
        data[4] = to_gate.y;
        data[5] = to_gate.z;

        // NEXT GATE FACING (3 floats) [6..9)
        let gate_forward = inverse * self.track.checkpoint(craft.next_checkpoint).forward();
        data[6] = gate_forward.x;
        data[7] = gate_forward.y;
        data[8] = gate_forward.z;

        Observation { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{oval_path, RacePath, Waypoint};
    use glam::{Quat, Vec3};

    fn straight_state() -> RaceState {
        // Two gates straight down +Z; spawn lands on the second gate.
        let path = RacePath::new(vec![
            Waypoint {
                position: Vec3::new(0.0, 80.0, 100.0),
                orientation: Quat::IDENTITY,
            },
            Waypoint {
                position: Vec3::new(0.0, 80.0, 0.0),
                orientation: Quat::IDENTITY,
            },
        ]);
        RaceState::new(RaceConfig::default(), &path, 1)
    }

    #[test]
    fn test_observation_size() {
        let state = RaceState::new(RaceConfig::default(), &oval_path(6, 400.0, 80.0), 1);
        assert_eq!(state.observe(0).data.len(), OBS_SIZE);
    }

    #[test]
    fn test_gate_dead_ahead() {
        let state = straight_state();
        let obs = state.observe(0);

        // At rest: zero local velocity.
        assert!(obs.data[..3].iter().all(|v| v.abs() < 1e-4));
        // Gate 0 is 100 units straight ahead.
        assert!(obs.data[3].abs() < 1e-3);
        assert!(obs.data[4].abs() < 1e-3);
        assert!((obs.data[5] - 100.0).abs() < 1e-3);
        // Gate faces the same way as the aircraft.
        assert!((obs.data[8] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_observation_is_frame_relative() {
        let mut state = straight_state();
        // Turn the aircraft 90 degrees right: the gate ahead moves to the left.
        state.aircraft[0].yaw += 90.0;
        let obs = state.observe(0);

        assert!((obs.data[3] - (-100.0)).abs() < 1e-2);
        assert!(obs.data[5].abs() < 1e-2);
    }

    #[test]
    fn test_local_velocity_tracks_motion() {
        let mut state = straight_state();
        state.aircraft[0].velocity = Vec3::new(0.0, 0.0, 42.0);
        let obs = state.observe(0);
        assert!((obs.data[2] - 42.0).abs() < 1e-3);

        state.aircraft[0].yaw = 90.0;
        let obs = state.observe(0);
        // World +Z velocity seen from a craft facing +X is leftward.
        assert!((obs.data[0] - (-42.0)).abs() < 1e-2);
        assert!(obs.data[2].abs() < 1e-2);
    }
}
