use glam::Vec3;

use skyrace_shared::Observation;

/// Navigation quantities derived from the raw 9-float observation.
/// Shared situational awareness for the scripted pilots.
pub struct NavState {
    /// Velocity in the aircraft's local frame.
    pub local_velocity: Vec3,
    /// Vector to the next gate in the aircraft's local frame.
    pub to_gate: Vec3,
    /// The next gate's facing in the aircraft's local frame.
    pub gate_forward: Vec3,
    /// Straight-line distance to the next gate.
    pub distance: f32,
    /// Signed horizontal angle off the nose, radians; positive = gate is to
    /// the right.
    pub yaw_error: f32,
    /// Signed vertical angle off the nose, radians; positive = gate is above.
    pub pitch_error: f32,
}

/// Unpack an observation into navigation state.
pub fn extract_nav_state(obs: &Observation) -> NavState {
    let d = &obs.data;
    let local_velocity = Vec3::new(d[0], d[1], d[2]);
    let to_gate = Vec3::new(d[3], d[4], d[5]);
    let gate_forward = Vec3::new(d[6], d[7], d[8]);

    let horizontal = (to_gate.x * to_gate.x + to_gate.z * to_gate.z).sqrt();

    NavState {
        local_velocity,
        to_gate,
        gate_forward,
        distance: to_gate.length(),
        yaw_error: to_gate.x.atan2(to_gate.z),
        pitch_error: to_gate.y.atan2(horizontal),
    }
}

impl NavState {
    /// Roughly nose-on to the gate on both axes.
    pub fn aligned(&self, tolerance: f32) -> bool {
        self.yaw_error.abs() < tolerance && self.pitch_error.abs() < tolerance
    }
}
