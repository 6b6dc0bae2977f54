use skyrace_shared::*;

/// Rate-limited approach: move `current` toward `target` by at most
/// `max_delta`. Not a spring; the step size is constant regardless of how
/// far away the target jumped.
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + max_delta.copysign(delta)
    }
}

/// Normalize an angle in degrees to (-180, 180].
pub fn wrap_angle(mut degrees: f32) -> f32 {
    while degrees > 180.0 {
        degrees -= 360.0;
    }
    while degrees <= -180.0 {
        degrees += 360.0;
    }
    degrees
}

/// Roll coefficient the controller steers toward: bank against the turn
/// while yawing, otherwise roll back toward wings-level in proportion to the
/// current bank.
pub fn roll_target(yaw_coeff: f32, roll_angle: f32, max_roll_angle: f32) -> f32 {
    if yaw_coeff == 0.0 {
        -roll_angle / max_roll_angle
    } else {
        -yaw_coeff
    }
}

/// Advance the control surfaces and orientation of one aircraft by a single
/// tick. Smoothed deltas chase the decoded coefficients under the rate
/// limit, then integrate into the Euler angles; pitch and roll are clamped,
/// yaw is free.
pub fn steer(craft: &mut AircraftState, action: &Action, config: &SimConfig, dt: f32) {
    let pitch_coeff = action.pitch_coeff();
    let yaw_coeff = action.yaw_coeff();
    let roll_coeff = roll_target(yaw_coeff, wrap_angle(craft.roll), config.max_roll_angle);

    let max_delta = config.smoothing_rate * dt;
    craft.smooth_pitch = move_towards(craft.smooth_pitch, pitch_coeff, max_delta);
    craft.smooth_yaw = move_towards(craft.smooth_yaw, yaw_coeff, max_delta);
    craft.smooth_roll = move_towards(craft.smooth_roll, roll_coeff, max_delta);

    let pitch = wrap_angle(craft.pitch + craft.smooth_pitch * dt * config.pitch_rate);
    craft.pitch = pitch.clamp(-config.max_pitch_angle, config.max_pitch_angle);

    craft.yaw += craft.smooth_yaw * dt * config.yaw_rate;

    let roll = wrap_angle(craft.roll + craft.smooth_roll * dt * config.roll_rate);
    craft.roll = roll.clamp(-config.max_roll_angle, config.max_roll_angle);
}

/// Integrate thrust and drag into velocity and position. Thrust is a
/// continuous force along the body's forward axis; boost scales it.
pub fn integrate_body(craft: &mut AircraftState, config: &SimConfig, dt: f32) {
    let boost_modifier = if craft.boost {
        config.boost_multiplier
    } else {
        1.0
    };
    let accel = config.thrust * boost_modifier / config.mass;

    craft.velocity += (craft.forward() * accel - craft.velocity * config.drag_coeff) * dt;
    craft.position += craft.velocity * dt;
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT_TEST: f32 = 0.02;

    #[test]
    fn test_move_towards_is_rate_limited() {
        let max_delta = 2.0 * DT_TEST;
        let mut value = 0.0f32;

        // Target jumps wildly; per-step change must never exceed max_delta.
        for target in [1.0, -1.0, 100.0, -0.5, 0.0, 1.0] {
            for _ in 0..10 {
                let next = move_towards(value, target, max_delta);
                assert!((next - value).abs() <= max_delta + 1e-6);
                value = next;
            }
        }
    }

    #[test]
    fn test_move_towards_reaches_target_exactly() {
        let mut value = 0.0f32;
        for _ in 0..30 {
            value = move_towards(value, 1.0, 0.04);
        }
        assert_eq!(value, 1.0);
    }

    #[test]
    fn test_wrap_angle() {
        assert_eq!(wrap_angle(270.0), -90.0);
        assert_eq!(wrap_angle(-270.0), 90.0);
        assert_eq!(wrap_angle(180.0), 180.0);
        assert_eq!(wrap_angle(-180.0), 180.0);
        assert_eq!(wrap_angle(0.0), 0.0);
        assert_eq!(wrap_angle(540.0), 180.0);
    }

    #[test]
    fn test_roll_target_banks_into_turn() {
        // Turning left (yaw coefficient -1) banks right: target +1.
        assert_eq!(roll_target(-1.0, 0.0, 45.0), 1.0);
        assert_eq!(roll_target(1.0, 0.0, 45.0), -1.0);
    }

    #[test]
    fn test_roll_target_self_centers_when_not_turning() {
        // No yaw input: roll back proportional to current bank.
        assert_eq!(roll_target(0.0, 45.0, 45.0), -1.0);
        assert_eq!(roll_target(0.0, -22.5, 45.0), 0.5);
        assert_eq!(roll_target(0.0, 0.0, 45.0), 0.0);
    }

    #[test]
    fn test_pitch_and_roll_stay_clamped() {
        let config = SimConfig::default();
        let mut craft = AircraftState::new();
        let action = Action::from_raw([1.0, 1.0, 0.0]); // up + right, forever

        for _ in 0..2000 {
            steer(&mut craft, &action, &config, DT_TEST);
            assert!(craft.pitch.abs() <= config.max_pitch_angle);
            assert!(craft.roll.abs() <= config.max_roll_angle);
        }
        // Sustained input saturates the clamps.
        assert_eq!(craft.pitch, config.max_pitch_angle);
        assert_eq!(craft.roll, -config.max_roll_angle);
    }

    #[test]
    fn test_yaw_is_unbounded() {
        let config = SimConfig::default();
        let mut craft = AircraftState::new();
        let action = Action::from_raw([0.0, 1.0, 0.0]); // hard right

        // 100 deg/s for 20 simulated seconds: several full turns.
        for _ in 0..1000 {
            steer(&mut craft, &action, &config, DT_TEST);
        }
        assert!(craft.yaw > 360.0);
    }

    #[test]
    fn test_smoothing_obeys_per_tick_bound() {
        let config = SimConfig::default();
        let mut craft = AircraftState::new();
        let max_delta = config.smoothing_rate * DT_TEST;

        // Slam from hard-left to hard-right; smoothed yaw must ramp.
        let mut action = Action::from_raw([0.0, 2.0, 0.0]);
        for _ in 0..100 {
            steer(&mut craft, &action, &config, DT_TEST);
        }
        assert!((craft.smooth_yaw - (-1.0)).abs() < 1e-5);

        action = Action::from_raw([0.0, 1.0, 0.0]);
        let mut prev = craft.smooth_yaw;
        for _ in 0..100 {
            steer(&mut craft, &action, &config, DT_TEST);
            assert!((craft.smooth_yaw - prev).abs() <= max_delta + 1e-6);
            prev = craft.smooth_yaw;
        }
        assert!((craft.smooth_yaw - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_thrust_accelerates_along_forward() {
        let config = SimConfig::default();
        let mut craft = AircraftState::new();

        integrate_body(&mut craft, &config, DT_TEST);
        assert!(craft.velocity.z > 0.0);
        assert!(craft.velocity.x.abs() < 1e-6);
        assert!(craft.position.z > 0.0);
    }

    #[test]
    fn test_boost_doubles_acceleration() {
        let config = SimConfig::default();
        let mut plain = AircraftState::new();
        let mut boosted = AircraftState::new();
        boosted.boost = true;

        integrate_body(&mut plain, &config, DT_TEST);
        integrate_body(&mut boosted, &config, DT_TEST);
        assert!((boosted.velocity.z - plain.velocity.z * config.boost_multiplier).abs() < 1e-4);
    }

    #[test]
    fn test_drag_caps_speed() {
        let config = SimConfig::default();
        let mut craft = AircraftState::new();

        for _ in 0..(50 * 60) {
            integrate_body(&mut craft, &config, DT_TEST);
        }
        // Terminal speed = accel / drag.
        let terminal = config.thrust / config.mass / config.drag_coeff;
        assert!((craft.speed() - terminal).abs() / terminal < 0.01);
    }
}
