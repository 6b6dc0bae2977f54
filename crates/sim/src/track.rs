use glam::{Quat, Vec3};
use rand::Rng;

use skyrace_shared::*;

/// One sample of the race path: a position plus the facing of the path at
/// that point.
#[derive(Debug, Clone, Copy)]
pub struct Waypoint {
    pub position: Vec3,
    pub orientation: Quat,
}

/// The track-geometry collaborator: an ordered, closed loop of waypoints.
///
/// A missing or degenerate path is a scene-setup error, so construction
/// fails hard instead of limping along half-initialized.
#[derive(Debug, Clone)]
pub struct RacePath {
    waypoints: Vec<Waypoint>,
}

impl RacePath {
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        assert!(
            waypoints.len() >= 2,
            "race path must define at least 2 waypoints, got {}",
            waypoints.len()
        );
        Self { waypoints }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn waypoint(&self, index: usize) -> &Waypoint {
        &self.waypoints[index]
    }
}

/// The materialized checkpoint loop. Built once from a path, immutable for
/// the lifetime of the track.
#[derive(Debug, Clone)]
pub struct Track {
    checkpoints: Vec<Checkpoint>,
}

impl Track {
    /// Place one checkpoint gate on every path waypoint. The last gate is
    /// the start/finish line.
    pub fn from_path(path: &RacePath) -> Self {
        let count = path.len();
        let checkpoints = (0..count)
            .map(|i| {
                let wp = path.waypoint(i);
                Checkpoint {
                    index: i,
                    position: wp.position,
                    orientation: wp.orientation,
                    is_finish: i == count - 1,
                }
            })
            .collect();
        Self { checkpoints }
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    pub fn checkpoint(&self, index: usize) -> &Checkpoint {
        assert!(
            index < self.checkpoints.len(),
            "checkpoint index {} out of range (track has {})",
            index,
            self.checkpoints.len()
        );
        &self.checkpoints[index]
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    /// Spawn pose for an aircraft whose next gate is `next_checkpoint`: the
    /// gate *before* it (wrapping 0 to the last gate), pushed sideways along
    /// the gate's right axis so concurrent aircraft don't stack. Only the
    /// spacing magnitude is random; gate selection is deterministic.
    pub fn start_pose_for<R: Rng>(
        &self,
        next_checkpoint: usize,
        lateral_slot: usize,
        total_aircraft: usize,
        spacing: (f32, f32),
        rng: &mut R,
    ) -> (Vec3, Quat) {
        assert!(
            next_checkpoint < self.checkpoints.len(),
            "checkpoint index {} out of range (track has {})",
            next_checkpoint,
            self.checkpoints.len()
        );

        let previous = if next_checkpoint == 0 {
            self.checkpoints.len() - 1
        } else {
            next_checkpoint - 1
        };
        let gate = &self.checkpoints[previous];

        let slots = lateral_slot as i64 - (total_aircraft / 2) as i64;
        let offset = Vec3::X * (slots as f32 * rng.gen_range(spacing.0..spacing.1));

        (gate.position + gate.orientation * offset, gate.orientation)
    }

    /// Uniform random gate index, used when a training reset asks for a
    /// randomized start.
    pub fn random_next_index<R: Rng>(&self, rng: &mut R) -> usize {
        rng.gen_range(0..self.checkpoints.len())
    }
}

/// Deterministic built-in loop: `count` gates on a circle of `radius` at the
/// given altitude, each facing along the direction of travel.
pub fn oval_path(count: usize, radius: f32, altitude: f32) -> RacePath {
    assert!(count >= 2, "an oval needs at least 2 gates, got {count}");

    let waypoints = (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * std::f32::consts::TAU;
            Waypoint {
                position: Vec3::new(angle.cos() * radius, altitude, angle.sin() * radius),
                // Tangent of the circle at this angle
                orientation: Quat::from_rotation_y(-angle),
            }
        })
        .collect();
    RacePath::new(waypoints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn square_track() -> Track {
        let waypoints = vec![
            Waypoint {
                position: Vec3::new(0.0, 50.0, 0.0),
                orientation: Quat::IDENTITY,
            },
            Waypoint {
                position: Vec3::new(0.0, 50.0, 100.0),
                orientation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            },
            Waypoint {
                position: Vec3::new(100.0, 50.0, 100.0),
                orientation: Quat::from_rotation_y(std::f32::consts::PI),
            },
            Waypoint {
                position: Vec3::new(100.0, 50.0, 0.0),
                orientation: Quat::from_rotation_y(-std::f32::consts::FRAC_PI_2),
            },
        ];
        Track::from_path(&RacePath::new(waypoints))
    }

    #[test]
    fn test_build_tags_only_last_gate_as_finish() {
        let track = square_track();
        assert_eq!(track.len(), 4);
        for cp in &track.checkpoints()[..3] {
            assert!(!cp.is_finish);
        }
        assert!(track.checkpoint(3).is_finish);
        assert_eq!(track.checkpoint(2).index, 2);
    }

    #[test]
    #[should_panic(expected = "at least 2 waypoints")]
    fn test_degenerate_path_panics() {
        RacePath::new(vec![Waypoint {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }]);
    }

    #[test]
    fn test_start_pose_uses_previous_gate_with_wraparound() {
        let track = square_track();
        let mut rng = Pcg64::seed_from_u64(1);

        // next = 0 wraps to the last gate
        let (pos, rot) = track.start_pose_for(0, 0, 1, (9.0, 10.0), &mut rng);
        // single aircraft in slot 0: no lateral offset
        assert!(pos.abs_diff_eq(track.checkpoint(3).position, 1e-5));
        assert!((rot.dot(track.checkpoint(3).orientation).abs() - 1.0).abs() < 1e-5);

        let (pos, _) = track.start_pose_for(2, 0, 1, (9.0, 10.0), &mut rng);
        assert!(pos.abs_diff_eq(track.checkpoint(1).position, 1e-5));
    }

    #[test]
    fn test_start_pose_lateral_spacing_is_bounded() {
        let track = square_track();
        let mut rng = Pcg64::seed_from_u64(7);
        let gate = track.checkpoint(3);

        for slot in 0..4usize {
            let (pos, _) = track.start_pose_for(0, slot, 4, (9.0, 10.0), &mut rng);
            let lateral = (pos - gate.position).dot(gate.right());
            let slots = slot as f32 - 2.0;
            if slots == 0.0 {
                assert!(lateral.abs() < 1e-4);
            } else {
                let spacing = lateral / slots;
                assert!(
                    (9.0..10.0).contains(&spacing),
                    "spacing {spacing} out of range for slot {slot}"
                );
            }
        }
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_start_pose_rejects_bad_index() {
        let track = square_track();
        let mut rng = Pcg64::seed_from_u64(0);
        track.start_pose_for(4, 0, 1, (9.0, 10.0), &mut rng);
    }

    #[test]
    fn test_random_next_index_in_range() {
        let track = square_track();
        let mut rng = Pcg64::seed_from_u64(3);
        for _ in 0..100 {
            assert!(track.random_next_index(&mut rng) < track.len());
        }
    }

    #[test]
    fn test_oval_path_gates_face_direction_of_travel() {
        let path = oval_path(12, 400.0, 80.0);
        let track = Track::from_path(&path);
        assert_eq!(track.len(), 12);

        // Each gate's forward axis should roughly point at the next gate.
        for i in 0..track.len() {
            let gate = track.checkpoint(i);
            let next = track.checkpoint((i + 1) % track.len());
            let to_next = (next.position - gate.position).normalize();
            assert!(
                gate.forward().dot(to_next) > 0.8,
                "gate {i} faces away from the racing line"
            );
        }
    }
}
