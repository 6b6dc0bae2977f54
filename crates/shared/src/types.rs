use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Discrete 3-axis control vector for one tick.
///
/// Pitch and yaw use a compact unsigned encoding so the whole action fits a
/// small discrete domain: `0` = none, `1` = up / right, `2` = down / left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub pitch: u8,
    pub yaw: u8,
    pub boost: bool,
}

impl Action {
    pub fn none() -> Self {
        Self {
            pitch: 0,
            yaw: 0,
            boost: false,
        }
    }

    /// Tolerant decode of a raw float vector (e.g. from an external policy
    /// runtime). Values are rounded and clamped onto the discrete domain.
    pub fn from_raw(raw: [f32; 3]) -> Self {
        Self {
            pitch: raw[0].round().clamp(0.0, 2.0) as u8,
            yaw: raw[1].round().clamp(0.0, 2.0) as u8,
            boost: raw[2].round() as i32 == 1,
        }
    }

    pub fn to_raw(&self) -> [f32; 3] {
        [
            self.pitch as f32,
            self.yaw as f32,
            if self.boost { 1.0 } else { 0.0 },
        ]
    }

    /// Map continuous input axes (-1/0/+1 from a stick or keyboard) onto the
    /// discrete encoding, re-encoding -1 as 2.
    pub fn from_axes(pitch_axis: f32, yaw_axis: f32, boost: bool) -> Self {
        let encode = |axis: f32| -> u8 {
            match axis.round() as i32 {
                1 => 1,
                -1 => 2,
                _ => 0,
            }
        };
        Self {
            pitch: encode(pitch_axis),
            yaw: encode(yaw_axis),
            boost,
        }
    }

    /// Decoded pitch coefficient: 0 -> 0.0, 1 -> +1.0 (up), 2 -> -1.0 (down).
    pub fn pitch_coeff(&self) -> f32 {
        decode_axis(self.pitch)
    }

    /// Decoded yaw coefficient: 0 -> 0.0, 1 -> +1.0 (right), 2 -> -1.0 (left).
    pub fn yaw_coeff(&self) -> f32 {
        decode_axis(self.yaw)
    }
}

impl Default for Action {
    fn default() -> Self {
        Self::none()
    }
}

fn decode_axis(value: u8) -> f32 {
    match value {
        1 => 1.0,
        2 => -1.0,
        _ => 0.0,
    }
}

/// Where an aircraft is in the crash/respawn sequence. Deadlines are
/// absolute tick numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    Active,
    Exploding { until: u32 },
    Resetting { until: u32 },
}

/// Full per-aircraft simulation state.
///
/// Orientation is stored as Euler angles in degrees: positive pitch raises
/// the nose, yaw is free rotation about the vertical axis, positive roll
/// banks right. Pitch and roll stay clamped by the flight controller; yaw is
/// unbounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AircraftState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,

    // Smoothed control deltas, rate-limited each tick
    pub smooth_pitch: f32,
    pub smooth_yaw: f32,
    pub smooth_roll: f32,

    pub boost: bool,
    pub frozen: bool,
    pub condition: Condition,

    pub next_checkpoint: usize,
    pub laps: u32,
    pub checkpoints_passed: u32,
    pub collisions: u32,
    pub boost_ticks: u32,

    // Episode bookkeeping (meaningful in training mode only)
    pub episode_steps: u32,
    pub episode_checkpoints: u32,
    pub step_deadline: u32,
    pub episode_reward: f32,
    pub total_reward: f32,
    pub episodes: u32,
}

impl AircraftState {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            pitch: 0.0,
            yaw: 0.0,
            roll: 0.0,
            smooth_pitch: 0.0,
            smooth_yaw: 0.0,
            smooth_roll: 0.0,
            boost: false,
            frozen: false,
            condition: Condition::Active,
            next_checkpoint: 0,
            laps: 0,
            checkpoints_passed: 0,
            collisions: 0,
            boost_ticks: 0,
            episode_steps: 0,
            episode_checkpoints: 0,
            step_deadline: 0,
            episode_reward: 0.0,
            total_reward: 0.0,
            episodes: 0,
        }
    }

    /// Body orientation as a rotation from local to world space.
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.yaw.to_radians(),
            -self.pitch.to_radians(),
            self.roll.to_radians(),
        )
    }

    /// Overwrite the Euler angles from a world-space rotation.
    pub fn set_orientation(&mut self, rotation: Quat) {
        let (yaw, pitch, roll) = rotation.to_euler(EulerRot::YXZ);
        self.yaw = yaw.to_degrees();
        self.pitch = -pitch.to_degrees();
        self.roll = roll.to_degrees();
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::Z
    }

    pub fn right(&self) -> Vec3 {
        self.orientation() * Vec3::X
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

impl Default for AircraftState {
    fn default() -> Self {
        Self::new()
    }
}

/// One gate of the cyclic track. Immutable after the track is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub index: usize,
    pub position: Vec3,
    pub orientation: Quat,
    /// The last gate of the loop doubles as the start/finish line.
    pub is_finish: bool,
}

impl Checkpoint {
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }

    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::X
    }
}

/// Tunable physics and reward parameters. Everything that was a scene field
/// in the prototype lives here so sweeps can vary it per run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimConfig {
    pub thrust: f32,
    pub mass: f32,
    pub drag_coeff: f32,
    pub boost_multiplier: f32,
    pub pitch_rate: f32,
    pub yaw_rate: f32,
    pub roll_rate: f32,
    pub max_pitch_angle: f32,
    pub max_roll_angle: f32,
    pub smoothing_rate: f32,
    pub checkpoint_radius: f32,
    pub spawn_spacing_min: f32,
    pub spawn_spacing_max: f32,
    pub explosion_ticks: u32,
    pub respawn_hold_ticks: u32,
    pub step_timeout: u32,
    pub max_episode_steps: u32,
    pub checkpoint_reward: f32,
    pub timeout_reward: f32,
    pub collision_penalty: f32,
}

impl SimConfig {
    /// Constant per-tick reward drain in training mode.
    pub fn step_penalty(&self) -> f32 {
        -1.0 / self.max_episode_steps as f32
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            thrust: crate::THRUST,
            mass: crate::AIRCRAFT_MASS,
            drag_coeff: crate::DRAG_COEFF,
            boost_multiplier: crate::BOOST_MULTIPLIER,
            pitch_rate: crate::PITCH_RATE,
            yaw_rate: crate::YAW_RATE,
            roll_rate: crate::ROLL_RATE,
            max_pitch_angle: crate::MAX_PITCH_ANGLE,
            max_roll_angle: crate::MAX_ROLL_ANGLE,
            smoothing_rate: crate::SMOOTHING_RATE,
            checkpoint_radius: crate::CHECKPOINT_RADIUS,
            spawn_spacing_min: crate::SPAWN_SPACING_MIN,
            spawn_spacing_max: crate::SPAWN_SPACING_MAX,
            explosion_ticks: crate::EXPLOSION_TICKS,
            respawn_hold_ticks: crate::RESPAWN_HOLD_TICKS,
            step_timeout: crate::STEP_TIMEOUT,
            max_episode_steps: crate::MAX_EPISODE_STEPS,
            checkpoint_reward: crate::CHECKPOINT_REWARD,
            timeout_reward: crate::TIMEOUT_REWARD,
            collision_penalty: crate::COLLISION_PENALTY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceConfig {
    pub seed: u64,
    pub pilot_names: Vec<String>,
    pub laps: u32,
    pub max_ticks: u32,
    /// Ticks between policy decisions; the last action is held in between.
    pub control_period: u32,
    /// Enables episodic reward/timeout bookkeeping and disables freeze/thaw.
    pub training: bool,
    /// In training mode, pick a random next checkpoint on every reset.
    pub randomize_spawns: bool,
    pub sim_config: SimConfig,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            pilot_names: Vec::new(),
            laps: crate::DEFAULT_LAPS,
            max_ticks: crate::MAX_TICKS,
            control_period: 1,
            training: false,
            randomize_spawns: false,
            sim_config: SimConfig::default(),
        }
    }
}

/// Events emitted by the simulation and consumed by the embedding layer
/// (reward shaping, UI, audio). Stale checkpoint crossings never surface
/// here; they are dropped inside the sim.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RaceEvent {
    CheckpointReached {
        aircraft: usize,
        checkpoint: usize,
        tick: u32,
    },
    LapCompleted {
        aircraft: usize,
        lap: u32,
        tick: u32,
    },
    Collision {
        aircraft: usize,
        tick: u32,
    },
    StepTimeout {
        aircraft: usize,
        tick: u32,
    },
    EpisodeReset {
        aircraft: usize,
        tick: u32,
    },
    /// Boost went 0 -> 1; the trail renderer must clear before re-emitting.
    BoostIgnited {
        aircraft: usize,
        tick: u32,
    },
    Exploded {
        aircraft: usize,
        tick: u32,
    },
    Respawned {
        aircraft: usize,
        tick: u32,
    },
}

/// Fixed-size observation vector handed to policies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub data: [f32; crate::OBS_SIZE],
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AircraftSnapshot {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
    pub speed: f32,
    pub boost: bool,
    pub frozen: bool,
    pub next_checkpoint: usize,
    pub laps: u32,
    pub checkpoints: u32,
}

impl From<&AircraftState> for AircraftSnapshot {
    fn from(s: &AircraftState) -> Self {
        Self {
            x: s.position.x,
            y: s.position.y,
            z: s.position.z,
            pitch: s.pitch,
            yaw: s.yaw,
            roll: s.roll,
            speed: s.speed(),
            boost: s.boost,
            frozen: s.frozen,
            next_checkpoint: s.next_checkpoint,
            laps: s.laps,
            checkpoints: s.checkpoints_passed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub tick: u32,
    pub aircraft: Vec<AircraftSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replay {
    pub config: RaceConfig,
    pub frames: Vec<ReplayFrame>,
    pub events: Vec<RaceEvent>,
    pub result: RaceResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceEndReason {
    LapsCompleted,
    Timeout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceResult {
    pub reason: RaceEndReason,
    pub winner: Option<usize>,
    pub final_tick: u32,
    /// Best finisher first.
    pub standings: Vec<PilotStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PilotStats {
    pub aircraft: usize,
    pub name: String,
    pub laps: u32,
    pub checkpoints: u32,
    pub collisions: u32,
    pub boost_ticks: u32,
    pub episodes: u32,
    pub total_reward: f32,
}

/// Summary of one completed training episode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EpisodeReport {
    pub episode: u32,
    pub steps: u32,
    pub reward: f32,
    pub checkpoints: u32,
}
