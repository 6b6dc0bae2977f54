// Tick rate
pub const TICK_RATE: u32 = 50;
pub const DT: f32 = 1.0 / TICK_RATE as f32;

// Race
pub const RACE_DURATION_SECS: u32 = 300;
pub const MAX_TICKS: u32 = TICK_RATE * RACE_DURATION_SECS; // 15000
pub const DEFAULT_LAPS: u32 = 3;

// Airframe
pub const THRUST: f32 = 100_000.0;
pub const AIRCRAFT_MASS: f32 = 1_000.0;
pub const DRAG_COEFF: f32 = 0.5;
pub const BOOST_MULTIPLIER: f32 = 2.0;

// Control surfaces (degrees and degrees/second)
pub const PITCH_RATE: f32 = 100.0;
pub const YAW_RATE: f32 = 100.0;
pub const ROLL_RATE: f32 = 100.0;
pub const MAX_PITCH_ANGLE: f32 = 45.0;
pub const MAX_ROLL_ANGLE: f32 = 45.0;
pub const SMOOTHING_RATE: f32 = 2.0; // max coefficient change per second

// Track
pub const CHECKPOINT_RADIUS: f32 = 30.0;
pub const SPAWN_SPACING_MIN: f32 = 9.0;
pub const SPAWN_SPACING_MAX: f32 = 10.0;

// Crash/respawn sequence (racing mode)
pub const EXPLOSION_TICKS: u32 = TICK_RATE * 2; // aircraft hidden, explosion playing
pub const RESPAWN_HOLD_TICKS: u32 = TICK_RATE; // back on track but still frozen

// Training
pub const STEP_TIMEOUT: u32 = 300; // ticks allowed between checkpoints
pub const MAX_EPISODE_STEPS: u32 = 5000;
pub const CHECKPOINT_REWARD: f32 = 0.5;
pub const TIMEOUT_REWARD: f32 = 0.5;
pub const COLLISION_PENALTY: f32 = -1.0;

// Observation / action vectors
pub const OBS_SIZE: usize = 9;
pub const ACTION_SIZE: usize = 3;

// Frame streaming
pub const FRAME_INTERVAL: u32 = 2; // record every 2nd tick = 25fps
