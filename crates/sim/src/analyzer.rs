use skyrace_shared::*;

/// Aggregate metrics describing how a race actually flew.
#[derive(Debug, Clone)]
pub struct RaceMetrics {
    /// Mean speed across all live aircraft and frames.
    pub avg_speed: f32,
    /// Fastest instantaneous speed seen in any frame.
    pub peak_speed: f32,
    /// Max altitude minus min altitude used by the field.
    pub altitude_range: f32,
    /// Fraction of aircraft-frames spent boosting.
    pub boost_duty: f32,
    /// Gates passed by the whole field per minute of race time.
    pub checkpoints_per_minute: f32,
    /// Total collision events.
    pub crash_count: u32,
    /// Times the front-runner changed between consecutive frames.
    pub lead_changes: u32,
    /// Tick of the first completed lap, if anyone finished one.
    pub first_lap_tick: Option<u32>,
}

/// Analyze a replay and compute race metrics.
pub fn analyze(replay: &Replay) -> RaceMetrics {
    let frames = &replay.frames;
    if frames.is_empty() {
        return RaceMetrics {
            avg_speed: 0.0,
            peak_speed: 0.0,
            altitude_range: 0.0,
            boost_duty: 0.0,
            checkpoints_per_minute: 0.0,
            crash_count: 0,
            lead_changes: 0,
            first_lap_tick: None,
        };
    }

    // --- Speed and altitude statistics ---
    let mut speed_sum = 0.0f32;
    let mut peak_speed = 0.0f32;
    let mut samples = 0u32;
    let mut boost_frames = 0u32;
    let mut min_alt = f32::MAX;
    let mut max_alt = f32::MIN;

    for frame in frames {
        for craft in &frame.aircraft {
            speed_sum += craft.speed;
            peak_speed = peak_speed.max(craft.speed);
            samples += 1;
            if craft.boost {
                boost_frames += 1;
            }
            min_alt = min_alt.min(craft.y);
            max_alt = max_alt.max(craft.y);
        }
    }

    let avg_speed = if samples > 0 {
        speed_sum / samples as f32
    } else {
        0.0
    };
    let boost_duty = if samples > 0 {
        boost_frames as f32 / samples as f32
    } else {
        0.0
    };
    let altitude_range = if samples > 0 { max_alt - min_alt } else { 0.0 };

    // --- Lead changes ---
    // The front-runner per frame by laps, then gates, as a viewer would see.
    let mut lead_changes = 0u32;
    let mut leader: Option<usize> = None;
    for frame in frames {
        let front = frame
            .aircraft
            .iter()
            .enumerate()
            .max_by_key(|(_, c)| (c.laps, c.checkpoints))
            .map(|(idx, _)| idx);
        if let (Some(prev), Some(now)) = (leader, front) {
            if prev != now {
                lead_changes += 1;
            }
        }
        leader = front;
    }

    // --- Event-derived metrics ---
    let crash_count = replay
        .events
        .iter()
        .filter(|e| matches!(e, RaceEvent::Collision { .. }))
        .count() as u32;

    let first_lap_tick = replay.events.iter().find_map(|e| match e {
        RaceEvent::LapCompleted { tick, .. } => Some(*tick),
        _ => None,
    });

    let total_gates: u32 = replay
        .events
        .iter()
        .filter(|e| matches!(e, RaceEvent::CheckpointReached { .. }))
        .count() as u32;
    let minutes = replay.result.final_tick as f32 / TICK_RATE as f32 / 60.0;
    let checkpoints_per_minute = if minutes > 0.0 {
        total_gates as f32 / minutes
    } else {
        0.0
    };

    RaceMetrics {
        avg_speed,
        peak_speed,
        altitude_range,
        boost_duty,
        checkpoints_per_minute,
        crash_count,
        lead_changes,
        first_lap_tick,
    }
}
