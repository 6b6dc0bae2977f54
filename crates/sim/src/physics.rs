use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg64;

use skyrace_shared::*;

use crate::flight;
use crate::track::{RacePath, Track};

/// Full simulation state for one race area: the checkpoint track plus every
/// aircraft flying it. Strictly single-threaded and tick-driven; collaborators
/// are injected at construction, never discovered.
#[derive(Debug, Clone)]
pub struct RaceState {
    pub config: RaceConfig,
    pub track: Track,
    pub aircraft: Vec<AircraftState>,
    pub tick: u32,
    rng: Pcg64,
    events: Vec<RaceEvent>,
    episode_reports: Vec<EpisodeReport>,
}

impl RaceState {
    /// Build the track from the injected path and spawn `num_aircraft`
    /// aircraft on their starting grid. An empty grid is a setup error.
    pub fn new(config: RaceConfig, path: &RacePath, num_aircraft: usize) -> Self {
        assert!(num_aircraft > 0, "no aircraft in the race area");

        let track = Track::from_path(path);
        let mut state = Self {
            rng: Pcg64::seed_from_u64(config.seed),
            track,
            aircraft: (0..num_aircraft).map(|_| AircraftState::new()).collect(),
            tick: 0,
            config,
            events: Vec::new(),
            episode_reports: Vec::new(),
        };
        for idx in 0..num_aircraft {
            let randomize = state.config.training && state.config.randomize_spawns;
            state.begin_episode(idx, randomize);
        }
        state
    }

    /// Advance one fixed tick for every aircraft.
    pub fn step(&mut self, actions: &[Action]) {
        assert_eq!(
            actions.len(),
            self.aircraft.len(),
            "one action per aircraft"
        );
        for (idx, action) in actions.iter().enumerate() {
            self.step_aircraft(idx, action);
        }
        self.tick += 1;
    }

    fn step_aircraft(&mut self, idx: usize, action: &Action) {
        match self.aircraft[idx].condition {
            Condition::Exploding { until } => {
                if self.tick >= until {
                    // Explosion played out: back to the grid, still frozen
                    // for the respawn hold.
                    self.place_at_spawn(idx);
                    let hold = self.config.sim_config.respawn_hold_ticks;
                    let craft = &mut self.aircraft[idx];
                    craft.velocity = Vec3::ZERO;
                    craft.condition = Condition::Resetting {
                        until: self.tick + hold,
                    };
                }
                return;
            }
            Condition::Resetting { until } => {
                if self.tick >= until {
                    let craft = &mut self.aircraft[idx];
                    craft.condition = Condition::Active;
                    craft.frozen = false;
                    self.emit(RaceEvent::Respawned {
                        aircraft: idx,
                        tick: self.tick,
                    });
                } else {
                    return;
                }
            }
            Condition::Active => {}
        }

        if self.aircraft[idx].frozen {
            // Frozen aircraft ignore input and produce no thrust.
            self.aircraft[idx].velocity = Vec3::ZERO;
            return;
        }

        let ignited = action.boost && !self.aircraft[idx].boost;
        {
            let craft = &mut self.aircraft[idx];
            craft.boost = action.boost;
            if action.boost {
                craft.boost_ticks += 1;
            }
        }
        if ignited {
            self.emit(RaceEvent::BoostIgnited {
                aircraft: idx,
                tick: self.tick,
            });
        }

        let cfg = self.config.sim_config;
        {
            let craft = &mut self.aircraft[idx];
            flight::steer(craft, action, &cfg, DT);
            flight::integrate_body(craft, &cfg, DT);
        }

        // Terrain strike
        if self.aircraft[idx].position.y <= 0.0 {
            self.handle_collision(idx);
            return;
        }

        // Gate proximity doubles as the crossing trigger.
        let next = self.aircraft[idx].next_checkpoint;
        if self.vector_to_next_checkpoint(idx).length() < cfg.checkpoint_radius {
            self.on_checkpoint_trigger(idx, next);
        }

        if self.config.training {
            let penalty = cfg.step_penalty();
            let (timed_out, maxed_out) = {
                let craft = &mut self.aircraft[idx];
                craft.episode_steps += 1;
                craft.episode_reward += penalty;
                craft.total_reward += penalty;
                (
                    craft.episode_steps > craft.step_deadline,
                    craft.episode_steps >= cfg.max_episode_steps,
                )
            };
            if timed_out {
                {
                    let craft = &mut self.aircraft[idx];
                    craft.episode_reward += cfg.timeout_reward;
                    craft.total_reward += cfg.timeout_reward;
                }
                self.emit(RaceEvent::StepTimeout {
                    aircraft: idx,
                    tick: self.tick,
                });
                let randomize = self.config.randomize_spawns;
                self.begin_episode(idx, randomize);
            } else if maxed_out {
                let randomize = self.config.randomize_spawns;
                self.begin_episode(idx, randomize);
            }
        }
    }

    /// External overlap event: an aircraft touched the trigger volume of
    /// `checkpoint`. Touching any gate other than the aircraft's next one is
    /// a stale or duplicate overlap and is silently dropped.
    pub fn on_checkpoint_trigger(&mut self, idx: usize, checkpoint: usize) {
        assert!(
            checkpoint < self.track.len(),
            "checkpoint index {} out of range (track has {})",
            checkpoint,
            self.track.len()
        );
        if checkpoint != self.aircraft[idx].next_checkpoint {
            return;
        }

        let is_finish = self.track.checkpoint(checkpoint).is_finish;
        let count = self.track.len();
        let cfg = self.config.sim_config;
        let training = self.config.training;

        let completed_lap = {
            let craft = &mut self.aircraft[idx];
            craft.checkpoints_passed += 1;
            craft.episode_checkpoints += 1;
            if is_finish {
                craft.laps += 1;
            }
            craft.next_checkpoint = (craft.next_checkpoint + 1) % count;
            if training {
                craft.episode_reward += cfg.checkpoint_reward;
                craft.total_reward += cfg.checkpoint_reward;
                craft.step_deadline = craft.episode_steps + cfg.step_timeout;
            }
            is_finish.then_some(craft.laps)
        };

        self.emit(RaceEvent::CheckpointReached {
            aircraft: idx,
            checkpoint,
            tick: self.tick,
        });
        if let Some(lap) = completed_lap {
            self.emit(RaceEvent::LapCompleted {
                aircraft: idx,
                lap,
                tick: self.tick,
            });
        }
    }

    /// External collision event: the aircraft hit something that was not
    /// another aircraft. Training ends the episode with a penalty; racing
    /// runs the explosion/respawn sequence.
    pub fn report_collision(&mut self, idx: usize) {
        self.handle_collision(idx);
    }

    fn handle_collision(&mut self, idx: usize) {
        self.aircraft[idx].collisions += 1;
        self.emit(RaceEvent::Collision {
            aircraft: idx,
            tick: self.tick,
        });

        if self.config.training {
            let penalty = self.config.sim_config.collision_penalty;
            {
                let craft = &mut self.aircraft[idx];
                craft.episode_reward += penalty;
                craft.total_reward += penalty;
            }
            let randomize = self.config.randomize_spawns;
            self.begin_episode(idx, randomize);
        } else {
            let until = self.tick + self.config.sim_config.explosion_ticks;
            {
                let craft = &mut self.aircraft[idx];
                craft.frozen = true;
                craft.velocity = Vec3::ZERO;
                craft.boost = false;
                craft.condition = Condition::Exploding { until };
            }
            self.emit(RaceEvent::Exploded {
                aircraft: idx,
                tick: self.tick,
            });
        }
    }

    /// Stop an aircraft from moving or taking actions (pause, pre-race
    /// countdown). Only meaningful outside training.
    pub fn freeze(&mut self, idx: usize) {
        assert!(
            !self.config.training,
            "freeze/thaw is not supported in training"
        );
        let craft = &mut self.aircraft[idx];
        craft.frozen = true;
        craft.velocity = Vec3::ZERO;
        craft.boost = false;
    }

    /// Resume movement and actions after a freeze.
    pub fn thaw(&mut self, idx: usize) {
        assert!(
            !self.config.training,
            "freeze/thaw is not supported in training"
        );
        self.aircraft[idx].frozen = false;
    }

    /// Reset one aircraft for a fresh episode: stop it, optionally pick a
    /// random next gate, and put it back on the grid.
    pub fn begin_episode(&mut self, idx: usize, randomize: bool) {
        // Close out the episode that just ended, if any steps were taken.
        if self.aircraft[idx].episode_steps > 0 {
            let craft = &self.aircraft[idx];
            self.episode_reports.push(EpisodeReport {
                episode: craft.episodes,
                steps: craft.episode_steps,
                reward: craft.episode_reward,
                checkpoints: craft.episode_checkpoints,
            });
        }

        if randomize {
            self.aircraft[idx].next_checkpoint = self.track.random_next_index(&mut self.rng);
        }
        self.place_at_spawn(idx);

        let timeout = self.config.sim_config.step_timeout;
        let craft = &mut self.aircraft[idx];
        craft.velocity = Vec3::ZERO;
        craft.smooth_pitch = 0.0;
        craft.smooth_yaw = 0.0;
        craft.smooth_roll = 0.0;
        craft.boost = false;
        craft.frozen = false;
        craft.condition = Condition::Active;
        craft.episode_steps = 0;
        craft.episode_checkpoints = 0;
        craft.step_deadline = timeout;
        craft.episode_reward = 0.0;
        craft.episodes += 1;

        self.emit(RaceEvent::EpisodeReset {
            aircraft: idx,
            tick: self.tick,
        });
    }

    fn place_at_spawn(&mut self, idx: usize) {
        let total = self.aircraft.len();
        let cfg = self.config.sim_config;
        let (position, orientation) = self.track.start_pose_for(
            self.aircraft[idx].next_checkpoint,
            idx,
            total,
            (cfg.spawn_spacing_min, cfg.spawn_spacing_max),
            &mut self.rng,
        );
        let craft = &mut self.aircraft[idx];
        craft.position = position;
        craft.set_orientation(orientation);
    }

    /// World-space vector to the aircraft's next gate, expressed in the
    /// aircraft's local frame.
    pub fn vector_to_next_checkpoint(&self, idx: usize) -> Vec3 {
        let craft = &self.aircraft[idx];
        let gate = self.track.checkpoint(craft.next_checkpoint);
        craft.orientation().inverse() * (gate.position - craft.position)
    }

    pub fn snapshot(&self) -> ReplayFrame {
        ReplayFrame {
            tick: self.tick,
            aircraft: self.aircraft.iter().map(AircraftSnapshot::from).collect(),
        }
    }

    /// Race is over once someone has the lap target (racing mode) or the
    /// tick budget runs out.
    pub fn is_terminal(&self) -> bool {
        if self.tick >= self.config.max_ticks {
            return true;
        }
        !self.config.training && self.aircraft.iter().any(|a| a.laps >= self.config.laps)
    }

    /// Aircraft indexes ranked best-first: laps, then gates passed, then
    /// closest to its next gate.
    pub fn ranking(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.aircraft.len()).collect();
        order.sort_by(|&a, &b| {
            let ca = &self.aircraft[a];
            let cb = &self.aircraft[b];
            cb.laps
                .cmp(&ca.laps)
                .then(cb.checkpoints_passed.cmp(&ca.checkpoints_passed))
                .then_with(|| {
                    let da = self.distance_to_next(a);
                    let db = self.distance_to_next(b);
                    da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                })
        });
        order
    }

    fn distance_to_next(&self, idx: usize) -> f32 {
        let craft = &self.aircraft[idx];
        (self.track.checkpoint(craft.next_checkpoint).position - craft.position).length()
    }

    pub fn outcome(&self) -> (RaceEndReason, Option<usize>) {
        let leader = self.ranking().into_iter().next();
        let finished = !self.config.training
            && self.aircraft.iter().any(|a| a.laps >= self.config.laps);
        if finished {
            (RaceEndReason::LapsCompleted, leader)
        } else {
            (RaceEndReason::Timeout, leader)
        }
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<RaceEvent> {
        std::mem::take(&mut self.events)
    }

    /// Take the reports of every episode completed since the last call.
    pub fn take_episode_reports(&mut self) -> Vec<EpisodeReport> {
        std::mem::take(&mut self.episode_reports)
    }

    fn emit(&mut self, event: RaceEvent) {
        log::debug!("tick {}: {:?}", self.tick, event);
        self.events.push(event);
    }
}
