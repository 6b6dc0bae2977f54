use skyrace_shared::*;

use crate::physics::RaceState;
use crate::policy::Policy;
use crate::track::RacePath;

/// Run a deterministic race between the given pilots on the given path.
pub fn run_race(config: &RaceConfig, path: &RacePath, pilots: &mut [Box<dyn Policy>]) -> Replay {
    assert!(!pilots.is_empty(), "a race needs at least one pilot");
    let control_period = config.control_period.max(1);

    let mut state = RaceState::new(config.clone(), path, pilots.len());
    let mut frames = Vec::new();
    let mut events = state.drain_events();
    let mut actions = vec![Action::none(); pilots.len()];

    // Capture initial frame
    frames.push(state.snapshot());

    for tick in 0..config.max_ticks {
        // Sample fresh decisions at the control period; hold them in between.
        if tick % control_period == 0 {
            for (idx, pilot) in pilots.iter_mut().enumerate() {
                actions[idx] = pilot.act(&state.observe(idx));
            }
        }

        state.step(&actions);
        events.append(&mut state.drain_events());

        if state.tick % FRAME_INTERVAL == 0 {
            frames.push(state.snapshot());
        }

        if state.is_terminal() {
            // Capture final frame
            if state.tick % FRAME_INTERVAL != 0 {
                frames.push(state.snapshot());
            }
            break;
        }
    }

    let (reason, winner) = state.outcome();
    let standings = standings(&state, pilots);
    log::info!(
        "race over at tick {}: {:?}, winner {:?}",
        state.tick,
        reason,
        winner.map(|w| pilots[w].name().to_string())
    );

    Replay {
        config: config.clone(),
        frames,
        events,
        result: RaceResult {
            reason,
            winner,
            final_tick: state.tick,
            standings,
        },
    }
}

/// Run training-mode episodes for a single pilot until `episodes` of them
/// have finished (timeout, collision, or step budget).
pub fn run_rollouts(
    config: &RaceConfig,
    path: &RacePath,
    pilot: &mut dyn Policy,
    episodes: usize,
) -> Vec<EpisodeReport> {
    assert!(config.training, "rollouts require training mode");
    assert!(episodes > 0, "requested zero episodes");
    let control_period = config.control_period.max(1);

    let mut state = RaceState::new(config.clone(), path, 1);
    state.drain_events();
    let mut reports = Vec::with_capacity(episodes);
    let mut action = Action::none();

    // Generous stop-gap so a pathological config cannot spin forever.
    let tick_budget = episodes as u32 * config.sim_config.max_episode_steps * 2;

    for tick in 0..tick_budget {
        if tick % control_period == 0 {
            action = pilot.act(&state.observe(0));
        }
        state.step(&[action]);

        reports.append(&mut state.take_episode_reports());
        if reports.len() >= episodes {
            reports.truncate(episodes);
            break;
        }
    }

    reports
}

fn standings(state: &RaceState, pilots: &[Box<dyn Policy>]) -> Vec<PilotStats> {
    state
        .ranking()
        .into_iter()
        .map(|idx| {
            let craft = &state.aircraft[idx];
            PilotStats {
                aircraft: idx,
                name: pilots[idx].name().to_string(),
                laps: craft.laps,
                checkpoints: craft.checkpoints_passed,
                collisions: craft.collisions,
                boost_ticks: craft.boost_ticks,
                episodes: craft.episodes,
                total_reward: craft.total_reward,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::DoNothingPolicy;
    use crate::track::oval_path;

    #[test]
    fn test_race_completes_and_records_frames() {
        let config = RaceConfig {
            seed: 5,
            laps: 1,
            max_ticks: TICK_RATE * 10,
            ..Default::default()
        };
        let path = oval_path(6, 400.0, 80.0);
        let mut pilots: Vec<Box<dyn Policy>> = vec![Box::new(DoNothingPolicy)];

        let replay = run_race(&config, &path, &mut pilots);

        assert!(replay.result.final_tick <= config.max_ticks);
        // ~25 frames per second plus the initial one.
        assert!(replay.frames.len() as u32 >= replay.result.final_tick / FRAME_INTERVAL);
        assert_eq!(replay.result.standings.len(), 1);
        assert_eq!(replay.result.standings[0].name, "do_nothing");
    }

    #[test]
    fn test_control_period_limits_decision_rate() {
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::sync::Arc;

        // A pilot that counts how often it is asked to decide.
        struct Counting(Arc<AtomicU32>);
        impl Policy for Counting {
            fn name(&self) -> &str {
                "counting"
            }
            fn act(&mut self, _obs: &Observation) -> Action {
                self.0.fetch_add(1, Ordering::Relaxed);
                Action::none()
            }
        }

        let config = RaceConfig {
            laps: 1,
            max_ticks: 100,
            control_period: 5,
            ..Default::default()
        };
        let path = oval_path(6, 400.0, 80.0);
        let decisions = Arc::new(AtomicU32::new(0));
        let mut pilots: Vec<Box<dyn Policy>> = vec![Box::new(Counting(decisions.clone()))];
        run_race(&config, &path, &mut pilots);

        // 100 ticks at one decision per 5 ticks.
        assert_eq!(decisions.load(Ordering::Relaxed), 20);
    }

    #[test]
    fn test_rollouts_return_requested_episode_count() {
        let config = RaceConfig {
            seed: 9,
            training: true,
            randomize_spawns: true,
            sim_config: SimConfig {
                step_timeout: 40,
                ..Default::default()
            },
            ..Default::default()
        };
        let path = oval_path(6, 400.0, 80.0);
        let mut pilot = DoNothingPolicy;

        let reports = run_rollouts(&config, &path, &mut pilot, 3);
        assert_eq!(reports.len(), 3);
        for report in &reports {
            // A do-nothing pilot can only end an episode by timing out or
            // crashing, both well within the step budget.
            assert!(report.steps <= config.sim_config.max_episode_steps);
            assert!(report.reward <= TIMEOUT_REWARD + 1e-6);
        }
    }

    #[test]
    #[should_panic(expected = "training mode")]
    fn test_rollouts_reject_racing_config() {
        let config = RaceConfig::default();
        let path = oval_path(6, 400.0, 80.0);
        run_rollouts(&config, &path, &mut DoNothingPolicy, 1);
    }
}
