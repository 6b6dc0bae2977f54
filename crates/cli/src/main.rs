mod logger;
mod sweep;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

use skyrace_shared::*;
use skyrace_sim::analyzer;
use skyrace_sim::pilots::{CruiserPolicy, RacerPolicy};
use skyrace_sim::track::oval_path;
use skyrace_sim::{run_race, run_rollouts, DoNothingPolicy, Policy};

#[derive(Parser)]
#[command(name = "skyrace", about = "Aircraft checkpoint racing CLI")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a race between scripted pilots
    Run {
        /// Comma-separated pilot names (racer, cruiser, do_nothing)
        #[arg(long, default_value = "racer,cruiser")]
        pilots: String,

        /// Random seed for the race
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Laps required to win
        #[arg(long, default_value_t = DEFAULT_LAPS)]
        laps: u32,

        /// Number of gates on the built-in oval
        #[arg(long, default_value_t = 12)]
        gates: usize,

        /// Output path for replay JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run training-mode episodes for a single pilot
    Rollout {
        /// Pilot name (racer, cruiser, do_nothing)
        #[arg(long, default_value = "racer")]
        pilot: String,

        /// Number of episodes to run
        #[arg(long, default_value_t = 10)]
        episodes: usize,

        /// Random seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Number of gates on the built-in oval
        #[arg(long, default_value_t = 12)]
        gates: usize,
    },

    /// Compute metrics from a saved replay
    Analyze {
        /// Path to a replay JSON file
        replay: PathBuf,
    },

    /// Race the same matchup across many seeds in parallel
    Sweep {
        /// Comma-separated pilot names
        #[arg(long, default_value = "racer,cruiser")]
        pilots: String,

        /// Number of seeds to race
        #[arg(long, default_value_t = 32)]
        seeds: u64,

        /// Laps required to win
        #[arg(long, default_value_t = 1)]
        laps: u32,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("unknown pilot '{0}'. Valid options: racer, cruiser, do_nothing")]
    UnknownPilot(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("replay parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Resolve a pilot name to a boxed Policy trait object.
fn resolve_pilot(name: &str) -> Result<Box<dyn Policy>, CliError> {
    match name.trim() {
        "racer" => Ok(Box::new(RacerPolicy::new())),
        "cruiser" => Ok(Box::new(CruiserPolicy::new())),
        "do_nothing" => Ok(Box::new(DoNothingPolicy)),
        other => Err(CliError::UnknownPilot(other.to_string())),
    }
}

fn resolve_pilots(names: &str) -> Result<Vec<Box<dyn Policy>>, CliError> {
    names.split(',').map(resolve_pilot).collect()
}

fn cmd_run(
    pilots: &str,
    seed: u64,
    laps: u32,
    gates: usize,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let mut pilots = resolve_pilots(pilots)?;
    let config = RaceConfig {
        seed,
        laps,
        pilot_names: pilots.iter().map(|p| p.name().to_string()).collect(),
        ..Default::default()
    };
    let path = oval_path(gates, 400.0, 80.0);

    let replay = run_race(&config, &path, &mut pilots);

    let result = &replay.result;
    println!(
        "Race over at tick {} ({:.1}s): {:?}",
        result.final_tick,
        result.final_tick as f32 * DT,
        result.reason
    );
    for (place, stats) in result.standings.iter().enumerate() {
        println!(
            "  {}. {:<12} laps {:<3} gates {:<4} crashes {}",
            place + 1,
            stats.name,
            stats.laps,
            stats.checkpoints,
            stats.collisions
        );
    }

    if let Some(path) = output {
        std::fs::write(&path, serde_json::to_string(&replay)?)?;
        println!("Replay written to {}", path.display());
    }
    Ok(())
}

fn cmd_rollout(pilot: &str, episodes: usize, seed: u64, gates: usize) -> Result<(), CliError> {
    let mut pilot = resolve_pilot(pilot)?;
    let config = RaceConfig {
        seed,
        training: true,
        randomize_spawns: true,
        pilot_names: vec![pilot.name().to_string()],
        ..Default::default()
    };
    let path = oval_path(gates, 400.0, 80.0);

    let reports = run_rollouts(&config, &path, pilot.as_mut(), episodes);

    println!("{} episodes for '{}':", reports.len(), pilot.name());
    for report in &reports {
        println!(
            "  episode {:<4} steps {:<6} gates {:<4} reward {:+.3}",
            report.episode, report.steps, report.checkpoints, report.reward
        );
    }
    let mean_reward: f32 =
        reports.iter().map(|r| r.reward).sum::<f32>() / reports.len().max(1) as f32;
    println!("mean episode reward: {mean_reward:+.3}");
    Ok(())
}

fn cmd_analyze(replay_path: &PathBuf) -> Result<(), CliError> {
    let raw = std::fs::read_to_string(replay_path)?;
    let replay: Replay = serde_json::from_str(&raw)?;
    let metrics = analyzer::analyze(&replay);

    println!("Replay: {}", replay_path.display());
    println!("  final tick          {}", replay.result.final_tick);
    println!("  avg speed           {:.1}", metrics.avg_speed);
    println!("  peak speed          {:.1}", metrics.peak_speed);
    println!("  altitude range      {:.1}", metrics.altitude_range);
    println!("  boost duty          {:.1}%", metrics.boost_duty * 100.0);
    println!("  gates per minute    {:.1}", metrics.checkpoints_per_minute);
    println!("  crashes             {}", metrics.crash_count);
    println!("  lead changes        {}", metrics.lead_changes);
    match metrics.first_lap_tick {
        Some(tick) => println!("  first lap at        {:.1}s", tick as f32 * DT),
        None => println!("  first lap at        -"),
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    let outcome = match cli.command {
        Commands::Run {
            pilots,
            seed,
            laps,
            gates,
            output,
        } => cmd_run(&pilots, seed, laps, gates, output),
        Commands::Rollout {
            pilot,
            episodes,
            seed,
            gates,
        } => cmd_rollout(&pilot, episodes, seed, gates),
        Commands::Analyze { replay } => cmd_analyze(&replay),
        Commands::Sweep {
            pilots,
            seeds,
            laps,
        } => sweep::cmd_sweep(&pilots, seeds, laps),
    };

    if let Err(err) = outcome {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
