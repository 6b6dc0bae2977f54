use std::collections::HashMap;

use rayon::prelude::*;

use skyrace_shared::*;
use skyrace_sim::analyzer::{self, RaceMetrics};
use skyrace_sim::run_race;
use skyrace_sim::track::oval_path;

use crate::{resolve_pilots, CliError};

/// Race the same matchup across many seeds in parallel and print aggregate
/// standings and flight metrics.
pub fn cmd_sweep(pilot_names: &str, seeds: u64, laps: u32) -> Result<(), CliError> {
    // Validate the lineup once before fanning out.
    let lineup: Vec<String> = resolve_pilots(pilot_names)?
        .iter()
        .map(|p| p.name().to_string())
        .collect();

    let path = oval_path(12, 400.0, 80.0);

    let results: Vec<(Option<String>, RaceMetrics)> = (0..seeds)
        .into_par_iter()
        .map(|seed| {
            // Pilots carry mutable state, so each seed gets a fresh lineup.
            let mut pilots = resolve_pilots(pilot_names).expect("lineup validated above");
            let config = RaceConfig {
                seed,
                laps,
                pilot_names: lineup.clone(),
                ..Default::default()
            };
            let replay = run_race(&config, &path, &mut pilots);
            let winner = replay
                .result
                .winner
                .map(|idx| pilots[idx].name().to_string());
            (winner, analyzer::analyze(&replay))
        })
        .collect();

    let mut wins: HashMap<String, u32> = HashMap::new();
    for (winner, _) in &results {
        if let Some(name) = winner {
            *wins.entry(name.clone()).or_default() += 1;
        }
    }

    println!("{} seeds, lineup: {}", seeds, lineup.join(" vs "));
    for name in &lineup {
        let count = wins.get(name).copied().unwrap_or(0);
        println!(
            "  {:<12} {:>4} wins ({:.0}%)",
            name,
            count,
            count as f32 / seeds.max(1) as f32 * 100.0
        );
    }

    let count = results.len().max(1) as f32;
    let mean = |f: fn(&RaceMetrics) -> f32| results.iter().map(|(_, m)| f(m)).sum::<f32>() / count;
    println!("mean over seeds:");
    println!("  avg speed           {:.1}", mean(|m| m.avg_speed));
    println!("  boost duty          {:.1}%", mean(|m| m.boost_duty) * 100.0);
    println!(
        "  gates per minute    {:.1}",
        mean(|m| m.checkpoints_per_minute)
    );
    println!(
        "  crashes per race    {:.2}",
        mean(|m| m.crash_count as f32)
    );

    Ok(())
}
