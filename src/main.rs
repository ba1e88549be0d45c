//! A Piece of Memory headless driver
//!
//! Runs the simulation at the fixed timestep with the autopilot as the input
//! source, optionally streaming render snapshots as JSON lines, and prints a
//! JSON run summary at the end.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::io::{self, BufWriter, Write};

    use anyhow::{Context, Result, ensure};
    use clap::Parser;
    use serde::Serialize;

    use piece_of_memory::consts::SIM_DT;
    use piece_of_memory::sim::{
        GameEvent, GamePhase, GameState, LEVEL_COUNT, Outcome, Stepper, start_level,
    };
    use piece_of_memory::{Autopilot, Tuning};

    #[derive(Parser, Debug)]
    #[command(name = "piece-of-memory")]
    #[command(about = "Headless run of the flower-defense simulation, played by the autopilot")]
    pub struct Cli {
        /// Seed for the simulation RNG
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Maximum number of fixed ticks to simulate (60 per second)
        #[arg(long, default_value_t = 36_000)]
        ticks: u64,
        /// Level to start on
        #[arg(long, default_value_t = 1)]
        level: u32,
        /// Override the collectible drop chance (0.0..=1.0)
        #[arg(long)]
        drop_chance: Option<f64>,
        /// Emit a JSON snapshot line every N ticks
        #[arg(long)]
        snapshot_every: Option<u64>,
        /// Print the effective tuning as JSON and exit
        #[arg(long, default_value_t = false)]
        print_tuning: bool,
        /// Restart from level 1 on game over instead of quitting
        #[arg(long, default_value_t = false)]
        restart: bool,
    }

    #[derive(Debug, Default, Serialize)]
    struct RunSummary {
        seed: u64,
        ticks: u64,
        seconds: f64,
        final_level: u32,
        phase: Option<GamePhase>,
        outcome: Option<Outcome>,
        message: String,
        enemies_left: usize,
        levels_completed: u32,
        enemies_killed: u32,
        enemies_escaped: u32,
        drops: u32,
        pickups: u32,
        boss_hits: u32,
        objective_hits: u32,
        clashes: u32,
        special_attacks: u32,
    }

    impl RunSummary {
        fn record(&mut self, event: &GameEvent) {
            match event {
                GameEvent::EnemyKilled { .. } => self.enemies_killed += 1,
                GameEvent::EnemyEscaped { .. } => self.enemies_escaped += 1,
                GameEvent::CollectibleDropped { .. } => self.drops += 1,
                GameEvent::Collected { .. } => self.pickups += 1,
                GameEvent::BossHit { .. } => self.boss_hits += 1,
                GameEvent::ObjectiveDamaged { .. } => self.objective_hits += 1,
                GameEvent::ProjectileClash => self.clashes += 1,
                GameEvent::SpecialAttackStarted => self.special_attacks += 1,
                GameEvent::LevelComplete { .. } => self.levels_completed += 1,
                GameEvent::EnemySpawned { .. }
                | GameEvent::CollectibleExpired { .. }
                | GameEvent::BossDefeated
                | GameEvent::SpecialAttackEnded
                | GameEvent::GameOver { .. } => {}
            }
        }
    }

    pub fn run(cli: &Cli) -> Result<()> {
        ensure!(cli.ticks > 0, "--ticks must be > 0");
        ensure!(
            (1..=LEVEL_COUNT).contains(&cli.level),
            "--level must be between 1 and {LEVEL_COUNT}, got {}",
            cli.level
        );
        if let Some(chance) = cli.drop_chance {
            ensure!(
                (0.0..=1.0).contains(&chance),
                "--drop-chance must be within 0.0..=1.0, got {chance}"
            );
        }
        ensure!(
            cli.snapshot_every != Some(0),
            "--snapshot-every must be > 0"
        );

        let mut tuning = Tuning::default();
        if let Some(chance) = cli.drop_chance {
            tuning.drop_chance = chance;
        }

        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());

        if cli.print_tuning {
            serde_json::to_writer_pretty(&mut out, &tuning.sanitized())
                .context("failed to serialize tuning")?;
            writeln!(out)?;
            return out.flush().context("failed to flush stdout");
        }

        let mut state = GameState::with_tuning(cli.seed, tuning);
        if cli.level > 1 {
            start_level(&mut state, cli.level);
        }
        log::info!("Seed {}: running up to {} ticks", cli.seed, cli.ticks);

        let mut pilot = Autopilot {
            restart_on_game_over: cli.restart,
        };
        let mut stepper = Stepper::default();
        let mut summary = RunSummary {
            seed: cli.seed,
            ..Default::default()
        };

        while state.time_ticks < cli.ticks && !state.quit_requested {
            let input = pilot.next_input(&state);
            stepper.advance(&mut state, &input, SIM_DT);
            for event in &state.events {
                summary.record(event);
            }

            if let Some(every) = cli.snapshot_every {
                if state.time_ticks % every == 0 {
                    serde_json::to_writer(&mut out, &state.snapshot())
                        .context("failed to serialize snapshot")?;
                    writeln!(out).context("failed to write snapshot")?;
                }
            }
        }

        summary.ticks = state.time_ticks;
        summary.seconds = state.clock;
        summary.final_level = state.level;
        summary.phase = Some(state.phase);
        summary.outcome = state.outcome;
        summary.message = state.message.clone();
        summary.enemies_left = state.snapshot().count_enemies();
        log::info!(
            "Finished after {} ticks on level {} ({:?})",
            summary.ticks,
            summary.final_level,
            state.phase
        );

        serde_json::to_writer_pretty(&mut out, &summary).context("failed to serialize summary")?;
        writeln!(out)?;
        out.flush().context("failed to flush stdout")
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser;

    env_logger::init();
    let cli = native::Cli::parse();
    native::run(&cli)
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by a browser frontend; there is no wasm binary
}
