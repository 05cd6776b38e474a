//! Headless grid battle runner.
//!
//! Fights battlefields read from text files and prints JSON results on
//! stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Battle score and minimal flawless elf attack power
//! cargo run -p skirmish_headless -- solve --map battle.txt
//!
//! # Fight once and show the final battlefield
//! cargo run -p skirmish_headless -- simulate --map battle.txt --show
//!
//! # Calibrate goblins on 8 threads with custom rules
//! cargo run -p skirmish_headless -- --config rules.ron calibrate --map battle.txt --faction goblin --parallel 8
//!
//! # Check whether losses come back above the flawless power
//! cargo run -p skirmish_headless -- audit --map battle.txt --from 4 --to 40
//!
//! # Replay a battle and compare state hashes
//! cargo run -p skirmish_headless -- verify --map battle.txt --runs 10
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skirmish_core::config::SimConfig;
use skirmish_core::factions::Faction;
use skirmish_headless::{
    audit_parallel, calibrate_parallel, load_config, log_filter, solve, verify_parallel, Result,
    Scenario,
};

#[derive(Parser)]
#[command(name = "skirmish")]
#[command(about = "Headless grid battle simulator and attack-power calibrator")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// RON file with simulation rules
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fight the battle, then calibrate, and print both answers
    Solve {
        /// Battlefield file
        #[arg(short, long)]
        map: PathBuf,

        /// Worker threads for calibration (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: usize,

        /// Also write the report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fight the battle at the configured rules
    Simulate {
        /// Battlefield file
        #[arg(short, long)]
        map: PathBuf,

        /// Render the final battlefield to stderr
        #[arg(long)]
        show: bool,
    },

    /// Find the minimal attack power that wins without losses
    Calibrate {
        /// Battlefield file
        #[arg(short, long)]
        map: PathBuf,

        /// Faction to calibrate (overrides the config file)
        #[arg(short, long)]
        faction: Option<Faction>,

        /// Worker threads (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: usize,
    },

    /// Fight every power in a range to the end and report losses
    Audit {
        /// Battlefield file
        #[arg(short, long)]
        map: PathBuf,

        /// Faction to audit (overrides the config file)
        #[arg(long)]
        faction: Option<Faction>,

        /// First attack power
        #[arg(long)]
        from: u32,

        /// Last attack power
        #[arg(long)]
        to: u32,

        /// Worker threads (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: usize,
    },

    /// Replay the same battle several times and compare final states
    Verify {
        /// Battlefield file
        #[arg(short, long)]
        map: PathBuf,

        /// Number of replays
        #[arg(short, long, default_value = "5")]
        runs: usize,

        /// Worker threads (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for results)
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(log_filter(cli.verbose, rust_log.as_deref()))
        .init();

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "command failed");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SimConfig::default(),
    };

    match cli.command {
        Commands::Solve {
            map,
            parallel,
            output,
        } => {
            let scenario = load_scenario(&map, config)?;
            let report = solve(&scenario, parallel)?;
            if let Some(path) = output {
                report.save(&path)?;
                tracing::info!(path = %path.display(), "report saved");
            }
            println!("{}", report.to_json()?);
        }
        Commands::Simulate { map, show } => {
            let scenario = load_scenario(&map, config)?;
            let mut sim = scenario.simulation()?;
            let outcome = sim.run_to_completion()?;
            if show {
                eprintln!("{}", sim.render());
            }
            print_json(&outcome)?;
        }
        Commands::Calibrate {
            map,
            faction,
            parallel,
        } => {
            let mut scenario = load_scenario(&map, config)?;
            if let Some(faction) = faction {
                scenario.config.calibration.faction = faction;
            }
            let base = scenario.simulation()?;
            let result = calibrate_parallel(&base, &scenario.config.calibration, parallel)?;
            print_json(&result)?;
        }
        Commands::Audit {
            map,
            faction,
            from,
            to,
            parallel,
        } => {
            let scenario = load_scenario(&map, config)?;
            let faction = faction.unwrap_or(scenario.config.calibration.faction);
            let base = scenario.simulation()?;
            let audit = audit_parallel(&base, faction, from..=to, parallel)?;
            print_json(&audit)?;
        }
        Commands::Verify {
            map,
            runs,
            parallel,
        } => {
            let scenario = load_scenario(&map, config)?;
            let report = verify_parallel(&scenario.simulation()?, runs, parallel)?;
            if !report.deterministic {
                tracing::warn!(hashes = ?report.hashes, "replays diverged");
            }
            print_json(&report)?;
        }
    }

    Ok(())
}

fn load_scenario(map: &Path, config: SimConfig) -> Result<Scenario> {
    Ok(Scenario::load(map)?.with_config(config)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
