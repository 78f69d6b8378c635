use anyhow::Result;
use clap::Parser;
use dose_core::{ReviveMode, Scenario, SimulationConfig};
use dose_io::JsonlLogger;
use dose_lib::scenarios::{Neutral, TapeSum};
use dose_lib::Simulation;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Simulation config file path
    #[arg(short, long, default_value = "dose.toml")]
    config: PathBuf,

    /// Research scenario supplying fitness and hooks
    #[arg(short, long, value_enum, default_value = "tape-sum")]
    scenario: ScenarioKind,

    /// Override the number of generations to run
    #[arg(short, long)]
    generations: Option<u64>,

    /// Override the RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Frozen population to restore before running
    #[arg(long)]
    revive: Option<PathBuf>,

    /// Append revived organisms instead of replacing the population
    #[arg(long)]
    append: bool,

    /// Buried ecosystem to restore before running
    #[arg(long)]
    excavate: Option<PathBuf>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ScenarioKind {
    TapeSum,
    Neutral,
}

fn main() -> Result<()> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => tracing_subscriber::fmt().with_env_filter(filter).init(),
        Err(_) => dose_core::init_logging(),
    }

    let args = Args::parse();

    let mut config = if args.config.exists() {
        SimulationConfig::from_file(&args.config)?
    } else {
        tracing::warn!(path = %args.config.display(), "Config not found, using defaults");
        SimulationConfig::default()
    };
    if let Some(generations) = args.generations {
        config.run.max_generations = generations;
    }
    if let Some(seed) = args.seed {
        config.run.seed = Some(seed);
    }
    config.validate()?;

    match args.scenario {
        ScenarioKind::TapeSum => run(config, TapeSum::default(), &args),
        ScenarioKind::Neutral => run(
            config,
            Neutral {
                move_probability: 0.1,
            },
            &args,
        ),
    }
}

fn run<S: Scenario>(config: SimulationConfig, scenario: S, args: &Args) -> Result<()> {
    let logger = JsonlLogger::new_at(
        Path::new(&config.run.checkpoint_dir),
        &config.run.name,
        &config.fingerprint(),
    )?;
    tracing::info!(path = %logger.path().display(), "Logging generations");

    let mut simulation = Simulation::new(config, scenario)?.with_logger(Box::new(logger));

    if let Some(path) = &args.excavate {
        simulation.excavate(path)?;
    }
    if let Some(path) = &args.revive {
        let mode = if args.append {
            ReviveMode::Append
        } else {
            ReviveMode::Replace
        };
        simulation.revive(path, None, mode)?;
    }

    simulation.run()?;

    let metrics = simulation.metrics();
    println!(
        "Finished {} generations: {} organisms alive, {} executions, {} faults",
        simulation.generation(),
        metrics.organisms(),
        metrics.organisms_executed(),
        metrics.faults()
    );
    for report in simulation.last_reports() {
        println!(
            "  {}: size {} mean fitness {:.3} max {:.3}",
            report.population, report.size, report.mean_fitness, report.max_fitness
        );
    }
    Ok(())
}
