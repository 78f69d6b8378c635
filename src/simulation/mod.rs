//! The per-generation driver.
//!
//! One [`Simulation::step`] runs, in order: the grid environment hooks,
//! genome execution for every living organism, ageing, each population's
//! generation step, the grid movement hooks, then logging and checkpoints
//! at their configured frequencies.

mod execute;
mod init;

use dose_core::{
    Ecosystem, GenerationLogger, GenerationReport, InstructionTable, Metrics, NullLogger,
    OrganismLogic, Population, ReviveMode, Scenario, SimulationConfig,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub use execute::{run_organism, ExecutionOutcome};

pub struct Simulation<S: Scenario> {
    config: SimulationConfig,
    scenario: S,
    table: InstructionTable,
    ecosystem: Ecosystem,
    populations: Vec<Population>,
    generation: u64,
    fingerprint: String,
    rng: ChaCha8Rng,
    metrics: Metrics,
    logger: Box<dyn GenerationLogger>,
    last_reports: Vec<GenerationReport>,
}

impl<S: Scenario> Simulation<S> {
    /// Validates `config`, builds the grid and deploys every population.
    pub fn new(config: SimulationConfig, scenario: S) -> anyhow::Result<Self> {
        config.validate()?;

        let mut rng = match config.run.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None if config.run.deterministic => ChaCha8Rng::seed_from_u64(0),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut ecosystem = Ecosystem::new(config.dimensions())?;
        let populations = init::deploy_populations(&config, &mut ecosystem, &scenario, &mut rng)?;

        tracing::info!(
            run = %config.run.name,
            dimensions = %ecosystem.dimensions(),
            populations = populations.len(),
            organisms = ecosystem.total_organisms(),
            "Simulation initialised"
        );

        Ok(Self {
            table: config.instruction_table(),
            fingerprint: config.fingerprint(),
            config,
            scenario,
            ecosystem,
            populations,
            generation: 0,
            rng,
            metrics: Metrics::new(),
            logger: Box::new(NullLogger),
            last_reports: Vec::new(),
        })
    }

    /// Replaces the logging sink invoked at `run.log_frequency`.
    #[must_use]
    pub fn with_logger(mut self, logger: Box<dyn GenerationLogger>) -> Self {
        self.logger = logger;
        self
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[must_use]
    pub fn scenario(&self) -> &S {
        &self.scenario
    }

    #[must_use]
    pub fn ecosystem(&self) -> &Ecosystem {
        &self.ecosystem
    }

    #[must_use]
    pub fn populations(&self) -> &[Population] {
        &self.populations
    }

    /// Mutable access for scripted setups. Call [`Simulation::recount`]
    /// after moving or removing organisms.
    pub fn populations_mut(&mut self) -> &mut [Population] {
        &mut self.populations
    }

    #[must_use]
    pub fn population(&self, name: &str) -> Option<&Population> {
        self.populations.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Reports produced by the last completed generation.
    #[must_use]
    pub fn last_reports(&self) -> &[GenerationReport] {
        &self.last_reports
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.generation >= self.config.run.max_generations
    }

    /// Rederives every cell's organism count.
    pub fn recount(&mut self) {
        self.ecosystem
            .recount(self.populations.iter().flat_map(|p| p.agents.iter()));
    }

    /// Runs generations until the configured maximum.
    pub fn run(&mut self) -> anyhow::Result<()> {
        while !self.is_finished() {
            self.step()?;
        }
        tracing::info!(
            run = %self.config.run.name,
            generations = self.generation,
            faults = self.metrics.faults(),
            elapsed_ms = self.metrics.elapsed().as_millis() as u64,
            "Simulation finished"
        );
        Ok(())
    }

    /// Advances the whole simulation by one generation.
    pub fn step(&mut self) -> anyhow::Result<&[GenerationReport]> {
        let started = Instant::now();

        self.ecosystem.environment_update(&self.scenario, &mut self.rng)?;
        self.execute_organisms()?;
        self.age_organisms();

        let mut reports = Vec::with_capacity(self.populations.len());
        for population in &mut self.populations {
            reports.push(population.generation_step(&self.scenario, &mut self.rng)?);
        }

        self.recount();
        self.ecosystem
            .movement_update(&mut self.populations, &self.scenario, &mut self.rng)?;
        self.generation += 1;

        self.after_generation(&reports)?;
        let alive = self
            .populations
            .iter()
            .flat_map(|p| p.agents.iter())
            .filter(|o| o.is_alive())
            .count();
        self.metrics.record_generation(
            self.generation,
            started.elapsed(),
            alive,
            self.config.run.report_frequency,
        );

        self.last_reports = reports;
        Ok(&self.last_reports)
    }

    fn age_organisms(&mut self) {
        for population in &mut self.populations {
            for organism in population.agents.iter_mut().filter(|o| o.is_alive()) {
                organism.age_one();
                if let Some(cause) = organism.update_life_status() {
                    tracing::debug!(
                        organism = %organism.id,
                        population = %population.name,
                        cause = cause.code(),
                        "Organism died"
                    );
                }
            }
        }
    }

    fn after_generation(&mut self, reports: &[GenerationReport]) -> anyhow::Result<()> {
        let generation = self.generation;
        let due = |frequency: u64| frequency > 0 && generation % frequency == 0;
        let run = self.config.run.clone();

        if due(run.log_frequency) {
            self.logger
                .log(generation, &self.populations, &self.ecosystem)?;
        }

        if due(run.report_frequency) {
            for report in reports {
                tracing::info!(
                    population = %report.population,
                    generation = report.generation,
                    size = report.size,
                    mean_fitness = report.mean_fitness,
                    max_fitness = report.max_fitness,
                    percent_to_goal = report.percent_to_goal,
                    "Population report"
                );
            }
        }

        if due(run.freeze_frequency) {
            self.freeze()?;
        }
        if due(run.burial_frequency) {
            self.bury()?;
        }
        Ok(())
    }

    /// Writes a sample of every population to the checkpoint directory.
    pub fn freeze(&mut self) -> anyhow::Result<Vec<PathBuf>> {
        let dir = PathBuf::from(&self.config.run.checkpoint_dir);
        let mut paths = Vec::with_capacity(self.populations.len());
        for population in &self.populations {
            paths.push(dose_io::freeze_population(
                population,
                &dir,
                &self.config.run.name,
                self.config.run.freeze_proportion,
                &mut self.rng,
            )?);
        }
        Ok(paths)
    }

    /// Writes the grid to the checkpoint directory.
    pub fn bury(&self) -> anyhow::Result<PathBuf> {
        let dir = PathBuf::from(&self.config.run.checkpoint_dir);
        Ok(dose_io::bury_ecosystem(
            &self.ecosystem,
            &dir,
            &self.config.run.name,
            self.generation,
            &self.fingerprint,
        )?)
    }

    /// Restores a frozen population into the live population of the same
    /// name, or into `target` when given.
    ///
    /// A replacing revive moves that population's generation counter to the
    /// checkpoint's; the simulation resumes from the furthest population.
    pub fn revive(
        &mut self,
        path: &Path,
        target: Option<&str>,
        mode: ReviveMode,
    ) -> anyhow::Result<()> {
        let checkpoint = dose_io::read_population(path)?;
        let name = target.unwrap_or(&checkpoint.name).to_string();
        let dimensions = self.ecosystem.dimensions();
        for organism in &checkpoint.agents {
            if let Some(location) = organism.status.location {
                anyhow::ensure!(
                    dimensions.contains(location),
                    "Revived organism {} sits at {location}, outside the {dimensions} ecosystem",
                    organism.id
                );
            }
        }

        let population = self
            .populations
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| anyhow::anyhow!("No population named {name} to revive into"))?;
        population.revive(checkpoint, mode);

        if mode == ReviveMode::Replace {
            self.generation = self
                .populations
                .iter()
                .map(|p| p.generation)
                .max()
                .unwrap_or(self.generation);
        }
        self.recount();
        Ok(())
    }

    /// Replaces the live grid with a buried one of the same dimensions.
    pub fn excavate(&mut self, path: &Path) -> anyhow::Result<()> {
        let (ecosystem, meta) = dose_io::excavate_ecosystem(path)?;
        anyhow::ensure!(
            ecosystem.dimensions() == self.ecosystem.dimensions(),
            "Buried ecosystem is {} but this run uses {}",
            ecosystem.dimensions(),
            self.ecosystem.dimensions()
        );
        if meta.fingerprint != self.fingerprint {
            tracing::warn!(
                buried = %meta.fingerprint,
                current = %self.fingerprint,
                "Excavating an ecosystem buried under a different configuration"
            );
        }
        self.ecosystem = ecosystem;
        self.recount();
        Ok(())
    }
}
