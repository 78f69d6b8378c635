pub mod macros;

use dose_core::config::PopulationConfig;
use dose_core::{Chromosome, DeploymentScheme, Scenario, SimulationConfig};
use dose_lib::Simulation;
use std::path::PathBuf;

type OrganismMod = (String, usize, String);

/// Builds small, seeded simulations for integration tests.
#[allow(dead_code)]
pub struct SimulationBuilder {
    config: SimulationConfig,
    genomes: Vec<OrganismMod>,
}

#[allow(dead_code)]
impl SimulationBuilder {
    pub fn new() -> Self {
        let mut config = SimulationConfig::default();
        config.run.name = "test".to_string();
        config.run.seed = Some(42);
        config.run.max_generations = 5;
        config.run.report_frequency = 0;
        config.run.log_frequency = 0;
        config.run.checkpoint_dir = scratch_dir().display().to_string();
        config.ecosystem.dimensions = [2, 2, 2];
        config.genome.length = 30;
        config.populations = vec![PopulationConfig {
            name: "pop_01".to_string(),
            size: 10,
            locations: vec![[0, 0, 0]],
            deployment: DeploymentScheme::SingleCell,
            goal: None,
        }];
        Self {
            config,
            genomes: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.run.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut SimulationConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_population(
        mut self,
        name: &str,
        size: usize,
        locations: Vec<[usize; 3]>,
        deployment: DeploymentScheme,
    ) -> Self {
        self.config.populations.push(PopulationConfig {
            name: name.to_string(),
            size,
            locations,
            deployment,
            goal: None,
        });
        self
    }

    /// Disables random mutation so scripted genomes stay as written.
    pub fn without_mutation(mut self) -> Self {
        self.config.genome.background_mutation = 0.0;
        self.config.genome.additional_mutation = 0.0;
        self
    }

    /// Replaces every chromosome of one founder with `sequence`.
    pub fn with_genome(mut self, population: &str, index: usize, sequence: &str) -> Self {
        self.genomes
            .push((population.to_string(), index, sequence.to_string()));
        self
    }

    /// Gives every founder of every population the same genome.
    pub fn with_uniform_genome(mut self, sequence: &str) -> Self {
        for population in &self.config.populations {
            for index in 0..population.size {
                self.genomes
                    .push((population.name.clone(), index, sequence.to_string()));
            }
        }
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn build<S: Scenario>(self, scenario: S) -> Simulation<S> {
        let alphabet: String = self.config.alphabet().into_iter().collect();
        let background = self.config.genome.background_mutation;
        let mut simulation =
            Simulation::new(self.config, scenario).expect("Failed to create simulation in test builder");

        for (name, index, sequence) in self.genomes {
            let population = simulation
                .populations_mut()
                .iter_mut()
                .find(|p| p.name == name)
                .expect("Unknown population in test builder");
            let organism = &mut population.agents[index];
            for chromosome in &mut organism.genome {
                *chromosome = Chromosome::parse(&sequence, &alphabet, background);
            }
        }
        simulation
    }
}

pub fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("dose_it_{}", uuid::Uuid::new_v4().simple()))
}
