//! Configuration management for simulation parameters.
//!
//! `SimulationConfig` maps one-to-one onto a TOML file. Every section has
//! defaults, so a file only needs the values it changes.
//!
//! ## Example `dose.toml`
//!
//! ```toml
//! [run]
//! name = "tape_sum"
//! seed = 42
//! max_generations = 200
//!
//! [ecosystem]
//! dimensions = [4, 4, 1]
//!
//! [interpreter]
//! instruction_set = "ragaraja"
//! version = "1.0"
//! tape_capacity = 50
//!
//! [[populations]]
//! name = "pop_01"
//! size = 100
//! locations = [[0, 0, 0]]
//! deployment = { scheme = "centralized", capacity = 40 }
//! ```

use crate::deployment::DeploymentScheme;
use crate::ecosystem::Dimensions;
use crate::genome::{MutationKind, MutationPolicy};
use crate::lifecycle::OrganismTemplate;
use crate::machine::{InstructionSet, InstructionTable, RagarajaVersion};
use crate::population::CullingPolicy;
use dose_data::Location;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Run control: seeding, length and the cadence of side effects.
///
/// Frequencies count generations; zero disables the action.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub name: String,
    pub seed: Option<u64>,
    pub deterministic: bool,
    pub max_generations: u64,
    pub report_frequency: u64,
    pub log_frequency: u64,
    pub freeze_frequency: u64,
    pub freeze_proportion: f64,
    pub burial_frequency: u64,
    pub checkpoint_dir: String,
    /// Execute genomes on the rayon pool.
    pub parallel: bool,
    /// Treat an empty mutation window as `[0, end)`.
    pub legacy_empty_window: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            name: "dose".to_string(),
            seed: None,
            deterministic: false,
            max_generations: 100,
            report_frequency: 10,
            log_frequency: 1,
            freeze_frequency: 0,
            freeze_proportion: 0.1,
            burial_frequency: 0,
            checkpoint_dir: "checkpoints".to_string(),
            parallel: false,
            legacy_empty_window: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EcosystemConfig {
    pub dimensions: [usize; 3],
}

impl Default for EcosystemConfig {
    fn default() -> Self {
        Self {
            dimensions: [5, 5, 1],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GenomeConfig {
    pub chromosomes: usize,
    pub length: usize,
    /// Mutation alphabet; the instruction set's alphabet when absent.
    pub alphabet: Option<String>,
    /// Founders are filled with this symbol instead of random ones.
    pub initial_symbol: Option<char>,
    pub background_mutation: f64,
    pub additional_mutation: f64,
    pub mutation_kind: MutationKind,
}

impl Default for GenomeConfig {
    fn default() -> Self {
        Self {
            chromosomes: 1,
            length: 200,
            alphabet: None,
            initial_symbol: None,
            background_mutation: 0.0001,
            additional_mutation: 0.01,
            mutation_kind: MutationKind::Point,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct InterpreterConfig {
    pub instruction_set: InstructionSet,
    pub version: RagarajaVersion,
    pub tape_capacity: usize,
    pub max_instructions: usize,
    /// Carry each organism's tape into the next generation.
    pub persistent_tape: bool,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            instruction_set: InstructionSet::Ragaraja,
            version: RagarajaVersion::V1_0,
            tape_capacity: 50,
            max_instructions: 1000,
            persistent_tape: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OrganismConfig {
    pub vitality: f64,
    pub lifespan: u64,
}

impl Default for OrganismConfig {
    fn default() -> Self {
        Self {
            vitality: 100.0,
            lifespan: 1000,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CullingConfig {
    pub floor: usize,
    pub ceiling: usize,
    pub goal: f64,
}

impl Default for CullingConfig {
    fn default() -> Self {
        let policy = CullingPolicy::default();
        Self {
            floor: policy.floor,
            ceiling: policy.ceiling,
            goal: 100.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PopulationConfig {
    pub name: String,
    pub size: usize,
    #[serde(default)]
    pub locations: Vec<[usize; 3]>,
    #[serde(default)]
    pub deployment: DeploymentScheme,
    /// Overrides `culling.goal` for this population.
    #[serde(default)]
    pub goal: Option<f64>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            name: "pop_01".to_string(),
            size: 100,
            locations: vec![[0, 0, 0]],
            deployment: DeploymentScheme::SingleCell,
            goal: None,
        }
    }
}

impl PopulationConfig {
    #[must_use]
    pub fn targets(&self) -> Vec<Location> {
        self.locations.iter().copied().map(Location::from).collect()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub run: RunConfig,
    pub ecosystem: EcosystemConfig,
    pub genome: GenomeConfig,
    pub interpreter: InterpreterConfig,
    pub organism: OrganismConfig,
    pub culling: CullingConfig,
    pub populations: Vec<PopulationConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            run: RunConfig::default(),
            ecosystem: EcosystemConfig::default(),
            genome: GenomeConfig::default(),
            interpreter: InterpreterConfig::default(),
            organism: OrganismConfig::default(),
            culling: CullingConfig::default(),
            populations: vec![PopulationConfig::default()],
        }
    }
}

impl SimulationConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns the first violated rule as the error.
    pub fn validate(&self) -> anyhow::Result<()> {
        // Run validation
        anyhow::ensure!(!self.run.name.is_empty(), "Run name must not be empty");
        anyhow::ensure!(
            self.run.max_generations > 0,
            "Max generations must be positive"
        );
        anyhow::ensure!(
            self.run.freeze_proportion > 0.0 && self.run.freeze_proportion <= 1.0,
            "Freeze proportion must be in (0.0, 1.0]"
        );

        // Ecosystem validation
        anyhow::ensure!(
            self.ecosystem.dimensions.iter().all(|d| *d > 0),
            "Ecosystem dimensions must be positive"
        );
        anyhow::ensure!(
            self.ecosystem.dimensions.iter().product::<usize>() <= 1_000_000,
            "Ecosystem too large (max 1000000 cells)"
        );

        // Genome validation
        anyhow::ensure!(
            self.genome.chromosomes > 0,
            "Chromosome count must be positive"
        );
        anyhow::ensure!(
            self.genome.background_mutation >= 0.0 && self.genome.background_mutation <= 1.0,
            "Background mutation rate must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            self.genome.additional_mutation >= 0.0 && self.genome.additional_mutation <= 1.0,
            "Additional mutation rate must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            !self.alphabet().is_empty(),
            "Genome alphabet must not be empty"
        );
        if let Some(symbol) = self.genome.initial_symbol {
            anyhow::ensure!(
                self.alphabet().contains(&symbol),
                "Initial symbol {symbol:?} is not in the genome alphabet"
            );
        }

        // Interpreter validation
        anyhow::ensure!(
            self.interpreter.tape_capacity > 0,
            "Tape capacity must be positive"
        );
        anyhow::ensure!(
            self.interpreter.max_instructions > 0,
            "Max instructions must be positive"
        );

        // Organism validation
        anyhow::ensure!(
            self.organism.vitality > 0.0 && self.organism.vitality <= 100.0,
            "Initial vitality must be in (0.0, 100.0]"
        );
        anyhow::ensure!(self.organism.lifespan > 0, "Lifespan must be positive");

        // Culling validation
        anyhow::ensure!(
            self.culling.ceiling > 0,
            "Culling ceiling must be positive"
        );
        anyhow::ensure!(
            self.culling.floor <= self.culling.ceiling,
            "Culling floor must not exceed the ceiling"
        );
        anyhow::ensure!(self.culling.goal.is_finite(), "Fitness goal must be finite");

        // Population validation
        anyhow::ensure!(
            !self.populations.is_empty(),
            "At least one population is required"
        );
        let dimensions = self.dimensions();
        for (i, population) in self.populations.iter().enumerate() {
            anyhow::ensure!(
                !population.name.is_empty(),
                "Population {i} needs a name"
            );
            anyhow::ensure!(
                self.populations[..i].iter().all(|p| p.name != population.name),
                "Population name {} is used twice",
                population.name
            );
            anyhow::ensure!(
                population.size > 0,
                "Population {} must have a positive size",
                population.name
            );
            if population.deployment != DeploymentScheme::Custom {
                anyhow::ensure!(
                    !population.locations.is_empty(),
                    "Population {} needs at least one location",
                    population.name
                );
            }
            for location in population.targets() {
                anyhow::ensure!(
                    dimensions.contains(location),
                    "Location {location} of population {} is outside the {dimensions} ecosystem",
                    population.name
                );
            }
            match population.deployment {
                DeploymentScheme::Random { capacity } => anyhow::ensure!(
                    capacity.saturating_mul(population.locations.len()) >= population.size,
                    "Population {} does not fit in its locations at capacity {capacity}",
                    population.name
                ),
                DeploymentScheme::Centralized { capacity } => anyhow::ensure!(
                    capacity > 0,
                    "Population {} needs a positive centralized capacity",
                    population.name
                ),
                _ => {}
            }
        }

        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {e}", path.display()))?;
        Self::from_toml(&content)
    }

    /// Stable hash of everything that shapes the evolutionary dynamics.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.ecosystem).as_bytes());
        hasher.update(format!("{:?}", self.genome).as_bytes());
        hasher.update(format!("{:?}", self.interpreter).as_bytes());
        hasher.update(format!("{:?}", self.organism).as_bytes());
        hasher.update(format!("{:?}", self.culling).as_bytes());
        hasher.update(format!("{:?}", self.populations).as_bytes());
        hex::encode(hasher.finalize())
    }

    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::from(self.ecosystem.dimensions)
    }

    #[must_use]
    pub fn instruction_table(&self) -> InstructionTable {
        InstructionTable::new(self.interpreter.instruction_set, self.interpreter.version)
    }

    #[must_use]
    pub fn alphabet(&self) -> Vec<char> {
        match &self.genome.alphabet {
            Some(alphabet) => alphabet.chars().collect(),
            None => self.instruction_table().alphabet().to_vec(),
        }
    }

    #[must_use]
    pub fn organism_template(&self) -> OrganismTemplate {
        OrganismTemplate {
            chromosomes: self.genome.chromosomes,
            length: self.genome.length,
            alphabet: self.alphabet(),
            initial_symbol: self.genome.initial_symbol,
            background_mutation: self.genome.background_mutation,
            vitality: self.organism.vitality,
            lifespan: self.organism.lifespan,
        }
    }

    #[must_use]
    pub fn mutation_policy(&self) -> MutationPolicy {
        MutationPolicy {
            kind: self.genome.mutation_kind,
            rate: self.genome.additional_mutation,
            legacy_empty_window: self.run.legacy_empty_window,
        }
    }

    #[must_use]
    pub fn culling_policy(&self) -> CullingPolicy {
        CullingPolicy {
            floor: self.culling.floor,
            ceiling: self.culling.ceiling,
        }
    }
}
