//! # DOSE Core
//!
//! The simulation engine for DOSE digital organisms.
//!
//! This crate contains the deterministic simulation logic, including:
//! - A circular-tape register machine that executes codon-decoded genomes
//! - Versioned instruction tables with weighted ambiguous codons
//! - Chromosome mutation and crossover operators
//! - Organism lifecycle and the population genetic-algorithm step
//! - The 3D ecosystem grid and deployment strategies
//! - Configuration, metrics and structured logging
//!
//! ## Example
//!
//! ```
//! use dose_core::machine::{InstructionTable, RagarajaVersion, TapeMachine};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let table = InstructionTable::ragaraja(RagarajaVersion::V1_0);
//! let machine = TapeMachine::new(&table, 4, 100);
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//!
//! // read input, increment, emit
//! let source: Vec<char> = "050010060".chars().collect();
//! let ctx = machine.execute(&source, vec![41.0], Vec::new(), &mut rng).unwrap();
//! assert_eq!(ctx.output, vec![42.0]);
//! ```

/// Population and ecosystem checkpoints
pub mod checkpoint;
/// Configuration management for simulation parameters
pub mod config;
/// Placement of populations onto the ecosystem grid
pub mod deployment;
/// Ecological cells and the 3D grid
pub mod ecosystem;
/// Chromosome mutation and crossover
pub mod genome;
/// Organism birth, ageing, death and mating
pub mod lifecycle;
/// Genome interpreter and instruction tables
pub mod machine;
/// Run metrics collection and logging
pub mod metrics;
/// Fitness-driven population control
pub mod population;
/// Generation reports and the logging sink
pub mod report;
/// Research scenario hooks
pub mod scenario;

pub use checkpoint::{EcosystemCheckpoint, PopulationCheckpoint, ReviveMode};
pub use config::SimulationConfig;
pub use deployment::{deploy, DeploymentScheme};
pub use dose_data::{Chromosome, DeathCause, Gender, Location, Organism, OrganismStatus};
pub use ecosystem::{Dimensions, EcoCell, Ecosystem};
pub use genome::{GenomeLogic, MutationKind, MutationPolicy};
pub use lifecycle::OrganismLogic;
pub use machine::{ExecutionContext, ExecutionFault, InstructionTable, TapeMachine};
pub use metrics::{init_logging, Metrics};
pub use population::{CullingPolicy, Population};
pub use report::{GenerationLogger, GenerationRecord, GenerationReport, NullLogger};
pub use scenario::Scenario;
