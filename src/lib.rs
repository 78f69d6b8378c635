//! # DOSE
//!
//! Digital organisms whose genomes run on a circular-tape machine, evolving
//! in populations that share a 3D ecosystem grid.
//!
//! The engine lives in `dose_core` and persistence in `dose_io`. This crate
//! ties them together into a runnable [`Simulation`] and ships a couple of
//! ready-made [`scenarios`].
//!
//! ```no_run
//! use dose_core::SimulationConfig;
//! use dose_lib::{scenarios::TapeSum, Simulation};
//!
//! let config = SimulationConfig::from_file("dose.toml")?;
//! let mut simulation = Simulation::new(config, TapeSum::default())?;
//! simulation.run()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod scenarios;
pub mod simulation;

pub use simulation::{run_organism, ExecutionOutcome, Simulation};
