//! Serializable checkpoints for populations and the ecosystem grid.
//!
//! The files themselves are written by `dose_io`.

use crate::ecosystem::Ecosystem;
use dose_data::Organism;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationCheckpoint {
    pub name: String,
    pub generation: u64,
    pub goal: f64,
    pub agents: Vec<Organism>,
}

/// How a revived checkpoint meets the live population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviveMode {
    /// Swap in the checkpointed agents and generation counter.
    #[default]
    Replace,
    /// Add the checkpointed agents to the live ones.
    Append,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcosystemCheckpoint {
    pub generation: u64,
    pub fingerprint: String,
    pub ecosystem: Ecosystem,
}

impl EcosystemCheckpoint {
    #[must_use]
    pub fn bury(ecosystem: &Ecosystem, generation: u64, fingerprint: &str) -> Self {
        Self {
            generation,
            fingerprint: fingerprint.to_string(),
            ecosystem: ecosystem.clone(),
        }
    }

    /// Restores the grid, checking that its cells match its dimensions.
    pub fn excavate(self) -> anyhow::Result<Ecosystem> {
        let (dimensions, cells) = self.ecosystem.into_parts();
        Ecosystem::from_parts(dimensions, cells)
    }
}
