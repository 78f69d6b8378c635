//! Built-in research scenarios.

use dose_core::{EcoCell, Ecosystem, Location, Organism, Scenario};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// Rewards organisms for accumulating large values on their tape.
///
/// Every cell offers `feed` as machine input. With `drift_probability` per
/// generation, every cell's input is nudged by a uniform step in `[-1, 1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TapeSum {
    pub feed: Vec<f64>,
    pub drift_probability: f64,
}

impl Default for TapeSum {
    fn default() -> Self {
        Self {
            feed: vec![1.0, 2.0, 3.0],
            drift_probability: 0.0,
        }
    }
}

impl Scenario for TapeSum {
    fn fitness(&self, organism: &Organism) -> anyhow::Result<f64> {
        Ok(organism.blood.iter().sum())
    }

    fn ecoregulate(&self, ecosystem: &mut Ecosystem, rng: &mut dyn RngCore) -> anyhow::Result<()> {
        if self.drift_probability <= 0.0 || !rng.gen_bool(self.drift_probability.min(1.0)) {
            return Ok(());
        }
        let step: f64 = rng.gen_range(-1.0..1.0);
        let locations: Vec<Location> = ecosystem.locations().collect();
        for location in locations {
            if let Some(cell) = ecosystem.cell_mut(location) {
                for value in &mut cell.local_input {
                    *value += step;
                }
            }
        }
        tracing::debug!(step, "Ecosystem input drifted");
        Ok(())
    }

    fn update_local(
        &self,
        _location: Location,
        cell: &mut EcoCell,
        _rng: &mut dyn RngCore,
    ) -> anyhow::Result<()> {
        if cell.local_input.is_empty() {
            cell.local_input = self.feed.clone();
        }
        Ok(())
    }
}

/// Constant fitness; organisms wander to a random neighbouring cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Neutral {
    pub move_probability: f64,
}

impl Scenario for Neutral {
    fn fitness(&self, _organism: &Organism) -> anyhow::Result<f64> {
        Ok(0.0)
    }

    fn organism_location(
        &self,
        organism: &mut Organism,
        location: Location,
        ecosystem: &Ecosystem,
        rng: &mut dyn RngCore,
    ) -> anyhow::Result<()> {
        if self.move_probability <= 0.0 || !rng.gen_bool(self.move_probability.min(1.0)) {
            return Ok(());
        }
        let neighbours = ecosystem.planar_neighbours(location);
        if !neighbours.is_empty() {
            organism.status.location = Some(neighbours[rng.gen_range(0..neighbours.len())]);
        }
        Ok(())
    }
}
