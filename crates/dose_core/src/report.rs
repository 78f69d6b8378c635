use crate::ecosystem::Ecosystem;
use crate::lifecycle::OrganismLogic;
use crate::population::Population;
use serde::{Deserialize, Serialize};

/// Mean of `scores`, scaled before summing so large finite scores cannot
/// overflow to infinity. Zero for no scores.
#[must_use]
pub fn mean_fitness(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let n = scores.len() as f64;
    scores.iter().map(|s| s / n).sum()
}

/// Summary produced by every population generation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub population: String,
    pub generation: u64,
    pub size: usize,
    pub mean_fitness: f64,
    pub min_fitness: f64,
    pub max_fitness: f64,
    /// `(mean - goal) / goal * 100`; undefined for a zero goal.
    pub percent_to_goal: Option<f64>,
}

impl GenerationReport {
    #[must_use]
    pub fn from_scores(population: &str, generation: u64, goal: f64, scores: &[f64]) -> Self {
        let (mean, min, max) = if scores.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            (
                mean_fitness(scores),
                scores.iter().copied().fold(f64::INFINITY, f64::min),
                scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            )
        };
        let percent_to_goal = (goal != 0.0).then(|| (mean - goal) / goal * 100.0);
        Self {
            population: population.to_string(),
            generation,
            size: scores.len(),
            mean_fitness: mean,
            min_fitness: min,
            max_fitness: max,
            percent_to_goal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSummary {
    pub name: String,
    pub generation: u64,
    pub size: usize,
    pub alive: usize,
    pub mean_fitness: f64,
    pub faults: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSummary {
    pub location: [usize; 3],
    pub organisms: usize,
    pub local_input: usize,
    pub local_output: usize,
}

/// One line of the generation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: u64,
    pub fingerprint: String,
    pub populations: Vec<PopulationSummary>,
    pub cells: Vec<CellSummary>,
}

impl GenerationRecord {
    /// Snapshots the live state without rescoring anyone.
    #[must_use]
    pub fn capture(
        generation: u64,
        fingerprint: &str,
        populations: &[Population],
        ecosystem: &Ecosystem,
    ) -> Self {
        let populations = populations
            .iter()
            .map(|p| {
                let mean_fitness = if p.agents.is_empty() {
                    0.0
                } else {
                    p.agents.iter().map(|o| o.status.fitness).sum::<f64>() / p.len() as f64
                };
                PopulationSummary {
                    name: p.name.clone(),
                    generation: p.generation,
                    size: p.len(),
                    alive: p.agents.iter().filter(|o| o.is_alive()).count(),
                    mean_fitness,
                    faults: p.agents.iter().map(|o| o.status.fault_count).sum(),
                }
            })
            .collect();
        let cells = ecosystem
            .cells()
            .map(|(location, cell)| CellSummary {
                location: [location.x, location.y, location.z],
                organisms: cell.organism_count(),
                local_input: cell.local_input.len(),
                local_output: cell.local_output.len(),
            })
            .collect();
        Self {
            generation,
            fingerprint: fingerprint.to_string(),
            populations,
            cells,
        }
    }
}

/// Sink invoked by the orchestrator at the configured log frequency.
pub trait GenerationLogger: Send {
    fn log(
        &mut self,
        generation: u64,
        populations: &[Population],
        ecosystem: &Ecosystem,
    ) -> anyhow::Result<()>;
}

/// Discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl GenerationLogger for NullLogger {
    fn log(&mut self, _: u64, _: &[Population], _: &Ecosystem) -> anyhow::Result<()> {
        Ok(())
    }
}
