use crate::ecosystem::Ecosystem;
use crate::population::Population;
use crate::scenario::Scenario;
use dose_data::Location;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// Placement policy applied once when a population enters the grid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum DeploymentScheme {
    /// Delegates to [`Scenario::deploy`].
    Custom,
    /// Everyone goes to the first target location.
    #[default]
    SingleCell,
    /// Uniformly random target location among cells still below `capacity`.
    Random { capacity: usize },
    /// Organism `i` goes to target `i % targets`.
    RoundRobin,
    /// Fill the first target up to `capacity`, then spill across its
    /// planar neighbours in turn.
    Centralized { capacity: usize },
}

impl DeploymentScheme {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DeploymentScheme::Custom => "custom",
            DeploymentScheme::SingleCell => "single_cell",
            DeploymentScheme::Random { .. } => "random",
            DeploymentScheme::RoundRobin => "round_robin",
            DeploymentScheme::Centralized { .. } => "centralized",
        }
    }
}

/// Assigns a location to every organism in `population` and counts it there.
pub fn deploy<S: Scenario + ?Sized>(
    scheme: &DeploymentScheme,
    population: &mut Population,
    ecosystem: &mut Ecosystem,
    targets: &[Location],
    scenario: &S,
    rng: &mut dyn RngCore,
) -> anyhow::Result<()> {
    if *scheme != DeploymentScheme::Custom {
        check_targets(population, ecosystem, targets)?;
    }

    match scheme {
        DeploymentScheme::Custom => scenario.deploy(population, ecosystem, rng)?,
        DeploymentScheme::SingleCell => {
            for organism in &mut population.agents {
                ecosystem.place(organism, targets[0])?;
            }
        }
        DeploymentScheme::RoundRobin => {
            for (i, organism) in population.agents.iter_mut().enumerate() {
                ecosystem.place(organism, targets[i % targets.len()])?;
            }
        }
        DeploymentScheme::Random { capacity } => {
            for organism in &mut population.agents {
                let open: Vec<Location> = targets
                    .iter()
                    .copied()
                    .filter(|t| ecosystem.count_at(*t) < *capacity)
                    .collect();
                anyhow::ensure!(
                    !open.is_empty(),
                    "Every target of population {} is at capacity {capacity}",
                    population.name
                );
                let target = open[rng.gen_range(0..open.len())];
                ecosystem.place(organism, target)?;
            }
        }
        DeploymentScheme::Centralized { capacity } => {
            let primary = targets[0];
            let neighbours = ecosystem.planar_neighbours(primary);
            let mut spilled = 0;
            for organism in &mut population.agents {
                let target = if ecosystem.count_at(primary) < *capacity || neighbours.is_empty() {
                    primary
                } else {
                    let target = neighbours[spilled % neighbours.len()];
                    spilled += 1;
                    target
                };
                ecosystem.place(organism, target)?;
            }
        }
    }

    tracing::debug!(
        population = %population.name,
        scheme = scheme.name(),
        organisms = population.agents.len(),
        "Population deployed"
    );
    Ok(())
}

fn check_targets(
    population: &Population,
    ecosystem: &Ecosystem,
    targets: &[Location],
) -> anyhow::Result<()> {
    anyhow::ensure!(
        !targets.is_empty(),
        "Population {} has no target locations",
        population.name
    );
    for target in targets {
        anyhow::ensure!(
            ecosystem.contains(*target),
            "Target {target} of population {} is outside the {} ecosystem",
            population.name,
            ecosystem.dimensions()
        );
    }
    Ok(())
}
