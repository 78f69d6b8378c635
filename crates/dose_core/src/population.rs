//! Fitness-driven population control.
//!
//! One call to [`Population::generation_step`] is one transition:
//! cull (from the second generation on), mate, post-mating hook, mutate,
//! events hook, advance the counter, report.

use crate::checkpoint::{PopulationCheckpoint, ReviveMode};
use crate::genome::MutationPolicy;
use crate::lifecycle::{offspring, OrganismLogic};
use crate::report::{mean_fitness, GenerationReport};
use crate::scenario::Scenario;
use dose_data::Organism;
use rand::seq::index;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// Below this many organisms, or sampled organisms, a freeze keeps everyone.
pub const FREEZE_MINIMUM: usize = 100;

/// Fitness given to organisms whose score overflowed or was NaN.
pub const UNSCORABLE: f64 = f64::MIN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CullingPolicy {
    /// Culling never shrinks the population below this size.
    pub floor: usize,
    /// Survivors above this size are downsampled to it.
    pub ceiling: usize,
}

impl Default for CullingPolicy {
    fn default() -> Self {
        Self {
            floor: 20,
            ceiling: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    pub name: String,
    pub agents: Vec<Organism>,
    pub goal: f64,
    pub generation: u64,
    pub max_generations: u64,
    pub culling: CullingPolicy,
    pub mutation: MutationPolicy,
    /// Vitality every child starts with.
    pub vitality: f64,
}

impl Population {
    #[must_use]
    pub fn new(name: &str, agents: Vec<Organism>, goal: f64, max_generations: u64) -> Self {
        Self {
            name: name.to_string(),
            agents,
            goal,
            generation: 0,
            max_generations,
            culling: CullingPolicy::default(),
            mutation: MutationPolicy::default(),
            vitality: 100.0,
        }
    }

    #[must_use]
    pub fn with_culling(mut self, culling: CullingPolicy) -> Self {
        self.culling = culling;
        self
    }

    #[must_use]
    pub fn with_mutation(mut self, mutation: MutationPolicy) -> Self {
        self.mutation = mutation;
        self
    }

    #[must_use]
    pub fn with_vitality(mut self, vitality: f64) -> Self {
        self.vitality = vitality;
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.generation >= self.max_generations
    }

    /// Scores every agent, storing the result in its status.
    ///
    /// A non-finite score is the organism's problem, not the run's: it is
    /// noted on the organism and scored as [`UNSCORABLE`].
    pub fn evaluate<S: Scenario + ?Sized>(&mut self, scenario: &S) -> anyhow::Result<Vec<f64>> {
        let mut scores = Vec::with_capacity(self.agents.len());
        for organism in &mut self.agents {
            let mut score = scenario.fitness(organism)?;
            if !score.is_finite() {
                tracing::debug!(organism = %organism.id, score, "Fitness is not finite");
                organism.status.last_fault = Some(format!("non-finite fitness {score}"));
                score = UNSCORABLE;
            }
            organism.status.fitness = score;
            scores.push(score);
        }
        Ok(scores)
    }

    /// Drops dead agents, then the below-mean ones, then downsamples.
    ///
    /// Below-mean agents are dropped weakest first and only while the
    /// population stays at or above the floor.
    pub fn cull<S: Scenario + ?Sized>(
        &mut self,
        scenario: &S,
        rng: &mut dyn RngCore,
    ) -> anyhow::Result<usize> {
        let before = self.agents.len();
        self.agents.retain(|o| o.is_alive());
        if self.agents.is_empty() {
            return Ok(before);
        }

        let scores = self.evaluate(scenario)?;
        let mean = mean_fitness(&scores);

        let mut weak: Vec<usize> = (0..scores.len()).filter(|i| scores[*i] < mean).collect();
        weak.sort_by(|a, b| scores[*a].total_cmp(&scores[*b]));
        let droppable = self.agents.len().saturating_sub(self.culling.floor);
        let mut keep = vec![true; self.agents.len()];
        for i in weak.into_iter().take(droppable) {
            keep[i] = false;
        }
        let mut flags = keep.into_iter();
        self.agents.retain(|_| flags.next().unwrap_or(true));

        if self.agents.len() > self.culling.ceiling {
            let mut picked = index::sample(rng, self.agents.len(), self.culling.ceiling).into_vec();
            picked.sort_unstable();
            let mut survivors = Vec::with_capacity(picked.len());
            let mut agents: Vec<Option<Organism>> = self.agents.drain(..).map(Some).collect();
            for i in picked {
                if let Some(organism) = agents[i].take() {
                    survivors.push(organism);
                }
            }
            self.agents = survivors;
        }

        let removed = before - self.agents.len();
        tracing::debug!(
            population = %self.name,
            removed,
            remaining = self.agents.len(),
            mean_fitness = mean,
            "Population culled"
        );
        Ok(removed)
    }

    /// Adds one child per living agent; parents are drawn from the living
    /// with replacement.
    pub fn mate(&mut self, rng: &mut dyn RngCore) -> usize {
        let living: Vec<usize> = (0..self.agents.len())
            .filter(|i| self.agents[*i].is_alive())
            .collect();
        if living.is_empty() {
            return 0;
        }
        let children: Vec<Organism> = (0..living.len())
            .map(|_| {
                let first = &self.agents[living[rng.gen_range(0..living.len())]];
                let second = &self.agents[living[rng.gen_range(0..living.len())]];
                offspring(first, second, self.vitality, rng)
            })
            .collect();
        self.agents.extend(children);
        living.len()
    }

    pub fn mutate<S: Scenario + ?Sized>(
        &mut self,
        scenario: &S,
        rng: &mut dyn RngCore,
    ) -> anyhow::Result<()> {
        let policy = self.mutation;
        for organism in &mut self.agents {
            scenario.mutation_scheme(organism, &policy, rng)?;
        }
        Ok(())
    }

    pub fn generation_step<S: Scenario + ?Sized>(
        &mut self,
        scenario: &S,
        rng: &mut dyn RngCore,
    ) -> anyhow::Result<GenerationReport> {
        if self.generation > 0 {
            self.cull(scenario, rng)?;
        }
        self.mate(rng);
        scenario.post_mating(self, rng)?;
        self.mutate(scenario, rng)?;
        scenario.generation_events(self, rng)?;
        self.generation += 1;
        self.report(scenario)
    }

    /// Scores the current agents and summarises them.
    pub fn report<S: Scenario + ?Sized>(&mut self, scenario: &S) -> anyhow::Result<GenerationReport> {
        let scores = self.evaluate(scenario)?;
        Ok(GenerationReport::from_scores(
            &self.name,
            self.generation,
            self.goal,
            &scores,
        ))
    }

    /// Samples `proportion` of the agents into a checkpoint.
    pub fn freeze(&self, proportion: f64, rng: &mut dyn RngCore) -> PopulationCheckpoint {
        let wanted = (self.agents.len() as f64 * proportion.clamp(0.0, 1.0)) as usize;
        let agents = if self.agents.len() < FREEZE_MINIMUM || wanted < FREEZE_MINIMUM {
            self.agents.clone()
        } else {
            let mut picked = index::sample(rng, self.agents.len(), wanted).into_vec();
            picked.sort_unstable();
            picked.into_iter().map(|i| self.agents[i].clone()).collect()
        };
        PopulationCheckpoint {
            name: self.name.clone(),
            generation: self.generation,
            goal: self.goal,
            agents,
        }
    }

    /// Restores a checkpoint into this population.
    pub fn revive(&mut self, checkpoint: PopulationCheckpoint, mode: ReviveMode) {
        match mode {
            ReviveMode::Replace => {
                self.agents = checkpoint.agents;
                self.generation = checkpoint.generation;
            }
            ReviveMode::Append => self.agents.extend(checkpoint.agents),
        }
        tracing::info!(
            population = %self.name,
            mode = ?mode,
            agents = self.agents.len(),
            generation = self.generation,
            "Population revived"
        );
    }
}
