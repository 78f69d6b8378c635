//! Genome execution with per-organism fault isolation.
//!
//! Every living organism gets its own seed drawn from the simulation RNG in
//! population order, so sequential and rayon execution produce the same
//! results. Outcomes are written back to organisms and cells sequentially.

use super::Simulation;
use dose_core::{
    ExecutionFault, Location, Organism, OrganismLogic, Scenario, TapeMachine,
};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

struct Job {
    population: usize,
    agent: usize,
    input: Vec<f64>,
    seed: u64,
}

/// What one organism's genome run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    /// Tape after the last chromosome that completed.
    pub tape: Vec<f64>,
    pub output: Vec<f64>,
    pub executed: usize,
    pub fault: Option<ExecutionFault>,
}

/// Runs an organism's chromosomes in order, threading tape and input.
///
/// A fault discards the faulting chromosome's changes and skips the rest;
/// work from earlier chromosomes is kept.
pub fn run_organism(
    machine: &TapeMachine<'_>,
    organism: &Organism,
    input: Vec<f64>,
    persistent_tape: bool,
    rng: &mut dyn RngCore,
) -> ExecutionOutcome {
    let mut tape = if persistent_tape && !organism.blood.is_empty() {
        organism.blood.clone()
    } else {
        machine.blank_tape()
    };
    let mut input = input;
    let mut output = Vec::new();
    let mut executed = 0;

    for chromosome in &organism.genome {
        match machine.execute(&chromosome.sequence, input.clone(), tape.clone(), rng) {
            Ok(ctx) => {
                executed += ctx.executed;
                tape = ctx.tape;
                input = ctx.input.into();
                output.extend(ctx.output);
            }
            Err(fault) => {
                return ExecutionOutcome {
                    tape,
                    output,
                    executed,
                    fault: Some(fault),
                };
            }
        }
    }

    ExecutionOutcome {
        tape,
        output,
        executed,
        fault: None,
    }
}

impl<S: Scenario> Simulation<S> {
    pub(super) fn execute_organisms(&mut self) -> anyhow::Result<()> {
        let jobs = self.collect_jobs();
        let machine = TapeMachine::new(
            &self.table,
            self.config.interpreter.tape_capacity,
            self.config.interpreter.max_instructions,
        );
        let persistent = self.config.interpreter.persistent_tape;
        let populations = &self.populations;

        let run = |job: &Job| {
            let mut rng = ChaCha8Rng::seed_from_u64(job.seed);
            let organism = &populations[job.population].agents[job.agent];
            run_organism(&machine, organism, job.input.clone(), persistent, &mut rng)
        };
        let outcomes: Vec<ExecutionOutcome> = if self.config.run.parallel {
            jobs.par_iter().map(run).collect()
        } else {
            jobs.iter().map(run).collect()
        };

        for (job, outcome) in jobs.iter().zip(outcomes) {
            let organism = &mut self.populations[job.population].agents[job.agent];
            self.metrics.record_execution(outcome.executed);
            if let Some(fault) = &outcome.fault {
                organism.record_fault(fault);
                self.metrics.record_fault();
                tracing::debug!(
                    organism = %organism.id,
                    fault = %fault,
                    "Organism execution faulted"
                );
            }
            organism.blood = outcome.tape;

            if let Some(cell) = organism
                .status
                .location
                .and_then(|l| self.ecosystem.cell_mut(l))
            {
                self.scenario.organism_output(organism, &outcome.output, cell);
            }
        }
        Ok(())
    }

    fn collect_jobs(&mut self) -> Vec<Job> {
        let mut jobs = Vec::new();
        for (p, population) in self.populations.iter().enumerate() {
            for (a, organism) in population.agents.iter().enumerate() {
                if !organism.is_alive() {
                    continue;
                }
                let input = organism
                    .status
                    .location
                    .and_then(|l: Location| self.ecosystem.cell(l))
                    .map(|cell| self.scenario.organism_input(organism, cell))
                    .unwrap_or_default();
                jobs.push(Job {
                    population: p,
                    agent: a,
                    input,
                    seed: self.rng.next_u64(),
                });
            }
        }
        jobs
    }
}
