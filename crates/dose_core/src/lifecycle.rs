use crate::genome::GenomeLogic;
use crate::machine::ExecutionFault;
use dose_data::{Chromosome, DeathCause, Location, Organism, OrganismStatus};
use rand::Rng;
use uuid::Uuid;

/// Blueprint used to spawn founder organisms.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganismTemplate {
    pub chromosomes: usize,
    pub length: usize,
    pub alphabet: Vec<char>,
    /// Fill every chromosome with this symbol instead of random symbols.
    pub initial_symbol: Option<char>,
    pub background_mutation: f64,
    pub vitality: f64,
    pub lifespan: u64,
}

impl Default for OrganismTemplate {
    fn default() -> Self {
        Self {
            chromosomes: 1,
            length: 200,
            alphabet: "0123456789".chars().collect(),
            initial_symbol: None,
            background_mutation: 0.0001,
            vitality: 100.0,
            lifespan: 1000,
        }
    }
}

/// Life bookkeeping shared by the population and the orchestrator.
pub trait OrganismLogic {
    fn is_alive(&self) -> bool;
    /// Advances age by one generation.
    fn age_one(&mut self);
    /// Adds `delta` to vitality, clamped to `[0, 100]`.
    fn adjust_vitality(&mut self, delta: f64);
    fn kill(&mut self, cause: DeathCause);
    /// Applies the vitality and age death rules; returns the cause if the
    /// organism died on this call.
    fn update_life_status(&mut self) -> Option<DeathCause>;
    fn record_fault(&mut self, fault: &ExecutionFault);
    fn relocate(&mut self, location: Location);
}

impl OrganismLogic for Organism {
    fn is_alive(&self) -> bool {
        self.status.alive
    }

    fn age_one(&mut self) {
        if self.status.alive {
            self.status.age += 1;
        }
    }

    fn adjust_vitality(&mut self, delta: f64) {
        self.status.vitality = (self.status.vitality + delta).clamp(0.0, 100.0);
    }

    fn kill(&mut self, cause: DeathCause) {
        if self.status.alive {
            self.status.alive = false;
            self.status.death = Some(cause);
        }
    }

    fn update_life_status(&mut self) -> Option<DeathCause> {
        if !self.status.alive {
            return None;
        }
        let cause = if self.status.vitality <= 0.0 {
            DeathCause::Vitality
        } else if self.status.age >= self.status.lifespan {
            DeathCause::Age
        } else {
            return None;
        };
        self.kill(cause);
        Some(cause)
    }

    fn record_fault(&mut self, fault: &ExecutionFault) {
        self.status.fault_count += 1;
        self.status.last_fault = Some(fault.to_string());
    }

    fn relocate(&mut self, location: Location) {
        self.status.location = Some(location);
    }
}

/// Fresh organism identity drawn from the simulation RNG.
pub fn new_identity<R: Rng + ?Sized>(rng: &mut R) -> String {
    Uuid::from_u128(rng.gen::<u128>()).simple().to_string()
}

pub fn template_genome<R: Rng + ?Sized>(template: &OrganismTemplate, rng: &mut R) -> Vec<Chromosome> {
    (0..template.chromosomes)
        .map(|_| match template.initial_symbol {
            Some(symbol) => Chromosome::uniform(
                symbol,
                template.length,
                template.alphabet.clone(),
                template.background_mutation,
            ),
            None => Chromosome::random_with_rng(
                template.length,
                template.alphabet.clone(),
                template.background_mutation,
                rng,
            ),
        })
        .collect()
}

/// Spawns a founder organism belonging to `deme`.
pub fn spawn_organism<R: Rng + ?Sized>(template: &OrganismTemplate, deme: &str, rng: &mut R) -> Organism {
    let genome = template_genome(template, rng);
    let status = OrganismStatus {
        vitality: template.vitality.clamp(0.0, 100.0),
        lifespan: template.lifespan,
        deme: deme.to_string(),
        ..OrganismStatus::default()
    };
    Organism::new(new_identity(rng), genome, status)
}

/// Mates two organisms chromosome by chromosome.
///
/// Each chromosome pair crosses at its own random point. Chromosomes the
/// second parent lacks are copied from the first. The child takes the first
/// parent's location, deme and lifespan and starts with a fresh tape and
/// `vitality`.
pub fn offspring<R: Rng + ?Sized>(
    first: &Organism,
    second: &Organism,
    vitality: f64,
    rng: &mut R,
) -> Organism {
    let genome = first
        .genome
        .iter()
        .enumerate()
        .map(|(i, chromosome)| match second.genome.get(i) {
            Some(other) => chromosome.crossover_with_rng(other, rng),
            None => chromosome.clone(),
        })
        .collect();

    let status = OrganismStatus {
        vitality: vitality.clamp(0.0, 100.0),
        lifespan: first.status.lifespan,
        location: first.status.location,
        gender: first.status.gender,
        deme: first.status.deme.clone(),
        parents: vec![first.id.clone(), second.id.clone()],
        generation: first.status.generation.max(second.status.generation) + 1,
        ..OrganismStatus::default()
    };
    Organism::new(new_identity(rng), genome, status)
}
