use super::genome::Chromosome;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Address of one ecological cell in the 3D ecosystem grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Location {
    #[must_use]
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }
}

impl From<[usize; 3]> for Location {
    fn from([x, y, z]: [usize; 3]) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Why an organism stopped living.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    /// Vitality dropped to zero or below.
    Vitality,
    /// Age reached lifespan.
    Age,
    /// Removed on purpose by a scenario or operator.
    Killed,
}

impl DeathCause {
    /// Stable code written to logs and checkpoints.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            DeathCause::Vitality => "death01",
            DeathCause::Age => "death02",
            DeathCause::Killed => "death03",
        }
    }
}

impl fmt::Display for DeathCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    Unassigned,
    Male,
    Female,
}

/// Mutable life record of an organism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganismStatus {
    pub alive: bool,
    /// Health in `[0, 100]`.
    pub vitality: f64,
    /// Generations lived.
    pub age: u64,
    pub lifespan: u64,
    /// Last fitness computed by the population.
    pub fitness: f64,
    pub death: Option<DeathCause>,
    pub location: Option<Location>,
    pub gender: Gender,
    pub deme: String,
    /// Identities of the organisms this one was mated from.
    pub parents: Vec<String>,
    /// Number of matings between this organism and the founders.
    pub generation: u64,
    /// Runtime faults raised while executing this organism's genome.
    pub fault_count: u64,
    pub last_fault: Option<String>,
}

impl Default for OrganismStatus {
    fn default() -> Self {
        Self {
            alive: true,
            vitality: 100.0,
            age: 0,
            lifespan: 100,
            fitness: 0.0,
            death: None,
            location: None,
            gender: Gender::Unassigned,
            deme: String::new(),
            parents: Vec::new(),
            generation: 0,
            fault_count: 0,
            last_fault: None,
        }
    }
}

/// A digital organism: genome, status, and persisted working tape ("blood").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organism {
    pub id: String,
    pub genome: Vec<Chromosome>,
    pub status: OrganismStatus,
    /// Working tape carried across generations when the tape is persistent.
    pub blood: Vec<f64>,
}

impl Organism {
    #[must_use]
    pub fn new(id: String, genome: Vec<Chromosome>, status: OrganismStatus) -> Self {
        Self {
            id,
            genome,
            status,
            blood: Vec::new(),
        }
    }

    /// Serialize organism to hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(bytes)
    }

    /// Deserialize organism from hex string.
    pub fn from_hex(hex_str: &str) -> anyhow::Result<Self> {
        let bytes = hex::decode(hex_str)?;
        let organism = serde_json::from_slice(&bytes)?;
        Ok(organism)
    }
}
