use super::instructions::{self, TableEntry};
use super::{ExecutionContext, ExecutionFault, Flow};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Instruction handler. Mutates the context in place and reports whether to continue.
pub type Handler = fn(&mut ExecutionContext, &mut dyn RngCore) -> Result<Flow, ExecutionFault>;

/// Operational grouping of instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Pointer,
    Arithmetic,
    Stack,
    SwapMinMax,
    Input,
    Output,
    Tape,
    Conversion,
    Control,
    NotUsed,
}

#[derive(Clone, Copy)]
pub struct Instruction {
    pub name: &'static str,
    pub category: Category,
    pub handler: Handler,
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("name", &self.name)
            .field("category", &self.category)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WeightedInstruction {
    pub weight: f64,
    pub instruction: Instruction,
}

/// Handlers a codon may resolve to, sampled with one cumulative draw.
#[derive(Debug, Clone)]
pub struct Dispatch {
    choices: Vec<WeightedInstruction>,
}

impl Dispatch {
    #[must_use]
    pub fn single(instruction: Instruction) -> Self {
        Self {
            choices: vec![WeightedInstruction {
                weight: 1.0,
                instruction,
            }],
        }
    }

    /// Builds a weighted dispatch; weights are normalised to sum to one.
    #[must_use]
    pub fn weighted(choices: &[(f64, Instruction)]) -> Self {
        let total: f64 = choices.iter().map(|(w, _)| w.max(0.0)).sum();
        if choices.is_empty() || total <= 0.0 {
            return Self::single(instructions::NOT_USED);
        }
        Self {
            choices: choices
                .iter()
                .map(|(weight, instruction)| WeightedInstruction {
                    weight: weight.max(0.0) / total,
                    instruction: *instruction,
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn choices(&self) -> &[WeightedInstruction] {
        &self.choices
    }

    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        self.choices.len() > 1
    }

    pub fn select(&self, rng: &mut dyn RngCore) -> &Instruction {
        if let [only] = self.choices.as_slice() {
            return &only.instruction;
        }
        let draw: f64 = rng.gen();
        self.pick(draw)
    }

    /// Handler whose cumulative band contains `draw` in `[0, 1)`.
    #[must_use]
    pub fn pick(&self, draw: f64) -> &Instruction {
        let mut cumulative = 0.0;
        for choice in &self.choices {
            cumulative += choice.weight;
            if draw < cumulative {
                return &choice.instruction;
            }
        }
        // Rounding can leave the final band a hair short of 1.0.
        &self.choices[self.choices.len() - 1].instruction
    }
}

/// Which codon language a genome is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionSet {
    /// Digit alphabet, three-symbol codons.
    #[default]
    Ragaraja,
    /// Nucleotide alphabet, two-symbol codons with ambiguous entries.
    Nucleotide,
}

/// Ragaraja instruction subsets, ordered oldest to newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum RagarajaVersion {
    #[serde(rename = "0.1")]
    V0_1,
    #[default]
    #[serde(rename = "1.0")]
    V1_0,
}

/// Total mapping from every codon over an alphabet to a dispatch.
///
/// Codons outside the active version resolve to the explicit not-used
/// instruction, so a lookup only misses for codons containing symbols
/// outside the alphabet (padding, junk).
#[derive(Debug, Clone)]
pub struct InstructionTable {
    set: InstructionSet,
    version: RagarajaVersion,
    codon_length: usize,
    alphabet: Vec<char>,
    entries: HashMap<String, Dispatch>,
}

impl InstructionTable {
    #[must_use]
    pub fn new(set: InstructionSet, version: RagarajaVersion) -> Self {
        match set {
            InstructionSet::Ragaraja => Self::ragaraja(version),
            InstructionSet::Nucleotide => Self::nucleotide(),
        }
    }

    #[must_use]
    pub fn ragaraja(version: RagarajaVersion) -> Self {
        Self::build(
            InstructionSet::Ragaraja,
            version,
            3,
            instructions::RAGARAJA_ALPHABET,
            instructions::RAGARAJA,
        )
    }

    #[must_use]
    pub fn nucleotide() -> Self {
        Self::build(
            InstructionSet::Nucleotide,
            RagarajaVersion::default(),
            2,
            instructions::NUCLEOTIDE_ALPHABET,
            instructions::NUCLEOTIDE,
        )
    }

    fn build(
        set: InstructionSet,
        version: RagarajaVersion,
        codon_length: usize,
        alphabet: &str,
        table: &[TableEntry],
    ) -> Self {
        let alphabet: Vec<char> = alphabet.chars().collect();
        let mut entries: HashMap<String, Dispatch> = codon_space(&alphabet, codon_length)
            .into_iter()
            .map(|codon| (codon, Dispatch::single(instructions::NOT_USED)))
            .collect();

        for entry in table.iter().filter(|e| e.since <= version) {
            entries.insert(entry.codon.to_string(), Dispatch::weighted(entry.choices));
        }

        Self {
            set,
            version,
            codon_length,
            alphabet,
            entries,
        }
    }

    #[must_use]
    pub fn set(&self) -> InstructionSet {
        self.set
    }

    #[must_use]
    pub fn version(&self) -> RagarajaVersion {
        self.version
    }

    #[must_use]
    pub fn codon_length(&self) -> usize {
        self.codon_length
    }

    #[must_use]
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    /// Number of codons the table covers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn starts_codon(&self, symbol: char) -> bool {
        self.alphabet.contains(&symbol)
    }

    #[must_use]
    pub fn get(&self, codon: &str) -> Option<&Dispatch> {
        self.entries.get(codon)
    }

    /// Resolves a codon to one concrete instruction, sampling ambiguous entries.
    pub fn resolve(&self, codon: &str, rng: &mut dyn RngCore) -> Option<&Instruction> {
        self.entries.get(codon).map(|dispatch| dispatch.select(rng))
    }

    /// Codons mapped to something other than the not-used instruction.
    #[must_use]
    pub fn active_codons(&self) -> Vec<&str> {
        let mut codons: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, d)| {
                d.choices()
                    .iter()
                    .any(|c| c.instruction.category != Category::NotUsed)
            })
            .map(|(codon, _)| codon.as_str())
            .collect();
        codons.sort_unstable();
        codons
    }
}

fn codon_space(alphabet: &[char], length: usize) -> Vec<String> {
    let mut codons = vec![String::new()];
    for _ in 0..length {
        codons = codons
            .iter()
            .flat_map(|prefix| {
                alphabet.iter().map(move |symbol| {
                    let mut codon = prefix.clone();
                    codon.push(*symbol);
                    codon
                })
            })
            .collect();
    }
    codons
}
