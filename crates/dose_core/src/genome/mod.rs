pub mod crossover;
pub mod mutation;

pub use dose_data::Chromosome;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Elementary edit operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    #[default]
    Point,
    Insert,
    Delete,
    Invert,
    Duplicate,
    Translocate,
}

impl MutationKind {
    pub const ALL: [MutationKind; 6] = [
        MutationKind::Point,
        MutationKind::Insert,
        MutationKind::Delete,
        MutationKind::Invert,
        MutationKind::Duplicate,
        MutationKind::Translocate,
    ];
}

/// A single scripted edit at an exact position.
///
/// Runs are half-open `[start, end)`. The translocation `target` indexes
/// the sequence after the run has been excised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Point { position: usize, symbol: char },
    Insert { position: usize, symbol: char },
    Delete { position: usize },
    Invert { start: usize, end: usize },
    Duplicate { start: usize, end: usize },
    Translocate { start: usize, end: usize, target: usize },
}

/// Index window a random mutation may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationWindow {
    pub start: usize,
    pub end: usize,
    /// Treat an empty window as `[0, end)` instead of doing nothing.
    pub legacy_empty_window: bool,
}

impl MutationWindow {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            legacy_empty_window: false,
        }
    }

    /// The whole sequence of `len` symbols.
    #[must_use]
    pub fn whole(len: usize) -> Self {
        Self::new(0, len)
    }

    #[must_use]
    pub fn with_legacy_empty_window(mut self, enabled: bool) -> Self {
        self.legacy_empty_window = enabled;
        self
    }
}

/// How a population mutates its members every generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MutationPolicy {
    pub kind: MutationKind,
    /// Rate added to each chromosome's background rate.
    pub rate: f64,
    pub legacy_empty_window: bool,
}

impl Default for MutationPolicy {
    fn default() -> Self {
        Self {
            kind: MutationKind::Point,
            rate: 0.01,
            legacy_empty_window: false,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenomeError {
    #[error("window [{start}, {end}) is outside a sequence of length {len}")]
    WindowOutOfBounds { start: usize, end: usize, len: usize },

    #[error("position {position} is outside a sequence of length {len}")]
    PositionOutOfBounds { position: usize, len: usize },

    #[error("chromosome alphabet is empty")]
    EmptyAlphabet,
}

/// Trait defining the genetic operators on chromosomes.
pub trait GenomeLogic {
    /// Applies `floor((background + rate) * window)` random edits of `kind`.
    ///
    /// Returns the number of edits actually performed, which can fall short
    /// when deletions empty the window.
    fn mutate_with_rng<R: Rng + ?Sized>(
        &mut self,
        kind: MutationKind,
        rate: f64,
        window: MutationWindow,
        rng: &mut R,
    ) -> Result<usize, GenomeError>;

    /// Applies one deterministic edit.
    fn apply_edit(&mut self, edit: &Edit) -> Result<(), GenomeError>;

    /// Single-point crossover; returns both children.
    fn crossover_at(&self, other: &Chromosome, point: usize) -> (Chromosome, Chromosome);

    fn crossover_with_rng<R: Rng + ?Sized>(&self, other: &Chromosome, rng: &mut R) -> Chromosome;

    fn random_symbol<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<char>;

    fn random_with_rng<R: Rng + ?Sized>(
        length: usize,
        alphabet: Vec<char>,
        background_mutation: f64,
        rng: &mut R,
    ) -> Self;
}

impl GenomeLogic for Chromosome {
    fn mutate_with_rng<R: Rng + ?Sized>(
        &mut self,
        kind: MutationKind,
        rate: f64,
        window: MutationWindow,
        rng: &mut R,
    ) -> Result<usize, GenomeError> {
        mutation::mutate_with_rng(self, kind, rate, window, rng)
    }

    fn apply_edit(&mut self, edit: &Edit) -> Result<(), GenomeError> {
        mutation::apply_edit(self, edit)
    }

    fn crossover_at(&self, other: &Chromosome, point: usize) -> (Chromosome, Chromosome) {
        crossover::crossover_at(self, other, point)
    }

    fn crossover_with_rng<R: Rng + ?Sized>(&self, other: &Chromosome, rng: &mut R) -> Chromosome {
        let point = rng.gen_range(0..=self.len());
        crossover::crossover_at(self, other, point).0
    }

    fn random_symbol<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<char> {
        if self.alphabet.is_empty() {
            None
        } else {
            Some(self.alphabet[rng.gen_range(0..self.alphabet.len())])
        }
    }

    fn random_with_rng<R: Rng + ?Sized>(
        length: usize,
        alphabet: Vec<char>,
        background_mutation: f64,
        rng: &mut R,
    ) -> Self {
        let sequence = if alphabet.is_empty() {
            Vec::new()
        } else {
            (0..length)
                .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
                .collect()
        };
        Chromosome::new(sequence, alphabet, background_mutation)
    }
}
