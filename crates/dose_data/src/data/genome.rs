use serde::{Deserialize, Serialize};

/// An ordered, mutable sequence of genetic symbols.
///
/// The sequence may contain symbols outside `alphabet` (junk material is
/// tolerated by the interpreter); mutation only ever draws from `alphabet`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Chromosome {
    /// Genetic symbols, stored as a plain string on disk.
    #[serde(with = "symbols")]
    pub sequence: Vec<char>,
    /// Symbols available to mutation operators.
    #[serde(with = "symbols")]
    pub alphabet: Vec<char>,
    /// Per-symbol mutation rate applied on top of any requested rate.
    pub background_mutation: f64,
}

impl Chromosome {
    #[must_use]
    pub fn new(sequence: Vec<char>, alphabet: Vec<char>, background_mutation: f64) -> Self {
        Self {
            sequence,
            alphabet,
            background_mutation,
        }
    }

    /// Builds a chromosome from string slices, e.g. `Chromosome::parse("0101", "01", 0.0)`.
    #[must_use]
    pub fn parse(sequence: &str, alphabet: &str, background_mutation: f64) -> Self {
        Self::new(
            sequence.chars().collect(),
            alphabet.chars().collect(),
            background_mutation,
        )
    }

    /// A chromosome of `length` copies of `symbol`.
    #[must_use]
    pub fn uniform(symbol: char, length: usize, alphabet: Vec<char>, background_mutation: f64) -> Self {
        Self::new(vec![symbol; length], alphabet, background_mutation)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    #[must_use]
    pub fn as_string(&self) -> String {
        self.sequence.iter().collect()
    }
}

mod symbols {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(symbols: &[char], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&symbols.iter().collect::<String>())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<char>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.chars().collect())
    }
}
