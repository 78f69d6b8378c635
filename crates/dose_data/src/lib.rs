//! Plain serializable data shared by the DOSE simulation crates.
//!
//! Logic lives in `dose_core`; the types here only carry state and know how
//! to snapshot themselves.

pub mod data;

pub use data::genome::Chromosome;
pub use data::organism::{DeathCause, Gender, Location, Organism, OrganismStatus};
