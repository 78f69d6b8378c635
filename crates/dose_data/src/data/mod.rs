//! Core data structures for the DOSE simulation.

pub mod genome;
pub mod organism;
