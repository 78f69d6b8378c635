//! # DOSE IO
//!
//! I/O and persistence layer for the DOSE simulation.
//!
//! This crate provides:
//! - Structured error handling with custom error types
//! - JSON, gzip and HexDNA serialization helpers
//! - Population freeze/revive and ecosystem burial/excavation
//! - A line-delimited JSON generation logger

/// Error types and result aliases for I/O operations
pub mod error;
/// Line-delimited JSON generation log
pub mod logger;
/// Checkpoint files for populations and the ecosystem grid
pub mod persistence;
/// Validated serialization helpers for JSON, gzip and HexDNA formats
pub mod serialization;

pub use error::{IoError, Result};
pub use logger::{read_log, JsonlLogger, LoggedGeneration};
pub use persistence::{
    bury_ecosystem, excavate_ecosystem, freeze_population, read_population, revive_population,
    EcosystemMeta,
};
pub use serialization::{from_hex_dna, from_json, read_gz_json, to_hex_dna, to_json, write_gz_json};
