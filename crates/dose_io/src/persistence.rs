//! Population freeze/revive and ecosystem burial/excavation on disk.
//!
//! File names carry the run prefix and generation:
//! `{prefix}_{population}_gen{generation}.pop.gz` and
//! `{prefix}_gen{generation}.eco.gz`.

use crate::error::{IoError, Result};
use crate::serialization::{read_gz_json, write_gz_json};
use dose_core::{Ecosystem, EcosystemCheckpoint, Population, PopulationCheckpoint, ReviveMode};
use rand::RngCore;
use std::path::{Path, PathBuf};

#[must_use]
pub fn population_file(dir: &Path, prefix: &str, name: &str, generation: u64) -> PathBuf {
    dir.join(format!("{prefix}_{name}_gen{generation}.pop.gz"))
}

#[must_use]
pub fn ecosystem_file(dir: &Path, prefix: &str, generation: u64) -> PathBuf {
    dir.join(format!("{prefix}_gen{generation}.eco.gz"))
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| {
            IoError::FileSystem(e).with_context(format!("creating checkpoint directory {:?}", dir))
        })?;
    }
    Ok(())
}

/// Samples `proportion` of the population and writes it to `dir`.
pub fn freeze_population(
    population: &Population,
    dir: &Path,
    prefix: &str,
    proportion: f64,
    rng: &mut dyn RngCore,
) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let checkpoint = population.freeze(proportion, rng);
    let path = population_file(dir, prefix, &population.name, population.generation);
    write_gz_json(&checkpoint, &path)?;
    tracing::info!(
        population = %population.name,
        generation = population.generation,
        sampled = checkpoint.agents.len(),
        path = %path.display(),
        "Population frozen"
    );
    Ok(path)
}

pub fn read_population(path: &Path) -> Result<PopulationCheckpoint> {
    read_gz_json(path).map_err(|e| e.with_context(format!("reading population {:?}", path)))
}

/// Restores a frozen population into `population`.
pub fn revive_population(population: &mut Population, path: &Path, mode: ReviveMode) -> Result<()> {
    let checkpoint = read_population(path)?;
    if checkpoint.name != population.name {
        tracing::warn!(
            checkpoint = %checkpoint.name,
            population = %population.name,
            "Reviving a checkpoint taken from a differently named population"
        );
    }
    population.revive(checkpoint, mode);
    Ok(())
}

/// Writes the whole grid to `dir`.
pub fn bury_ecosystem(
    ecosystem: &Ecosystem,
    dir: &Path,
    prefix: &str,
    generation: u64,
    fingerprint: &str,
) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let path = ecosystem_file(dir, prefix, generation);
    write_gz_json(&EcosystemCheckpoint::bury(ecosystem, generation, fingerprint), &path)?;
    tracing::info!(generation, path = %path.display(), "Ecosystem buried");
    Ok(path)
}

/// Restores a buried grid together with the generation it was taken at.
pub fn excavate_ecosystem(path: &Path) -> Result<(Ecosystem, EcosystemMeta)> {
    let checkpoint: EcosystemCheckpoint =
        read_gz_json(path).map_err(|e| e.with_context(format!("reading ecosystem {:?}", path)))?;
    let meta = EcosystemMeta {
        generation: checkpoint.generation,
        fingerprint: checkpoint.fingerprint.clone(),
    };
    let ecosystem = checkpoint
        .excavate()
        .map_err(|e| IoError::invalid(e.to_string()))?;
    Ok((ecosystem, meta))
}

/// Provenance of an excavated grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcosystemMeta {
    pub generation: u64,
    pub fingerprint: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use dose_core::lifecycle::{spawn_organism, OrganismTemplate};
    use dose_core::{Dimensions, Location};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("dose_persist_{}", uuid::Uuid::new_v4().simple()))
    }

    fn population(size: usize, rng: &mut ChaCha8Rng) -> Population {
        let template = OrganismTemplate {
            length: 9,
            ..OrganismTemplate::default()
        };
        let agents = (0..size).map(|_| spawn_organism(&template, "pop_01", rng)).collect();
        Population::new("pop_01", agents, 10.0, 50)
    }

    #[test]
    fn test_file_names() {
        let dir = Path::new("cp");
        assert_eq!(
            population_file(dir, "run", "pop_01", 12),
            PathBuf::from("cp/run_pop_01_gen12.pop.gz")
        );
        assert_eq!(ecosystem_file(dir, "run", 3), PathBuf::from("cp/run_gen3.eco.gz"));
    }

    #[test]
    fn test_freeze_and_revive_replace() {
        let dir = scratch_dir();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut source = population(12, &mut rng);
        source.generation = 9;
        let path = freeze_population(&source, &dir, "run", 0.5, &mut rng).unwrap();
        assert!(path.exists());

        let mut target = population(3, &mut rng);
        revive_population(&mut target, &path, ReviveMode::Replace).unwrap();
        assert_eq!(target.agents, source.agents);
        assert_eq!(target.generation, 9);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_revive_append() {
        let dir = scratch_dir();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let source = population(4, &mut rng);
        let path = freeze_population(&source, &dir, "run", 1.0, &mut rng).unwrap();

        let mut target = population(2, &mut rng);
        target.generation = 30;
        revive_population(&mut target, &path, ReviveMode::Append).unwrap();
        assert_eq!(target.len(), 6);
        assert_eq!(target.generation, 30);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_bury_and_excavate() {
        let dir = scratch_dir();
        let mut eco = Ecosystem::new(Dimensions::new(2, 2, 2)).unwrap();
        if let Some(cell) = eco.cell_mut(Location::new(1, 1, 1)) {
            cell.local_output = vec![4.0, 2.0];
        }
        let path = bury_ecosystem(&eco, &dir, "run", 5, "abc123").unwrap();
        let (restored, meta) = excavate_ecosystem(&path).unwrap();
        assert_eq!(restored, eco);
        assert_eq!(meta.generation, 5);
        assert_eq!(meta.fingerprint, "abc123");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_revive_missing_file() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut target = population(2, &mut rng);
        let err = revive_population(&mut target, Path::new("/nope/run.pop.gz"), ReviveMode::Replace)
            .unwrap_err();
        assert!(err.to_string().contains("reading population"));
        assert_eq!(target.len(), 2);
    }
}
