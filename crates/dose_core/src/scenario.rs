//! Research scenario interface.
//!
//! A scenario supplies the fitness function and may override any of the
//! generation hooks. It is chosen once when the simulation is built. Every
//! hook returns `anyhow::Result`; an error stops the run.

use crate::ecosystem::{EcoCell, Ecosystem};
use crate::genome::{GenomeLogic, MutationPolicy, MutationWindow};
use crate::population::Population;
use dose_data::{Location, Organism};
use rand::RngCore;

pub trait Scenario: Send + Sync {
    /// Scalar score used to cull and report. Higher is fitter.
    fn fitness(&self, organism: &Organism) -> anyhow::Result<f64>;

    /// Mutates one organism; by default every chromosome over its full length.
    fn mutation_scheme(
        &self,
        organism: &mut Organism,
        policy: &MutationPolicy,
        rng: &mut dyn RngCore,
    ) -> anyhow::Result<()> {
        for chromosome in &mut organism.genome {
            let window = MutationWindow::whole(chromosome.len())
                .with_legacy_empty_window(policy.legacy_empty_window);
            chromosome.mutate_with_rng(policy.kind, policy.rate, window, rng)?;
        }
        Ok(())
    }

    fn post_mating(&self, _population: &mut Population, _rng: &mut dyn RngCore) -> anyhow::Result<()> {
        Ok(())
    }

    fn generation_events(
        &self,
        _population: &mut Population,
        _rng: &mut dyn RngCore,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    /// Environment-wide change applied before any cell hook.
    fn ecoregulate(&self, _ecosystem: &mut Ecosystem, _rng: &mut dyn RngCore) -> anyhow::Result<()> {
        Ok(())
    }

    fn update_ecology(
        &self,
        _location: Location,
        cell: &mut EcoCell,
        _rng: &mut dyn RngCore,
    ) -> anyhow::Result<()> {
        cell.fold_temporary();
        Ok(())
    }

    fn update_local(
        &self,
        _location: Location,
        _cell: &mut EcoCell,
        _rng: &mut dyn RngCore,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    /// Machine input for an organism about to execute in `cell`.
    fn organism_input(&self, _organism: &Organism, cell: &EcoCell) -> Vec<f64> {
        cell.local_input.clone()
    }

    /// Posts an organism's machine output back to its cell.
    fn organism_output(&self, _organism: &Organism, output: &[f64], cell: &mut EcoCell) {
        cell.temporary_output.extend_from_slice(output);
    }

    fn organism_movement(
        &self,
        _organism: &mut Organism,
        _location: Location,
        _ecosystem: &Ecosystem,
        _rng: &mut dyn RngCore,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    fn organism_location(
        &self,
        _organism: &mut Organism,
        _location: Location,
        _ecosystem: &Ecosystem,
        _rng: &mut dyn RngCore,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    fn report_cell(&self, _location: Location, _cell: &EcoCell) -> anyhow::Result<()> {
        Ok(())
    }

    /// Placement used by the custom deployment scheme.
    fn deploy(
        &self,
        population: &mut Population,
        _ecosystem: &mut Ecosystem,
        _rng: &mut dyn RngCore,
    ) -> anyhow::Result<()> {
        anyhow::bail!(
            "Population {} uses custom deployment but the scenario does not place organisms",
            population.name
        )
    }
}
