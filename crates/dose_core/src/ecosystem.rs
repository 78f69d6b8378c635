//! Fixed-size 3D grid of ecological cells.
//!
//! Every generation the grid runs its hooks in a fixed order:
//! `ecoregulate`, then `update_ecology` for every cell, then `update_local`
//! for every cell. After organisms have executed, movement and location
//! hooks run for every cell, counts are rederived, and each cell is reported.

use crate::lifecycle::OrganismLogic;
use crate::population::Population;
use crate::scenario::Scenario;
use dose_data::{Location, Organism};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Planar neighbour offsets around a cell, row by row.
const NEIGHBOUR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Dimensions {
    #[must_use]
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn volume(&self) -> usize {
        self.x * self.y * self.z
    }

    #[must_use]
    pub fn contains(&self, location: Location) -> bool {
        location.x < self.x && location.y < self.y && location.z < self.z
    }
}

impl From<[usize; 3]> for Dimensions {
    fn from([x, y, z]: [usize; 3]) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

/// Exchange buffers of one grid location.
///
/// The organism count is derived by [`Ecosystem::recount`] and cannot be
/// set from outside the grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EcoCell {
    pub local_input: Vec<f64>,
    pub local_output: Vec<f64>,
    pub temporary_input: Vec<f64>,
    pub temporary_output: Vec<f64>,
    organisms: usize,
}

impl EcoCell {
    #[must_use]
    pub fn organism_count(&self) -> usize {
        self.organisms
    }

    /// Moves last generation's temporary buffers into the local ones.
    ///
    /// Local output always becomes last generation's emissions, empty if
    /// nobody emitted. Local input is the standing environment, so an empty
    /// temporary input leaves it untouched.
    pub fn fold_temporary(&mut self) {
        if !self.temporary_input.is_empty() {
            self.local_input = std::mem::take(&mut self.temporary_input);
        }
        self.local_output = std::mem::take(&mut self.temporary_output);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ecosystem {
    dimensions: Dimensions,
    cells: Vec<EcoCell>,
}

impl Ecosystem {
    pub fn new(dimensions: Dimensions) -> anyhow::Result<Self> {
        anyhow::ensure!(
            dimensions.volume() > 0,
            "Ecosystem dimensions must be positive, got {dimensions}"
        );
        Ok(Self {
            dimensions,
            cells: vec![EcoCell::default(); dimensions.volume()],
        })
    }

    /// Rebuilds a grid from serialized parts, checking the cell count.
    pub fn from_parts(dimensions: Dimensions, cells: Vec<EcoCell>) -> anyhow::Result<Self> {
        anyhow::ensure!(
            dimensions.volume() > 0 && cells.len() == dimensions.volume(),
            "Ecosystem of {dimensions} needs {} cells, got {}",
            dimensions.volume(),
            cells.len()
        );
        Ok(Self { dimensions, cells })
    }

    #[must_use]
    pub fn into_parts(self) -> (Dimensions, Vec<EcoCell>) {
        (self.dimensions, self.cells)
    }

    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn index(&self, location: Location) -> Option<usize> {
        self.dimensions.contains(location).then(|| {
            let d = self.dimensions;
            (location.x * d.y + location.y) * d.z + location.z
        })
    }

    #[must_use]
    pub fn contains(&self, location: Location) -> bool {
        self.dimensions.contains(location)
    }

    #[must_use]
    pub fn cell(&self, location: Location) -> Option<&EcoCell> {
        self.index(location).map(|i| &self.cells[i])
    }

    pub fn cell_mut(&mut self, location: Location) -> Option<&mut EcoCell> {
        self.index(location).map(move |i| &mut self.cells[i])
    }

    /// Every location, x outermost and z innermost.
    pub fn locations(&self) -> impl Iterator<Item = Location> {
        let d = self.dimensions;
        (0..d.x).flat_map(move |x| {
            (0..d.y).flat_map(move |y| (0..d.z).map(move |z| Location::new(x, y, z)))
        })
    }

    pub fn cells(&self) -> impl Iterator<Item = (Location, &EcoCell)> {
        self.locations().zip(self.cells.iter())
    }

    #[must_use]
    pub fn count_at(&self, location: Location) -> usize {
        self.cell(location).map_or(0, EcoCell::organism_count)
    }

    #[must_use]
    pub fn total_organisms(&self) -> usize {
        self.cells.iter().map(EcoCell::organism_count).sum()
    }

    /// Moves `organism` to `location` and counts it there.
    pub fn place(&mut self, organism: &mut Organism, location: Location) -> anyhow::Result<()> {
        let index = self.index(location).ok_or_else(|| {
            anyhow::anyhow!(
                "Location {location} is outside the {} ecosystem",
                self.dimensions
            )
        })?;
        if let Some(previous) = organism.status.location.and_then(|l| self.index(l)) {
            if organism.is_alive() {
                self.cells[previous].organisms = self.cells[previous].organisms.saturating_sub(1);
            }
        }
        organism.relocate(location);
        if organism.is_alive() {
            self.cells[index].organisms += 1;
        }
        Ok(())
    }

    /// Rederives every cell's count from the living organisms' locations.
    pub fn recount<'a, I>(&mut self, organisms: I)
    where
        I: IntoIterator<Item = &'a Organism>,
    {
        for cell in &mut self.cells {
            cell.organisms = 0;
        }
        for organism in organisms.into_iter().filter(|o| o.is_alive()) {
            if let Some(index) = organism.status.location.and_then(|l| self.index(l)) {
                self.cells[index].organisms += 1;
            }
        }
    }

    /// Same-layer neighbours of `location`, clipped to the grid.
    #[must_use]
    pub fn planar_neighbours(&self, location: Location) -> Vec<Location> {
        NEIGHBOUR_OFFSETS
            .iter()
            .filter_map(|(dx, dy)| {
                let x = location.x.checked_add_signed(*dx)?;
                let y = location.y.checked_add_signed(*dy)?;
                let candidate = Location::new(x, y, location.z);
                self.contains(candidate).then_some(candidate)
            })
            .collect()
    }

    /// Runs the pre-execution hooks in order.
    pub fn environment_update<S: Scenario + ?Sized>(
        &mut self,
        scenario: &S,
        rng: &mut dyn RngCore,
    ) -> anyhow::Result<()> {
        scenario.ecoregulate(self, rng)?;
        let locations: Vec<Location> = self.locations().collect();
        for (location, cell) in locations.iter().zip(self.cells.iter_mut()) {
            scenario.update_ecology(*location, cell, rng)?;
        }
        for (location, cell) in locations.iter().zip(self.cells.iter_mut()) {
            scenario.update_local(*location, cell, rng)?;
        }
        Ok(())
    }

    /// Runs the post-execution hooks, rederives counts and reports each cell.
    ///
    /// Residents of every cell are captured before each hook pass, so an
    /// organism moved into a later cell is not visited twice.
    pub fn movement_update<S: Scenario + ?Sized>(
        &mut self,
        populations: &mut [Population],
        scenario: &S,
        rng: &mut dyn RngCore,
    ) -> anyhow::Result<()> {
        let residents = self.residents(populations);
        for (location, members) in &residents {
            for &(p, a) in members {
                scenario.organism_movement(&mut populations[p].agents[a], *location, self, rng)?;
            }
        }

        let residents = self.residents(populations);
        for (location, members) in &residents {
            for &(p, a) in members {
                scenario.organism_location(&mut populations[p].agents[a], *location, self, rng)?;
            }
        }

        for organism in populations.iter().flat_map(|p| p.agents.iter()) {
            if let Some(location) = organism.status.location {
                anyhow::ensure!(
                    self.contains(location),
                    "Organism {} moved outside the {} ecosystem to {location}",
                    organism.id,
                    self.dimensions
                );
            }
        }
        self.recount(populations.iter().flat_map(|p| p.agents.iter()));

        for (location, cell) in self.cells() {
            scenario.report_cell(location, cell)?;
        }
        Ok(())
    }

    /// Living organisms grouped by cell, in location order.
    fn residents(&self, populations: &[Population]) -> Vec<(Location, Vec<(usize, usize)>)> {
        let mut grouped: Vec<Vec<(usize, usize)>> = vec![Vec::new(); self.cells.len()];
        for (p, population) in populations.iter().enumerate() {
            for (a, organism) in population.agents.iter().enumerate() {
                if !organism.is_alive() {
                    continue;
                }
                if let Some(index) = organism.status.location.and_then(|l| self.index(l)) {
                    grouped[index].push((p, a));
                }
            }
        }
        self.locations()
            .zip(grouped)
            .filter(|(_, members)| !members.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dose_data::{Chromosome, DeathCause, OrganismStatus};

    fn organism(id: &str) -> Organism {
        Organism::new(
            id.to_string(),
            vec![Chromosome::parse("000", "0123456789", 0.0)],
            OrganismStatus::default(),
        )
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(Ecosystem::new(Dimensions::new(2, 0, 1)).is_err());
    }

    #[test]
    fn test_locations_cover_grid_in_order() {
        let eco = Ecosystem::new(Dimensions::new(2, 2, 2)).unwrap();
        let locations: Vec<Location> = eco.locations().collect();
        assert_eq!(locations.len(), 8);
        assert_eq!(locations[0], Location::new(0, 0, 0));
        assert_eq!(locations[1], Location::new(0, 0, 1));
        assert_eq!(locations[7], Location::new(1, 1, 1));
        assert!(eco.cell(Location::new(2, 0, 0)).is_none());
    }

    #[test]
    fn test_place_and_recount_agree() {
        let mut eco = Ecosystem::new(Dimensions::new(3, 3, 1)).unwrap();
        let mut a = organism("a");
        let mut b = organism("b");
        eco.place(&mut a, Location::new(1, 1, 0)).unwrap();
        eco.place(&mut b, Location::new(1, 1, 0)).unwrap();
        eco.place(&mut b, Location::new(2, 2, 0)).unwrap();
        assert_eq!(eco.count_at(Location::new(1, 1, 0)), 1);
        assert_eq!(eco.count_at(Location::new(2, 2, 0)), 1);

        let before = eco.clone();
        eco.recount([&a, &b]);
        assert_eq!(eco, before);

        assert!(eco.place(&mut a, Location::new(3, 0, 0)).is_err());
    }

    #[test]
    fn test_recount_skips_dead() {
        let mut eco = Ecosystem::new(Dimensions::new(1, 1, 1)).unwrap();
        let mut a = organism("a");
        a.relocate(Location::new(0, 0, 0));
        let mut b = a.clone();
        b.kill(DeathCause::Killed);
        eco.recount([&a, &b]);
        assert_eq!(eco.total_organisms(), 1);
    }

    #[test]
    fn test_planar_neighbours_clip_to_bounds() {
        let eco = Ecosystem::new(Dimensions::new(3, 3, 2)).unwrap();
        assert_eq!(eco.planar_neighbours(Location::new(1, 1, 1)).len(), 8);
        let corner = eco.planar_neighbours(Location::new(0, 0, 0));
        assert_eq!(
            corner,
            vec![
                Location::new(0, 1, 0),
                Location::new(1, 0, 0),
                Location::new(1, 1, 0)
            ]
        );
        assert!(Ecosystem::new(Dimensions::new(1, 1, 1))
            .unwrap()
            .planar_neighbours(Location::new(0, 0, 0))
            .is_empty());
    }

    #[test]
    fn test_fold_temporary() {
        let mut cell = EcoCell {
            local_input: vec![1.0],
            temporary_output: vec![2.0, 3.0],
            ..EcoCell::default()
        };
        cell.fold_temporary();
        assert_eq!(cell.local_input, vec![1.0]);
        assert_eq!(cell.local_output, vec![2.0, 3.0]);
        assert!(cell.temporary_output.is_empty());

        // a quiet generation clears stale output but keeps the input
        cell.fold_temporary();
        assert_eq!(cell.local_input, vec![1.0]);
        assert!(cell.local_output.is_empty());
    }

    #[test]
    fn test_from_parts_checks_volume() {
        let dims = Dimensions::new(2, 1, 1);
        assert!(Ecosystem::from_parts(dims, vec![EcoCell::default()]).is_err());
        assert!(Ecosystem::from_parts(dims, vec![EcoCell::default(); 2]).is_ok());
    }
}
