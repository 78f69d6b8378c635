/// Asserts the organism count of the cell at `(x, y, z)`.
#[macro_export]
macro_rules! assert_cell_count {
    ($sim:expr, [$x:expr, $y:expr, $z:expr], $count:expr) => {
        assert_eq!(
            $sim.ecosystem()
                .count_at(dose_core::Location::new($x, $y, $z)),
            $count,
            "Organism count mismatch at ({}, {}, {})",
            $x,
            $y,
            $z
        );
    };
}

/// Asserts that the cell counts add up to the living organisms with a location.
#[macro_export]
macro_rules! assert_counts_consistent {
    ($sim:expr) => {
        let located = $sim
            .populations()
            .iter()
            .flat_map(|p| p.agents.iter())
            .filter(|o| o.status.alive && o.status.location.is_some())
            .count();
        assert_eq!(
            $sim.ecosystem().total_organisms(),
            located,
            "Cell counts do not match organism locations"
        );
    };
}

/// Asserts the total number of agents across all populations.
#[macro_export]
macro_rules! assert_agents {
    ($sim:expr, $count:expr) => {
        assert_eq!(
            $sim.populations().iter().map(|p| p.len()).sum::<usize>(),
            $count,
            "Agent count mismatch"
        );
    };
}
