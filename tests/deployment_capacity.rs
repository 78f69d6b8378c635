mod common;

use common::SimulationBuilder;
use dose_core::{DeploymentScheme, Location, SimulationConfig};
use dose_lib::scenarios::Neutral;
use dose_lib::Simulation;

#[test]
fn test_random_deployment_respects_capacity() {
    for seed in 0..25 {
        let sim = SimulationBuilder::new()
            .with_seed(seed)
            .with_config(|c| {
                c.ecosystem.dimensions = [3, 3, 1];
                c.populations[0].size = 20;
                c.populations[0].locations = vec![[0, 0, 0], [1, 0, 0], [2, 0, 0], [0, 1, 0]];
                c.populations[0].deployment = DeploymentScheme::Random { capacity: 5 };
            })
            .build(Neutral::default());

        for (_, cell) in sim.ecosystem().cells() {
            assert!(cell.organism_count() <= 5);
        }
        // exactly full: every target holds five
        for target in [[0, 0, 0], [1, 0, 0], [2, 0, 0], [0, 1, 0]] {
            assert_eq!(sim.ecosystem().count_at(Location::from(target)), 5);
        }
    }
}

#[test]
fn test_random_deployment_that_cannot_fit_is_rejected() {
    let mut config = SimulationConfig::default();
    config.run.seed = Some(1);
    config.populations[0].size = 11;
    config.populations[0].deployment = DeploymentScheme::Random { capacity: 5 };
    config.populations[0].locations = vec![[0, 0, 0], [1, 0, 0]];

    assert!(Simulation::new(config, Neutral::default()).is_err());
}

#[test]
fn test_round_robin_spreads_evenly() {
    let sim = SimulationBuilder::new()
        .with_config(|c| {
            c.populations[0].size = 9;
            c.populations[0].locations = vec![[0, 0, 0], [1, 1, 1], [0, 1, 0]];
            c.populations[0].deployment = DeploymentScheme::RoundRobin;
        })
        .build(Neutral::default());

    assert_cell_count!(sim, [0, 0, 0], 3);
    assert_cell_count!(sim, [1, 1, 1], 3);
    assert_cell_count!(sim, [0, 1, 0], 3);
    assert_counts_consistent!(sim);
}

#[test]
fn test_centralized_spills_into_neighbours() {
    let sim = SimulationBuilder::new()
        .with_config(|c| {
            c.ecosystem.dimensions = [3, 3, 1];
            c.populations[0].size = 12;
            c.populations[0].locations = vec![[1, 1, 0]];
            c.populations[0].deployment = DeploymentScheme::Centralized { capacity: 4 };
        })
        .build(Neutral::default());

    assert_cell_count!(sim, [1, 1, 0], 4);
    for (location, cell) in sim.ecosystem().cells() {
        if location != Location::new(1, 1, 0) {
            assert_eq!(cell.organism_count(), 1, "{location}");
        }
    }
}

#[test]
fn test_populations_share_the_grid() {
    let sim = SimulationBuilder::new()
        .with_population("pop_02", 4, vec![[0, 0, 0]], DeploymentScheme::SingleCell)
        .build(Neutral::default());

    assert_cell_count!(sim, [0, 0, 0], 14);
    assert_eq!(sim.populations().len(), 2);
    assert!(sim.populations()[1]
        .agents
        .iter()
        .all(|o| o.status.deme == "pop_02"));
}

#[test]
fn test_custom_deployment_needs_scenario_support() {
    let mut config = SimulationConfig::default();
    config.populations[0].deployment = DeploymentScheme::Custom;
    config.populations[0].locations = Vec::new();
    let err = Simulation::new(config, Neutral::default()).err().unwrap();
    assert!(err.to_string().contains("custom deployment"));
}
