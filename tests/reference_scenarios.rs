mod common;

use common::SimulationBuilder;
use dose_core::machine::{InstructionTable, RagarajaVersion, TapeMachine};
use dose_core::{Chromosome, GenomeLogic, Organism, OrganismStatus, Population, Scenario};
use dose_lib::scenarios::Neutral;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

struct Fixed(f64);

impl Scenario for Fixed {
    fn fitness(&self, _organism: &Organism) -> anyhow::Result<f64> {
        Ok(self.0)
    }
}

#[test]
fn test_single_random_increment() {
    let table = InstructionTable::ragaraja(RagarajaVersion::V1_0);
    let machine = TapeMachine::new(&table, 4, 1);

    for seed in 0..20 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let source: Vec<char> = "020020020".chars().collect();
        let ctx = machine
            .execute(&source, Vec::new(), vec![0.0; 4], &mut rng)
            .unwrap();

        assert_eq!(ctx.tape.len(), 4);
        assert_eq!(ctx.tape.iter().filter(|v| **v == 1.0).count(), 1);
        assert_eq!(ctx.tape.iter().filter(|v| **v == 0.0).count(), 3);
        assert_eq!(ctx.source_pointer, 3);
        assert_eq!(ctx.executed, 1);
    }
}

#[test]
fn test_binary_crossover_at_two() {
    let first = Chromosome::parse("0000", "01", 0.0);
    let second = Chromosome::parse("1111", "01", 0.0);
    let (a, b) = first.crossover_at(&second, 2);
    assert_eq!(a.as_string(), "0011");
    assert_eq!(b.as_string(), "1100");
}

#[test]
fn test_report_at_goal_is_zero_percent() {
    let organism = Organism::new(
        "o".to_string(),
        vec![Chromosome::parse("0", "01", 0.0)],
        OrganismStatus::default(),
    );
    let mut population = Population::new("p", vec![organism], 4.0, 10);
    let report = population.report(&Fixed(4.0)).unwrap();
    assert_eq!(report.mean_fitness, 4.0);
    assert_eq!(report.percent_to_goal, Some(0.0));
}

#[test]
fn test_single_cell_deployment_on_small_grid() {
    let sim = SimulationBuilder::new().build(Neutral::default());

    assert_cell_count!(sim, [0, 0, 0], 10);
    assert_eq!(sim.ecosystem().total_organisms(), 10);
    for organism in &sim.populations()[0].agents {
        assert_eq!(organism.status.location, Some(dose_core::Location::new(0, 0, 0)));
    }
    for (location, cell) in sim.ecosystem().cells() {
        if location != dose_core::Location::new(0, 0, 0) {
            assert_eq!(cell.organism_count(), 0);
        }
    }
}
