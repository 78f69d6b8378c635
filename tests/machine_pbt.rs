use dose_core::genome::MutationWindow;
use dose_core::machine::{InstructionTable, RagarajaVersion, TapeMachine};
use dose_core::{Chromosome, GenomeLogic, MutationKind};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const DIGITS: &str = "0123456789";

prop_compose! {
    fn arb_source(max_len: usize)(
        symbols in prop::collection::vec(prop::sample::select(DIGITS.chars().collect::<Vec<_>>()), 0..max_len)
    ) -> Vec<char> {
        symbols
    }
}

prop_compose! {
    fn arb_chromosome(alphabet: &'static str, max_len: usize)(
        symbols in prop::collection::vec(prop::sample::select(alphabet.chars().collect::<Vec<_>>()), 0..max_len)
    ) -> Chromosome {
        Chromosome::new(symbols, alphabet.chars().collect(), 0.0)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_execution_is_bounded(
        source in arb_source(600),
        max_instructions in 1usize..200,
        capacity in 1usize..64,
        input in prop::collection::vec(-100.0f64..100.0, 0..8),
        seed in any::<u64>(),
    ) {
        let table = InstructionTable::ragaraja(RagarajaVersion::V1_0);
        let machine = TapeMachine::new(&table, capacity, max_instructions);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        // faults are fine here; only successful runs report a count
        if let Ok(ctx) = machine.execute(&source, input, Vec::new(), &mut rng) {
            prop_assert!(ctx.executed <= max_instructions);
            prop_assert!(ctx.pointer >= 0);
            prop_assert!((ctx.pointer as usize) < capacity);
        }
    }

    #[test]
    fn test_junk_symbols_never_abort(
        source in "[0-9a-z#]{0,90}",
        seed in any::<u64>(),
    ) {
        let table = InstructionTable::ragaraja(RagarajaVersion::V0_1);
        let machine = TapeMachine::new(&table, 8, 100);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let source: Vec<char> = source.chars().collect();
        let prepared = machine.prepare_source(&source);
        prop_assert_eq!(prepared.len() % 3, 0);
        // only digits survive, plus padding
        prop_assert!(prepared.iter().all(|c| c.is_ascii_digit() || *c == '#'));
        let _ = machine.execute(&source, Vec::new(), Vec::new(), &mut rng);
    }

    #[test]
    fn test_crossover_conserves_length(
        first in arb_chromosome("ACGT", 60),
        second in arb_chromosome("ACGT", 60),
        fraction in 0.0f64..=1.0,
    ) {
        let shortest = first.len().min(second.len());
        let point = (shortest as f64 * fraction) as usize;
        let (a, b) = first.crossover_at(&second, point);
        prop_assert_eq!(a.len() + b.len(), first.len() + second.len());
        prop_assert_eq!(&a.sequence[..point], &first.sequence[..point]);
        prop_assert_eq!(&b.sequence[..point], &second.sequence[..point]);
    }

    #[test]
    fn test_point_mutation_count(
        chromosome in arb_chromosome(DIGITS, 400),
        background in 0.0f64..0.1,
        rate in 0.0f64..0.5,
        seed in any::<u64>(),
    ) {
        let mut mutated = Chromosome::new(
            chromosome.sequence.clone(),
            chromosome.alphabet.clone(),
            background,
        );
        let len = mutated.len();
        let expected = ((background + rate) * len as f64).floor() as usize;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let applied = mutated
            .mutate_with_rng(MutationKind::Point, rate, MutationWindow::whole(len), &mut rng)
            .unwrap();

        prop_assert_eq!(applied, expected);
        prop_assert_eq!(mutated.len(), len);
        prop_assert!(mutated.sequence.iter().all(|c| DIGITS.contains(*c)));
        let changed = mutated
            .sequence
            .iter()
            .zip(&chromosome.sequence)
            .filter(|(a, b)| a != b)
            .count();
        prop_assert!(changed <= expected);
    }
}
