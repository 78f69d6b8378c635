//! Instruction handlers and the codon tables that reference them.

use super::table::{Category, Instruction, RagarajaVersion};
use super::{finite, ExecutionContext, ExecutionFault, Flow};
use rand::{Rng, RngCore};

type Step = Result<Flow, ExecutionFault>;

/// One row of a codon table: the codon, the first version that knows it,
/// and its weighted handlers.
#[derive(Debug, Clone, Copy)]
pub struct TableEntry {
    pub codon: &'static str,
    pub since: RagarajaVersion,
    pub choices: &'static [(f64, Instruction)],
}

pub const RAGARAJA_ALPHABET: &str = "0123456789";
pub const NUCLEOTIDE_ALPHABET: &str = "ACGT";

macro_rules! instruction {
    ($const_name:ident, $name:literal, $category:ident, $handler:ident) => {
        pub const $const_name: Instruction = Instruction {
            name: $name,
            category: Category::$category,
            handler: $handler,
        };
    };
}

instruction!(NOT_USED, "not_used", NotUsed, not_used);
instruction!(FORWARD, "forward", Pointer, forward);
instruction!(BACKWARD, "backward", Pointer, backward);
instruction!(FORWARD_TEN, "forward_ten", Pointer, forward_ten);
instruction!(BACKWARD_TEN, "backward_ten", Pointer, backward_ten);
instruction!(TO_START, "to_start", Pointer, to_start);
instruction!(TO_END, "to_end", Pointer, to_end);
instruction!(INCREMENT, "increment", Arithmetic, increment);
instruction!(DECREMENT, "decrement", Arithmetic, decrement);
instruction!(DOUBLE, "double", Arithmetic, double);
instruction!(HALVE, "halve", Arithmetic, halve);
instruction!(NEGATE, "negate", Arithmetic, negate);
instruction!(ZERO, "zero", Arithmetic, zero);
instruction!(SQUARE, "square", Arithmetic, square);
instruction!(SQUARE_ROOT, "square_root", Arithmetic, square_root);
instruction!(RECIPROCAL, "reciprocal", Arithmetic, reciprocal);
instruction!(INCREMENT_RANDOM, "increment_random", Arithmetic, increment_random);
instruction!(DECREMENT_RANDOM, "decrement_random", Arithmetic, decrement_random);
instruction!(ADD_NEXT, "add_next", Arithmetic, add_next);
instruction!(SUBTRACT_NEXT, "subtract_next", Arithmetic, subtract_next);
instruction!(MULTIPLY_NEXT, "multiply_next", Arithmetic, multiply_next);
instruction!(DIVIDE_NEXT, "divide_next", Arithmetic, divide_next);
instruction!(MODULO_NEXT, "modulo_next", Arithmetic, modulo_next);
instruction!(ABSOLUTE, "absolute", Arithmetic, absolute);
instruction!(PUSH, "push", Stack, push);
instruction!(POP, "pop", Stack, pop);
instruction!(DUPLICATE_TOP, "duplicate_top", Stack, duplicate_top);
instruction!(DROP_TOP, "drop_top", Stack, drop_top);
instruction!(SWAP_NEXT, "swap_next", SwapMinMax, swap_next);
instruction!(SWAP_PREVIOUS, "swap_previous", SwapMinMax, swap_previous);
instruction!(SWAP_ENDS, "swap_ends", SwapMinMax, swap_ends);
instruction!(MAX_NEXT, "max_next", SwapMinMax, max_next);
instruction!(MIN_NEXT, "min_next", SwapMinMax, min_next);
instruction!(SORT_TAPE, "sort_tape", SwapMinMax, sort_tape);
instruction!(REVERSE_TAPE, "reverse_tape", SwapMinMax, reverse_tape);
instruction!(READ_INPUT, "read_input", Input, read_input);
instruction!(ADD_INPUT, "add_input", Input, add_input);
instruction!(INPUT_COUNT, "input_count", Input, input_count);
instruction!(READ_ALL_INPUT, "read_all_input", Input, read_all_input);
instruction!(EMIT_CURRENT, "emit_current", Output, emit_current);
instruction!(EMIT_SUM, "emit_sum", Output, emit_sum);
instruction!(EMIT_MEAN, "emit_mean", Output, emit_mean);
instruction!(EMIT_MAX, "emit_max", Output, emit_max);
instruction!(EMIT_MIN, "emit_min", Output, emit_min);
instruction!(EMIT_PRODUCT, "emit_product", Output, emit_product);
instruction!(EMIT_LENGTH, "emit_length", Output, emit_length);
instruction!(HALT, "halt", Control, halt);
instruction!(GROW_TAPE, "grow_tape", Tape, grow_tape);
instruction!(SHRINK_TAPE, "shrink_tape", Tape, shrink_tape);
instruction!(CLEAR_TAPE, "clear_tape", Tape, clear_tape);
instruction!(TRUNCATE, "truncate", Conversion, truncate);
instruction!(ROUND, "round", Conversion, round);

macro_rules! entry {
    ($codon:literal, $since:ident, $instruction:ident) => {
        TableEntry {
            codon: $codon,
            since: RagarajaVersion::$since,
            choices: &[(1.0, $instruction)],
        }
    };
    ($codon:literal, $since:ident, [$(($weight:expr, $instruction:ident)),+ $(,)?]) => {
        TableEntry {
            codon: $codon,
            since: RagarajaVersion::$since,
            choices: &[$(($weight, $instruction)),+],
        }
    };
}

/// Ragaraja codons. Codons not listed here are not used in any version.
pub const RAGARAJA: &[TableEntry] = &[
    entry!("000", V0_1, FORWARD),
    entry!("001", V0_1, BACKWARD),
    entry!("002", V1_0, FORWARD_TEN),
    entry!("003", V1_0, BACKWARD_TEN),
    entry!("004", V0_1, TO_START),
    entry!("005", V1_0, TO_END),
    entry!("010", V0_1, INCREMENT),
    entry!("011", V0_1, DECREMENT),
    entry!("012", V0_1, DOUBLE),
    entry!("013", V0_1, HALVE),
    entry!("014", V0_1, NEGATE),
    entry!("015", V0_1, ZERO),
    entry!("016", V1_0, SQUARE),
    entry!("017", V1_0, SQUARE_ROOT),
    entry!("018", V1_0, RECIPROCAL),
    entry!("019", V1_0, ABSOLUTE),
    entry!("020", V0_1, INCREMENT_RANDOM),
    entry!("021", V0_1, DECREMENT_RANDOM),
    entry!("022", V1_0, ADD_NEXT),
    entry!("023", V1_0, SUBTRACT_NEXT),
    entry!("024", V1_0, MULTIPLY_NEXT),
    entry!("025", V1_0, DIVIDE_NEXT),
    entry!("026", V1_0, MODULO_NEXT),
    entry!("030", V1_0, PUSH),
    entry!("031", V1_0, POP),
    entry!("032", V1_0, DUPLICATE_TOP),
    entry!("033", V1_0, DROP_TOP),
    entry!("040", V1_0, SWAP_NEXT),
    entry!("041", V1_0, SWAP_PREVIOUS),
    entry!("042", V1_0, SWAP_ENDS),
    entry!("043", V1_0, MAX_NEXT),
    entry!("044", V1_0, MIN_NEXT),
    entry!("045", V1_0, SORT_TAPE),
    entry!("046", V1_0, REVERSE_TAPE),
    entry!("050", V0_1, READ_INPUT),
    entry!("051", V0_1, ADD_INPUT),
    entry!("052", V1_0, INPUT_COUNT),
    entry!("053", V1_0, READ_ALL_INPUT),
    entry!("060", V0_1, EMIT_CURRENT),
    entry!("061", V1_0, EMIT_SUM),
    entry!("062", V1_0, EMIT_MEAN),
    entry!("063", V1_0, EMIT_MAX),
    entry!("064", V1_0, EMIT_MIN),
    entry!("065", V1_0, EMIT_PRODUCT),
    entry!("066", V1_0, EMIT_LENGTH),
    entry!("070", V0_1, HALT),
    entry!("080", V1_0, GROW_TAPE),
    entry!("081", V1_0, SHRINK_TAPE),
    entry!("082", V1_0, CLEAR_TAPE),
    entry!("090", V1_0, TRUNCATE),
    entry!("091", V1_0, ROUND),
    entry!(
        "099",
        V1_0,
        [
            (0.25, FORWARD),
            (0.25, BACKWARD),
            (0.25, INCREMENT),
            (0.25, DECREMENT)
        ]
    ),
];

/// Nucleotide codons; every one of the 16 pairs is listed.
pub const NUCLEOTIDE: &[TableEntry] = &[
    entry!("AA", V0_1, FORWARD),
    entry!("AC", V0_1, BACKWARD),
    entry!("AG", V0_1, INCREMENT),
    entry!("AT", V0_1, DECREMENT),
    entry!("CA", V0_1, READ_INPUT),
    entry!("CC", V0_1, EMIT_CURRENT),
    entry!("CG", V0_1, SWAP_NEXT),
    entry!(
        "CT",
        V0_1,
        [
            (0.25, FORWARD),
            (0.25, BACKWARD),
            (0.25, INCREMENT),
            (0.25, DECREMENT)
        ]
    ),
    entry!("GA", V0_1, [(0.5, READ_INPUT), (0.5, EMIT_CURRENT)]),
    entry!("GC", V0_1, PUSH),
    entry!("GG", V0_1, POP),
    entry!("GT", V0_1, MAX_NEXT),
    entry!("TA", V0_1, MIN_NEXT),
    entry!("TC", V0_1, ADD_NEXT),
    entry!("TG", V0_1, HALT),
    entry!("TT", V0_1, NOT_USED),
];

fn not_used(_ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    Ok(Flow::Continue)
}

fn forward(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.pointer += 1;
    Ok(Flow::Continue)
}

fn backward(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.pointer -= 1;
    Ok(Flow::Continue)
}

fn forward_ten(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.pointer += 10;
    Ok(Flow::Continue)
}

fn backward_ten(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.pointer -= 10;
    Ok(Flow::Continue)
}

fn to_start(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.pointer = 0;
    Ok(Flow::Continue)
}

fn to_end(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.pointer = ctx.capacity as isize - 1;
    Ok(Flow::Continue)
}

fn increment(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.update_current(|v| Ok(v + 1.0))?;
    Ok(Flow::Continue)
}

fn decrement(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.update_current(|v| Ok(v - 1.0))?;
    Ok(Flow::Continue)
}

fn double(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.update_current(|v| Ok(v * 2.0))?;
    Ok(Flow::Continue)
}

fn halve(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.update_current(|v| Ok(v / 2.0))?;
    Ok(Flow::Continue)
}

fn negate(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.update_current(|v| Ok(-v))?;
    Ok(Flow::Continue)
}

fn zero(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.set_current(0.0)?;
    Ok(Flow::Continue)
}

fn square(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.update_current(|v| Ok(v * v))?;
    Ok(Flow::Continue)
}

fn square_root(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.update_current(|v| {
        if v < 0.0 {
            Err(ExecutionFault::InvalidConversion(v))
        } else {
            Ok(v.sqrt())
        }
    })?;
    Ok(Flow::Continue)
}

fn reciprocal(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.update_current(|v| {
        if v == 0.0 {
            Err(ExecutionFault::DivisionByZero)
        } else {
            Ok(1.0 / v)
        }
    })?;
    Ok(Flow::Continue)
}

fn absolute(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.update_current(|v| Ok(v.abs()))?;
    Ok(Flow::Continue)
}

fn increment_random(ctx: &mut ExecutionContext, rng: &mut dyn RngCore) -> Step {
    let index = rng.gen_range(0..ctx.capacity.max(1));
    let value = ctx.read(index)?;
    ctx.write(index, value + 1.0)?;
    Ok(Flow::Continue)
}

fn decrement_random(ctx: &mut ExecutionContext, rng: &mut dyn RngCore) -> Step {
    let index = rng.gen_range(0..ctx.capacity.max(1));
    let value = ctx.read(index)?;
    ctx.write(index, value - 1.0)?;
    Ok(Flow::Continue)
}

fn add_next(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    let next = ctx.next()?;
    ctx.update_current(|v| Ok(v + next))?;
    Ok(Flow::Continue)
}

fn subtract_next(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    let next = ctx.next()?;
    ctx.update_current(|v| Ok(v - next))?;
    Ok(Flow::Continue)
}

fn multiply_next(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    let next = ctx.next()?;
    ctx.update_current(|v| Ok(v * next))?;
    Ok(Flow::Continue)
}

fn divide_next(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    let next = ctx.next()?;
    if next == 0.0 {
        return Err(ExecutionFault::DivisionByZero);
    }
    ctx.update_current(|v| Ok(v / next))?;
    Ok(Flow::Continue)
}

fn modulo_next(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    let next = ctx.next()?;
    if next == 0.0 {
        return Err(ExecutionFault::DivisionByZero);
    }
    ctx.update_current(|v| Ok(v.rem_euclid(next)))?;
    Ok(Flow::Continue)
}

// The end of the tape doubles as a stack.

fn push(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    let value = ctx.current()?;
    ctx.tape.push(value);
    Ok(Flow::Continue)
}

fn pop(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    let value = ctx.tape.pop().ok_or(ExecutionFault::EmptyTape)?;
    ctx.set_current(value)?;
    Ok(Flow::Continue)
}

fn duplicate_top(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    let top = *ctx.tape.last().ok_or(ExecutionFault::EmptyTape)?;
    ctx.tape.push(top);
    Ok(Flow::Continue)
}

fn drop_top(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.tape.pop().ok_or(ExecutionFault::EmptyTape)?;
    Ok(Flow::Continue)
}

fn swap_cells(ctx: &mut ExecutionContext, a: usize, b: usize) -> Step {
    let len = ctx.tape.len();
    if a >= len || b >= len {
        return Err(ExecutionFault::OutOfRange {
            index: a.max(b),
            len,
        });
    }
    ctx.tape.swap(a, b);
    Ok(Flow::Continue)
}

fn swap_next(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    let (a, b) = (ctx.index(), ctx.offset(1));
    swap_cells(ctx, a, b)
}

fn swap_previous(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    let (a, b) = (ctx.index(), ctx.offset(-1));
    swap_cells(ctx, a, b)
}

fn swap_ends(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    let last = ctx.tape.len().checked_sub(1).ok_or(ExecutionFault::EmptyTape)?;
    swap_cells(ctx, 0, last)
}

fn max_next(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    let next = ctx.next()?;
    ctx.update_current(|v| Ok(v.max(next)))?;
    Ok(Flow::Continue)
}

fn min_next(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    let next = ctx.next()?;
    ctx.update_current(|v| Ok(v.min(next)))?;
    Ok(Flow::Continue)
}

fn sort_tape(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.tape.sort_by(f64::total_cmp);
    Ok(Flow::Continue)
}

fn reverse_tape(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.tape.reverse();
    Ok(Flow::Continue)
}

fn read_input(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    if let Some(value) = ctx.input.pop_front() {
        ctx.set_current(value)?;
    }
    Ok(Flow::Continue)
}

fn add_input(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    if let Some(value) = ctx.input.pop_front() {
        ctx.update_current(|v| Ok(v + value))?;
    }
    Ok(Flow::Continue)
}

fn input_count(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    let count = ctx.input.len() as f64;
    ctx.set_current(count)?;
    Ok(Flow::Continue)
}

fn read_all_input(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    let mut delta = 0;
    while let Some(value) = ctx.input.pop_front() {
        let index = ctx.offset(delta);
        ctx.write(index, value)?;
        delta += 1;
    }
    Ok(Flow::Continue)
}

fn emit_current(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    let value = ctx.current()?;
    ctx.emit(value)?;
    Ok(Flow::Continue)
}

fn emit_sum(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    let sum = ctx.tape.iter().sum::<f64>();
    ctx.emit(sum)?;
    Ok(Flow::Continue)
}

fn emit_mean(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    if ctx.tape.is_empty() {
        return Err(ExecutionFault::EmptyTape);
    }
    let mean = finite(ctx.tape.iter().sum::<f64>())? / ctx.tape.len() as f64;
    ctx.emit(mean)?;
    Ok(Flow::Continue)
}

fn emit_max(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    let max = ctx
        .tape
        .iter()
        .copied()
        .reduce(f64::max)
        .ok_or(ExecutionFault::EmptyTape)?;
    ctx.emit(max)?;
    Ok(Flow::Continue)
}

fn emit_min(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    let min = ctx
        .tape
        .iter()
        .copied()
        .reduce(f64::min)
        .ok_or(ExecutionFault::EmptyTape)?;
    ctx.emit(min)?;
    Ok(Flow::Continue)
}

fn emit_product(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    let product = ctx.tape.iter().product::<f64>();
    ctx.emit(product)?;
    Ok(Flow::Continue)
}

fn emit_length(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    let len = ctx.tape.len() as f64;
    ctx.emit(len)?;
    Ok(Flow::Continue)
}

fn halt(_ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    Ok(Flow::Halt)
}

fn grow_tape(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.tape.push(0.0);
    Ok(Flow::Continue)
}

fn shrink_tape(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.tape.pop().ok_or(ExecutionFault::EmptyTape)?;
    Ok(Flow::Continue)
}

fn clear_tape(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.tape.fill(0.0);
    Ok(Flow::Continue)
}

fn truncate(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.update_current(|v| to_integer(v.trunc()))?;
    Ok(Flow::Continue)
}

fn round(ctx: &mut ExecutionContext, _rng: &mut dyn RngCore) -> Step {
    ctx.update_current(|v| to_integer(v.round()))?;
    Ok(Flow::Continue)
}

fn to_integer(value: f64) -> Result<f64, ExecutionFault> {
    if !value.is_finite() || value.abs() >= i64::MAX as f64 {
        return Err(ExecutionFault::InvalidConversion(value));
    }
    Ok(value as i64 as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ctx(tape: Vec<f64>) -> ExecutionContext {
        ExecutionContext {
            capacity: tape.len(),
            tape,
            ..Default::default()
        }
    }

    fn run(instruction: Instruction, ctx: &mut ExecutionContext) -> Step {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        (instruction.handler)(ctx, &mut rng)
    }

    #[test]
    fn test_ragaraja_codons_are_unique() {
        let mut codons: Vec<&str> = RAGARAJA.iter().map(|e| e.codon).collect();
        let before = codons.len();
        codons.sort_unstable();
        codons.dedup();
        assert_eq!(codons.len(), before);
        assert!(RAGARAJA.iter().all(|e| e.codon.len() == 3));
    }

    #[test]
    fn test_nucleotide_covers_codon_space() {
        assert_eq!(NUCLEOTIDE.len(), 16);
        assert!(NUCLEOTIDE.iter().all(|e| e.codon.len() == 2));
    }

    #[test]
    fn test_ambiguous_weights_sum_to_one() {
        for entry in RAGARAJA.iter().chain(NUCLEOTIDE) {
            let total: f64 = entry.choices.iter().map(|(w, _)| w).sum();
            assert!((total - 1.0).abs() < 1e-12, "codon {}", entry.codon);
        }
    }

    #[test]
    fn test_overflow_is_reported() {
        let mut c = ctx(vec![f64::MAX, 0.0]);
        assert_eq!(run(DOUBLE, &mut c), Err(ExecutionFault::Overflow));
        assert_eq!(c.tape[0], f64::MAX);
    }

    #[test]
    fn test_negative_square_root_is_invalid() {
        let mut c = ctx(vec![-4.0]);
        assert_eq!(
            run(SQUARE_ROOT, &mut c),
            Err(ExecutionFault::InvalidConversion(-4.0))
        );
    }

    #[test]
    fn test_stack_roundtrip() {
        let mut c = ctx(vec![3.0, 0.0]);
        run(PUSH, &mut c).unwrap();
        assert_eq!(c.tape, vec![3.0, 0.0, 3.0]);
        c.pointer = 1;
        run(POP, &mut c).unwrap();
        assert_eq!(c.tape, vec![3.0, 3.0]);
    }

    #[test]
    fn test_pop_from_empty_tape_faults() {
        let mut c = ctx(Vec::new());
        assert_eq!(run(POP, &mut c), Err(ExecutionFault::EmptyTape));
    }

    #[test]
    fn test_swap_and_minmax() {
        let mut c = ctx(vec![1.0, 5.0, 2.0]);
        run(SWAP_NEXT, &mut c).unwrap();
        assert_eq!(c.tape, vec![5.0, 1.0, 2.0]);
        run(MIN_NEXT, &mut c).unwrap();
        assert_eq!(c.tape[0], 1.0);
        run(SWAP_ENDS, &mut c).unwrap();
        assert_eq!(c.tape, vec![2.0, 1.0, 1.0]);
        run(SORT_TAPE, &mut c).unwrap();
        assert_eq!(c.tape, vec![1.0, 1.0, 2.0]);
    }

    #[test]
    fn test_output_aggregation() {
        let mut c = ctx(vec![1.0, 2.0, 3.0]);
        for instruction in [EMIT_SUM, EMIT_MEAN, EMIT_MAX, EMIT_MIN, EMIT_PRODUCT, EMIT_LENGTH] {
            run(instruction, &mut c).unwrap();
        }
        assert_eq!(c.output, vec![6.0, 2.0, 3.0, 1.0, 6.0, 3.0]);
    }

    #[test]
    fn test_read_all_input_wraps() {
        let mut c = ctx(vec![0.0, 0.0]);
        c.pointer = 1;
        c.input = vec![7.0, 8.0].into();
        run(READ_ALL_INPUT, &mut c).unwrap();
        assert_eq!(c.tape, vec![8.0, 7.0]);
        assert!(c.input.is_empty());
    }

    #[test]
    fn test_truncate_and_round() {
        let mut c = ctx(vec![2.7]);
        run(ROUND, &mut c).unwrap();
        assert_eq!(c.tape[0], 3.0);
        c.tape[0] = -2.7;
        run(TRUNCATE, &mut c).unwrap();
        assert_eq!(c.tape[0], -2.0);
        c.tape[0] = 1e300;
        assert!(matches!(
            run(TRUNCATE, &mut c),
            Err(ExecutionFault::InvalidConversion(_))
        ));
    }

    #[test]
    fn test_modulo_by_zero() {
        let mut c = ctx(vec![5.0, 0.0]);
        assert_eq!(run(MODULO_NEXT, &mut c), Err(ExecutionFault::DivisionByZero));
        c.tape[1] = 3.0;
        run(MODULO_NEXT, &mut c).unwrap();
        assert_eq!(c.tape[0], 2.0);
    }
}
