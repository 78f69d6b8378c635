use super::{Edit, GenomeError, MutationKind, MutationWindow};
use dose_data::Chromosome;
use rand::Rng;

pub fn mutate_with_rng<R: Rng + ?Sized>(
    chromosome: &mut Chromosome,
    kind: MutationKind,
    rate: f64,
    window: MutationWindow,
    rng: &mut R,
) -> Result<usize, GenomeError> {
    let len = chromosome.len();
    if window.start > window.end || window.end > len {
        return Err(GenomeError::WindowOutOfBounds {
            start: window.start,
            end: window.end,
            len,
        });
    }

    let mut start = window.start;
    if start == window.end {
        if !window.legacy_empty_window {
            return Ok(0);
        }
        start = 0;
    }

    if matches!(kind, MutationKind::Point | MutationKind::Insert) && chromosome.alphabet.is_empty()
    {
        return Err(GenomeError::EmptyAlphabet);
    }

    let span = (window.end - start) as f64;
    let count = ((chromosome.background_mutation + rate) * span).floor().max(0.0) as usize;

    let mut applied = 0;
    for _ in 0..count {
        // Insertions and deletions move the tail, so the window is clipped
        // against the current length before every edit.
        let end = window.end.min(chromosome.len());
        if start >= end {
            break;
        }
        let position = rng.gen_range(start..end);
        let edit = match kind {
            MutationKind::Point => Edit::Point {
                position,
                symbol: random_symbol(chromosome, rng),
            },
            MutationKind::Insert => Edit::Insert {
                position,
                symbol: random_symbol(chromosome, rng),
            },
            MutationKind::Delete => Edit::Delete { position },
            MutationKind::Invert => Edit::Invert {
                start: position,
                end: rng.gen_range(position + 1..=end),
            },
            MutationKind::Duplicate => Edit::Duplicate {
                start: position,
                end: rng.gen_range(position + 1..=end),
            },
            MutationKind::Translocate => {
                let run_end = rng.gen_range(position + 1..=end);
                let remaining = chromosome.len() - (run_end - position);
                Edit::Translocate {
                    start: position,
                    end: run_end,
                    target: rng.gen_range(0..=remaining),
                }
            }
        };
        apply_edit(chromosome, &edit)?;
        applied += 1;
    }

    Ok(applied)
}

fn random_symbol<R: Rng + ?Sized>(chromosome: &Chromosome, rng: &mut R) -> char {
    chromosome.alphabet[rng.gen_range(0..chromosome.alphabet.len())]
}

pub fn apply_edit(chromosome: &mut Chromosome, edit: &Edit) -> Result<(), GenomeError> {
    let sequence = &mut chromosome.sequence;
    let len = sequence.len();
    match *edit {
        Edit::Point { position, symbol } => {
            let slot = sequence
                .get_mut(position)
                .ok_or(GenomeError::PositionOutOfBounds { position, len })?;
            *slot = symbol;
        }
        Edit::Insert { position, symbol } => {
            if position > len {
                return Err(GenomeError::PositionOutOfBounds { position, len });
            }
            sequence.insert(position, symbol);
        }
        Edit::Delete { position } => {
            if position >= len {
                return Err(GenomeError::PositionOutOfBounds { position, len });
            }
            sequence.remove(position);
        }
        Edit::Invert { start, end } => {
            check_run(start, end, len)?;
            sequence[start..end].reverse();
        }
        Edit::Duplicate { start, end } => {
            check_run(start, end, len)?;
            let copy: Vec<char> = sequence[start..end].to_vec();
            sequence.splice(end..end, copy);
        }
        Edit::Translocate { start, end, target } => {
            check_run(start, end, len)?;
            let remaining = len - (end - start);
            if target > remaining {
                return Err(GenomeError::PositionOutOfBounds {
                    position: target,
                    len: remaining,
                });
            }
            let run: Vec<char> = sequence.drain(start..end).collect();
            sequence.splice(target..target, run);
        }
    }
    Ok(())
}

fn check_run(start: usize, end: usize, len: usize) -> Result<(), GenomeError> {
    if start >= end || end > len {
        return Err(GenomeError::WindowOutOfBounds { start, end, len });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn chromosome(seq: &str, background: f64) -> Chromosome {
        Chromosome::parse(seq, "0123456789", background)
    }

    #[test]
    fn test_point_mutation_count_law() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut c = Chromosome::parse(&"0".repeat(80), "01", 0.125);
        let applied =
            mutate_with_rng(&mut c, MutationKind::Point, 0.125, MutationWindow::whole(80), &mut rng)
                .unwrap();
        assert_eq!(applied, 20);
        assert_eq!(c.len(), 80);
        assert!(c.sequence.iter().all(|s| *s == '0' || *s == '1'));
    }

    #[test]
    fn test_insert_and_delete_change_length() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut c = chromosome(&"5".repeat(100), 0.0);
        mutate_with_rng(&mut c, MutationKind::Insert, 0.1, MutationWindow::whole(100), &mut rng)
            .unwrap();
        assert_eq!(c.len(), 110);

        let applied =
            mutate_with_rng(&mut c, MutationKind::Delete, 0.5, MutationWindow::whole(110), &mut rng)
                .unwrap();
        assert_eq!(applied, 55);
        assert_eq!(c.len(), 55);
    }

    #[test]
    fn test_delete_can_empty_the_sequence() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut c = chromosome("1234", 0.0);
        let applied =
            mutate_with_rng(&mut c, MutationKind::Delete, 1.0, MutationWindow::whole(4), &mut rng)
                .unwrap();
        assert_eq!(applied, 4);
        assert!(c.is_empty());
    }

    #[test]
    fn test_invert_preserves_symbols() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut c = chromosome("0123456789", 0.0);
        mutate_with_rng(&mut c, MutationKind::Invert, 0.3, MutationWindow::whole(10), &mut rng)
            .unwrap();
        let mut sorted = c.sequence.clone();
        sorted.sort_unstable();
        assert_eq!(sorted.iter().collect::<String>(), "0123456789");
    }

    #[test]
    fn test_translocate_preserves_length() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut c = chromosome("0123456789", 0.0);
        mutate_with_rng(&mut c, MutationKind::Translocate, 0.5, MutationWindow::whole(10), &mut rng)
            .unwrap();
        assert_eq!(c.len(), 10);
    }

    #[test]
    fn test_edits_stay_inside_window() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let mut c = Chromosome::parse(&"0".repeat(30), "1", 0.0);
        mutate_with_rng(&mut c, MutationKind::Point, 1.0, MutationWindow::new(10, 20), &mut rng)
            .unwrap();
        assert!(c.sequence[..10].iter().all(|s| *s == '0'));
        assert!(c.sequence[20..].iter().all(|s| *s == '0'));
        assert!(c.sequence[10..20].contains(&'1'));
    }

    #[test]
    fn test_empty_window_is_noop_by_default() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut c = Chromosome::parse("0000", "1", 0.0);
        let applied =
            mutate_with_rng(&mut c, MutationKind::Point, 1.0, MutationWindow::new(3, 3), &mut rng)
                .unwrap();
        assert_eq!(applied, 0);
        assert_eq!(c.as_string(), "0000");
    }

    #[test]
    fn test_legacy_empty_window_widens_from_zero() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut c = Chromosome::parse("0000", "1", 0.0);
        let window = MutationWindow::new(3, 3).with_legacy_empty_window(true);
        let applied = mutate_with_rng(&mut c, MutationKind::Point, 1.0, window, &mut rng).unwrap();
        assert_eq!(applied, 3);
        assert_eq!(c.sequence[3], '0');
    }

    #[test]
    fn test_window_beyond_length_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut c = chromosome("0000", 0.0);
        let result =
            mutate_with_rng(&mut c, MutationKind::Point, 0.5, MutationWindow::new(0, 5), &mut rng);
        assert_eq!(
            result,
            Err(GenomeError::WindowOutOfBounds {
                start: 0,
                end: 5,
                len: 4
            })
        );
    }

    #[test]
    fn test_empty_alphabet_rejected_for_substitution() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut c = Chromosome::parse("0000", "", 0.0);
        let result =
            mutate_with_rng(&mut c, MutationKind::Point, 0.5, MutationWindow::whole(4), &mut rng);
        assert_eq!(result, Err(GenomeError::EmptyAlphabet));
    }

    #[test]
    fn test_scripted_edits() {
        let mut c = chromosome("abcdef", 0.0);
        apply_edit(&mut c, &Edit::Point { position: 0, symbol: 'z' }).unwrap();
        assert_eq!(c.as_string(), "zbcdef");
        apply_edit(&mut c, &Edit::Insert { position: 6, symbol: 'g' }).unwrap();
        assert_eq!(c.as_string(), "zbcdefg");
        apply_edit(&mut c, &Edit::Delete { position: 0 }).unwrap();
        assert_eq!(c.as_string(), "bcdefg");
        apply_edit(&mut c, &Edit::Invert { start: 0, end: 3 }).unwrap();
        assert_eq!(c.as_string(), "dcbefg");
        apply_edit(&mut c, &Edit::Duplicate { start: 0, end: 2 }).unwrap();
        assert_eq!(c.as_string(), "dcdcbefg");
        apply_edit(
            &mut c,
            &Edit::Translocate {
                start: 0,
                end: 2,
                target: 6,
            },
        )
        .unwrap();
        assert_eq!(c.as_string(), "dcbefgdc");
    }

    #[test]
    fn test_scripted_edit_out_of_bounds() {
        let mut c = chromosome("abc", 0.0);
        assert!(apply_edit(&mut c, &Edit::Delete { position: 3 }).is_err());
        assert!(apply_edit(&mut c, &Edit::Invert { start: 2, end: 2 }).is_err());
        assert!(apply_edit(
            &mut c,
            &Edit::Translocate {
                start: 0,
                end: 2,
                target: 2
            }
        )
        .is_err());
        assert_eq!(c.as_string(), "abc");
    }
}
