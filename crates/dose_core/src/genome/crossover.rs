use dose_data::Chromosome;

/// Swaps tails at `point`.
///
/// When `point` runs past the second parent, the shorter parent is kept whole
/// and joined to the remainder of the longer one, so the children's lengths
/// always add up to the parents'. Children inherit the first parent's
/// alphabet and background rate.
pub fn crossover_at(first: &Chromosome, second: &Chromosome, point: usize) -> (Chromosome, Chromosome) {
    let point = point.min(first.len());
    let a = &first.sequence;
    let b = &second.sequence;

    let (left, right): (Vec<char>, Vec<char>) = if point <= b.len() {
        (
            a[..point].iter().chain(&b[point..]).copied().collect(),
            b[..point].iter().chain(&a[point..]).copied().collect(),
        )
    } else {
        (
            b.iter().chain(&a[point..]).copied().collect(),
            a[..point].to_vec(),
        )
    };

    let child = |sequence| {
        Chromosome::new(
            sequence,
            first.alphabet.clone(),
            first.background_mutation,
        )
    };
    (child(left), child(right))
}
