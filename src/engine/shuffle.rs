use rand::Rng;

/// Fisher-Yates permutation in place.
///
/// Walks from the back, swapping each slot with a uniformly drawn slot at or
/// before it, so every ordering of `items` is equally likely. Slices of
/// length 0 or 1 are left untouched and draw nothing from `rng`.
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    let mut remaining = items.len();
    while remaining > 1 {
        let pick = rng.random_range(0..remaining);
        remaining -= 1;
        items.swap(remaining, pick);
    }
}

pub fn shuffled<T, R: Rng + ?Sized>(mut items: Vec<T>, rng: &mut R) -> Vec<T> {
    fisher_yates(&mut items, rng);
    items
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn empty_and_single_are_untouched() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut empty: Vec<u8> = Vec::new();
        fisher_yates(&mut empty, &mut rng);
        assert!(empty.is_empty());

        let mut one = vec![42];
        fisher_yates(&mut one, &mut rng);
        assert_eq!(one, vec![42]);
    }

    #[test]
    fn all_orderings_of_three_show_up_evenly() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts: HashMap<Vec<u8>, u32> = HashMap::new();
        let trials = 60_000;
        for _ in 0..trials {
            let order = shuffled(vec![0u8, 1, 2], &mut rng);
            *counts.entry(order).or_default() += 1;
        }
        assert_eq!(counts.len(), 6);
        let expected = trials / 6;
        for (order, count) in counts {
            let drift = (count as i64 - expected as i64).abs();
            // ~10 standard deviations for p = 1/6 over 60k draws
            assert!(drift < 900, "{order:?} drawn {count} times");
        }
    }

    #[test]
    fn first_slot_is_uniform() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut hits = [0u32; 8];
        for _ in 0..40_000 {
            let order = shuffled((0..8).collect::<Vec<usize>>(), &mut rng);
            hits[order[0]] += 1;
        }
        for count in hits {
            assert!((4_300..5_700).contains(&count), "skewed first slot: {hits:?}");
        }
    }

    proptest! {
        #[test]
        fn output_is_a_permutation(items in proptest::collection::vec(any::<u16>(), 0..64), seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut out = shuffled(items.clone(), &mut rng);
            let mut expected = items;
            out.sort_unstable();
            expected.sort_unstable();
            prop_assert_eq!(out, expected);
        }
    }
}
