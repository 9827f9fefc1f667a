#[doc(hidden)]
pub mod bench;

use crate::dtype::DType;
use rand::Rng;
use rand::seq::SliceRandom;

/// Chance that [`mutate`] perturbs a value.
pub const MUTATION_RATE: f64 = 0.1;
/// Largest absolute offset [`mutate`] adds.
pub const MUTATION_RANGE: f64 = 0.1;

/// Returns a uniformly random permutation of `samples` (Fisher-Yates).
pub fn shuffle<T: Clone>(samples: &[T]) -> Vec<T> {
    shuffle_with(&mut rand::thread_rng(), samples)
}

pub fn shuffle_with<T, R>(rng: &mut R, samples: &[T]) -> Vec<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    let mut shuffled = samples.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

/// With probability [`MUTATION_RATE`] returns `x` plus a uniform offset in
/// `[-MUTATION_RANGE, MUTATION_RANGE]`, otherwise `x` unchanged.
pub fn mutate<F: DType>(x: F) -> F {
    mutate_with(&mut rand::thread_rng(), x)
}

pub fn mutate_with<F: DType, R: Rng + ?Sized>(rng: &mut R, x: F) -> F {
    if rng.gen_bool(MUTATION_RATE) {
        x + F::from_f64(rng.gen_range(-MUTATION_RANGE..=MUTATION_RANGE))
    } else {
        x
    }
}

/// Index of the first largest value; NaN entries never win.
pub fn argmax<F: DType>(values: &[F]) -> Option<usize> {
    let mut best: Option<(usize, F)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if b >= v => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Target vector with a single `1` at `label`.
pub fn one_hot<F: DType>(label: usize, len: usize) -> Vec<F> {
    assert!(label < len, "label {label} out of range for {len} classes");
    let mut v = vec![F::ZERO; len];
    v[label] = F::ONE;
    v
}

#[cfg(test)]
mod test {
    use super::{argmax, mutate_with, one_hot, shuffle, shuffle_with};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_shuffle_preserves_elements() {
        let samples: Vec<u32> = vec![4, 1, 1, 9, 2, 2, 2, 7];
        let mut shuffled = shuffle(&samples);
        assert_eq!(shuffled.len(), samples.len());
        shuffled.sort();
        let mut sorted = samples.clone();
        sorted.sort();
        assert_eq!(shuffled, sorted);
    }

    #[test]
    fn test_shuffle_empty() {
        let empty: Vec<u8> = Vec::new();
        assert!(shuffle(&empty).is_empty());
    }

    #[test]
    fn test_shuffle_uniform_positions() {
        const N: usize = 5;
        const TRIALS: usize = 50_000;
        let mut rng = StdRng::seed_from_u64(0xf666);
        let samples: Vec<usize> = (0..N).collect();
        let mut counts = [[0usize; N]; N];
        for _ in 0..TRIALS {
            for (pos, &el) in shuffle_with(&mut rng, &samples).iter().enumerate() {
                counts[el][pos] += 1;
            }
        }
        // expected 10_000 per cell, sd ~ 89
        let expected = TRIALS / N;
        for row in counts {
            for count in row {
                assert!(count.abs_diff(expected) < 600, "count {count} too far from {expected}");
            }
        }
    }

    #[test]
    fn test_mutate_rate_and_range() {
        let mut rng = StdRng::seed_from_u64(0x1234);
        let trials = 20_000;
        let mut changed = 0;
        for _ in 0..trials {
            let y = mutate_with(&mut rng, 0.5f64);
            assert!((0.4..=0.6).contains(&y), "{y} out of range");
            if y != 0.5 {
                changed += 1;
            }
        }
        // ~2000 expected, sd ~ 42
        assert!((1700..2300).contains(&changed), "changed {changed} of {trials}");
    }

    #[test]
    fn test_argmax() {
        assert_eq!(argmax::<f32>(&[]), None);
        assert_eq!(argmax(&[0.1f32, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[0.5f32, 0.5, 0.2]), Some(0));
        assert_eq!(argmax(&[f64::NAN, -1.0, -2.0]), Some(1));
        assert_eq!(argmax(&[f64::NAN]), None);
    }

    #[test]
    fn test_one_hot() {
        assert_eq!(one_hot::<f32>(2, 3), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    #[should_panic]
    fn test_one_hot_out_of_range() {
        one_hot::<f32>(3, 3);
    }
}
