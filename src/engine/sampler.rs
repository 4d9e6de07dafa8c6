use rand::seq::SliceRandom;
use rand::Rng;

/// Draw `min(n, points.len())` distinct elements uniformly at random, without
/// replacement. Order of the result is unspecified.
pub fn sample<T: Clone>(points: &[T], n: usize) -> Vec<T> {
    sample_with_rng(points, n, &mut rand::thread_rng())
}

pub fn sample_with_rng<T: Clone, R: Rng + ?Sized>(points: &[T], n: usize, rng: &mut R) -> Vec<T> {
    points.choose_multiple(rng, n).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_sample_size_is_capped_at_len() {
        let points: Vec<u32> = (0..10).collect();
        let picked = sample(&points, 60);
        assert_eq!(picked.len(), 10);
        let unique: HashSet<u32> = picked.into_iter().collect();
        assert_eq!(unique.len(), 10);
    }

    #[test]
    fn test_sample_without_replacement() {
        let points: Vec<u32> = (0..1000).collect();
        let picked = sample(&points, 60);
        assert_eq!(picked.len(), 60);
        let unique: HashSet<u32> = picked.iter().copied().collect();
        assert_eq!(unique.len(), 60);
        assert!(picked.iter().all(|p| *p < 1000));
    }

    #[test]
    fn test_sample_does_not_mutate_input() {
        let points: Vec<u32> = (0..50).collect();
        let before = points.clone();
        let _ = sample(&points, 10);
        assert_eq!(points, before);
    }

    #[test]
    fn test_sample_empty_and_zero() {
        let empty: Vec<u32> = Vec::new();
        assert!(sample(&empty, 5).is_empty());
        assert!(sample(&[1, 2, 3], 0).is_empty());
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let points: Vec<u32> = (0..100).collect();
        let a = sample_with_rng(&points, 5, &mut StdRng::seed_from_u64(7));
        let b = sample_with_rng(&points, 5, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_element_can_be_drawn() {
        let points: Vec<u32> = (0..5).collect();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            seen.extend(sample_with_rng(&points, 1, &mut rng));
        }
        assert_eq!(seen.len(), 5);
    }
}
