//! k-means++ style seeding: centers drawn with probability proportional to
//! squared distance from the centers chosen so far.
use log::{debug, warn};
use rand::Rng;

use crate::error::{ClusterError, Result};
use crate::ml::clustering::dataset::{self, Dataset};
use crate::ml::clustering::metric::Metric;

/// Selects `k` centers by distance-weighted sampling.
///
/// The first center is the first point of `data`. Every following center is
/// drawn by inverse-CDF sampling over the points in dataset order, where each
/// point weighs the square of its distance to the nearest chosen center. One
/// uniform draw `u` in `[0, 1)` is taken per center and the first point whose
/// cumulative probability exceeds `u` is selected, so points already at
/// distance zero are never picked.
///
/// Distances are divided by their maximum before squaring, so huge
/// coordinates cannot overflow the total weight. If every point already sits
/// on a chosen center the total weight is zero and the draw falls back to a
/// uniform choice over all points.
///
/// Pass a seeded generator (e.g. `ChaCha8Rng::seed_from_u64`) for
/// reproducible output.
///
/// # Errors
/// * `InvalidClusterCount` if `k == 0` or `k > data.len()`
/// * `UnrecognizedDataset` if the points are ragged or hold non-finite values
///
/// # Examples
/// ```
/// use clustr::ml::clustering::metric::Euclidean;
/// use clustr::ml::clustering::probabilistic::probabilistic_seeds;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let data: Vec<Vec<f64>> = vec![vec![0.0], vec![1.0], vec![10.0], vec![11.0]];
/// let mut rng = ChaCha8Rng::seed_from_u64(7);
/// let centers = probabilistic_seeds(&data, 2, &Euclidean, &mut rng).unwrap();
/// assert_eq!(centers.len(), 2);
/// assert_eq!(centers[0], vec![0.0]);
/// ```
pub fn probabilistic_seeds<D, M, R>(
    data: &D,
    k: usize,
    metric: &M,
    rng: &mut R,
) -> Result<Vec<Vec<f64>>>
where
    D: Dataset + ?Sized,
    M: Metric + ?Sized,
    R: Rng + ?Sized,
{
    let n = data.len();
    if k == 0 || k > n {
        return Err(ClusterError::InvalidClusterCount { k, n });
    }
    dataset::validate(data)?;

    let first = data.point(0);
    let mut centers = Vec::with_capacity(k);
    centers.push(first.to_vec());

    // Distance from each point to its nearest chosen center.
    let mut nearest: Vec<f64> = data.points().map(|p| metric.distance(first, p)).collect();

    while centers.len() < k {
        let weights = sampling_weights(&nearest);
        let u: f64 = rng.gen();
        let index = sample_index(&weights, u);

        debug!(
            "probabilistic center {} = point {} (u = {}, weight = {})",
            centers.len(),
            index,
            u,
            weights[index]
        );

        let center = data.point(index);
        for (slot, point) in nearest.iter_mut().zip(data.points()) {
            let d = metric.distance(center, point);
            if d < *slot {
                *slot = d;
            }
        }
        centers.push(center.to_vec());
    }

    Ok(centers)
}

/// Squared distances scaled by the largest distance, each in `[0, 1]`.
///
/// An infinite distance gets weight 1 and every finite one weight 0. NaN
/// distances get weight 0.
fn sampling_weights(distances: &[f64]) -> Vec<f64> {
    let max = distances.iter().copied().fold(0.0, f64::max);
    if max.is_infinite() {
        return distances
            .iter()
            .map(|d| if d.is_infinite() { 1.0 } else { 0.0 })
            .collect();
    }
    distances
        .iter()
        .map(|&d| {
            if max > 0.0 && d > 0.0 {
                (d / max).powi(2)
            } else {
                0.0
            }
        })
        .collect()
}

/// Inverse-CDF draw over `weights` using the uniform sample `u` in `[0, 1)`.
///
/// Returns the first index whose cumulative normalized weight exceeds `u`.
/// A zero total falls back to a uniform pick.
fn sample_index(weights: &[f64], u: f64) -> usize {
    let n = weights.len();
    let total: f64 = weights.iter().sum();

    if total <= 0.0 {
        warn!(
            "all {} points carry zero sampling weight; falling back to a uniform draw",
            n
        );
        return ((u * n as f64) as usize).min(n - 1);
    }

    let mut cumulative = 0.0;
    let mut last_positive = 0;
    for (i, &w) in weights.iter().enumerate() {
        if w > 0.0 {
            last_positive = i;
        }
        cumulative += w / total;
        if cumulative > u {
            return i;
        }
    }
    // Rounding can leave the final cumulative sum just below `u`.
    last_positive
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::clustering::farthest_first::farthest_first_seeds;
    use crate::ml::clustering::metric::Euclidean;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn two_groups() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![100.0, 100.0],
            vec![100.0, 101.0],
            vec![101.0, 100.0],
        ]
    }

    /// A generator whose `gen::<f64>()` is always 0.0.
    fn zero_rng() -> StepRng {
        StepRng::new(0, 0)
    }

    #[test]
    fn test_sample_index_inverse_cdf() {
        let weights = [0.0, 1.0, 0.0, 3.0];
        assert_eq!(sample_index(&weights, 0.0), 1);
        assert_eq!(sample_index(&weights, 0.2), 1);
        assert_eq!(sample_index(&weights, 0.25), 3);
        assert_eq!(sample_index(&weights, 0.99), 3);
    }

    #[test]
    fn test_sample_index_rounding_stays_on_positive_weight() {
        let weights = [1.0, 1.0, 1.0, 0.0];
        assert_eq!(sample_index(&weights, 1.0 - f64::EPSILON / 2.0), 2);
    }

    #[test]
    fn test_sample_index_zero_total_is_uniform() {
        let weights = [0.0; 4];
        assert_eq!(sample_index(&weights, 0.0), 0);
        assert_eq!(sample_index(&weights, 0.3), 1);
        assert_eq!(sample_index(&weights, 0.99), 3);
    }

    #[test]
    fn test_sampling_weights_are_scaled() {
        assert_eq!(sampling_weights(&[0.0, 1.0, 2.0]), vec![0.0, 0.25, 1.0]);
        assert_eq!(sampling_weights(&[0.0, 0.0]), vec![0.0, 0.0]);
        assert_eq!(
            sampling_weights(&[0.0, 3.0, f64::INFINITY]),
            vec![0.0, 0.0, 1.0]
        );
        assert_eq!(sampling_weights(&[f64::NAN, 2.0]), vec![0.0, 1.0]);
    }

    #[test]
    fn test_huge_coordinates_keep_zero_distance_points_out() {
        let data: Vec<Vec<f64>> = vec![vec![0.0], vec![0.0], vec![1e200]];
        let centers = probabilistic_seeds(&data, 2, &Euclidean, &mut zero_rng()).unwrap();
        assert_eq!(centers, vec![vec![0.0], vec![1e200]]);
        assert_eq!(centers, farthest_first_seeds(&data, 2, &Euclidean).unwrap());

        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let centers = probabilistic_seeds(&data, 2, &Euclidean, &mut rng).unwrap();
        assert_eq!(centers[1], vec![1e200]);
    }

    #[test]
    fn test_rejects_non_finite_points() {
        let data: Vec<Vec<f64>> = vec![vec![0.0], vec![f64::NAN]];
        assert!(matches!(
            probabilistic_seeds(&data, 2, &Euclidean, &mut zero_rng()),
            Err(ClusterError::UnrecognizedDataset(_))
        ));
    }

    #[test]
    fn test_zero_draw_picks_first_nonzero_weight() {
        let data = two_groups();
        let centers = probabilistic_seeds(&data, 2, &Euclidean, &mut zero_rng()).unwrap();
        assert_eq!(centers, vec![vec![0.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_zero_draw_skips_leading_duplicates() {
        let data: Vec<Vec<f64>> = vec![vec![2.0], vec![2.0], vec![2.0], vec![7.0], vec![9.0]];
        let centers = probabilistic_seeds(&data, 2, &Euclidean, &mut zero_rng()).unwrap();
        assert_eq!(centers, vec![vec![2.0], vec![7.0]]);
    }

    #[test]
    fn test_zero_draw_matches_farthest_first_on_single_candidate() {
        let data: Vec<Vec<f64>> = vec![vec![0.0], vec![0.0], vec![4.0]];
        let random = probabilistic_seeds(&data, 2, &Euclidean, &mut zero_rng()).unwrap();
        let greedy = farthest_first_seeds(&data, 2, &Euclidean).unwrap();
        assert_eq!(random, greedy);
    }

    #[test]
    fn test_all_duplicates_fall_back_to_uniform() {
        let data: Vec<Vec<f64>> = vec![vec![3.0, 3.0]; 4];
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let centers = probabilistic_seeds(&data, 3, &Euclidean, &mut rng).unwrap();
        assert_eq!(centers, vec![vec![3.0, 3.0]; 3]);
    }

    #[test]
    fn test_seeded_reproducible() {
        let data: Vec<Vec<f64>> = (0..50)
            .map(|i| vec![(i % 7) as f64 * 1.5, (i % 5) as f64 * 0.5])
            .collect();
        let a = probabilistic_seeds(&data, 6, &Euclidean, &mut ChaCha8Rng::seed_from_u64(42))
            .unwrap();
        let b = probabilistic_seeds(&data, 6, &Euclidean, &mut ChaCha8Rng::seed_from_u64(42))
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
    }

    #[test]
    fn test_never_picks_existing_center_when_weight_remains() {
        let data = two_groups();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..20 {
            let centers = probabilistic_seeds(&data, 6, &Euclidean, &mut rng).unwrap();
            let mut sorted = centers.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
            sorted.dedup();
            assert_eq!(sorted.len(), 6);
        }
    }

    #[test]
    fn test_invalid_k() {
        let data = two_groups();
        assert_eq!(
            probabilistic_seeds(&data, 0, &Euclidean, &mut zero_rng()),
            Err(ClusterError::InvalidClusterCount { k: 0, n: 6 })
        );
        assert_eq!(
            probabilistic_seeds(&data, 9, &Euclidean, &mut zero_rng()),
            Err(ClusterError::InvalidClusterCount { k: 9, n: 6 })
        );
    }
}
