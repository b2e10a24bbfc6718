//! Farthest-first traversal (Gonzalez) seeding.
use log::debug;

use crate::error::{ClusterError, Result};
use crate::ml::clustering::dataset::{self, Dataset};
use crate::ml::clustering::metric::Metric;

/// Selects `k` centers by farthest-first traversal.
///
/// The first center is the first point of `data`. Each following center is
/// the point farthest from its nearest already chosen center; on ties the
/// earliest point in dataset order wins. No randomness is involved, so the
/// result depends only on `data`, `k` and `metric`.
///
/// Centers are copied out of `data`. Duplicate points can produce centers with
/// equal coordinates.
///
/// # Errors
/// * `InvalidClusterCount` if `k == 0` or `k > data.len()`
/// * `UnrecognizedDataset` if the points are ragged or hold non-finite values
///
/// # Complexity
/// * Time: O(n·k) distance evaluations
/// * Space: O(n)
///
/// # Examples
/// ```
/// use clustr::ml::clustering::farthest_first::farthest_first_seeds;
/// use clustr::ml::clustering::metric::Euclidean;
///
/// let data: Vec<Vec<f64>> = vec![vec![0.0], vec![1.0], vec![10.0]];
/// let centers = farthest_first_seeds(&data, 2, &Euclidean).unwrap();
/// assert_eq!(centers, vec![vec![0.0], vec![10.0]]);
/// ```
pub fn farthest_first_seeds<D, M>(data: &D, k: usize, metric: &M) -> Result<Vec<Vec<f64>>>
where
    D: Dataset + ?Sized,
    M: Metric + ?Sized,
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
        let mut farthest: Option<(usize, f64)> = None;
        for (i, &d) in nearest.iter().enumerate() {
            let further = match farthest {
                None => true,
                Some((_, best)) => d > best,
            };
            if further {
                farthest = Some((i, d));
            }
        }
        // `nearest` has n >= 1 entries, so a point is always found.
        let Some((index, distance)) = farthest else {
            break;
        };

        debug!(
            "farthest-first center {} = point {} at distance {}",
            centers.len(),
            index,
            distance
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
