//! Lloyd's algorithm: alternate assignment and centroid recomputation until
//! no center moves.
use log::{debug, trace, warn};

use crate::error::{ClusterError, Result};
use crate::ml::clustering::assignment::{assign_unchecked, check_centers, total_squared_distance};
use crate::ml::clustering::dataset::{self, Dataset};
use crate::ml::clustering::metric::Metric;

/// Result of a refinement run.
#[derive(Debug, Clone, PartialEq)]
pub struct Refinement {
    /// Final centers, in the order they were supplied.
    pub centers: Vec<Vec<f64>>,
    /// Number of assign/recompute passes performed.
    pub iterations: usize,
    /// `false` only when an iteration limit stopped the loop first.
    pub converged: bool,
}

/// Runs Lloyd's algorithm from `centers` until a fixed point.
///
/// Each pass assigns every point to its nearest center and replaces every
/// center with the mean of its cluster. The loop stops once a pass leaves
/// every center exactly (bitwise on the coordinates) unchanged. There is no
/// iteration limit; see [`refine_with_limit`].
///
/// # Errors
/// * `EmptyCenters` if `centers` is empty
/// * `UnrecognizedDataset` if the points are ragged or hold non-finite values
/// * `DimensionMismatch` if a center does not match the dataset dimension
/// * `NonFiniteCenter` if a center holds NaN or an infinity
/// * `EmptyCluster` if some center attracts no points
///
/// # Examples
/// ```
/// use clustr::ml::clustering::lloyd::refine;
/// use clustr::ml::clustering::metric::Euclidean;
///
/// let data: Vec<Vec<f64>> = vec![vec![0.0], vec![2.0], vec![10.0], vec![12.0]];
/// let centers = refine(vec![vec![0.0], vec![2.0]], &data, &Euclidean).unwrap();
/// assert_eq!(centers, vec![vec![1.0], vec![11.0]]);
/// ```
pub fn refine<D, M>(centers: Vec<Vec<f64>>, data: &D, metric: &M) -> Result<Vec<Vec<f64>>>
where
    D: Dataset + ?Sized,
    M: Metric + ?Sized,
{
    refine_with_limit(centers, data, metric, None).map(|r| r.centers)
}

/// Runs Lloyd's algorithm, stopping after at most `max_iterations` passes.
///
/// With `None` this behaves exactly like [`refine`]. When the limit is hit
/// before a fixed point the last recomputed centers are returned with
/// `converged == false`.
///
/// # Errors
/// Same as [`refine`].
pub fn refine_with_limit<D, M>(
    mut centers: Vec<Vec<f64>>,
    data: &D,
    metric: &M,
    max_iterations: Option<usize>,
) -> Result<Refinement>
where
    D: Dataset + ?Sized,
    M: Metric + ?Sized,
{
    if centers.is_empty() {
        return Err(ClusterError::EmptyCenters);
    }
    dataset::validate(data)?;
    let dim = data.dim();
    check_centers(&centers, Some(dim))?;

    let mut iterations = 0;
    loop {
        if max_iterations.is_some_and(|limit| iterations >= limit) {
            warn!(
                "refinement stopped after {} iterations without converging",
                iterations
            );
            return Ok(Refinement {
                centers,
                iterations,
                converged: false,
            });
        }

        let clusters = assign_unchecked(&centers, data, metric)?;
        iterations += 1;

        let updated = clusters
            .iter()
            .enumerate()
            .map(|(index, members)| centroid(data, members, dim, index))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "refinement iteration {}: total squared distance {}",
            iterations,
            total_squared_distance(&centers, &clusters, data, metric)
        );

        if updated == centers {
            debug!("refinement converged after {} iterations", iterations);
            return Ok(Refinement {
                centers,
                iterations,
                converged: true,
            });
        }

        for (i, (old, new)) in centers.iter().zip(updated.iter()).enumerate() {
            if old != new {
                trace!("center {} moved from {:?} to {:?}", i, old, new);
            }
        }
        centers = updated;
    }
}

/// Componentwise mean of the points at `members`.
///
/// # Errors
/// * `EmptyCluster` if `members` is empty
pub fn centroid<D>(data: &D, members: &[usize], dim: usize, index: usize) -> Result<Vec<f64>>
where
    D: Dataset + ?Sized,
{
    if members.is_empty() {
        return Err(ClusterError::EmptyCluster { index });
    }

    let mut sum = vec![0.0; dim];
    for &i in members {
        for (s, &x) in sum.iter_mut().zip(data.point(i)) {
            *s += x;
        }
    }
    let count = members.len() as f64;
    Ok(sum.into_iter().map(|s| s / count).collect())
}
