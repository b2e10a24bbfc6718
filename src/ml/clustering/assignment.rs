use crate::error::{ClusterError, Result};
use crate::ml::clustering::dataset::{self, Dataset};
use crate::ml::clustering::metric::Metric;

/// The center closest to some vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest<'a> {
    /// Position of the center in the scanned list.
    pub index: usize,
    pub center: &'a [f64],
    pub distance: f64,
}

/// Finds the center closest to `vector`.
///
/// Centers are scanned in order and a later center only replaces the current
/// best on a strictly smaller distance, so the first center at the minimum
/// distance wins ties.
///
/// # Errors
/// * `EmptyCenters` if `centers` is empty
///
/// # Examples
/// ```
/// use clustr::ml::clustering::assignment::nearest_center;
/// use clustr::ml::clustering::metric::Euclidean;
///
/// let centers = vec![vec![0.0, 0.0], vec![10.0, 10.0]];
/// let nearest = nearest_center(&centers, &[9.0, 8.0], &Euclidean).unwrap();
/// assert_eq!(nearest.index, 1);
/// ```
pub fn nearest_center<'a, M>(
    centers: &'a [Vec<f64>],
    vector: &[f64],
    metric: &M,
) -> Result<Nearest<'a>>
where
    M: Metric + ?Sized,
{
    let mut best: Option<Nearest<'a>> = None;
    for (index, center) in centers.iter().enumerate() {
        let distance = metric.distance(center, vector);
        let closer = match &best {
            None => true,
            Some(b) => distance < b.distance,
        };
        if closer {
            best = Some(Nearest {
                index,
                center: center.as_slice(),
                distance,
            });
        }
    }
    best.ok_or(ClusterError::EmptyCenters)
}

/// Distance between `vector` and its nearest center.
///
/// # Errors
/// * `EmptyCenters` if `centers` is empty
pub fn distance_to_nearest<M>(centers: &[Vec<f64>], vector: &[f64], metric: &M) -> Result<f64>
where
    M: Metric + ?Sized,
{
    let nearest = nearest_center(centers, vector, metric)?;
    Ok(metric.distance(nearest.center, vector))
}

/// Partitions `data` into one cluster per center.
///
/// Each point goes to the cluster of its nearest center. Clusters hold dataset
/// indices in dataset order. When several centers hold equal coordinates the
/// point is placed at the first of them, and the remaining ones stay empty.
/// Empty clusters are valid output.
///
/// # Errors
/// * `EmptyCenters` if `centers` is empty
/// * `UnrecognizedDataset` if the points are ragged or hold non-finite values
/// * `DimensionMismatch` if a center does not match the dataset dimension
/// * `NonFiniteCenter` if a center holds NaN or an infinity
///
/// # Examples
/// ```
/// use clustr::ml::clustering::assignment::assign;
/// use clustr::ml::clustering::metric::Euclidean;
///
/// let data: Vec<Vec<f64>> = vec![vec![0.0], vec![1.0], vec![9.0]];
/// let centers = vec![vec![0.0], vec![10.0]];
/// let clusters = assign(&centers, &data, &Euclidean).unwrap();
/// assert_eq!(clusters, vec![vec![0, 1], vec![2]]);
/// ```
pub fn assign<D, M>(centers: &[Vec<f64>], data: &D, metric: &M) -> Result<Vec<Vec<usize>>>
where
    D: Dataset + ?Sized,
    M: Metric + ?Sized,
{
    check_inputs(centers, data)?;
    assign_unchecked(centers, data, metric)
}

/// [`assign`] without the input checks, for callers that already ran them.
pub(crate) fn assign_unchecked<D, M>(
    centers: &[Vec<f64>],
    data: &D,
    metric: &M,
) -> Result<Vec<Vec<usize>>>
where
    D: Dataset + ?Sized,
    M: Metric + ?Sized,
{
    let positions = nearest_positions(centers, data, metric)?;
    Ok(group(positions, centers.len()))
}

fn check_inputs<D>(centers: &[Vec<f64>], data: &D) -> Result<()>
where
    D: Dataset + ?Sized,
{
    if centers.is_empty() {
        return Err(ClusterError::EmptyCenters);
    }
    dataset::validate(data)?;
    // An empty dataset has no dimension to disagree with.
    let dim = (!data.is_empty()).then(|| data.dim());
    check_centers(centers, dim)
}

/// Rejects centers with non-finite coordinates and, given `dim`, centers of
/// any other length.
pub(crate) fn check_centers(centers: &[Vec<f64>], dim: Option<usize>) -> Result<()> {
    for (index, center) in centers.iter().enumerate() {
        if let Some(expected) = dim.filter(|&d| d != center.len()) {
            return Err(ClusterError::DimensionMismatch {
                expected,
                found: center.len(),
            });
        }
        if center.iter().any(|x| !x.is_finite()) {
            return Err(ClusterError::NonFiniteCenter { index });
        }
    }
    Ok(())
}

/// Sum over all points of the squared distance to the center of the cluster
/// they belong to.
pub fn total_squared_distance<D, M>(
    centers: &[Vec<f64>],
    clusters: &[Vec<usize>],
    data: &D,
    metric: &M,
) -> f64
where
    D: Dataset + ?Sized,
    M: Metric + ?Sized,
{
    centers
        .iter()
        .zip(clusters.iter())
        .map(|(center, members)| {
            members
                .iter()
                .map(|&i| metric.distance(center, data.point(i)).powi(2))
                .sum::<f64>()
        })
        .sum()
}

/// First position in `centers` holding the same coordinates as `nearest.center`.
fn locate(centers: &[Vec<f64>], nearest: &Nearest<'_>) -> usize {
    centers
        .iter()
        .position(|c| c.as_slice() == nearest.center)
        .unwrap_or(nearest.index)
}

fn group(positions: Vec<usize>, k: usize) -> Vec<Vec<usize>> {
    let mut clusters = vec![Vec::new(); k];
    for (i, position) in positions.into_iter().enumerate() {
        clusters[position].push(i);
    }
    clusters
}

fn nearest_positions<D, M>(centers: &[Vec<f64>], data: &D, metric: &M) -> Result<Vec<usize>>
where
    D: Dataset + ?Sized,
    M: Metric + ?Sized,
{
    data.points()
        .map(|point| nearest_center(centers, point, metric).map(|n| locate(centers, &n)))
        .collect()
}

/// Same as [`assign`], with nearest centers computed on the rayon pool.
///
/// Clusters are assembled afterwards in dataset order, so the output is
/// identical to the sequential version.
#[cfg(feature = "parallel")]
pub fn par_assign<D, M>(centers: &[Vec<f64>], data: &D, metric: &M) -> Result<Vec<Vec<usize>>>
where
    D: Dataset + Sync + ?Sized,
    M: Metric + Sync + ?Sized,
{
    use rayon::prelude::*;

    check_inputs(centers, data)?;

    let positions: Vec<usize> = (0..data.len())
        .into_par_iter()
        .map(|i| nearest_center(centers, data.point(i), metric).map(|n| locate(centers, &n)))
        .collect::<Result<_>>()?;

    Ok(group(positions, centers.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::clustering::metric::{Euclidean, Manhattan};
    use approx::assert_relative_eq;

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

    #[test]
    fn test_nearest_center_basic() {
        let centers = vec![vec![0.0, 0.0], vec![5.0, 5.0], vec![10.0, 10.0]];
        let nearest = nearest_center(&centers, &[6.0, 4.0], &Euclidean).unwrap();
        assert_eq!(nearest.index, 1);
        assert_eq!(nearest.center, &[5.0, 5.0]);
        assert_relative_eq!(nearest.distance, 2f64.sqrt());
    }

    #[test]
    fn test_nearest_center_tie_prefers_first() {
        let centers = vec![vec![-1.0], vec![1.0]];
        let nearest = nearest_center(&centers, &[0.0], &Euclidean).unwrap();
        assert_eq!(nearest.index, 0);
    }

    #[test]
    fn test_nearest_center_empty() {
        let centers: Vec<Vec<f64>> = vec![];
        assert_eq!(
            nearest_center(&centers, &[0.0], &Euclidean),
            Err(ClusterError::EmptyCenters)
        );
        assert_eq!(
            distance_to_nearest(&centers, &[0.0], &Euclidean),
            Err(ClusterError::EmptyCenters)
        );
    }

    #[test]
    fn test_distance_to_nearest() {
        let centers = vec![vec![0.0, 0.0], vec![3.0, 0.0]];
        let d = distance_to_nearest(&centers, &[3.0, 4.0], &Euclidean).unwrap();
        assert_relative_eq!(d, 4.0);
        let d = distance_to_nearest(&centers, &[3.0, 4.0], &Manhattan).unwrap();
        assert_relative_eq!(d, 4.0);
    }

    #[test]
    fn test_assign_partitions_in_dataset_order() {
        let data = two_groups();
        let centers = vec![vec![100.0, 100.0], vec![0.0, 0.0]];
        let clusters = assign(&centers, &data, &Euclidean).unwrap();
        assert_eq!(clusters, vec![vec![3, 4, 5], vec![0, 1, 2]]);
    }

    #[test]
    fn test_assign_duplicate_centers_use_first_position() {
        let data = two_groups();
        let centers = vec![vec![0.0, 0.0], vec![0.0, 0.0], vec![100.0, 100.0]];
        let clusters = assign(&centers, &data, &Euclidean).unwrap();
        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters[0], vec![0, 1, 2]);
        assert!(clusters[1].is_empty());
        assert_eq!(clusters[2], vec![3, 4, 5]);
    }

    #[test]
    fn test_assign_empty_centers() {
        let data = two_groups();
        assert_eq!(
            assign(&[], &data, &Euclidean),
            Err(ClusterError::EmptyCenters)
        );
    }

    #[test]
    fn test_assign_empty_dataset() {
        let data: Vec<Vec<f64>> = vec![];
        let clusters = assign(&[vec![0.0]], &data, &Euclidean).unwrap();
        assert_eq!(clusters, vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_assign_rejects_ragged_data() {
        let data: Vec<Vec<f64>> = vec![vec![0.0, 0.0], vec![4.0], vec![2.0, 6.0]];
        assert!(matches!(
            assign(&[vec![0.0, 0.0]], &data, &Euclidean),
            Err(ClusterError::UnrecognizedDataset(_))
        ));
    }

    #[test]
    fn test_assign_rejects_non_finite_data() {
        let data: Vec<Vec<f64>> = vec![vec![0.0, 0.0], vec![f64::NAN, 1.0]];
        assert!(matches!(
            assign(&[vec![0.0, 0.0]], &data, &Euclidean),
            Err(ClusterError::UnrecognizedDataset(_))
        ));
    }

    #[test]
    fn test_assign_rejects_center_dimension_mismatch() {
        let data = two_groups();
        assert_eq!(
            assign(&[vec![0.0, 0.0], vec![1.0]], &data, &Euclidean),
            Err(ClusterError::DimensionMismatch {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_assign_rejects_non_finite_center() {
        let data = two_groups();
        assert_eq!(
            assign(&[vec![0.0, 0.0], vec![f64::NAN, 1.0]], &data, &Euclidean),
            Err(ClusterError::NonFiniteCenter { index: 1 })
        );
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_par_assign_rejects_bad_inputs() {
        let data = two_groups();
        assert_eq!(
            par_assign(&[vec![0.0]], &data, &Euclidean),
            Err(ClusterError::DimensionMismatch {
                expected: 2,
                found: 1
            })
        );
        let ragged: Vec<Vec<f64>> = vec![vec![0.0, 0.0], vec![4.0]];
        assert!(par_assign(&[vec![0.0, 0.0]], &ragged, &Euclidean).is_err());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_par_assign_matches_sequential() {
        let data = two_groups();
        let centers = vec![vec![1.0, 1.0], vec![0.0, 0.0], vec![100.0, 100.0]];
        assert_eq!(
            par_assign(&centers, &data, &Euclidean),
            assign(&centers, &data, &Euclidean)
        );
    }

    #[test]
    fn test_total_squared_distance() {
        let data: Vec<Vec<f64>> = vec![vec![0.0], vec![2.0], vec![10.0]];
        let centers = vec![vec![1.0], vec![10.0]];
        let clusters = assign(&centers, &data, &Euclidean).unwrap();
        assert_relative_eq!(
            total_squared_distance(&centers, &clusters, &data, &Euclidean),
            2.0
        );
    }
}
