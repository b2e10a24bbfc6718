//! Partitioning of a point set into a fixed number of clusters.
//!
//! Two seeding strategies pick the initial centers:
//! [`farthest_first`] (Gonzalez, deterministic) and [`probabilistic`]
//! (k-means++ style, randomized). Either can be followed by [`lloyd`]
//! refinement, after which the points are partitioned around the final
//! centers by [`assignment::assign`].
//!
//! ```
//! use clustr::ml::clustering::{farthest_first_cluster, ClusterConfig};
//! use clustr::ml::clustering::metric::Euclidean;
//!
//! let data: Vec<Vec<f64>> = vec![
//!     vec![0.0, 0.0],
//!     vec![0.0, 1.0],
//!     vec![1.0, 0.0],
//!     vec![100.0, 100.0],
//!     vec![100.0, 101.0],
//!     vec![101.0, 100.0],
//! ];
//!
//! let config = ClusterConfig::new(2).with_refinement(false);
//! let clustering = farthest_first_cluster(&data, &config, &Euclidean).unwrap();
//! assert_eq!(clustering.clusters, vec![vec![0, 1, 2], vec![3, 4, 5]]);
//! assert_eq!(clustering.centers[1], vec![100.0, 101.0]);
//! ```
pub mod assignment;
pub mod dataset;
pub mod farthest_first;
pub mod lloyd;
pub mod metric;
pub mod probabilistic;

use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::Result;
use assignment::assign_unchecked;

pub use assignment::{
    assign, distance_to_nearest, nearest_center, total_squared_distance, Nearest,
};
pub use dataset::{Dataset, DenseDataset};
pub use farthest_first::farthest_first_seeds;
pub use lloyd::{refine, refine_with_limit, Refinement};
pub use metric::{Euclidean, Manhattan, Metric, SquaredEuclidean};
pub use probabilistic::probabilistic_seeds;

/// How the initial centers are chosen by [`cluster`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Seeding {
    /// Deterministic farthest-first traversal.
    #[default]
    FarthestFirst,
    /// Squared-distance weighted sampling. A seed makes the draw reproducible;
    /// without one the generator is seeded from entropy.
    Probabilistic { seed: Option<u64> },
}

/// Configuration options for clustering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    /// Number of clusters to find.
    pub k: usize,
    /// Whether to run Lloyd refinement after seeding.
    pub refine: bool,
    /// Optional cap on refinement passes. `None` runs to a fixed point.
    pub max_iterations: Option<usize>,
    /// Seeding used by [`cluster`].
    pub seeding: Seeding,
}

impl ClusterConfig {
    /// Create a new config with refinement enabled, no iteration cap and
    /// farthest-first seeding.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            refine: true,
            max_iterations: None,
            seeding: Seeding::FarthestFirst,
        }
    }

    /// Enable or disable Lloyd refinement.
    pub fn with_refinement(mut self, refine: bool) -> Self {
        self.refine = refine;
        self
    }

    /// Cap the number of refinement passes.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Choose the seeding strategy used by [`cluster`].
    pub fn with_seeding(mut self, seeding: Seeding) -> Self {
        self.seeding = seeding;
        self
    }
}

/// Final centers and the clusters they induce.
///
/// `clusters[i]` lists, in dataset order, the indices of the points whose
/// nearest center is `centers[i]`. Both vectors always have length `k`.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    pub clusters: Vec<Vec<usize>>,
    pub centers: Vec<Vec<f64>>,
    /// Refinement passes performed (0 when refinement was disabled).
    pub iterations: usize,
}

impl Clustering {
    /// Number of clusters.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// The member points of cluster `index`.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`, or if `data` is not the dataset this
    /// clustering was computed from and lacks one of the member indices.
    pub fn points<'a, D>(&'a self, data: &'a D, index: usize) -> impl Iterator<Item = &'a [f64]>
    where
        D: Dataset + ?Sized,
    {
        self.clusters[index].iter().map(move |&i| data.point(i))
    }

    /// Sum of squared distances from each point to its cluster's center.
    pub fn inertia<D, M>(&self, data: &D, metric: &M) -> f64
    where
        D: Dataset + ?Sized,
        M: Metric + ?Sized,
    {
        total_squared_distance(&self.centers, &self.clusters, data, metric)
    }

    /// Drops the centers.
    pub fn into_clusters(self) -> Vec<Vec<usize>> {
        self.clusters
    }

    /// Splits into `(clusters, centers)`.
    pub fn into_parts(self) -> (Vec<Vec<usize>>, Vec<Vec<f64>>) {
        (self.clusters, self.centers)
    }
}

/// Seeds with farthest-first traversal, optionally refines, and partitions
/// `data` around the final centers.
///
/// # Errors
/// * `InvalidClusterCount` if `config.k == 0` or `config.k > data.len()`
/// * `UnrecognizedDataset` if the points do not share one dimension or hold
///   a NaN or infinite coordinate
/// * `EmptyCluster` if refinement leaves a center without points
pub fn farthest_first_cluster<D, M>(
    data: &D,
    config: &ClusterConfig,
    metric: &M,
) -> Result<Clustering>
where
    D: Dataset + ?Sized,
    M: Metric + ?Sized,
{
    let seeds = farthest_first_seeds(data, config.k, metric)?;
    finish(seeds, data, config, metric)
}

/// Seeds with squared-distance weighted sampling drawn from `rng`,
/// optionally refines, and partitions `data` around the final centers.
///
/// # Errors
/// Same as [`farthest_first_cluster`].
pub fn probabilistic_cluster<D, M, R>(
    data: &D,
    config: &ClusterConfig,
    metric: &M,
    rng: &mut R,
) -> Result<Clustering>
where
    D: Dataset + ?Sized,
    M: Metric + ?Sized,
    R: Rng + ?Sized,
{
    let seeds = probabilistic_seeds(data, config.k, metric, rng)?;
    finish(seeds, data, config, metric)
}

/// Runs the seeding selected by `config.seeding`.
///
/// # Errors
/// Same as [`farthest_first_cluster`].
pub fn cluster<D, M>(data: &D, config: &ClusterConfig, metric: &M) -> Result<Clustering>
where
    D: Dataset + ?Sized,
    M: Metric + ?Sized,
{
    match config.seeding {
        Seeding::FarthestFirst => farthest_first_cluster(data, config, metric),
        Seeding::Probabilistic { seed } => {
            let mut rng = match seed {
                Some(s) => ChaCha8Rng::seed_from_u64(s),
                None => ChaCha8Rng::from_entropy(),
            };
            probabilistic_cluster(data, config, metric, &mut rng)
        }
    }
}

fn finish<D, M>(
    seeds: Vec<Vec<f64>>,
    data: &D,
    config: &ClusterConfig,
    metric: &M,
) -> Result<Clustering>
where
    D: Dataset + ?Sized,
    M: Metric + ?Sized,
{
    let (centers, iterations) = if config.refine {
        let refined = refine_with_limit(seeds, data, metric, config.max_iterations)?;
        (refined.centers, refined.iterations)
    } else {
        (seeds, 0)
    };

    // Seeds come from validated data and centroids of finite points stay finite.
    let clusters = assign_unchecked(&centers, data, metric)?;
    info!(
        "clustered {} points into {} clusters ({} refinement iterations)",
        data.len(),
        clusters.len(),
        iterations
    );

    Ok(Clustering {
        clusters,
        centers,
        iterations,
    })
}
