use thiserror::Error;

/// Errors produced while seeding, assigning or refining a clustering.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusterError {
    /// The requested number of clusters is zero or exceeds the number of points.
    #[error("invalid cluster count k = {k} for dataset of size {n}")]
    InvalidClusterCount { k: usize, n: usize },

    /// A nearest-center lookup was asked to search an empty set of centers.
    #[error("nearest-center lookup requires at least one center")]
    EmptyCenters,

    /// A cluster ended up with no members, so its centroid is undefined.
    #[error("cluster {index} is empty; its centroid is undefined")]
    EmptyCluster { index: usize },

    /// The data does not form an ordered, fixed-dimensional point set.
    #[error("unrecognized dataset: {0}")]
    UnrecognizedDataset(String),

    /// A center does not share the dimensionality of the dataset.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// A center holds a NaN or infinite coordinate.
    #[error("center {index} has a non-finite coordinate")]
    NonFiniteCenter { index: usize },
}

impl ClusterError {
    pub fn unrecognized_dataset<S: Into<String>>(msg: S) -> Self {
        ClusterError::UnrecognizedDataset(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ClusterError>;
