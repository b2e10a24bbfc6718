pub mod error;
pub mod ml;

pub use error::{ClusterError, Result};
pub use ml::clustering;
