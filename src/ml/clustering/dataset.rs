use std::ops::Range;

use ndarray::Array2;

use crate::error::{ClusterError, Result};

/// An ordered, random-access collection of points of one fixed dimension.
///
/// Point identity is positional: two points are the same only when they share
/// an index, even if their coordinates are equal.
pub trait Dataset {
    /// Number of points.
    fn len(&self) -> usize;

    /// The point at `index`.
    ///
    /// # Panics
    /// If `index >= self.len()`.
    fn point(&self, index: usize) -> &[f64];

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensionality, taken from the first point. Zero for an empty dataset.
    fn dim(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.point(0).len()
        }
    }

    /// Iterates over the points in index order.
    fn points(&self) -> Points<'_, Self> {
        Points {
            data: self,
            next: 0,
        }
    }
}

/// Iterator returned by [`Dataset::points`].
pub struct Points<'a, D: ?Sized> {
    data: &'a D,
    next: usize,
}

impl<'a, D: Dataset + ?Sized> Iterator for Points<'a, D> {
    type Item = &'a [f64];

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.data.len() {
            return None;
        }
        let point = self.data.point(self.next);
        self.next += 1;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.data.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl<'a, D: Dataset + ?Sized> ExactSizeIterator for Points<'a, D> {}

impl Dataset for [Vec<f64>] {
    fn len(&self) -> usize {
        <[Vec<f64>]>::len(self)
    }

    fn point(&self, index: usize) -> &[f64] {
        &self[index]
    }
}

impl Dataset for Vec<Vec<f64>> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn point(&self, index: usize) -> &[f64] {
        &self[index]
    }
}

impl<const N: usize> Dataset for [[f64; N]] {
    fn len(&self) -> usize {
        <[[f64; N]]>::len(self)
    }

    fn point(&self, index: usize) -> &[f64] {
        &self[index]
    }

    fn dim(&self) -> usize {
        N
    }
}

/// Checks that every point of `data` has the same dimensionality and only
/// finite coordinates.
///
/// Borrowed slices like `&[Vec<f64>]` can be ragged; [`DenseDataset`] is
/// checked for shape on construction but may still hold NaN or infinities.
pub fn validate<D: Dataset + ?Sized>(data: &D) -> Result<()> {
    let dim = data.dim();
    for (i, point) in data.points().enumerate() {
        if point.len() != dim {
            return Err(ClusterError::unrecognized_dataset(format!(
                "point {} has dimension {}, expected {}",
                i,
                point.len(),
                dim
            )));
        }
        if let Some(x) = point.iter().find(|x| !x.is_finite()) {
            return Err(ClusterError::unrecognized_dataset(format!(
                "point {} has non-finite coordinate {}",
                i, x
            )));
        }
    }
    Ok(())
}

/// A row-major dense dataset with validated, fixed dimensionality.
///
/// Rows are stored contiguously, so slicing and concatenation copy values
/// rather than sharing storage.
///
/// ```
/// use clustr::ml::clustering::dataset::{Dataset, DenseDataset};
///
/// let data = DenseDataset::from_rows(vec![vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();
/// assert_eq!(data.len(), 2);
/// assert_eq!(data.point(1), &[1.0, 1.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DenseDataset {
    values: Vec<f64>,
    dim: usize,
    len: usize,
}

impl DenseDataset {
    /// Builds a dataset from row vectors. All rows must share one length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let len = rows.len();
        let dim = rows.first().map_or(0, Vec::len);
        let mut values = Vec::with_capacity(len * dim);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != dim {
                return Err(ClusterError::unrecognized_dataset(format!(
                    "row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    dim
                )));
            }
            values.extend(row);
        }
        Ok(Self { values, dim, len })
    }

    /// Builds a dataset from a flat row-major buffer.
    pub fn from_flat(values: Vec<f64>, dim: usize) -> Result<Self> {
        if dim == 0 {
            if values.is_empty() {
                return Ok(Self {
                    values,
                    dim,
                    len: 0,
                });
            }
            return Err(ClusterError::unrecognized_dataset(
                "zero-dimensional rows cannot hold values",
            ));
        }
        if values.len() % dim != 0 {
            return Err(ClusterError::unrecognized_dataset(format!(
                "buffer of {} values is not a multiple of dimension {}",
                values.len(),
                dim
            )));
        }
        let len = values.len() / dim;
        Ok(Self { values, dim, len })
    }

    /// Builds a dataset from a matrix whose rows are points.
    pub fn from_array(array: &Array2<f64>) -> Self {
        let (len, dim) = array.dim();
        let values = array.iter().copied().collect();
        Self { values, dim, len }
    }

    /// Copies the points in `range` into a new dataset.
    pub fn slice(&self, range: Range<usize>) -> Result<Self> {
        if range.start > range.end || range.end > self.len {
            return Err(ClusterError::unrecognized_dataset(format!(
                "range {}..{} out of bounds for dataset of size {}",
                range.start, range.end, self.len
            )));
        }
        let values = self.values[range.start * self.dim..range.end * self.dim].to_vec();
        Ok(Self {
            values,
            dim: self.dim,
            len: range.end - range.start,
        })
    }

    /// Appends the points of `other` after the points of `self`.
    pub fn concat(&self, other: &DenseDataset) -> Result<Self> {
        if self.is_empty() {
            return Ok(other.clone());
        }
        if other.is_empty() {
            return Ok(self.clone());
        }
        if self.dim != other.dim {
            return Err(ClusterError::unrecognized_dataset(format!(
                "cannot concatenate datasets of dimension {} and {}",
                self.dim, other.dim
            )));
        }
        let mut values = Vec::with_capacity(self.values.len() + other.values.len());
        values.extend_from_slice(&self.values);
        values.extend_from_slice(&other.values);
        Ok(Self {
            values,
            dim: self.dim,
            len: self.len + other.len,
        })
    }

    /// Converts to an `n x d` matrix.
    pub fn to_array(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.len, self.dim), |(i, j)| self.values[i * self.dim + j])
    }
}

impl Dataset for DenseDataset {
    fn len(&self) -> usize {
        self.len
    }

    fn point(&self, index: usize) -> &[f64] {
        assert!(index < self.len, "index {} out of bounds", index);
        &self.values[index * self.dim..(index + 1) * self.dim]
    }

    fn dim(&self) -> usize {
        self.dim
    }
}

impl TryFrom<Vec<Vec<f64>>> for DenseDataset {
    type Error = ClusterError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::from_rows(rows)
    }
}

impl From<&Array2<f64>> for DenseDataset {
    fn from(array: &Array2<f64>) -> Self {
        Self::from_array(array)
    }
}
