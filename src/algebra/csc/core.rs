#![allow(non_snake_case)]

use crate::algebra::{Adjoint, FloatT, ShapedMatrix, SparseFormatError, Symmetric};

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Sparse matrix in Compressed Sparse Column (CSC) format.
///
/// Column `j` holds the entries `nzval[k]` in rows `rowval[k]` for
/// `k` in `colptr[j]..colptr[j+1]`, with rows strictly increasing.
///
/// To construct the 3 x 3 matrix
/// ```text
/// A = [4.  0.  1.]
///     [0.  2.  0.]
///     [1.  0.  5.]
/// ```
/// use
/// ```no_run
/// use qpalm::algebra::CscMatrix;
///
/// let A: CscMatrix<f64> = CscMatrix::new(
///     3,                        // m
///     3,                        // n
///     vec![0, 2, 3, 5],         // colptr
///     vec![0, 2, 1, 0, 2],      // rowval
///     vec![4., 1., 2., 1., 5.], // nzval
/// );
/// assert!(A.check_format().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct CscMatrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// column pointers, of length `n+1` and ending in the number of nonzeros
    pub colptr: Vec<usize>,
    /// row index of each entry
    pub rowval: Vec<usize>,
    /// value of each entry
    pub nzval: Vec<T>,
}

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// Build a matrix from raw CSC arrays.
    ///
    /// # Panics
    /// Panics if the array lengths disagree with each other or with `n`.
    /// Row bounds and ordering are not checked here; use
    /// [`check_format`](CscMatrix::check_format) for that.
    pub fn new(m: usize, n: usize, colptr: Vec<usize>, rowval: Vec<usize>, nzval: Vec<T>) -> Self {
        assert_eq!(colptr.len(), n + 1);
        assert_eq!(rowval.len(), nzval.len());
        assert_eq!(colptr[n], nzval.len());
        Self {
            m,
            n,
            colptr,
            rowval,
            nzval,
        }
    }

    /// An `m` x `n` matrix with storage for `nnz` entries.  All
    /// entries sit in the last column until filled in.
    pub fn spalloc((m, n): (usize, usize), nnz: usize) -> Self {
        let mut colptr = vec![0; n + 1];
        colptr[n] = nnz;
        Self::new(m, n, colptr, vec![0; nnz], vec![T::zero(); nnz])
    }

    /// A matrix with no structural entries
    pub fn zeros(size: (usize, usize)) -> Self {
        Self::spalloc(size, 0)
    }

    pub fn identity(n: usize) -> Self {
        Self::new(n, n, (0..=n).collect(), (0..n).collect(), vec![T::one(); n])
    }

    /// number of structural entries
    pub fn nnz(&self) -> usize {
        self.colptr[self.n]
    }

    /// Transposed view
    pub fn t(&self) -> Adjoint<'_, Self> {
        Adjoint { src: self }
    }

    /// Symmetric view of an upper triangular matrix
    pub fn sym(&self) -> Symmetric<'_, Self> {
        debug_assert!(self.is_triu());
        Symmetric { src: self }
    }

    /// Verify the internal consistency of the CSC arrays.
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        if self.colptr.len() != self.n + 1
            || self.rowval.len() != self.nzval.len()
            || self.colptr[self.n] != self.nzval.len()
        {
            return Err(SparseFormatError::IncompatibleDimension);
        }
        if self.colptr[0] != 0 || self.colptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(SparseFormatError::BadColptr);
        }
        if self.rowval.iter().any(|&r| r >= self.m) {
            return Err(SparseFormatError::BadRowval);
        }
        let unordered = self
            .colptr
            .windows(2)
            .any(|w| self.rowval[w[0]..w[1]].windows(2).any(|r| r[0] >= r[1]));
        if unordered {
            return Err(SparseFormatError::BadRowOrdering);
        }
        if self.nzval.iter().any(|v| !v.is_finite()) {
            return Err(SparseFormatError::NonFiniteValue);
        }
        Ok(())
    }

    /// Copy of the entries on and above the diagonal.  Rows within
    /// each column must be sorted.
    pub fn to_triu(&self) -> Self {
        assert!(self.is_square());
        let mut colptr = Vec::with_capacity(self.n + 1);
        let mut rowval = Vec::new();
        let mut nzval = Vec::new();
        colptr.push(0);

        for col in 0..self.n {
            let rng = self.colptr[col]..self.colptr[col + 1];
            let ntriu = self.rowval[rng.clone()].partition_point(|&r| r <= col);
            let keep = rng.start..rng.start + ntriu;
            rowval.extend_from_slice(&self.rowval[keep.clone()]);
            nzval.extend_from_slice(&self.nzval[keep]);
            colptr.push(rowval.len());
        }
        Self::new(self.m, self.n, colptr, rowval, nzval)
    }

    /// True if there are no structural entries below the diagonal
    pub fn is_triu(&self) -> bool {
        (0..self.n).all(|col| {
            self.rowval[self.colptr[col]..self.colptr[col + 1]]
                .iter()
                .all(|&r| r <= col)
        })
    }

    /// Value at (row,col), or None if it is not a structural entry.
    ///
    /// # Panics
    /// Panics if the index is out of bounds.
    pub fn get_entry(&self, idx: (usize, usize)) -> Option<T> {
        self.find_entry(idx).map(|k| self.nzval[k])
    }

    // position of (row,col) within rowval and nzval
    pub(crate) fn find_entry(&self, (row, col): (usize, usize)) -> Option<usize> {
        assert!(row < self.m && col < self.n);
        let start = self.colptr[col];
        self.rowval[start..self.colptr[col + 1]]
            .binary_search(&row)
            .ok()
            .map(|k| start + k)
    }
}

impl<T> ShapedMatrix for CscMatrix<T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
}
