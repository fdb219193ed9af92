#![allow(non_snake_case)]
//---------------------------------------------------------
// construction from other formats and whole-matrix arithmetic
//---------------------------------------------------------

use crate::algebra::{CscMatrix, DimensionMismatchError, FloatT, ShapedMatrix};
use std::cmp::Ordering;

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// Construct a matrix from coordinate (triplet) data.
    ///
    /// Entries may appear in any order.  Duplicate (row,col) entries
    /// are summed.
    ///
    /// Fails if the triplet arrays have different lengths, reported as
    /// `expected: (rows.len(), rows.len())`, or if an index lies outside
    /// of `m x n`, reported as the smallest size holding every entry.
    pub fn new_from_triplets(
        m: usize,
        n: usize,
        rows: &[usize],
        cols: &[usize],
        vals: &[T],
    ) -> Result<Self, DimensionMismatchError> {
        if cols.len() != rows.len() || vals.len() != rows.len() {
            return Err(DimensionMismatchError {
                expected: (rows.len(), rows.len()),
                found: (cols.len(), vals.len()),
            });
        }
        let extent = |idx: &[usize]| idx.iter().max().map_or(0, |&i| i + 1);
        let (mrows, ncols) = (extent(rows), extent(cols));
        if mrows > m || ncols > n {
            return Err(DimensionMismatchError {
                expected: (m, n),
                found: (mrows.max(m), ncols.max(n)),
            });
        }
        Ok(Self::from_triplets_unchecked(m, n, rows, cols, vals))
    }

    // triplets already known to be consistent with m x n
    pub(crate) fn from_triplets_unchecked(
        m: usize,
        n: usize,
        rows: &[usize],
        cols: &[usize],
        vals: &[T],
    ) -> Self {
        // order by (col,row) so that each column is contiguous
        // and sorted.  The sort is stable so duplicates are summed
        // in the order given.
        let mut order: Vec<usize> = (0..rows.len()).collect();
        order.sort_by_key(|&k| (cols[k], rows[k]));

        let mut colptr = vec![0; n + 1];
        let mut rowval = Vec::with_capacity(rows.len());
        let mut nzval = Vec::with_capacity(rows.len());
        let mut last: Option<(usize, usize)> = None;

        for k in order {
            let entry = (cols[k], rows[k]);
            if last == Some(entry) {
                if let Some(v) = nzval.last_mut() {
                    *v += vals[k];
                }
            } else {
                rowval.push(rows[k]);
                nzval.push(vals[k]);
                colptr[cols[k] + 1] += 1;
                last = Some(entry);
            }
        }

        for j in 0..n {
            colptr[j + 1] += colptr[j];
        }

        CscMatrix::new(m, n, colptr, rowval, nzval)
    }

    /// Construct a sparse matrix from dense data in column major order.
    /// Exact zeros are not stored.
    ///
    /// # Panics
    /// Panics if `data.len() != m*n`.
    pub fn from_dense(m: usize, n: usize, data: &[T]) -> Self {
        assert_eq!(data.len(), m * n);

        let nnz = data.iter().filter(|&&v| v != T::zero()).count();
        let mut colptr = Vec::with_capacity(n + 1);
        let mut rowval = Vec::with_capacity(nnz);
        let mut nzval = Vec::with_capacity(nnz);

        colptr.push(0);
        for col in data.chunks(m.max(1)).take(n) {
            for (row, &v) in col.iter().enumerate() {
                if v != T::zero() {
                    rowval.push(row);
                    nzval.push(v);
                }
            }
            colptr.push(rowval.len());
        }
        // m == 0 gives no chunks at all
        colptr.resize(n + 1, rowval.len());

        CscMatrix::new(m, n, colptr, rowval, nzval)
    }

    /// Materialized transpose
    pub fn transpose(&self) -> Self {
        let mut At = CscMatrix::spalloc((self.n, self.m), self.nnz());

        // count the entries in each row of self
        let mut counts = vec![0usize; self.m + 1];
        for &r in self.rowval.iter() {
            counts[r + 1] += 1;
        }
        for i in 0..self.m {
            counts[i + 1] += counts[i];
        }
        At.colptr.copy_from_slice(&counts);

        // scatter.  Columns of self are visited in order, so
        // the rows of each column of At come out sorted
        let mut next = counts;
        for col in 0..self.n {
            for k in self.colptr[col]..self.colptr[col + 1] {
                let r = self.rowval[k];
                let dest = next[r];
                At.rowval[dest] = col;
                At.nzval[dest] = self.nzval[k];
                next[r] += 1;
            }
        }
        At
    }

    /// Sum of two matrices of the same size.  The result
    /// has the structural union of the two sparsity patterns.
    pub fn add(&self, B: &CscMatrix<T>) -> Result<CscMatrix<T>, DimensionMismatchError> {
        if self.size() != B.size() {
            return Err(DimensionMismatchError {
                expected: self.size(),
                found: B.size(),
            });
        }

        let mut colptr = Vec::with_capacity(self.n + 1);
        let mut rowval = Vec::with_capacity(self.nnz() + B.nnz());
        let mut nzval = Vec::with_capacity(self.nnz() + B.nnz());
        colptr.push(0);

        for col in 0..self.n {
            let (mut i, iend) = (self.colptr[col], self.colptr[col + 1]);
            let (mut j, jend) = (B.colptr[col], B.colptr[col + 1]);

            while i < iend || j < jend {
                let ord = match (i < iend, j < jend) {
                    (true, true) => self.rowval[i].cmp(&B.rowval[j]),
                    (true, false) => Ordering::Less,
                    _ => Ordering::Greater,
                };
                match ord {
                    Ordering::Less => {
                        rowval.push(self.rowval[i]);
                        nzval.push(self.nzval[i]);
                        i += 1;
                    }
                    Ordering::Greater => {
                        rowval.push(B.rowval[j]);
                        nzval.push(B.nzval[j]);
                        j += 1;
                    }
                    Ordering::Equal => {
                        rowval.push(self.rowval[i]);
                        nzval.push(self.nzval[i] + B.nzval[j]);
                        i += 1;
                        j += 1;
                    }
                }
            }
            colptr.push(rowval.len());
        }

        Ok(CscMatrix::new(self.m, self.n, colptr, rowval, nzval))
    }

    /// Scaled copy `c*self`
    pub fn scaled(&self, c: T) -> Self {
        let mut out = self.clone();
        out.nzval.iter_mut().for_each(|v| *v *= c);
        out
    }
}

impl<T, const M: usize, const N: usize> From<&[[T; N]; M]> for CscMatrix<T>
where
    T: FloatT,
{
    /// Construct from row-major nested arrays.  Exact zeros are not stored.
    fn from(rows: &[[T; N]; M]) -> CscMatrix<T> {
        let (mut ri, mut ci, mut vals) = (Vec::new(), Vec::new(), Vec::new());

        for (r, row) in rows.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                if v != T::zero() {
                    ri.push(r);
                    ci.push(c);
                    vals.push(v);
                }
            }
        }

        CscMatrix::from_triplets_unchecked(M, N, &ri, &ci, &vals)
    }
}
