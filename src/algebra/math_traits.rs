use super::{DimensionMismatchError, FloatT, ShapedMatrix};

// Solver arithmetic goes through the traits below, implemented
// once for slices and CSC matrices of any FloatT.

/// Scalar operations on [`FloatT`](crate::algebra::FloatT)
pub trait ScalarMath {
    type T: FloatT;

    /// Euclidean projection onto the interval `[lo,hi]`
    fn project(&self, lo: Self::T, hi: Self::T) -> Self::T;
}

/// Vector operations on slices of [`FloatT`](crate::algebra::FloatT)
pub trait VectorMath {
    type T;

    /// Copy values from `src` to `self`
    fn copy_from(&mut self, src: &Self) -> &mut Self;

    /// Apply an elementwise operation in place
    fn scalarop(&mut self, op: impl Fn(Self::T) -> Self::T) -> &mut Self;

    /// `self[i] = op(v[i])`
    fn scalarop_from(&mut self, op: impl Fn(Self::T) -> Self::T, v: &Self) -> &mut Self;

    /// Set every element to `c`
    fn set(&mut self, c: Self::T) -> &mut Self;

    fn scale(&mut self, c: Self::T) -> &mut Self;

    fn negate(&mut self) -> &mut Self;

    /// `self[i] = self[i] * y[i]`
    fn hadamard(&mut self, y: &Self) -> &mut Self;

    /// Dot product, accumulated with compensated summation
    fn dot(&self, y: &Self) -> Self::T;

    /// Euclidean distance from `self` to `y`
    fn dist(&self, y: &Self) -> Self::T;

    fn sumsq(&self) -> Self::T;

    /// 2-norm
    fn norm(&self) -> Self::T;

    /// ∞-norm.  NaN if any element is NaN.
    fn norm_inf(&self) -> Self::T;

    /// ∞-norm of the elementwise product `self .* v`
    fn norm_inf_scaled(&self, v: &Self) -> Self::T;

    /// ∞-norm of `self - b`
    fn norm_inf_diff(&self, b: &Self) -> Self::T;

    /// Largest element, or -∞ for an empty vector
    fn maximum(&self) -> Self::T;

    /// True if there are no infinities or NaNs
    fn is_finite(&self) -> bool;

    /// `self = a*x + b*self`
    fn axpby(&mut self, a: Self::T, x: &Self, b: Self::T) -> &mut Self;

    /// `self = a*x + b*y`
    fn waxpby(&mut self, a: Self::T, x: &Self, b: Self::T, y: &Self) -> &mut Self;
}

/// General sparse matrix-vector products
pub trait MatrixVectorMultiply: ShapedMatrix {
    type T: FloatT;

    /// `y = a*self*x + b*y`.  Panics if the vector lengths do not
    /// match the matrix; see [`gemv_checked`](Self::gemv_checked).
    fn gemv(&self, y: &mut [Self::T], x: &[Self::T], a: Self::T, b: Self::T);

    /// As [`gemv`](Self::gemv), failing with the shape implied by
    /// `(y.len(), x.len())` if it does not match the matrix.
    fn gemv_checked(
        &self,
        y: &mut [Self::T],
        x: &[Self::T],
        a: Self::T,
        b: Self::T,
    ) -> Result<(), DimensionMismatchError> {
        check_product_shape(self.size(), y.len(), x.len())?;
        self.gemv(y, x, a, b);
        Ok(())
    }
}

/// Products with a symmetric matrix stored as its upper triangle
pub trait SymMatrixVectorMultiply: ShapedMatrix {
    type T: FloatT;

    /// `y = a*self*x + b*y`.  Panics if the vector lengths do not
    /// match the matrix; see [`symv_checked`](Self::symv_checked).
    fn symv(&self, y: &mut [Self::T], x: &[Self::T], a: Self::T, b: Self::T);

    /// As [`symv`](Self::symv), failing if the matrix is not square
    /// or the vector lengths do not match it.
    fn symv_checked(
        &self,
        y: &mut [Self::T],
        x: &[Self::T],
        a: Self::T,
        b: Self::T,
    ) -> Result<(), DimensionMismatchError> {
        let n = self.ncols();
        check_product_shape((n, n), self.nrows(), n)?;
        check_product_shape(self.size(), y.len(), x.len())?;
        self.symv(y, x, a, b);
        Ok(())
    }
}

fn check_product_shape(
    size: (usize, usize),
    ylen: usize,
    xlen: usize,
) -> Result<(), DimensionMismatchError> {
    if size == (ylen, xlen) {
        Ok(())
    } else {
        Err(DimensionMismatchError {
            expected: size,
            found: (ylen, xlen),
        })
    }
}

/// Norms and diagonal scalings of sparse matrices, as used by
/// the problem equilibration.
pub trait MatrixMath {
    type T: FloatT;

    /// ∞-norm of each column of a symmetric matrix stored as triu
    fn col_norms_sym(&self, norms: &mut [Self::T]);

    /// `norms[j] = max(norms[j], ‖self[:,j]‖∞)`, so that column
    /// norms of a stacked matrix can be built block by block
    fn col_norms_fold(&self, norms: &mut [Self::T]);

    /// ∞-norm of each row
    fn row_norms(&self, norms: &mut [Self::T]);

    /// Multiply every entry by `c`
    fn scale(&mut self, c: Self::T);

    /// `self = Diagonal(l) * self * Diagonal(r)`
    fn lrscale(&mut self, l: &[Self::T], r: &[Self::T]);
}
