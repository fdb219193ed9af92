#![allow(non_snake_case)]
use crate::algebra::*;
use std::iter::zip;

impl<T: FloatT> MatrixVectorMultiply for CscMatrix<T> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        assert_eq!(x.len(), self.n);
        assert_eq!(y.len(), self.m);
        prescale(y, b);
        if a == T::zero() {
            return;
        }
        for (col, &xj) in x.iter().enumerate() {
            let axj = a * xj;
            for (&row, &v) in self.column(col) {
                y[row] += v * axj;
            }
        }
    }
}

impl<T: FloatT> MatrixVectorMultiply for Adjoint<'_, CscMatrix<T>> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        let A = self.src;
        assert_eq!(x.len(), A.m);
        assert_eq!(y.len(), A.n);
        prescale(y, b);
        if a == T::zero() {
            return;
        }
        // one dot product per column of A
        for (col, yj) in y.iter_mut().enumerate() {
            let acc = A
                .column(col)
                .fold(T::zero(), |acc, (&row, &v)| acc + v * x[row]);
            *yj += a * acc;
        }
    }
}

impl<T: FloatT> SymMatrixVectorMultiply for Symmetric<'_, CscMatrix<T>> {
    type T = T;

    fn symv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        let Q = self.src;
        assert!(Q.m == Q.n);
        assert_eq!(x.len(), Q.n);
        assert_eq!(y.len(), Q.n);
        prescale(y, b);

        for (col, &xj) in x.iter().enumerate() {
            let mut acc = T::zero();
            for (&row, &v) in Q.column(col) {
                y[row] += a * v * xj;
                // mirrored entry below the diagonal
                if row != col {
                    acc += v * x[row];
                }
            }
            y[col] += a * acc;
        }
    }
}

impl<T: FloatT> MatrixMath for CscMatrix<T> {
    type T = T;

    fn col_norms_sym(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.n);
        norms.fill(T::zero());
        for col in 0..self.n {
            for (&row, &v) in self.column(col) {
                let v = v.abs();
                norms[col] = T::max(norms[col], v);
                norms[row] = T::max(norms[row], v);
            }
        }
    }

    fn col_norms_fold(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.n);
        for (col, norm) in norms.iter_mut().enumerate() {
            *norm = self
                .column(col)
                .fold(*norm, |m, (_, &v)| T::max(m, v.abs()));
        }
    }

    fn row_norms(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.m);
        norms.fill(T::zero());
        for (&row, &v) in zip(&self.rowval, &self.nzval) {
            norms[row] = T::max(norms[row], v.abs());
        }
    }

    fn scale(&mut self, c: T) {
        self.nzval.scale(c);
    }

    fn lrscale(&mut self, l: &[T], r: &[T]) {
        assert_eq!(l.len(), self.m);
        assert_eq!(r.len(), self.n);
        for (col, &rj) in r.iter().enumerate() {
            let rng = self.colptr[col]..self.colptr[col + 1];
            for (v, &row) in zip(&mut self.nzval[rng.clone()], &self.rowval[rng]) {
                *v *= l[row] * rj;
            }
        }
    }
}

impl<T: FloatT> CscMatrix<T> {
    // (row, value) pairs of one column
    pub(crate) fn column(&self, col: usize) -> impl Iterator<Item = (&usize, &T)> + '_ {
        let rng = self.colptr[col]..self.colptr[col + 1];
        zip(&self.rowval[rng.clone()], &self.nzval[rng])
    }
}

// y = b*y ahead of accumulating a product into it
fn prescale<T: FloatT>(y: &mut [T], b: T) {
    if b == T::zero() {
        y.fill(T::zero());
    } else if b != T::one() {
        y.scale(b);
    }
}
