use super::{FloatT, VectorMath};
use itertools::izip;
use std::iter::zip;

impl<T: FloatT> VectorMath for [T] {
    type T = T;

    fn copy_from(&mut self, src: &[T]) -> &mut Self {
        self.copy_from_slice(src);
        self
    }

    fn scalarop(&mut self, op: impl Fn(T) -> T) -> &mut Self {
        self.iter_mut().for_each(|x| *x = op(*x));
        self
    }

    fn scalarop_from(&mut self, op: impl Fn(T) -> T, v: &[T]) -> &mut Self {
        assert_eq!(self.len(), v.len());
        zip(&mut *self, v).for_each(|(x, &v)| *x = op(v));
        self
    }

    fn set(&mut self, c: T) -> &mut Self {
        self.fill(c);
        self
    }

    fn scale(&mut self, c: T) -> &mut Self {
        self.iter_mut().for_each(|x| *x *= c);
        self
    }

    fn negate(&mut self) -> &mut Self {
        self.iter_mut().for_each(|x| *x = -*x);
        self
    }

    fn hadamard(&mut self, y: &[T]) -> &mut Self {
        assert_eq!(self.len(), y.len());
        zip(&mut *self, y).for_each(|(x, &y)| *x *= y);
        self
    }

    fn dot(&self, y: &[T]) -> T {
        assert_eq!(self.len(), y.len());
        compensated_sum(zip(self, y).map(|(&x, &y)| x * y))
    }

    fn dist(&self, y: &[T]) -> T {
        assert_eq!(self.len(), y.len());
        T::sqrt(compensated_sum(zip(self, y).map(|(&x, &y)| (x - y) * (x - y))))
    }

    fn sumsq(&self) -> T {
        self.dot(self)
    }

    fn norm(&self) -> T {
        T::sqrt(self.sumsq())
    }

    fn norm_inf(&self) -> T {
        // T::max would silently drop NaNs
        let mut out = T::zero();
        for &v in self {
            if v.is_nan() {
                return T::nan();
            }
            out = T::max(out, v.abs());
        }
        out
    }

    fn norm_inf_scaled(&self, v: &[T]) -> T {
        assert_eq!(self.len(), v.len());
        zip(self, v).fold(T::zero(), |m, (&x, &v)| T::max(m, (x * v).abs()))
    }

    fn norm_inf_diff(&self, b: &[T]) -> T {
        assert_eq!(self.len(), b.len());
        zip(self, b).fold(T::zero(), |m, (&x, &b)| T::max(m, (x - b).abs()))
    }

    fn maximum(&self) -> T {
        self.iter().fold(T::neg_infinity(), |m, &x| T::max(m, x))
    }

    fn is_finite(&self) -> bool {
        self.iter().all(|x| x.is_finite())
    }

    fn axpby(&mut self, a: T, x: &[T], b: T) -> &mut Self {
        assert_eq!(self.len(), x.len());
        zip(&mut *self, x).for_each(|(y, &x)| *y = a * x + b * *y);
        self
    }

    fn waxpby(&mut self, a: T, x: &[T], b: T, y: &[T]) -> &mut Self {
        assert_eq!(self.len(), x.len());
        assert_eq!(self.len(), y.len());
        for (w, &x, &y) in izip!(&mut *self, x, y) {
            *w = a * x + b * y;
        }
        self
    }
}

// Neumaier's variant of Kahan summation
fn compensated_sum<T: FloatT>(terms: impl Iterator<Item = T>) -> T {
    let (mut sum, mut comp) = (T::zero(), T::zero());
    for v in terms {
        let t = sum + v;
        if sum.abs() >= v.abs() {
            comp += (sum - t) + v;
        } else {
            comp += (v - t) + sum;
        }
        sum = t;
    }
    sum + comp
}

#[test]
fn test_compensated_sum() {
    // 1 + 1e100 + 1 - 1e100 loses both ones without compensation
    let x = [1., 1e100, 1., -1e100];
    assert_eq!(compensated_sum(x.iter().copied()), 2.);
    assert_eq!(compensated_sum(std::iter::empty::<f64>()), 0.);
}

#[test]
fn test_dot_product() {
    let x = vec![1., 2., 3., 4.];
    let y = vec![4., 5., 6., 7.];
    assert_eq!(x.dot(&y), 60.);
}
