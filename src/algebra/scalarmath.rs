use super::{FloatT, ScalarMath};

impl<T: FloatT> ScalarMath for T {
    type T = T;

    fn project(&self, lo: T, hi: T) -> T {
        if *self < lo {
            lo
        } else if *self > hi {
            hi
        } else {
            *self
        }
    }
}

// k(k+1)/2
pub(crate) fn triangular_number(k: usize) -> usize {
    k * (k + 1) / 2
}

#[test]
fn test_project() {
    assert_eq!(3.0_f64.project(-1.0, 1.0), 1.0);
    assert_eq!((-3.0_f64).project(-1.0, 1.0), -1.0);
    assert_eq!(0.5_f64.project(-1.0, 1.0), 0.5);
    assert_eq!(f64::INFINITY.project(-1.0, f64::INFINITY), f64::INFINITY);
}

#[test]
fn test_triangular_number() {
    assert_eq!(triangular_number(0), 0);
    assert_eq!(triangular_number(4), 10);
}
