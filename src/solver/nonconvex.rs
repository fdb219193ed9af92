#![allow(non_snake_case)]
use crate::algebra::*;

const POWER_ITER_MAX: usize = 100;
const POWER_ITER_TOL: f64 = 1e-8;

/// Estimate of the smallest eigenvalue of the symmetric matrix with
/// upper triangle `Q`, by power iteration on cI - Q where c bounds
/// the spectrum of Q from above.
pub(crate) fn min_eigenvalue<T: FloatT>(Q: &CscMatrix<T>) -> T {
    let n = Q.ncols();
    if n == 0 {
        return T::zero();
    }
    let c = gershgorin_upper_bound(Q);
    let tol: T = POWER_ITER_TOL.as_T();

    // fixed start vector, so that results are reproducible
    let mut v: Vec<T> = (0..n).map(|i| T::one() + (i as f64 / n as f64).as_T()).collect();
    let vnorm = v.norm();
    v.scale(T::recip(vnorm));

    let mut w = vec![T::zero(); n];
    let mut mu = T::zero();
    for _ in 0..POWER_ITER_MAX {
        // w = (cI - Q)v
        w.copy_from(&v);
        Q.sym().symv(&mut w, &v, -T::one(), c);

        let mu_new = v.dot(&w);
        let wnorm = w.norm();
        let converged = T::abs(mu_new - mu) <= tol * T::abs(mu_new);
        mu = mu_new;
        if wnorm == T::zero() || converged {
            break;
        }
        v.scalarop_from(|x| x / wnorm, &w);
    }
    c - mu
}

// max_i Q_ii + Σ_j≠i |Q_ij|
fn gershgorin_upper_bound<T: FloatT>(Q: &CscMatrix<T>) -> T {
    let n = Q.ncols();
    let mut bound = vec![T::zero(); n];
    for j in 0..n {
        for k in Q.colptr[j]..Q.colptr[j + 1] {
            let (i, v) = (Q.rowval[k], Q.nzval[k]);
            if i == j {
                bound[j] += v;
            } else {
                bound[i] += v.abs();
                bound[j] += v.abs();
            }
        }
    }
    bound.maximum()
}

#[test]
fn test_min_eigenvalue() {
    let Q = CscMatrix::<f64>::from(&[[2., 0., 0.], [0., -3., 0.], [0., 0., 1.]]);
    assert!((min_eigenvalue(&Q) + 3.).abs() < 1e-4);

    let Q = CscMatrix::<f64>::from(&[[2., 1.], [1., 2.]]).to_triu();
    assert!((min_eigenvalue(&Q) - 1.).abs() < 1e-4);

    let Q = CscMatrix::<f64>::zeros((4, 4));
    assert_eq!(min_eigenvalue(&Q), 0.);
}

#[test]
fn test_gershgorin() {
    let Q = CscMatrix::from(&[[2., -1.], [-1., 5.]]).to_triu();
    assert_eq!(gershgorin_upper_bound(&Q), 6.);
}
