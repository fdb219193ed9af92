#![allow(non_snake_case)]
use super::iterates::Iterates;
use super::problemdata::ProblemData;
use crate::algebra::*;

/// Unscaled residual norms at the current iterate
#[derive(Debug, Clone, Default)]
pub(crate) struct Residuals<T> {
    /// ‖Ax - z‖∞
    pub pri_res: T,
    /// ‖Qx + q + A'ŷ‖∞
    pub dua_res: T,
    /// ‖∇φ‖∞
    pub dphi_res: T,

    // norms for the relative tolerances
    pub norm_Ax: T,
    pub norm_z: T,
    pub norm_Qx: T,
    pub norm_Atyh: T,
    pub norm_q: T,
}

impl<T> Residuals<T>
where
    T: FloatT,
{
    pub fn update(&mut self, data: &ProblemData<T>, it: &Iterates<T>) {
        let equil = &data.equilibration;
        let (dinv, einv) = (&equil.dinv, &equil.einv);
        let cinv = T::recip(equil.c);

        self.pri_res = it.pri.norm_inf_scaled(einv);
        self.norm_Ax = it.Ax.norm_inf_scaled(einv);
        self.norm_z = it.z.norm_inf_scaled(einv);

        self.dua_res = it.dua.norm_inf_scaled(dinv) * cinv;
        self.dphi_res = it.dphi.norm_inf_scaled(dinv) * cinv;
        self.norm_Qx = it.Qx.norm_inf_scaled(dinv) * cinv;
        self.norm_Atyh = it.Atyh.norm_inf_scaled(dinv) * cinv;
        self.norm_q = data.q.norm_inf_scaled(dinv) * cinv;
    }

    /// Tolerance on the primal residual
    pub fn eps_pri(&self, eps_abs: T, eps_rel: T) -> T {
        eps_abs + eps_rel * T::max(self.norm_Ax, self.norm_z)
    }

    /// Tolerance on the dual residual
    pub fn eps_dua(&self, eps_abs: T, eps_rel: T) -> T {
        eps_abs + eps_rel * T::max(T::max(self.norm_Qx, self.norm_Atyh), self.norm_q)
    }

    pub fn is_solved(&self, eps_abs: T, eps_rel: T) -> bool {
        self.pri_res <= self.eps_pri(eps_abs, eps_rel) && self.dua_res <= self.eps_dua(eps_abs, eps_rel)
    }

    /// Subproblem termination
    pub fn is_subproblem_solved(&self, eps_abs: T, eps_rel: T) -> bool {
        self.dphi_res <= self.eps_dua(eps_abs, eps_rel)
    }
}

/// δy = ŷ - y certifies primal infeasibility if A'δy ≈ 0 and the
/// support function of the bounds at δy is negative.
///
/// `work` has length n.
pub(crate) fn is_primal_infeasible<T: FloatT>(
    data: &ProblemData<T>,
    dy: &[T],
    eps: T,
    work: &mut [T],
) -> bool {
    let equil = &data.equilibration;
    let norm_dy = dy.norm_inf_scaled(&equil.e);
    if norm_dy == T::zero() || !norm_dy.is_finite() {
        return false;
    }
    let tol = eps * norm_dy;

    data.A.t().gemv(work, dy, T::one(), T::zero());
    if work.norm_inf_scaled(&equil.dinv) > tol {
        return false;
    }

    // u'δy₊ + l'δy₋, over finite bounds only.  Multipliers
    // pushing against an infinite bound must be negligible
    let mut support = T::zero();
    for i in 0..data.m {
        let v = dy[i];
        if v > T::zero() {
            if data.upper_finite[i] {
                support += data.bmax[i] * v;
            } else if equil.e[i] * v > tol {
                return false;
            }
        } else if v < T::zero() {
            if data.lower_finite[i] {
                support += data.bmin[i] * v;
            } else if -equil.e[i] * v > tol {
                return false;
            }
        }
    }
    support <= -tol
}

/// A step δx certifies dual infeasibility if Qδx ≈ 0, q'δx < 0 and
/// Aδx lies in the recession cone of the bounds.
pub(crate) fn is_dual_infeasible<T: FloatT>(
    data: &ProblemData<T>,
    dx: &[T],
    Qdx: &[T],
    Adx: &[T],
    eps: T,
) -> bool {
    let equil = &data.equilibration;
    let norm_dx = dx.norm_inf_scaled(&equil.d);
    if norm_dx == T::zero() || !norm_dx.is_finite() {
        return false;
    }
    let tol = eps * norm_dx;
    let cinv = T::recip(equil.c);

    if Qdx.norm_inf_scaled(&equil.dinv) * cinv > tol {
        return false;
    }
    if data.q.dot(dx) * cinv > -tol {
        return false;
    }

    (0..data.m).all(|i| {
        let v = Adx[i] * equil.einv[i];
        let lower_ok = !data.lower_finite[i] || v >= -tol;
        let upper_ok = !data.upper_finite[i] || v <= tol;
        lower_ok && upper_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::problem::NormalizedProblem;

    fn data(Q: CscMatrix<f64>, q: Vec<f64>, A: CscMatrix<f64>, l: Vec<f64>, u: Vec<f64>) -> ProblemData<f64> {
        ProblemData::new(NormalizedProblem {
            Q,
            q,
            A,
            bmin: l,
            bmax: u,
            infbound: 1e20,
        })
    }

    #[test]
    fn test_primal_infeasibility() {
        // x = 1 and -x = 1
        let d = data(
            CscMatrix::zeros((1, 1)),
            vec![0.],
            CscMatrix::from(&[[1.], [-1.]]),
            vec![1., 1.],
            vec![1., 1.],
        );
        let mut work = [0.];
        assert!(is_primal_infeasible(&d, &[-1., -1.], 1e-5, &mut work));
        assert!(!is_primal_infeasible(&d, &[1., 1.], 1e-5, &mut work));
        assert!(!is_primal_infeasible(&d, &[-1., 0.], 1e-5, &mut work));
        assert!(!is_primal_infeasible(&d, &[0., 0.], 1e-5, &mut work));

        // x ≥ 1 and x ≤ -1 through infinite bounds
        let d = data(
            CscMatrix::zeros((1, 1)),
            vec![0.],
            CscMatrix::from(&[[1.], [1.]]),
            vec![1., -1e20],
            vec![1e20, -1.],
        );
        assert!(is_primal_infeasible(&d, &[-1., 1.], 1e-5, &mut work));
        // wrong sign pushes against the infinite bounds
        assert!(!is_primal_infeasible(&d, &[1., -1.], 1e-5, &mut work));
    }

    #[test]
    fn test_dual_infeasibility() {
        // min -x s.t. x ≥ 0
        let d = data(
            CscMatrix::zeros((1, 1)),
            vec![-1.],
            CscMatrix::identity(1),
            vec![0.],
            vec![1e20],
        );
        assert!(is_dual_infeasible(&d, &[1.], &[0.], &[1.], 1e-5));
        assert!(!is_dual_infeasible(&d, &[-1.], &[0.], &[-1.], 1e-5));
        assert!(!is_dual_infeasible(&d, &[0.], &[0.], &[0.], 1e-5));

        // bounded above as well
        let d = data(
            CscMatrix::zeros((1, 1)),
            vec![-1.],
            CscMatrix::identity(1),
            vec![0.],
            vec![1.],
        );
        assert!(!is_dual_infeasible(&d, &[1.], &[0.], &[1.], 1e-5));
    }

    #[test]
    fn test_tolerances() {
        let r = Residuals::<f64> {
            pri_res: 1e-5,
            dua_res: 2e-4,
            dphi_res: 1e-3,
            norm_Ax: 10.,
            norm_z: 1.,
            norm_Qx: 1.,
            norm_Atyh: 3.,
            norm_q: 2.,
        };
        assert!((r.eps_pri(1e-4, 1e-4) - 1.1e-3).abs() < 1e-15);
        assert!((r.eps_dua(1e-4, 1e-4) - 4e-4).abs() < 1e-15);
        assert!(r.is_solved(1e-4, 1e-4));
        assert!(!r.is_solved(1e-4, 0.));
        assert!(!r.is_subproblem_solved(1e-4, 1e-4));
        assert!(r.is_subproblem_solved(1e-1, 0.));
    }
}
