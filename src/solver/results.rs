use super::info::QPALMInfo;
use super::iterates::Iterates;
use super::problemdata::ProblemData;
use crate::algebra::*;

/// Solution of a QP, or the certificate proving that none exists
///
/// Only the vectors meaningful for `info.status` carry values, the
/// others are filled with NaN:
///
/// | status | x, y | prim_inf_cert | dual_inf_cert |
/// |---|---|---|---|
/// | solved, max iter, time limit | ✓ | NaN | NaN |
/// | primal infeasible | NaN | ✓ | NaN |
/// | dual infeasible | NaN | NaN | ✓ |
/// | nonconvex, unsolved | NaN | NaN | NaN |
///
/// Certificates have unit ∞-norm.

#[derive(Debug, Clone)]
pub struct QPALMResults<T> {
    /// primal solution
    pub x: Vec<T>,
    /// constraint multipliers
    pub y: Vec<T>,
    /// δy with A'δy = 0 and u'δy₊ + l'δy₋ < 0
    pub prim_inf_cert: Vec<T>,
    /// δx with Qδx = 0, q'δx < 0 and Aδx in the recession cone of the bounds
    pub dual_inf_cert: Vec<T>,
    pub info: QPALMInfo<T>,
}

impl<T> QPALMResults<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            x: vec![T::nan(); n],
            y: vec![T::nan(); m],
            prim_inf_cert: vec![T::nan(); m],
            dual_inf_cert: vec![T::nan(); n],
            info: QPALMInfo::new(),
        }
    }

    // reuse the allocated buffers where possible
    pub(crate) fn resize(&mut self, n: usize, m: usize) {
        self.x.resize(n, T::nan());
        self.y.resize(m, T::nan());
        self.prim_inf_cert.resize(m, T::nan());
        self.dual_inf_cert.resize(n, T::nan());
    }

    /// Write unscaled solution and certificates for `self.info.status`
    pub(crate) fn finalize(&mut self, data: &ProblemData<T>, it: &Iterates<T>) {
        self.resize(data.n, data.m);
        let equil = &data.equilibration;
        let status = self.info.status;

        if status.has_solution() {
            equil.unscale_primal(&mut self.x, &it.x);
            equil.unscale_dual(&mut self.y, &it.yh);
        } else {
            self.x.set(T::nan());
            self.y.set(T::nan());
        }

        if status.is_primal_infeasible() {
            self.prim_inf_cert.copy_from(&it.dy).hadamard(&equil.e);
            normalize_certificate(&mut self.prim_inf_cert);
        } else {
            self.prim_inf_cert.set(T::nan());
        }

        if status.is_dual_infeasible() {
            self.dual_inf_cert.copy_from(&it.dx).hadamard(&equil.d);
            normalize_certificate(&mut self.dual_inf_cert);
        } else {
            self.dual_inf_cert.set(T::nan());
        }
    }
}

impl<T> Default for QPALMResults<T>
where
    T: FloatT,
{
    fn default() -> Self {
        Self::new(0, 0)
    }
}

fn normalize_certificate<T: FloatT>(v: &mut [T]) {
    let norm = v.norm_inf();
    if norm > T::zero() {
        v.scale(T::recip(norm));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::problem::NormalizedProblem;
    use crate::solver::SolverStatus;

    fn test_data() -> ProblemData<f64> {
        let mut data = ProblemData::new(NormalizedProblem {
            Q: CscMatrix::identity(2),
            q: vec![1., -1.],
            A: CscMatrix::from(&[[1., 1.]]),
            bmin: vec![-1.],
            bmax: vec![1.],
            infbound: 1e20,
        });
        data.equilibration.d = vec![2., 0.5];
        data.equilibration.e = vec![4.];
        data.equilibration.c = 0.5;
        data
    }

    #[test]
    fn test_results_fill_rules() {
        let data = test_data();
        let mut it = Iterates::new(2, 1);
        it.x = vec![1., 2.];
        it.yh = vec![3.];
        it.dy = vec![-0.5];
        it.dx = vec![0.25, -4.];

        // a stale, differently sized buffer
        let mut results = QPALMResults::<f64>::new(5, 3);
        results.prim_inf_cert.set(7.);

        results.info.status = SolverStatus::Solved;
        results.finalize(&data, &it);
        assert_eq!(results.x, vec![2., 1.]);
        assert_eq!(results.y, vec![24.]);
        assert_eq!(results.prim_inf_cert.len(), 1);
        assert!(results.prim_inf_cert[0].is_nan());
        assert!(results.dual_inf_cert.iter().all(|v| v.is_nan()));

        results.info.status = SolverStatus::PrimalInfeasible;
        results.finalize(&data, &it);
        assert!(results.x.iter().chain(&results.y).all(|v| v.is_nan()));
        assert_eq!(results.prim_inf_cert, vec![-1.]);

        results.info.status = SolverStatus::DualInfeasibleInaccurate;
        results.finalize(&data, &it);
        assert!(results.prim_inf_cert[0].is_nan());
        assert_eq!(results.dual_inf_cert, vec![0.25, -1.]);

        results.info.status = SolverStatus::NonConvex;
        results.finalize(&data, &it);
        assert!(results.dual_inf_cert.iter().all(|v| v.is_nan()));
        assert!(results.x.iter().all(|v| v.is_nan()));
    }
}
