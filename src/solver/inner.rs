#![allow(non_snake_case)]
use super::iterates::Iterates;
use super::linesearch::{LineSearch, LineSearchInput};
use super::linsys::{FactorizationError, LinearSolverEngine, LinearSystemSolver};
use super::penalty::PenaltyManager;
use super::problemdata::ProblemData;
use super::settings::QPALMSettings;
use crate::algebra::*;

/// Semismooth Newton method for the proximal augmented Lagrangian
/// subproblem at fixed y, σ and x₀.
pub(crate) struct InnerSolver<T: FloatT> {
    linsys: LinearSolverEngine<T>,
    linesearch: LineSearch<T>,
}

impl<T> InnerSolver<T>
where
    T: FloatT,
{
    pub fn new(data: &ProblemData<T>, settings: &QPALMSettings<T>) -> Result<Self, FactorizationError> {
        let linsys = LinearSolverEngine::new(data, settings)?;
        let linesearch = LineSearch::new(data.m);
        Ok(Self { linsys, linesearch })
    }

    pub fn linsys_name(&self) -> &'static str {
        self.linsys.name()
    }

    /// Discard the current factorization, e.g. after a data update
    pub fn invalidate(&mut self) {
        self.linsys.invalidate();
    }

    /// One Newton step with line search, leaving the updated point in
    /// `it`.  Returns the step length taken.
    ///
    /// A Newton matrix that cannot be factorized is regularized by
    /// raising ρ, at most `max_factorization_retries` times.  The error
    /// of the last attempt is returned once that budget is spent.
    pub fn newton_step(
        &mut self,
        data: &ProblemData<T>,
        it: &mut Iterates<T>,
        penalty: &mut PenaltyManager<T>,
        settings: &QPALMSettings<T>,
    ) -> Result<T, FactorizationError> {
        self.factor(data, it, penalty, settings)?;

        it.rhs.copy_from(&it.dphi).negate();
        self.linsys.solve(&it.rhs, &mut it.d);
        data.A.gemv(&mut it.Ad, &it.d, T::one(), T::zero());
        data.Q.sym().symv(&mut it.Qd, &it.d, T::one(), T::zero());

        // φ along d, up to the constraint terms:
        // ½η τ² + β τ
        let rho = penalty.rho;
        let mut eta = it.d.dot(&it.Qd) + rho * it.d.sumsq();
        let mut beta = T::zero();
        for i in 0..data.n {
            beta += it.d[i] * (it.Qx[i] + data.q[i] + rho * (it.x[i] - it.x0[i]));
        }
        if !eta.is_finite() {
            eta = T::zero();
        }
        if !beta.is_finite() {
            beta = T::zero();
        }

        let input = LineSearchInput {
            eta,
            beta,
            Ax: &it.Ax,
            Ad: &it.Ad,
            y: &it.y,
            sigma: &penalty.sigma,
            bmin: &data.bmin,
            bmax: &data.bmax,
            lower_finite: &data.lower_finite,
            upper_finite: &data.upper_finite,
        };
        let tau = self.linesearch.search(&input, settings);

        it.take_step(tau);
        Ok(tau)
    }

    /// Factorize the Newton matrix at the starting point of a convex
    /// solve.  Negative inertia at the initial ρ means Q is indefinite
    /// and is returned without regularizing.  Singular systems, e.g.
    /// with the proximal term disabled, go through [`factor`](Self::factor).
    pub fn factor_initial(
        &mut self,
        data: &ProblemData<T>,
        it: &mut Iterates<T>,
        penalty: &mut PenaltyManager<T>,
        settings: &QPALMSettings<T>,
    ) -> Result<(), FactorizationError> {
        let result = self
            .linsys
            .update(data, &it.active, &penalty.sigma, penalty.rho, settings);

        match result {
            Err(FactorizationError::NotPositiveDefinite) if penalty.rho > T::zero() => {
                Err(FactorizationError::NotPositiveDefinite)
            }
            Err(_) => self.factor(data, it, penalty, settings),
            Ok(()) => Ok(()),
        }
    }

    // regularizes ρ on failure; a no-op if the factorization is current
    fn factor(
        &mut self,
        data: &ProblemData<T>,
        it: &mut Iterates<T>,
        penalty: &mut PenaltyManager<T>,
        settings: &QPALMSettings<T>,
    ) -> Result<(), FactorizationError> {
        let mut retries = 0;
        loop {
            let result = self
                .linsys
                .update(data, &it.active, &penalty.sigma, penalty.rho, settings);

            match result {
                Ok(()) => break,
                Err(e) if retries < settings.max_factorization_retries => {
                    penalty.regularize(settings);
                    retries += 1;
                    log::debug!(
                        "factorization failed ({}), retrying with ρ = {:e}",
                        e,
                        penalty.rho
                    );
                }
                Err(e) => {
                    log::debug!("factorization failed after {} retries: {}", retries, e);
                    return Err(e);
                }
            }
        }

        if retries > 0 {
            penalty.commit_regularization();
            it.update_dphi(penalty.rho);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::problem::NormalizedProblem;
    use crate::solver::QPALMSettingsBuilder;

    fn problem(Q: CscMatrix<f64>) -> ProblemData<f64> {
        ProblemData::new(NormalizedProblem {
            Q,
            q: vec![1., -2.],
            A: CscMatrix::from(&[[1., 0.]]),
            bmin: vec![-1e20],
            bmax: vec![0.],
            infbound: 1e20,
        })
    }

    #[test]
    fn test_newton_step_unconstrained_minimum() {
        // minimum of x₁² + x₂² + x₁ - 2x₂ is inside the bounds
        let Q = CscMatrix::from(&[[2., 0.], [0., 2.]]);
        let data = problem(Q);
        let settings = QPALMSettingsBuilder::<f64>::default()
            .proximal_enable(false)
            .min_proximal(1e-12)
            .build()
            .unwrap();

        let mut penalty = PenaltyManager::new(1);
        penalty.initialize(&settings, settings.min_proximal);
        let mut it = Iterates::new(2, 1);
        it.reset(&data, &[0., 0.], &[0.]);
        it.update_residuals(&data, &penalty.sigma, penalty.rho);

        let mut inner = InnerSolver::new(&data, &settings).unwrap();
        let tau = inner.newton_step(&data, &mut it, &mut penalty, &settings).unwrap();
        assert!((tau - 1.).abs() < 1e-6);
        assert!((it.x[0] + 0.5).abs() < 1e-6);
        assert!((it.x[1] - 1.).abs() < 1e-6);
    }

    #[test]
    fn test_newton_step_regularization() {
        let Q = CscMatrix::from(&[[-1., 0.], [0., 2.]]);
        let data = problem(Q);

        // too few retries to reach ρ > 1
        let settings = QPALMSettingsBuilder::<f64>::default()
            .max_factorization_retries(0)
            .build()
            .unwrap();
        let mut penalty = PenaltyManager::new(1);
        penalty.initialize(&settings, settings.min_proximal);
        let mut it = Iterates::new(2, 1);
        it.reset(&data, &[0., 0.], &[0.]);
        it.update_residuals(&data, &penalty.sigma, penalty.rho);
        let mut inner = InnerSolver::new(&data, &settings).unwrap();
        assert!(inner.newton_step(&data, &mut it, &mut penalty, &settings).is_err());

        // ρ = 0.1 → 1 → 10 succeeds and becomes the floor
        let settings = QPALMSettingsBuilder::<f64>::default()
            .max_factorization_retries(2)
            .build()
            .unwrap();
        penalty.initialize(&settings, settings.min_proximal);
        it.update_residuals(&data, &penalty.sigma, penalty.rho);
        inner.invalidate();
        assert!(inner.newton_step(&data, &mut it, &mut penalty, &settings).is_ok());
        assert_eq!(penalty.rho, 10.);
        assert_eq!(penalty.rho_floor, 10.);
    }

    #[test]
    fn test_factor_initial_rejects_indefinite() {
        let data = problem(CscMatrix::from(&[[-1., 0.], [0., 2.]]));
        let settings = QPALMSettingsBuilder::<f64>::default().build().unwrap();

        let mut penalty = PenaltyManager::new(1);
        penalty.initialize(&settings, settings.min_proximal);
        let mut it = Iterates::new(2, 1);
        it.reset(&data, &[0., 0.], &[0.]);
        it.update_residuals(&data, &penalty.sigma, penalty.rho);

        // retries would reach ρ = 10, but Q is indefinite at ρ = 0.1
        let mut inner = InnerSolver::new(&data, &settings).unwrap();
        assert_eq!(
            inner.factor_initial(&data, &mut it, &mut penalty, &settings),
            Err(FactorizationError::NotPositiveDefinite)
        );
        assert_eq!(penalty.rho, 0.1);
    }

    #[test]
    fn test_factor_initial_regularizes_singular() {
        // positive semidefinite Q without a proximal term
        let data = problem(CscMatrix::from(&[[0., 0.], [0., 2.]]));
        let settings = QPALMSettingsBuilder::<f64>::default()
            .proximal_enable(false)
            .build()
            .unwrap();

        let mut penalty = PenaltyManager::new(1);
        penalty.initialize(&settings, 0.);
        let mut it = Iterates::new(2, 1);
        it.reset(&data, &[0., 0.], &[0.]);
        it.update_residuals(&data, &penalty.sigma, penalty.rho);

        let mut inner = InnerSolver::new(&data, &settings).unwrap();
        assert!(inner
            .factor_initial(&data, &mut it, &mut penalty, &settings)
            .is_ok());
        assert_eq!(penalty.rho, settings.min_proximal);
    }
}
