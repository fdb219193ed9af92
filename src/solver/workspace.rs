#![allow(non_snake_case)]
use super::info::QPALMInfo;
use super::inner::InnerSolver;
use super::iterates::Iterates;
use super::nonconvex::min_eigenvalue;
use super::penalty::PenaltyManager;
use super::problem::{ProblemSetup, SetupError};
use super::problemdata::ProblemData;
use super::residuals::{is_dual_infeasible, is_primal_infeasible, Residuals};
use super::results::QPALMResults;
use super::settings::QPALMSettings;
use super::status::SolverStatus;
use crate::algebra::*;
use crate::io::{ConfigurablePrintTarget, PrintTarget};
use crate::timers::*;
use std::io::Write;
use thiserror::Error;

/// Error type returned by [`Workspace::solve`]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveError {
    #[error("Workspace has been released")]
    Released,
}

/// A QP set up for solution.
///
/// The workspace owns the scaled problem, the Newton system
/// factorization and all iterates.  It is created by
/// [`setup`](Workspace::setup), can be solved any number of times,
/// and is torn down by [`release`](Workspace::release) or on drop.
///
/// ```
/// use qpalm::algebra::*;
/// use qpalm::solver::*;
///
/// let Q = CscMatrix::from(&[[4., 1.], [0., 2.]]);
/// let A = CscMatrix::from(&[[1., 1.], [1., 0.], [0., 1.]]);
/// let q = [1., 1.];
/// let bmin = [1., 0., 0.];
/// let bmax = [1., 0.7, 0.7];
///
/// let problem = ProblemSetup::new().Q(&Q).q(&q).A(&A).bmin(&bmin).bmax(&bmax);
/// let settings = QPALMSettingsBuilder::default().verbose(false).build().unwrap();
///
/// let mut solver = Workspace::setup(&problem, settings).unwrap();
/// let results = solver.solve().unwrap();
/// assert!(results.info.status.is_solved());
/// ```
pub struct Workspace<T: FloatT = f64> {
    pub(super) core: Option<SolverCore<T>>,
    stream: PrintTarget,
}

pub(super) struct SolverCore<T: FloatT> {
    pub data: ProblemData<T>,
    pub settings: QPALMSettings<T>,
    pub penalty: PenaltyManager<T>,
    pub inner: InnerSolver<T>,
    pub iterates: Iterates<T>,
    pub residuals: Residuals<T>,
    pub info: QPALMInfo<T>,
    /// scaled starting point
    pub x_init: Vec<T>,
    pub y_init: Vec<T>,
    /// λ_min of the scaled Q, for nonconvex problems
    pub lambda_min: Option<T>,
    work: Vec<T>,
    timers: Option<Timers>,
}

impl<T> Workspace<T>
where
    T: FloatT,
{
    /// Validate and normalize a problem, scale it and prepare the
    /// Newton system solver.  Nothing is allocated for a problem that
    /// fails validation.
    pub fn setup(problem: &ProblemSetup<T>, settings: QPALMSettings<T>) -> Result<Self, SetupError> {
        let (n, m) = problem.validate(&settings)?;

        let mut timers = Timers::default();
        let core;

        timeit! {timers => "setup"; {
            core = SolverCore::new(problem, n, m, settings, &mut timers);
        }}

        let mut core = core?;
        core.info.setup_time = timers.seconds("setup");
        core.timers.replace(timers);

        Ok(Self {
            core: Some(core),
            stream: PrintTarget::default(),
        })
    }

    /// Solve the problem, returning a new results object
    pub fn solve(&mut self) -> Result<QPALMResults<T>, SolveError> {
        let mut results = QPALMResults::default();
        self.solve_into(&mut results)?;
        Ok(results)
    }

    /// Solve the problem, writing into an existing results object.
    /// Its vectors are resized as needed and fully overwritten.
    pub fn solve_into(&mut self, results: &mut QPALMResults<T>) -> Result<(), SolveError> {
        let core = self.core.as_mut().ok_or(SolveError::Released)?;
        core.solve(&mut self.stream, results);
        Ok(())
    }

    /// Free the problem data and factorizations.  Safe to call more
    /// than once.
    pub fn release(&mut self) {
        if self.core.take().is_some() {
            log::debug!("workspace released");
        }
    }

    pub fn is_released(&self) -> bool {
        self.core.is_none()
    }

    /// Problem dimensions (n, m), or `None` once released
    pub fn dims(&self) -> Option<(usize, usize)> {
        self.core.as_ref().map(|core| (core.data.n, core.data.m))
    }

    /// Current settings, or `None` once released
    pub fn settings(&self) -> Option<&QPALMSettings<T>> {
        self.core.as_ref().map(|core| &core.settings)
    }
}

impl<T> Drop for Workspace<T>
where
    T: FloatT,
{
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> ConfigurablePrintTarget for Workspace<T>
where
    T: FloatT,
{
    fn print_to_stdout(&mut self) {
        self.stream.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.stream.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.stream.print_to_stream(stream)
    }
    fn print_to_buffer(&mut self) {
        self.stream.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.stream.get_print_buffer()
    }
}

impl<T> SolverCore<T>
where
    T: FloatT,
{
    fn new(
        problem: &ProblemSetup<T>,
        n: usize,
        m: usize,
        settings: QPALMSettings<T>,
        timers: &mut Timers,
    ) -> Result<Self, SetupError> {
        let mut data = ProblemData::new(problem.normalize(n, m));

        timeit! {timers => "equilibration"; {
            data.equilibrate(&settings);
        }}

        let lambda_min = settings.nonconvex.then(|| min_eigenvalue(&data.Q));

        let inner;
        timeit! {timers => "linsysinit"; {
            inner = InnerSolver::new(&data, &settings);
        }}
        let inner = inner?;

        log::debug!(
            "setup: n = {}, m = {}, linear solver = {}",
            n,
            m,
            inner.linsys_name()
        );

        Ok(Self {
            data,
            settings,
            penalty: PenaltyManager::new(m),
            inner,
            iterates: Iterates::new(n, m),
            residuals: Residuals::default(),
            info: QPALMInfo::new(),
            x_init: vec![T::zero(); n],
            y_init: vec![T::zero(); m],
            lambda_min,
            work: vec![T::zero(); n],
            timers: None,
        })
    }

    fn solve(&mut self, out: &mut PrintTarget, results: &mut QPALMResults<T>) {
        let mut timers = self.timers.take().unwrap_or_default();
        self.info.reset(&mut timers);

        timeit! {timers => "solve"; {

        print_io(self.info.print_configuration(
            out,
            &self.settings,
            &self.data,
            self.inner.linsys_name(),
        ));
        print_io(self.info.print_status_header(out, &self.settings));

        self.initialize();
        let status = self.iterate(out, &timers);
        self.info.status = self.check_reduced_tolerances(status);
        self.compute_objectives();

        }} // end "solve" timer

        self.info.finalize(&timers);
        results.info.clone_from(&self.info);
        results.finalize(&self.data, &self.iterates);

        print_io(self.info.print_footer(out, &self.settings));
        timers.print();

        self.timers.replace(timers);
    }

    fn initialize(&mut self) {
        let min_proximal = self.settings.min_proximal;
        let margin: T = (1.1).as_T();
        let rho_floor = match self.lambda_min {
            Some(lambda) if lambda < T::zero() => T::max(min_proximal, margin * (-lambda)),
            _ => min_proximal,
        };

        self.penalty.initialize(&self.settings, rho_floor);
        self.inner.invalidate();
        self.iterates.reset(&self.data, &self.x_init, &self.y_init);
        self.residuals = Residuals::default();
    }

    // proximal ALM iterations until a terminal status is reached
    fn iterate(&mut self, out: &mut PrintTarget, timers: &Timers) -> SolverStatus {
        let Self {
            data,
            settings,
            penalty,
            inner,
            iterates: it,
            residuals,
            info,
            work,
            ..
        } = self;

        let mut eps_abs_in = T::max(settings.eps_abs_in, settings.eps_abs);
        let mut eps_rel_in = T::max(settings.eps_rel_in, settings.eps_rel);
        let mut iter_in = 0u32;

        // A stationary start is only a solution if the problem is
        // convex, so factorize before the first convergence check.
        if !settings.nonconvex {
            it.update_residuals(data, &penalty.sigma, penalty.rho);
            if let Err(e) = inner.factor_initial(data, it, penalty, settings) {
                log::debug!("initial Newton system not positive definite: {}", e);
                return SolverStatus::NonConvex;
            }
        }

        loop {
            it.update_residuals(data, &penalty.sigma, penalty.rho);
            residuals.update(data, it);
            info.pri_res_norm = residuals.pri_res;
            info.dua_res_norm = residuals.dua_res;

            if residuals.is_solved(settings.eps_abs, settings.eps_rel) {
                return SolverStatus::Solved;
            }
            if is_primal_infeasible(data, &it.dy, settings.eps_prim_inf, work) {
                return SolverStatus::PrimalInfeasible;
            }
            if is_dual_infeasible(data, &it.dx, &it.Qdx, &it.Adx, settings.eps_dual_inf) {
                return SolverStatus::DualInfeasible;
            }
            if info.iter >= settings.max_iter {
                return SolverStatus::MaxIterReached;
            }

            let inner_converged = residuals.is_subproblem_solved(eps_abs_in, eps_rel_in);

            if inner_converged || iter_in >= settings.inner_max_iter {
                if !inner_converged {
                    info.inner_nonconvergence += 1;
                    log::debug!(
                        "subproblem {} not solved in {} iterations, ‖∇φ‖ = {:e}",
                        info.iter_out,
                        iter_in,
                        residuals.dphi_res
                    );
                }

                // multiplier and penalty updates
                let eps_pri = residuals.eps_pri(settings.eps_abs, settings.eps_rel);
                if info.iter_out > 0 && residuals.pri_res > eps_pri {
                    let changed = penalty.update_penalty(&it.pri, &it.pri_prev, settings);
                    if !changed.is_empty() {
                        log::debug!("penalty increased for {} constraints", changed.len());
                    }
                }
                it.outer_update();
                penalty.update_proximal(inner_converged, settings);

                eps_abs_in = T::max(eps_abs_in * settings.tolerance_shrink, settings.eps_abs);
                eps_rel_in = T::max(eps_rel_in * settings.tolerance_shrink, settings.eps_rel);
                iter_in = 0;
                info.iter_out += 1;

                info.objective = data.objective(&it.x, &it.Qx) / data.equilibration.c;
                let sigma_max = penalty.sigma.iter().fold(T::zero(), |s, &v| T::max(s, v));
                print_io(info.print_status(out, settings, sigma_max, penalty.rho));

                if info.iter_out >= settings.max_outer_iter {
                    return SolverStatus::MaxIterReached;
                }
                if timers.seconds("solve") > settings.time_limit {
                    return SolverStatus::TimeLimitReached;
                }
                continue;
            }

            match inner.newton_step(data, it, penalty, settings) {
                Ok(tau) => {
                    if tau == T::zero() {
                        log::debug!("zero step at iteration {}", info.iter);
                    }
                }
                Err(e) => {
                    log::debug!("Newton system not positive definite: {}", e);
                    return SolverStatus::NonConvex;
                }
            }
            info.iter += 1;
            iter_in += 1;
        }
    }

    // reduced accuracy checks when stopped by an iteration or time limit
    fn check_reduced_tolerances(&mut self, status: SolverStatus) -> SolverStatus {
        if !matches!(
            status,
            SolverStatus::MaxIterReached | SolverStatus::TimeLimitReached
        ) {
            return status;
        }

        let (data, it, set) = (&self.data, &self.iterates, &self.settings);

        if self.residuals.is_solved(set.reduced_eps_abs, set.reduced_eps_rel) {
            SolverStatus::SolvedInaccurate
        } else if is_primal_infeasible(data, &it.dy, set.reduced_eps_prim_inf, &mut self.work) {
            SolverStatus::PrimalInfeasibleInaccurate
        } else if is_dual_infeasible(data, &it.dx, &it.Qdx, &it.Adx, set.reduced_eps_dual_inf) {
            SolverStatus::DualInfeasibleInaccurate
        } else {
            status
        }
    }

    fn compute_objectives(&mut self) {
        let (data, it) = (&self.data, &self.iterates);
        let c = data.equilibration.c;

        self.info.objective = data.objective(&it.x, &it.Qx) / c;

        // -½x'Qx - u'y₊ - l'y₋, over finite bounds only
        let half: T = (0.5).as_T();
        let mut dual = -half * it.x.dot(&it.Qx);
        for i in 0..data.m {
            let y = it.yh[i];
            if y > T::zero() && data.upper_finite[i] {
                dual -= data.bmax[i] * y;
            } else if y < T::zero() && data.lower_finite[i] {
                dual -= data.bmin[i] * y;
            }
        }
        self.info.dual_objective = dual / c;
    }
}

fn print_io(result: std::io::Result<()>) {
    if let Err(e) = result {
        log::warn!("failed to write solver output: {}", e);
    }
}
