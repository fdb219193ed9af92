use super::status::SolverStatus;
use crate::algebra::*;
use crate::timers::Timers;

/// Solve statistics reported with [`QPALMResults`](super::QPALMResults)

#[derive(Debug, Clone, PartialEq)]
pub struct QPALMInfo<T> {
    /// Newton iterations, over all subproblems
    pub iter: u32,
    /// outer (multiplier update) iterations
    pub iter_out: u32,
    /// subproblems that hit `inner_max_iter`
    pub inner_nonconvergence: u32,
    pub status: SolverStatus,
    /// unscaled ‖Ax - z‖∞
    pub pri_res_norm: T,
    /// unscaled ‖Qx + q + A'y‖∞
    pub dua_res_norm: T,
    pub objective: T,
    pub dual_objective: T,
    /// setup time in seconds
    pub setup_time: f64,
    /// solve time in seconds
    pub solve_time: f64,
    /// setup and solve time
    pub run_time: f64,
}

impl<T> QPALMInfo<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self {
            iter: 0,
            iter_out: 0,
            inner_nonconvergence: 0,
            status: SolverStatus::Unsolved,
            pri_res_norm: T::nan(),
            dua_res_norm: T::nan(),
            objective: T::nan(),
            dual_objective: T::nan(),
            setup_time: 0f64,
            solve_time: 0f64,
            run_time: 0f64,
        }
    }

    pub(crate) fn reset(&mut self, timers: &mut Timers) {
        let setup_time = self.setup_time;
        *self = Self::new();
        self.setup_time = setup_time;
        timers.reset_timer("solve");
    }

    pub(crate) fn finalize(&mut self, timers: &Timers) {
        self.solve_time = timers.seconds("solve");
        self.run_time = self.setup_time + self.solve_time;
        if !self.status.has_solution() {
            self.objective = T::nan();
            self.dual_objective = T::nan();
        }
    }
}

impl<T> Default for QPALMInfo<T>
where
    T: FloatT,
{
    fn default() -> Self {
        Self::new()
    }
}

#[test]
fn test_info_reset_keeps_setup_time() {
    let mut timers = Timers::default();
    let mut info = QPALMInfo::<f64>::new();
    info.setup_time = 1.5;
    info.iter = 10;
    info.status = SolverStatus::Solved;
    info.objective = 2.0;

    info.reset(&mut timers);
    assert_eq!(info.iter, 0);
    assert_eq!(info.status, SolverStatus::Unsolved);
    assert!(info.objective.is_nan());
    assert_eq!(info.setup_time, 1.5);

    info.status = SolverStatus::NonConvex;
    info.objective = 3.0;
    info.finalize(&timers);
    assert!(info.objective.is_nan());
    assert!(info.run_time >= info.setup_time);
}
