#![allow(non_snake_case)]

use qpalm::algebra::*;
use qpalm::solver::*;

// Solve a sequence of box constrained QPs whose linear cost
// drifts, starting each solve from the previous solution.

fn main() {
    let Q = CscMatrix::from(&[[4., 1.], [1., 2.]]);
    let A = CscMatrix::identity(2);
    let bmin = vec![-1.; 2];
    let bmax = vec![1.; 2];
    let mut q = vec![1., 1.];

    let problem = ProblemSetup::new().Q(&Q).q(&q).A(&A).bmin(&bmin).bmax(&bmax);
    let settings = QPALMSettingsBuilder::default()
        .verbose(false)
        .build()
        .unwrap();

    let mut solver = Workspace::setup(&problem, settings).unwrap();
    let mut results = QPALMResults::default();

    for k in 0..10 {
        solver.solve_into(&mut results).unwrap();
        println!(
            "step {:2}: status = {}, iter = {:3}, x = {:?}",
            k, results.info.status, results.info.iter, results.x
        );

        if results.info.status.is_solved() {
            solver
                .warm_start(Some(results.x.as_slice()), Some(results.y.as_slice()))
                .unwrap();
        }

        q.iter_mut().for_each(|qi| *qi -= 1.);
        solver.update_q(&q).unwrap();
    }
}
