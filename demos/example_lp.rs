#![allow(non_snake_case)]

use qpalm::algebra::*;
use qpalm::solver::*;

fn problem_data() -> (Vec<f64>, CscMatrix<f64>, Vec<f64>, Vec<f64>) {
    let q = vec![1., -1.];

    //a 2-d box constraint
    //A = I
    let A = CscMatrix::identity(2);

    let bmin = vec![-1.; 2];
    let bmax = vec![1.; 2];

    (q, A, bmin, bmax)
}

fn main() {
    let (q, A, bmin, bmax) = problem_data();

    // no Q matrix / Q = 0
    let problem = ProblemSetup::new().q(&q).A(&A).bmin(&bmin).bmax(&bmax);

    let settings = QPALMSettingsBuilder::default()
        .scaling_enable(true)
        .max_iter(500)
        .build()
        .unwrap();

    let mut solver = Workspace::setup(&problem, settings).unwrap();

    let results = solver.solve().unwrap();
    println!("Solution = {:?}", results.x);
}
