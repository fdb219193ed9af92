#![allow(non_snake_case)]
use qpalm::algebra::*;
use qpalm::solver::*;

fn main() {
    // QP Example

    // let Q = CscMatrix::identity(2);    // For Q = I
    // let Q = CscMatrix::spalloc((2, 2), 0); // For Q = 0

    let Q = CscMatrix::new(
        2,             // m
        2,             // n
        vec![0, 1, 2], // colptr
        vec![0, 1],    // rowval
        vec![6., 4.],  // nzval
    );

    let q = vec![-1., -4.];

    // x₁ - 2x₂ = 0, with a box on x
    let A = CscMatrix::new(
        3,                      // m
        2,                      // n
        vec![0, 2, 4],          // colptr
        vec![0, 1, 0, 2],       // rowval
        vec![1., 1., -2., 1.],  // nzval
    );

    let bmin = vec![0., -1., -1.];
    let bmax = vec![0., 1., 1.];

    let problem = ProblemSetup::new().Q(&Q).q(&q).A(&A).bmin(&bmin).bmax(&bmax);
    let settings = QPALMSettings::default();

    let mut solver = match Workspace::setup(&problem, settings) {
        Ok(solver) => solver,
        Err(e) => {
            eprintln!("setup failed: {}", e);
            return;
        }
    };

    let results = solver.solve().unwrap();

    println!("Solution = {:?}", results.x);
    println!("Multipliers = {:?}", results.y);
}
