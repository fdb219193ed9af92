#![allow(non_snake_case)]

use qpalm::{algebra::*, solver::*};

fn settings() -> QPALMSettings<f64> {
    QPALMSettingsBuilder::default().verbose(false).build().unwrap()
}

#[allow(clippy::type_complexity)]
fn basic_lp_data() -> (Vec<f64>, CscMatrix<f64>, Vec<f64>, Vec<f64>) {
    let mut A = CscMatrix::<f64>::identity(3);
    A.scale(2.);

    let q = vec![3., -2., 1.];
    let bmin = vec![-1.; 3];
    let bmax = vec![1.; 3];

    (q, A, bmin, bmax)
}

#[test]
fn test_lp_feasible() {
    let (q, A, bmin, bmax) = basic_lp_data();

    // no Q: a linear program
    let problem = ProblemSetup::new().q(&q).A(&A).bmin(&bmin).bmax(&bmax);
    let mut solver = Workspace::setup(&problem, settings()).unwrap();
    let results = solver.solve().unwrap();

    assert_eq!(results.info.status, SolverStatus::Solved);

    let refsol = vec![-0.5, 0.5, -0.5];
    assert!(results.x.dist(&refsol) <= 1e-3);

    let refobj = -3.;
    assert!(f64::abs(results.info.objective - refobj) <= 1e-3);
    assert!(f64::abs(results.info.dual_objective - refobj) <= 1e-2);
}

#[test]
fn test_lp_primal_infeasible() {
    // x₁ ≤ -1 and x₁ ≥ 1, plus a box
    let A = CscMatrix::from(&[
        [1., 0., 0.],
        [1., 0., 0.],
        [1., 0., 0.],
        [0., 1., 0.],
        [0., 0., 1.],
    ]);
    let q = [3., -2., 1.];
    let bmin = [-f64::INFINITY, 1., -1., -1., -1.];
    let bmax = [-1., f64::INFINITY, 1., 1., 1.];

    let problem = ProblemSetup::new().q(&q).A(&A).bmin(&bmin).bmax(&bmax);
    let mut solver = Workspace::setup(&problem, settings()).unwrap();
    let results = solver.solve().unwrap();

    assert_eq!(results.info.status, SolverStatus::PrimalInfeasible);

    // the certificate only weights the two conflicting rows
    let cert = &results.prim_inf_cert;
    assert!(cert[0] > 0.);
    assert!(cert[1] < 0.);
    assert!((cert[0] + cert[1]).abs() <= 1e-6);
    assert!(results.x.iter().all(|v| v.is_nan()));
}

#[test]
fn test_lp_dual_infeasible() {
    // minimize -x subject to x ≥ 0
    let q = [-1.];
    let A = CscMatrix::from(&[[1.]]);
    let bmin = [0.];
    let bmax = [f64::INFINITY];

    for method in ["kkt", "schur"] {
        let settings = QPALMSettings {
            factorization_method: method.to_string(),
            ..settings()
        };
        let problem = ProblemSetup::new().q(&q).A(&A).bmin(&bmin).bmax(&bmax);
        let mut solver = Workspace::setup(&problem, settings).unwrap();
        let results = solver.solve().unwrap();

        assert_eq!(results.info.status, SolverStatus::DualInfeasible);
        assert_eq!(results.dual_inf_cert, vec![1.]);
        assert!(results.prim_inf_cert[0].is_nan());
        assert!(results.y[0].is_nan());
    }
}
