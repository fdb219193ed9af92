#![allow(non_snake_case)]

use qpalm::{algebra::*, solver::*};

const METHODS: [&str; 3] = ["kkt", "schur", "auto"];

fn settings(method: &str) -> QPALMSettings<f64> {
    QPALMSettingsBuilder::default()
        .verbose(false)
        .factorization_method(method.to_string())
        .build()
        .unwrap()
}

#[allow(clippy::type_complexity)]
fn basic_qp_data() -> (CscMatrix<f64>, Vec<f64>, CscMatrix<f64>, Vec<f64>, Vec<f64>) {
    // Q = [4. 1;1 2], upper triangle only
    let Q = CscMatrix::new(
        2,                // m
        2,                // n
        vec![0, 1, 3],    // colptr
        vec![0, 0, 1],    // rowval
        vec![4., 1., 2.], // nzval
    );

    // A = [1. 1;1 0; 0 1]
    let A = CscMatrix::new(
        3,                    // m
        2,                    // n
        vec![0, 2, 4],        //colptr
        vec![0, 1, 0, 2],     //rowval
        vec![1., 1., 1., 1.], //nzval
    );

    let q = vec![1., 1.];
    let bmin = vec![1., 0., 0.];
    let bmax = vec![1., 0.7, 0.7];

    (Q, q, A, bmin, bmax)
}

#[allow(clippy::type_complexity)]
fn basic_qp_data_dual_inf() -> (CscMatrix<f64>, Vec<f64>, CscMatrix<f64>, Vec<f64>, Vec<f64>) {
    // Q = [1. 1;1 1]
    let Q = CscMatrix::from(&[[1., 1.], [1., 1.]]);

    // A = [1. 1;1 0]
    let A = CscMatrix::from(&[[1., 1.], [1., 0.]]);

    let q = vec![1., -1.];
    let bmin = vec![-f64::INFINITY; 2];
    let bmax = vec![1., 1.];

    (Q, q, A, bmin, bmax)
}

#[test]
fn test_qp_univariate() {
    let Q = CscMatrix::from(&[[4.]]);
    let q = [1.];
    let A = CscMatrix::from(&[[1.]]);
    let bmin = [-1.];
    let bmax = [1.];

    for method in METHODS {
        let problem = ProblemSetup::new().Q(&Q).q(&q).A(&A).bmin(&bmin).bmax(&bmax);
        let mut solver = Workspace::setup(&problem, settings(method)).unwrap();
        let results = solver.solve().unwrap();

        assert_eq!(results.info.status, SolverStatus::Solved);
        assert!((results.x[0] + 0.25).abs() <= 1e-4);
        assert!(results.y[0].abs() <= 1e-4);
        assert!((results.info.objective + 0.125).abs() <= 1e-4);
    }
}

#[test]
fn test_qp_feasible() {
    let (Q, q, A, bmin, bmax) = basic_qp_data();

    for method in METHODS {
        let problem = ProblemSetup::new().Q(&Q).q(&q).A(&A).bmin(&bmin).bmax(&bmax);
        let mut solver = Workspace::setup(&problem, settings(method)).unwrap();
        let results = solver.solve().unwrap();

        assert_eq!(results.info.status, SolverStatus::Solved);

        let refsol = [0.3, 0.7];
        assert!(results.x.dist(&refsol) <= 1e-3);

        let refobj = 1.88;
        assert!(f64::abs(results.info.objective - refobj) <= 1e-3);
        assert!(f64::abs(results.info.dual_objective - refobj) <= 1e-2);

        // only the equality and the upper bound on x₂ are active
        assert!(results.y[0] < 0.);
        assert!(results.y[1].abs() <= 1e-3);
        assert!(results.y[2] > 0.);

        assert!(results.prim_inf_cert.iter().all(|v| v.is_nan()));
        assert!(results.dual_inf_cert.iter().all(|v| v.is_nan()));
        assert!(results.info.pri_res_norm <= 1e-3);
        assert!(results.info.dua_res_norm <= 1e-3);
    }
}

#[test]
fn test_qp_stationarity() {
    let (Q, q, A, bmin, bmax) = basic_qp_data();
    let problem = ProblemSetup::new().Q(&Q).q(&q).A(&A).bmin(&bmin).bmax(&bmax);
    let mut solver = Workspace::setup(&problem, settings("auto")).unwrap();
    let results = solver.solve().unwrap();

    // Qx + q + A'y ≈ 0
    let mut r = q.clone();
    Q.sym().symv(&mut r, &results.x, 1.0, 1.0);
    A.t().gemv(&mut r, &results.y, 1.0, 1.0);
    assert!(r.norm_inf() <= 1e-3);

    // bmin ≤ Ax ≤ bmax
    let mut Ax = vec![0.; 3];
    A.gemv(&mut Ax, &results.x, 1.0, 0.0);
    for i in 0..3 {
        assert!(Ax[i] >= bmin[i] - 1e-3 && Ax[i] <= bmax[i] + 1e-3);
    }
}

#[test]
fn test_qp_primal_infeasible() {
    // x ≥ 1 and x ≤ -1
    let Q = CscMatrix::<f64>::zeros((1, 1));
    let A = CscMatrix::from(&[[1.], [-1.]]);
    let bmin = [1., 1.];
    let bmax = [1., 1.];

    for method in METHODS {
        let problem = ProblemSetup::new().Q(&Q).A(&A).bmin(&bmin).bmax(&bmax);
        let mut solver = Workspace::setup(&problem, settings(method)).unwrap();
        let results = solver.solve().unwrap();

        assert_eq!(results.info.status, SolverStatus::PrimalInfeasible);
        assert_eq!(results.prim_inf_cert.len(), 2);
        assert!(results.prim_inf_cert.iter().all(|v| v.is_finite()));
        assert!((results.prim_inf_cert.norm_inf() - 1.).abs() <= 1e-12);
        assert!(results.x.iter().chain(results.y.iter()).all(|v| v.is_nan()));
        assert!(results.dual_inf_cert.iter().all(|v| v.is_nan()));
        assert!(results.info.objective.is_nan());
    }
}

#[test]
fn test_qp_dual_infeasible() {
    let (Q, q, A, bmin, bmax) = basic_qp_data_dual_inf();

    for method in METHODS {
        let problem = ProblemSetup::new().Q(&Q).q(&q).A(&A).bmin(&bmin).bmax(&bmax);
        let mut solver = Workspace::setup(&problem, settings(method)).unwrap();
        let results = solver.solve().unwrap();

        assert_eq!(results.info.status, SolverStatus::DualInfeasible);

        // direction of unboundedness is (-1, 1)
        let cert = &results.dual_inf_cert;
        assert!((cert[0] + 1.).abs() <= 1e-6);
        assert!((cert[1] - 1.).abs() <= 1e-6);
        assert!(results.prim_inf_cert.iter().all(|v| v.is_nan()));
        assert!(results.x.iter().all(|v| v.is_nan()));
        assert!(results.info.objective.is_nan());
    }
}

#[test]
fn test_qp_max_iter() {
    let (Q, q, A, bmin, bmax) = basic_qp_data();
    let problem = ProblemSetup::new().Q(&Q).q(&q).A(&A).bmin(&bmin).bmax(&bmax);
    let settings = QPALMSettingsBuilder::default()
        .verbose(false)
        .max_iter(1)
        .build()
        .unwrap();

    let mut solver = Workspace::setup(&problem, settings).unwrap();
    let results = solver.solve().unwrap();

    assert!(results.info.iter <= 1);
    assert!(matches!(
        results.info.status,
        SolverStatus::MaxIterReached | SolverStatus::SolvedInaccurate
    ));
    // the last iterate is reported
    assert!(results.x.iter().all(|v| v.is_finite()));
}

#[test]
fn test_qp_f32() {
    let Q = CscMatrix::<f32>::from(&[[4., 1.], [0., 2.]]);
    let A = CscMatrix::<f32>::from(&[[1., 1.], [1., 0.], [0., 1.]]);
    let q = [1f32, 1.];
    let bmin = [1f32, 0., 0.];
    let bmax = [1f32, 0.7, 0.7];

    let problem = ProblemSetup::new().Q(&Q).q(&q).A(&A).bmin(&bmin).bmax(&bmax);
    let settings = QPALMSettingsBuilder::<f32>::default()
        .verbose(false)
        .eps_abs(1e-3)
        .eps_rel(1e-3)
        .build()
        .unwrap();
    let mut solver = Workspace::setup(&problem, settings).unwrap();
    let results = solver.solve().unwrap();
    assert!(results.info.status.is_solved());
    assert!((results.x[0] - 0.3).abs() <= 1e-2);
}
