//! __QPALM.rs__ is a Rust implementation of QPALM, a proximal augmented Lagrangian
//! method for convex and nonconvex quadratic programs.  QPALM solves the following problem:
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize} & \frac{1}{2}x^T Q x + q^T x\\\\\[2ex\]
//!  \text{subject to} & b_{\min} \le Ax \le b_{\max}
//!  \end{array}
//! $$
//!
//! with decision variables
//! $x \in \mathbb{R}^n$
//! and data matrices
//! $Q=Q^\top$,
//! $q \in \mathbb{R}^n$,
//! $A \in \mathbb{R}^{m \times n}$, and
//! $b_{\min}, b_{\max} \in \mathbb{R}^m$.  Bounds may be infinite.
//!
//! ## Features
//!
//! * __Semismooth Newton inner solver__: each augmented Lagrangian subproblem is
//!   solved by a Newton method with an exact line search.   Changes of the
//!   active set are followed with low rank updates of a sparse $LDL^T$ factorization.
//!
//! * __Infeasibility detection__: primal and dual infeasible problems terminate
//!   with a certificate of infeasibility.
//!
//! * __Nonconvex problems__: with the `nonconvex` setting, the proximal weight is
//!   kept above the most negative eigenvalue of $Q$, and the method converges
//!   to a stationary point.
//!
//! * __Warm starting and data updates__: a [`Workspace`](crate::solver::Workspace)
//!   can be solved repeatedly with new linear costs, bounds or settings.
//!
//! ## Example
//!
//! ```
//! use qpalm::algebra::*;
//! use qpalm::solver::*;
//!
//! let Q = CscMatrix::from(&[[6., 0.], [0., 4.]]);
//! let q = [-1., -4.];
//! let A = CscMatrix::from(&[[1., -2.], [1., 0.], [0., 1.]]);
//! let bmin = [-f64::INFINITY, -1., -1.];
//! let bmax = [0., 1., 1.];
//!
//! let problem = ProblemSetup::new().Q(&Q).q(&q).A(&A).bmin(&bmin).bmax(&bmax);
//! let settings = QPALMSettings { verbose: false, ..QPALMSettings::default() };
//!
//! let mut solver = Workspace::setup(&problem, settings).unwrap();
//! let results = solver.solve().unwrap();
//! println!("status = {}, x = {:?}", results.info.status, results.x);
//! ```
//!
//! # License
//!
//! Licensed under Apache License, Version 2.0.

//Rust hates greek characters
#![allow(confusable_idents)]

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub mod io;
pub mod ldl;
pub mod solver;
pub mod timers;
