//! Factorization of the semismooth Newton system
//!
//! Each Newton step solves
//! ```text
//! (Q + ρI + A_J' Σ_J A_J) d = rhs
//! ```
//! for the active constraint set J.  Two backends are provided: an
//! augmented KKT system that is refactored numerically on every
//! change, and the reduced (Schur complement) matrix, which follows
//! small active set changes with rank one updates of its factors.

#![allow(non_snake_case)]

use super::problemdata::ProblemData;
use super::settings::QPALMSettings;
use crate::algebra::*;
use crate::ldl::LdlError;
use enum_dispatch::*;
use thiserror::Error;

mod kkt;
mod schur;
pub use kkt::*;
pub use schur::*;

/// Error type returned by Newton system factorization.  The caller
/// can recover by increasing the proximal weight and retrying.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorizationError {
    #[error("LDL factorization failed: {0}")]
    Ldl(#[from] LdlError),
    #[error("Newton system matrix is not positive definite")]
    NotPositiveDefinite,
}

#[enum_dispatch]
pub trait LinearSystemSolver<T>
where
    T: FloatT,
{
    /// Bring the factorization in line with the active set, the
    /// penalties and the proximal weight.
    fn update(
        &mut self,
        data: &ProblemData<T>,
        active: &[bool],
        sigma: &[T],
        rho: T,
        settings: &QPALMSettings<T>,
    ) -> Result<(), FactorizationError>;

    /// Newton direction `d` for the right hand side `rhs`
    fn solve(&mut self, rhs: &[T], d: &mut [T]);

    /// Force a full factorization on the next update
    fn invalidate(&mut self);

    fn name(&self) -> &'static str;
}

#[enum_dispatch(LinearSystemSolver<T>)]
pub enum LinearSolverEngine<T>
where
    T: FloatT,
{
    KktSolver(KktSolver<T>),
    SchurSolver(SchurSolver<T>),
}

impl<T> LinearSolverEngine<T>
where
    T: FloatT,
{
    /// Symbolic setup of the backend named by
    /// `settings.factorization_method`.
    pub fn new(data: &ProblemData<T>, settings: &QPALMSettings<T>) -> Result<Self, FactorizationError> {
        let use_schur = match settings.factorization_method.as_str() {
            "kkt" => false,
            "schur" => true,
            _ => prefer_schur(&data.Q, &data.A),
        };

        let engine = if use_schur {
            SchurSolver::new(&data.Q, &data.A)?.into()
        } else {
            KktSolver::new(&data.Q, &data.A)?.into()
        };
        Ok(engine)
    }
}

// The reduced matrix fills in a dense block for every row of A.
// Use it unless that fill dominates the size of the KKT system.
fn prefer_schur<T: FloatT>(Q: &CscMatrix<T>, A: &CscMatrix<T>) -> bool {
    let (m, n) = A.size();
    let kkt_nnz = Q.nnz() + A.nnz() + n + m;
    schur_fill_estimate(A) <= 2 * kkt_nnz
}

// upper triangular entries contributed by the rows of A to A'A
pub(crate) fn schur_fill_estimate<T: FloatT>(A: &CscMatrix<T>) -> usize {
    let mut rowcounts = vec![0usize; A.nrows()];
    for &r in A.rowval.iter() {
        rowcounts[r] += 1;
    }
    rowcounts.into_iter().map(triangular_number).sum()
}

// Changes to an active set or penalties between two factorizations,
// as (row, weight) pairs for rank one updates of the reduced matrix.
pub(crate) fn rank_one_changes<T: FloatT>(
    active_old: &[bool],
    sigma_old: &[T],
    active: &[bool],
    sigma: &[T],
    out: &mut Vec<(usize, T)>,
) {
    out.clear();
    for i in 0..active.len() {
        match (active_old[i], active[i]) {
            (false, true) => out.push((i, sigma[i])),
            (true, false) => out.push((i, -sigma_old[i])),
            (true, true) if sigma[i] != sigma_old[i] => out.push((i, sigma[i] - sigma_old[i])),
            _ => {}
        }
    }
    // updates before downdates
    out.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
}
