#![allow(non_snake_case)]
use crate::algebra::*;
use derive_builder::Builder;
use std::iter::zip;
use thiserror::Error;

/// Failures of [`LdlFactorisation`] operations
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LdlError {
    #[error("matrix is not square")]
    IncompatibleDimension,
    #[error("matrix has a column without structural entries")]
    EmptyColumn,
    #[error("matrix is not upper triangular")]
    NotUpperTriangular,
    #[error("factorization produced a zero or non-finite pivot")]
    ZeroPivot,
    #[error("rank one modification produced a nonpositive pivot")]
    NotPositiveDefinite,
    #[error("invalid permutation vector")]
    InvalidPermutation,
    #[error("AMD ordering failed")]
    OrderingFailed,
}

/// Options for [`LdlFactorisation::new`]
#[derive(Builder, Debug, Clone)]
pub struct LdlSettings {
    /// multiplier on the AMD dense row threshold
    #[builder(default = "1.0")]
    amd_dense_scale: f64,
    /// fill reducing ordering.  AMD is used when absent.
    #[builder(default = "None", setter(strip_option))]
    perm: Option<Vec<usize>>,
}

impl Default for LdlSettings {
    fn default() -> Self {
        Self {
            amd_dense_scale: 1.0,
            perm: None,
        }
    }
}

const NONE: usize = usize::MAX;

/// $LDL^T$ factors of a symmetric quasidefinite matrix.
///
/// The matrix is given as its upper triangle, with at least one
/// structural entry per column, and is factored as $PAP^T = LDL^T$
/// for a fill reducing permutation $P$.  The sparsity pattern is
/// fixed at construction: values can be replaced and refactored, and
/// positive definite factors can be modified by rank one terms.
#[derive(Debug)]
pub struct LdlFactorisation<T = f64> {
    /// fill reducing permutation
    pub perm: Vec<usize>,
    iperm: Vec<usize>,
    /// strictly lower triangular factor, unit diagonal implied
    pub L: CscMatrix<T>,
    pub D: Vec<T>,
    pub Dinv: Vec<T>,

    // upper triangle of PAP' and the position in it of each input entry
    PAPt: CscMatrix<T>,
    map: Vec<usize>,

    sym: Symbolic,
    scratch: Scratch<T>,
    work: Vec<T>,
    positive: usize,
}

impl<T> LdlFactorisation<T>
where
    T: FloatT,
{
    pub fn new(A: &CscMatrix<T>, opts: Option<LdlSettings>) -> Result<Self, LdlError> {
        check_structure(A)?;
        let n = A.n;
        let opts = opts.unwrap_or_default();

        let perm = match opts.perm {
            Some(perm) if perm.len() == n => perm,
            Some(_) => return Err(LdlError::InvalidPermutation),
            None => amd_ordering(A, opts.amd_dense_scale)?,
        };
        let iperm = invert_permutation(&perm)?;

        let (PAPt, map) = permute_triu(A, &iperm);
        let sym = symbolic(&PAPt);
        let nnzL = sym.colcount.iter().sum();

        let mut factors = Self {
            perm,
            iperm,
            L: CscMatrix::spalloc((n, n), nnzL),
            D: vec![T::zero(); n],
            Dinv: vec![T::zero(); n],
            PAPt,
            map,
            sym,
            scratch: Scratch::new(n),
            work: vec![T::zero(); n],
            positive: 0,
        };
        factors.refactor()?;
        Ok(factors)
    }

    /// Number of positive entries of D
    pub fn positive_inertia(&self) -> usize {
        self.positive
    }

    pub fn dim(&self) -> usize {
        self.D.len()
    }

    /// Solve $Ax = b$, overwriting `b` with `x`
    pub fn solve(&mut self, b: &mut [T]) {
        assert_eq!(b.len(), self.dim());
        let x = &mut self.work;
        gather(x, b, &self.perm);
        ldl_solve(&self.L, &self.Dinv, x);
        scatter(b, x, &self.perm);
    }

    /// Replace stored matrix values.  `indices` are positions in
    /// `nzval` of the matrix given to [`new`](Self::new).  Takes
    /// effect at the next [`refactor`](Self::refactor).
    pub fn update_values(&mut self, indices: &[usize], values: &[T]) {
        assert_eq!(indices.len(), values.len());
        for (&k, &v) in zip(indices, values) {
            self.PAPt.nzval[self.map[k]] = v;
        }
    }

    /// Factor the stored values from scratch.  Any rank one
    /// modifications since the last factorization are lost.
    pub fn refactor(&mut self) -> Result<(), LdlError> {
        let result = numeric(
            &self.PAPt,
            &self.sym,
            &mut self.L,
            &mut self.D,
            &mut self.Dinv,
            &mut self.scratch,
        );
        self.positive = *result.as_ref().unwrap_or(&0);
        result.map(|_| ())
    }

    /// Modify the factors in place to factor $A + \sigma ww^T$.
    ///
    /// `w` is sparse with `values` at the (unpermuted) `indices`;
    /// repeated indices are summed.  The pattern of $ww^T$ must lie
    /// within the pattern of the factored matrix, and the matrix must
    /// be positive definite before and after.  After an error the
    /// factors are invalid until [`refactor`](Self::refactor).
    pub fn rank_one_update(&mut self, indices: &[usize], values: &[T], sigma: T) -> Result<(), LdlError> {
        assert_eq!(indices.len(), values.len());
        let w = &mut self.work;
        w.fill(T::zero());

        let mut start = NONE;
        for (&i, &v) in zip(indices, values) {
            let k = self.iperm[i];
            w[k] += v;
            start = start.min(k);
        }

        // the nonzeros of L⁻¹w lie on the tree path from `start`
        let L = &mut self.L;
        let mut alpha = sigma;
        let mut j = start;
        while j != NONE {
            let wj = w[j];
            w[j] = T::zero();

            let d = self.D[j] + alpha * wj * wj;
            if !(d > T::zero()) {
                return Err(LdlError::NotPositiveDefinite);
            }
            let beta = wj * alpha / d;
            alpha *= self.D[j] / d;
            self.D[j] = d;
            self.Dinv[j] = T::recip(d);

            for p in L.colptr[j]..L.colptr[j + 1] {
                let i = L.rowval[p];
                w[i] -= wj * L.nzval[p];
                L.nzval[p] += beta * w[i];
            }
            j = self.sym.etree[j];
        }

        self.positive = self.D.iter().filter(|&&d| d > T::zero()).count();
        Ok(())
    }
}

fn check_structure<T: FloatT>(A: &CscMatrix<T>) -> Result<(), LdlError> {
    if !A.is_square() {
        Err(LdlError::IncompatibleDimension)
    } else if !A.is_triu() {
        Err(LdlError::NotUpperTriangular)
    } else if A.colptr.windows(2).any(|w| w[0] == w[1]) {
        Err(LdlError::EmptyColumn)
    } else {
        Ok(())
    }
}

// elimination tree, and the number of entries below the
// diagonal in each column of L
#[derive(Debug)]
struct Symbolic {
    etree: Vec<usize>,
    colcount: Vec<usize>,
}

// Works on an upper triangular pattern with rows in any order
fn symbolic<T>(A: &CscMatrix<T>) -> Symbolic {
    let n = A.n;
    let mut etree = vec![NONE; n];
    let mut colcount = vec![0; n];
    let mut visited = vec![NONE; n];

    for k in 0..n {
        visited[k] = k;
        for &row in &A.rowval[A.colptr[k]..A.colptr[k + 1]] {
            // climb towards k until reaching a node seen for row k of L
            let mut i = row;
            while visited[i] != k {
                if etree[i] == NONE {
                    etree[i] = k;
                }
                colcount[i] += 1;
                visited[i] = k;
                i = etree[i];
            }
        }
    }
    Symbolic { etree, colcount }
}

#[derive(Debug)]
struct Scratch<T> {
    // row k of L being computed, densely, and its pattern marks
    y: Vec<T>,
    marked: Vec<bool>,
    // pattern of row k as a stack of tree paths, and the path
    // currently being climbed
    pattern: Vec<usize>,
    path: Vec<usize>,
    // next free slot in each column of L
    next: Vec<usize>,
}

impl<T: FloatT> Scratch<T> {
    fn new(n: usize) -> Self {
        Self {
            y: vec![T::zero(); n],
            marked: vec![false; n],
            pattern: Vec::with_capacity(n),
            path: Vec::with_capacity(n),
            next: vec![0; n],
        }
    }
}

// Up-looking factorization: row k of L solves a sparse triangular
// system against column k of A, on the pattern reachable from it
// in the elimination tree.  Returns the number of positive pivots.
fn numeric<T: FloatT>(
    A: &CscMatrix<T>,
    sym: &Symbolic,
    L: &mut CscMatrix<T>,
    D: &mut [T],
    Dinv: &mut [T],
    s: &mut Scratch<T>,
) -> Result<usize, LdlError> {
    let n = A.n;
    L.colptr[0] = 0;
    for j in 0..n {
        L.colptr[j + 1] = L.colptr[j] + sym.colcount[j];
    }
    s.next.copy_from_slice(&L.colptr[..n]);
    s.marked.fill(false);
    s.y.fill(T::zero());

    let mut positive = 0;
    for k in 0..n {
        D[k] = T::zero();
        s.pattern.clear();

        for p in A.colptr[k]..A.colptr[k + 1] {
            let i = A.rowval[p];
            if i == k {
                D[k] = A.nzval[p];
                continue;
            }
            s.y[i] = A.nzval[p];

            s.path.clear();
            let mut j = i;
            while j != NONE && j < k && !s.marked[j] {
                s.marked[j] = true;
                s.path.push(j);
                j = sym.etree[j];
            }
            s.pattern.extend(s.path.iter().rev());
        }

        // descendants come off the stack before their ancestors
        for &c in s.pattern.iter().rev() {
            let yc = s.y[c];
            let slot = s.next[c];
            for p in L.colptr[c]..slot {
                s.y[L.rowval[p]] -= L.nzval[p] * yc;
            }
            let lkc = yc * Dinv[c];
            L.rowval[slot] = k;
            L.nzval[slot] = lkc;
            D[k] -= yc * lkc;

            s.next[c] += 1;
            s.y[c] = T::zero();
            s.marked[c] = false;
        }

        if D[k] == T::zero() || !D[k].is_finite() {
            return Err(LdlError::ZeroPivot);
        }
        if D[k] > T::zero() {
            positive += 1;
        }
        Dinv[k] = T::recip(D[k]);
    }
    Ok(positive)
}

// (L+I)x = b, in place
fn lsolve<T: FloatT>(L: &CscMatrix<T>, x: &mut [T]) {
    for j in 0..x.len() {
        let xj = x[j];
        for (&i, &v) in L.column(j) {
            x[i] -= v * xj;
        }
    }
}

// (L+I)'x = b, in place
fn ltsolve<T: FloatT>(L: &CscMatrix<T>, x: &mut [T]) {
    for j in (0..x.len()).rev() {
        let s = L.column(j).fold(T::zero(), |s, (&i, &v)| s + v * x[i]);
        x[j] -= s;
    }
}

// LDL'x = b, in place
fn ldl_solve<T: FloatT>(L: &CscMatrix<T>, Dinv: &[T], x: &mut [T]) {
    lsolve(L, x);
    x.hadamard(Dinv);
    ltsolve(L, x);
}

fn invert_permutation(p: &[usize]) -> Result<Vec<usize>, LdlError> {
    let mut inv = vec![NONE; p.len()];
    for (i, &j) in p.iter().enumerate() {
        match inv.get_mut(j) {
            Some(slot) if *slot == NONE => *slot = i,
            _ => return Err(LdlError::InvalidPermutation),
        }
    }
    Ok(inv)
}

// x = b[p]
fn gather<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(x, p).for_each(|(x, &i)| *x = b[i]);
}

// x[p] = b
fn scatter<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(b, p).for_each(|(&b, &i)| x[i] = b);
}

// Upper triangle of PAP' from the upper triangle of A, with the
// position in it of every entry of A.  Rows within a column of the
// result are left unsorted.
fn permute_triu<T: FloatT>(A: &CscMatrix<T>, iperm: &[usize]) -> (CscMatrix<T>, Vec<usize>) {
    let n = A.n;
    let target = |row: usize, col: usize| {
        let (r, c) = (iperm[row], iperm[col]);
        (r.min(c), r.max(c))
    };

    let mut colptr = vec![0; n + 1];
    for col in 0..n {
        for &row in &A.rowval[A.colptr[col]..A.colptr[col + 1]] {
            colptr[target(row, col).1 + 1] += 1;
        }
    }
    for j in 0..n {
        colptr[j + 1] += colptr[j];
    }

    let mut next = colptr.clone();
    let mut rowval = vec![0; A.nnz()];
    let mut nzval = vec![T::zero(); A.nnz()];
    let mut map = vec![0; A.nnz()];
    for col in 0..n {
        for k in A.colptr[col]..A.colptr[col + 1] {
            let (r, c) = target(A.rowval[k], col);
            let p = next[c];
            rowval[p] = r;
            nzval[p] = A.nzval[k];
            map[k] = p;
            next[c] += 1;
        }
    }
    (CscMatrix::new(n, n, colptr, rowval, nzval), map)
}

fn amd_ordering<T: FloatT>(A: &CscMatrix<T>, dense_scale: f64) -> Result<Vec<usize>, LdlError> {
    let mut control = amd::Control::default();
    control.dense *= dense_scale;
    let (perm, _iperm, _info) =
        amd::order(A.n, &A.colptr, &A.rowval, &control).map_err(|_| LdlError::OrderingFailed)?;
    Ok(perm)
}

#[path = "test.rs"]
#[cfg(test)]
mod test;
