#![allow(non_snake_case)]
use super::*;
use crate::ldl::LdlFactorisation;

// -------------------------------------
// Newton system solver on the augmented KKT matrix
// -------------------------------------

/// Solves the Newton system through the quasidefinite matrix
/// ```text
/// K = [Q + ρI    A_J'  ]
///     [A_J     -Σ_J⁻¹ ]
/// ```
/// assembled over every row of A.  Rows outside the active set
/// hold zeros in the A block and -1 on the diagonal.
pub struct KktSolver<T> {
    n: usize,
    m: usize,

    // upper triangle of K
    KKT: CscMatrix<T>,
    map: KktDataMap,
    ldl: LdlFactorisation<T>,

    // diagonal of Q, in the order of map.diagQ
    Qdiag: Vec<T>,

    // state of the current factorization
    active: Vec<bool>,
    sigma: Vec<T>,
    rho: T,
    factored: bool,

    // changed entries of K
    idx: Vec<usize>,
    vals: Vec<T>,

    work: Vec<T>,
}

// positions of problem data within KKT.nzval
struct KktDataMap {
    Q: Vec<usize>,
    A: Vec<usize>,
    diagQ: Vec<usize>,
    diagA: Vec<usize>,
    // start of each row of A within the A map, in A' order
    Arowptr: Vec<usize>,
    // index into A.nzval, in A' order
    Arowidx: Vec<usize>,
}

impl<T> KktSolver<T>
where
    T: FloatT,
{
    pub fn new(Q: &CscMatrix<T>, A: &CscMatrix<T>) -> Result<Self, FactorizationError> {
        let (m, n) = A.size();
        let (mut KKT, map) = assemble_kkt_matrix(Q, A);

        // factor a quasidefinite placeholder [I 0; 0 -I] to fix the
        // ordering and symbolic structure.  Real values arrive on
        // the first update.
        KKT.nzval.set(T::zero());
        map.diagQ.iter().for_each(|&p| KKT.nzval[p] = T::one());
        map.diagA.iter().for_each(|&p| KKT.nzval[p] = -T::one());
        let ldl = LdlFactorisation::new(&KKT, None)?;

        Ok(Self {
            n,
            m,
            KKT,
            map,
            ldl,
            Qdiag: vec![T::zero(); n],
            active: vec![false; m],
            sigma: vec![T::zero(); m],
            rho: T::zero(),
            factored: false,
            idx: Vec::new(),
            vals: Vec::new(),
            work: vec![T::zero(); n + m],
        })
    }

    // writes all values of K for the requested state
    fn assemble_values(&mut self, data: &ProblemData<T>, active: &[bool], sigma: &[T], rho: T) {
        let map = &self.map;
        let K = &mut self.KKT.nzval;

        // Q block, including structural zeros on the diagonal
        map.diagQ.iter().for_each(|&p| K[p] = T::zero());
        for (&p, &v) in std::iter::zip(&map.Q, &data.Q.nzval) {
            K[p] = v;
        }
        for (j, &p) in map.diagQ.iter().enumerate() {
            self.Qdiag[j] = K[p];
            K[p] += rho;
        }

        for r in 0..self.m {
            self.write_row(data, r, active[r], sigma[r]);
        }
    }

    fn write_row(&mut self, data: &ProblemData<T>, r: usize, active: bool, sigma: T) {
        let map = &self.map;
        let K = &mut self.KKT.nzval;
        for j in map.Arowptr[r]..map.Arowptr[r + 1] {
            let k = map.Arowidx[j];
            K[map.A[k]] = if active { data.A.nzval[k] } else { T::zero() };
        }
        K[map.diagA[r]] = if active { -T::recip(sigma) } else { -T::one() };
    }

    // records the positions touched by a row rewrite
    fn push_row_changes(&mut self, r: usize) {
        let map = &self.map;
        for j in map.Arowptr[r]..map.Arowptr[r + 1] {
            let p = map.A[map.Arowidx[j]];
            self.idx.push(p);
            self.vals.push(self.KKT.nzval[p]);
        }
        let p = map.diagA[r];
        self.idx.push(p);
        self.vals.push(self.KKT.nzval[p]);
    }
}

impl<T> LinearSystemSolver<T> for KktSolver<T>
where
    T: FloatT,
{
    fn update(
        &mut self,
        data: &ProblemData<T>,
        active: &[bool],
        sigma: &[T],
        rho: T,
        _settings: &QPALMSettings<T>,
    ) -> Result<(), FactorizationError> {
        self.idx.clear();
        self.vals.clear();

        if !self.factored {
            self.assemble_values(data, active, sigma, rho);
            self.idx.extend(0..self.KKT.nnz());
            self.vals.extend_from_slice(&self.KKT.nzval);
        } else {
            if rho != self.rho {
                for j in 0..self.n {
                    let p = self.map.diagQ[j];
                    self.KKT.nzval[p] = self.Qdiag[j] + rho;
                    self.idx.push(p);
                    self.vals.push(self.KKT.nzval[p]);
                }
            }
            for r in 0..self.m {
                let changed = active[r] != self.active[r]
                    || (active[r] && sigma[r] != self.sigma[r]);
                if changed {
                    self.write_row(data, r, active[r], sigma[r]);
                    self.push_row_changes(r);
                }
            }
            if self.idx.is_empty() {
                return Ok(());
            }
        }

        self.active.copy_from_slice(active);
        self.sigma.copy_from(sigma);
        self.rho = rho;

        self.ldl.update_values(&self.idx, &self.vals);
        let result = match self.ldl.refactor() {
            Ok(()) if self.ldl.positive_inertia() == self.n => Ok(()),
            Ok(()) => Err(FactorizationError::NotPositiveDefinite),
            Err(e) => Err(e.into()),
        };
        self.factored = result.is_ok();
        result
    }

    fn solve(&mut self, rhs: &[T], d: &mut [T]) {
        let (n, work) = (self.n, &mut self.work);
        work[..n].copy_from(rhs);
        work[n..].set(T::zero());
        self.ldl.solve(work);
        d.copy_from(&work[..n]);
    }

    fn invalidate(&mut self) {
        self.factored = false;
    }

    fn name(&self) -> &'static str {
        "kkt"
    }
}

// Upper triangle of [Q + I, A'; A, -I], with maps from the problem
// data into its values.  The diagonal is the last entry of each column.
fn assemble_kkt_matrix<T: FloatT>(Q: &CscMatrix<T>, A: &CscMatrix<T>) -> (CscMatrix<T>, KktDataMap) {
    let (m, n) = A.size();
    let (Arowptr, Arowidx) = row_index(A);

    let mut colptr = Vec::with_capacity(n + m + 1);
    let mut rowval = Vec::with_capacity(Q.nnz() + A.nnz() + n + m);
    let mut mapQ = vec![0; Q.nnz()];
    let mut mapA = vec![0; A.nnz()];
    let mut diagQ = Vec::with_capacity(n);
    let mut diagA = Vec::with_capacity(m);
    colptr.push(0);

    // Q block.  Q is triu, so a stored diagonal ends its column and
    // no earlier column can end on row `col`.
    for col in 0..n {
        for k in Q.colptr[col]..Q.colptr[col + 1] {
            mapQ[k] = rowval.len();
            rowval.push(Q.rowval[k]);
        }
        if rowval.last() != Some(&col) {
            rowval.push(col);
        }
        diagQ.push(rowval.len() - 1);
        colptr.push(rowval.len());
    }

    // column of each entry of A
    let mut Acol = vec![0; A.nnz()];
    for col in 0..A.ncols() {
        Acol[A.colptr[col]..A.colptr[col + 1]].fill(col);
    }

    // A' block followed by the constraint diagonal
    for r in 0..m {
        for &k in &Arowidx[Arowptr[r]..Arowptr[r + 1]] {
            mapA[k] = rowval.len();
            rowval.push(Acol[k]);
        }
        rowval.push(n + r);
        diagA.push(rowval.len() - 1);
        colptr.push(rowval.len());
    }

    let nzval = vec![T::zero(); rowval.len()];
    let K = CscMatrix::new(n + m, n + m, colptr, rowval, nzval);

    let map = KktDataMap {
        Q: mapQ,
        A: mapA,
        diagQ,
        diagA,
        Arowptr,
        Arowidx,
    };
    (K, map)
}

// CSR style index into A: entries of row r are
// A.nzval[Arowidx[j]] for j in Arowptr[r]..Arowptr[r+1]
pub(crate) fn row_index<T: FloatT>(A: &CscMatrix<T>) -> (Vec<usize>, Vec<usize>) {
    let m = A.nrows();
    let mut rowptr = vec![0; m + 1];
    for &r in A.rowval.iter() {
        rowptr[r + 1] += 1;
    }
    for r in 0..m {
        rowptr[r + 1] += rowptr[r];
    }

    let mut next = rowptr.clone();
    let mut rowidx = vec![0; A.nnz()];
    for (k, &r) in A.rowval.iter().enumerate() {
        rowidx[next[r]] = k;
        next[r] += 1;
    }
    (rowptr, rowidx)
}
