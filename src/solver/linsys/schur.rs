#![allow(non_snake_case)]
use super::kkt::row_index;
use super::*;
use crate::ldl::LdlFactorisation;

// -------------------------------------
// Newton system solver on the reduced matrix
// -------------------------------------

/// Solves the Newton system through the positive definite matrix
/// ```text
/// H = Q + ρI + A_J' Σ_J A_J
/// ```
/// The symbolic factorization covers the pattern of Q + I + A'A, so
/// that rows can enter or leave the active set through rank one
/// updates of the existing factors.
pub struct SchurSolver<T> {
    n: usize,
    m: usize,

    // upper triangle of H
    H: CscMatrix<T>,
    map: SchurDataMap,
    ldl: LdlFactorisation<T>,

    // rows of A, as indices into A.nzval, and the
    // column of every entry of A
    Arowptr: Vec<usize>,
    Arowidx: Vec<usize>,
    Acolidx: Vec<usize>,

    // state of the current factorization
    active: Vec<bool>,
    sigma: Vec<T>,
    rho: T,
    factored: bool,
    // rank one modifications since the last full factorization
    nupdates: usize,

    changes: Vec<(usize, T)>,
    idx: Vec<usize>,
    vals: Vec<T>,
    work: Vec<T>,
    // one row of A in H's columns, sized for the longest row
    row_idx: Vec<usize>,
    row_vals: Vec<T>,
}

// positions of problem data within H.nzval
struct SchurDataMap {
    Q: Vec<usize>,
    diag: Vec<usize>,
    // positions of the products a_ri*a_rj, i<=j, for each row r
    rowpair_ptr: Vec<usize>,
    rowpair_idx: Vec<usize>,
}

impl<T> SchurSolver<T>
where
    T: FloatT,
{
    pub fn new(Q: &CscMatrix<T>, A: &CscMatrix<T>) -> Result<Self, FactorizationError> {
        let (m, n) = A.size();
        let (Arowptr, Arowidx) = row_index(A);
        let Acolidx = column_index(A);
        let (mut H, map) = assemble_schur_pattern(Q, A, &Arowptr, &Arowidx, &Acolidx);

        // identity placeholder to fix the ordering and symbolic
        // structure.  Real values arrive on the first update.
        H.nzval.set(T::zero());
        map.diag.iter().for_each(|&p| H.nzval[p] = T::one());
        let ldl = LdlFactorisation::new(&H, None)?;
        let nnzH = H.nnz();
        let maxrow = Arowptr.windows(2).map(|w| w[1] - w[0]).max().unwrap_or(0);

        Ok(Self {
            n,
            m,
            H,
            map,
            ldl,
            Arowptr,
            Arowidx,
            Acolidx,
            active: vec![false; m],
            sigma: vec![T::zero(); m],
            rho: T::zero(),
            factored: false,
            nupdates: 0,
            changes: Vec::with_capacity(m),
            idx: (0..nnzH).collect(),
            vals: Vec::new(),
            work: vec![T::zero(); n],
            row_idx: Vec::with_capacity(maxrow),
            row_vals: Vec::with_capacity(maxrow),
        })
    }

    fn refactor(
        &mut self,
        data: &ProblemData<T>,
        active: &[bool],
        sigma: &[T],
        rho: T,
    ) -> Result<(), FactorizationError> {
        let map = &self.map;
        let H = &mut self.H.nzval;
        let Ax = &data.A.nzval;

        H.set(T::zero());
        for (&p, &v) in std::iter::zip(&map.Q, &data.Q.nzval) {
            H[p] += v;
        }
        map.diag.iter().for_each(|&p| H[p] += rho);

        for r in (0..self.m).filter(|&r| active[r]) {
            let row = &self.Arowidx[self.Arowptr[r]..self.Arowptr[r + 1]];
            let mut pairs = map.rowpair_idx[map.rowpair_ptr[r]..map.rowpair_ptr[r + 1]].iter();
            for (a, &ka) in row.iter().enumerate() {
                for &kb in &row[a..] {
                    if let Some(&p) = pairs.next() {
                        H[p] += sigma[r] * Ax[ka] * Ax[kb];
                    }
                }
            }
        }

        self.active.copy_from_slice(active);
        self.sigma.copy_from(sigma);
        self.rho = rho;
        self.nupdates = 0;

        self.vals.clear();
        self.vals.extend_from_slice(&self.H.nzval);
        self.ldl.update_values(&self.idx, &self.vals);
        self.factored = false;
        self.ldl.refactor()?;
        self.check_inertia()?;
        self.factored = true;
        Ok(())
    }

    fn check_inertia(&self) -> Result<(), FactorizationError> {
        if self.ldl.positive_inertia() == self.n {
            Ok(())
        } else {
            Err(FactorizationError::NotPositiveDefinite)
        }
    }

    // applies self.changes as rank one modifications
    fn update_low_rank(&mut self, data: &ProblemData<T>) -> Result<(), FactorizationError> {
        let Ax = &data.A.nzval;
        let (idx, vals) = (&mut self.row_idx, &mut self.row_vals);

        for &(r, weight) in self.changes.iter() {
            let row = &self.Arowidx[self.Arowptr[r]..self.Arowptr[r + 1]];
            idx.clear();
            vals.clear();
            for &k in row {
                idx.push(self.Acolidx[k]);
                vals.push(Ax[k]);
            }
            self.ldl.rank_one_update(idx.as_slice(), vals.as_slice(), weight)?;
        }
        self.check_inertia()
    }
}

impl<T> LinearSystemSolver<T> for SchurSolver<T>
where
    T: FloatT,
{
    fn update(
        &mut self,
        data: &ProblemData<T>,
        active: &[bool],
        sigma: &[T],
        rho: T,
        settings: &QPALMSettings<T>,
    ) -> Result<(), FactorizationError> {
        if !self.factored || rho != self.rho {
            return self.refactor(data, active, sigma, rho);
        }

        rank_one_changes(&self.active, &self.sigma, active, sigma, &mut self.changes);
        if self.changes.is_empty() {
            return Ok(());
        }

        let nchanges = self.changes.len();
        let dim: T = (self.n + self.m).as_T();
        let nchanges_T: T = nchanges.as_T();
        let too_many = nchanges > settings.max_rank_update as usize
            || nchanges_T > settings.max_rank_update_fraction * dim
            || self.nupdates + nchanges >= settings.reset_newton_iter as usize;
        if too_many {
            return self.refactor(data, active, sigma, rho);
        }

        match self.update_low_rank(data) {
            Ok(()) => {
                self.active.copy_from_slice(active);
                self.sigma.copy_from(sigma);
                self.nupdates += nchanges;
                Ok(())
            }
            Err(e) => {
                log::debug!("low rank update failed ({}), refactoring", e);
                self.refactor(data, active, sigma, rho)
            }
        }
    }

    fn solve(&mut self, rhs: &[T], d: &mut [T]) {
        self.work.copy_from(rhs);
        self.ldl.solve(&mut self.work);
        d.copy_from(&self.work);
    }

    fn invalidate(&mut self) {
        self.factored = false;
    }

    fn name(&self) -> &'static str {
        "schur"
    }
}

// Upper triangular pattern of Q + I + A'A, with maps from the
// problem data into its values.
fn assemble_schur_pattern<T: FloatT>(
    Q: &CscMatrix<T>,
    A: &CscMatrix<T>,
    Arowptr: &[usize],
    Arowidx: &[usize],
    colidx: &[usize],
) -> (CscMatrix<T>, SchurDataMap) {
    let (m, n) = A.size();

    let ntriplets = Q.nnz() + n + schur_fill_estimate(A);
    let mut rows = Vec::with_capacity(ntriplets);
    let mut cols = Vec::with_capacity(ntriplets);

    for j in 0..n {
        for k in Q.colptr[j]..Q.colptr[j + 1] {
            rows.push(Q.rowval[k]);
            cols.push(j);
        }
        rows.push(j);
        cols.push(j);
    }
    for r in 0..m {
        let row = &Arowidx[Arowptr[r]..Arowptr[r + 1]];
        for (a, &ka) in row.iter().enumerate() {
            for &kb in &row[a..] {
                // columns are increasing along a row
                rows.push(colidx[ka]);
                cols.push(colidx[kb]);
            }
        }
    }
    let vals = vec![T::zero(); rows.len()];
    let H = CscMatrix::from_triplets_unchecked(n, n, &rows, &cols, &vals);

    let find = |i: usize, j: usize| H.find_entry((i, j)).unwrap_or_default();

    let mapQ = (0..n)
        .flat_map(|j| (Q.colptr[j]..Q.colptr[j + 1]).map(move |k| (Q.rowval[k], j)))
        .map(|(i, j)| find(i, j))
        .collect();
    let diag = (0..n).map(|j| find(j, j)).collect();

    let mut rowpair_ptr = vec![0; m + 1];
    let mut rowpair_idx = Vec::with_capacity(rows.len());
    for r in 0..m {
        let row = &Arowidx[Arowptr[r]..Arowptr[r + 1]];
        for (a, &ka) in row.iter().enumerate() {
            for &kb in &row[a..] {
                rowpair_idx.push(find(colidx[ka], colidx[kb]));
            }
        }
        rowpair_ptr[r + 1] = rowpair_idx.len();
    }

    let map = SchurDataMap {
        Q: mapQ,
        diag,
        rowpair_ptr,
        rowpair_idx,
    };
    (H, map)
}

// column of every entry of A.nzval
fn column_index<T: FloatT>(A: &CscMatrix<T>) -> Vec<usize> {
    let mut colidx = vec![0; A.nnz()];
    for j in 0..A.ncols() {
        colidx[A.colptr[j]..A.colptr[j + 1]].fill(j);
    }
    colidx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::problem::NormalizedProblem;

    #[test]
    fn test_low_rank_updates_reuse_buffers() {
        let data = ProblemData::new(NormalizedProblem {
            Q: CscMatrix::from(&[[2., 0., 0.], [0., 2., 0.], [0., 0., 2.]]),
            q: vec![0.; 3],
            A: CscMatrix::from(&[[1., 1., 0.], [0., 1., 1.], [1., 1., 1.]]),
            bmin: vec![0.; 3],
            bmax: vec![1.; 3],
            infbound: 1e20,
        });
        let settings = QPALMSettings {
            max_rank_update_fraction: 1.0,
            ..QPALMSettings::default()
        };
        let sigma = [10.; 3];

        let mut solver = SchurSolver::new(&data.Q, &data.A).unwrap();
        solver.update(&data, &[false; 3], &sigma, 0.1, &settings).unwrap();
        let ptrs = (solver.row_idx.as_ptr(), solver.row_vals.as_ptr());
        assert!(solver.row_idx.capacity() >= 3);

        for active in [[true, false, false], [true, false, true], [false, true, true]] {
            solver.update(&data, &active, &sigma, 0.1, &settings).unwrap();
            assert!(solver.nupdates > 0);
        }
        assert_eq!((solver.row_idx.as_ptr(), solver.row_vals.as_ptr()), ptrs);
    }
}
