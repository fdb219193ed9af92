#![allow(non_snake_case)]
use super::linsys::FactorizationError;
use super::settings::{QPALMSettings, SettingsError};
use super::utils::infbounds::get_infinity;
use crate::algebra::*;
use thiserror::Error;

/// Size above which converting a dense input to sparse format logs a warning.
const DENSE_WARN_NUMEL: usize = 10_000;

/// Error type returned by problem setup
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SetupError {
    /// None of Q, q or A was supplied
    #[error("Problem has no variables: at least one of Q, q or A is required")]
    NoVariables,
    /// A was supplied without both bounds, or bounds without A
    #[error("Constraint matrix A and both bounds bmin, bmax must be supplied together")]
    BoundsMismatch,
    /// A problem input has incompatible size
    #[error("Dimension mismatch in {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        /// name of the offending input
        what: &'static str,
        /// expected dimension
        expected: usize,
        /// dimension found
        found: usize,
    },
    /// bmin\[i\] > bmax\[i\], or a bound is NaN
    #[error("Inconsistent bounds for constraint {0}")]
    InconsistentBounds(usize),
    /// Badly formed sparse matrix or non-finite data
    #[error("Bad problem data: {0}")]
    BadFormat(#[from] SparseFormatError),
    /// Settings failed validation
    #[error("Bad settings: {0}")]
    BadSettings(#[from] SettingsError),
    /// Symbolic factorization of the Newton system failed
    #[error("Linear solver setup failed: {0}")]
    LinearSolver(#[from] FactorizationError),
}

/// Matrix input to a [`ProblemSetup`], borrowed from the caller.
///
/// Dense data is stored in column major order and is converted to
/// sparse format during setup.
#[derive(Debug, Clone, Copy)]
pub enum MatrixData<'a, T> {
    /// sparse matrix in CSC format
    Sparse(&'a CscMatrix<T>),
    /// dense column major matrix
    Dense {
        /// number of rows
        m: usize,
        /// number of columns
        n: usize,
        /// column major values, length m*n
        data: &'a [T],
    },
}

impl<T> MatrixData<'_, T>
where
    T: FloatT,
{
    /// (rows, columns)
    pub fn size(&self) -> (usize, usize) {
        match self {
            MatrixData::Sparse(M) => M.size(),
            MatrixData::Dense { m, n, .. } => (*m, *n),
        }
    }

    fn check_dense_length(&self, what: &'static str) -> Result<(), SetupError> {
        if let MatrixData::Dense { m, n, data } = self {
            if data.len() != m * n {
                return Err(SetupError::DimensionMismatch {
                    what,
                    expected: m * n,
                    found: data.len(),
                });
            }
        }
        Ok(())
    }

    fn check_format(&self) -> Result<(), SparseFormatError> {
        match self {
            MatrixData::Sparse(M) => M.check_format(),
            MatrixData::Dense { data, .. } => {
                if data.is_finite() {
                    Ok(())
                } else {
                    Err(SparseFormatError::NonFiniteValue)
                }
            }
        }
    }

    fn to_csc(self, what: &str) -> CscMatrix<T> {
        match self {
            MatrixData::Sparse(M) => M.clone(),
            MatrixData::Dense { m, n, data } => {
                if m * n > DENSE_WARN_NUMEL {
                    log::warn!(
                        "converting dense {} ({} x {}) to sparse format; supply sparse data for large problems",
                        what, m, n
                    );
                } else {
                    log::debug!("converting dense {} ({} x {}) to sparse format", what, m, n);
                }
                CscMatrix::from_dense(m, n, data)
            }
        }
    }
}

impl<'a, T> From<&'a CscMatrix<T>> for MatrixData<'a, T> {
    fn from(M: &'a CscMatrix<T>) -> Self {
        MatrixData::Sparse(M)
    }
}

/// Problem definition passed to [`Workspace::setup`](crate::solver::Workspace::setup).
///
/// Every input is optional.  The problem dimension is inferred from
/// whichever of Q, q or A is present, and omitted inputs default to
/// zero cost or an empty constraint set.
///
/// ```no_run
/// use qpalm::algebra::*;
/// use qpalm::solver::*;
///
/// let Q = CscMatrix::from(&[[4., 1.], [1., 2.]]);
/// let A = CscMatrix::identity(2);
/// let q = [1., 1.];
/// let (bmin, bmax) = ([0., 0.], [0.7, 0.7]);
///
/// let problem = ProblemSetup::new().Q(&Q).q(&q).A(&A).bmin(&bmin).bmax(&bmax);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ProblemSetup<'a, T> {
    /// quadratic cost, upper triangle is used
    pub Q: Option<MatrixData<'a, T>>,
    /// linear cost
    pub q: Option<&'a [T]>,
    /// constraint matrix
    pub A: Option<MatrixData<'a, T>>,
    /// constraint lower bounds
    pub bmin: Option<&'a [T]>,
    /// constraint upper bounds
    pub bmax: Option<&'a [T]>,
}

impl<T> Default for ProblemSetup<'_, T> {
    fn default() -> Self {
        Self {
            Q: None,
            q: None,
            A: None,
            bmin: None,
            bmax: None,
        }
    }
}

impl<'a, T> ProblemSetup<'a, T>
where
    T: FloatT,
{
    /// An empty problem.  At least one of Q, q or A must be added.
    pub fn new() -> Self {
        Self::default()
    }

    /// sparse quadratic cost
    pub fn Q(mut self, Q: &'a CscMatrix<T>) -> Self {
        self.Q = Some(MatrixData::Sparse(Q));
        self
    }

    /// dense column major quadratic cost
    pub fn Q_dense(mut self, n: usize, data: &'a [T]) -> Self {
        self.Q = Some(MatrixData::Dense { m: n, n, data });
        self
    }

    /// linear cost
    pub fn q(mut self, q: &'a [T]) -> Self {
        self.q = Some(q);
        self
    }

    /// sparse constraint matrix
    pub fn A(mut self, A: &'a CscMatrix<T>) -> Self {
        self.A = Some(MatrixData::Sparse(A));
        self
    }

    /// dense column major constraint matrix
    pub fn A_dense(mut self, m: usize, n: usize, data: &'a [T]) -> Self {
        self.A = Some(MatrixData::Dense { m, n, data });
        self
    }

    /// constraint lower bounds
    pub fn bmin(mut self, bmin: &'a [T]) -> Self {
        self.bmin = Some(bmin);
        self
    }

    /// constraint upper bounds
    pub fn bmax(mut self, bmax: &'a [T]) -> Self {
        self.bmax = Some(bmax);
        self
    }

    /// Validate the problem and settings.  Checks are made in a fixed
    /// order and the first failure is reported.
    ///
    /// Returns the problem dimensions `(n, m)`.
    pub fn validate(&self, settings: &QPALMSettings<T>) -> Result<(usize, usize), SetupError> {
        if self.Q.is_none() && self.q.is_none() && self.A.is_none() {
            return Err(SetupError::NoVariables);
        }

        match (self.A.is_some(), self.bmin.is_some(), self.bmax.is_some()) {
            (true, true, true) | (false, false, false) => {}
            _ => return Err(SetupError::BoundsMismatch),
        }

        let n = self.dimension();
        let m = self.A.map_or(0, |A| A.size().0);

        // dimension checks
        if let Some(Q) = self.Q {
            Q.check_dense_length("Q")?;
            check_dimension("Q rows", n, Q.size().0)?;
            check_dimension("Q columns", n, Q.size().1)?;
        }
        if let Some(q) = self.q {
            check_dimension("q", n, q.len())?;
        }
        if let Some(A) = self.A {
            A.check_dense_length("A")?;
            check_dimension("A columns", n, A.size().1)?;
        }
        if let Some(bmin) = self.bmin {
            check_dimension("bmin", m, bmin.len())?;
        }
        if let Some(bmax) = self.bmax {
            check_dimension("bmax", m, bmax.len())?;
        }

        // bounds consistency.  NaN bounds fail here
        if let (Some(bmin), Some(bmax)) = (self.bmin, self.bmax) {
            if let Some(i) = std::iter::zip(bmin, bmax).position(|(l, u)| !(l <= u)) {
                return Err(SetupError::InconsistentBounds(i));
            }
        }

        // data format
        if let Some(Q) = self.Q {
            Q.check_format()?;
        }
        if let Some(A) = self.A {
            A.check_format()?;
        }
        if let Some(q) = self.q {
            if !q.is_finite() {
                return Err(SparseFormatError::NonFiniteValue.into());
            }
        }

        settings.validate()?;

        Ok((n, m))
    }

    // n from the first of Q, q, A present
    fn dimension(&self) -> usize {
        if let Some(Q) = self.Q {
            Q.size().1
        } else if let Some(q) = self.q {
            q.len()
        } else {
            self.A.map_or(0, |A| A.size().1)
        }
    }

    /// Converts a validated problem to owned data: upper triangular Q,
    /// defaults for omitted inputs, bounds clamped to ±infinity.
    pub(crate) fn normalize(&self, n: usize, m: usize) -> NormalizedProblem<T> {
        let Q = self
            .Q
            .map_or_else(|| CscMatrix::zeros((n, n)), |Q| Q.to_csc("Q").to_triu());

        let q = self.q.map_or_else(|| vec![T::zero(); n], |q| q.to_vec());

        let A = self
            .A
            .map_or_else(|| CscMatrix::zeros((0, n)), |A| A.to_csc("A"));

        let infbound: T = get_infinity().as_T();
        let clamp = |b: Option<&[T]>| -> Vec<T> {
            b.map_or_else(Vec::new, |b| {
                b.iter().map(|&v| v.project(-infbound, infbound)).collect()
            })
        };
        let bmin = clamp(self.bmin);
        let bmax = clamp(self.bmax);
        debug_assert!(bmin.len() == m && bmax.len() == m);

        NormalizedProblem {
            Q,
            q,
            A,
            bmin,
            bmax,
            infbound,
        }
    }
}

fn check_dimension(what: &'static str, expected: usize, found: usize) -> Result<(), SetupError> {
    if expected != found {
        Err(SetupError::DimensionMismatch {
            what,
            expected,
            found,
        })
    } else {
        Ok(())
    }
}

/// Problem data after validation and defaulting
pub(crate) struct NormalizedProblem<T> {
    pub Q: CscMatrix<T>,
    pub q: Vec<T>,
    pub A: CscMatrix<T>,
    pub bmin: Vec<T>,
    pub bmax: Vec<T>,
    pub infbound: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> QPALMSettings<f64> {
        QPALMSettings::default()
    }

    #[test]
    fn test_no_variables() {
        let p = ProblemSetup::<f64>::new();
        assert_eq!(p.validate(&settings()), Err(SetupError::NoVariables));

        // bounds alone do not define variables
        let b = [1.0];
        let p = ProblemSetup::new().bmin(&b).bmax(&b);
        assert_eq!(p.validate(&settings()), Err(SetupError::NoVariables));
    }

    #[test]
    fn test_bounds_mismatch() {
        let A = CscMatrix::<f64>::identity(2);
        let b = [1.0, 2.0];

        // A without bounds
        let p = ProblemSetup::new().A(&A);
        assert_eq!(p.validate(&settings()), Err(SetupError::BoundsMismatch));

        // A with one bound
        let p = ProblemSetup::new().A(&A).bmax(&b);
        assert_eq!(p.validate(&settings()), Err(SetupError::BoundsMismatch));

        // bounds without A
        let q = [1.0, 1.0];
        let p = ProblemSetup::new().q(&q).bmin(&b).bmax(&b);
        assert_eq!(p.validate(&settings()), Err(SetupError::BoundsMismatch));

        // bounds mismatch takes precedence over dimension errors
        let q = [1.0, 1.0, 1.0];
        let p = ProblemSetup::new().q(&q).A(&A);
        assert_eq!(p.validate(&settings()), Err(SetupError::BoundsMismatch));
    }

    #[test]
    fn test_dimension_inference() {
        let Q = CscMatrix::<f64>::identity(3);
        let q = [1.0, 2.0, 3.0];
        let A = CscMatrix::<f64>::zeros((2, 3));
        let b = [0.0, 0.0];

        assert_eq!(ProblemSetup::new().Q(&Q).validate(&settings()), Ok((3, 0)));
        assert_eq!(ProblemSetup::new().q(&q).validate(&settings()), Ok((3, 0)));
        assert_eq!(
            ProblemSetup::new()
                .A(&A)
                .bmin(&b)
                .bmax(&b)
                .validate(&settings()),
            Ok((3, 2))
        );
    }

    #[test]
    fn test_dimension_mismatch() {
        let Q = CscMatrix::<f64>::identity(2);
        let q = [1.0, 2.0, 3.0];
        let p = ProblemSetup::new().Q(&Q).q(&q);
        assert_eq!(
            p.validate(&settings()),
            Err(SetupError::DimensionMismatch {
                what: "q",
                expected: 2,
                found: 3
            })
        );

        // bounds of the wrong length
        let A = CscMatrix::<f64>::identity(2);
        let (l, u) = ([0.0, 0.0], [1.0, 1.0, 1.0]);
        let p = ProblemSetup::new().Q(&Q).A(&A).bmin(&l).bmax(&u);
        assert_eq!(
            p.validate(&settings()),
            Err(SetupError::DimensionMismatch {
                what: "bmax",
                expected: 2,
                found: 3
            })
        );

        // non-square Q
        let Q = CscMatrix::<f64>::zeros((2, 3));
        let p = ProblemSetup::new().Q(&Q);
        assert!(matches!(
            p.validate(&settings()),
            Err(SetupError::DimensionMismatch { what: "Q rows", .. })
        ));

        // dense data of the wrong length
        let data = [1.0, 2.0, 3.0];
        let p = ProblemSetup::new().Q_dense(2, &data);
        assert!(matches!(
            p.validate(&settings()),
            Err(SetupError::DimensionMismatch { what: "Q", .. })
        ));
    }

    #[test]
    fn test_inconsistent_bounds() {
        let A = CscMatrix::<f64>::identity(2);
        let (l, u) = ([0.0, 2.0], [1.0, 1.0]);
        let p = ProblemSetup::new().A(&A).bmin(&l).bmax(&u);
        assert_eq!(
            p.validate(&settings()),
            Err(SetupError::InconsistentBounds(1))
        );

        let (l, u) = ([f64::NAN, 0.0], [1.0, 1.0]);
        let p = ProblemSetup::new().A(&A).bmin(&l).bmax(&u);
        assert_eq!(
            p.validate(&settings()),
            Err(SetupError::InconsistentBounds(0))
        );

        // infinite bounds are fine
        let (l, u) = ([f64::NEG_INFINITY, 0.0], [f64::INFINITY, 0.0]);
        let p = ProblemSetup::new().A(&A).bmin(&l).bmax(&u);
        assert!(p.validate(&settings()).is_ok());
    }

    #[test]
    fn test_bad_format_and_settings() {
        let q = [1.0, f64::INFINITY];
        let p = ProblemSetup::new().q(&q);
        assert_eq!(
            p.validate(&settings()),
            Err(SetupError::BadFormat(SparseFormatError::NonFiniteValue))
        );

        // unsorted rows
        let Q = CscMatrix::new(2, 2, vec![0, 2, 2], vec![1, 0], vec![1.0, 1.0]);
        let p = ProblemSetup::new().Q(&Q);
        assert_eq!(
            p.validate(&settings()),
            Err(SetupError::BadFormat(SparseFormatError::BadRowOrdering))
        );

        let q = [1.0];
        let bad = QPALMSettings {
            max_iter: 0,
            ..QPALMSettings::default()
        };
        let p = ProblemSetup::new().q(&q);
        assert_eq!(
            p.validate(&bad),
            Err(SetupError::BadSettings(SettingsError::BadFieldValue(
                "max_iter"
            )))
        );
    }

    #[test]
    fn test_normalize() {
        // dense Q with a lower triangle, no constraints
        let Qd = [2.0, 1.0, 1.0, 3.0];
        let A = [1.0, 0.0, 0.0, 1.0];
        let (l, u) = ([f64::NEG_INFINITY, -1.0], [1e30, 1.0]);
        let p = ProblemSetup::new()
            .Q_dense(2, &Qd)
            .A_dense(2, 2, &A)
            .bmin(&l)
            .bmax(&u);
        let (n, m) = p.validate(&settings()).unwrap();
        let data = p.normalize(n, m);

        assert!(data.Q.is_triu());
        assert_eq!(data.Q.nnz(), 3);
        assert_eq!(data.q, vec![0.0, 0.0]);
        assert_eq!(data.A, CscMatrix::identity(2));
        let inf = get_infinity();
        assert_eq!(data.bmin, vec![-inf, -1.0]);
        assert_eq!(data.bmax, vec![inf, 1.0]);

        // LP with no Q
        let q = [1.0, 1.0];
        let p = ProblemSetup::new().q(&q);
        let data = p.normalize(2, 0);
        assert_eq!(data.Q.nnz(), 0);
        assert_eq!(data.A.size(), (0, 2));
        assert!(data.bmin.is_empty());
    }
}
