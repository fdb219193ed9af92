use thiserror::Error;

/// Defects found by [`CscMatrix::check_format`](crate::algebra::CscMatrix::check_format)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SparseFormatError {
    #[error("array lengths do not match the matrix dimensions")]
    IncompatibleDimension,
    #[error("row indices are not strictly increasing within a column")]
    BadRowOrdering,
    #[error("row index out of bounds")]
    BadRowval,
    #[error("column pointers are not a nondecreasing sequence from zero")]
    BadColptr,
    #[error("matrix contains a NaN or infinite value")]
    NonFiniteValue,
}

/// Matrix arithmetic on operands of incompatible size
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("dimension mismatch: expected {expected:?}, found {found:?}")]
pub struct DimensionMismatchError {
    pub expected: (usize, usize),
    pub found: (usize, usize),
}
