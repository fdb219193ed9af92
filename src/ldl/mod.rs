//! Sparse $LDL^T$ factorization with rank-one modification.
//!
//! The factorization operates on the upper triangle of a symmetric
//! matrix, reordered with approximate minimum degree, and supports
//! numerical refactoring on a fixed sparsity pattern as well as
//! in-place rank one updates and downdates of the factors.

#[allow(clippy::module_inception)]
mod ldl;
pub use ldl::*;
