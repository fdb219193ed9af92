//! QPALM algebra module.
//!
//! __NB__: Users will not ordinarily need to interact with this
//! module beyond the [`CscMatrix`] type used to supply problem data.
//!
//! All floating point data in the solver is generic over types
//! implementing the [`FloatT`] trait.  Vector operations are
//! provided on slices through [`VectorMath`], and sparse matrix
//! operations on [`CscMatrix`] through [`MatrixMath`] and the
//! matrix-vector product traits.

mod csc;
mod error_types;
mod floats;
mod math_traits;
mod matrix_traits;
mod matrix_types;
mod scalarmath;
mod vecmath;

pub use csc::*;
pub use error_types::*;
pub use floats::*;
pub use math_traits::*;
pub use matrix_traits::*;
pub use matrix_types::*;
pub(crate) use scalarmath::triangular_number;
