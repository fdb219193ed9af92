use crate::algebra::{Adjoint, Symmetric};

/// Row and column dimensions of a matrix or matrix view
pub trait ShapedMatrix {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;

    /// (rows, columns)
    fn size(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    fn is_square(&self) -> bool {
        self.nrows() == self.ncols()
    }
}

impl<M: ShapedMatrix> ShapedMatrix for Adjoint<'_, M> {
    fn nrows(&self) -> usize {
        self.src.ncols()
    }
    fn ncols(&self) -> usize {
        self.src.nrows()
    }
}

impl<M: ShapedMatrix> ShapedMatrix for Symmetric<'_, M> {
    fn nrows(&self) -> usize {
        self.src.nrows()
    }
    fn ncols(&self) -> usize {
        self.src.ncols()
    }
}
