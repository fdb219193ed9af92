/// Borrowed transpose of a matrix
#[derive(Debug, Clone, Copy)]
pub struct Adjoint<'a, M> {
    pub src: &'a M,
}

/// Borrowed symmetric view of a matrix.  Only the upper
/// triangle of the source is referenced.
#[derive(Debug, Clone, Copy)]
pub struct Symmetric<'a, M> {
    pub src: &'a M,
}
