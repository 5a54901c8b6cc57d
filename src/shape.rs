use std::fmt;

/// Row and column extent of a [`Matrix`](crate::Matrix).
#[derive(Clone, Copy, Debug, Eq)]
pub struct Shape {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
}

impl Shape {
    pub fn new(rows: usize, cols: usize) -> Shape {
        Shape { rows, cols }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// A matrix with no rows reports zero columns no matter how it was
    /// last sized.
    pub fn cols(&self) -> usize {
        if self.rows == 0 {
            0
        } else {
            self.cols
        }
    }

    /// Element count of an already validated shape.
    pub fn elem_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Element count, or `None` when `rows * cols` overflows. Construction
    /// and resizing go through this so oversized shapes surface as
    /// [`InvalidDimension`](crate::MatrixError::InvalidDimension) instead
    /// of an allocation failure.
    pub(crate) fn checked_elem_count(&self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }

    #[inline]
    pub(crate) fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    // Row-major offset. Callers check containment first.
    #[inline]
    pub(crate) fn offset(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Shape) -> bool {
        self.rows == other.rows && self.cols() == other.cols()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows(), self.cols())
    }
}
