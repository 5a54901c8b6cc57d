use crate::shape::Shape;
use thiserror::Error;

pub type MatResult<T> = Result<T, MatrixError>;

/// Every shape or bounds violation gets its own variant so callers can
/// discriminate; none of these are ever swallowed internally.
#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("operands have shapes {lhs} and {rhs}, element-wise ops need equal shapes")]
    SizeMismatch { lhs: Shape, rhs: Shape },
    #[error("cannot multiply {lhs} by {rhs}, matrices should be NxM and MxK")]
    DimensionMismatch { lhs: Shape, rhs: Shape },
    #[error("row {row} has {got} elements, every row must have {expected}")]
    JaggedMatrix {
        row: usize,
        expected: usize,
        got: usize,
    },
    #[error("index ({row}, {col}) is outside a {shape} matrix")]
    OutOfBounds { row: usize, col: usize, shape: Shape },
    #[error("{rows}x{cols} is not a representable matrix shape")]
    InvalidDimension { rows: usize, cols: usize },
}
